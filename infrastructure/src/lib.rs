//! Infrastructure layer for accord
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod completion;
pub mod config;
pub mod logging;
pub mod roster;
pub mod store;

// Re-export commonly used types
pub use completion::OpenAiCompletionService;
pub use config::{
    ConfigLoader, ConfigSource, FileCompletionConfig, FileConfig, FileEngineConfig,
    FileLoggingConfig,
};
pub use logging::JsonlNegotiationLogger;
pub use roster::{AgentRoster, RosterAgent, RosterError};
pub use store::InMemoryNegotiationStore;
