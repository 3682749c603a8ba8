//! Configuration file loading for accord
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./accord.toml` or `./.accord.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/accord/config.toml`
//! 4. Fallback: `~/.config/accord/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{FileCompletionConfig, FileConfig, FileEngineConfig, FileLoggingConfig};
pub use loader::{ConfigLoader, ConfigSource};
