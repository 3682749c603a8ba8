//! Presentation layer for accord
//!
//! This crate contains CLI definitions, the simulation driver, output
//! formatters, and progress reporters.

pub mod cli;
pub mod output;
pub mod progress;
pub mod simulate;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, OutputFormat, SimulateArgs};
pub use output::console::ConsoleFormatter;
pub use output::formatter::OutputFormatter;
pub use output::report::{SimulationReport, StopReason};
pub use progress::reporter::{ProgressReporter, SimpleProgress};
pub use simulate::runner::{ProgressMode, SimulationRunner};
