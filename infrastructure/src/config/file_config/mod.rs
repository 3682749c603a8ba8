//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types.

mod completion;
mod engine;
mod logging;

pub use completion::FileCompletionConfig;
pub use engine::FileEngineConfig;
pub use logging::FileLoggingConfig;

use accord_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Completion service endpoint
    pub completion: FileCompletionConfig,
    /// Negotiation flow settings
    pub engine: FileEngineConfig,
    /// Structured event log
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.engine.validate();

        if self.completion.request_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                accord_domain::ConfigIssueCode::ZeroValue {
                    field: "completion.request_timeout_secs".to_string(),
                },
                "completion.request_timeout_secs cannot be 0",
            ));
        }

        issues
    }
}
