//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Invalid reaction: {0}")]
    InvalidReaction(String),

    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Unparseable {what}: {reason}")]
    Unparseable { what: &'static str, reason: String },
}

impl DomainError {
    /// Shorthand for an unparseable completion-service payload
    pub fn unparseable(what: &'static str, reason: impl Into<String>) -> Self {
        DomainError::Unparseable {
            what,
            reason: reason.into(),
        }
    }

    /// Check if this error came from parsing oracle output rather than caller input
    pub fn is_parse_error(&self) -> bool {
        matches!(self, DomainError::Unparseable { .. })
    }
}
