//! Use-case error type

use crate::ports::completion::CompletionError;
use crate::ports::repository::StoreError;
use accord_domain::DomainError;
use thiserror::Error;

/// Errors surfaced by negotiation use cases
///
/// Only `NotFound`, `Validation`, and `Store` reach callers of the outer
/// operations. `Completion` and `Parse` are soft: the flow logs them and
/// degrades to a fallback.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NegotiationError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Completion service error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Unparseable completion output: {0}")]
    Parse(String),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl NegotiationError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        NegotiationError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        NegotiationError::Validation(message.into())
    }

    /// Whether the error should degrade the operation instead of aborting it
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            NegotiationError::Completion(_) | NegotiationError::Parse(_)
        )
    }
}

impl From<StoreError> for NegotiationError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { entity, id } => NegotiationError::NotFound { entity, id },
            other => NegotiationError::Store(other),
        }
    }
}

impl From<DomainError> for NegotiationError {
    fn from(error: DomainError) -> Self {
        if error.is_parse_error() {
            NegotiationError::Parse(error.to_string())
        } else {
            NegotiationError::Validation(error.to_string())
        }
    }
}
