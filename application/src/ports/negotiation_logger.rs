//! Port for structured negotiation logging.
//!
//! Defines the [`NegotiationLogger`] trait for recording negotiation events
//! (messages posted, auto-responses, consensus checks, proposals) to a
//! machine-readable log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures the negotiation
//! history as records (JSONL in the default adapter).

use serde_json::Value;

/// Event type identifiers
pub mod events {
    pub const NEGOTIATION_STARTED: &str = "negotiation_started";
    pub const MESSAGE_POSTED: &str = "message_posted";
    pub const AUTO_RESPONSE: &str = "auto_response";
    pub const AUTO_RESPONSE_SKIPPED: &str = "auto_response_skipped";
    pub const CONSENSUS_CHECKED: &str = "consensus_checked";
    pub const NEAR_MISS: &str = "near_miss";
    pub const NEGOTIATION_FINALIZED: &str = "negotiation_finalized";
    pub const PROPOSAL_CREATED: &str = "proposal_created";
    pub const REACTION_ADDED: &str = "reaction_added";
    pub const REACTION_REMOVED: &str = "reaction_removed";
}

/// A structured negotiation event.
pub struct NegotiationEvent {
    pub event_type: &'static str,
    /// Event-specific fields
    pub payload: Value,
}

impl NegotiationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging negotiation events.
///
/// `log` is synchronous and infallible; adapters swallow write failures.
pub trait NegotiationLogger: Send + Sync {
    fn log(&self, event: NegotiationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoNegotiationLogger;

impl NegotiationLogger for NoNegotiationLogger {
    fn log(&self, _event: NegotiationEvent) {}
}
