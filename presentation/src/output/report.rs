//! Result of a simulated negotiation

use accord_domain::{MessageWithReactions, NegotiationSession, NegotiationStage, Proposal};
use serde::Serialize;

/// Why a simulation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Consensus,
    RoundLimit,
    Cancelled,
}

impl StopReason {
    pub fn describe(&self) -> &'static str {
        match self {
            StopReason::Consensus => "consensus reached",
            StopReason::RoundLimit => "round limit reached without consensus",
            StopReason::Cancelled => "cancelled, negotiation abandoned",
        }
    }
}

/// Everything needed to render a finished simulation
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub session: NegotiationSession,
    pub stage: NegotiationStage,
    /// Generated turns posted, not counting auto-responses
    pub rounds: usize,
    pub stop_reason: StopReason,
    pub transcript: Vec<MessageWithReactions>,
    pub proposal: Option<Proposal>,
}
