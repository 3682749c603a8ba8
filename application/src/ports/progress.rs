//! Progress notification port
//!
//! Defines the interface for reporting progress while an inbound message is
//! processed.

use accord_domain::{AgentId, ConsensusJudgment, NegotiationMessage, NegotiationStage};

/// Callback for progress updates during message processing
///
/// Implementations live in the presentation layer.
pub trait NegotiationProgress: Send + Sync {
    /// Called once the inbound message is stored
    fn on_message_accepted(&self, message: &NegotiationMessage);

    /// Called after respondents are chosen (possibly none)
    fn on_respondents_selected(&self, stage: NegotiationStage, respondents: &[AgentId]);

    /// Called for each respondent, in completion order
    fn on_response_complete(&self, agent_id: &AgentId, message: Option<&NegotiationMessage>);

    /// Called when the consensus check finishes
    fn on_consensus_checked(&self, _judgment: &ConsensusJudgment) {}
}

/// No-op progress notifier
pub struct NoProgress;

impl NegotiationProgress for NoProgress {
    fn on_message_accepted(&self, _message: &NegotiationMessage) {}
    fn on_respondents_selected(&self, _stage: NegotiationStage, _respondents: &[AgentId]) {}
    fn on_response_complete(&self, _agent_id: &AgentId, _message: Option<&NegotiationMessage>) {}
}
