//! Engine parameters - negotiation flow control.
//!
//! [`EngineParams`] groups the static values the use cases read: sampling
//! bounds for every completion call, transcript and consensus windows,
//! per-call timeouts, and the voting schedule applied to new proposals.

use accord_domain::MaterializationPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineParams {
    /// Sampling temperature for every completion call (stage-agnostic)
    pub temperature: f32,
    /// Output bound for every completion call (stage-agnostic)
    pub max_tokens: u32,
    /// Messages of context handed to a responding agent
    pub transcript_window: usize,
    /// Below this many messages the consensus check is skipped
    pub min_messages_for_consensus: usize,
    /// Bound on each individual auto-response
    pub response_timeout: Duration,
    pub proposal_threshold: f64,
    pub proposal_voting_days: i64,
    pub veto_window_days: i64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 500,
            transcript_window: 10,
            min_messages_for_consensus: 5,
            response_timeout: Duration::from_secs(60),
            proposal_threshold: 0.5,
            proposal_voting_days: 7,
            veto_window_days: 3,
        }
    }
}

impl EngineParams {
    // ==================== Builder Methods ====================

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn with_transcript_window(mut self, window: usize) -> Self {
        self.transcript_window = window;
        self
    }

    pub fn with_min_messages_for_consensus(mut self, min: usize) -> Self {
        self.min_messages_for_consensus = min;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn with_proposal_schedule(mut self, voting_days: i64, veto_window_days: i64) -> Self {
        self.proposal_voting_days = voting_days;
        self.veto_window_days = veto_window_days;
        self
    }

    pub fn with_proposal_threshold(mut self, threshold: f64) -> Self {
        self.proposal_threshold = threshold;
        self
    }

    /// Voting parameters for newly materialized proposals
    pub fn materialization_policy(&self) -> MaterializationPolicy {
        MaterializationPolicy {
            threshold: self.proposal_threshold,
            voting_days: self.proposal_voting_days,
            veto_window_days: self.veto_window_days,
        }
    }
}
