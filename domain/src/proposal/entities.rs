//! Proposal entities - the durable record of a concluded negotiation

use super::amount::MonetaryAmount;
use crate::consensus::rule::DecisionClass;
use crate::core::error::DomainError;
use crate::core::ids::{AgentId, NegotiationId, ProposalId};
use crate::negotiation::entities::NegotiationSession;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    #[default]
    Open,
    Passed,
    Rejected,
    Vetoed,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Open => "open",
            ProposalStatus::Passed => "passed",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::Vetoed => "vetoed",
        }
    }
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProposalStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(ProposalStatus::Open),
            "passed" => Ok(ProposalStatus::Passed),
            "rejected" => Ok(ProposalStatus::Rejected),
            "vetoed" => Ok(ProposalStatus::Vetoed),
            other => Err(DomainError::UnknownVariant {
                kind: "proposal status",
                value: other.to_string(),
            }),
        }
    }
}

/// Voting parameters applied when a negotiation is materialized
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterializationPolicy {
    /// Fraction of votes required to pass
    pub threshold: f64,
    pub voting_days: i64,
    pub veto_window_days: i64,
}

impl Default for MaterializationPolicy {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            voting_days: 7,
            veto_window_days: 3,
        }
    }
}

impl MaterializationPolicy {
    /// `max(1, ceil(agreements / 2))`
    pub fn quorum_for(agreements: usize) -> u32 {
        agreements.div_ceil(2).max(1) as u32
    }
}

/// Human-readable proposal text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalContent {
    pub title: String,
    pub description: String,
    pub summary: String,
}

/// A proposal created from a negotiation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub negotiation_id: Option<NegotiationId>,
    pub is_negotiated: bool,
    pub negotiation_summary: Option<String>,
    pub created_by_agent_id: AgentId,
    pub quorum: u32,
    pub threshold: f64,
    pub close_at: DateTime<Utc>,
    pub veto_window_end: DateTime<Utc>,
    pub status: ProposalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<MonetaryAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_class: Option<DecisionClass>,
    pub created_at: DateTime<Utc>,
}

impl Proposal {
    /// Materialize a concluded negotiation into an open proposal.
    ///
    /// The initiator becomes the author; quorum is derived from the number
    /// of agreement messages.
    pub fn from_negotiation(
        session: &NegotiationSession,
        content: ProposalContent,
        agreement_count: usize,
        policy: &MaterializationPolicy,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ProposalId::generate(),
            title: content.title,
            description: content.description,
            negotiation_id: Some(session.id.clone()),
            is_negotiated: true,
            negotiation_summary: Some(content.summary),
            created_by_agent_id: session.initiator_id.clone(),
            quorum: MaterializationPolicy::quorum_for(agreement_count),
            threshold: policy.threshold,
            close_at: now + Duration::days(policy.voting_days),
            veto_window_end: now + Duration::days(policy.veto_window_days),
            status: ProposalStatus::Open,
            amount: None,
            decision_class: None,
            created_at: now,
        }
    }

    pub fn with_amount(mut self, amount: Option<MonetaryAmount>) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_decision_class(mut self, class: Option<DecisionClass>) -> Self {
        self.decision_class = class;
        self
    }

    /// Whether the veto window is still open at `at`
    pub fn in_veto_window(&self, at: DateTime<Utc>) -> bool {
        self.status == ProposalStatus::Open && at < self.veto_window_end
    }
}
