//! Finalize Negotiation use case
//!
//! Moves a session to a terminal status and, for a completed session with a
//! summary, materializes exactly one proposal. Materialization is best-effort:
//! a failure is logged and the status change stands.

use crate::error::NegotiationError;
use crate::ports::negotiation_logger::{NegotiationEvent, NegotiationLogger, events};
use crate::ports::repository::{NegotiationRepository, StoreError};
use accord_domain::{
    DecisionClass, FinalConsensusBlock, MaterializationPolicy, MessageType, MonetaryAmount,
    NegotiationId, NegotiationSession, NegotiationStatus, Proposal, ProposalContent,
    append_consensus_block,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Requested terminal state
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiationOutcome {
    pub status: NegotiationStatus,
    pub summary: Option<String>,
    pub block: Option<FinalConsensusBlock>,
}

impl NegotiationOutcome {
    pub fn completed(summary: impl Into<String>) -> Self {
        Self {
            status: NegotiationStatus::Completed,
            summary: Some(summary.into()),
            block: None,
        }
    }

    /// Completed without materializing a proposal
    pub fn concluded() -> Self {
        Self {
            status: NegotiationStatus::Completed,
            summary: None,
            block: None,
        }
    }

    pub fn abandoned() -> Self {
        Self {
            status: NegotiationStatus::Abandoned,
            summary: None,
            block: None,
        }
    }

    pub fn with_block(mut self, block: Option<FinalConsensusBlock>) -> Self {
        self.block = block;
        self
    }
}

#[derive(Debug, Clone)]
pub struct FinalizeOutput {
    pub session: NegotiationSession,
    /// The linked proposal, whether created now or earlier
    pub proposal: Option<Proposal>,
}

/// What a proposal is materialized from
pub struct MaterializeInput<'a> {
    pub session: &'a NegotiationSession,
    pub content: ProposalContent,
    pub amount: Option<MonetaryAmount>,
    pub decision_class: Option<DecisionClass>,
    pub block: Option<FinalConsensusBlock>,
}

pub struct FinalizeNegotiationUseCase<R: NegotiationRepository + 'static> {
    repository: Arc<R>,
    logger: Arc<dyn NegotiationLogger>,
    policy: MaterializationPolicy,
}

impl<R: NegotiationRepository + 'static> FinalizeNegotiationUseCase<R> {
    pub fn new(
        repository: Arc<R>,
        logger: Arc<dyn NegotiationLogger>,
        policy: MaterializationPolicy,
    ) -> Self {
        Self {
            repository,
            logger,
            policy,
        }
    }

    pub async fn execute(
        &self,
        negotiation_id: &NegotiationId,
        outcome: NegotiationOutcome,
    ) -> Result<FinalizeOutput, NegotiationError> {
        if !outcome.status.is_terminal() {
            return Err(NegotiationError::validation(
                "outcome status must be completed or abandoned",
            ));
        }

        let mut session = self
            .repository
            .get_session(negotiation_id)
            .await?
            .ok_or_else(|| NegotiationError::not_found("negotiation", negotiation_id))?;

        if session.status.is_terminal() && session.status != outcome.status {
            return Err(NegotiationError::validation(format!(
                "negotiation {} is already {}",
                negotiation_id, session.status
            )));
        }

        if session.status != outcome.status {
            session.conclude(outcome.status, Utc::now());
            self.repository.update_session(&session).await?;

            info!("Negotiation {} finalized as {}", negotiation_id, session.status);
            self.logger.log(NegotiationEvent::new(
                events::NEGOTIATION_FINALIZED,
                json!({
                    "negotiation_id": negotiation_id,
                    "status": session.status.as_str(),
                    "summary": outcome.summary,
                }),
            ));
        }

        let summary = outcome
            .summary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let proposal = match (session.status, summary) {
            (NegotiationStatus::Completed, Some(summary)) => {
                let content = ProposalContent {
                    title: format!("Negotiated: {}", session.topic),
                    description: summary.to_string(),
                    summary: summary.to_string(),
                };
                let decision_class = outcome.block.as_ref().map(|b| b.decision_class);
                let input = MaterializeInput {
                    session: &session,
                    content,
                    amount: None,
                    decision_class,
                    block: outcome.block,
                };
                match self.materialize(input).await {
                    Ok(proposal) => Some(proposal),
                    Err(e) => {
                        warn!(
                            "Proposal materialization for negotiation {} (initiator {}) failed: {}",
                            negotiation_id, session.initiator_id, e
                        );
                        None
                    }
                }
            }
            _ => self
                .repository
                .proposal_for_negotiation(negotiation_id)
                .await
                .unwrap_or_else(|e| {
                    warn!("Failed to look up proposal for {}: {}", negotiation_id, e);
                    None
                }),
        };

        Ok(FinalizeOutput { session, proposal })
    }

    /// Create the session's proposal unless one is already linked.
    pub async fn materialize(
        &self,
        input: MaterializeInput<'_>,
    ) -> Result<Proposal, NegotiationError> {
        let negotiation_id = &input.session.id;
        if let Some(existing) = self.repository.proposal_for_negotiation(negotiation_id).await? {
            return Ok(existing);
        }

        let agreements = self
            .repository
            .list_messages(negotiation_id)
            .await?
            .iter()
            .filter(|m| m.message_type == MessageType::Agreement)
            .count();

        let mut proposal = Proposal::from_negotiation(
            input.session,
            input.content,
            agreements,
            &self.policy,
            Utc::now(),
        )
        .with_amount(input.amount)
        .with_decision_class(input.decision_class);

        if let Some(block) = input.block {
            let block = block.with_proposal_id(proposal.id.clone());
            let summary = proposal.negotiation_summary.take().unwrap_or_default();
            proposal.negotiation_summary = Some(append_consensus_block(&summary, &block));
        }

        match self.repository.insert_proposal(&proposal).await {
            Ok(()) => {}
            // Lost a race with another finalizer; the stored one wins
            Err(StoreError::Conflict(_)) => {
                if let Some(existing) =
                    self.repository.proposal_for_negotiation(negotiation_id).await?
                {
                    return Ok(existing);
                }
                return Err(NegotiationError::Store(StoreError::Conflict(format!(
                    "proposal for {} conflicted but is missing",
                    negotiation_id
                ))));
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            "Proposal {} created for negotiation {} (quorum {})",
            proposal.id, negotiation_id, proposal.quorum
        );
        self.logger.log(NegotiationEvent::new(
            events::PROPOSAL_CREATED,
            json!({
                "negotiation_id": negotiation_id,
                "proposal_id": proposal.id,
                "title": proposal.title,
                "quorum": proposal.quorum,
                "amount": proposal.amount,
            }),
        ));

        Ok(proposal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryRepository, RecordingLogger};
    use accord_domain::{AgentId, NegotiationMessage, ProposalStatus};

    async fn setup(agreements: usize) -> (Arc<MemoryRepository>, NegotiationSession) {
        let repo = Arc::new(MemoryRepository::new());
        let session =
            NegotiationSession::open("Budget split", AgentId::new("alice"), None).unwrap();
        repo.insert_session(&session).await.unwrap();
        for i in 0..agreements {
            let message = NegotiationMessage::new(
                session.id.clone(),
                AgentId::new(format!("agent-{i}")),
                "CONSENT:YES",
                MessageType::Agreement,
            );
            repo.append_message(&message).await.unwrap();
        }
        (repo, session)
    }

    fn use_case(
        repo: &Arc<MemoryRepository>,
        logger: &Arc<RecordingLogger>,
    ) -> FinalizeNegotiationUseCase<MemoryRepository> {
        FinalizeNegotiationUseCase::new(
            repo.clone(),
            logger.clone(),
            MaterializationPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_completed_with_summary_materializes_once() {
        let (repo, session) = setup(3).await;
        let logger = Arc::new(RecordingLogger::default());
        let use_case = use_case(&repo, &logger);

        let first = use_case
            .execute(&session.id, NegotiationOutcome::completed("OPT-A as written"))
            .await
            .unwrap();
        let second = use_case
            .execute(&session.id, NegotiationOutcome::completed("OPT-A as written"))
            .await
            .unwrap();

        let proposal = first.proposal.unwrap();
        assert_eq!(second.proposal.unwrap().id, proposal.id);
        assert_eq!(repo.proposal_count(), 1);
        assert_eq!(logger.count(events::NEGOTIATION_FINALIZED), 1);
        assert_eq!(logger.count(events::PROPOSAL_CREATED), 1);

        assert_eq!(proposal.title, "Negotiated: Budget split");
        assert_eq!(proposal.description, "OPT-A as written");
        assert_eq!(proposal.created_by_agent_id, AgentId::new("alice"));
        assert_eq!(proposal.quorum, 2);
        assert_eq!(proposal.status, ProposalStatus::Open);
        assert!(proposal.is_negotiated);
        assert_eq!(first.session.status, NegotiationStatus::Completed);
        assert!(first.session.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_block_is_appended_with_proposal_id() {
        let (repo, session) = setup(0).await;
        let logger = Arc::new(RecordingLogger::default());
        let block = FinalConsensusBlock::parse("terms: rotate chair\ndecisionClass: pilot");

        let output = use_case(&repo, &logger)
            .execute(
                &session.id,
                NegotiationOutcome::completed("rotate chair").with_block(block),
            )
            .await
            .unwrap();

        let proposal = output.proposal.unwrap();
        assert_eq!(proposal.quorum, 1);
        assert_eq!(proposal.decision_class, Some(DecisionClass::Pilot));
        let summary = proposal.negotiation_summary.unwrap();
        assert!(summary.starts_with("rotate chair\n\nFinalConsensusBlock: "));
        assert!(summary.contains(&format!("\"proposalId\":\"{}\"", proposal.id)));
    }

    #[tokio::test]
    async fn test_abandoned_and_summaryless_create_nothing() {
        let (repo, session) = setup(2).await;
        let logger = Arc::new(RecordingLogger::default());
        let use_case = use_case(&repo, &logger);

        let output = use_case
            .execute(&session.id, NegotiationOutcome::abandoned())
            .await
            .unwrap();
        assert_eq!(output.session.status, NegotiationStatus::Abandoned);
        assert!(output.proposal.is_none());

        let (repo, session) = setup(2).await;
        let output = FinalizeNegotiationUseCase::new(
            repo.clone(),
            logger.clone(),
            MaterializationPolicy::default(),
        )
        .execute(&session.id, NegotiationOutcome::completed("   "))
        .await
        .unwrap();
        assert!(output.proposal.is_none());
        assert_eq!(repo.proposal_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_transitions() {
        let (repo, session) = setup(0).await;
        let logger = Arc::new(RecordingLogger::default());
        let use_case = use_case(&repo, &logger);

        let active = NegotiationOutcome {
            status: NegotiationStatus::Active,
            summary: None,
            block: None,
        };
        assert!(matches!(
            use_case.execute(&session.id, active).await,
            Err(NegotiationError::Validation(_))
        ));

        use_case
            .execute(&session.id, NegotiationOutcome::abandoned())
            .await
            .unwrap();
        assert!(matches!(
            use_case
                .execute(&session.id, NegotiationOutcome::completed("late"))
                .await,
            Err(NegotiationError::Validation(_))
        ));

        assert!(matches!(
            use_case
                .execute(&NegotiationId::new("missing"), NegotiationOutcome::abandoned())
                .await,
            Err(NegotiationError::NotFound { .. })
        ));
    }
}
