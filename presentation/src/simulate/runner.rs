//! Drives a negotiation turn by turn until it settles

use crate::output::report::{SimulationReport, StopReason};
use crate::progress::reporter::{ProgressReporter, SimpleProgress};
use accord_application::{
    CompletionService, CreateProposalOptions, NegotiationEngine, NegotiationError,
    NegotiationOutcome, NegotiationProgress, NegotiationRepository, NoProgress,
    StartNegotiationInput,
};
use accord_domain::{AgentId, NegotiationId, NegotiationStatus, Proposal};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How turn progress is shown while the simulation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// indicatif bars
    Bars,
    /// Plain lines, for non-interactive output
    Lines,
    Silent,
}

/// Rotates the roster through generated turns on one negotiation
pub struct SimulationRunner<C: CompletionService + 'static, R: NegotiationRepository + 'static> {
    engine: Arc<NegotiationEngine<C, R>>,
    agents: Vec<AgentId>,
    rounds: usize,
    progress: ProgressMode,
    cancellation: CancellationToken,
}

impl<C: CompletionService + 'static, R: NegotiationRepository + 'static> SimulationRunner<C, R> {
    /// The first agent opens the negotiation
    pub fn new(engine: Arc<NegotiationEngine<C, R>>, agents: Vec<AgentId>) -> Self {
        Self {
            engine,
            agents,
            rounds: 12,
            progress: ProgressMode::Bars,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_progress(mut self, mode: ProgressMode) -> Self {
        self.progress = mode;
        self
    }

    /// Abandon the negotiation when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub async fn run(
        &self,
        topic: &str,
        description: Option<&str>,
    ) -> Result<SimulationReport, NegotiationError> {
        let Some(initiator) = self.agents.first() else {
            return Err(NegotiationError::validation("roster is empty"));
        };
        if self.agents.len() < 2 {
            return Err(NegotiationError::validation(
                "a negotiation needs at least two agents",
            ));
        }

        let mut input = StartNegotiationInput::new(topic, initiator.clone());
        if let Some(description) = description {
            input = input.with_description(description);
        }
        let session = self.engine.start_negotiation(input).await?;
        info!(
            "Simulating negotiation {} with {} agents",
            session.id,
            self.agents.len()
        );

        let reporter;
        let progress: &dyn NegotiationProgress = match self.progress {
            ProgressMode::Bars => {
                reporter = ProgressReporter::new();
                &reporter
            }
            ProgressMode::Lines => &SimpleProgress,
            ProgressMode::Silent => &NoProgress,
        };

        let (rounds, stop_reason) = self.turns(&session.id, progress).await?;
        self.report(&session.id, rounds, stop_reason).await
    }

    async fn turns(
        &self,
        negotiation_id: &NegotiationId,
        progress: &dyn NegotiationProgress,
    ) -> Result<(usize, StopReason), NegotiationError> {
        for round in 0..self.rounds {
            let agent_id = &self.agents[round % self.agents.len()];

            let result = tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => {
                    self.abandon(negotiation_id).await?;
                    return Ok((round, StopReason::Cancelled));
                }
                result = self.engine.post_generated_turn(negotiation_id, agent_id, progress) => result,
            };

            match result {
                Ok(output) if output.consensus_reached => {
                    return Ok((round + 1, StopReason::Consensus));
                }
                Ok(_) => {}
                Err(e) if e.is_soft() => {
                    warn!(
                        "Turn {} for {} in {} skipped: {}",
                        round + 1,
                        agent_id,
                        negotiation_id,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok((self.rounds, StopReason::RoundLimit))
    }

    async fn abandon(&self, negotiation_id: &NegotiationId) -> Result<(), NegotiationError> {
        warn!("Simulation cancelled, abandoning {}", negotiation_id);
        self.engine
            .finalize_negotiation(negotiation_id, NegotiationOutcome::abandoned())
            .await?;
        Ok(())
    }

    async fn report(
        &self,
        negotiation_id: &NegotiationId,
        rounds: usize,
        stop_reason: StopReason,
    ) -> Result<SimulationReport, NegotiationError> {
        let session = self.engine.get_negotiation(negotiation_id).await?;
        let proposal = if session.status == NegotiationStatus::Completed {
            self.proposal(negotiation_id).await
        } else {
            None
        };

        Ok(SimulationReport {
            stage: self.engine.current_stage(negotiation_id).await?,
            transcript: self.engine.list_messages(negotiation_id).await?,
            session,
            rounds,
            stop_reason,
            proposal,
        })
    }

    /// The proposal materialized at consensus, drafted now if that step failed
    async fn proposal(&self, negotiation_id: &NegotiationId) -> Option<Proposal> {
        match self
            .engine
            .create_proposal_from_negotiation(negotiation_id, CreateProposalOptions::default())
            .await
        {
            Ok(proposal) => Some(proposal),
            Err(e) => {
                warn!("No proposal for {}: {}", negotiation_id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_application::{CompletionError, CompletionRequest};
    use accord_domain::{NegotiationPromptTemplate, ProposalStatus};
    use accord_infrastructure::InMemoryNegotiationStore;
    use async_trait::async_trait;

    /// Every agent consents; the judge answers with a fixed verdict.
    struct AgreeableCompletion {
        verdict: &'static str,
    }

    #[async_trait]
    impl CompletionService for AgreeableCompletion {
        async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
            let system = request.system_prompt.as_str();
            if system == NegotiationPromptTemplate::consensus_system() {
                Ok(self.verdict.to_string())
            } else if system == NegotiationPromptTemplate::response_system() {
                Ok("CONSENT:YES to OPT-A, $1,200 for the venue".to_string())
            } else {
                Err(CompletionError::InvalidResponse("unscripted".to_string()))
            }
        }
    }

    fn runner(
        verdict: &'static str,
    ) -> SimulationRunner<AgreeableCompletion, InMemoryNegotiationStore> {
        let engine = NegotiationEngine::new(
            Arc::new(AgreeableCompletion { verdict }),
            Arc::new(InMemoryNegotiationStore::new()),
        )
        .with_seed(7);
        SimulationRunner::new(
            Arc::new(engine),
            vec![AgentId::new("alice"), AgentId::new("bob"), AgentId::new("carol")],
        )
        .with_progress(ProgressMode::Silent)
    }

    #[tokio::test]
    async fn test_runs_until_consensus() {
        let report = runner("Consensus reached. terms: OPT-A at $1,200")
            .with_rounds(8)
            .run("Offsite venue", None)
            .await
            .unwrap();

        assert_eq!(report.stop_reason, StopReason::Consensus);
        assert_eq!(report.session.status, NegotiationStatus::Completed);
        assert!(report.rounds <= 8);
        assert!(report.transcript.len() >= 5);

        let proposal = report.proposal.unwrap();
        assert_eq!(proposal.status, ProposalStatus::Open);
        assert_eq!(proposal.title, "Negotiated: Offsite venue");
    }

    #[tokio::test]
    async fn test_round_limit_leaves_session_open() {
        let report = runner("No consensus yet.")
            .with_rounds(3)
            .run("Offsite venue", Some("Pick a venue"))
            .await
            .unwrap();

        assert_eq!(report.stop_reason, StopReason::RoundLimit);
        assert_eq!(report.rounds, 3);
        assert_eq!(report.session.status, NegotiationStatus::Active);
        assert_eq!(report.session.description.as_deref(), Some("Pick a venue"));
        assert!(report.proposal.is_none());

        let openers: Vec<&str> = report
            .transcript
            .iter()
            .filter(|m| {
                m.message
                    .metadata
                    .as_ref()
                    .is_some_and(|meta| !meta.contains_key("auto_response"))
            })
            .map(|m| m.message.agent_id.as_str())
            .collect();
        assert_eq!(openers, vec!["alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn test_cancelled_run_is_abandoned() {
        let token = CancellationToken::new();
        token.cancel();

        let report = runner("No consensus yet.")
            .with_cancellation(token)
            .run("Offsite venue", None)
            .await
            .unwrap();

        assert_eq!(report.stop_reason, StopReason::Cancelled);
        assert_eq!(report.rounds, 0);
        assert_eq!(report.session.status, NegotiationStatus::Abandoned);
        assert!(report.transcript.is_empty());
    }

    #[tokio::test]
    async fn test_single_agent_roster_is_rejected() {
        let engine = NegotiationEngine::new(
            Arc::new(AgreeableCompletion { verdict: "" }),
            Arc::new(InMemoryNegotiationStore::new()),
        );
        let result = SimulationRunner::new(Arc::new(engine), vec![AgentId::new("alice")])
            .with_progress(ProgressMode::Lines)
            .run("Solo", None)
            .await;
        assert!(matches!(result, Err(NegotiationError::Validation(_))));
    }
}
