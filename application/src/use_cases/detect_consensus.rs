//! Detect Consensus use case
//!
//! Hands the full transcript (with reaction summaries) to the completion
//! service and classifies its free-text judgment.

use crate::config::EngineParams;
use crate::error::NegotiationError;
use crate::ports::completion::{CompletionRequest, CompletionService};
use crate::ports::negotiation_logger::{NegotiationEvent, NegotiationLogger, events};
use crate::ports::repository::NegotiationRepository;
use crate::use_cases::transcript::with_reactions;
use accord_domain::{
    AgreementTally, ConsensusClassifier, ConsensusJudgment, NegotiationId,
    NegotiationPromptTemplate, NegotiationStatus,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of one consensus check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusCheck {
    pub judgment: ConsensusJudgment,
    /// Advisory count of explicit consent; never overrides the judgment
    pub tally: AgreementTally,
    pub message_count: usize,
    /// False when the completion service was not consulted
    pub evaluated: bool,
}

impl ConsensusCheck {
    fn skipped(judgment: ConsensusJudgment, message_count: usize) -> Self {
        Self {
            judgment,
            tally: AgreementTally::default(),
            message_count,
            evaluated: false,
        }
    }

    pub fn reached(&self) -> bool {
        self.judgment.reached
    }

    pub fn near_miss(&self) -> bool {
        self.judgment.near_miss
    }
}

pub struct DetectConsensusUseCase<
    C: CompletionService + 'static,
    R: NegotiationRepository + 'static,
> {
    completion: Arc<C>,
    repository: Arc<R>,
    classifier: Arc<dyn ConsensusClassifier>,
    logger: Arc<dyn NegotiationLogger>,
    params: EngineParams,
}

impl<C: CompletionService + 'static, R: NegotiationRepository + 'static>
    DetectConsensusUseCase<C, R>
{
    pub fn new(
        completion: Arc<C>,
        repository: Arc<R>,
        classifier: Arc<dyn ConsensusClassifier>,
        logger: Arc<dyn NegotiationLogger>,
        params: EngineParams,
    ) -> Self {
        Self {
            completion,
            repository,
            classifier,
            logger,
            params,
        }
    }

    /// Judge the session's transcript.
    ///
    /// Terminal sessions map directly (completed → reached, abandoned → not)
    /// and short transcripts are never judged.
    pub async fn execute(
        &self,
        negotiation_id: &NegotiationId,
    ) -> Result<ConsensusCheck, NegotiationError> {
        let session = self
            .repository
            .get_session(negotiation_id)
            .await?
            .ok_or_else(|| NegotiationError::not_found("negotiation", negotiation_id))?;

        match session.status {
            NegotiationStatus::Completed => {
                let judgment = ConsensusJudgment {
                    reached: true,
                    ..ConsensusJudgment::none()
                };
                return Ok(ConsensusCheck::skipped(judgment, 0));
            }
            NegotiationStatus::Abandoned => {
                return Ok(ConsensusCheck::skipped(ConsensusJudgment::none(), 0));
            }
            NegotiationStatus::Active => {}
        }

        let messages = self.repository.list_messages(negotiation_id).await?;
        let message_count = messages.len();
        if message_count < self.params.min_messages_for_consensus {
            debug!(
                "Skipping consensus check for {}: {} messages",
                negotiation_id, message_count
            );
            return Ok(ConsensusCheck::skipped(
                ConsensusJudgment::none(),
                message_count,
            ));
        }

        let tally = AgreementTally::from_messages(&messages);
        let transcript = with_reactions(self.repository.as_ref(), messages).await?;

        let request = CompletionRequest::new(
            NegotiationPromptTemplate::consensus_system(),
            NegotiationPromptTemplate::consensus_prompt(&session, &transcript, &tally),
        )
        .with_sampling(self.params.temperature, self.params.max_tokens);

        let text = self.completion.complete(request).await?;
        let judgment = self.classifier.classify(&text);

        info!(
            "Consensus check for {}: reached={}, near_miss={}, tally {}",
            negotiation_id,
            judgment.reached,
            judgment.near_miss,
            tally.summary()
        );
        self.logger.log(NegotiationEvent::new(
            events::CONSENSUS_CHECKED,
            json!({
                "negotiation_id": negotiation_id,
                "reached": judgment.reached,
                "near_miss": judgment.near_miss,
                "terms": judgment.terms,
                "tally_percentage": tally.percentage(),
                "message_count": message_count,
            }),
        ));

        Ok(ConsensusCheck {
            judgment,
            tally,
            message_count,
            evaluated: true,
        })
    }
}
