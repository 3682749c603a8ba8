//! Create Proposal From Negotiation use case
//!
//! The externally triggered variant of materialization. Drafts a readable
//! title, description, and summary with the completion service and falls
//! back to templated text when the draft cannot be used.

use crate::config::EngineParams;
use crate::error::NegotiationError;
use crate::ports::completion::{CompletionRequest, CompletionService};
use crate::ports::negotiation_logger::NegotiationLogger;
use crate::ports::repository::NegotiationRepository;
use crate::use_cases::detect_consensus::DetectConsensusUseCase;
use crate::use_cases::finalize_negotiation::{
    FinalizeNegotiationUseCase, MaterializeInput, NegotiationOutcome,
};
use crate::use_cases::transcript::with_reactions;
use accord_domain::{
    ConsensusClassifier, DecisionClass, MessageType, NegotiationId, NegotiationPromptTemplate,
    NegotiationStatus, Proposal, ProposalContent, extract_amount, fallback_draft, parse_draft,
};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct CreateProposalOptions {
    /// Conclude an active session first if a fresh consensus check confirms agreement
    pub auto_create: bool,
    /// Overrides the class stated in the consensus judgment
    pub decision_class: Option<DecisionClass>,
}

impl CreateProposalOptions {
    pub fn auto_create() -> Self {
        Self {
            auto_create: true,
            decision_class: None,
        }
    }

    pub fn with_decision_class(mut self, class: DecisionClass) -> Self {
        self.decision_class = Some(class);
        self
    }
}

pub struct CreateProposalUseCase<C: CompletionService + 'static, R: NegotiationRepository + 'static>
{
    completion: Arc<C>,
    repository: Arc<R>,
    detect: DetectConsensusUseCase<C, R>,
    finalize: FinalizeNegotiationUseCase<R>,
    params: EngineParams,
}

impl<C: CompletionService + 'static, R: NegotiationRepository + 'static> CreateProposalUseCase<C, R> {
    pub fn new(
        completion: Arc<C>,
        repository: Arc<R>,
        classifier: Arc<dyn ConsensusClassifier>,
        logger: Arc<dyn NegotiationLogger>,
        params: EngineParams,
    ) -> Self {
        Self {
            detect: DetectConsensusUseCase::new(
                Arc::clone(&completion),
                Arc::clone(&repository),
                classifier,
                Arc::clone(&logger),
                params.clone(),
            ),
            finalize: FinalizeNegotiationUseCase::new(
                Arc::clone(&repository),
                logger,
                params.materialization_policy(),
            ),
            completion,
            repository,
            params,
        }
    }

    pub async fn execute(
        &self,
        negotiation_id: &NegotiationId,
        options: CreateProposalOptions,
    ) -> Result<Proposal, NegotiationError> {
        let mut session = self
            .repository
            .get_session(negotiation_id)
            .await?
            .ok_or_else(|| NegotiationError::not_found("negotiation", negotiation_id))?;

        if let Some(existing) = self.repository.proposal_for_negotiation(negotiation_id).await? {
            return Ok(existing);
        }

        let mut block = None;
        let mut terms = None;
        match session.status {
            NegotiationStatus::Completed => {}
            NegotiationStatus::Abandoned => {
                return Err(NegotiationError::validation(format!(
                    "negotiation {} was abandoned",
                    negotiation_id
                )));
            }
            NegotiationStatus::Active if !options.auto_create => {
                return Err(NegotiationError::validation(format!(
                    "negotiation {} is not completed",
                    negotiation_id
                )));
            }
            NegotiationStatus::Active => {
                let check = self.detect.execute(negotiation_id).await.map_err(|e| {
                    NegotiationError::validation(format!("consensus could not be confirmed: {e}"))
                })?;
                if !check.reached() {
                    return Err(NegotiationError::validation(format!(
                        "negotiation {} has not reached consensus",
                        negotiation_id
                    )));
                }
                block = check.judgment.block;
                terms = check.judgment.terms;
                session = self
                    .finalize
                    .execute(negotiation_id, NegotiationOutcome::concluded())
                    .await?
                    .session;
            }
        }

        let messages = self.repository.list_messages(negotiation_id).await?;
        let amount = messages.iter().find_map(|m| extract_amount(&m.content));
        let last_agreement = messages
            .iter()
            .rev()
            .find(|m| m.message_type == MessageType::Agreement)
            .map(|m| m.content.clone());
        let message_count = messages.len();
        let transcript = with_reactions(self.repository.as_ref(), messages).await?;

        let request = CompletionRequest::new(
            NegotiationPromptTemplate::proposal_system(),
            NegotiationPromptTemplate::proposal_prompt(&session, &transcript, block.as_ref()),
        )
        .with_sampling(self.params.temperature, self.params.max_tokens);

        let fallback = || {
            fallback_draft(
                &session.topic,
                last_agreement.as_deref(),
                terms.as_deref(),
                message_count,
            )
        };
        let content: ProposalContent = match self.completion.complete(request).await {
            Ok(text) => parse_draft(&text).unwrap_or_else(|e| {
                warn!("Proposal draft for {} unusable ({}), using template", negotiation_id, e);
                fallback()
            }),
            Err(e) => {
                warn!("Proposal drafting for {} failed ({}), using template", negotiation_id, e);
                fallback()
            }
        };

        let decision_class = options
            .decision_class
            .or_else(|| block.as_ref().map(|b| b.decision_class));

        let proposal = self
            .finalize
            .materialize(MaterializeInput {
                session: &session,
                content,
                amount,
                decision_class,
                block,
            })
            .await?;

        info!("Proposal {} ready for negotiation {}", proposal.id, negotiation_id);
        Ok(proposal)
    }
}
