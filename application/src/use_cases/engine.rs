//! Negotiation engine facade
//!
//! One entry point for the caller-facing operations. Assembles the use cases
//! over a shared completion service, repository, classifier, and logger.

use crate::config::EngineParams;
use crate::error::NegotiationError;
use crate::ports::completion::CompletionService;
use crate::ports::negotiation_logger::{NegotiationLogger, NoNegotiationLogger};
use crate::ports::progress::NegotiationProgress;
use crate::ports::repository::NegotiationRepository;
use crate::use_cases::create_proposal::{CreateProposalOptions, CreateProposalUseCase};
use crate::use_cases::detect_consensus::{ConsensusCheck, DetectConsensusUseCase};
use crate::use_cases::finalize_negotiation::{
    FinalizeNegotiationUseCase, FinalizeOutput, NegotiationOutcome,
};
use crate::use_cases::process_message::{
    ProcessMessageInput, ProcessMessageOutput, ProcessMessageUseCase,
};
use crate::use_cases::reactions::ReactionLedgerUseCase;
use crate::use_cases::start_negotiation::{StartNegotiationInput, StartNegotiationUseCase};
use crate::use_cases::transcript::{participants, with_reactions};
use accord_domain::{
    AgentId, ConsensusClassifier, MessageId, MessageWithReactions, NegotiationId,
    NegotiationReaction, NegotiationSession, NegotiationStage, Proposal,
    SubstringConsensusClassifier,
};
use std::sync::Arc;

struct EngineParts<C, R> {
    completion: Arc<C>,
    repository: Arc<R>,
    classifier: Arc<dyn ConsensusClassifier>,
    logger: Arc<dyn NegotiationLogger>,
    params: EngineParams,
    seed: Option<u64>,
}

pub struct NegotiationEngine<C: CompletionService + 'static, R: NegotiationRepository + 'static> {
    parts: EngineParts<C, R>,
    start: StartNegotiationUseCase<R>,
    process: ProcessMessageUseCase<C, R>,
    detect: DetectConsensusUseCase<C, R>,
    finalize: FinalizeNegotiationUseCase<R>,
    proposals: CreateProposalUseCase<C, R>,
    reactions: ReactionLedgerUseCase<R>,
}

impl<C: CompletionService + 'static, R: NegotiationRepository + 'static> NegotiationEngine<C, R> {
    pub fn new(completion: Arc<C>, repository: Arc<R>) -> Self {
        Self::assemble(EngineParts {
            completion,
            repository,
            classifier: Arc::new(SubstringConsensusClassifier),
            logger: Arc::new(NoNegotiationLogger),
            params: EngineParams::default(),
            seed: None,
        })
    }

    pub fn with_params(self, params: EngineParams) -> Self {
        Self::assemble(EngineParts {
            params,
            ..self.parts
        })
    }

    pub fn with_logger(self, logger: Arc<dyn NegotiationLogger>) -> Self {
        Self::assemble(EngineParts {
            logger,
            ..self.parts
        })
    }

    pub fn with_classifier(self, classifier: Arc<dyn ConsensusClassifier>) -> Self {
        Self::assemble(EngineParts {
            classifier,
            ..self.parts
        })
    }

    /// Make respondent selection reproducible.
    pub fn with_seed(self, seed: u64) -> Self {
        Self::assemble(EngineParts {
            seed: Some(seed),
            ..self.parts
        })
    }

    fn assemble(parts: EngineParts<C, R>) -> Self {
        let EngineParts {
            completion,
            repository,
            classifier,
            logger,
            params,
            seed,
        } = &parts;

        let process = ProcessMessageUseCase::new(
            Arc::clone(completion),
            Arc::clone(repository),
            Arc::clone(classifier),
            Arc::clone(logger),
            params.clone(),
        );
        let process = match seed {
            Some(seed) => process.with_seed(*seed),
            None => process,
        };

        Self {
            start: StartNegotiationUseCase::new(Arc::clone(repository), Arc::clone(logger)),
            process,
            detect: DetectConsensusUseCase::new(
                Arc::clone(completion),
                Arc::clone(repository),
                Arc::clone(classifier),
                Arc::clone(logger),
                params.clone(),
            ),
            finalize: FinalizeNegotiationUseCase::new(
                Arc::clone(repository),
                Arc::clone(logger),
                params.materialization_policy(),
            ),
            proposals: CreateProposalUseCase::new(
                Arc::clone(completion),
                Arc::clone(repository),
                Arc::clone(classifier),
                Arc::clone(logger),
                params.clone(),
            ),
            reactions: ReactionLedgerUseCase::new(Arc::clone(repository), Arc::clone(logger)),
            parts,
        }
    }

    pub fn params(&self) -> &EngineParams {
        &self.parts.params
    }

    pub async fn start_negotiation(
        &self,
        input: StartNegotiationInput,
    ) -> Result<NegotiationSession, NegotiationError> {
        self.start.execute(input).await
    }

    pub async fn process_message(
        &self,
        negotiation_id: &NegotiationId,
        input: ProcessMessageInput,
    ) -> Result<ProcessMessageOutput, NegotiationError> {
        self.process.execute(negotiation_id, input).await
    }

    pub async fn process_message_with_progress(
        &self,
        negotiation_id: &NegotiationId,
        input: ProcessMessageInput,
        progress: &dyn NegotiationProgress,
    ) -> Result<ProcessMessageOutput, NegotiationError> {
        self.process
            .execute_with_progress(negotiation_id, input, progress)
            .await
    }

    /// Let `agent_id`'s representative compose and post its next turn.
    pub async fn post_generated_turn(
        &self,
        negotiation_id: &NegotiationId,
        agent_id: &AgentId,
        progress: &dyn NegotiationProgress,
    ) -> Result<ProcessMessageOutput, NegotiationError> {
        self.process
            .post_generated_turn(negotiation_id, agent_id, progress)
            .await
    }

    pub async fn add_reaction(
        &self,
        message_id: &MessageId,
        agent_id: &AgentId,
        reaction_type: &str,
    ) -> Result<NegotiationReaction, NegotiationError> {
        self.reactions.add(message_id, agent_id, reaction_type).await
    }

    pub async fn remove_reaction(
        &self,
        message_id: &MessageId,
        agent_id: &AgentId,
        reaction_type: &str,
    ) -> Result<bool, NegotiationError> {
        self.reactions
            .remove(message_id, agent_id, reaction_type)
            .await
    }

    pub async fn finalize_negotiation(
        &self,
        negotiation_id: &NegotiationId,
        outcome: NegotiationOutcome,
    ) -> Result<FinalizeOutput, NegotiationError> {
        self.finalize.execute(negotiation_id, outcome).await
    }

    pub async fn create_proposal_from_negotiation(
        &self,
        negotiation_id: &NegotiationId,
        options: CreateProposalOptions,
    ) -> Result<Proposal, NegotiationError> {
        self.proposals.execute(negotiation_id, options).await
    }

    pub async fn detect_consensus(
        &self,
        negotiation_id: &NegotiationId,
    ) -> Result<ConsensusCheck, NegotiationError> {
        self.detect.execute(negotiation_id).await
    }

    pub async fn get_negotiation(
        &self,
        negotiation_id: &NegotiationId,
    ) -> Result<NegotiationSession, NegotiationError> {
        self.parts
            .repository
            .get_session(negotiation_id)
            .await?
            .ok_or_else(|| NegotiationError::not_found("negotiation", negotiation_id))
    }

    /// Transcript with reactions, oldest first
    pub async fn list_messages(
        &self,
        negotiation_id: &NegotiationId,
    ) -> Result<Vec<MessageWithReactions>, NegotiationError> {
        self.get_negotiation(negotiation_id).await?;
        let messages = self.parts.repository.list_messages(negotiation_id).await?;
        Ok(with_reactions(self.parts.repository.as_ref(), messages).await?)
    }

    pub async fn current_stage(
        &self,
        negotiation_id: &NegotiationId,
    ) -> Result<NegotiationStage, NegotiationError> {
        let session = self.get_negotiation(negotiation_id).await?;
        let count = self.parts.repository.count_messages(negotiation_id).await?;
        Ok(NegotiationStage::classify(session.status, count))
    }

    /// Distinct message authors, in order of first post
    pub async fn participants(
        &self,
        negotiation_id: &NegotiationId,
    ) -> Result<Vec<AgentId>, NegotiationError> {
        self.get_negotiation(negotiation_id).await?;
        let messages = self.parts.repository.list_messages(negotiation_id).await?;
        Ok(participants(&messages))
    }
}
