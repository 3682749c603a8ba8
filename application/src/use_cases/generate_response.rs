//! Generate Response use case
//!
//! Builds a stage-specific prompt from the responding agent's stance and the
//! recent transcript, asks the completion service for the turn, classifies
//! the text by its protocol tags, and appends it to the message log.

use crate::config::EngineParams;
use crate::error::NegotiationError;
use crate::ports::completion::{
    CompletionError, CompletionRequest, CompletionService, ContextMessage,
};
use crate::ports::repository::NegotiationRepository;
use crate::use_cases::derive_stance::DeriveStanceUseCase;
use accord_domain::{
    AgentId, MessageId, MessageMetadata, NegotiationId, NegotiationMessage,
    NegotiationPromptTemplate, NegotiationStage, classify_message_type,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

pub struct GenerateResponseUseCase<
    C: CompletionService + 'static,
    R: NegotiationRepository + 'static,
> {
    completion: Arc<C>,
    repository: Arc<R>,
    stance: DeriveStanceUseCase<C, R>,
    params: EngineParams,
}

impl<C: CompletionService + 'static, R: NegotiationRepository + 'static>
    GenerateResponseUseCase<C, R>
{
    pub fn new(completion: Arc<C>, repository: Arc<R>, params: EngineParams) -> Self {
        Self {
            stance: DeriveStanceUseCase::new(
                Arc::clone(&completion),
                Arc::clone(&repository),
                params.clone(),
            ),
            completion,
            repository,
            params,
        }
    }

    /// Produce the text of `agent_id`'s next turn without storing it.
    pub async fn compose(
        &self,
        negotiation_id: &NegotiationId,
        agent_id: &AgentId,
        stage: NegotiationStage,
    ) -> Result<String, NegotiationError> {
        if !stage.is_open() {
            return Err(NegotiationError::validation(format!(
                "negotiation {} is {}",
                negotiation_id, stage
            )));
        }

        let session = self
            .repository
            .get_session(negotiation_id)
            .await?
            .ok_or_else(|| NegotiationError::not_found("negotiation", negotiation_id))?;

        let recent = self
            .repository
            .recent_messages(negotiation_id, self.params.transcript_window)
            .await?;

        let stance = self.stance.execute(agent_id, &session.topic).await;

        // The agent's own turns are replayed as assistant turns
        let context = recent
            .iter()
            .map(|m| {
                if &m.agent_id == agent_id {
                    ContextMessage::assistant(m.content.clone())
                } else {
                    ContextMessage::user(NegotiationPromptTemplate::context_line(m))
                }
            })
            .collect();

        let request = CompletionRequest::new(
            NegotiationPromptTemplate::response_system(),
            NegotiationPromptTemplate::response_prompt(&session, stage, &stance, agent_id.as_str()),
        )
        .with_context(context)
        .with_sampling(self.params.temperature, self.params.max_tokens);

        let text = self.completion.complete(request).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(CompletionError::InvalidResponse("empty completion".to_string()).into());
        }

        debug!("Composed {} turn for {} in {}", stage, agent_id, negotiation_id);
        Ok(text.to_string())
    }

    /// Compose, classify, and persist an auto-response.
    pub async fn execute(
        &self,
        negotiation_id: &NegotiationId,
        agent_id: &AgentId,
        stage: NegotiationStage,
        reply_to: Option<MessageId>,
    ) -> Result<NegotiationMessage, NegotiationError> {
        let content = self.compose(negotiation_id, agent_id, stage).await?;
        let message_type = classify_message_type(&content);

        let mut metadata = MessageMetadata::new();
        metadata.insert("stage".to_string(), json!(stage.as_str()));
        metadata.insert("auto_response".to_string(), json!(true));

        let message = NegotiationMessage::new(
            negotiation_id.clone(),
            agent_id.clone(),
            content,
            message_type,
        )
        .with_reference(reply_to)
        .with_metadata(Some(metadata));

        self.repository.append_message(&message).await?;
        Ok(message)
    }
}
