//! Start Negotiation use case

use crate::error::NegotiationError;
use crate::ports::negotiation_logger::{NegotiationEvent, NegotiationLogger, events};
use crate::ports::repository::NegotiationRepository;
use accord_domain::{AgentId, NegotiationSession};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct StartNegotiationInput {
    pub topic: String,
    pub initiator_id: AgentId,
    pub description: Option<String>,
}

impl StartNegotiationInput {
    pub fn new(topic: impl Into<String>, initiator_id: impl Into<AgentId>) -> Self {
        Self {
            topic: topic.into(),
            initiator_id: initiator_id.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Opens a new active negotiation session
pub struct StartNegotiationUseCase<R: NegotiationRepository + 'static> {
    repository: Arc<R>,
    logger: Arc<dyn NegotiationLogger>,
}

impl<R: NegotiationRepository + 'static> StartNegotiationUseCase<R> {
    pub fn new(repository: Arc<R>, logger: Arc<dyn NegotiationLogger>) -> Self {
        Self { repository, logger }
    }

    pub async fn execute(
        &self,
        input: StartNegotiationInput,
    ) -> Result<NegotiationSession, NegotiationError> {
        let session = NegotiationSession::open(input.topic, input.initiator_id, input.description)?;
        self.repository.insert_session(&session).await?;

        info!(
            "Negotiation {} started by {}: {}",
            session.id, session.initiator_id, session.topic
        );
        self.logger.log(NegotiationEvent::new(
            events::NEGOTIATION_STARTED,
            json!({
                "negotiation_id": session.id,
                "topic": session.topic,
                "initiator_id": session.initiator_id,
            }),
        ));

        Ok(session)
    }
}
