//! Reaction Ledger use case
//!
//! Idempotent add and silent remove of `(message, agent, reaction type)`
//! markers.

use crate::error::NegotiationError;
use crate::ports::negotiation_logger::{NegotiationEvent, NegotiationLogger, events};
use crate::ports::repository::NegotiationRepository;
use accord_domain::{AgentId, MessageId, NegotiationReaction, normalize_reaction_type};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

pub struct ReactionLedgerUseCase<R: NegotiationRepository + 'static> {
    repository: Arc<R>,
    logger: Arc<dyn NegotiationLogger>,
}

impl<R: NegotiationRepository + 'static> ReactionLedgerUseCase<R> {
    pub fn new(repository: Arc<R>, logger: Arc<dyn NegotiationLogger>) -> Self {
        Self { repository, logger }
    }

    /// Add a reaction, or return the identical one already stored.
    pub async fn add(
        &self,
        message_id: &MessageId,
        agent_id: &AgentId,
        reaction_type: &str,
    ) -> Result<NegotiationReaction, NegotiationError> {
        let reaction_type = normalize_reaction_type(reaction_type)?;

        let message = self
            .repository
            .get_message(message_id)
            .await?
            .ok_or_else(|| NegotiationError::not_found("message", message_id))?;

        if let Some(existing) = self
            .repository
            .find_reaction(message_id, agent_id, &reaction_type)
            .await?
        {
            debug!("Reaction {} by {} on {} already present", reaction_type, agent_id, message_id);
            return Ok(existing);
        }

        let reaction =
            NegotiationReaction::new(message_id.clone(), agent_id.clone(), reaction_type)?;
        let stored = self.repository.insert_reaction_if_absent(reaction).await?;

        self.logger.log(NegotiationEvent::new(
            events::REACTION_ADDED,
            json!({
                "negotiation_id": message.negotiation_id,
                "message_id": message_id,
                "agent_id": agent_id,
                "reaction_type": stored.reaction_type,
            }),
        ));
        Ok(stored)
    }

    /// Remove a reaction; returns whether one existed. Missing rows are not an error.
    pub async fn remove(
        &self,
        message_id: &MessageId,
        agent_id: &AgentId,
        reaction_type: &str,
    ) -> Result<bool, NegotiationError> {
        let reaction_type = reaction_type.trim();
        if reaction_type.is_empty() {
            return Ok(false);
        }

        let removed = self
            .repository
            .delete_reaction(message_id, agent_id, reaction_type)
            .await?;

        if removed {
            self.logger.log(NegotiationEvent::new(
                events::REACTION_REMOVED,
                json!({
                    "message_id": message_id,
                    "agent_id": agent_id,
                    "reaction_type": reaction_type,
                }),
            ));
        }
        Ok(removed)
    }
}
