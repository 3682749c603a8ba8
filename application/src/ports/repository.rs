//! Negotiation repository port
//!
//! Persistence for sessions, the append-only message log, reactions,
//! proposals, and the read-only agent preference profiles.

use async_trait::async_trait;
use accord_domain::{
    AgentId, MessageId, NegotiationId, NegotiationMessage, NegotiationReaction,
    NegotiationSession, Proposal,
};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Storage contract used by the negotiation use cases
///
/// Every mutation is a single-row insert, update, or delete. Messages are
/// returned ordered by `(timestamp, insertion order)`.
#[async_trait]
pub trait NegotiationRepository: Send + Sync {
    async fn insert_session(&self, session: &NegotiationSession) -> Result<(), StoreError>;

    async fn get_session(&self, id: &NegotiationId)
    -> Result<Option<NegotiationSession>, StoreError>;

    /// Replace a stored session; `NotFound` if it was never inserted
    async fn update_session(&self, session: &NegotiationSession) -> Result<(), StoreError>;

    async fn append_message(&self, message: &NegotiationMessage) -> Result<(), StoreError>;

    async fn get_message(&self, id: &MessageId) -> Result<Option<NegotiationMessage>, StoreError>;

    /// All messages of a session, oldest first
    async fn list_messages(
        &self,
        negotiation_id: &NegotiationId,
    ) -> Result<Vec<NegotiationMessage>, StoreError>;

    /// The last `limit` messages of a session, oldest first
    async fn recent_messages(
        &self,
        negotiation_id: &NegotiationId,
        limit: usize,
    ) -> Result<Vec<NegotiationMessage>, StoreError> {
        let mut messages = self.list_messages(negotiation_id).await?;
        let skip = messages.len().saturating_sub(limit);
        Ok(messages.split_off(skip))
    }

    async fn count_messages(&self, negotiation_id: &NegotiationId) -> Result<usize, StoreError> {
        Ok(self.list_messages(negotiation_id).await?.len())
    }

    async fn find_reaction(
        &self,
        message_id: &MessageId,
        agent_id: &AgentId,
        reaction_type: &str,
    ) -> Result<Option<NegotiationReaction>, StoreError>;

    /// Insert unless the `(message, agent, type)` tuple exists; returns the stored row
    async fn insert_reaction_if_absent(
        &self,
        reaction: NegotiationReaction,
    ) -> Result<NegotiationReaction, StoreError>;

    /// Returns whether a row was deleted
    async fn delete_reaction(
        &self,
        message_id: &MessageId,
        agent_id: &AgentId,
        reaction_type: &str,
    ) -> Result<bool, StoreError>;

    /// Reactions attached to any of the given messages, oldest first
    async fn reactions_for(
        &self,
        message_ids: &[MessageId],
    ) -> Result<Vec<NegotiationReaction>, StoreError>;

    async fn proposal_for_negotiation(
        &self,
        negotiation_id: &NegotiationId,
    ) -> Result<Option<Proposal>, StoreError>;

    /// `Conflict` if a proposal is already linked to the same negotiation
    async fn insert_proposal(&self, proposal: &Proposal) -> Result<(), StoreError>;

    /// Stored preference document of an agent, if any
    async fn preference_profile(&self, agent_id: &AgentId) -> Result<Option<Value>, StoreError>;
}
