//! In-memory negotiation store.
//!
//! One `RwLock` guards all tables so every port call sees a consistent
//! snapshot; uniqueness checks and inserts happen under the same write lock.

use accord_application::{NegotiationRepository, StoreError};
use accord_domain::{
    AgentId, MessageId, NegotiationId, NegotiationMessage, NegotiationReaction,
    NegotiationSession, Proposal, ProposalId,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct StoreState {
    sessions: HashMap<NegotiationId, NegotiationSession>,
    /// Append-only, in insertion order
    messages: Vec<NegotiationMessage>,
    message_index: HashMap<MessageId, usize>,
    reactions: Vec<NegotiationReaction>,
    proposals: HashMap<ProposalId, Proposal>,
    proposal_by_negotiation: HashMap<NegotiationId, ProposalId>,
    profiles: HashMap<AgentId, Value>,
}

#[derive(Default)]
pub struct InMemoryNegotiationStore {
    state: RwLock<StoreState>,
}

impl InMemoryNegotiationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace an agent's preference document.
    pub async fn put_preference_profile(&self, agent_id: AgentId, profile: Value) {
        self.state.write().await.profiles.insert(agent_id, profile);
    }

    pub async fn get_proposal(&self, id: &ProposalId) -> Option<Proposal> {
        self.state.read().await.proposals.get(id).cloned()
    }

    pub async fn proposal_count(&self) -> usize {
        self.state.read().await.proposals.len()
    }
}

#[async_trait]
impl NegotiationRepository for InMemoryNegotiationStore {
    async fn insert_session(&self, session: &NegotiationSession) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.sessions.contains_key(&session.id) {
            return Err(StoreError::Conflict(format!(
                "negotiation {} already exists",
                session.id
            )));
        }
        state.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn get_session(
        &self,
        id: &NegotiationId,
    ) -> Result<Option<NegotiationSession>, StoreError> {
        Ok(self.state.read().await.sessions.get(id).cloned())
    }

    async fn update_session(&self, session: &NegotiationSession) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        match state.sessions.get_mut(&session.id) {
            Some(stored) => {
                *stored = session.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("negotiation", session.id.as_str())),
        }
    }

    async fn append_message(&self, message: &NegotiationMessage) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.message_index.contains_key(&message.id) {
            return Err(StoreError::Conflict(format!(
                "message {} already exists",
                message.id
            )));
        }
        let index = state.messages.len();
        state.message_index.insert(message.id.clone(), index);
        state.messages.push(message.clone());
        Ok(())
    }

    async fn get_message(&self, id: &MessageId) -> Result<Option<NegotiationMessage>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .message_index
            .get(id)
            .and_then(|&i| state.messages.get(i))
            .cloned())
    }

    async fn list_messages(
        &self,
        negotiation_id: &NegotiationId,
    ) -> Result<Vec<NegotiationMessage>, StoreError> {
        let state = self.state.read().await;
        let mut messages: Vec<NegotiationMessage> = state
            .messages
            .iter()
            .filter(|m| &m.negotiation_id == negotiation_id)
            .cloned()
            .collect();
        // Stable: equal timestamps keep insertion order
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    async fn count_messages(&self, negotiation_id: &NegotiationId) -> Result<usize, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .messages
            .iter()
            .filter(|m| &m.negotiation_id == negotiation_id)
            .count())
    }

    async fn find_reaction(
        &self,
        message_id: &MessageId,
        agent_id: &AgentId,
        reaction_type: &str,
    ) -> Result<Option<NegotiationReaction>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .reactions
            .iter()
            .find(|r| r.matches(message_id, agent_id, reaction_type))
            .cloned())
    }

    async fn insert_reaction_if_absent(
        &self,
        reaction: NegotiationReaction,
    ) -> Result<NegotiationReaction, StoreError> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.reactions.iter().find(|r| {
            r.matches(&reaction.message_id, &reaction.agent_id, &reaction.reaction_type)
        }) {
            return Ok(existing.clone());
        }
        state.reactions.push(reaction.clone());
        Ok(reaction)
    }

    async fn delete_reaction(
        &self,
        message_id: &MessageId,
        agent_id: &AgentId,
        reaction_type: &str,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let before = state.reactions.len();
        state
            .reactions
            .retain(|r| !r.matches(message_id, agent_id, reaction_type));
        Ok(state.reactions.len() != before)
    }

    async fn reactions_for(
        &self,
        message_ids: &[MessageId],
    ) -> Result<Vec<NegotiationReaction>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .reactions
            .iter()
            .filter(|r| message_ids.contains(&r.message_id))
            .cloned()
            .collect())
    }

    async fn proposal_for_negotiation(
        &self,
        negotiation_id: &NegotiationId,
    ) -> Result<Option<Proposal>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .proposal_by_negotiation
            .get(negotiation_id)
            .and_then(|id| state.proposals.get(id))
            .cloned())
    }

    async fn insert_proposal(&self, proposal: &Proposal) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.proposals.contains_key(&proposal.id) {
            return Err(StoreError::Conflict(format!(
                "proposal {} already exists",
                proposal.id
            )));
        }
        if let Some(negotiation_id) = &proposal.negotiation_id {
            if state.proposal_by_negotiation.contains_key(negotiation_id) {
                return Err(StoreError::Conflict(format!(
                    "negotiation {} already has a proposal",
                    negotiation_id
                )));
            }
            state
                .proposal_by_negotiation
                .insert(negotiation_id.clone(), proposal.id.clone());
        }
        state.proposals.insert(proposal.id.clone(), proposal.clone());
        Ok(())
    }

    async fn preference_profile(&self, agent_id: &AgentId) -> Result<Option<Value>, StoreError> {
        Ok(self.state.read().await.profiles.get(agent_id).cloned())
    }
}
