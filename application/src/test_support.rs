//! Shared test doubles for the use-case tests.

use crate::ports::completion::{CompletionError, CompletionRequest, CompletionService};
use crate::ports::negotiation_logger::{NegotiationEvent, NegotiationLogger};
use crate::ports::repository::{NegotiationRepository, StoreError};
use accord_domain::{
    AgentId, MessageId, MessageType, NegotiationId, NegotiationMessage,
    NegotiationPromptTemplate, NegotiationReaction, NegotiationSession, Proposal,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Which prompt family a request belongs to, by system prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Stance,
    Response,
    Consensus,
    Proposal,
}

impl CallKind {
    fn of(request: &CompletionRequest) -> Self {
        let system = request.system_prompt.as_str();
        if system == NegotiationPromptTemplate::stance_system() {
            CallKind::Stance
        } else if system == NegotiationPromptTemplate::consensus_system() {
            CallKind::Consensus
        } else if system == NegotiationPromptTemplate::proposal_system() {
            CallKind::Proposal
        } else {
            CallKind::Response
        }
    }
}

/// Completion service answering from per-kind queues.
///
/// Empty queues fall back to: stance → invalid response (heuristic stance),
/// response → a plain statement, consensus → "No consensus yet.",
/// proposal → invalid response (templated draft).
#[derive(Default)]
pub struct ScriptedCompletion {
    queues: Mutex<HashMap<CallKind, VecDeque<Result<String, CompletionError>>>>,
    requests: Mutex<Vec<(CallKind, CompletionRequest)>>,
    delays: Mutex<HashMap<String, Duration>>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, kind: CallKind, response: Result<String, CompletionError>) -> &Self {
        self.queues
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push_back(response);
        self
    }

    pub fn push_ok(&self, kind: CallKind, text: &str) -> &Self {
        self.push(kind, Ok(text.to_string()))
    }

    /// Delay response calls whose prompt names `agent`
    pub fn delay_agent(&self, agent: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(agent.to_string(), delay);
    }

    pub fn calls(&self, kind: CallKind) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    pub fn requests(&self, kind: CallKind) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, r)| r.clone())
            .collect()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let kind = CallKind::of(&request);

        let delay = if kind == CallKind::Response {
            self.delays
                .lock()
                .unwrap()
                .iter()
                .find(|(agent, _)| {
                    request
                        .user_prompt
                        .contains(&format!("You are representing {}.", agent))
                })
                .map(|(_, d)| *d)
        } else {
            None
        };

        self.requests.lock().unwrap().push((kind, request));

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self
            .queues
            .lock()
            .unwrap()
            .get_mut(&kind)
            .and_then(|q| q.pop_front());

        scripted.unwrap_or_else(|| match kind {
            CallKind::Stance | CallKind::Proposal => {
                Err(CompletionError::InvalidResponse("unscripted".to_string()))
            }
            CallKind::Response => Ok("I hear the concerns raised so far.".to_string()),
            CallKind::Consensus => Ok("No consensus yet.".to_string()),
        })
    }
}

/// Repository operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    UpdateSession,
    ListMessages,
    /// Appending a `System` message; other appends still succeed
    AppendSystemMessage,
}

/// Minimal in-memory repository
#[derive(Default)]
pub struct MemoryRepository {
    failing: Mutex<HashSet<StoreOp>>,
    sessions: Mutex<HashMap<NegotiationId, NegotiationSession>>,
    messages: Mutex<Vec<NegotiationMessage>>,
    reactions: Mutex<Vec<NegotiationReaction>>,
    proposals: Mutex<Vec<Proposal>>,
    profiles: Mutex<HashMap<AgentId, Value>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_profile(&self, agent: &str, profile: Value) {
        self.profiles
            .lock()
            .unwrap()
            .insert(AgentId::new(agent), profile);
    }

    /// Make every later `op` return a backend error
    pub fn fail(&self, op: StoreOp) {
        self.failing.lock().unwrap().insert(op);
    }

    fn check(&self, op: StoreOp) -> Result<(), StoreError> {
        if self.failing.lock().unwrap().contains(&op) {
            return Err(StoreError::Backend("db down".to_string()));
        }
        Ok(())
    }

    pub fn proposal_count(&self) -> usize {
        self.proposals.lock().unwrap().len()
    }

    pub fn reaction_count(&self) -> usize {
        self.reactions.lock().unwrap().len()
    }
}

#[async_trait]
impl NegotiationRepository for MemoryRepository {
    async fn insert_session(&self, session: &NegotiationSession) -> Result<(), StoreError> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn get_session(
        &self,
        id: &NegotiationId,
    ) -> Result<Option<NegotiationSession>, StoreError> {
        Ok(self.sessions.lock().unwrap().get(id).cloned())
    }

    async fn update_session(&self, session: &NegotiationSession) -> Result<(), StoreError> {
        self.check(StoreOp::UpdateSession)?;
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(&session.id) {
            Some(stored) => {
                *stored = session.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("negotiation", session.id.as_str())),
        }
    }

    async fn append_message(&self, message: &NegotiationMessage) -> Result<(), StoreError> {
        if message.message_type == MessageType::System {
            self.check(StoreOp::AppendSystemMessage)?;
        }
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn get_message(&self, id: &MessageId) -> Result<Option<NegotiationMessage>, StoreError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .find(|m| &m.id == id)
            .cloned())
    }

    async fn list_messages(
        &self,
        negotiation_id: &NegotiationId,
    ) -> Result<Vec<NegotiationMessage>, StoreError> {
        self.check(StoreOp::ListMessages)?;
        let mut messages: Vec<_> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| &m.negotiation_id == negotiation_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    async fn find_reaction(
        &self,
        message_id: &MessageId,
        agent_id: &AgentId,
        reaction_type: &str,
    ) -> Result<Option<NegotiationReaction>, StoreError> {
        Ok(self
            .reactions
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.matches(message_id, agent_id, reaction_type))
            .cloned())
    }

    async fn insert_reaction_if_absent(
        &self,
        reaction: NegotiationReaction,
    ) -> Result<NegotiationReaction, StoreError> {
        let mut reactions = self.reactions.lock().unwrap();
        if let Some(existing) = reactions.iter().find(|r| {
            r.matches(&reaction.message_id, &reaction.agent_id, &reaction.reaction_type)
        }) {
            return Ok(existing.clone());
        }
        reactions.push(reaction.clone());
        Ok(reaction)
    }

    async fn delete_reaction(
        &self,
        message_id: &MessageId,
        agent_id: &AgentId,
        reaction_type: &str,
    ) -> Result<bool, StoreError> {
        let mut reactions = self.reactions.lock().unwrap();
        let before = reactions.len();
        reactions.retain(|r| !r.matches(message_id, agent_id, reaction_type));
        Ok(reactions.len() != before)
    }

    async fn reactions_for(
        &self,
        message_ids: &[MessageId],
    ) -> Result<Vec<NegotiationReaction>, StoreError> {
        Ok(self
            .reactions
            .lock()
            .unwrap()
            .iter()
            .filter(|r| message_ids.contains(&r.message_id))
            .cloned()
            .collect())
    }

    async fn proposal_for_negotiation(
        &self,
        negotiation_id: &NegotiationId,
    ) -> Result<Option<Proposal>, StoreError> {
        Ok(self
            .proposals
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.negotiation_id.as_ref() == Some(negotiation_id))
            .cloned())
    }

    async fn insert_proposal(&self, proposal: &Proposal) -> Result<(), StoreError> {
        let mut proposals = self.proposals.lock().unwrap();
        if proposal.negotiation_id.is_some()
            && proposals
                .iter()
                .any(|p| p.negotiation_id == proposal.negotiation_id)
        {
            return Err(StoreError::Conflict("proposal already linked".to_string()));
        }
        proposals.push(proposal.clone());
        Ok(())
    }

    async fn preference_profile(&self, agent_id: &AgentId) -> Result<Option<Value>, StoreError> {
        Ok(self.profiles.lock().unwrap().get(agent_id).cloned())
    }
}

/// Logger that keeps event types in memory
#[derive(Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<(String, Value)>>,
}

impl RecordingLogger {
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(t, _)| t.clone())
            .collect()
    }

    pub fn count(&self, event_type: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == event_type)
            .count()
    }
}

impl NegotiationLogger for RecordingLogger {
    fn log(&self, event: NegotiationEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type.to_string(), event.payload));
    }
}
