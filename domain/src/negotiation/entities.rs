//! Negotiation entities - the persisted records of a negotiation.
//!
//! - [`NegotiationSession`] - one negotiation on one topic
//! - [`NegotiationMessage`] - an immutable entry in the session's append-only log
//! - [`NegotiationReaction`] - a per-agent marker attached to a message
//!
//! Sessions own messages, messages own reactions. The
//! `referenced_message_id` on a message is a weak lookup-only reference:
//! the referenced message may be absent without invalidating the referrer.

use crate::core::error::DomainError;
use crate::core::ids::{AgentId, MessageId, NegotiationId, ReactionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle status of a negotiation session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NegotiationStatus {
    #[default]
    Active,
    Completed,
    Abandoned,
}

impl NegotiationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NegotiationStatus::Active => "active",
            NegotiationStatus::Completed => "completed",
            NegotiationStatus::Abandoned => "abandoned",
        }
    }

    /// Completed and abandoned sessions accept no further messages.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, NegotiationStatus::Active)
    }
}

impl std::fmt::Display for NegotiationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NegotiationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(NegotiationStatus::Active),
            "completed" => Ok(NegotiationStatus::Completed),
            "abandoned" => Ok(NegotiationStatus::Abandoned),
            other => Err(DomainError::UnknownVariant {
                kind: "negotiation status",
                value: other.to_string(),
            }),
        }
    }
}

/// A negotiation session (Entity)
///
/// Created on negotiation start. Only the finalizer mutates it, and only
/// `status` and `completed_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationSession {
    pub id: NegotiationId,
    pub topic: String,
    pub description: Option<String>,
    pub initiator_id: AgentId,
    pub status: NegotiationStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl NegotiationSession {
    /// Open a new active session.
    ///
    /// Fails if the topic is empty or whitespace.
    pub fn open(
        topic: impl Into<String>,
        initiator_id: AgentId,
        description: Option<String>,
    ) -> Result<Self, DomainError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(DomainError::InvalidTopic(
                "topic cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            id: NegotiationId::generate(),
            topic: topic.trim().to_string(),
            description: description.filter(|d| !d.trim().is_empty()),
            initiator_id,
            status: NegotiationStatus::Active,
            started_at: Utc::now(),
            completed_at: None,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == NegotiationStatus::Active
    }

    /// Move the session into a terminal state.
    pub fn conclude(&mut self, status: NegotiationStatus, at: DateTime<Utc>) {
        self.status = status;
        self.completed_at = Some(at);
    }
}

/// Kind of a negotiation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Statement,
    Proposal,
    Question,
    Agreement,
    Disagreement,
    System,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Statement => "statement",
            MessageType::Proposal => "proposal",
            MessageType::Question => "question",
            MessageType::Agreement => "agreement",
            MessageType::Disagreement => "disagreement",
            MessageType::System => "system",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MessageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "statement" => Ok(MessageType::Statement),
            "proposal" => Ok(MessageType::Proposal),
            "question" => Ok(MessageType::Question),
            "agreement" => Ok(MessageType::Agreement),
            "disagreement" => Ok(MessageType::Disagreement),
            "system" => Ok(MessageType::System),
            other => Err(DomainError::UnknownVariant {
                kind: "message type",
                value: other.to_string(),
            }),
        }
    }
}

/// Opaque key/value metadata attached to a message
pub type MessageMetadata = BTreeMap<String, serde_json::Value>;

/// A message in a negotiation (Entity, immutable once created)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationMessage {
    pub id: MessageId,
    pub negotiation_id: NegotiationId,
    pub agent_id: AgentId,
    pub content: String,
    pub message_type: MessageType,
    pub referenced_message_id: Option<MessageId>,
    pub metadata: Option<MessageMetadata>,
    pub timestamp: DateTime<Utc>,
}

impl NegotiationMessage {
    /// Create a new message stamped with the current time.
    pub fn new(
        negotiation_id: NegotiationId,
        agent_id: AgentId,
        content: impl Into<String>,
        message_type: MessageType,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            negotiation_id,
            agent_id,
            content: content.into(),
            message_type,
            referenced_message_id: None,
            metadata: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_reference(mut self, referenced: Option<MessageId>) -> Self {
        self.referenced_message_id = referenced;
        self
    }

    pub fn with_metadata(mut self, metadata: Option<MessageMetadata>) -> Self {
        self.metadata = metadata.filter(|m| !m.is_empty());
        self
    }
}

/// A reaction marker on a message (Entity)
///
/// At most one row exists per `(message_id, agent_id, reaction_type)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationReaction {
    pub id: ReactionId,
    pub message_id: MessageId,
    pub agent_id: AgentId,
    pub reaction_type: String,
    pub created_at: DateTime<Utc>,
}

impl NegotiationReaction {
    pub fn new(
        message_id: MessageId,
        agent_id: AgentId,
        reaction_type: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let reaction_type = normalize_reaction_type(&reaction_type.into())?;
        Ok(Self {
            id: ReactionId::generate(),
            message_id,
            agent_id,
            reaction_type,
            created_at: Utc::now(),
        })
    }

    /// Whether this row occupies the given uniqueness tuple.
    pub fn matches(&self, message_id: &MessageId, agent_id: &AgentId, reaction_type: &str) -> bool {
        &self.message_id == message_id
            && &self.agent_id == agent_id
            && self.reaction_type == reaction_type
    }
}

/// Trim a free-form reaction tag and reject empty ones.
pub fn normalize_reaction_type(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidReaction(
            "reaction type cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// A message together with the reactions attached to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageWithReactions {
    pub message: NegotiationMessage,
    pub reactions: Vec<NegotiationReaction>,
}

impl MessageWithReactions {
    /// Reaction tags with their counts, in first-seen order, e.g. `support×2, like×1`.
    pub fn reaction_summary(&self) -> Vec<(String, usize)> {
        let mut summary: Vec<(String, usize)> = Vec::new();
        for reaction in &self.reactions {
            match summary.iter_mut().find(|(tag, _)| *tag == reaction.reaction_type) {
                Some((_, count)) => *count += 1,
                None => summary.push((reaction.reaction_type.clone(), 1)),
            }
        }
        summary
    }
}
