//! Transcript assembly shared by the read path, consensus detection, and
//! proposal drafting.

use crate::ports::repository::{NegotiationRepository, StoreError};
use accord_domain::{AgentId, MessageId, MessageWithReactions, NegotiationMessage};

/// Attach reactions to each message, preserving message order.
pub(crate) async fn with_reactions<R: NegotiationRepository + ?Sized>(
    repository: &R,
    messages: Vec<NegotiationMessage>,
) -> Result<Vec<MessageWithReactions>, StoreError> {
    let ids: Vec<MessageId> = messages.iter().map(|m| m.id.clone()).collect();
    let reactions = repository.reactions_for(&ids).await?;

    Ok(messages
        .into_iter()
        .map(|message| {
            let reactions = reactions
                .iter()
                .filter(|r| r.message_id == message.id)
                .cloned()
                .collect();
            MessageWithReactions { message, reactions }
        })
        .collect())
}

/// Distinct authors in order of first post
pub(crate) fn participants(messages: &[NegotiationMessage]) -> Vec<AgentId> {
    let mut seen: Vec<AgentId> = Vec::new();
    for message in messages {
        if !seen.contains(&message.agent_id) {
            seen.push(message.agent_id.clone());
        }
    }
    seen
}
