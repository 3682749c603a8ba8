//! Advisory agreement tally computed from the transcript.
//!
//! Each agent's most recent `agreement` or `disagreement` message counts as
//! their voice. The tally is shown to the consensus oracle and returned to
//! callers, but it never overrides the oracle's judgment.

use super::rule::{ConsensusRule, NEAR_MISS_BAND};
use crate::core::ids::AgentId;
use crate::negotiation::entities::{MessageType, NegotiationMessage};
use serde::{Deserialize, Serialize};

/// A single agent's latest explicit stance in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentVoice {
    pub agent_id: AgentId,
    pub consents: bool,
}

/// Aggregated explicit consent in a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AgreementTally {
    pub agreements: usize,
    pub disagreements: usize,
    pub voices: Vec<ConsentVoice>,
}

impl AgreementTally {
    /// Tally the latest explicit voice per agent; messages must be oldest-first.
    pub fn from_messages(messages: &[NegotiationMessage]) -> Self {
        let mut voices: Vec<ConsentVoice> = Vec::new();

        for message in messages {
            let consents = match message.message_type {
                MessageType::Agreement => true,
                MessageType::Disagreement => false,
                _ => continue,
            };
            match voices.iter_mut().find(|v| v.agent_id == message.agent_id) {
                Some(voice) => voice.consents = consents,
                None => voices.push(ConsentVoice {
                    agent_id: message.agent_id.clone(),
                    consents,
                }),
            }
        }

        let agreements = voices.iter().filter(|v| v.consents).count();
        Self {
            agreements,
            disagreements: voices.len() - agreements,
            voices,
        }
    }

    pub fn total(&self) -> usize {
        self.voices.len()
    }

    /// Affirmative share in percent (0.0 when nobody has voiced consent)
    pub fn percentage(&self) -> f64 {
        if self.voices.is_empty() {
            0.0
        } else {
            self.agreements as f64 * 100.0 / self.voices.len() as f64
        }
    }

    pub fn satisfies(&self, rule: &ConsensusRule) -> bool {
        rule.is_satisfied(self.agreements, self.total())
    }

    /// Whether the affirmative share falls in the near-miss band
    pub fn is_near_miss(&self) -> bool {
        if self.voices.is_empty() {
            return false;
        }
        let floored = self.percentage().floor();
        floored >= *NEAR_MISS_BAND.start() as f64 && floored <= *NEAR_MISS_BAND.end() as f64
    }

    /// Visual summary, e.g. `[●●○] 2/3 (67%)`
    pub fn summary(&self) -> String {
        let marks: String = self
            .voices
            .iter()
            .map(|v| if v.consents { '●' } else { '○' })
            .collect();
        format!(
            "[{}] {}/{} ({:.0}%)",
            marks,
            self.agreements,
            self.total(),
            self.percentage()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::rule::DecisionClass;
    use crate::core::ids::NegotiationId;

    fn msg(agent: &str, message_type: MessageType) -> NegotiationMessage {
        NegotiationMessage::new(
            NegotiationId::new("n"),
            AgentId::new(agent),
            "text",
            message_type,
        )
    }

    #[test]
    fn test_latest_voice_wins() {
        let messages = vec![
            msg("a", MessageType::Disagreement),
            msg("b", MessageType::Agreement),
            msg("a", MessageType::Agreement),
            msg("c", MessageType::Statement),
        ];
        let tally = AgreementTally::from_messages(&messages);
        assert_eq!(tally.agreements, 2);
        assert_eq!(tally.disagreements, 0);
        assert_eq!(tally.total(), 2);
        assert_eq!(tally.percentage(), 100.0);
    }

    #[test]
    fn test_standard_threshold_from_tally() {
        let messages = vec![
            msg("a", MessageType::Agreement),
            msg("b", MessageType::Agreement),
            msg("c", MessageType::Disagreement),
        ];
        let tally = AgreementTally::from_messages(&messages);
        assert!(!tally.satisfies(&DecisionClass::Standard.rule()));
        assert!(tally.satisfies(&DecisionClass::Pilot.rule()));
        assert_eq!(tally.summary(), "[●●○] 2/3 (67%)");
    }

    #[test]
    fn test_near_miss_from_tally() {
        let mut messages: Vec<NegotiationMessage> = (0..18)
            .map(|i| msg(&format!("yes-{i}"), MessageType::Agreement))
            .collect();
        messages.extend((0..7).map(|i| msg(&format!("no-{i}"), MessageType::Disagreement)));
        // 18/25 = 72%
        let tally = AgreementTally::from_messages(&messages);
        assert!(tally.is_near_miss());
    }

    #[test]
    fn test_empty_tally() {
        let tally = AgreementTally::from_messages(&[]);
        assert_eq!(tally.percentage(), 0.0);
        assert!(!tally.is_near_miss());
        assert!(!tally.satisfies(&ConsensusRule::Majority));
    }
}
