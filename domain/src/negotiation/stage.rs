//! Protocol stages and the stage classifier.
//!
//! The stage of a negotiation is never stored. It is derived on demand from
//! the session status and the number of messages in the log:
//!
//! ```text
//! status=completed ─────────────────────────────► Completed
//! status=abandoned ─────────────────────────────► Abandoned
//! status=active, messages 0..=3 ────────────────► PerspectivePass
//! status=active, messages 4..=10 ───────────────► OptionGeneration
//! status=active, messages 11.. ─────────────────► ConsensusCheck
//! ```

use super::entities::NegotiationStatus;
use serde::{Deserialize, Serialize};

/// Last message count that still belongs to the perspective pass
pub const PERSPECTIVE_PASS_MAX_MESSAGES: usize = 3;

/// Last message count that still belongs to option generation
pub const OPTION_GENERATION_MAX_MESSAGES: usize = 10;

/// Ordered protocol phase of a negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NegotiationStage {
    /// Agents restate their understanding of each other's viewpoints
    PerspectivePass,
    /// Agents put tagged options on the table
    OptionGeneration,
    /// Agents state explicit consent or non-consent
    ConsensusCheck,
    Completed,
    Abandoned,
}

impl NegotiationStage {
    /// Classify the stage from observable session state.
    ///
    /// Pure and idempotent; monotone in `message_count` for active sessions.
    ///
    /// # Example
    ///
    /// ```
    /// use accord_domain::{NegotiationStage, NegotiationStatus};
    ///
    /// let stage = NegotiationStage::classify(NegotiationStatus::Active, 4);
    /// assert_eq!(stage, NegotiationStage::OptionGeneration);
    /// ```
    pub fn classify(status: NegotiationStatus, message_count: usize) -> Self {
        match status {
            NegotiationStatus::Completed => NegotiationStage::Completed,
            NegotiationStatus::Abandoned => NegotiationStage::Abandoned,
            NegotiationStatus::Active if message_count <= PERSPECTIVE_PASS_MAX_MESSAGES => {
                NegotiationStage::PerspectivePass
            }
            NegotiationStatus::Active if message_count <= OPTION_GENERATION_MAX_MESSAGES => {
                NegotiationStage::OptionGeneration
            }
            NegotiationStatus::Active => NegotiationStage::ConsensusCheck,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NegotiationStage::PerspectivePass => "PERSPECTIVE_PASS",
            NegotiationStage::OptionGeneration => "OPTION_GENERATION",
            NegotiationStage::ConsensusCheck => "CONSENSUS_CHECK",
            NegotiationStage::Completed => "COMPLETED",
            NegotiationStage::Abandoned => "ABANDONED",
        }
    }

    /// Whether agents still take turns in this stage
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            NegotiationStage::PerspectivePass
                | NegotiationStage::OptionGeneration
                | NegotiationStage::ConsensusCheck
        )
    }
}

impl std::fmt::Display for NegotiationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses_override_count() {
        assert_eq!(
            NegotiationStage::classify(NegotiationStatus::Completed, 0),
            NegotiationStage::Completed
        );
        assert_eq!(
            NegotiationStage::classify(NegotiationStatus::Abandoned, 50),
            NegotiationStage::Abandoned
        );
    }

    #[test]
    fn test_thresholds() {
        let active = NegotiationStatus::Active;
        assert_eq!(NegotiationStage::classify(active, 0), NegotiationStage::PerspectivePass);
        assert_eq!(NegotiationStage::classify(active, 3), NegotiationStage::PerspectivePass);
        assert_eq!(NegotiationStage::classify(active, 4), NegotiationStage::OptionGeneration);
        assert_eq!(NegotiationStage::classify(active, 10), NegotiationStage::OptionGeneration);
        assert_eq!(NegotiationStage::classify(active, 11), NegotiationStage::ConsensusCheck);
    }

    #[test]
    fn test_monotone_in_message_count() {
        let rank = |s: NegotiationStage| match s {
            NegotiationStage::PerspectivePass => 0,
            NegotiationStage::OptionGeneration => 1,
            NegotiationStage::ConsensusCheck => 2,
            _ => unreachable!(),
        };
        let mut previous = 0;
        for k in 0..40 {
            let current = rank(NegotiationStage::classify(NegotiationStatus::Active, k));
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_serde_uses_protocol_names() {
        let json = serde_json::to_string(&NegotiationStage::OptionGeneration).unwrap();
        assert_eq!(json, "\"OPTION_GENERATION\"");
    }
}
