//! Consensus thresholds and decision classes.
//!
//! A [`DecisionClass`] names the threshold policy a negotiated decision falls
//! under. The thresholds are communicated to the completion service in the
//! consensus prompt and used by [`AgreementTally`](super::tally::AgreementTally)
//! for the advisory numeric ratio; the oracle judgment stays authoritative.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Affirmative percentage band that counts as a near-miss
pub const NEAR_MISS_BAND: RangeInclusive<u8> = 70..=74;

/// Rule for deciding whether a share of affirmative voices is enough
///
/// # Example
///
/// ```
/// use accord_domain::ConsensusRule;
///
/// let rule = ConsensusRule::Percentage(75);
/// assert!(rule.is_satisfied(3, 4));  // 75%
/// assert!(!rule.is_satisfied(2, 3)); // 67%
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusRule {
    /// More than half must agree
    Majority,

    /// Every voice must agree
    #[default]
    Unanimous,

    /// At least n agreements
    AtLeast(usize),

    /// At least this percentage must agree (0-100)
    Percentage(u8),
}

impl ConsensusRule {
    /// Check if the rule is satisfied given agreement count and total voices
    pub fn is_satisfied(&self, agreements: usize, total: usize) -> bool {
        if total == 0 {
            return false;
        }

        agreements >= self.min_agreements_needed(total)
    }

    /// Minimum agreements needed for this rule given a total count
    pub fn min_agreements_needed(&self, total: usize) -> usize {
        match self {
            ConsensusRule::Majority => total / 2 + 1,
            ConsensusRule::Unanimous => total,
            ConsensusRule::AtLeast(n) => *n,
            ConsensusRule::Percentage(p) => (total as f64 * (*p as f64 / 100.0)).ceil() as usize,
        }
    }

    pub fn description(&self) -> String {
        match self {
            ConsensusRule::Majority => "majority (more than half)".to_string(),
            ConsensusRule::Unanimous => "unanimous (all must consent)".to_string(),
            ConsensusRule::AtLeast(n) => format!("at least {} consents", n),
            ConsensusRule::Percentage(p) => format!("at least {}% affirmative", p),
        }
    }
}

impl std::fmt::Display for ConsensusRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for ConsensusRule {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::UnknownVariant {
            kind: "consensus rule",
            value: s.to_string(),
        };

        match s.trim().to_lowercase().as_str() {
            "majority" => Ok(ConsensusRule::Majority),
            "unanimous" => Ok(ConsensusRule::Unanimous),
            s if s.starts_with("atleast:") || s.starts_with("at_least:") => {
                let n: usize = s
                    .split(':')
                    .nth(1)
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(invalid)?;
                Ok(ConsensusRule::AtLeast(n))
            }
            s if s.starts_with("percentage:") || s.ends_with('%') => {
                let num_str = s.trim_start_matches("percentage:").trim_end_matches('%');
                let p: u8 = num_str.trim().parse().map_err(|_| invalid())?;
                if p > 100 {
                    return Err(invalid());
                }
                Ok(ConsensusRule::Percentage(p))
            }
            _ => Err(invalid()),
        }
    }
}

/// Named consensus-threshold policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DecisionClass {
    /// Ordinary decisions: at least 75% affirmative
    #[default]
    Standard,
    /// Trial decisions with an opt-out path: at least 60% affirmative
    Pilot,
    /// Spending from emergency capital: everyone must consent
    EmergencyCapital,
}

impl DecisionClass {
    pub fn rule(&self) -> ConsensusRule {
        match self {
            DecisionClass::Standard => ConsensusRule::Percentage(75),
            DecisionClass::Pilot => ConsensusRule::Percentage(60),
            DecisionClass::EmergencyCapital => ConsensusRule::Unanimous,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionClass::Standard => "standard",
            DecisionClass::Pilot => "pilot",
            DecisionClass::EmergencyCapital => "emergency-capital",
        }
    }

    /// Whether the class requires an explicit opt-out path in the terms
    pub fn requires_opt_out(&self) -> bool {
        matches!(self, DecisionClass::Pilot)
    }
}

impl std::fmt::Display for DecisionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DecisionClass {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "standard" => Ok(DecisionClass::Standard),
            "pilot" => Ok(DecisionClass::Pilot),
            "emergency-capital" | "emergencycapital" => Ok(DecisionClass::EmergencyCapital),
            other => Err(DomainError::UnknownVariant {
                kind: "decision class",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_threshold() {
        let rule = DecisionClass::Standard.rule();
        assert!(rule.is_satisfied(3, 4));
        assert!(!rule.is_satisfied(2, 3));
        // 5 voices: ceil(3.75) = 4
        assert!(!rule.is_satisfied(3, 5));
        assert!(rule.is_satisfied(4, 5));
    }

    #[test]
    fn test_pilot_threshold() {
        let rule = DecisionClass::Pilot.rule();
        assert!(rule.is_satisfied(2, 3));
        assert!(!rule.is_satisfied(1, 3));
        assert!(DecisionClass::Pilot.requires_opt_out());
    }

    #[test]
    fn test_emergency_capital_is_unanimous() {
        let rule = DecisionClass::EmergencyCapital.rule();
        assert!(rule.is_satisfied(3, 3));
        assert!(!rule.is_satisfied(2, 3));
    }

    #[test]
    fn test_zero_total_never_satisfied() {
        assert!(!ConsensusRule::Majority.is_satisfied(0, 0));
        assert!(!ConsensusRule::Unanimous.is_satisfied(0, 0));
        assert!(!ConsensusRule::AtLeast(0).is_satisfied(0, 0));
        assert!(!ConsensusRule::Percentage(60).is_satisfied(0, 0));
    }

    #[test]
    fn test_parse_rule() {
        assert_eq!("majority".parse::<ConsensusRule>().ok(), Some(ConsensusRule::Majority));
        assert_eq!("atleast:2".parse::<ConsensusRule>().ok(), Some(ConsensusRule::AtLeast(2)));
        assert_eq!("75%".parse::<ConsensusRule>().ok(), Some(ConsensusRule::Percentage(75)));
        assert_eq!(
            "percentage:60".parse::<ConsensusRule>().ok(),
            Some(ConsensusRule::Percentage(60))
        );
        assert!("150%".parse::<ConsensusRule>().is_err());
        assert!("most".parse::<ConsensusRule>().is_err());
    }

    #[test]
    fn test_parse_decision_class() {
        assert_eq!("Standard".parse::<DecisionClass>().ok(), Some(DecisionClass::Standard));
        assert_eq!(
            "emergency_capital".parse::<DecisionClass>().ok(),
            Some(DecisionClass::EmergencyCapital)
        );
        assert_eq!(
            serde_json::to_string(&DecisionClass::EmergencyCapital).unwrap(),
            "\"emergency-capital\""
        );
    }

    #[test]
    fn test_near_miss_band() {
        assert!(NEAR_MISS_BAND.contains(&72));
        assert!(!NEAR_MISS_BAND.contains(&75));
        assert!(!NEAR_MISS_BAND.contains(&69));
    }
}
