//! Negotiating stance value objects.
//!
//! A stance is derived per call from an agent's preference profile and the
//! topic. It is never cached and never mutated in place.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Lowest and highest accepted importance of a priority
pub const IMPORTANCE_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StanceStrength {
    Strong,
    #[default]
    Moderate,
    Weak,
}

impl std::str::FromStr for StanceStrength {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strong" => Ok(StanceStrength::Strong),
            "moderate" => Ok(StanceStrength::Moderate),
            "weak" => Ok(StanceStrength::Weak),
            other => Err(DomainError::UnknownVariant {
                kind: "stance strength",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Flexibility {
    High,
    #[default]
    Medium,
    Low,
}

impl std::str::FromStr for Flexibility {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Flexibility::High),
            "medium" => Ok(Flexibility::Medium),
            "low" => Ok(Flexibility::Low),
            other => Err(DomainError::UnknownVariant {
                kind: "flexibility",
                value: other.to_string(),
            }),
        }
    }
}

/// One ranked concern of an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priority {
    pub key: String,
    /// 1 (minor) to 10 (critical)
    pub importance: u8,
}

impl Priority {
    /// Create a priority, clamping importance into 1..=10.
    pub fn new(key: impl Into<String>, importance: i64) -> Self {
        let clamped = importance.clamp(
            *IMPORTANCE_RANGE.start() as i64,
            *IMPORTANCE_RANGE.end() as i64,
        );
        Self {
            key: key.into(),
            importance: clamped as u8,
        }
    }
}

/// Structured negotiating position of one agent on one topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationStance {
    pub position: String,
    pub strength: StanceStrength,
    pub flexibility: Flexibility,
    /// Ordered most to least important
    pub priorities: Vec<Priority>,
    pub constraints: Vec<String>,
    pub deal_breakers: Vec<String>,
}

impl NegotiationStance {
    /// Render the stance as the bullet block embedded in response prompts.
    pub fn render(&self) -> String {
        let mut out = format!(
            "Position: {}\nStrength: {:?}\nFlexibility: {:?}\n",
            self.position, self.strength, self.flexibility
        );

        if !self.priorities.is_empty() {
            out.push_str("Priorities:\n");
            for p in &self.priorities {
                out.push_str(&format!("- {} (importance {}/10)\n", p.key, p.importance));
            }
        }
        if !self.constraints.is_empty() {
            out.push_str("Constraints:\n");
            for c in &self.constraints {
                out.push_str(&format!("- {}\n", c));
            }
        }
        if !self.deal_breakers.is_empty() {
            out.push_str("Deal-breakers (never consent to terms that violate these):\n");
            for d in &self.deal_breakers {
                out.push_str(&format!("- {}\n", d));
            }
        }

        out
    }
}
