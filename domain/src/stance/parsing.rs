//! Reading a stance out of completion output, and the fallback when that fails.

use super::entities::{Flexibility, IMPORTANCE_RANGE, NegotiationStance, Priority, StanceStrength};
use super::preference::PreferenceProfile;
use crate::core::error::DomainError;
use crate::core::string::json_object_span;
use serde::Deserialize;
use serde_json::Value;

/// Loose mirror of the requested JSON; every field is checked afterwards
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStance {
    position: Option<String>,
    strength: Option<String>,
    flexibility: Option<String>,
    #[serde(default)]
    priorities: Vec<RawPriority>,
    #[serde(default)]
    constraints: Vec<String>,
    #[serde(default, alias = "deal_breakers")]
    deal_breakers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawPriority {
    key: String,
    importance: Value,
}

/// Parse and validate a stance from completion output.
///
/// Fails when no JSON object is present, the position is blank, an enum
/// value is unknown, or an importance falls outside 1..=10.
pub fn parse_stance(text: &str) -> Result<NegotiationStance, DomainError> {
    let json = json_object_span(text)
        .ok_or_else(|| DomainError::unparseable("stance", "no JSON object found"))?;
    let raw: RawStance =
        serde_json::from_str(json).map_err(|e| DomainError::unparseable("stance", e.to_string()))?;

    let position = raw
        .position
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| DomainError::unparseable("stance", "missing position"))?;

    let strength: StanceStrength = raw
        .strength
        .ok_or_else(|| DomainError::unparseable("stance", "missing strength"))?
        .parse()?;
    let flexibility: Flexibility = raw
        .flexibility
        .ok_or_else(|| DomainError::unparseable("stance", "missing flexibility"))?
        .parse()?;

    let mut priorities = Vec::with_capacity(raw.priorities.len());
    for p in raw.priorities {
        let importance = p
            .importance
            .as_i64()
            .filter(|i| (1..=10).contains(i))
            .ok_or_else(|| {
                DomainError::unparseable(
                    "stance",
                    format!(
                        "importance of '{}' must be an integer in {}..={}",
                        p.key,
                        IMPORTANCE_RANGE.start(),
                        IMPORTANCE_RANGE.end()
                    ),
                )
            })?;
        priorities.push(Priority::new(p.key, importance));
    }
    priorities.sort_by(|a, b| b.importance.cmp(&a.importance));

    Ok(NegotiationStance {
        position,
        strength,
        flexibility,
        priorities,
        constraints: raw.constraints,
        deal_breakers: raw.deal_breakers,
    })
}

/// Derive a stance from the profile alone.
pub fn heuristic_stance(profile: &PreferenceProfile, topic: &str) -> NegotiationStance {
    NegotiationStance {
        position: format!("No stated position on {}", topic.trim()),
        strength: StanceStrength::Moderate,
        flexibility: Flexibility::Medium,
        priorities: profile.priorities(),
        constraints: profile.all_constraints(),
        deal_breakers: profile.all_deal_breakers(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_fenced_stance() {
        let text = r#"Sure, here is the stance:
```json
{
  "position": "Fund the pilot, cap spend at $20k",
  "strength": "strong",
  "flexibility": "low",
  "priorities": [{"key": "cost", "importance": 6}, {"key": "speed", "importance": 9}],
  "constraints": ["Q3 start"],
  "dealBreakers": ["No vendor lock-in"]
}
```"#;
        let stance = parse_stance(text).unwrap();
        assert_eq!(stance.strength, StanceStrength::Strong);
        assert_eq!(stance.flexibility, Flexibility::Low);
        assert_eq!(stance.priorities[0].key, "speed");
        assert_eq!(stance.deal_breakers, vec!["No vendor lock-in"]);
    }

    #[test]
    fn test_reject_out_of_range_importance() {
        let text = r#"{"position": "x", "strength": "weak", "flexibility": "high",
                       "priorities": [{"key": "a", "importance": 11}]}"#;
        let err = parse_stance(text).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_reject_unknown_enum() {
        let text = r#"{"position": "x", "strength": "overwhelming", "flexibility": "high"}"#;
        assert!(matches!(
            parse_stance(text),
            Err(DomainError::UnknownVariant { kind: "stance strength", .. })
        ));
    }

    #[test]
    fn test_reject_prose_and_blank_position() {
        assert!(parse_stance("I prefer a balanced approach.").is_err());
        assert!(
            parse_stance(r#"{"position": "  ", "strength": "weak", "flexibility": "low"}"#)
                .is_err()
        );
    }

    #[test]
    fn test_heuristic_from_profile() {
        let profile = PreferenceProfile::from_value(&json!({
            "priorities": {"cost": 4, "quality": 9},
            "dealBreakers": ["layoffs"]
        }));
        let stance = heuristic_stance(&profile, " Budget split ");
        assert_eq!(stance.position, "No stated position on Budget split");
        assert_eq!(stance.strength, StanceStrength::Moderate);
        assert_eq!(stance.flexibility, Flexibility::Medium);
        assert_eq!(stance.priorities[0].key, "quality");
        assert_eq!(stance.deal_breakers, vec!["layoffs"]);
    }

    #[test]
    fn test_heuristic_from_empty_profile() {
        let stance = heuristic_stance(&PreferenceProfile::empty(), "Office move");
        assert!(stance.priorities.is_empty());
        assert!(stance.constraints.is_empty());
    }
}
