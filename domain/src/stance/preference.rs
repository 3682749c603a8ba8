//! Agent preference profiles.
//!
//! Profiles are stored as opaque JSON documents. They are read into a small
//! set of known shapes here, and anything unrecognized is carried along so
//! it can still be shown to the completion service.

use super::entities::Priority;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One issue an agent cares about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuePreference {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deal_breakers: Vec<String>,
}

/// Known shapes of a stored profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "value", rename_all = "snake_case")]
pub enum PreferenceShape {
    Issues(Vec<IssuePreference>),
    Priorities(Vec<Priority>),
    /// Unrecognized document, kept as-is
    Opaque(Value),
}

/// Validated view of an agent's stored preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    pub shape: PreferenceShape,
    /// Profile-wide constraints
    pub constraints: Vec<String>,
    /// Profile-wide deal-breakers
    pub deal_breakers: Vec<String>,
    /// Every other top-level key
    pub extensions: BTreeMap<String, Value>,
}

impl Default for PreferenceProfile {
    fn default() -> Self {
        Self::empty()
    }
}

impl PreferenceProfile {
    pub fn empty() -> Self {
        Self {
            shape: PreferenceShape::Priorities(Vec::new()),
            constraints: Vec::new(),
            deal_breakers: Vec::new(),
            extensions: BTreeMap::new(),
        }
    }

    /// Read a stored profile document.
    ///
    /// `issues` takes precedence over `priorities`. Non-object documents and
    /// objects with neither key become [`PreferenceShape::Opaque`] (the
    /// extension map still collects the object's keys).
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self {
                shape: PreferenceShape::Opaque(value.clone()),
                ..Self::empty()
            };
        };

        let shape = if let Some(issues) = object.get("issues").and_then(parse_issues) {
            PreferenceShape::Issues(issues)
        } else if let Some(priorities) = object.get("priorities").and_then(parse_priorities) {
            PreferenceShape::Priorities(priorities)
        } else {
            PreferenceShape::Opaque(value.clone())
        };

        let consumed: &[&str] = match &shape {
            PreferenceShape::Issues(_) => &["issues", "constraints", "dealBreakers", "deal_breakers"],
            PreferenceShape::Priorities(_) => {
                &["priorities", "constraints", "dealBreakers", "deal_breakers"]
            }
            PreferenceShape::Opaque(_) => &["constraints", "dealBreakers", "deal_breakers"],
        };

        let extensions = object
            .iter()
            .filter(|(k, _)| !consumed.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            shape,
            constraints: string_list(object.get("constraints")),
            deal_breakers: string_list(
                object
                    .get("dealBreakers")
                    .or_else(|| object.get("deal_breakers")),
            ),
            extensions,
        }
    }

    /// Priorities ordered by importance, highest first (stable for ties)
    pub fn priorities(&self) -> Vec<Priority> {
        let mut priorities: Vec<Priority> = match &self.shape {
            PreferenceShape::Issues(issues) => issues
                .iter()
                .map(|i| Priority::new(i.key.clone(), i.importance.unwrap_or(5) as i64))
                .collect(),
            PreferenceShape::Priorities(p) => p.clone(),
            PreferenceShape::Opaque(_) => Vec::new(),
        };
        priorities.sort_by(|a, b| b.importance.cmp(&a.importance));
        priorities
    }

    /// Profile-wide constraints followed by per-issue constraints
    pub fn all_constraints(&self) -> Vec<String> {
        let mut out = self.constraints.clone();
        if let PreferenceShape::Issues(issues) = &self.shape {
            out.extend(issues.iter().flat_map(|i| i.constraints.iter().cloned()));
        }
        out
    }

    /// Profile-wide deal-breakers followed by per-issue deal-breakers
    pub fn all_deal_breakers(&self) -> Vec<String> {
        let mut out = self.deal_breakers.clone();
        if let PreferenceShape::Issues(issues) = &self.shape {
            out.extend(issues.iter().flat_map(|i| i.deal_breakers.iter().cloned()));
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        let shape_empty = match &self.shape {
            PreferenceShape::Issues(i) => i.is_empty(),
            PreferenceShape::Priorities(p) => p.is_empty(),
            PreferenceShape::Opaque(v) => v.is_null(),
        };
        shape_empty
            && self.constraints.is_empty()
            && self.deal_breakers.is_empty()
            && self.extensions.is_empty()
    }

    /// Pretty JSON for prompt embedding
    pub fn to_prompt_json(&self) -> String {
        let mut doc = Map::new();
        match &self.shape {
            PreferenceShape::Issues(issues) => {
                doc.insert("issues".into(), serde_json::json!(issues));
            }
            PreferenceShape::Priorities(priorities) => {
                doc.insert("priorities".into(), serde_json::json!(priorities));
            }
            PreferenceShape::Opaque(value) => {
                doc.insert("profile".into(), value.clone());
            }
        }
        if !self.constraints.is_empty() {
            doc.insert("constraints".into(), serde_json::json!(self.constraints));
        }
        if !self.deal_breakers.is_empty() {
            doc.insert("dealBreakers".into(), serde_json::json!(self.deal_breakers));
        }
        for (k, v) in &self.extensions {
            doc.entry(k.clone()).or_insert_with(|| v.clone());
        }
        serde_json::to_string_pretty(&Value::Object(doc)).unwrap_or_else(|_| "{}".to_string())
    }
}

fn parse_issues(value: &Value) -> Option<Vec<IssuePreference>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| issue_from_object(item, None))
                .collect(),
        ),
        Value::Object(map) => Some(
            map.iter()
                .map(|(key, v)| match v {
                    Value::Object(_) => {
                        issue_from_object(v, Some(key)).unwrap_or_else(|| bare_issue(key))
                    }
                    Value::Number(_) => IssuePreference {
                        importance: importance_of(v),
                        ..bare_issue(key)
                    },
                    Value::String(s) => IssuePreference {
                        position: Some(s.clone()),
                        ..bare_issue(key)
                    },
                    _ => bare_issue(key),
                })
                .collect(),
        ),
        _ => None,
    }
}

fn issue_from_object(value: &Value, map_key: Option<&str>) -> Option<IssuePreference> {
    let object = value.as_object()?;
    let key = map_key
        .or_else(|| {
            ["key", "name", "issue"]
                .iter()
                .find_map(|k| object.get(*k).and_then(Value::as_str))
        })?
        .to_string();

    Some(IssuePreference {
        key,
        position: object
            .get("position")
            .or_else(|| object.get("preference"))
            .and_then(Value::as_str)
            .map(str::to_string),
        importance: object
            .get("importance")
            .or_else(|| object.get("weight"))
            .and_then(importance_of),
        constraints: string_list(object.get("constraints")),
        deal_breakers: string_list(
            object
                .get("dealBreakers")
                .or_else(|| object.get("deal_breakers")),
        ),
    })
}

fn bare_issue(key: &str) -> IssuePreference {
    IssuePreference {
        key: key.to_string(),
        position: None,
        importance: None,
        constraints: Vec::new(),
        deal_breakers: Vec::new(),
    }
}

fn parse_priorities(value: &Value) -> Option<Vec<Priority>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(key) => Some(Priority::new(key.clone(), 5)),
                    Value::Object(o) => {
                        let key = o.get("key").or_else(|| o.get("name"))?.as_str()?;
                        let importance = o.get("importance").and_then(importance_of).unwrap_or(5);
                        Some(Priority::new(key, importance as i64))
                    }
                    _ => None,
                })
                .collect(),
        ),
        Value::Object(map) => Some(
            map.iter()
                .map(|(key, v)| Priority::new(key.clone(), importance_of(v).unwrap_or(5) as i64))
                .collect(),
        ),
        _ => None,
    }
}

/// Numeric importance clamped to 1..=10
fn importance_of(value: &Value) -> Option<u8> {
    let raw = value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<i64>().ok()))?;
    Some(Priority::new("", raw).importance)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_issues_array_shape() {
        let profile = PreferenceProfile::from_value(&json!({
            "issues": [
                {"key": "marketing", "importance": 9, "dealBreakers": ["under 15%"]},
                {"name": "hiring", "importance": 14, "position": "two engineers"}
            ],
            "tone": "direct"
        }));

        let PreferenceShape::Issues(issues) = &profile.shape else {
            panic!("expected issues shape");
        };
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[1].importance, Some(10));
        assert_eq!(profile.all_deal_breakers(), vec!["under 15%"]);
        assert_eq!(profile.extensions.get("tone"), Some(&json!("direct")));
    }

    #[test]
    fn test_issues_map_shape() {
        let profile = PreferenceProfile::from_value(&json!({
            "issues": {
                "budget": {"position": "cap at 10k", "importance": 8},
                "timeline": 4,
                "venue": "remote"
            }
        }));

        let PreferenceShape::Issues(issues) = &profile.shape else {
            panic!("expected issues shape");
        };
        let budget = issues.iter().find(|i| i.key == "budget").unwrap();
        assert_eq!(budget.position.as_deref(), Some("cap at 10k"));
        assert_eq!(budget.importance, Some(8));
        let venue = issues.iter().find(|i| i.key == "venue").unwrap();
        assert_eq!(venue.position.as_deref(), Some("remote"));
        assert_eq!(profile.priorities()[0].key, "budget");
    }

    #[test]
    fn test_priorities_map_shape_sorted() {
        let profile = PreferenceProfile::from_value(&json!({
            "priorities": {"cost": 3, "speed": 8, "quality": "6"},
            "constraints": ["ship by Q3"]
        }));

        let keys: Vec<_> = profile.priorities().into_iter().map(|p| p.key).collect();
        assert_eq!(keys, vec!["speed", "quality", "cost"]);
        assert_eq!(profile.all_constraints(), vec!["ship by Q3"]);
        assert!(profile.extensions.is_empty());
    }

    #[test]
    fn test_unknown_shape_is_opaque() {
        let raw = json!({"likes": ["tea"], "budget": 100});
        let profile = PreferenceProfile::from_value(&raw);
        assert!(matches!(profile.shape, PreferenceShape::Opaque(ref v) if *v == raw));
        assert!(profile.priorities().is_empty());
        assert!(profile.to_prompt_json().contains("tea"));
    }

    #[test]
    fn test_non_object_is_opaque() {
        let profile = PreferenceProfile::from_value(&json!("prefers compromise"));
        assert!(matches!(profile.shape, PreferenceShape::Opaque(_)));
        assert!(!profile.is_empty());
    }

    #[test]
    fn test_empty_profile() {
        assert!(PreferenceProfile::empty().is_empty());
        assert!(PreferenceProfile::from_value(&json!({"priorities": []})).is_empty());
    }

    #[test]
    fn test_importance_clamped_low() {
        let profile = PreferenceProfile::from_value(&json!({
            "priorities": [{"key": "a", "importance": 0}, {"key": "b", "importance": 2.6}]
        }));
        let priorities = profile.priorities();
        assert_eq!(priorities[0].key, "b");
        assert_eq!(priorities[0].importance, 3);
        assert_eq!(priorities[1].importance, 1);
    }
}
