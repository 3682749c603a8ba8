//! Engine configuration from TOML (`[engine]` section)

use accord_application::EngineParams;
use accord_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Negotiation flow settings.
///
/// # Example
///
/// ```toml
/// [engine]
/// temperature = 0.4
/// transcript_window = 12
/// response_timeout_secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Recent messages handed to a responding agent.
    pub transcript_window: usize,
    /// Consensus is not checked below this many messages.
    pub min_messages_for_consensus: usize,
    pub response_timeout_secs: u64,
    pub proposal_voting_days: i64,
    pub veto_window_days: i64,
    pub proposal_threshold: f64,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        let params = EngineParams::default();
        Self {
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            transcript_window: params.transcript_window,
            min_messages_for_consensus: params.min_messages_for_consensus,
            response_timeout_secs: params.response_timeout.as_secs(),
            proposal_voting_days: params.proposal_voting_days,
            veto_window_days: params.veto_window_days,
            proposal_threshold: params.proposal_threshold,
        }
    }
}

impl FileEngineConfig {
    pub fn to_engine_params(&self) -> EngineParams {
        EngineParams::default()
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
            .with_transcript_window(self.transcript_window)
            .with_min_messages_for_consensus(self.min_messages_for_consensus)
            .with_response_timeout(Duration::from_secs(self.response_timeout_secs))
            .with_proposal_schedule(self.proposal_voting_days, self.veto_window_days)
            .with_proposal_threshold(self.proposal_threshold)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if !(0.0..=2.0).contains(&self.temperature) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "engine.temperature".to_string(),
                },
                format!(
                    "engine.temperature: {} is outside 0.0..=2.0",
                    self.temperature
                ),
            ));
        }

        if !(0.0..=1.0).contains(&self.proposal_threshold) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "engine.proposal_threshold".to_string(),
                },
                format!(
                    "engine.proposal_threshold: {} is outside 0.0..=1.0",
                    self.proposal_threshold
                ),
            ));
        }

        let positive = [
            ("engine.max_tokens", self.max_tokens as u64),
            ("engine.transcript_window", self.transcript_window as u64),
            ("engine.response_timeout_secs", self.response_timeout_secs),
        ];
        for (field, value) in positive {
            if value == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ZeroValue {
                        field: field.to_string(),
                    },
                    format!("{field} cannot be 0"),
                ));
            }
        }

        if self.min_messages_for_consensus == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroValue {
                    field: "engine.min_messages_for_consensus".to_string(),
                },
                "engine.min_messages_for_consensus: 0 judges consensus on an empty transcript",
            ));
        }

        if self.proposal_voting_days <= 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "engine.proposal_voting_days".to_string(),
                },
                "engine.proposal_voting_days must be positive",
            ));
        } else if self.veto_window_days > self.proposal_voting_days {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::Inconsistent {
                    fields: vec![
                        "engine.veto_window_days".to_string(),
                        "engine.proposal_voting_days".to_string(),
                    ],
                },
                format!(
                    "engine.veto_window_days ({}) outlasts the voting window ({} days)",
                    self.veto_window_days, self.proposal_voting_days
                ),
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_domain::Severity;

    #[test]
    fn test_defaults_match_engine_params() {
        let params = FileEngineConfig::default().to_engine_params();
        let expected = EngineParams::default();
        assert_eq!(params.transcript_window, expected.transcript_window);
        assert_eq!(params.response_timeout, expected.response_timeout);
        assert_eq!(params.materialization_policy(), expected.materialization_policy());
    }

    #[test]
    fn test_conversion() {
        let config = FileEngineConfig {
            temperature: 0.2,
            response_timeout_secs: 15,
            proposal_voting_days: 5,
            veto_window_days: 2,
            ..Default::default()
        };
        let params = config.to_engine_params();
        assert_eq!(params.temperature, 0.2);
        assert_eq!(params.response_timeout, Duration::from_secs(15));
        assert_eq!(params.proposal_voting_days, 5);
        assert_eq!(params.veto_window_days, 2);
    }

    #[test]
    fn test_validate_ranges() {
        let config = FileEngineConfig {
            temperature: 3.5,
            transcript_window: 0,
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.severity == Severity::Error));
    }

    #[test]
    fn test_veto_window_longer_than_voting_warns() {
        let config = FileEngineConfig {
            proposal_voting_days: 2,
            veto_window_days: 3,
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert!(matches!(issues[0].code, ConfigIssueCode::Inconsistent { .. }));
    }
}
