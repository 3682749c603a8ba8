//! Structured configuration issues.
//!
//! Config sections validate themselves into a list of [`ConfigIssue`]s rather
//! than failing on the first problem, so the binary can print every warning
//! and refuse to start only on errors.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A numeric value lies outside its accepted range.
    OutOfRange { field: String },
    /// A window or count that must be positive is zero.
    ZeroValue { field: String },
    /// Two related values contradict each other.
    Inconsistent { fields: Vec<String> },
    /// A string value does not name a known variant.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    /// Check whether any issue in the list is fatal.
    pub fn any_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_errors() {
        let warn = ConfigIssue::warning(
            ConfigIssueCode::OutOfRange {
                field: "engine.temperature".to_string(),
            },
            "high temperature",
        );
        assert!(!ConfigIssue::any_errors(std::slice::from_ref(&warn)));

        let err = ConfigIssue::error(
            ConfigIssueCode::ZeroValue {
                field: "engine.transcript_window".to_string(),
            },
            "zero window",
        );
        assert!(ConfigIssue::any_errors(&[warn, err]));
    }
}
