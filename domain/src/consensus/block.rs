//! Final consensus block - the structured outcome parsed from a judgment.
//!
//! The completion service is asked to end a positive judgment with marker
//! lines:
//!
//! ```text
//! terms: Split the budget 50/30/20 for two quarters.
//! decisionClass: standard
//! consensusRatio: 100%
//! sunsetDate: 2026-12-31
//! signatories: alice, bob, carol
//! ```
//!
//! Markers are matched case-insensitively. A field runs until the next known
//! marker or the end of the text.

use super::rule::DecisionClass;
use crate::core::ids::ProposalId;
use serde::{Deserialize, Serialize};

pub const TERMS_MARKER: &str = "terms:";
pub const SIGNATORIES_MARKER: &str = "signatories:";
pub const DECISION_CLASS_MARKER: &str = "decisionclass:";
pub const CONSENSUS_RATIO_MARKER: &str = "consensusratio:";
pub const SUNSET_DATE_MARKER: &str = "sunsetdate:";

/// All markers recognized in a judgment (lowercase)
pub const KNOWN_MARKERS: [&str; 5] = [
    TERMS_MARKER,
    SIGNATORIES_MARKER,
    DECISION_CLASS_MARKER,
    CONSENSUS_RATIO_MARKER,
    SUNSET_DATE_MARKER,
];

/// Structured outcome of a successful negotiation
///
/// Surfaced as JSON inside the proposal's negotiation summary rather than as
/// first-class columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalConsensusBlock {
    /// Assigned once the proposal is materialized
    pub proposal_id: Option<ProposalId>,
    pub terms: String,
    pub decision_class: DecisionClass,
    /// Affirmative percentage, if stated
    pub consensus_ratio: Option<f64>,
    pub sunset_date: Option<String>,
    pub signatories: Vec<String>,
}

impl FinalConsensusBlock {
    /// Parse the marker lines of a judgment.
    ///
    /// Returns `None` when no `terms:` marker is present.
    pub fn parse(text: &str) -> Option<Self> {
        let terms = marker_value(text, TERMS_MARKER)?;
        if terms.is_empty() {
            return None;
        }

        let decision_class = marker_value(text, DECISION_CLASS_MARKER)
            .and_then(|v| first_line(&v).parse().ok())
            .unwrap_or_default();

        let consensus_ratio = marker_value(text, CONSENSUS_RATIO_MARKER).and_then(|v| {
            first_line(&v)
                .trim_end_matches('%')
                .trim()
                .parse::<f64>()
                .ok()
        });

        let sunset_date = marker_value(text, SUNSET_DATE_MARKER)
            .map(|v| first_line(&v).to_string())
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("none"));

        let signatories = marker_value(text, SIGNATORIES_MARKER)
            .map(|v| {
                first_line(&v)
                    .split(',')
                    .map(|s| s.trim().trim_matches(['[', ']']).trim())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            proposal_id: None,
            terms,
            decision_class,
            consensus_ratio,
            sunset_date,
            signatories,
        })
    }

    pub fn with_proposal_id(mut self, id: ProposalId) -> Self {
        self.proposal_id = Some(id);
        self
    }
}

/// Locate `marker` (lowercase) case-insensitively and return the trimmed text
/// up to the next known marker or the end of the text.
pub fn marker_value(text: &str, marker: &str) -> Option<String> {
    // ASCII lowering keeps byte offsets aligned with `text`
    let lowered = text.to_ascii_lowercase();
    let start = lowered.find(marker)? + marker.len();
    let rest = &lowered[start..];

    let end = KNOWN_MARKERS
        .iter()
        .filter(|m| **m != marker)
        .filter_map(|m| rest.find(m))
        .min()
        .map(|offset| start + offset)
        .unwrap_or(text.len());

    Some(
        text[start..end]
            .trim()
            .trim_end_matches(['*', '-', '`'])
            .trim()
            .to_string(),
    )
}

fn first_line(value: &str) -> &str {
    value.lines().next().unwrap_or("").trim()
}
