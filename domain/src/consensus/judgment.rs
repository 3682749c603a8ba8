//! Consensus judgment classification.
//!
//! The consensus detector treats the completion service as an oracle and
//! classifies its free-text judgment with case-insensitive substring rules.
//! The heuristic sits behind [`ConsensusClassifier`] so it can be replaced by
//! a structured-output contract without touching the negotiation flow.

use super::block::{FinalConsensusBlock, TERMS_MARKER, marker_value};
use super::rule::NEAR_MISS_BAND;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Phrases that state consensus was reached (lowercase)
const REACHED_PHRASES: &[&str] = &[
    "consensus reached",
    "consensus has been reached",
    "consensus was reached",
    "consensus is reached",
    "reached consensus",
    "reached a consensus",
    "reached full consensus",
    "consensus achieved",
    "achieved consensus",
    "consensus: yes",
    "consensus:yes",
    "consensusreached: true",
    "\"consensusreached\": true",
];

/// Phrases that negate a reached-consensus statement in the same sentence (lowercase)
const NEGATION_PHRASES: &[&str] = &[
    "no consensus",
    "not reached",
    "not been reached",
    "not yet reached",
    "not achieved",
    "not been achieved",
    "consensus: no",
    "consensus:no",
    "consensusreached: false",
    "\"consensusreached\": false",
    "without consensus",
    "lack of consensus",
];

/// Explicit near-miss language (lowercase)
const NEAR_MISS_PHRASES: &[&str] = &["near-miss", "near miss", "nearmiss"];

static PERCENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,3}(?:\.\d+)?)\s*%").expect("percent pattern is valid")
});

static RATIO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)consensusratio:\s*(\d{1,3}(?:\.\d+)?)").expect("ratio pattern is valid")
});

/// Classified outcome of a consensus judgment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusJudgment {
    pub reached: bool,
    /// Judged in the 70-74% band (or explicitly a near-miss) without reaching consensus
    pub near_miss: bool,
    /// Text following the `terms:` marker, if present
    pub terms: Option<String>,
    /// Terms when present, otherwise the full judgment text
    pub summary: String,
    /// Structured block, parsed only when consensus was reached
    pub block: Option<FinalConsensusBlock>,
}

impl ConsensusJudgment {
    /// A judgment that reached nothing, used for short transcripts and failures
    pub fn none() -> Self {
        Self {
            reached: false,
            near_miss: false,
            terms: None,
            summary: String::new(),
            block: None,
        }
    }
}

/// Classifies oracle output into a [`ConsensusJudgment`]
pub trait ConsensusClassifier: Send + Sync {
    fn classify(&self, judgment_text: &str) -> ConsensusJudgment;
}

/// Default case-insensitive substring heuristic
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringConsensusClassifier;

impl ConsensusClassifier for SubstringConsensusClassifier {
    fn classify(&self, judgment_text: &str) -> ConsensusJudgment {
        classify_consensus(judgment_text)
    }
}

/// Classify a free-text consensus judgment.
///
/// - `reached`: some sentence states consensus was reached and does not negate it
/// - `near_miss`: not reached, and either near-miss language or an affirmative
///   percentage in the 70-74% band
/// - `terms`/`summary`: text after `terms:` up to the next known marker;
///   without the marker the full text is the summary
///
/// # Example
///
/// ```
/// use accord_domain::classify_consensus;
///
/// let judgment = classify_consensus("Consensus reached. Terms: 50/50 split");
/// assert!(judgment.reached);
/// assert_eq!(judgment.summary, "50/50 split");
///
/// let judgment = classify_consensus("Support sits at 72%, short of the threshold.");
/// assert!(!judgment.reached);
/// assert!(judgment.near_miss);
/// ```
pub fn classify_consensus(judgment_text: &str) -> ConsensusJudgment {
    let lowered = judgment_text.to_lowercase();

    let reached = sentences(&lowered).any(affirms_consensus);

    let near_miss = !reached
        && (NEAR_MISS_PHRASES.iter().any(|p| lowered.contains(p))
            || stated_percentages(judgment_text).any(in_near_miss_band));

    let terms = marker_value(judgment_text, TERMS_MARKER).filter(|t| !t.is_empty());
    let summary = terms
        .clone()
        .unwrap_or_else(|| judgment_text.trim().to_string());
    let block = if reached {
        FinalConsensusBlock::parse(judgment_text)
    } else {
        None
    };

    ConsensusJudgment {
        reached,
        near_miss,
        terms,
        summary,
        block,
    }
}

/// Sentence-sized spans; a negation only governs the sentence it appears in
fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?', ';', '\n'])
}

fn affirms_consensus(sentence: &str) -> bool {
    REACHED_PHRASES.iter().any(|p| sentence.contains(p))
        && !NEGATION_PHRASES.iter().any(|p| sentence.contains(p))
}

fn stated_percentages(text: &str) -> impl Iterator<Item = f64> + '_ {
    PERCENT_PATTERN
        .captures_iter(text)
        .chain(RATIO_PATTERN.captures_iter(text))
        .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse::<f64>().ok()))
}

fn in_near_miss_band(percent: f64) -> bool {
    let floored = percent.floor();
    floored >= *NEAR_MISS_BAND.start() as f64 && floored <= *NEAR_MISS_BAND.end() as f64
}
