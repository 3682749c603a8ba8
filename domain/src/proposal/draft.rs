//! Proposal drafting - parsing completion output and the templated fallback

use super::entities::ProposalContent;
use crate::consensus::block::FinalConsensusBlock;
use crate::core::error::DomainError;
use crate::core::string::{json_object_span, single_line, truncate};
use serde::Deserialize;

const DESCRIPTION_EXCERPT_LEN: usize = 400;

#[derive(Debug, Deserialize)]
struct RawDraft {
    title: Option<String>,
    description: Option<String>,
    summary: Option<String>,
}

/// Parse the `{title, description, summary}` draft; all three must be non-empty.
pub fn parse_draft(text: &str) -> Result<ProposalContent, DomainError> {
    let json = json_object_span(text)
        .ok_or_else(|| DomainError::unparseable("proposal draft", "no JSON object found"))?;
    let raw: RawDraft = serde_json::from_str(json)
        .map_err(|e| DomainError::unparseable("proposal draft", e.to_string()))?;

    let field = |value: Option<String>, name: &str| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| DomainError::unparseable("proposal draft", format!("missing {name}")))
    };

    Ok(ProposalContent {
        title: field(raw.title, "title")?,
        description: field(raw.description, "description")?,
        summary: field(raw.summary, "summary")?,
    })
}

/// Templated draft used when the completion service gives nothing usable.
pub fn fallback_draft(
    topic: &str,
    last_agreement: Option<&str>,
    terms: Option<&str>,
    message_count: usize,
) -> ProposalContent {
    let description = match last_agreement {
        Some(text) => format!(
            "Negotiated outcome for \"{}\". Final agreement: {}",
            topic,
            truncate(&single_line(text), DESCRIPTION_EXCERPT_LEN)
        ),
        None => format!("Negotiated outcome for \"{}\".", topic),
    };
    let summary = match terms.map(str::trim).filter(|t| !t.is_empty()) {
        Some(terms) => terms.to_string(),
        None => format!(
            "Consensus reached on \"{}\" after {} messages.",
            topic, message_count
        ),
    };

    ProposalContent {
        title: format!("Negotiated: {}", topic),
        description,
        summary,
    }
}

/// Append the structured block to a negotiation summary as a JSON line.
pub fn append_consensus_block(summary: &str, block: &FinalConsensusBlock) -> String {
    match serde_json::to_string(block) {
        Ok(json) => format!("{}\n\nFinalConsensusBlock: {}", summary.trim_end(), json),
        Err(_) => summary.to_string(),
    }
}
