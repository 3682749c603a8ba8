//! Message-type classification of generated text.
//!
//! Agents tag their turns with protocol markers (`CONSENT:YES`, `OPT-A`, ...).
//! The tags are case-sensitive and checked in priority order:
//!
//! | Rule | Result |
//! |------|--------|
//! | contains `CONSENT:YES` | `agreement` |
//! | contains `CONSENT:NO` | `disagreement` |
//! | contains `OPT-A` or `OPT-B` | `proposal` |
//! | more than one `?` | `question` |
//! | otherwise | `statement` |

use super::entities::MessageType;

pub const CONSENT_YES: &str = "CONSENT:YES";
pub const CONSENT_NO: &str = "CONSENT:NO";
pub const OPTION_TAGS: [&str; 2] = ["OPT-A", "OPT-B"];
pub const PERSPECTIVE_MARKER: &str = "PERSPECTIVE:";
pub const ROUND_TWO_MARKER: &str = "ROUND-2";

/// Classify free text into a [`MessageType`] by substring rules.
///
/// # Example
///
/// ```
/// use accord_domain::{MessageType, classify_message_type};
///
/// assert_eq!(classify_message_type("CONSENT:YES to OPT-A"), MessageType::Agreement);
/// assert_eq!(classify_message_type("OPT-B: rotate weekly"), MessageType::Proposal);
/// ```
pub fn classify_message_type(text: &str) -> MessageType {
    if text.contains(CONSENT_YES) {
        MessageType::Agreement
    } else if text.contains(CONSENT_NO) {
        MessageType::Disagreement
    } else if OPTION_TAGS.iter().any(|tag| text.contains(tag)) {
        MessageType::Proposal
    } else if text.matches('?').count() > 1 {
        MessageType::Question
    } else {
        MessageType::Statement
    }
}
