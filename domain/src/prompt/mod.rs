//! Prompt domain
//!
//! Templates for every completion-service call made during a negotiation.

mod template;

pub use template::{NegotiationPromptTemplate, render_transcript};
