//! Proposal domain
//!
//! A successful negotiation is materialized exactly once into an open
//! proposal with its own voting schedule.

pub mod amount;
pub mod draft;
pub mod entities;

pub use amount::{MonetaryAmount, extract_amount};
pub use draft::{append_consensus_block, fallback_draft, parse_draft};
pub use entities::{MaterializationPolicy, Proposal, ProposalContent, ProposalStatus};
