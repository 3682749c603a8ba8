//! Consensus domain
//!
//! How a negotiation decides it is done.
//!
//! # Core Concepts
//!
//! ## Judgment
//! The completion service reads the whole transcript and writes a free-text
//! judgment. [`classify_consensus`] turns it into reached / near-miss / none
//! and pulls out the agreed terms.
//!
//! ## Decision Class
//! Threshold policies referenced by the judgment: standard (≥75%),
//! pilot (≥60% with an opt-out path), emergency-capital (unanimous).
//!
//! ## Near-miss
//! A judgment in the 70-74% band. It triggers a second round instead of
//! finalization.
//!
//! ## Tally
//! An advisory count of explicit `CONSENT:YES` / `CONSENT:NO` voices.

pub mod block;
pub mod judgment;
pub mod rule;
pub mod tally;

pub use block::FinalConsensusBlock;
pub use judgment::{
    ConsensusClassifier, ConsensusJudgment, SubstringConsensusClassifier, classify_consensus,
};
pub use rule::{ConsensusRule, DecisionClass, NEAR_MISS_BAND};
pub use tally::{AgreementTally, ConsentVoice};
