//! Domain layer for accord
//!
//! This crate contains the core negotiation logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Negotiation
//!
//! Representative agents, each acting for one principal, exchange messages in
//! a session that moves through ordered stages:
//!
//! - **Perspective pass**: restate the other side's viewpoint
//! - **Option generation**: put tagged options (`OPT-A`, `OPT-B`) on the table
//! - **Consensus check**: explicit `CONSENT:YES` / `CONSENT:NO`
//!
//! ## Consensus
//!
//! A free-text judgment from the completion service is classified as
//! reached, near-miss (70-74%), or none. A reached consensus is materialized
//! once into an open [`Proposal`].

pub mod consensus;
pub mod core;
pub mod negotiation;
pub mod prompt;
pub mod proposal;
pub mod stance;

// Re-export commonly used types
pub use consensus::{
    AgreementTally, ConsensusClassifier, ConsensusJudgment, ConsensusRule, ConsentVoice,
    DecisionClass, FinalConsensusBlock, NEAR_MISS_BAND, SubstringConsensusClassifier,
    classify_consensus,
};
pub use core::{
    error::DomainError,
    ids::{AgentId, MessageId, NegotiationId, ProposalId, ReactionId},
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use negotiation::{
    classify::{CONSENT_NO, CONSENT_YES, OPTION_TAGS, PERSPECTIVE_MARKER, ROUND_TWO_MARKER},
    classify_message_type,
    entities::{
        MessageMetadata, MessageType, MessageWithReactions, NegotiationMessage,
        NegotiationReaction, NegotiationSession, NegotiationStatus, normalize_reaction_type,
    },
    respondent::{MAX_RESPONDENTS, select_respondents},
    stage::NegotiationStage,
};
pub use prompt::{NegotiationPromptTemplate, render_transcript};
pub use proposal::{
    MaterializationPolicy, MonetaryAmount, Proposal, ProposalContent, ProposalStatus,
    append_consensus_block, extract_amount, fallback_draft, parse_draft,
};
pub use stance::{
    Flexibility, IssuePreference, NegotiationStance, PreferenceProfile, PreferenceShape,
    Priority, StanceStrength, heuristic_stance, parse_stance,
};
