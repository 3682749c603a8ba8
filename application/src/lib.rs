//! Application layer for accord
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod error;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::EngineParams;
pub use error::NegotiationError;
pub use ports::{
    completion::{CompletionError, CompletionRequest, CompletionService, ContextMessage, ContextRole},
    negotiation_logger::{NegotiationEvent, NegotiationLogger, NoNegotiationLogger, events},
    progress::{NegotiationProgress, NoProgress},
    repository::{NegotiationRepository, StoreError},
};
pub use use_cases::create_proposal::{CreateProposalOptions, CreateProposalUseCase};
pub use use_cases::derive_stance::DeriveStanceUseCase;
pub use use_cases::detect_consensus::{ConsensusCheck, DetectConsensusUseCase};
pub use use_cases::engine::NegotiationEngine;
pub use use_cases::finalize_negotiation::{
    FinalizeNegotiationUseCase, FinalizeOutput, MaterializeInput, NegotiationOutcome,
};
pub use use_cases::generate_response::GenerateResponseUseCase;
pub use use_cases::process_message::{
    ProcessMessageInput, ProcessMessageOutput, ProcessMessageUseCase,
};
pub use use_cases::reactions::ReactionLedgerUseCase;
pub use use_cases::session_lease::{SessionLease, SessionLeases};
pub use use_cases::start_negotiation::{StartNegotiationInput, StartNegotiationUseCase};
