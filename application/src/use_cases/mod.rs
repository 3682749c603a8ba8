//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod create_proposal;
pub mod derive_stance;
pub mod detect_consensus;
pub mod engine;
pub mod finalize_negotiation;
pub mod generate_response;
pub mod process_message;
pub mod reactions;
pub mod session_lease;
pub mod start_negotiation;
pub(crate) mod transcript;
