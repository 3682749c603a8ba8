//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`]: typed identifiers for sessions, messages, reactions, proposals, agents
//! - [`error::DomainError`]: domain-level errors
//! - [`validation::ConfigIssue`]: structured configuration problems

pub mod error;
pub mod ids;
pub mod string;
pub mod validation;
