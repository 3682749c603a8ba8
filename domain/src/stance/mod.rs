//! Stance domain
//!
//! An agent's negotiating position for one topic, derived from its stored
//! preference profile.

pub mod entities;
pub mod parsing;
pub mod preference;

pub use entities::{Flexibility, NegotiationStance, Priority, StanceStrength};
pub use parsing::{heuristic_stance, parse_stance};
pub use preference::{IssuePreference, PreferenceProfile, PreferenceShape};
