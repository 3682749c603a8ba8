//! Identifier value objects.
//!
//! Every persisted record is addressed by a string newtype so that ids from
//! different tables cannot be mixed up. Freshly generated ids are UUID v7,
//! which keeps them roughly ordered by creation time.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id from an existing string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generates a new unique, time-ordered id.
            pub fn generate() -> Self {
                Self(uuid::Uuid::now_v7().to_string())
            }

            /// Returns the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a negotiation session.
    NegotiationId
);

string_id!(
    /// Identifier of a single negotiation message.
    MessageId
);

string_id!(
    /// Identifier of a reaction row.
    ReactionId
);

string_id!(
    /// Identifier of a materialized proposal.
    ProposalId
);

string_id!(
    /// Identifier of a representative agent.
    ///
    /// Each agent acts for exactly one human principal.
    AgentId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = NegotiationId::generate();
        let b = NegotiationId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_str_and_display() {
        let id: AgentId = "agent-7".into();
        assert_eq!(id.as_str(), "agent-7");
        assert_eq!(id.to_string(), "agent-7");
    }

    #[test]
    fn test_serializes_transparently() {
        let id = MessageId::new("m-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"m-1\"");
    }
}
