//! Negotiation domain
//!
//! Sessions, messages, reactions, and the pure rules that drive the staged
//! protocol.
//!
//! ```text
//! inbound message
//!       │
//!       ▼
//! ┌────────────────┐   ┌──────────────────────┐   ┌───────────────────┐
//! │ stage::classify│──►│ select_respondents   │──►│ classify_message  │
//! │ (status, count)│   │ (never the speaker)  │   │ _type (tag rules) │
//! └────────────────┘   └──────────────────────┘   └───────────────────┘
//! ```

pub mod classify;
pub mod entities;
pub mod respondent;
pub mod stage;

pub use classify::classify_message_type;
pub use entities::{
    MessageMetadata, MessageType, MessageWithReactions, NegotiationMessage, NegotiationReaction,
    NegotiationSession, NegotiationStatus,
};
pub use respondent::select_respondents;
pub use stage::NegotiationStage;
