//! Persistence adapters for the negotiation repository port.

mod memory;

pub use memory::InMemoryNegotiationStore;
