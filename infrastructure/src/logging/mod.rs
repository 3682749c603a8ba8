//! Structured negotiation event logging
//!
//! Provides [`JsonlNegotiationLogger`], a JSONL file writer that implements
//! the [`NegotiationLogger`](accord_application::NegotiationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlNegotiationLogger;
