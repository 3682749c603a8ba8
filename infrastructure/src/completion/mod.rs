//! Completion service adapters.
//!
//! [`OpenAiCompletionService`] implements the
//! [`CompletionService`](accord_application::CompletionService) port against
//! any OpenAI-compatible chat-completions endpoint.

mod openai;
mod types;

pub use openai::OpenAiCompletionService;
