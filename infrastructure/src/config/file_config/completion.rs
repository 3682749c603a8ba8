//! Completion service configuration from TOML (`[completion]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI-compatible chat-completions endpoint.
///
/// # Example
///
/// ```toml
/// [completion]
/// base_url = "http://localhost:11434"
/// model = "llama3.1"
/// api_key_env = "OLLAMA_API_KEY"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCompletionConfig {
    /// Base URL; `/v1/chat/completions` is appended.
    pub base_url: String,
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key; prefer `api_key_env`.
    pub api_key: Option<String>,
    /// Model name sent with every request.
    pub model: String,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for FileCompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            request_timeout_secs: 90,
        }
    }
}

impl FileCompletionConfig {
    /// Direct key first, then the configured environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
