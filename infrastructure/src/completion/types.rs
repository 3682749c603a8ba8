//! Chat-completions request and response types

use accord_application::{CompletionRequest, ContextRole};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub(super) struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
        }
    }
}

impl ChatRequest {
    /// System prompt, then context turns, then the user prompt.
    pub fn from_request(model: &str, request: CompletionRequest) -> Self {
        let mut messages = Vec::with_capacity(request.context_messages.len() + 2);
        messages.push(ChatMessage::new("system", request.system_prompt));
        for context in request.context_messages {
            let role = match context.role {
                ContextRole::User => "user",
                ContextRole::Assistant => "assistant",
            };
            messages.push(ChatMessage::new(role, context.content));
        }
        messages.push(ChatMessage::new("user", request.user_prompt));

        Self {
            model: model.to_string(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct Choice {
    pub message: ChatMessage,
}

impl ChatResponse {
    /// Text of the first choice, if non-empty
    pub fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiErrorDetail {
    pub message: String,
}
