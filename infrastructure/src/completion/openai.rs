//! OpenAI-compatible chat-completions adapter

use super::types::{ApiErrorBody, ChatRequest, ChatResponse};
use accord_application::{CompletionError, CompletionRequest, CompletionService};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

pub struct OpenAiCompletionService {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiCompletionService {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CompletionError::Unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: Self::endpoint_for(base_url),
            api_key,
            model: model.into(),
        })
    }

    /// `{base_url}/v1/chat/completions`, tolerating a trailing `/v1`.
    fn endpoint_for(base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        let base = base.strip_suffix("/v1").unwrap_or(base);
        format!("{}/v1/chat/completions", base)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn map_status(status: StatusCode, body: String) -> CompletionError {
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        let detail = format!("HTTP {}: {}", status.as_u16(), message);

        if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::GATEWAY_TIMEOUT {
            CompletionError::Timeout
        } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            CompletionError::Unavailable(detail)
        } else {
            CompletionError::RequestFailed(detail)
        }
    }

    fn map_transport(error: reqwest::Error) -> CompletionError {
        if error.is_timeout() {
            CompletionError::Timeout
        } else if error.is_connect() {
            CompletionError::Unavailable(error.to_string())
        } else {
            CompletionError::RequestFailed(error.to_string())
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletionService {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let body = ChatRequest::from_request(&self.model, request);
        debug!(
            "POST {} ({} messages, model {})",
            self.endpoint,
            body.messages.len(),
            self.model
        );

        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(Self::map_transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Self::map_status(status, text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::InvalidResponse(format!("malformed body: {}", e)))?;

        parsed.into_text().ok_or_else(|| {
            CompletionError::InvalidResponse("no content in choices[0].message".to_string())
        })
    }
}
