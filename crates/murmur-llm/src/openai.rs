//! OpenAI-compatible chat-completions driver.
//!
//! Speaks the `/chat/completions` wire format over `reqwest` — no vendor SDK,
//! for full control over error handling. Any backend exposing the same
//! endpoint works by overriding the base URL.

use crate::driver::{CompletionRequest, LlmDriver, LlmError};
use tracing::debug;
use zeroize::Zeroizing;

/// Default API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat-completions driver for OpenAI-compatible backends.
pub struct OpenAiDriver {
    /// SECURITY: API key is zeroized on drop to prevent memory disclosure.
    api_key: Zeroizing<String>,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiDriver {
    /// Create a driver against the default OpenAI endpoint.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, OPENAI_BASE_URL.to_string())
    }

    /// Create a driver against a custom OpenAI-compatible endpoint.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key: Zeroizing::new(api_key),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

/// Build the JSON request body for a completion.
fn request_body(request: &CompletionRequest) -> serde_json::Value {
    serde_json::json!({
        "model": request.model,
        "messages": request.messages,
        "temperature": request.temperature,
        "max_tokens": request.max_tokens,
    })
}

/// Extract the reply text from a chat-completions response body.
fn parse_reply(body: &serde_json::Value) -> Result<String, LlmError> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| {
            LlmError::InvalidResponse("missing choices[0].message.content".to_string())
        })
}

#[async_trait::async_trait]
impl LlmDriver for OpenAiDriver {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %request.model, messages = request.messages.len(), "Completion request");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.as_str())
            .json(&request_body(&request))
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body_text,
            });
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        parse_reply(&body)
    }
}
