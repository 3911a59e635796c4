//! The `LlmDriver` trait and its request/error types.

use murmur_types::message::ChatTurn;
use thiserror::Error;

/// A single completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model name (e.g. "gpt-4o-mini").
    pub model: String,
    /// Ordered chat turns, system instruction first.
    pub messages: Vec<ChatTurn>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Output token cap.
    pub max_tokens: u32,
}

/// Errors from the completion service.
#[derive(Error, Debug)]
pub enum LlmError {
    /// The API returned a non-success status.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or description.
        message: String,
    },

    /// The request never completed (connect, TLS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The response arrived but did not contain a usable completion.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// An opaque completion backend: ordered messages in, reply text out.
#[async_trait::async_trait]
pub trait LlmDriver: Send + Sync {
    /// Run one completion and return the reply text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;
}
