//! Completion-service boundary for the murmur bot.
//!
//! The kernel talks to `LlmDriver`, a small async trait; the shipped
//! implementation is an OpenAI-compatible chat-completions client. Tests mock
//! the trait instead of the network.

pub mod driver;
pub mod openai;

pub use driver::{CompletionRequest, LlmDriver, LlmError};
pub use openai::OpenAiDriver;
