//! Bot configuration with serde defaults.
//!
//! Loaded from `~/.murmur/config.toml` by the kernel (see
//! `murmur-kernel::config`); every field is optional in the file and falls
//! back to the defaults below. Credentials never live here — they come from
//! the environment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default system prompt when the config does not provide one.
const DEFAULT_SYSTEM_PROMPT: &str =
    "You are murmur, a warm, laconic conversational companion. Keep replies short and natural.";

/// Top-level bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Log level for the tracing subscriber (overridden by RUST_LOG).
    pub log_level: String,
    /// Idle window in seconds — how long the user must stay quiet before a
    /// burst of messages is considered settled and a reply is generated.
    pub idle_secs: u64,
    /// Model used for conversational replies.
    pub chat_model: String,
    /// Model used for long-term memory fact extraction.
    pub memory_model: String,
    /// Whether long-term memory (fact extraction + prompt injection) is on.
    pub memory_enabled: bool,
    /// Sampling temperature for conversational replies.
    pub temperature: f32,
    /// Output token cap for conversational replies.
    pub max_tokens: u32,
    /// System instruction prepended to every completion request.
    pub system_prompt: String,
    /// Directory holding the persisted memory documents.
    pub data_dir: PathBuf,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            idle_secs: 15,
            chat_model: "gpt-4o-mini".to_string(),
            memory_model: "gpt-4o-mini".to_string(),
            memory_enabled: true,
            temperature: 0.6,
            max_tokens: 250,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            data_dir: default_data_dir(),
        }
    }
}

/// Get the default murmur home directory (`~/.murmur`).
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".murmur")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BotConfig::default();
        assert_eq!(config.idle_secs, 15);
        assert_eq!(config.chat_model, "gpt-4o-mini");
        assert!(config.memory_enabled);
        assert_eq!(config.max_tokens, 250);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: BotConfig = toml::from_str(
            r#"
            idle_secs = 3
            chat_model = "gpt-4o"
        "#,
        )
        .unwrap();
        assert_eq!(config.idle_secs, 3);
        assert_eq!(config.chat_model, "gpt-4o");
        // Untouched fields keep their defaults
        assert_eq!(config.log_level, "info");
        assert!((config.temperature - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: BotConfig = toml::from_str("").unwrap();
        assert_eq!(config.idle_secs, BotConfig::default().idle_secs);
    }
}
