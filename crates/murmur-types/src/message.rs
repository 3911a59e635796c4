//! Chat turns — the element of the short-term transcript and of every
//! completion request.
//!
//! `ChatTurn` serializes as `{"role": "...", "content": "..."}`, which is
//! both the persisted transcript format and the chat-completions wire format,
//! so a stored history can be sent to the backend without translation.

use serde::{Deserialize, Serialize};

/// The speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A system instruction.
    System,
    /// A message from the human user.
    User,
    /// A reply produced by the bot.
    Assistant,
}

/// One role-tagged turn of conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who spoke.
    pub role: Role,
    /// What they said.
    pub content: String,
}

impl ChatTurn {
    /// Create a system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
