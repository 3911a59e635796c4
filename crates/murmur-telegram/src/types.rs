//! Transport trait and inbound event types.

use murmur_types::error::MurmurResult;

/// Outbound operations the kernel needs from the messaging platform.
///
/// This is the seam mocked in kernel tests; the real implementation is
/// [`crate::TelegramTransport`].
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send a plain text message to a chat.
    async fn send_text(&self, chat_id: i64, text: &str) -> MurmurResult<()>;

    /// Show the "typing..." composing indicator in a chat.
    async fn send_typing(&self, chat_id: i64) -> MurmurResult<()>;
}

/// Payload of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundContent {
    /// Ordinary user text.
    Text(String),
    /// A bot command (e.g. `/reset`), name without the leading slash.
    Command {
        /// Command name.
        name: String,
        /// Whitespace-separated arguments, possibly empty.
        args: Vec<String>,
    },
}

/// One inbound message from the platform.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// Chat this message belongs to (the conversation identifier).
    pub chat_id: i64,
    /// What arrived.
    pub content: InboundContent,
}
