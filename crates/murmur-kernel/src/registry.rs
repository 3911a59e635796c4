//! Conversation registry — per-conversation generation counters and task
//! handles.
//!
//! The generation counter is the fencing token: every inbound message bumps
//! it, and every scheduled chain (settle wait, generation, delivery) carries
//! the value it was armed with. Work whose token no longer matches is stale
//! and must go silent at its next checkpoint.

use dashmap::DashMap;
use tokio::task::JoinHandle;

/// Per-conversation state. Created lazily on first inbound message, lives for
/// the process lifetime.
#[derive(Default)]
struct Conversation {
    /// Monotonically increasing inbound-message counter.
    generation: u64,
    /// The generation whose reply was last fully produced.
    last_answered: u64,
    /// The armed settle wait, if any. At most one per conversation.
    settle: Option<JoinHandle<()>>,
    /// The in-flight delivery, if any. At most one per conversation.
    delivery: Option<JoinHandle<()>>,
}

/// Registry of all known conversations, keyed by chat id.
///
/// Safe under concurrent access from scheduled tasks racing with new inbound
/// events; every method takes `&self`.
#[derive(Default)]
pub struct ConversationRegistry {
    chats: DashMap<i64, Conversation>,
}

impl ConversationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an inbound message: bump and return the generation counter,
    /// cancelling any armed settle wait and any in-flight delivery. The
    /// returned value fences all work triggered by this message.
    pub fn record_inbound(&self, chat_id: i64) -> u64 {
        let mut chat = self.chats.entry(chat_id).or_default();
        chat.generation += 1;
        if let Some(handle) = chat.settle.take() {
            handle.abort();
        }
        if let Some(handle) = chat.delivery.take() {
            handle.abort();
        }
        chat.generation
    }

    /// Whether a generation token is still the latest for its conversation.
    pub fn is_current(&self, chat_id: i64, generation: u64) -> bool {
        self.chats
            .get(&chat_id)
            .map(|chat| chat.generation == generation)
            .unwrap_or(false)
    }

    /// Install a newly armed settle wait, superseding any prior one.
    pub fn set_settle(&self, chat_id: i64, handle: JoinHandle<()>) {
        let mut chat = self.chats.entry(chat_id).or_default();
        if let Some(prior) = chat.settle.replace(handle) {
            prior.abort();
        }
    }

    /// Install a newly started delivery, superseding any prior one.
    pub fn set_delivery(&self, chat_id: i64, handle: JoinHandle<()>) {
        let mut chat = self.chats.entry(chat_id).or_default();
        if let Some(prior) = chat.delivery.replace(handle) {
            prior.abort();
        }
    }

    /// Mark a generation as answered.
    pub fn mark_answered(&self, chat_id: i64, generation: u64) {
        if let Some(mut chat) = self.chats.get_mut(&chat_id) {
            chat.last_answered = chat.last_answered.max(generation);
        }
    }

    /// The generation whose reply was last fully produced, 0 if none.
    pub fn last_answered(&self, chat_id: i64) -> u64 {
        self.chats
            .get(&chat_id)
            .map(|chat| chat.last_answered)
            .unwrap_or(0)
    }
}
