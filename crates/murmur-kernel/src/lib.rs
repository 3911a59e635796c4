//! Core kernel for the murmur bot: debounced response scheduling, response
//! generation, and human-paced delivery.
//!
//! Data flow: inbound message → transcript update → settle wait (re)armed →
//! on settle, the responder calls the completion service → the delivery
//! simulator streams the reply in paced chunks → transport. Every stage
//! carries the generation token it was armed with and goes silent as soon
//! as a newer inbound message supersedes it.

pub mod chunk;
pub mod config;
pub mod error;
pub mod normalize;
pub mod registry;

mod delivery;
mod responder;

use crate::error::KernelResult;
use crate::registry::ConversationRegistry;
use murmur_llm::LlmDriver;
use murmur_memory::{FactStore, TranscriptStore};
use murmur_telegram::Transport;
use murmur_types::config::BotConfig;
use murmur_types::message::ChatTurn;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Acknowledgement sent after a `/reset` command.
const RESET_ACK: &str = "short-term memory cleared";

/// Shared kernel state, one per process.
pub(crate) struct KernelInner {
    pub(crate) config: BotConfig,
    pub(crate) registry: ConversationRegistry,
    pub(crate) transcripts: TranscriptStore,
    pub(crate) facts: FactStore,
    pub(crate) driver: Arc<dyn LlmDriver>,
    pub(crate) transport: Arc<dyn Transport>,
}

/// The bot kernel: owns conversation state and drives the
/// wait → generate → deliver pipeline.
pub struct Kernel {
    inner: Arc<KernelInner>,
}

impl Kernel {
    /// Boot the kernel: open the persisted memory documents under the
    /// configured data directory and wire up the transport and LLM driver.
    pub fn new(
        config: BotConfig,
        transport: Arc<dyn Transport>,
        driver: Arc<dyn LlmDriver>,
    ) -> KernelResult<Self> {
        let transcripts = TranscriptStore::open(&config.data_dir)?;
        let facts = FactStore::open(&config.data_dir)?;
        Ok(Self {
            inner: Arc::new(KernelInner {
                config,
                registry: ConversationRegistry::new(),
                transcripts,
                facts,
                driver,
                transport,
            }),
        })
    }

    /// Handle an inbound text message.
    ///
    /// Appends the user turn to the transcript, bumps the conversation's
    /// generation (superseding any armed wait and any in-flight delivery),
    /// and arms a fresh settle wait. The reply is generated only once the
    /// user has stayed quiet for the full idle window.
    pub fn handle_message(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.inner.transcripts.push(chat_id, ChatTurn::user(text)) {
            warn!(chat_id, error = %e, "Failed to persist user turn");
        }

        let generation = self.inner.registry.record_inbound(chat_id);
        debug!(chat_id, generation, "Settle wait armed");

        let inner = Arc::clone(&self.inner);
        let idle = Duration::from_secs(inner.config.idle_secs);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(idle).await;
            responder::respond(inner, chat_id, generation).await;
        });
        self.inner.registry.set_settle(chat_id, handle);
    }

    /// Handle the in-channel reset command: clear the conversation's
    /// short-term history and acknowledge.
    pub async fn handle_reset(&self, chat_id: i64) {
        if let Err(e) = self.inner.transcripts.clear(chat_id) {
            warn!(chat_id, error = %e, "Failed to clear transcript");
        }
        debug!(chat_id, "Short-term history cleared");
        if let Err(e) = self.inner.transport.send_text(chat_id, RESET_ACK).await {
            warn!(chat_id, error = %e, "Failed to acknowledge reset");
        }
    }
}
