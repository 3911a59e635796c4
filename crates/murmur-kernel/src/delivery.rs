//! Delivery simulator — streams a reply as paced chunks with typing
//! indicators, abortable at every suspension point.

use crate::chunk::split_chunks;
use crate::KernelInner;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Bounds of the "thinking" pause before the first chunk (seconds).
const THINKING_MIN_SECS: f64 = 1.0;
const THINKING_MAX_SECS: f64 = 2.0;
/// Bounds of the simulated typing speed (seconds per character).
const PER_CHAR_MIN_SECS: f64 = 0.06;
const PER_CHAR_MAX_SECS: f64 = 0.10;
/// Per-chunk typing delay clamp (seconds).
const CHUNK_DELAY_MIN_SECS: f64 = 1.0;
const CHUNK_DELAY_MAX_SECS: f64 = 6.0;
/// Fixed gap between chunks.
const INTER_CHUNK_GAP: Duration = Duration::from_millis(400);

/// Draw a uniform sample without holding the rng across an await.
fn uniform(lo: f64, hi: f64) -> f64 {
    rand::thread_rng().gen_range(lo..hi)
}

/// Stream `text` to `chat_id` in paced chunks, fenced by `generation`.
///
/// Aborts silently at any checkpoint once the token is stale; chunks already
/// sent stay sent — partial delivery is the intended outcome when superseded.
pub(crate) async fn deliver(inner: Arc<KernelInner>, chat_id: i64, text: String, generation: u64) {
    if !inner.registry.is_current(chat_id, generation) {
        return;
    }

    if let Err(e) = inner.transport.send_typing(chat_id).await {
        warn!(chat_id, error = %e, "Failed to send typing indicator");
    }
    tokio::time::sleep(Duration::from_secs_f64(uniform(
        THINKING_MIN_SECS,
        THINKING_MAX_SECS,
    )))
    .await;

    for chunk in split_chunks(&text) {
        if !inner.registry.is_current(chat_id, generation) {
            debug!(chat_id, generation, "Delivery superseded, leaving rest unsent");
            return;
        }

        if let Err(e) = inner.transport.send_typing(chat_id).await {
            warn!(chat_id, error = %e, "Failed to send typing indicator");
        }
        let per_char = uniform(PER_CHAR_MIN_SECS, PER_CHAR_MAX_SECS);
        let delay = (chunk.chars().count() as f64 * per_char)
            .clamp(CHUNK_DELAY_MIN_SECS, CHUNK_DELAY_MAX_SECS);
        tokio::time::sleep(Duration::from_secs_f64(delay)).await;

        if !inner.registry.is_current(chat_id, generation) {
            debug!(chat_id, generation, "Delivery superseded, leaving rest unsent");
            return;
        }
        if let Err(e) = inner.transport.send_text(chat_id, &chunk.to_lowercase()).await {
            warn!(chat_id, error = %e, "Failed to send chunk, stopping delivery");
            return;
        }

        tokio::time::sleep(INTER_CHUNK_GAP).await;
    }
}
