//! Response generation — build the request, call the completion service,
//! persist the reply, hand off to delivery, optionally extract a fact.

use crate::delivery;
use crate::normalize::normalize_reply;
use crate::KernelInner;
use murmur_llm::CompletionRequest;
use murmur_types::message::ChatTurn;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Sampling temperature for the fact-extraction call.
const EXTRACT_TEMPERATURE: f32 = 0.3;
/// Output cap for the fact-extraction call — a fact is one short statement.
const EXTRACT_MAX_TOKENS: u32 = 30;
/// System instruction for the fact-extraction call.
const EXTRACT_PROMPT: &str = "extract fact or empty";

/// Generate and deliver a reply for `chat_id`, fenced by `generation`.
///
/// Bails silently whenever the token is stale: before doing anything, after
/// the completion call (which may have outlived newer input), and inside the
/// delivery task it spawns.
pub(crate) async fn respond(inner: Arc<KernelInner>, chat_id: i64, generation: u64) {
    if !inner.registry.is_current(chat_id, generation) {
        return;
    }

    let history = match inner.transcripts.history(chat_id) {
        Ok(turns) => turns,
        Err(e) => {
            warn!(chat_id, error = %e, "Failed to load transcript, using empty history");
            Vec::new()
        }
    };
    let last_user_turn = match inner.transcripts.last_user_turn(chat_id) {
        Ok(turn) => turn,
        Err(e) => {
            warn!(chat_id, error = %e, "Failed to read last user turn");
            None
        }
    };

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatTurn::system(format!(
        "{} be concise.",
        inner.config.system_prompt.trim()
    )));
    if inner.config.memory_enabled {
        if let Some(summary) = inner.facts.summary() {
            messages.push(ChatTurn::system(format!("long-term memory: {summary}")));
        }
    }
    messages.extend(history);

    let request = CompletionRequest {
        model: inner.config.chat_model.clone(),
        messages,
        temperature: inner.config.temperature,
        max_tokens: inner.config.max_tokens,
    };
    let raw = match inner.driver.complete(request).await {
        Ok(text) => text,
        Err(e) => {
            // No retry: the user's next message re-triggers the pipeline,
            // and their turn is already in the transcript.
            error!(chat_id, error = %e, "Completion failed, no reply sent");
            return;
        }
    };

    // The call may have taken long enough for new input to arrive.
    if !inner.registry.is_current(chat_id, generation) {
        debug!(chat_id, generation, "Reply superseded during completion, discarding");
        return;
    }

    let reply = normalize_reply(&raw);
    if let Err(e) = inner
        .transcripts
        .push(chat_id, ChatTurn::assistant(reply.clone()))
    {
        warn!(chat_id, error = %e, "Failed to persist assistant turn");
    }
    inner.registry.mark_answered(chat_id, generation);

    let deliver_inner = Arc::clone(&inner);
    let deliver_text = reply;
    let handle = tokio::spawn(async move {
        delivery::deliver(deliver_inner, chat_id, deliver_text, generation).await;
    });
    inner.registry.set_delivery(chat_id, handle);

    // Fact extraction rides after the reply and must never affect it.
    if inner.config.memory_enabled {
        if let Some(user_turn) = last_user_turn {
            extract_fact(&inner, chat_id, &user_turn).await;
        }
    }
}

/// Ask the memory model for zero-or-one short factual statement about the
/// most recent user turn and remember it if new. Failures are logged only.
async fn extract_fact(inner: &KernelInner, chat_id: i64, user_turn: &str) {
    let request = CompletionRequest {
        model: inner.config.memory_model.clone(),
        messages: vec![ChatTurn::system(EXTRACT_PROMPT), ChatTurn::user(user_turn)],
        temperature: EXTRACT_TEMPERATURE,
        max_tokens: EXTRACT_MAX_TOKENS,
    };

    match inner.driver.complete(request).await {
        Ok(fact) => match inner.facts.remember(&fact) {
            Ok(true) => debug!(chat_id, "Remembered new fact"),
            Ok(false) => {}
            Err(e) => error!(chat_id, error = %e, "Failed to persist fact"),
        },
        Err(e) => error!(chat_id, error = %e, "Memory extraction failed"),
    }
}
