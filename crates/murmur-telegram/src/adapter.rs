//! Telegram Bot API adapter.
//!
//! Uses long-polling via `getUpdates` with exponential backoff on failures.
//! No external Telegram crate — just `reqwest` for full control over error
//! handling. Pending updates are dropped on startup so a restart does not
//! replay the backlog into the debounce scheduler.

use crate::types::{InboundContent, InboundEvent, Transport};
use futures::Stream;
use murmur_types::error::{MurmurError, MurmurResult};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Maximum backoff duration on API failures.
const MAX_BACKOFF: Duration = Duration::from_secs(60);
/// Initial backoff duration on API failures.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
/// Telegram long-polling timeout (seconds) — sent as the `timeout` parameter
/// to getUpdates.
const LONG_POLL_TIMEOUT: u64 = 30;
/// Delay between successful polls to avoid tight loops.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Telegram Bot API transport using long-polling.
pub struct TelegramTransport {
    /// SECURITY: Bot token is zeroized on drop to prevent memory disclosure.
    token: Zeroizing<String>,
    client: reqwest::Client,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl TelegramTransport {
    /// Create a new transport from a raw bot token (read from env by the
    /// caller).
    pub fn new(token: String) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            token: Zeroizing::new(token),
            client: reqwest::Client::new(),
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.token.as_str())
    }

    /// Validate the bot token by calling `getMe`. Returns the bot username.
    pub async fn validate_token(&self) -> MurmurResult<String> {
        let resp: serde_json::Value = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| MurmurError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| MurmurError::Transport(e.to_string()))?;

        if resp["ok"].as_bool() != Some(true) {
            let desc = resp["description"].as_str().unwrap_or("unknown error");
            return Err(MurmurError::Transport(format!("getMe failed: {desc}")));
        }

        Ok(resp["result"]["username"]
            .as_str()
            .unwrap_or("unknown")
            .to_string())
    }

    /// Discard the pending update backlog so old messages are not answered
    /// after a restart. `offset = -1` confirms everything up to the newest
    /// update; the returned id seeds the polling offset.
    async fn drop_pending_updates(&self) -> Option<i64> {
        let params = serde_json::json!({ "offset": -1, "timeout": 0 });
        let resp = self
            .client
            .get(self.api_url("getUpdates"))
            .json(&params)
            .send()
            .await
            .ok()?;
        let body: serde_json::Value = resp.json().await.ok()?;
        let last = body["result"].as_array()?.last()?;
        let update_id = last["update_id"].as_i64()?;
        debug!(update_id, "Dropped pending update backlog");
        Some(update_id + 1)
    }

    /// Start the long-polling loop, returning the stream of inbound events.
    pub async fn start(&self) -> MurmurResult<Pin<Box<dyn Stream<Item = InboundEvent> + Send>>> {
        // Validate token first (fail fast)
        let bot_name = self.validate_token().await?;
        info!("Telegram bot @{bot_name} connected");

        let (tx, rx) = mpsc::channel::<InboundEvent>(256);

        let initial_offset = self.drop_pending_updates().await;

        let token = self.token.clone();
        let client = self.client.clone();
        let mut shutdown = self.shutdown_rx.clone();

        tokio::spawn(async move {
            let mut offset: Option<i64> = initial_offset;
            let mut backoff = INITIAL_BACKOFF;

            loop {
                if *shutdown.borrow() {
                    break;
                }

                let url = format!("https://api.telegram.org/bot{}/getUpdates", token.as_str());
                let mut params = serde_json::json!({
                    "timeout": LONG_POLL_TIMEOUT,
                    "allowed_updates": ["message", "edited_message"],
                });
                if let Some(off) = offset {
                    params["offset"] = serde_json::json!(off);
                }

                // Request timeout slightly longer than the long-poll timeout
                let request_timeout = Duration::from_secs(LONG_POLL_TIMEOUT + 10);
                let result = tokio::select! {
                    res = async {
                        client
                            .get(&url)
                            .json(&params)
                            .timeout(request_timeout)
                            .send()
                            .await
                    } => res,
                    _ = shutdown.changed() => {
                        break;
                    }
                };

                let resp = match result {
                    Ok(resp) => resp,
                    Err(e) => {
                        warn!("getUpdates network error: {e}, retrying in {backoff:?}");
                        tokio::time::sleep(backoff).await;
                        backoff = calculate_backoff(backoff);
                        continue;
                    }
                };

                let status = resp.status();

                // Handle rate limiting
                if status.as_u16() == 429 {
                    let body: serde_json::Value = resp.json().await.unwrap_or_default();
                    let retry_after = body["parameters"]["retry_after"].as_u64().unwrap_or(5);
                    warn!("Telegram rate limited, retry after {retry_after}s");
                    tokio::time::sleep(Duration::from_secs(retry_after)).await;
                    continue;
                }

                // Another instance is polling with the same token. Not fatal:
                // log and keep retrying so whichever instance survives wins.
                if status.as_u16() == 409 {
                    warn!("Telegram 409 Conflict (duplicate instance), retrying in {backoff:?}");
                    tokio::time::sleep(backoff).await;
                    backoff = calculate_backoff(backoff);
                    continue;
                }

                if !status.is_success() {
                    let body_text = resp.text().await.unwrap_or_default();
                    warn!("getUpdates failed ({status}): {body_text}, retrying in {backoff:?}");
                    tokio::time::sleep(backoff).await;
                    backoff = calculate_backoff(backoff);
                    continue;
                }

                let body: serde_json::Value = match resp.json().await {
                    Ok(v) => v,
                    Err(e) => {
                        warn!("getUpdates parse error: {e}");
                        tokio::time::sleep(backoff).await;
                        backoff = calculate_backoff(backoff);
                        continue;
                    }
                };

                // Reset backoff on success
                backoff = INITIAL_BACKOFF;

                if body["ok"].as_bool() != Some(true) {
                    warn!("getUpdates returned ok=false");
                    tokio::time::sleep(POLL_INTERVAL).await;
                    continue;
                }

                let updates = match body["result"].as_array() {
                    Some(arr) => arr,
                    None => {
                        tokio::time::sleep(POLL_INTERVAL).await;
                        continue;
                    }
                };

                for update in updates {
                    if let Some(update_id) = update["update_id"].as_i64() {
                        offset = Some(update_id + 1);
                    }

                    let event = match parse_update(update) {
                        Some(e) => e,
                        None => continue, // not a text message
                    };

                    debug!(chat_id = event.chat_id, "Inbound message");

                    if tx.send(event).await.is_err() {
                        // Receiver dropped — the bot is shutting down
                        return;
                    }
                }

                tokio::time::sleep(POLL_INTERVAL).await;
            }

            info!("Telegram polling loop stopped");
        });

        let stream = tokio_stream::wrappers::ReceiverStream::new(rx);
        Ok(Box::pin(stream))
    }

    /// Stop the polling loop.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

#[async_trait::async_trait]
impl Transport for TelegramTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> MurmurResult<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        let resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| MurmurError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(MurmurError::Transport(format!(
                "sendMessage failed ({status}): {body_text}"
            )));
        }
        Ok(())
    }

    async fn send_typing(&self, chat_id: i64) -> MurmurResult<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "action": "typing",
        });
        self.client
            .post(self.api_url("sendChatAction"))
            .json(&body)
            .send()
            .await
            .map_err(|e| MurmurError::Transport(e.to_string()))?;
        Ok(())
    }
}

/// Parse a Telegram update JSON into an `InboundEvent`, or `None` for
/// anything that is not a text message. Handles both `message` and
/// `edited_message` update types; an edit is treated as fresh input.
fn parse_update(update: &serde_json::Value) -> Option<InboundEvent> {
    let message = update
        .get("message")
        .or_else(|| update.get("edited_message"))?;
    let chat_id = message["chat"]["id"].as_i64()?;
    let text = message["text"].as_str()?;

    // Telegram marks /commands with a bot_command entity at offset 0
    let is_command = message["entities"]
        .as_array()
        .map(|entities| {
            entities.iter().any(|e| {
                e["type"].as_str() == Some("bot_command") && e["offset"].as_i64() == Some(0)
            })
        })
        .unwrap_or(false);

    let content = if is_command {
        let parts: Vec<&str> = text.splitn(2, ' ').collect();
        let name = parts[0].trim_start_matches('/');
        // Strip @botname from the command (e.g. /reset@murmurbot -> reset)
        let name = name.split('@').next().unwrap_or(name);
        let args = if parts.len() > 1 {
            parts[1].split_whitespace().map(String::from).collect()
        } else {
            vec![]
        };
        InboundContent::Command {
            name: name.to_string(),
            args,
        }
    } else {
        InboundContent::Text(text.to_string())
    };

    Some(InboundEvent { chat_id, content })
}

/// Calculate exponential backoff capped at MAX_BACKOFF.
fn calculate_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}
