//! End-to-end scheduler scenarios with a paused clock, a mock transport, and
//! a mock completion backend.
//!
//! All tests run on the paused tokio clock: `sleep` in a test advances
//! virtual time deterministically through every armed timer, so the 15-second
//! idle window and the multi-second delivery pacing cost nothing real.

use murmur_kernel::Kernel;
use murmur_llm::{CompletionRequest, LlmDriver, LlmError};
use murmur_telegram::Transport;
use murmur_types::config::BotConfig;
use murmur_types::error::MurmurResult;
use murmur_types::message::Role;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Transport that records everything it is asked to send.
#[derive(Default)]
struct MockTransport {
    sent: Mutex<Vec<(i64, String)>>,
    typing: Mutex<usize>,
}

impl MockTransport {
    fn texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }

    fn typing_count(&self) -> usize {
        *self.typing.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> MurmurResult<()> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn send_typing(&self, _chat_id: i64) -> MurmurResult<()> {
        *self.typing.lock().unwrap() += 1;
        Ok(())
    }
}

/// Scripted completion backend: pops one canned outcome per call and records
/// every request it sees. An exhausted script answers "ok.".
struct MockLlm {
    requests: Mutex<Vec<CompletionRequest>>,
    script: Mutex<VecDeque<Result<String, ()>>>,
    /// Simulated service latency, observed on the paused clock.
    delay: Duration,
}

impl MockLlm {
    fn scripted(outcomes: Vec<Result<&str, ()>>) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            script: Mutex::new(
                outcomes
                    .into_iter()
                    .map(|r| r.map(str::to_string))
                    .collect(),
            ),
            delay: Duration::ZERO,
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Contents of the user turns in the nth recorded request.
    fn user_turns(&self, n: usize) -> Vec<String> {
        self.requests()[n]
            .messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl LlmDriver for MockLlm {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request);
        // The outcome is bound to the request up front, so a call cancelled
        // during the simulated latency still consumes its script entry.
        let outcome = self.script.lock().unwrap().pop_front();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match outcome {
            Some(Ok(text)) => Ok(text),
            Some(Err(())) => Err(LlmError::Api {
                status: 500,
                message: "mock failure".to_string(),
            }),
            None => Ok("ok.".to_string()),
        }
    }
}

fn boot(memory_enabled: bool, llm: MockLlm) -> (tempfile::TempDir, Kernel, Arc<MockTransport>, Arc<MockLlm>) {
    let dir = tempfile::tempdir().unwrap();
    let config = BotConfig {
        data_dir: dir.path().to_path_buf(),
        memory_enabled,
        ..BotConfig::default()
    };
    let transport = Arc::new(MockTransport::default());
    let llm = Arc::new(llm);
    let kernel = Kernel::new(config, transport.clone(), llm.clone()).unwrap();
    (dir, kernel, transport, llm)
}

async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
}

const CHAT: i64 = 111222333;

#[tokio::test(start_paused = true)]
async fn single_message_gets_exactly_one_reply() {
    let (_dir, kernel, transport, llm) =
        boot(false, MockLlm::scripted(vec![Ok("Hello there.")]));

    kernel.handle_message(CHAT, "Hi");

    // Nothing happens inside the idle window
    advance(Duration::from_secs(10)).await;
    assert!(llm.requests().is_empty());
    assert!(transport.texts().is_empty());

    // 20 units after the message: settled, generated, delivered
    advance(Duration::from_secs(10)).await;
    assert_eq!(llm.requests().len(), 1);
    assert_eq!(llm.user_turns(0), vec!["Hi".to_string()]);
    assert_eq!(transport.texts(), vec!["hello there".to_string()]);
    assert!(transport.typing_count() >= 1);
}

#[tokio::test(start_paused = true)]
async fn burst_within_idle_window_coalesces_into_one_reply() {
    let (_dir, kernel, transport, llm) = boot(false, MockLlm::scripted(vec![Ok("One reply.")]));

    kernel.handle_message(CHAT, "Hi");
    advance(Duration::from_secs(2)).await;
    kernel.handle_message(CHAT, "there");

    advance(Duration::from_secs(30)).await;

    // One chain ran, with the full two-turn history
    assert_eq!(llm.requests().len(), 1);
    assert_eq!(
        llm.user_turns(0),
        vec!["Hi".to_string(), "there".to_string()]
    );
    assert_eq!(transport.texts(), vec!["one reply".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn superseded_wait_never_triggers_generation() {
    let (_dir, kernel, _transport, llm) = boot(false, MockLlm::scripted(vec![Ok("Late.")]));

    kernel.handle_message(CHAT, "Hi");
    advance(Duration::from_secs(14)).await;
    kernel.handle_message(CHAT, "wait");

    // The first wait would have fired at t=15; it was cancelled.
    advance(Duration::from_secs(14)).await;
    assert!(llm.requests().is_empty());

    // The re-armed wait fires 15 units after the second message.
    advance(Duration::from_secs(5)).await;
    assert_eq!(llm.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn superseded_delivery_stops_mid_stream() {
    let (_dir, kernel, transport, _llm) = boot(
        false,
        MockLlm::scripted(vec![Ok("one. two. three. four."), Err(())]),
    );

    kernel.handle_message(CHAT, "Hi");
    // Settle at t=15; thinking pause + ~1s per chunk means the stream is
    // mid-flight (at least one chunk out, not all four) by t=19.
    advance(Duration::from_secs(19)).await;
    let sent_at_supersession = transport.texts();
    assert!(!sent_at_supersession.is_empty());
    assert!(sent_at_supersession.len() < 4);

    kernel.handle_message(CHAT, "actually wait");
    advance(Duration::from_secs(60)).await;

    // No chunk was emitted after the supersession point (the second
    // generation failed, so nothing new was sent either).
    let final_sent = transport.texts();
    assert_eq!(final_sent, sent_at_supersession);

    // What was sent is a prefix of the full chunk sequence
    let all_chunks = ["one", "two", "three", "four"];
    for (i, text) in final_sent.iter().enumerate() {
        assert_eq!(text, all_chunks[i]);
    }
}

#[tokio::test(start_paused = true)]
async fn service_error_sends_nothing_and_next_message_recovers() {
    let (_dir, kernel, transport, llm) =
        boot(false, MockLlm::scripted(vec![Err(()), Ok("Hello.")]));

    kernel.handle_message(CHAT, "Hi");
    advance(Duration::from_secs(30)).await;
    assert_eq!(llm.requests().len(), 1);
    assert!(transport.texts().is_empty());

    // The failed turn stays in history; the next message succeeds normally.
    kernel.handle_message(CHAT, "again");
    advance(Duration::from_secs(30)).await;
    assert_eq!(llm.requests().len(), 2);
    assert_eq!(
        llm.user_turns(1),
        vec!["Hi".to_string(), "again".to_string()]
    );
    assert_eq!(transport.texts(), vec!["hello".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn reset_clears_history_for_subsequent_generation() {
    let (_dir, kernel, transport, llm) =
        boot(false, MockLlm::scripted(vec![Ok("First."), Ok("Second.")]));

    kernel.handle_message(CHAT, "Hi");
    advance(Duration::from_secs(30)).await;

    kernel.handle_reset(CHAT).await;
    assert!(transport
        .texts()
        .contains(&"short-term memory cleared".to_string()));

    kernel.handle_message(CHAT, "New");
    advance(Duration::from_secs(30)).await;

    // The second request saw only the newest turn: one system instruction
    // plus the single user turn, no stale history.
    let second = &llm.requests()[1];
    assert_eq!(second.messages.len(), 2);
    assert_eq!(llm.user_turns(1), vec!["New".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn repeated_fact_extraction_never_duplicates() {
    let (dir, kernel, _transport, llm) = boot(
        true,
        MockLlm::scripted(vec![
            Ok("Fine."),
            Ok("likes tea"),
            Ok("Fine again."),
            Ok("likes tea"),
        ]),
    );

    kernel.handle_message(CHAT, "I like tea");
    advance(Duration::from_secs(30)).await;
    kernel.handle_message(CHAT, "I still like tea");
    advance(Duration::from_secs(30)).await;

    // The extraction call targets the most recent user turn
    let extract = &llm.requests()[1];
    assert_eq!(extract.messages[0].content, "extract fact or empty");
    assert_eq!(extract.messages[1].content, "I like tea");
    assert_eq!(extract.max_tokens, 30);

    // The second chat request carries the long-term summary
    let second_chat = &llm.requests()[2];
    assert!(second_chat.messages[1]
        .content
        .starts_with("long-term memory: "));

    // The persisted fact set holds exactly one copy
    let raw = std::fs::read_to_string(dir.path().join("long_memory.json")).unwrap();
    let facts: Vec<String> = serde_json::from_str(&raw).unwrap();
    assert_eq!(facts, vec!["likes tea".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn slow_completion_result_discarded_when_superseded() {
    let (_dir, kernel, transport, llm) = boot(
        false,
        MockLlm::scripted(vec![Ok("First."), Ok("Second.")])
            .with_delay(Duration::from_secs(10)),
    );

    kernel.handle_message(CHAT, "Hi");
    // The settle fires at t=15 and the call would return at t=25; a new
    // message at t=22 supersedes the in-flight result.
    advance(Duration::from_secs(22)).await;
    kernel.handle_message(CHAT, "mid");

    advance(Duration::from_secs(60)).await;

    assert_eq!(llm.requests().len(), 2);
    // Only the second chain produced observable output
    assert_eq!(transport.texts(), vec!["second".to_string()]);
}
