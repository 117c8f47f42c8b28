//! End-to-end command flow: channel message in, completion over HTTP, reply out.

use async_trait::async_trait;
use gptrelay::Relay;
use gptrelay::channels::{Channel, ChannelMessage};
use gptrelay::commands::handlers::{FAILURE_REPLY, FLUSH_REPLY, GROUP_MODE_REPLY, STATUS_REPLY};
use gptrelay::prompt::{DEFAULT_SYSTEM_PROMPT, PromptAssembler};
use gptrelay::providers::{GenerationParams, OpenAiProvider};
use gptrelay::session::{Exchange, SessionKey, SessionManager};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingChannel {
    sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingChannel {
    fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn identify(&self) -> anyhow::Result<String> {
        Ok("relay_bot".into())
    }

    async fn send(&self, message: &str, chat_id: i64) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push((chat_id, message.to_string()));
        Ok(())
    }

    async fn listen(
        &self,
        _tx: mpsc::Sender<ChannelMessage>,
        _cancel: CancellationToken,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

fn command(sender_id: i64, chat_id: i64, text: &str) -> ChannelMessage {
    ChannelMessage {
        id: format!("{sender_id}-{text}"),
        sender_id,
        sender_name: None,
        chat_id,
        text: text.to_string(),
        is_command: true,
        timestamp: 0,
    }
}

fn completion(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "model": "gpt-3.5-turbo",
        "choices": [{"message": {"role": "assistant", "content": text}}],
        "usage": {"prompt_tokens": 12, "completion_tokens": 3}
    }))
}

struct Harness {
    relay: Relay,
    channel: Arc<RecordingChannel>,
    sessions: Arc<SessionManager>,
}

fn harness(server: &MockServer) -> Harness {
    let provider = Arc::new(OpenAiProvider::with_base_url(
        Some("sk-test"),
        &server.uri(),
        10,
    ));
    let sessions = Arc::new(SessionManager::default());
    let assembler = PromptAssembler::new(
        provider,
        Arc::clone(&sessions),
        GenerationParams::default(),
        DEFAULT_SYSTEM_PROMPT,
        Duration::from_secs(5),
    );
    let channel = Arc::new(RecordingChannel::default());
    let relay = Relay::new(Arc::clone(&channel) as Arc<dyn Channel>, assembler, 1);
    Harness {
        relay,
        channel,
        sessions,
    }
}

async fn run_batch(relay: &Relay, messages: Vec<ChannelMessage>) {
    let (tx, rx) = mpsc::channel(messages.len().max(1));
    for msg in messages {
        tx.send(msg).await.unwrap();
    }
    drop(tx);
    relay.process(rx, &CancellationToken::new()).await;
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/chat/completions")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn first_prompt_records_one_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .respond_with(completion("hi there"))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    run_batch(&h.relay, vec![command(42, 42, "/gpt hello")]).await;

    assert_eq!(h.channel.sent(), vec![(42, "hi there".to_string())]);
    assert_eq!(
        h.sessions.store().get(SessionKey(42)),
        vec![Exchange::new("hello", "hi there")]
    );

    let bodies = request_bodies(&server).await;
    let messages = bodies[0]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[1], json!({"role": "user", "content": "hello"}));
    assert_eq!(bodies[0]["model"], "gpt-3.5-turbo");
    assert_eq!(bodies[0]["max_tokens"], 300);
}

#[tokio::test]
async fn follow_up_prompt_recalls_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion("hi there"))
        .mount(&server)
        .await;

    let h = harness(&server);
    run_batch(
        &h.relay,
        vec![command(42, 42, "/gpt hello"), command(42, 42, "/gpt and again?")],
    )
    .await;

    assert_eq!(h.sessions.store().len(SessionKey(42)), 2);

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies.len(), 2);
    let messages = bodies[1]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(
        messages[1]["content"],
        "Our chat history: user: hello assistant: hi there\n"
    );
    assert_eq!(messages[2]["content"], "and again?");
}

#[tokio::test]
async fn group_mode_shares_context_across_senders() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion("noted"))
        .mount(&server)
        .await;

    let h = harness(&server);
    run_batch(
        &h.relay,
        vec![
            command(1, -500, "/mode group"),
            command(1, -500, "/gpt remember 7"),
            command(2, -500, "/gpt what number?"),
        ],
    )
    .await;

    assert_eq!(h.channel.sent()[0], (-500, GROUP_MODE_REPLY.to_string()));
    assert_eq!(h.sessions.store().len(SessionKey(-500)), 2);
    assert_eq!(h.sessions.store().len(SessionKey(1)), 0);
    assert_eq!(h.sessions.store().len(SessionKey(2)), 0);
}

#[tokio::test]
async fn flush_clears_every_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion("ok"))
        .mount(&server)
        .await;

    let h = harness(&server);
    run_batch(
        &h.relay,
        vec![command(1, 1, "/gpt a"), command(2, 2, "/gpt b")],
    )
    .await;
    assert_eq!(h.sessions.store().session_count(), 2);

    run_batch(&h.relay, vec![command(1, 1, "/flush"), command(1, 1, "/status")]).await;

    assert_eq!(h.sessions.store().session_count(), 0);
    let sent = h.channel.sent();
    assert_eq!(sent[2], (1, FLUSH_REPLY.to_string()));
    assert_eq!(sent[3], (1, STATUS_REPLY.to_string()));
}

#[tokio::test]
async fn upstream_error_replies_with_failure_and_keeps_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let h = harness(&server);
    run_batch(&h.relay, vec![command(9, 9, "/gpt hello")]).await;

    assert_eq!(h.channel.sent(), vec![(9, FAILURE_REPLY.to_string())]);
    assert!(h.sessions.store().get(SessionKey(9)).is_empty());
}
