/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for betaex-adapter tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use betaex_adapter::ws::{ReconnectBackoff, StreamConnection, StreamTransport};
use betaex_adapter::{
    BetaexClient, BetaexError, BetaexStream, Credentials, HandlerResult, Result, StreamConfig,
    StreamHandler, StreamMessage, StreamSender, StreamState,
};
use tokio::sync::mpsc;
use tokio::time::Instant;
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_API_SECRET: &str = "test-api-secret";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn signed_client(server: &MockServer) -> BetaexClient {
    BetaexClient::new(&server.uri(), Credentials::new(TEST_API_KEY, TEST_API_SECRET))
        .expect("client init")
}

/// Stream config with deterministic backoff
pub fn test_stream_config(url: &str) -> StreamConfig {
    let mut config = StreamConfig::new(url);
    config.backoff = ReconnectBackoff::new(Duration::from_secs(1), Duration::from_secs(30), 2.0, 0);
    config
}

pub async fn wait_for_state(stream: &BetaexStream, expected: StreamState) {
    let mut states = stream.subscribe_state();
    states
        .wait_for(|state| *state == expected)
        .await
        .expect("stream state channel closed");
}

/// Let the worker drain pending events without moving the clock far
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[derive(Debug, Clone)]
pub struct ConnectAttempt {
    pub url: String,
    pub at: Instant,
    pub succeeded: bool,
}

type Feed = mpsc::UnboundedSender<Result<StreamMessage>>;

#[derive(Default)]
struct MockState {
    attempts: Vec<ConnectAttempt>,
    feeds: Vec<Option<Feed>>,
    outbound: Vec<(usize, String)>,
    closed: Vec<usize>,
    failures_remaining: usize,
    hangs_remaining: usize,
}

enum ConnectPlan {
    Open(usize, mpsc::UnboundedReceiver<Result<StreamMessage>>),
    Refuse,
    Hang,
}

/// In-memory transport; each successful connect opens a feed the test writes into.
///
/// A feed that is kept but never written to behaves like a silently dead
/// socket. Dropping it with [`close_remote`](Self::close_remote) behaves like
/// a transport-level close; [`fail_read`](Self::fail_read) injects a read error.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_first(failures: usize) -> Self {
        let transport = Self::default();
        transport.state.lock().unwrap().failures_remaining = failures;
        transport
    }

    /// The first `hangs` handshakes never complete
    pub fn hanging_first(hangs: usize) -> Self {
        let transport = Self::default();
        transport.state.lock().unwrap().hangs_remaining = hangs;
        transport
    }

    pub fn attempts(&self) -> Vec<ConnectAttempt> {
        self.state.lock().unwrap().attempts.clone()
    }

    pub fn connection_count(&self) -> usize {
        self.state.lock().unwrap().feeds.len()
    }

    /// Deliver a text message on connection `index`; false if that connection is gone
    pub fn push(&self, index: usize, message: &str) -> bool {
        self.feed(index, Ok(StreamMessage::Text(message.to_string())))
    }

    pub fn push_binary(&self, index: usize, bytes: &[u8]) -> bool {
        self.feed(index, Ok(StreamMessage::Binary(bytes.to_vec())))
    }

    /// Make the next read on connection `index` fail
    pub fn fail_read(&self, index: usize, reason: &str) -> bool {
        self.feed(index, Err(BetaexError::WebSocket(reason.to_string())))
    }

    fn feed(&self, index: usize, item: Result<StreamMessage>) -> bool {
        let state = self.state.lock().unwrap();
        state
            .feeds
            .get(index)
            .and_then(|feed| feed.as_ref())
            .is_some_and(|feed| feed.send(item).is_ok())
    }

    pub fn close_remote(&self, index: usize) {
        let mut state = self.state.lock().unwrap();
        if let Some(feed) = state.feeds.get_mut(index) {
            feed.take();
        }
    }

    pub fn outbound(&self) -> Vec<(usize, String)> {
        self.state.lock().unwrap().outbound.clone()
    }

    pub fn closed(&self) -> Vec<usize> {
        self.state.lock().unwrap().closed.clone()
    }
}

#[async_trait]
impl StreamTransport for MockTransport {
    async fn connect(&self, url: &str) -> Result<Box<dyn StreamConnection>> {
        let plan = {
            let mut state = self.state.lock().unwrap();
            let plan = if state.hangs_remaining > 0 {
                state.hangs_remaining -= 1;
                ConnectPlan::Hang
            } else if state.failures_remaining > 0 {
                state.failures_remaining -= 1;
                ConnectPlan::Refuse
            } else {
                let (tx, rx) = mpsc::unbounded_channel();
                let index = state.feeds.len();
                state.feeds.push(Some(tx));
                ConnectPlan::Open(index, rx)
            };
            state.attempts.push(ConnectAttempt {
                url: url.to_string(),
                at: Instant::now(),
                succeeded: matches!(plan, ConnectPlan::Open(..)),
            });
            plan
        };

        match plan {
            ConnectPlan::Open(index, inbound) => Ok(Box::new(MockConnection {
                index,
                inbound,
                state: self.state.clone(),
            })),
            ConnectPlan::Refuse => Err(BetaexError::Connect {
                url: url.to_string(),
                message: "handshake refused".to_string(),
            }),
            ConnectPlan::Hang => std::future::pending().await,
        }
    }
}

struct MockConnection {
    index: usize,
    inbound: mpsc::UnboundedReceiver<Result<StreamMessage>>,
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl StreamConnection for MockConnection {
    async fn recv(&mut self) -> Option<Result<StreamMessage>> {
        self.inbound.recv().await
    }

    async fn send(&mut self, text: String) -> Result<()> {
        self.state.lock().unwrap().outbound.push((self.index, text));
        Ok(())
    }

    async fn close(&mut self) {
        self.inbound.close();
        self.state.lock().unwrap().closed.push(self.index);
    }
}

/// Shared view of what a [`RecordingHandler`] saw
#[derive(Clone, Default)]
pub struct Recorder {
    frames: Arc<Mutex<Vec<StreamMessage>>>,
    connects: Arc<Mutex<usize>>,
    errors: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    /// Text payloads in arrival order; binary frames shown as `<binary>`
    pub fn messages(&self) -> Vec<String> {
        self.frames()
            .iter()
            .map(|frame| frame.as_text().unwrap_or("<binary>").to_string())
            .collect()
    }

    pub fn frames(&self) -> Vec<StreamMessage> {
        self.frames.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        *self.connects.lock().unwrap()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

pub struct RecordingHandler {
    recorder: Recorder,
    reject: Option<String>,
    subscribe_payload: Option<String>,
}

impl RecordingHandler {
    pub fn new(recorder: Recorder) -> Self {
        Self {
            recorder,
            reject: None,
            subscribe_payload: None,
        }
    }

    /// Return an error after recording this message
    pub fn rejecting(mut self, message: &str) -> Self {
        self.reject = Some(message.to_string());
        self
    }

    /// Queue this payload on every successful connection
    pub fn subscribing(mut self, payload: &str) -> Self {
        self.subscribe_payload = Some(payload.to_string());
        self
    }
}

#[async_trait]
impl StreamHandler for RecordingHandler {
    async fn on_connected(&mut self, sender: &StreamSender) -> HandlerResult {
        *self.recorder.connects.lock().unwrap() += 1;
        if let Some(payload) = &self.subscribe_payload {
            sender.send_text(payload.clone())?;
        }
        Ok(())
    }

    async fn on_message(&mut self, message: &StreamMessage) -> HandlerResult {
        self.recorder.frames.lock().unwrap().push(message.clone());

        let text = message.as_text();
        if text == Some("panic") {
            panic!("handler blew up on purpose");
        }
        if text.is_some() && self.reject.as_deref() == text {
            return Err(format!("rejected {message:?}").into());
        }
        Ok(())
    }

    async fn on_stream_error(&mut self, error: &BetaexError) {
        self.recorder.errors.lock().unwrap().push(error.to_string());
    }
}
