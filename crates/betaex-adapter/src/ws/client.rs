/*
[INPUT]:  Subscription URL, stream timing config, consumer handler, transport
[OUTPUT]: Ordered message dispatch over a self-healing connection
[POS]:    WebSocket layer - connection state machine, watchdog and reconnection
[UPDATE]: When changing liveness detection, reconnection or shutdown semantics
*/

use std::future::pending;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, sleep_until, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::http::{BetaexError, Result};
use crate::ws::backoff::ReconnectBackoff;
use crate::ws::channel::{Channel, subscription_url, validate_stream_url};
use crate::ws::handler::{StreamCommand, StreamHandler, StreamSender};
use crate::ws::message::{PING_MESSAGE, StreamMessage};
use crate::ws::transport::{StreamConnection, StreamTransport, TungsteniteTransport};

pub const DEFAULT_MAX_SILENCE: Duration = Duration::from_secs(30);
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Connection lifecycle as seen by consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Disconnected,
    Connecting,
    Connected,
    DeadPendingReconnect,
}

/// Stream timing and addressing
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Subscription URL, reused unchanged on every reconnect
    pub url: String,
    /// Silence after which a connection is treated as dead
    pub max_silence: Duration,
    /// Watchdog polling period
    pub check_interval: Duration,
    pub connect_timeout: Duration,
    /// Send `PING` on this period; off unless set
    pub keep_alive_interval: Option<Duration>,
    pub backoff: ReconnectBackoff,
}

impl StreamConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_silence: DEFAULT_MAX_SILENCE,
            check_interval: DEFAULT_CHECK_INTERVAL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            keep_alive_interval: None,
            backoff: ReconnectBackoff::default(),
        }
    }

    pub fn for_channel(base_url: &str, channel: &Channel) -> Result<Self> {
        Ok(Self::new(subscription_url(base_url, channel)?))
    }

    pub fn validate(&self) -> Result<()> {
        validate_stream_url(&self.url)?;
        if self.max_silence.is_zero() || self.check_interval.is_zero() {
            return Err(BetaexError::Config(
                "max_silence and check_interval must be non-zero".to_string(),
            ));
        }
        if self.keep_alive_interval.is_some_and(|period| period.is_zero()) {
            return Err(BetaexError::Config(
                "keep_alive_interval must be non-zero".to_string(),
            ));
        }
        if self.check_interval >= self.max_silence {
            warn!(
                check_interval_ms = self.check_interval.as_millis() as u64,
                max_silence_ms = self.max_silence.as_millis() as u64,
                "watchdog period is not smaller than the silence threshold"
            );
        }
        Ok(())
    }
}

/// Streaming market-data client.
///
/// Owns one worker task that drives the connection, the watchdog and the
/// consumer handler. The task lives until [`stop`](Self::stop) is called or
/// the client is dropped.
#[derive(Debug)]
pub struct BetaexStream {
    url: String,
    sender: StreamSender,
    state_rx: watch::Receiver<StreamState>,
    shutdown: CancellationToken,
    worker_handle: Option<JoinHandle<()>>,
}

impl BetaexStream {
    /// Start streaming over tokio-tungstenite
    pub fn start<H: StreamHandler>(config: StreamConfig, handler: H) -> Result<Self> {
        Self::start_with_transport(config, handler, TungsteniteTransport)
    }

    /// Start streaming over a caller-supplied transport
    pub fn start_with_transport<H, T>(config: StreamConfig, handler: H, transport: T) -> Result<Self>
    where
        H: StreamHandler,
        T: StreamTransport,
    {
        config.validate()?;

        if tokio::runtime::Handle::try_current().is_err() {
            return Err(BetaexError::Config(
                "BetaexStream must be started inside a Tokio runtime".to_string(),
            ));
        }

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(StreamState::Disconnected);
        let shutdown = CancellationToken::new();
        let sender = StreamSender::new(cmd_tx);
        let url = config.url.clone();

        let worker = StreamWorker {
            backoff: config.backoff.clone(),
            config,
            handler,
            transport,
            connection: None,
            last_receive: Instant::now(),
            reconnect_at: None,
            cmd_rx,
            sender: sender.clone(),
            state_tx,
            shutdown: shutdown.clone(),
        };

        let worker_handle = tokio::spawn(worker.run());

        Ok(Self {
            url,
            sender,
            state_rx,
            shutdown,
            worker_handle: Some(worker_handle),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> StreamState {
        *self.state_rx.borrow()
    }

    /// Subscribe to connection state changes
    pub fn subscribe_state(&self) -> watch::Receiver<StreamState> {
        self.state_rx.clone()
    }

    pub fn sender(&self) -> StreamSender {
        self.sender.clone()
    }

    pub fn send_text(&self, text: impl Into<String>) -> Result<()> {
        self.sender.send_text(text)
    }

    pub fn keep_alive(&self) -> Result<()> {
        self.sender.keep_alive()
    }

    pub fn reconnect(&self) -> Result<()> {
        self.sender.reconnect()
    }

    pub fn is_running(&self) -> bool {
        self.worker_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the worker, close the connection and wait for the task to end
    pub async fn stop(&mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.worker_handle.take()
            && let Err(err) = handle.await
        {
            warn!(url = %self.url, error = %err, "stream worker ended abnormally");
        }
    }
}

impl Drop for BetaexStream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

enum WorkerEvent {
    Shutdown,
    Command(StreamCommand),
    Inbound(Option<Result<StreamMessage>>),
    WatchdogTick,
    ReconnectDue,
    KeepAliveTick,
}

struct StreamWorker<H, T> {
    config: StreamConfig,
    handler: H,
    transport: T,
    connection: Option<Box<dyn StreamConnection>>,
    last_receive: Instant,
    backoff: ReconnectBackoff,
    reconnect_at: Option<Instant>,
    cmd_rx: mpsc::UnboundedReceiver<StreamCommand>,
    sender: StreamSender,
    state_tx: watch::Sender<StreamState>,
    shutdown: CancellationToken,
}

impl<H, T> StreamWorker<H, T>
where
    H: StreamHandler,
    T: StreamTransport,
{
    async fn run(mut self) {
        self.connect().await;

        let mut watchdog = periodic(self.config.check_interval);
        let mut keep_alive = self.config.keep_alive_interval.map(periodic);

        loop {
            let event = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => WorkerEvent::Shutdown,
                command = self.cmd_rx.recv() => match command {
                    Some(command) => WorkerEvent::Command(command),
                    None => WorkerEvent::Shutdown,
                },
                inbound = next_inbound(&mut self.connection) => WorkerEvent::Inbound(inbound),
                _ = sleep_until_due(self.reconnect_at) => WorkerEvent::ReconnectDue,
                _ = watchdog.tick() => WorkerEvent::WatchdogTick,
                _ = tick_if_enabled(keep_alive.as_mut()) => WorkerEvent::KeepAliveTick,
            };

            match event {
                WorkerEvent::Shutdown => break,
                WorkerEvent::Command(command) => self.handle_command(command).await,
                WorkerEvent::Inbound(Some(Ok(message))) => self.dispatch(message).await,
                WorkerEvent::Inbound(Some(Err(err))) => {
                    error!(url = %self.config.url, error = %err, "stream read failed");
                    self.handle_closed(err).await;
                }
                WorkerEvent::Inbound(None) => {
                    error!(url = %self.config.url, "connection closed");
                    self.handle_closed(BetaexError::StreamClosed).await;
                }
                WorkerEvent::ReconnectDue => self.connect().await,
                WorkerEvent::WatchdogTick => self.check_liveness().await,
                WorkerEvent::KeepAliveTick => self.keep_alive().await,
            }
        }

        self.discard_connection().await;
        self.set_state(StreamState::Disconnected);
        info!(url = %self.config.url, "stream stopped");
    }

    async fn connect(&mut self) {
        self.reconnect_at = None;
        self.discard_connection().await;
        self.set_state(StreamState::Connecting);
        self.last_receive = Instant::now();

        info!(url = %self.config.url, attempt = self.backoff.attempts(), "connecting");

        let connect_timeout = self.config.connect_timeout;
        let attempt = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => None,
            attempt = timeout(connect_timeout, self.transport.connect(&self.config.url)) => Some(attempt),
        };
        let Some(attempt) = attempt else {
            info!(url = %self.config.url, "shutdown during handshake, attempt abandoned");
            self.set_state(StreamState::Disconnected);
            return;
        };
        let outcome = match attempt {
            Ok(result) => result,
            Err(_) => Err(BetaexError::Timeout {
                duration: connect_timeout.as_millis() as u64,
            }),
        };

        match outcome {
            Ok(connection) => {
                self.connection = Some(connection);
                self.last_receive = Instant::now();
                self.set_state(StreamState::Connected);
                info!(url = %self.config.url, "connected");

                let hook = tokio::select! {
                    biased;
                    _ = self.shutdown.cancelled() => None,
                    hook = AssertUnwindSafe(self.handler.on_connected(&self.sender)).catch_unwind() => Some(hook),
                };
                match hook {
                    None => debug!(url = %self.config.url, "shutdown during on_connected"),
                    Some(Ok(Ok(()))) => {}
                    Some(Ok(Err(err))) => {
                        let fault = BetaexError::Handler(err.to_string());
                        warn!(url = %self.config.url, error = %fault, "on_connected failed");
                    }
                    Some(Err(_)) => error!(url = %self.config.url, "on_connected panicked"),
                }
            }
            Err(err) => {
                let err = match err {
                    BetaexError::Connect { .. } => err,
                    other => BetaexError::Connect {
                        url: self.config.url.clone(),
                        message: other.to_string(),
                    },
                };
                error!(url = %self.config.url, error = %err, "connection error");
                self.set_state(StreamState::Disconnected);
                self.handler.on_stream_error(&err).await;
            }
        }
    }

    async fn dispatch(&mut self, message: StreamMessage) {
        self.last_receive = Instant::now();
        self.backoff.reset();

        if message.is_keep_alive_reply() {
            trace!("keep-alive reply received");
        }

        let outcome = AssertUnwindSafe(self.handler.on_message(&message))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                let fault = BetaexError::Handler(err.to_string());
                warn!(
                    error = %fault,
                    message = %message.log_preview(),
                    "on_message failed"
                );
            }
            Err(_) => {
                error!(
                    message = %message.log_preview(),
                    "on_message panicked"
                );
            }
        }
    }

    async fn handle_closed(&mut self, reason: BetaexError) {
        self.discard_connection().await;
        self.set_state(StreamState::Disconnected);
        self.handler.on_stream_error(&reason).await;
        self.schedule_reconnect().await;
    }

    async fn check_liveness(&mut self) {
        let silence = Instant::now().saturating_duration_since(self.last_receive);
        if silence <= self.config.max_silence || self.reconnect_at.is_some() {
            return;
        }

        let silence_ms = silence.as_millis() as u64;
        let state = self.state();
        match state {
            StreamState::Connected => {
                let verdict = BetaexError::SuspectedDead { silence_ms };
                error!(url = %self.config.url, silence_ms, "stream is dead");
                self.set_state(StreamState::DeadPendingReconnect);
                self.discard_connection().await;
                self.handler.on_stream_error(&verdict).await;
                self.schedule_reconnect().await;
            }
            StreamState::Disconnected => {
                warn!(url = %self.config.url, silence_ms, "no live connection, retrying");
                self.schedule_reconnect().await;
            }
            StreamState::Connecting | StreamState::DeadPendingReconnect => {}
        }
    }

    async fn schedule_reconnect(&mut self) {
        let delay = self.backoff.next_delay();
        if delay.is_zero() {
            error!(url = %self.config.url, "reconnecting...");
            self.connect().await;
            return;
        }

        warn!(
            url = %self.config.url,
            delay_ms = delay.as_millis() as u64,
            attempt = self.backoff.attempts(),
            "reconnect scheduled"
        );
        self.reconnect_at = Some(Instant::now() + delay);
    }

    async fn handle_command(&mut self, command: StreamCommand) {
        match command {
            StreamCommand::Send(text) => self.send(text).await,
            StreamCommand::KeepAlive => self.keep_alive().await,
            StreamCommand::Reconnect => {
                info!(url = %self.config.url, "reconnect requested");
                self.connect().await;
            }
        }
    }

    async fn keep_alive(&mut self) {
        if self.connection.is_some() {
            self.send(PING_MESSAGE.to_string()).await;
            return;
        }

        if self.reconnect_at.is_none() && self.state() == StreamState::Disconnected {
            info!(url = %self.config.url, "keep-alive found no connection, reconnecting");
            self.connect().await;
        }
    }

    async fn send(&mut self, text: String) {
        let Some(connection) = self.connection.as_mut() else {
            warn!(url = %self.config.url, "not connected, outbound message dropped");
            return;
        };

        let sent = connection.send(text).await;
        if let Err(err) = sent {
            error!(url = %self.config.url, error = %err, "stream write failed");
            self.handle_closed(err).await;
        }
    }

    async fn discard_connection(&mut self) {
        if let Some(mut connection) = self.connection.take()
            && timeout(CLOSE_TIMEOUT, connection.close()).await.is_err()
        {
            debug!(url = %self.config.url, "close timed out, handle dropped");
        }
    }

    fn state(&self) -> StreamState {
        *self.state_tx.borrow()
    }

    fn set_state(&self, state: StreamState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            debug!(url = %self.config.url, ?previous, ?state, "stream state changed");
        }
    }
}

fn periodic(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_inbound(
    connection: &mut Option<Box<dyn StreamConnection>>,
) -> Option<Result<StreamMessage>> {
    match connection.as_mut() {
        Some(connection) => connection.recv().await,
        None => pending().await,
    }
}

async fn sleep_until_due(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

async fn tick_if_enabled(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::handler::handler_fn;

    #[test]
    fn test_config_defaults() {
        let config = StreamConfig::new("wss://ws.betaex.com/sub?id=trade.BTC_USDT");
        assert_eq!(config.max_silence, Duration::from_secs(30));
        assert_eq!(config.check_interval, Duration::from_secs(10));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert!(config.keep_alive_interval.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_for_channel() {
        let config = StreamConfig::for_channel("wss://host/sub", &Channel::ticker("BTC_USDT")).unwrap();
        assert_eq!(config.url, "wss://host/sub?id=ticker.BTC_USDT");
    }

    #[test]
    fn test_config_rejects_zero_periods() {
        let mut config = StreamConfig::new("wss://host/sub?id=trade.BTC_USDT");
        config.check_interval = Duration::ZERO;
        assert!(matches!(config.validate(), Err(BetaexError::Config(_))));

        let mut config = StreamConfig::new("wss://host/sub?id=trade.BTC_USDT");
        config.keep_alive_interval = Some(Duration::ZERO);
        assert!(matches!(config.validate(), Err(BetaexError::Config(_))));
    }

    #[test]
    fn test_start_outside_runtime_fails() {
        let config = StreamConfig::new("wss://host/sub?id=trade.BTC_USDT");
        let err = BetaexStream::start(config, handler_fn(|_: &StreamMessage| Ok(()))).unwrap_err();
        assert!(matches!(err, BetaexError::Config(_)));
    }
}
