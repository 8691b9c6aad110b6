/*
[INPUT]:  Stream lifecycle events and inbound messages
[OUTPUT]: Consumer callbacks plus an outbound handle for consumer payloads
[POS]:    WebSocket layer - consumer extension points
[UPDATE]: When adding callbacks or outbound commands
*/

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::http::{BetaexError, Result};
use crate::ws::message::StreamMessage;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = std::result::Result<(), HandlerError>;

/// Consumer side of a [`BetaexStream`](crate::ws::BetaexStream).
///
/// Every callback runs on the stream's worker task, one at a time, in
/// arrival order. Errors returned here are logged and the stream keeps going.
#[async_trait]
pub trait StreamHandler: Send + 'static {
    /// Called once per successful connection. The base client sends no
    /// subscribe payload; queue one through `sender` if the channel needs it.
    async fn on_connected(&mut self, _sender: &StreamSender) -> HandlerResult {
        Ok(())
    }

    /// Text and binary frames arrive exactly as the transport delivered them
    async fn on_message(&mut self, message: &StreamMessage) -> HandlerResult;

    /// Connect failures, closures and suspected deaths
    async fn on_stream_error(&mut self, _error: &BetaexError) {}
}

/// Adapts a closure into a [`StreamHandler`]
pub struct FnHandler<F> {
    f: F,
}

pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: FnMut(&StreamMessage) -> HandlerResult + Send + 'static,
{
    FnHandler { f }
}

#[async_trait]
impl<F> StreamHandler for FnHandler<F>
where
    F: FnMut(&StreamMessage) -> HandlerResult + Send + 'static,
{
    async fn on_message(&mut self, message: &StreamMessage) -> HandlerResult {
        (self.f)(message)
    }
}

#[derive(Debug)]
pub(crate) enum StreamCommand {
    Send(String),
    KeepAlive,
    Reconnect,
}

/// Queues work for the stream worker
#[derive(Debug, Clone)]
pub struct StreamSender {
    cmd_tx: mpsc::UnboundedSender<StreamCommand>,
}

impl StreamSender {
    pub(crate) fn new(cmd_tx: mpsc::UnboundedSender<StreamCommand>) -> Self {
        Self { cmd_tx }
    }

    /// Send a text frame on the current connection
    pub fn send_text(&self, text: impl Into<String>) -> Result<()> {
        self.command(StreamCommand::Send(text.into()))
    }

    /// Send `PING` now, or reconnect if there is no connection
    pub fn keep_alive(&self) -> Result<()> {
        self.command(StreamCommand::KeepAlive)
    }

    /// Drop the current connection and connect again to the same URL
    pub fn reconnect(&self) -> Result<()> {
        self.command(StreamCommand::Reconnect)
    }

    fn command(&self, command: StreamCommand) -> Result<()> {
        self.cmd_tx
            .send(command)
            .map_err(|_| BetaexError::WebSocket("stream worker stopped".to_string()))
    }
}
