/*
[INPUT]:  Subscription URL
[OUTPUT]: Duplex connection yielding raw text/binary frames (read next / send / close)
[POS]:    WebSocket layer - socket transport seam
[UPDATE]: When swapping the socket library or changing frame handling
*/

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};

use crate::http::{BetaexError, Result};
use crate::ws::message::StreamMessage;

/// Opens physical connections for the stream worker
#[async_trait]
pub trait StreamTransport: Send + Sync + 'static {
    async fn connect(&self, url: &str) -> Result<Box<dyn StreamConnection>>;
}

/// One physical connection
#[async_trait]
pub trait StreamConnection: Send {
    /// Next inbound frame, payload untouched; `None` once the transport reports end-of-stream
    async fn recv(&mut self) -> Option<Result<StreamMessage>>;

    async fn send(&mut self, text: String) -> Result<()>;

    async fn close(&mut self);
}

/// tokio-tungstenite backed transport
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteTransport;

#[async_trait]
impl StreamTransport for TungsteniteTransport {
    async fn connect(&self, url: &str) -> Result<Box<dyn StreamConnection>> {
        let (stream, response) = connect_async(url).await.map_err(|err| BetaexError::Connect {
            url: url.to_string(),
            message: err.to_string(),
        })?;
        debug!(url, status = response.status().as_u16(), "websocket handshake complete");
        Ok(Box::new(TungsteniteConnection { stream }))
    }
}

struct TungsteniteConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl StreamConnection for TungsteniteConnection {
    async fn recv(&mut self) -> Option<Result<StreamMessage>> {
        loop {
            match self.stream.next().await? {
                Ok(WsMessage::Text(text)) => {
                    return Some(Ok(StreamMessage::Text(text.as_str().to_owned())));
                }
                Ok(WsMessage::Binary(bytes)) => return Some(Ok(StreamMessage::Binary(bytes.to_vec()))),
                Ok(WsMessage::Close(frame)) => {
                    debug!(?frame, "close frame received");
                    return None;
                }
                Ok(WsMessage::Ping(_)) | Ok(WsMessage::Pong(_)) | Ok(WsMessage::Frame(_)) => {
                    trace!("control frame skipped");
                }
                Err(err) => return Some(Err(BetaexError::WebSocket(err.to_string()))),
            }
        }
    }

    async fn send(&mut self, text: String) -> Result<()> {
        self.stream
            .send(WsMessage::Text(text.into()))
            .await
            .map_err(|err| BetaexError::WebSocket(err.to_string()))
    }

    async fn close(&mut self) {
        if let Err(err) = self.stream.close(None).await {
            debug!(error = %err, "websocket close failed");
        }
    }
}
