/*
[INPUT]:  Subscription channel, stream timing config and consumer handler
[OUTPUT]: Real-time market data delivered over a self-healing connection
[POS]:    WebSocket layer - real-time data streams
[UPDATE]: When adding new channels or changing connection logic
*/

pub mod backoff;
pub mod channel;
pub mod client;
pub mod handler;
pub mod message;
pub mod transport;

pub use backoff::ReconnectBackoff;
pub use channel::{Channel, DEFAULT_WS_BASE_URL, KLINE_INTERVAL_1M, subscription_url};
pub use client::{BetaexStream, StreamConfig, StreamState};
pub use handler::{FnHandler, HandlerError, HandlerResult, StreamHandler, StreamSender, handler_fn};
pub use message::{PING_MESSAGE, PONG_RESPONSE, StreamMessage, is_keep_alive_reply, parse_json};
pub use transport::{StreamConnection, StreamTransport, TungsteniteTransport};
