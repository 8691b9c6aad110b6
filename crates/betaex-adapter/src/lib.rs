/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public BetaEx adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod config;
pub mod http;
pub mod logging;
pub mod time;
pub mod types;
pub mod ws;

pub use config::{AdapterConfig, RestSettings, StreamSettings};

// Re-export commonly used types from http
pub use http::{
    BetaexClient,
    BetaexError,
    ClientConfig,
    Credentials,
    RequestSigner,
    Result,
    SignedRequest,
    generate_cid,
};

pub use logging::{LogSettings, init_logging};
pub use time::current_time_ms;

// Re-export all types
pub use types::*;

// Re-export commonly used types from ws
pub use ws::{
    BetaexStream,
    Channel,
    HandlerResult,
    StreamConfig,
    StreamHandler,
    StreamSender,
    StreamMessage,
    StreamState,
    handler_fn,
};
