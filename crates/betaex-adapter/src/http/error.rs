/*
[INPUT]:  Error sources (HTTP, validation, serialization, stream transport)
[OUTPUT]: Structured error types with context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the BetaEx adapter
#[derive(Error, Debug)]
pub enum BetaexError {
    /// HTTP request could not be sent or its body could not be read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Exchange answered with a non-200 status
    #[error("Transport error (status {status}): {message}")]
    Transport { status: u16, message: String },

    /// Local precondition failed before any network call
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Private endpoint called without credentials
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Stream handshake failed
    #[error("Connection to {url} failed: {message}")]
    Connect { url: String, message: String },

    /// Transport reported end-of-stream
    #[error("Stream closed by transport")]
    StreamClosed,

    /// Watchdog saw no inbound message for longer than the silence threshold
    #[error("Stream suspected dead after {silence_ms}ms of silence")]
    SuspectedDead { silence_ms: u64 },

    /// Consumer message handler failed
    #[error("Message handler failed: {0}")]
    Handler(String),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation timed out
    #[error("Timeout after {duration}ms")]
    Timeout { duration: u64 },
}

impl BetaexError {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            BetaexError::Http(_)
            | BetaexError::Connect { .. }
            | BetaexError::StreamClosed
            | BetaexError::SuspectedDead { .. }
            | BetaexError::WebSocket(_)
            | BetaexError::Timeout { .. } => true,
            BetaexError::Transport { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
            }
            _ => false,
        }
    }

    /// Check if the error was raised locally before touching the network
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            BetaexError::Validation(_) | BetaexError::Authentication { .. } | BetaexError::Config(_)
        )
    }

    /// HTTP status carried by a transport error
    pub fn status(&self) -> Option<u16> {
        match self {
            BetaexError::Transport { status, .. } => Some(*status),
            BetaexError::Http(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// Create a transport error from status code and message
    pub fn transport(status: StatusCode, message: impl Into<String>) -> Self {
        BetaexError::Transport {
            status: status.as_u16(),
            message: message.into(),
        }
    }
}

/// Result type alias for BetaEx operations
pub type Result<T> = std::result::Result<T, BetaexError>;
