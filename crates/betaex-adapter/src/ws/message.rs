/*
[INPUT]:  Raw inbound stream frames
[OUTPUT]: Untouched text/binary payloads, keep-alive tokens, JSON decoding and log previews
[POS]:    WebSocket layer - message helpers shared by worker and consumers
[UPDATE]: When adding new message types or changing format
*/

use crate::http::Result;

/// Keep-alive payload sent by the client
pub const PING_MESSAGE: &str = "PING";

/// Reply the exchange sends to `PING`. Not a typo on our side.
pub const PONG_RESPONSE: &str = "POND";

pub(crate) const RAW_LOG_MAX_BYTES: usize = 1024;

/// One inbound data frame, payload exactly as received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamMessage {
    Text(String),
    /// Raw bytes, possibly compressed or not UTF-8
    Binary(Vec<u8>),
}

impl StreamMessage {
    /// Text payload; `None` for binary frames
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StreamMessage::Text(text) => Some(text),
            StreamMessage::Binary(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            StreamMessage::Text(text) => text.as_bytes(),
            StreamMessage::Binary(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, StreamMessage::Binary(_))
    }

    pub fn is_keep_alive_reply(&self) -> bool {
        self.as_text().is_some_and(is_keep_alive_reply)
    }

    /// Decode the payload as JSON, whichever frame type carried it
    pub fn parse_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(self.as_bytes())?)
    }

    /// Bounded rendering for logs; binary payloads are summarized by size
    pub(crate) fn log_preview(&self) -> String {
        match self {
            StreamMessage::Text(text) => truncate_for_log(text, RAW_LOG_MAX_BYTES),
            StreamMessage::Binary(bytes) => format!("<{} bytes binary>", bytes.len()),
        }
    }
}

impl From<String> for StreamMessage {
    fn from(text: String) -> Self {
        StreamMessage::Text(text)
    }
}

impl From<&str> for StreamMessage {
    fn from(text: &str) -> Self {
        StreamMessage::Text(text.to_string())
    }
}

impl From<Vec<u8>> for StreamMessage {
    fn from(bytes: Vec<u8>) -> Self {
        StreamMessage::Binary(bytes)
    }
}

pub fn is_keep_alive_reply(raw: &str) -> bool {
    raw.trim() == PONG_RESPONSE
}

/// Decode a data message into JSON
pub fn parse_json(raw: &str) -> Result<serde_json::Value> {
    Ok(serde_json::from_str(raw)?)
}

pub(crate) fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut cut = max_len;
    while !value.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut out = String::with_capacity(cut + 3);
    out.push_str(&value[..cut]);
    out.push_str("...");
    out
}
