/*
[INPUT]:  Symbol, channel kind and stream base URL
[OUTPUT]: Channel ids and subscription URLs
[POS]:    WebSocket layer - subscription addressing
[UPDATE]: When adding new channels or changing the URL scheme
*/

use std::fmt;

use url::Url;

use crate::http::{BetaexError, Result};

pub const DEFAULT_WS_BASE_URL: &str = "wss://ws.betaex.com/sub";

pub const KLINE_INTERVAL_1M: &str = "1m";

/// Market-data channel; the id goes into the `id` query parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    OrderBook { symbol: String },
    Trade { symbol: String },
    Ticker { symbol: String },
    Kline { symbol: String, interval: String },
}

impl Channel {
    pub fn order_book(symbol: impl Into<String>) -> Self {
        Channel::OrderBook {
            symbol: symbol.into(),
        }
    }

    pub fn trade(symbol: impl Into<String>) -> Self {
        Channel::Trade {
            symbol: symbol.into(),
        }
    }

    pub fn ticker(symbol: impl Into<String>) -> Self {
        Channel::Ticker {
            symbol: symbol.into(),
        }
    }

    pub fn kline(symbol: impl Into<String>, interval: impl Into<String>) -> Self {
        Channel::Kline {
            symbol: symbol.into(),
            interval: interval.into(),
        }
    }

    pub fn id(&self) -> String {
        self.to_string()
    }

    pub fn symbol(&self) -> &str {
        match self {
            Channel::OrderBook { symbol }
            | Channel::Trade { symbol }
            | Channel::Ticker { symbol }
            | Channel::Kline { symbol, .. } => symbol,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::OrderBook { symbol } => write!(f, "orderbook.{symbol}.L20"),
            Channel::Trade { symbol } => write!(f, "trade.{symbol}"),
            Channel::Ticker { symbol } => write!(f, "ticker.{symbol}"),
            Channel::Kline { symbol, interval } => write!(f, "kline.{symbol}.{interval}"),
        }
    }
}

/// `{base}?id={channel}`, checked to be a ws/wss URL
pub fn subscription_url(base: &str, channel: &Channel) -> Result<String> {
    let url = format!("{base}?id={channel}");
    validate_stream_url(&url)?;
    Ok(url)
}

pub(crate) fn validate_stream_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url)?;
    match parsed.scheme() {
        "ws" | "wss" => Ok(()),
        other => Err(BetaexError::Config(format!(
            "stream url must use ws or wss, got '{other}'"
        ))),
    }
}
