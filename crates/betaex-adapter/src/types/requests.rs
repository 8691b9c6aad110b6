/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust request payloads with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use super::enums::{OrderState, OrderType, Side};
use crate::time::current_time_ms;

pub const DEFAULT_ACCOUNT_TYPE: &str = "trading";
pub const DEFAULT_LIST_LIMIT: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceRequest {
    pub currency: String,
    pub account_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceListRequest {
    pub account_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateOrderRequest {
    pub cid: String,
    pub symbol: String,
    pub side: Side,
    #[serde(with = "rust_decimal::serde::str")]
    pub qty: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(rename = "type")]
    pub order_type: OrderType,
}

/// Addresses a single exchange order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRefRequest {
    pub order_id: String,
    pub symbol: String,
}

/// Filter for the active/history order list endpoints.
///
/// Absent `state` and `side` go over the wire as empty strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderQuery {
    #[serde(serialize_with = "empty_if_none")]
    pub state: Option<OrderState>,
    #[serde(serialize_with = "empty_if_none")]
    pub side: Option<Side>,
    pub symbol: String,
    pub start_tm_ms: i64,
    pub end_tm_ms: i64,
    pub limit: u32,
}

impl OrderQuery {
    /// Query covering everything up to now, first page
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            state: None,
            side: None,
            symbol: symbol.into(),
            start_tm_ms: 0,
            end_tm_ms: current_time_ms(),
            limit: DEFAULT_LIST_LIMIT,
        }
    }

    pub fn with_state(mut self, state: OrderState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    pub fn with_time_range(mut self, start_tm_ms: i64, end_tm_ms: i64) -> Self {
        self.start_tm_ms = start_tm_ms;
        self.end_tm_ms = end_tm_ms;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeQuery {
    pub symbol: String,
    pub start_tm_ms: i64,
    pub end_tm_ms: i64,
    pub limit: u32,
}

impl TradeQuery {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            start_tm_ms: 0,
            end_tm_ms: current_time_ms(),
            limit: DEFAULT_LIST_LIMIT,
        }
    }

    pub fn with_time_range(mut self, start_tm_ms: i64, end_tm_ms: i64) -> Self {
        self.start_tm_ms = start_tm_ms;
        self.end_tm_ms = end_tm_ms;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// Empty payload for endpoints that only carry the nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EmptyRequest {}

fn empty_if_none<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(inner) => inner.serialize(serializer),
        None => serializer.serialize_str(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_query_defaults_serialize_as_empty_strings() {
        let query = OrderQuery::new("BTC_USDT").with_time_range(0, 1_000);
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(
            value,
            json!({
                "state": "",
                "side": "",
                "symbol": "BTC_USDT",
                "start_tm_ms": 0,
                "end_tm_ms": 1_000,
                "limit": 20
            })
        );
    }

    #[test]
    fn test_order_query_with_filters() {
        let query = OrderQuery::new("BTC_USDT")
            .with_state(OrderState::PartialFilled)
            .with_side(Side::Sell)
            .with_limit(5);
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["state"], "partial_filled");
        assert_eq!(value["side"], "sell");
        assert_eq!(value["limit"], 5);
    }

    #[test]
    fn test_create_order_decimals_are_strings() {
        let req = CreateOrderRequest {
            cid: "cid_abc".to_string(),
            symbol: "BTC_USDT".to_string(),
            side: Side::Buy,
            qty: "0.010".parse().unwrap(),
            price: "9500.5".parse().unwrap(),
            order_type: OrderType::Limit,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["qty"], "0.010");
        assert_eq!(value["price"], "9500.5");
        assert_eq!(value["type"], "limit");
    }

    #[test]
    fn test_empty_request_is_empty_object() {
        assert_eq!(serde_json::to_string(&EmptyRequest::default()).unwrap(), "{}");
    }
}
