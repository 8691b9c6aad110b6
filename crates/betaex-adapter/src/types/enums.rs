/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::http::BetaexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Limit,
    Market,
}

/// Exchange-side order lifecycle state.
///
/// The first four variants are OPEN states, the rest are CLOSED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    PendingSubmit,
    Submitted,
    PartialFilled,
    PendingCancel,
    PartialCanceled,
    Filled,
    Canceled,
    SysCanceled,
}

impl OrderState {
    pub const OPEN: [OrderState; 4] = [
        OrderState::PendingSubmit,
        OrderState::Submitted,
        OrderState::PartialFilled,
        OrderState::PendingCancel,
    ];

    pub const CLOSED: [OrderState; 4] = [
        OrderState::PartialCanceled,
        OrderState::Filled,
        OrderState::Canceled,
        OrderState::SysCanceled,
    ];

    pub fn is_open(&self) -> bool {
        Self::OPEN.contains(self)
    }

    pub fn is_closed(&self) -> bool {
        Self::CLOSED.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::PendingSubmit => "pending_submit",
            OrderState::Submitted => "submitted",
            OrderState::PartialFilled => "partial_filled",
            OrderState::PendingCancel => "pending_cancel",
            OrderState::PartialCanceled => "partial_canceled",
            OrderState::Filled => "filled",
            OrderState::Canceled => "canceled",
            OrderState::SysCanceled => "sys_canceled",
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderState {
    type Err = BetaexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderState::OPEN
            .iter()
            .chain(OrderState::CLOSED.iter())
            .find(|state| state.as_str() == s)
            .copied()
            .ok_or_else(|| BetaexError::Validation(format!("unknown order state '{s}'")))
    }
}
