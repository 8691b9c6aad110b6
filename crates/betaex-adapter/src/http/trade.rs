/*
[INPUT]:  Order and trade parameters plus signed credentials
[OUTPUT]: Order placement/cancel results and order/trade listings
[POS]:    HTTP layer - trading endpoints (require api key + signature)
[UPDATE]: When adding new trading endpoints or changing order flow
*/

use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::http::{BetaexClient, BetaexError, Result};
use crate::types::{
    ApiResponse, CreateOrderRequest, OrderQuery, OrderRefRequest, OrderType, Side, TradeQuery,
};

/// Fresh client order id; the exchange deduplicates on it
pub fn generate_cid() -> String {
    format!("cid_{}", Uuid::new_v4().simple())
}

impl BetaexClient {
    /// Place an order under a newly generated `cid`
    ///
    /// POST /api/v1/private/order/create
    pub async fn create_order(
        &self,
        symbol: &str,
        side: Side,
        qty: Decimal,
        price: Decimal,
        order_type: OrderType,
    ) -> Result<ApiResponse> {
        let req = CreateOrderRequest {
            cid: generate_cid(),
            symbol: symbol.to_string(),
            side,
            qty,
            price,
            order_type,
        };
        debug!(cid = %req.cid, symbol, side = side.as_str(), "creating order");
        self.post_private("/order/create", &req).await
    }

    /// Current state of one order, always fetched from the exchange
    ///
    /// POST /api/v1/private/order/state
    pub async fn get_order_state(&self, order_id: &str, symbol: &str) -> Result<ApiResponse> {
        let req = OrderRefRequest {
            order_id: order_id.to_string(),
            symbol: symbol.to_string(),
        };
        self.post_private("/order/state", &req).await
    }

    /// POST /api/v1/private/order/cancel
    pub async fn cancel_order(&self, order_id: &str, symbol: &str) -> Result<ApiResponse> {
        let req = OrderRefRequest {
            order_id: order_id.to_string(),
            symbol: symbol.to_string(),
        };
        self.post_private("/order/cancel", &req).await
    }

    /// Orders still working on the book; a state filter must be an OPEN state
    ///
    /// POST /api/v1/private/order/active/list
    pub async fn list_active_order(&self, query: &OrderQuery) -> Result<ApiResponse> {
        if let Some(state) = query.state
            && !state.is_open()
        {
            return Err(BetaexError::Validation(format!(
                "state filter '{state}' is not an open order state"
            )));
        }
        self.post_private("/order/active/list", query).await
    }

    /// Finished orders; a state filter must be a CLOSED state
    ///
    /// POST /api/v1/private/order/history/list
    pub async fn list_history_order(&self, query: &OrderQuery) -> Result<ApiResponse> {
        if let Some(state) = query.state
            && !state.is_closed()
        {
            return Err(BetaexError::Validation(format!(
                "state filter '{state}' is not a closed order state"
            )));
        }
        self.post_private("/order/history/list", query).await
    }

    /// POST /api/v1/private/trade/list
    pub async fn list_trade(&self, query: &TradeQuery) -> Result<ApiResponse> {
        self.post_private("/trade/list", query).await
    }
}
