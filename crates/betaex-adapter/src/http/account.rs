/*
[INPUT]:  Account type / currency plus signed credentials
[OUTPUT]: Account balances and signature checks
[POS]:    HTTP layer - account endpoints (require api key + signature)
[UPDATE]: When adding new account endpoints or changing request fields
*/

use crate::http::{BetaexClient, Result};
use crate::types::{ApiResponse, BalanceListRequest, BalanceRequest, EmptyRequest};

impl BetaexClient {
    /// Balance of a single currency
    ///
    /// POST /api/v1/private/balance
    pub async fn get_balance(&self, currency: &str, account_type: &str) -> Result<ApiResponse> {
        let req = BalanceRequest {
            currency: currency.to_string(),
            account_type: account_type.to_string(),
        };
        self.post_private("/balance", &req).await
    }

    /// Balances of every currency in the account
    ///
    /// POST /api/v1/private/balance/list
    pub async fn list_balance(&self, account_type: &str) -> Result<ApiResponse> {
        let req = BalanceListRequest {
            account_type: account_type.to_string(),
        };
        self.post_private("/balance/list", &req).await
    }

    /// Round-trip a nonce-only body to check that key and secret match
    ///
    /// POST /api/v1/private/test
    pub async fn signature_test(&self) -> Result<ApiResponse> {
        self.post_private("/test", &EmptyRequest::default()).await
    }
}
