/*
[INPUT]:  None (unauthenticated)
[OUTPUT]: Exchange metadata (symbols, server time)
[POS]:    HTTP layer - public endpoints (no auth required)
[UPDATE]: When adding new public endpoints or changing response format
*/

use reqwest::Method;

use crate::http::{BetaexClient, Result};
use crate::types::ApiResponse;

impl BetaexClient {
    /// List tradable symbols
    ///
    /// GET /api/v1/public/symbols
    pub async fn get_symbols(&self) -> Result<ApiResponse> {
        let builder = self.public_request(Method::GET, "/symbols")?;
        self.send_json(builder).await
    }

    /// Server time, used for clock-skew checks
    ///
    /// GET /api/v1/public/timestamp
    pub async fn get_timestamp(&self) -> Result<ApiResponse> {
        let builder = self.public_request(Method::GET, "/timestamp")?;
        self.send_json(builder).await
    }
}
