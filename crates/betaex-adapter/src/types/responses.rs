/*
[INPUT]:  Parsed JSON body of any HTTP 200 response
[OUTPUT]: Response envelope accessors shared by every endpoint
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Application-level success code in the `status` field
pub const STATUS_SUCCESS: i64 = 0;

static NULL: Value = Value::Null;

/// Parsed response body, kept exactly as received.
///
/// The client only checks the HTTP status. Any JSON value is accepted;
/// the usual `{status, data, ...}` envelope is read through the accessors
/// and the application-level `status` is left to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiResponse {
    body: Value,
}

impl ApiResponse {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// Integer `status` field, if the body carries one
    pub fn status(&self) -> Option<i64> {
        self.body.get("status").and_then(Value::as_i64)
    }

    pub fn is_success(&self) -> bool {
        self.status() == Some(STATUS_SUCCESS)
    }

    /// The `data` field of an envelope. A body that is not an object is its own data.
    pub fn data(&self) -> &Value {
        match self.body.get("data") {
            Some(data) => data,
            None if !self.body.is_object() => &self.body,
            None => &NULL,
        }
    }

    /// Decode [`data`](Self::data) into a caller-chosen type
    pub fn data_as<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(self.data())
    }

    /// Look up any top-level field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }
}

impl From<Value> for ApiResponse {
    fn from(body: Value) -> Self {
        Self::new(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let resp: ApiResponse = serde_json::from_value(json!({
            "status": 0,
            "data": {"order_id": "1001"},
            "msg": "ok"
        }))
        .unwrap();

        assert!(resp.is_success());
        assert_eq!(resp.field("msg"), Some(&json!("ok")));

        let data: std::collections::HashMap<String, String> = resp.data_as().unwrap();
        assert_eq!(data["order_id"], "1001");
    }

    #[test]
    fn test_envelope_without_status() {
        let resp: ApiResponse = serde_json::from_value(json!({"timestamp": 1_573_000_000_000i64})).unwrap();
        assert!(!resp.is_success());
        assert_eq!(resp.status(), None);
        assert_eq!(resp.data(), &Value::Null);
        assert_eq!(resp.field("timestamp"), Some(&json!(1_573_000_000_000i64)));
    }

    #[test]
    fn test_error_status_is_not_success() {
        let resp: ApiResponse = serde_json::from_value(json!({"status": 1003, "msg": "bad nonce"})).unwrap();
        assert_eq!(resp.status(), Some(1003));
        assert!(!resp.is_success());
    }

    #[test]
    fn test_bare_bodies_are_accepted() {
        let number: ApiResponse = serde_json::from_str("1573000000000").unwrap();
        assert_eq!(number.data(), &json!(1_573_000_000_000i64));
        assert!(!number.is_success());

        let list: ApiResponse = serde_json::from_str(r#"[{"symbol":"BTC_USDT"}]"#).unwrap();
        assert_eq!(list.data()[0]["symbol"], "BTC_USDT");
        assert_eq!(list.field("symbol"), None);
    }

    #[test]
    fn test_non_integer_status_is_kept_not_rejected() {
        let resp: ApiResponse = serde_json::from_str(r#"{"status":"ok","data":[1,2]}"#).unwrap();
        assert_eq!(resp.status(), None);
        assert!(!resp.is_success());
        assert_eq!(resp.field("status"), Some(&json!("ok")));
        assert_eq!(resp.data_as::<Vec<u8>>().unwrap(), vec![1, 2]);
        assert_eq!(resp.clone().into_body(), *resp.body());
    }
}
