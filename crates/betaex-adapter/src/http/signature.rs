/*
[INPUT]:  Request payload, API secret and wall clock
[OUTPUT]: Signed request body plus hex HMAC-SHA256 signature
[POS]:    HTTP layer - request signing for private endpoints
[UPDATE]: When changing signing algorithm or header format
*/

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::http::{BetaexError, Result};
use crate::time::current_time_ms;

type HmacSha256 = Hmac<Sha256>;

/// Signs request bodies with the account secret
#[derive(Clone)]
pub struct RequestSigner {
    secret: Vec<u8>,
}

impl RequestSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Lowercase hex HMAC-SHA256 of `body`
    pub fn sign(&self, body: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        mac.update(body.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// A private request ready to go on the wire.
///
/// `body` is exactly the string that was signed and is sent as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub endpoint: String,
    pub body: String,
    pub nonce: i64,
    pub signature: String,
}

impl SignedRequest {
    /// Serialize `payload` with `nonce` injected and sign the result
    pub fn new<P: Serialize>(
        endpoint: &str,
        payload: &P,
        nonce: i64,
        signer: &RequestSigner,
    ) -> Result<Self> {
        let mut value = serde_json::to_value(payload)?;
        let fields = value.as_object_mut().ok_or_else(|| {
            BetaexError::Validation(format!("payload for {endpoint} is not a JSON object"))
        })?;
        fields.insert("nonce".to_string(), nonce.into());

        let body = serde_json::to_string(&value)?;
        let signature = signer.sign(&body);

        Ok(Self {
            endpoint: endpoint.to_string(),
            body,
            nonce,
            signature,
        })
    }
}

/// Millisecond nonces that never go backwards for one client
#[derive(Debug, Default)]
pub struct NonceSource {
    last: AtomicI64,
}

impl NonceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> i64 {
        let now = current_time_ms();
        let previous = self.last.fetch_max(now, Ordering::SeqCst);
        previous.max(now)
    }
}
