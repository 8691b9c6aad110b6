/*
[INPUT]:  HTTP configuration (base URL, timeouts, credentials)
[OUTPUT]: Configured reqwest client ready for public and signed API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::fmt;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::http::signature::{NonceSource, RequestSigner, SignedRequest};
use crate::http::{BetaexError, Result};

pub const PUBLIC_PATH: &str = "/api/v1/public";
pub const PRIVATE_PATH: &str = "/api/v1/private";

pub const API_KEY_HEADER: &str = "api_key";
pub const SIGNATURE_HEADER: &str = "signature";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// API key pair for private endpoints
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: Vec<u8>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug)]
struct PrivateAuth {
    credentials: Credentials,
    signer: RequestSigner,
}

/// Main HTTP client for the BetaEx API
#[derive(Debug)]
pub struct BetaexClient {
    http_client: Client,
    base_url: Url,
    auth: Option<PrivateAuth>,
    nonces: NonceSource,
}

impl BetaexClient {
    /// Create a client for public and private endpoints with default configuration
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        Self::with_config(ClientConfig::default(), base_url, Some(credentials))
    }

    /// Create a client that can only reach public endpoints
    pub fn public(base_url: &str) -> Result<Self> {
        Self::with_config(ClientConfig::default(), base_url, None)
    }

    /// Create a new client with custom configuration
    pub fn with_config(
        config: ClientConfig,
        base_url: &str,
        credentials: Option<Credentials>,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(BetaexError::Config(format!(
                "base url {base_url} cannot carry a path"
            )));
        }

        let auth = credentials.map(|credentials| PrivateAuth {
            signer: RequestSigner::new(credentials.api_secret.clone()),
            credentials,
        });

        Ok(Self {
            http_client,
            base_url,
            auth,
            nonces: NonceSource::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get credentials if set
    pub fn credentials(&self) -> Option<&Credentials> {
        self.auth.as_ref().map(|auth| &auth.credentials)
    }

    fn endpoint_url(&self, family: &str, endpoint: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{family}{endpoint}"))?)
    }

    /// Build request builder for public endpoints
    pub(crate) fn public_request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.endpoint_url(PUBLIC_PATH, endpoint)?;
        Ok(self.http_client.request(method, url))
    }

    /// Sign `payload` for a private endpoint with a fresh nonce
    pub fn sign_request<P: Serialize>(&self, endpoint: &str, payload: &P) -> Result<SignedRequest> {
        let auth = self.auth.as_ref().ok_or_else(|| BetaexError::Authentication {
            message: format!("{endpoint} requires api credentials"),
        })?;
        SignedRequest::new(endpoint, payload, self.nonces.next(), &auth.signer)
    }

    /// Sign and POST `payload` to a private endpoint
    pub(crate) async fn post_private<P, T>(&self, endpoint: &str, payload: &P) -> Result<T>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let signed = self.sign_request(endpoint, payload)?;
        let api_key = self
            .credentials()
            .map(|credentials| credentials.api_key.clone())
            .unwrap_or_default();
        let url = self.endpoint_url(PRIVATE_PATH, &signed.endpoint)?;

        debug!(endpoint, nonce = signed.nonce, "sending private request");

        let builder = self
            .http_client
            .request(Method::POST, url)
            .header(API_KEY_HEADER, api_key)
            .header(SIGNATURE_HEADER, signed.signature)
            .header(CONTENT_TYPE, "application/json")
            .body(signed.body);

        self.send_json(builder).await
    }

    /// Send a request and decode the body; anything but HTTP 200 is a transport error
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "unexpected http status");
            return Err(BetaexError::transport(status, text));
        }

        Ok(serde_json::from_str(&text)?)
    }
}
