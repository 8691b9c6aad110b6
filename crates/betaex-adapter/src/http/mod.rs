/*
[INPUT]:  HTTP client configuration, credentials and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod account;
pub mod client;
pub mod error;
pub mod public;
pub mod signature;
pub mod trade;

pub use error::{BetaexError, Result};
pub use signature::{NonceSource, RequestSigner, SignedRequest};
pub use trade::generate_cid;

pub use client::{BetaexClient, ClientConfig, Credentials};
