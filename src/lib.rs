//! Rust and Python-facing client library for the Blossom workflow API.
//!
//! Public API layers:
//! - [`BlockingBlossomApi`]/[`BlossomApi`]: one method per Blossom endpoint,
//!   returning a typed [`BlossomResponse`].
//! - [`BlockingApiClient`]/[`ApiClient`]: the underlying transport with the
//!   credential merge and CSRF priming, returning [`RawResponse`].
//! - [`ClientError`]: unified error type used by all clients.
//!
//! Blossom guards state-changing requests with Django's CSRF middleware, so
//! every non-`GET` call is preceded by a `GET` to the same path.

mod blocking_client;
mod blossom_api;
mod client;
pub mod endpoints;
mod error;
mod form;
mod response;
mod session;

/// Blocking transport client.
pub use blocking_client::BlockingApiClient;
/// Endpoint-level clients.
pub use blossom_api::{BlockingBlossomApi, BlossomApi, DEFAULT_BASE_URL};
/// Async transport client.
pub use client::ApiClient;
pub use endpoints::NewTranscription;
/// Error type returned by all client operations.
pub use error::ClientError;
pub use form::FormBody;
pub use response::{BlossomResponse, BlossomStatus, RawResponse};
pub use session::Credentials;

#[cfg(feature = "python")]
mod python;
