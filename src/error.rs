use thiserror::Error;

/// Errors returned by Blossom client operations.
///
/// The first three variants can only come out of construction. Everything else
/// is a hard failure of a single call; expected business outcomes are reported
/// through [`crate::BlossomStatus`] instead.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required constructor argument was empty.
    #[error("need a non-empty {0}")]
    MissingCredential(&'static str),

    /// Base URL is not a valid absolute URL.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// The API key cannot be sent as an HTTP header value.
    #[error("API key contains characters not allowed in an HTTP header")]
    InvalidApiKey,

    /// Endpoint path could not be joined to the base URL.
    #[error("invalid endpoint path '{0}'")]
    InvalidPath(String),

    /// HTTP transport-layer request failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body could not be parsed as JSON.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP status the endpoint does not document.
    #[error("server returned status {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    /// A list endpoint answered without a `results` array.
    #[error("response is missing the 'results' array")]
    MissingResults,
}

impl ClientError {
    /// Returns `true` for errors raised while building a client.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential(_) | Self::InvalidBaseUrl(_) | Self::InvalidApiKey
        )
    }
}
