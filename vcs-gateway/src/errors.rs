//! Crate-wide error hierarchy for vcs-gateway.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type VcsResult<T> = Result<T, VcsError>;

/// Root error type for the vcs-gateway crate.
#[derive(Debug, Error)]
pub enum VcsError {
    /// Provider API related failure (status, transport, timeout).
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// File content could not be decoded into bytes.
    #[error("cannot decode content of '{path}': {reason}")]
    Decode { path: String, reason: String },

    /// Input validation errors (bad repository names, empty refs, etc.).
    #[error("validation error: {0}")]
    Validation(String),
}

/// Provider-specific error used inside the GitHub client.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Unauthorized (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Request rejected as semantically invalid (HTTP 422).
    #[error("unprocessable entity")]
    Unprocessable,

    /// Rate limited (HTTP 429).
    #[error("rate limited")]
    RateLimited,

    /// Gateway / server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other HTTP status (non-2xx) not covered by specific variants.
    #[error("http status error: status {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected/invalid shape of provider response.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for VcsError {
    fn from(e: reqwest::Error) -> Self {
        VcsError::Provider(ProviderError::from(e))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return ProviderError::Timeout;
        }

        if let Some(status) = e.status() {
            let code = status.as_u16();
            return match code {
                401 => ProviderError::Unauthorized,
                403 => ProviderError::Forbidden,
                404 => ProviderError::NotFound,
                422 => ProviderError::Unprocessable,
                429 => ProviderError::RateLimited,
                500..=599 => ProviderError::Server(code),
                _ => ProviderError::HttpStatus(code),
            };
        }

        if e.is_decode() {
            return ProviderError::InvalidResponse(e.to_string());
        }

        ProviderError::Network(e.to_string())
    }
}
