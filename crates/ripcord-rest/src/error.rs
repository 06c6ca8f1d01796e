//! REST error types

use thiserror::Error;

/// Errors surfaced by the REST dispatch pipeline.
///
/// Rate limits never appear here; they are absorbed by bucket waits. A
/// server error only surfaces after its single retry also failed.
#[derive(Debug, Error)]
pub enum RestError {
    /// Socket/TLS/connection failure from the HTTP client
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not match the caller's expected shape
    #[error("Failed to decode response from {route}: {source}")]
    Decode {
        route: String,
        #[source]
        source: serde_json::Error,
    },

    /// 5xx that persisted through the retry
    #[error("Server error: status {status}")]
    Server { status: u16 },

    /// Non-retriable API rejection (4xx other than 429)
    #[error("API error: status {status}: {message}")]
    Api { status: u16, message: String },

    /// Request rejected locally before any network call
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// REST result type
pub type RestResult<T> = Result<T, RestError>;
