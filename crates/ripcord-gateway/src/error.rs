//! Gateway error types

use thiserror::Error;

/// Errors raised by a gateway session.
///
/// Malformed envelopes are only fatal during the opening handshake
/// (Hello/Ready); in steady state they are dropped where they occur and
/// never reach this type. A clean end-of-stream is not an error at all.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed or unexpected frame during the Hello/Ready handshake
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// Socket-level failure
    #[error("Transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// Outbound payload failed to serialize
    #[error("Failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),

    /// Send attempted on a session whose socket is gone
    #[error("Session is closed")]
    Closed,
}

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;
