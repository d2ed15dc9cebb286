/// Errors surfaced by a gateway adapter.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("Gateway rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Missing, expired or wrong credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A request payload the gateway cannot accept (e.g. a non-object row).
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// A response body that does not match the expected shape.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Convenience alias for gateway results.
pub type GatewayResult<T> = Result<T, GatewayError>;
