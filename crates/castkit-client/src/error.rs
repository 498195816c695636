//! Error types for the castkit client

use castkit_core::ValidationError;
use thiserror::Error;

/// Client error
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Gateway (or upstream, relayed) returned a non-2xx status
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Parameters rejected locally; nothing was sent
    #[error("Invalid parameters: {0}")]
    Validation(#[from] ValidationError),

    /// The API key cannot be sent as a header value
    #[error("Invalid API key: {0}")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
