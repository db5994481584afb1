//! Error types for the Flowdock clients.

use thiserror::Error;

/// Errors that can occur talking to the Flowdock API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned a non-success status
    #[error("Flowdock API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// No API token configured
    #[error("Missing Flowdock API token")]
    MissingToken,
}

/// Result type alias using ApiError.
pub type ApiResult<T> = Result<T, ApiError>;
