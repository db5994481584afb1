//! Error types for stream ingestion.

use command_router::DispatchError;
use thiserror::Error;

/// Stream ingestion error type.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Reading from the transport failed. Ends the loop.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// A line was not a valid entry.
    #[error("Failed to decode entry: {0}")]
    Decode(#[from] serde_json::Error),

    /// The entry did not route to a command.
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

impl StreamError {
    /// Whether this error ends the ingestion loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StreamError::Transport(_))
    }
}

/// Result type alias using StreamError.
pub type StreamResult<T> = Result<T, StreamError>;
