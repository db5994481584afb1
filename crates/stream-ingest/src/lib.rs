//! Stream ingestion for flowbot.
//!
//! Reads newline-framed JSON entries from an [`EventSource`], matches each
//! one against a shared [`CommandRegistry`](command_router::CommandRegistry)
//! and runs the handler the match selects.
//!
//! ```text
//! EventSource ──line──► decode Entry ──► registry.dispatch() ──► handler
//!                            │                   │
//!                            └──── StreamError ──┴──► error sink (try_send)
//! ```
//!
//! Per-message failures never stop the loop. Only a failing read does, and
//! that error is returned from [`StreamManager::listen`].

mod error;
mod framing;
mod manager;
mod source;

pub use error::{StreamError, StreamResult};
pub use framing::LineBuffer;
pub use manager::{error_channel, ErrorSink, ListenStats, StreamManager};
pub use source::{EventSource, ReaderSource};
