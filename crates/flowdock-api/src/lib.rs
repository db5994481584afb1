//! Flowdock API clients.
//!
//! This crate provides:
//! - An authenticated REST client for flows, users and messages
//! - A [`FlowCatalog`] snapshot that resolves restriction flow names
//! - An HTTP streaming [`EventSource`](stream_ingest::EventSource) for the
//!   live message stream

mod auth;
mod client;
mod error;
mod flows;
mod messages;
mod stream;
mod users;

pub use auth::basic_authorization;
pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::{ApiError, ApiResult};
pub use flows::{Flow, FlowCatalog, Organization};
pub use messages::MessageData;
pub use stream::{stream_url, HttpEventSource, DEFAULT_STREAM_URL};
pub use users::User;
