//! Chat stream entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One event from the chat stream.
///
/// Only `content` and `flow` drive matching; the remaining fields are
/// transport metadata handed through to handlers untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub persist: bool,
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub flow: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sent: i64,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attachments: Vec<serde_json::Value>,
    /// Author ID; sent as a number or a string depending on the event.
    #[serde(default)]
    pub user: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl Entry {
    /// A bare message entry, mostly useful in tests and tools.
    pub fn message(flow: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            event: "message".to_string(),
            flow: flow.into(),
            content: content.into(),
            ..Default::default()
        }
    }
}
