//! Posting messages.

use crate::client::ApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};

/// Body of `POST /messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageData {
    pub flow: String,
    pub event: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl MessageData {
    /// A plain chat message to `flow`.
    pub fn message(flow: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            flow: flow.into(),
            event: "message".to_string(),
            content: content.into(),
            tags: Vec::new(),
            external_user_name: None,
            thread_id: None,
        }
    }

    /// Reply inside an existing thread.
    pub fn in_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn as_user(mut self, name: impl Into<String>) -> Self {
        self.external_user_name = Some(name.into());
        self
    }
}

impl ApiClient {
    /// Post a message.
    pub async fn send_message(&self, message: &MessageData) -> ApiResult<()> {
        self.post_json("messages", message).await?;
        tracing::debug!(flow = %message.flow, thread = ?message.thread_id, "Message sent");
        Ok(())
    }
}
