//! Users visible to the token.

use crate::client::ApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nick: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub website: Option<String>,
}

impl ApiClient {
    /// Every user visible to the token.
    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        let users: Vec<User> = self.get_json("users").await?;
        tracing::info!(count = users.len(), "Fetched users");
        Ok(users)
    }
}
