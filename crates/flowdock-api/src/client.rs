//! Authenticated REST client.

use crate::auth::basic_authorization;
use crate::error::{ApiError, ApiResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.flowdock.com";

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Flowdock REST client.
///
/// Resource calls live next to their types: flows in `flows.rs`, users in
/// `users.rs`, messages in `messages.rs`.
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) http_client: reqwest::Client,
    base_url: String,
    authorization: String,
}

impl ApiClient {
    /// Create a client for the public API with the given token.
    pub fn new(token: impl AsRef<str>) -> ApiResult<Self> {
        Self::with_base_url(token, DEFAULT_API_URL)
    }

    /// Create a client against a custom base URL.
    pub fn with_base_url(token: impl AsRef<str>, base_url: impl Into<String>) -> ApiResult<Self> {
        let token = token.as_ref();
        if token.is_empty() {
            return Err(ApiError::MissingToken);
        }
        Ok(Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            authorization: basic_authorization(token),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn authorization(&self) -> &str {
        &self.authorization
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.url(path);
        tracing::debug!(url = %url, "GET");

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", &self.authorization)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let response = check_status(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<()> {
        let url = self.url(path);
        tracing::debug!(url = %url, "POST");

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", &self.authorization)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

/// Turn a non-success response into [`ApiError::Status`].
pub(crate) async fn check_status(response: reqwest::Response) -> ApiResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let body_summary = summarize_response_body(&body);
    tracing::error!(status, body_summary = %body_summary, "Flowdock API error");
    Err(ApiError::Status {
        status,
        message: format!("upstream error ({body_summary})"),
    })
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
