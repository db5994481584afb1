//! The live HTTP message stream.

use crate::auth::basic_authorization;
use crate::client::check_status;
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use stream_ingest::{EventSource, LineBuffer};
use tracing::{debug, info};
use url::Url;

/// Default streaming API base URL.
pub const DEFAULT_STREAM_URL: &str = "https://stream.flowdock.com";

/// Streaming URL for a set of flows.
///
/// Flows given without an organization prefix are qualified with
/// `organization`.
pub fn stream_url(base: &str, organization: &str, flows: &[String]) -> ApiResult<Url> {
    let mut url = Url::parse(&format!("{}/flows", base.trim_end_matches('/')))?;
    let filter = flows
        .iter()
        .map(|flow| {
            if flow.contains('/') || organization.is_empty() {
                flow.clone()
            } else {
                format!("{organization}/{flow}")
            }
        })
        .collect::<Vec<_>>()
        .join(",");
    if !filter.is_empty() {
        url.query_pairs_mut().append_pair("filter", &filter);
    }
    Ok(url)
}

/// An [`EventSource`] over a long-lived streaming HTTP response.
pub struct HttpEventSource {
    response: reqwest::Response,
    buffer: LineBuffer,
    finished: bool,
}

impl HttpEventSource {
    /// Open the stream. Fails if the request fails or the server refuses it.
    pub async fn connect(url: &Url, token: &str) -> ApiResult<Self> {
        if token.is_empty() {
            return Err(ApiError::MissingToken);
        }

        info!(url = %url, "Connecting to message stream");
        let response = reqwest::Client::new()
            .get(url.clone())
            .header("Authorization", basic_authorization(token))
            .header("Accept", "application/json")
            .send()
            .await?;
        let response = check_status(response).await?;
        info!(status = response.status().as_u16(), "Message stream connected");

        Ok(Self {
            response,
            buffer: LineBuffer::new(),
            finished: false,
        })
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    async fn next_line(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        loop {
            if let Some(line) = self.buffer.next_line() {
                return Ok(Some(line));
            }
            if self.finished {
                return Ok(self.buffer.finish());
            }
            match self.response.chunk().await {
                Ok(Some(bytes)) => self.buffer.push(&bytes),
                Ok(None) => {
                    debug!(pending = self.buffer.pending(), "Message stream body ended");
                    self.finished = true;
                }
                Err(e) => {
                    return Err(std::io::Error::other(e));
                }
            }
        }
    }
}

impl std::fmt::Debug for HttpEventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEventSource")
            .field("url", &self.response.url().as_str())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn stream_url_qualifies_flows() {
        let flows = vec!["main".to_string(), "other-org/ops".to_string()];
        let url = stream_url("https://stream.example.com/", "acme", &flows).unwrap();
        assert_eq!(url.path(), "/flows");
        let filter: Vec<_> = url.query_pairs().collect();
        assert_eq!(filter.len(), 1);
        assert_eq!(filter[0].0, "filter");
        assert_eq!(filter[0].1, "acme/main,other-org/ops");
    }

    #[test]
    fn stream_url_without_flows_has_no_filter() {
        let url = stream_url(DEFAULT_STREAM_URL, "acme", &[]).unwrap();
        assert_eq!(url.as_str(), "https://stream.flowdock.com/flows");
    }

    #[tokio::test]
    async fn reads_filtered_stream_lines() {
        let mock_server = MockServer::start().await;
        let body = "{\"flow\":\"f\",\"content\":\"ping\"}\r\n\n{\"flow\":\"f\",\"content\":\"echo hi\"}";

        Mock::given(method("GET"))
            .and(path("/flows"))
            .and(query_param("filter", "acme/main"))
            .and(header("Authorization", "Basic c2VjcmV0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = stream_url(&mock_server.uri(), "acme", &["main".to_string()]).unwrap();
        let mut source = HttpEventSource::connect(&url, "secret").await.unwrap();

        assert_eq!(
            source.next_line().await.unwrap().as_deref(),
            Some(&b"{\"flow\":\"f\",\"content\":\"ping\"}"[..])
        );
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some(&b""[..]));
        assert_eq!(
            source.next_line().await.unwrap().as_deref(),
            Some(&b"{\"flow\":\"f\",\"content\":\"echo hi\"}"[..])
        );
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn refused_stream_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/flows"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let url = stream_url(&mock_server.uri(), "", &[]).unwrap();
        assert!(matches!(
            HttpEventSource::connect(&url, "secret").await,
            Err(ApiError::Status { status: 403, .. })
        ));
    }
}
