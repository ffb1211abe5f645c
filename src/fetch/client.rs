//! HTTP client wrapper for streaming page requests.
//!
//! This module provides the `HttpClient` struct which owns the connection pool,
//! timeout configuration and status handling for every page request.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::FetchError;
use crate::user_agent;

/// HTTP client for streamed CSV page requests.
///
/// Created once per run and reused for every page, taking advantage of
/// connection pooling.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes between body reads
    /// - Gzip transfer decompression: enabled
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
            .expect("failed to build HTTP client with static configuration")
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if reqwest cannot build the client
    /// (for example when the TLS backend fails to initialise).
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .read_timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(|source| FetchError::Client { source })?;
        Ok(Self { client })
    }

    /// Sends a GET request and returns the response with its body still unread.
    ///
    /// The caller streams the body (see [`reqwest::Response::bytes_stream`]);
    /// dropping the response releases the connection.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns a non-success status
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn get_streaming(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/csv")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::timeout(url)
                } else {
                    FetchError::network(url, e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(std::string::ToString::to_string);
            return Err(FetchError::http_status_with_retry_after(
                url,
                status.as_u16(),
                retry_after,
            ));
        }

        debug!(status = status.as_u16(), "response accepted");
        Ok(response)
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_streaming_returns_unread_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data.csv"))
            .and(header("accept", "text/csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("id\n1\n"))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let url = format!("{}/data.csv", mock_server.uri());
        let response = client.get_streaming(&url).await.unwrap();

        assert_eq!(response.text().await.unwrap(), "id\n1\n");
    }

    #[tokio::test]
    async fn test_get_streaming_sends_tool_user_agent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data.csv"))
            .and(header("user-agent", user_agent::default_user_agent().as_str()))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let url = format!("{}/data.csv", mock_server.uri());
        assert!(client.get_streaming(&url).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_streaming_404_is_status_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let url = format!("{}/missing.csv", mock_server.uri());

        match client.get_streaming(&url).await {
            Err(FetchError::HttpStatus { status, .. }) => assert_eq!(status, 404),
            other => panic!("Expected HttpStatus error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_streaming_captures_retry_after() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "3"))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let url = format!("{}/busy.csv", mock_server.uri());

        match client.get_streaming(&url).await {
            Err(FetchError::HttpStatus {
                status,
                retry_after,
                ..
            }) => {
                assert_eq!(status, 429);
                assert_eq!(retry_after.as_deref(), Some("3"));
            }
            other => panic!("Expected HttpStatus error, got: {other:?}"),
        }
    }

    #[test]
    fn test_get_streaming_invalid_url() {
        let client = HttpClient::new();
        let result = tokio_test::block_on(client.get_streaming("not-a-valid-url"));
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_get_streaming_connection_refused_is_network_error() {
        // Bind then drop a listener to get a local port nobody is serving.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = HttpClient::with_timeouts(2, 2).unwrap();
        let url = format!("http://127.0.0.1:{port}/data.csv");

        let result = client.get_streaming(&url).await;
        assert!(
            matches!(
                result,
                Err(FetchError::Network { .. } | FetchError::Timeout { .. })
            ),
            "unexpected result: {result:?}"
        );
    }
}
