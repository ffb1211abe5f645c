//! Page requests and the sources that answer them.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tracing::debug;
use url::Url;

use super::client::HttpClient;
use super::constants::DEFAULT_SORT_ORDER;
use super::error::FetchError;

/// Streamed body of one page: byte chunks in arrival order.
pub type PageBody = BoxStream<'static, Result<Bytes, FetchError>>;

/// One `limit`/`offset` window into the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Number of records skipped before this page.
    pub offset: u64,
    /// Maximum number of records in this page.
    pub limit: u64,
}

impl PageRequest {
    /// Creates a page request.
    #[must_use]
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offset={} limit={}", self.offset, self.limit)
    }
}

/// Anything that can produce the CSV body for a page request.
///
/// The returned body must be lazily produced: implementations hand back the
/// stream as soon as the request is accepted, and the caller pulls chunks as
/// the CSV parser needs them. Dropping the body releases the underlying
/// connection.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Opens the body for `request`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` when the request cannot be sent or is rejected.
    async fn open_page(&self, request: PageRequest) -> Result<PageBody, FetchError>;
}

/// [`PageSource`] backed by a Socrata-style CSV endpoint.
///
/// Each page is requested as `<base>?$limit=L&$offset=O&$order=<order>`;
/// any query parameters already on the base URL (filters, `$where`) are kept.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: HttpClient,
    base_url: Url,
    order: String,
}

impl HttpPageSource {
    /// Creates a source for `base_url`, sorted by the row id.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if `base_url` does not parse.
    pub fn new(client: HttpClient, base_url: &str) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url).map_err(|_| FetchError::invalid_url(base_url))?;
        Ok(Self {
            client,
            base_url,
            order: DEFAULT_SORT_ORDER.to_string(),
        })
    }

    /// Overrides the server-side sort order used for stable paging.
    #[must_use]
    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = order.into();
        self
    }

    /// Builds the full URL for one page.
    #[must_use]
    pub fn page_url(&self, request: PageRequest) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("$limit", &request.limit.to_string())
            .append_pair("$offset", &request.offset.to_string())
            .append_pair("$order", &self.order);
        url
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn open_page(&self, request: PageRequest) -> Result<PageBody, FetchError> {
        let url = self.page_url(request).to_string();
        debug!(%request, %url, "requesting page");

        let response = self.client.get_streaming(&url).await?;
        let body = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| FetchError::body(url.clone(), e)));
        Ok(body.boxed())
    }
}
