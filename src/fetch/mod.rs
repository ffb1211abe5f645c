//! HTTP page fetching for paginated CSV endpoints.
//!
//! This module issues one GET per page (`$limit`/`$offset`/`$order` query
//! parameters) and hands the response body back as a stream of byte chunks,
//! never buffering a whole page in memory.
//!
//! # Example
//!
//! ```no_run
//! use covid_core::fetch::{CDC_CASES_URL, HttpClient, HttpPageSource, PageRequest, PageSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HttpPageSource::new(HttpClient::new(), CDC_CASES_URL)?;
//! let body = source.open_page(PageRequest::new(0, 500)).await?;
//! # drop(body);
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
mod retry;
mod source;

pub use client::HttpClient;
pub use constants::{
    CDC_CASES_URL, CONNECT_TIMEOUT_SECS, DEFAULT_PAGE_SIZE, DEFAULT_SORT_ORDER, READ_TIMEOUT_SECS,
};
pub use error::FetchError;
pub use retry::{
    DEFAULT_MAX_RETRIES, FailureType, RetryDecision, RetryPolicy, classify_error, retry_after_delay,
};
pub use source::{HttpPageSource, PageBody, PageRequest, PageSource};
