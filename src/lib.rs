//! COVID Data Core Library
//!
//! This library fetches large tabular datasets exposed as paginated
//! CSV-over-HTTP endpoints and merges every page into one column-stable CSV
//! stream, without holding more than one page's parse buffer in memory.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`stream`] - Adapts a chunked HTTP body into a pull-based byte reader
//! - [`fetch`] - HTTP page requests, retry policy and the `PageSource` seam
//! - [`paginate`] - The fetch-and-merge loop and per-page column mapping
//! - [`output`] - Standard output, plain file and gzip destinations
//! - [`export`] - One complete run from source to destination

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod export;
pub mod fetch;
pub mod output;
pub mod paginate;
pub mod stream;
mod user_agent;

// Re-export commonly used types
pub use export::{ExportError, export};
pub use fetch::{
    CDC_CASES_URL, DEFAULT_MAX_RETRIES, DEFAULT_PAGE_SIZE, FetchError, HttpClient, HttpPageSource,
    PageBody, PageRequest, PageSource, RetryPolicy,
};
pub use output::{OutputSink, OutputTarget, SinkError};
pub use paginate::{
    ColumnMapping, PaginateError, PaginationSummary, Paginator, PaginatorConfig, Termination,
};
pub use stream::ChunkReader;
