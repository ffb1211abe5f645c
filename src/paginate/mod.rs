//! Paginated fetch-and-merge engine.
//!
//! A [`Paginator`] walks a [`PageSource`](crate::fetch::PageSource) one
//! `limit`/`offset` window at a time and merges every page into a single CSV
//! stream:
//!
//! 1. Stop before fetching if the soft record limit has been reached.
//! 2. Open the page body as a chunk stream (retrying only the open).
//! 3. Read the page header. The first page's header becomes the canonical
//!    header and is written once; later headers are mapped onto it.
//! 4. Reorder and write every data row, then flush.
//! 5. A page with no data rows ends the run; otherwise advance the offset.
//!
//! A later page whose header lacks a canonical column aborts the run before
//! any of that page's rows are written.

mod error;
mod mapping;
mod paginator;

pub use error::PaginateError;
pub use mapping::{ColumnMapping, MissingColumns};
pub use paginator::{
    DEFAULT_READ_BUFFER_CAPACITY, PaginationSummary, Paginator, PaginatorConfig, Termination,
};
