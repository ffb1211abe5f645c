//! Error types for the pagination engine.

use thiserror::Error;

use super::mapping::MissingColumns;
use crate::fetch::FetchError;

/// Fatal errors that abort a pagination run.
///
/// Nothing here is recovered locally: the run stops at the first error.
#[derive(Debug, Error)]
pub enum PaginateError {
    /// The paginator was configured with values that cannot make progress.
    #[error("invalid pagination settings: {0}")]
    InvalidConfig(&'static str),

    /// The page could not be requested or was rejected by the server.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A later page's header lacks columns of the canonical header.
    #[error("column set changed at offset {offset}: {source}")]
    MissingColumns {
        /// Offset of the offending page.
        offset: u64,
        /// The missing column names.
        #[source]
        source: MissingColumns,
    },

    /// The page body could not be read or parsed as CSV (including a row
    /// whose field count differs from its page header, and transport
    /// failures while streaming the body).
    #[error("failed to read page at offset {offset}: {source}")]
    Csv {
        /// Offset of the page being read.
        offset: u64,
        /// The underlying CSV or I/O error.
        #[source]
        source: csv_async::Error,
    },

    /// A record could not be written to the output.
    #[error("failed to write output: {source}")]
    Write {
        /// The underlying CSV writer error.
        #[source]
        source: csv_async::Error,
    },

    /// Buffered output could not be flushed.
    #[error("failed to flush output: {source}")]
    Flush {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl PaginateError {
    /// Creates a read error for the page at `offset`.
    pub fn csv(offset: u64, source: csv_async::Error) -> Self {
        Self::Csv { offset, source }
    }

    /// Creates an output write error.
    pub fn write(source: csv_async::Error) -> Self {
        Self::Write { source }
    }

    /// Creates an output flush error.
    pub fn flush(source: std::io::Error) -> Self {
        Self::Flush { source }
    }

    /// Returns true when the error reflects an inconsistent column set.
    #[must_use]
    pub fn is_header_mismatch(&self) -> bool {
        matches!(self, Self::MissingColumns { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_display_names_offset_and_columns() {
        let error = PaginateError::MissingColumns {
            offset: 1000,
            source: MissingColumns {
                missing: vec!["cases".to_string(), "date".to_string()],
            },
        };
        let msg = error.to_string();
        assert!(msg.contains("1000"), "Expected offset in: {msg}");
        assert!(error.is_header_mismatch());
        let source = std::error::Error::source(&error).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("page header is missing canonical column(s): cases, date")
        );
    }

    #[test]
    fn test_fetch_error_is_transparent() {
        let error = PaginateError::from(FetchError::http_status("https://example.com/x.csv", 500));
        assert_eq!(error.to_string(), "HTTP 500 fetching https://example.com/x.csv");
        assert!(!error.is_header_mismatch());
    }

    #[test]
    fn test_flush_error_display() {
        let error = PaginateError::flush(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "pipe closed",
        ));
        assert!(error.to_string().contains("pipe closed"));
    }
}
