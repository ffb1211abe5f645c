//! The paging loop: fetch, reconcile header, emit rows, repeat.

use std::fmt;

use csv_async::{AsyncReaderBuilder, AsyncWriter, ByteRecord};
use tokio::io::AsyncWrite;
use tracing::{debug, info, instrument, warn};

use super::error::PaginateError;
use super::mapping::ColumnMapping;
use crate::fetch::{
    DEFAULT_PAGE_SIZE, FailureType, FetchError, PageBody, PageRequest, PageSource, RetryDecision,
    RetryPolicy, classify_error, retry_after_delay,
};
use crate::stream::ChunkReader;

/// Default CSV read buffer per page (8 KiB).
pub const DEFAULT_READ_BUFFER_CAPACITY: usize = 8 * 1024;

/// Settings for one pagination run.
#[derive(Debug, Clone)]
pub struct PaginatorConfig {
    /// Records requested per page. Must be positive.
    pub page_size: u64,
    /// Soft maximum: no page is requested once the offset reaches it, but the
    /// page that crosses it is written in full.
    pub max_records: Option<u64>,
    /// Retry policy applied to opening each page.
    pub retry: RetryPolicy,
    /// CSV parser buffer size for page bodies.
    pub read_buffer_capacity: usize,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_records: None,
            retry: RetryPolicy::default(),
            read_buffer_capacity: DEFAULT_READ_BUFFER_CAPACITY,
        }
    }
}

impl PaginatorConfig {
    /// Creates a config with the given page size and otherwise default settings.
    #[must_use]
    pub fn new(page_size: u64) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// Sets the soft maximum record count.
    #[must_use]
    pub fn with_max_records(mut self, max_records: Option<u64>) -> Self {
        self.max_records = max_records;
        self
    }

    /// Sets the retry policy for opening pages.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Checks that the settings allow the loop to make progress.
    ///
    /// # Errors
    ///
    /// Returns [`PaginateError::InvalidConfig`] for a zero page size, a zero
    /// soft maximum or a zero read buffer.
    pub fn validate(&self) -> Result<(), PaginateError> {
        if self.page_size == 0 {
            return Err(PaginateError::InvalidConfig("page size must be positive"));
        }
        if self.max_records == Some(0) {
            return Err(PaginateError::InvalidConfig(
                "maximum record count must be positive",
            ));
        }
        if self.read_buffer_capacity == 0 {
            return Err(PaginateError::InvalidConfig(
                "read buffer capacity must be positive",
            ));
        }
        Ok(())
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A page came back without data rows.
    Exhausted,
    /// The offset reached the configured soft maximum.
    SoftLimit,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => f.write_str("dataset exhausted"),
            Self::SoftLimit => f.write_str("soft record limit reached"),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationSummary {
    /// Page requests that returned a body (including the final empty page).
    pub pages_fetched: u64,
    /// Data rows written, excluding the header row.
    pub records_written: u64,
    /// Offset at which the loop stopped.
    pub final_offset: u64,
    /// Why the loop stopped.
    pub termination: Termination,
}

/// Drives page requests and merges their rows into one CSV stream.
///
/// The canonical header and running offset live here, so separate
/// paginators never share state.
pub struct Paginator<'a> {
    source: &'a dyn PageSource,
    config: PaginatorConfig,
    canonical_header: Option<ByteRecord>,
    offset: u64,
    pages_fetched: u64,
    records_written: u64,
}

impl fmt::Debug for Paginator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator")
            .field("config", &self.config)
            .field("canonical_header", &self.canonical_header)
            .field("offset", &self.offset)
            .field("pages_fetched", &self.pages_fetched)
            .field("records_written", &self.records_written)
            .finish_non_exhaustive()
    }
}

impl<'a> Paginator<'a> {
    /// Creates a paginator starting at offset 0.
    ///
    /// # Errors
    ///
    /// Returns [`PaginateError::InvalidConfig`] if `config` fails validation.
    pub fn new(source: &'a dyn PageSource, config: PaginatorConfig) -> Result<Self, PaginateError> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            canonical_header: None,
            offset: 0,
            pages_fetched: 0,
            records_written: 0,
        })
    }

    /// The header adopted from the first page, once one has been read.
    #[must_use]
    pub fn canonical_header(&self) -> Option<&ByteRecord> {
        self.canonical_header.as_ref()
    }

    /// Offset of the next page to request.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Runs the paging loop to completion, writing into `writer`.
    ///
    /// The writer is flushed after every page, so output reaches the sink
    /// one page at a time.
    ///
    /// # Errors
    ///
    /// Any fetch failure, malformed page, header mismatch or write failure
    /// aborts the run with the corresponding [`PaginateError`].
    #[instrument(
        skip_all,
        fields(page_size = self.config.page_size, max_records = ?self.config.max_records)
    )]
    pub async fn run<W>(
        &mut self,
        writer: &mut AsyncWriter<W>,
    ) -> Result<PaginationSummary, PaginateError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let termination = loop {
            if self.soft_limit_reached() {
                break Termination::SoftLimit;
            }

            let request = PageRequest::new(self.offset, self.config.page_size);
            let body = self.open_with_retry(request).await?;
            self.pages_fetched += 1;

            let emitted = self.merge_page(request, body, writer).await?;
            if emitted == 0 {
                break Termination::Exhausted;
            }
            self.offset += self.config.page_size;
        };

        let summary = PaginationSummary {
            pages_fetched: self.pages_fetched,
            records_written: self.records_written,
            final_offset: self.offset,
            termination,
        };
        info!(
            pages = summary.pages_fetched,
            records = summary.records_written,
            offset = summary.final_offset,
            %termination,
            "pagination finished"
        );
        Ok(summary)
    }

    fn soft_limit_reached(&self) -> bool {
        self.config
            .max_records
            .is_some_and(|max_records| self.offset >= max_records)
    }

    async fn open_with_retry(&self, request: PageRequest) -> Result<PageBody, FetchError> {
        let policy = &self.config.retry;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(%request, attempt, "opening page");

            match self.source.open_page(request).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    let failure_type = classify_error(&e);
                    match policy.should_retry(failure_type, attempt) {
                        RetryDecision::Retry {
                            delay: backoff_delay,
                            attempt: next_attempt,
                        } => {
                            let retry_after = if failure_type == FailureType::RateLimited {
                                retry_after_delay(&e)
                            } else {
                                None
                            };
                            let delay = retry_after.unwrap_or(backoff_delay);
                            warn!(
                                %request,
                                attempt = next_attempt,
                                max_attempts = policy.max_attempts(),
                                delay_ms = delay.as_millis(),
                                using_retry_after = retry_after.is_some(),
                                error = %e,
                                "retrying page request"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        RetryDecision::DoNotRetry { reason } => {
                            debug!(%request, %reason, "not retrying page request");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    /// Parses one page body and writes its rows; returns the data row count.
    ///
    /// The body is owned here, so the connection is released on every exit
    /// path before the next page is requested.
    #[instrument(skip(self, body, writer), fields(offset = request.offset))]
    async fn merge_page<W>(
        &mut self,
        request: PageRequest,
        body: PageBody,
        writer: &mut AsyncWriter<W>,
    ) -> Result<u64, PaginateError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let offset = request.offset;
        let mut reader = AsyncReaderBuilder::new()
            .has_headers(false)
            .buffer_capacity(self.config.read_buffer_capacity)
            .create_reader(ChunkReader::new(body));

        let mut header = ByteRecord::new();
        let has_header = reader
            .read_byte_record(&mut header)
            .await
            .map_err(|e| PaginateError::csv(offset, e))?;
        if !has_header {
            debug!("page body is empty");
            return Ok(0);
        }

        let mapping = match &self.canonical_header {
            None => {
                debug!(columns = header.len(), "adopting canonical header");
                writer
                    .write_byte_record(&header)
                    .await
                    .map_err(PaginateError::write)?;
                let mapping = ColumnMapping::identity(header.len());
                self.canonical_header = Some(header);
                mapping
            }
            Some(canonical) => ColumnMapping::resolve(canonical, &header)
                .map_err(|source| PaginateError::MissingColumns { offset, source })?,
        };
        if !mapping.is_identity() {
            debug!(mapping = ?mapping.indices(), "page columns reordered");
        }

        let mut row = ByteRecord::new();
        let mut reordered = ByteRecord::new();
        let mut emitted = 0u64;
        while reader
            .read_byte_record(&mut row)
            .await
            .map_err(|e| PaginateError::csv(offset, e))?
        {
            let out = if mapping.is_identity() {
                &row
            } else {
                mapping.apply_into(&row, &mut reordered);
                &reordered
            };
            writer
                .write_byte_record(out)
                .await
                .map_err(PaginateError::write)?;
            emitted += 1;
        }
        writer.flush().await.map_err(PaginateError::flush)?;

        self.records_written += emitted;
        debug!(rows = emitted, "page merged");
        Ok(emitted)
    }
}
