//! One complete export run: open the destination, paginate, close.

use csv_async::AsyncWriter;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::fetch::PageSource;
use crate::output::{OutputTarget, SinkError};
use crate::paginate::{PaginateError, PaginationSummary, Paginator, PaginatorConfig};

/// Errors that abort an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The destination could not be opened or closed.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// Paging or merging failed.
    #[error(transparent)]
    Paginate(#[from] PaginateError),
}

/// Exports every page of `source` to `target`.
///
/// The destination is opened once and closed on every exit path: after a
/// failed page, rows already written are flushed and the file (or gzip
/// stream) is finalised before the error is returned. When both the run
/// and the close fail, the run's error is reported.
///
/// # Errors
///
/// Returns [`ExportError`] for invalid settings, any fatal paging error, or
/// a destination that cannot be opened, written or closed.
#[instrument(skip_all, fields(output = %target))]
pub async fn export(
    source: &dyn PageSource,
    config: PaginatorConfig,
    target: &OutputTarget,
) -> Result<PaginationSummary, ExportError> {
    let mut paginator = Paginator::new(source, config)?;
    let mut sink = target.open().await?;

    let outcome = {
        let mut writer = AsyncWriter::from_writer(&mut sink);
        let outcome = paginator.run(&mut writer).await;
        let flushed = writer.flush().await;
        match (outcome, flushed) {
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(PaginateError::flush(e)),
            (Ok(summary), Ok(())) => Ok(summary),
        }
    };

    let closed = sink.finish().await;
    match (outcome, closed) {
        (Ok(summary), Ok(())) => {
            info!(records = summary.records_written, "export complete");
            Ok(summary)
        }
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), closed) => {
            if let Err(close_error) = closed {
                warn!(error = %close_error, "output could not be closed after failure");
            }
            Err(e.into())
        }
    }
}
