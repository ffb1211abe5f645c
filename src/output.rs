//! Output destinations for the merged CSV stream.
//!
//! The destination is chosen from a single option value:
//! - absent or `-` writes to standard output
//! - a path ending in `.gz` is gzip-compressed
//! - any other path is written as plain text
//!
//! A sink is opened once per run and must be closed with
//! [`OutputSink::finish`], which flushes buffers and writes the gzip trailer.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use async_compression::tokio::write::GzipEncoder;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::debug;

/// Suffix that selects gzip compression.
pub const GZIP_SUFFIX: &str = ".gz";

/// Errors opening, writing or closing the output destination.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The output file could not be created.
    #[error("cannot open output {path}: {source}")]
    Open {
        /// The requested output path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Buffered output could not be flushed or finalised.
    #[error("cannot close output {target}: {source}")]
    Close {
        /// Display form of the destination.
        target: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Where the merged CSV goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output.
    Stdout,
    /// Uncompressed file.
    Plain(PathBuf),
    /// Gzip-compressed file.
    Gzip(PathBuf),
}

impl OutputTarget {
    /// Selects a destination from the `--output` value.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some("-") => Self::Stdout,
            Some(path) if path.ends_with(GZIP_SUFFIX) => Self::Gzip(PathBuf::from(path)),
            Some(path) => Self::Plain(PathBuf::from(path)),
        }
    }

    /// Opens the destination for writing, truncating existing files.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Open`] if the file cannot be created.
    pub async fn open(&self) -> Result<OutputSink, SinkError> {
        let writer: Box<dyn AsyncWrite + Unpin + Send> = match self {
            Self::Stdout => Box::new(tokio::io::stdout()),
            Self::Plain(path) => Box::new(BufWriter::new(create_file(path).await?)),
            Self::Gzip(path) => Box::new(GzipEncoder::new(BufWriter::new(create_file(path).await?))),
        };
        debug!(output = %self, "output opened");
        Ok(OutputSink {
            target: self.to_string(),
            writer,
        })
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("<stdout>"),
            Self::Plain(path) => write!(f, "{}", path.display()),
            Self::Gzip(path) => write!(f, "{} (gzip)", path.display()),
        }
    }
}

async fn create_file(path: &Path) -> Result<File, SinkError> {
    File::create(path).await.map_err(|source| SinkError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// An open output destination.
pub struct OutputSink {
    target: String,
    writer: Box<dyn AsyncWrite + Unpin + Send>,
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSink")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl OutputSink {
    /// Flushes and closes the destination.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Close`] if buffered bytes cannot be written out.
    pub async fn finish(mut self) -> Result<(), SinkError> {
        self.writer
            .shutdown()
            .await
            .map_err(|source| SinkError::Close {
                target: self.target.clone(),
                source,
            })?;
        debug!(output = %self.target, "output closed");
        Ok(())
    }
}

impl AsyncWrite for OutputSink {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.writer).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.writer).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.writer).poll_shutdown(cx)
    }
}
