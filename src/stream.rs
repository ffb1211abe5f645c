//! Pull-based byte reader over a chunked body stream.
//!
//! HTTP clients hand out response bodies as a stream of byte chunks whose
//! boundaries have nothing to do with CSV records. [`ChunkReader`] turns such a
//! stream into an [`AsyncRead`] so an incremental CSV parser can pull exactly as
//! many bytes as it wants per call, whether that is one line or a full buffer.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use covid_core::stream::ChunkReader;
//! use futures_util::stream;
//! use tokio::io::AsyncReadExt;
//!
//! # async fn example() -> std::io::Result<()> {
//! let chunks = stream::iter(vec![
//!     Ok::<_, std::io::Error>(Bytes::from_static(b"id,da")),
//!     Ok(Bytes::from_static(b"te\n")),
//! ]);
//! let mut reader = ChunkReader::new(chunks);
//! let mut text = String::new();
//! reader.read_to_string(&mut text).await?;
//! assert_eq!(text, "id,date\n");
//! # Ok(())
//! # }
//! ```

use std::error::Error as StdError;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio::io::{AsyncRead, ReadBuf};

/// Adapts a stream of byte chunks into a forward-only [`AsyncRead`].
///
/// At most one chunk is held at a time: the unread remainder of the last chunk
/// pulled from the stream. The next chunk is only requested once that
/// remainder has been fully handed out.
#[derive(Debug)]
pub struct ChunkReader<S> {
    chunks: S,
    leftover: Bytes,
    exhausted: bool,
}

impl<S> ChunkReader<S> {
    /// Wraps a chunk stream. Nothing is pulled until the first read.
    #[must_use]
    pub fn new(chunks: S) -> Self {
        Self {
            chunks,
            leftover: Bytes::new(),
            exhausted: false,
        }
    }

    /// Number of bytes pulled from the stream but not yet read.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.leftover.len()
    }

    /// Returns true once the underlying stream has ended.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl<S, E> AsyncRead for ChunkReader<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }

        // Empty chunks carry no data; keep pulling until bytes or end of stream.
        while this.leftover.is_empty() {
            if this.exhausted {
                return Poll::Ready(Ok(()));
            }
            match ready!(this.chunks.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => this.leftover = chunk,
                Some(Err(error)) => return Poll::Ready(Err(io::Error::other(error))),
                None => this.exhausted = true,
            }
        }

        let take = buf.remaining().min(this.leftover.len());
        let head = this.leftover.split_to(take);
        buf.put_slice(&head);
        Poll::Ready(Ok(()))
    }
}
