//! Sources of newline-framed stream lines.

use crate::framing::strip_cr;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// A live, line-oriented byte stream.
#[async_trait]
pub trait EventSource: Send {
    /// Read the next line as raw bytes, without its terminator.
    ///
    /// Blocks until a line arrives. `Ok(None)` means the stream ended; an
    /// error means the transport failed.
    async fn next_line(&mut self) -> std::io::Result<Option<Vec<u8>>>;
}

/// An [`EventSource`] over any async reader.
pub struct ReaderSource<R> {
    reader: BufReader<R>,
}

impl<R: AsyncRead + Unpin + Send> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> EventSource for ReaderSource<R> {
    async fn next_line(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line).await? == 0 {
            return Ok(None);
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        strip_cr(&mut line);
        Ok(Some(line))
    }
}

impl<R> std::fmt::Debug for ReaderSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderSource").finish_non_exhaustive()
    }
}
