//! Byte-level send primitive underneath the message writer.

use async_trait::async_trait;
use bytes::Bytes;
use hazelcast_core::{HazelcastError, Result};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Destination for outbound wire bytes.
///
/// A [`MessageWriter`](super::MessageWriter) calls `send_bytes` once for each
/// frame header and once for each non-empty frame payload, in order, while it
/// holds the connection's write lock. Implementations do not need their own
/// synchronization.
#[async_trait]
pub trait ByteSink: Send + 'static {
    /// Sends `bytes` to the peer.
    async fn send_bytes(&mut self, bytes: Bytes) -> Result<()>;

    /// Flushes buffered bytes after a whole message has been sent.
    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// [`ByteSink`] over any [`AsyncWrite`].
#[derive(Debug)]
pub struct StreamSink<W> {
    inner: W,
}

impl<W> StreamSink<W> {
    /// Wraps a writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[async_trait]
impl<W> ByteSink for StreamSink<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn send_bytes(&mut self, bytes: Bytes) -> Result<()> {
        self.inner
            .write_all(&bytes)
            .await
            .map_err(|e| HazelcastError::Connection(format!("failed to write: {}", e)))
    }

    async fn flush(&mut self) -> Result<()> {
        self.inner
            .flush()
            .await
            .map_err(|e| HazelcastError::Connection(format!("failed to flush: {}", e)))
    }
}
