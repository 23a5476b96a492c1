//! Serialized whole-message writes.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use hazelcast_core::protocol::{frame_codec, ClientMessage, FRAME_HEADER_SIZE};
use hazelcast_core::{HazelcastError, Result};
use tokio::sync::Mutex;

use super::transport::ByteSink;
use super::ConnectionId;

/// Writes messages to one connection's [`ByteSink`].
///
/// Clones share the sink and its lock. The lock is held for a whole message,
/// so the frames of two concurrent sends never interleave on the wire.
///
/// A failed write leaves the peer with a partial message that cannot be
/// retracted. The writer then refuses every later send; the connection has
/// to be closed and replaced.
pub struct MessageWriter<S> {
    connection_id: ConnectionId,
    sink: Arc<Mutex<S>>,
    broken: Arc<AtomicBool>,
}

impl<S: ByteSink> MessageWriter<S> {
    /// Creates a writer over `sink` for the given connection.
    pub fn new(connection_id: ConnectionId, sink: S) -> Self {
        Self {
            connection_id,
            sink: Arc::new(Mutex::new(sink)),
            broken: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sends every frame of `message`, header then payload, in order.
    ///
    /// Frames go out with [`ClientMessage::wire_frames`] flags: the last one
    /// carries `FINAL` and no other does.
    pub async fn send(&self, message: &ClientMessage) -> Result<()> {
        if message.is_empty() {
            return Err(HazelcastError::Protocol(
                "cannot send empty message".to_string(),
            ));
        }
        self.check_usable()?;

        let mut sink = self.sink.lock().await;
        // Another sender may have failed while we waited for the lock.
        self.check_usable()?;

        if let Err(e) = write_message(&mut *sink, message).await {
            self.broken.store(true, Ordering::Release);
            tracing::warn!(
                connection = %self.connection_id,
                error = %e,
                "write failed, connection can no longer send"
            );
            return Err(match e {
                HazelcastError::Connection(_) => e,
                other => HazelcastError::Connection(format!(
                    "failed to write to {}: {}",
                    self.connection_id, other
                )),
            });
        }

        tracing::trace!(
            connection = %self.connection_id,
            frames = message.frame_count(),
            bytes = message.wire_size(),
            "sent message"
        );
        Ok(())
    }

    /// Returns true once a write failed or the writer was closed.
    pub fn is_broken(&self) -> bool {
        self.broken.load(Ordering::Acquire)
    }

    /// Refuses all further sends from this writer and its clones.
    pub fn close(&self) {
        self.broken.store(true, Ordering::Release);
    }

    fn check_usable(&self) -> Result<()> {
        if self.is_broken() {
            return Err(HazelcastError::Connection(format!(
                "connection {} can no longer send",
                self.connection_id
            )));
        }
        Ok(())
    }
}

async fn write_message<S: ByteSink>(sink: &mut S, message: &ClientMessage) -> Result<()> {
    for (frame, flags) in message.wire_frames() {
        let mut header = BytesMut::with_capacity(FRAME_HEADER_SIZE);
        frame_codec::write_header(&mut header, frame.content.len(), flags);
        sink.send_bytes(header.freeze()).await?;

        if !frame.content.is_empty() {
            sink.send_bytes(Bytes::copy_from_slice(&frame.content)).await?;
        }
    }
    sink.flush().await
}

impl<S> Clone for MessageWriter<S> {
    fn clone(&self) -> Self {
        Self {
            connection_id: self.connection_id,
            sink: Arc::clone(&self.sink),
            broken: Arc::clone(&self.broken),
        }
    }
}

impl<S> fmt::Debug for MessageWriter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageWriter")
            .field("connection_id", &self.connection_id)
            .field("broken", &self.broken.load(Ordering::Acquire))
            .finish()
    }
}
