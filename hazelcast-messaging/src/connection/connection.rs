//! A single message connection over a byte stream.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use bytes::BytesMut;
use hazelcast_core::protocol::{ClientMessage, ClientMessageCodec, FragmentAssembler};
use hazelcast_core::{HazelcastError, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, ReadHalf, WriteHalf};

use super::handler::MessageHandler;
use super::transport::{ByteSink, StreamSink};
use super::writer::MessageWriter;
use crate::config::MessagingConfig;
use crate::runtime::{Runtime, TokioRuntime};

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generates a new unique connection ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw ID value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Lifecycle of a [`MessageConnection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Created; the handler may still be set.
    Created,
    /// Reading and dispatching messages.
    Active,
    /// Closed; nothing is read or sent anymore.
    Closed,
}

/// One protocol connection: the inbound parser and reassembly table plus the
/// outbound writer.
///
/// The connection is the single reader of its stream. Bytes are fed through
/// [`receive_bytes`](Self::receive_bytes) (or [`run`](Self::run)), which
/// takes `&mut self`, so the parse cursor and the fragment table are never
/// shared. Every complete message is handed to the [`MessageHandler`] on a
/// task spawned on the connection's [`Runtime`].
///
/// Sending goes through a [`MessageWriter`]; clone it with
/// [`writer`](Self::writer) to send from several tasks.
pub struct MessageConnection<S, R = TokioRuntime> {
    id: ConnectionId,
    state: ConnectionState,
    codec: ClientMessageCodec,
    assembler: FragmentAssembler,
    handler: Option<Arc<dyn MessageHandler>>,
    writer: MessageWriter<S>,
    runtime: R,
    config: MessagingConfig,
}

impl<S: ByteSink> MessageConnection<S> {
    /// Creates a connection that sends through `sink` and dispatches on Tokio.
    pub fn new(sink: S, config: MessagingConfig) -> Self {
        Self::with_runtime(sink, config, TokioRuntime)
    }
}

impl<T> MessageConnection<StreamSink<WriteHalf<T>>>
where
    T: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Splits a duplex stream into a connection over its write half and the
    /// read half to pass to [`run`](Self::run).
    pub fn from_stream(stream: T, config: MessagingConfig) -> (Self, ReadHalf<T>) {
        let (reader, writer) = tokio::io::split(stream);
        (Self::new(StreamSink::new(writer), config), reader)
    }
}

impl<S: ByteSink, R: Runtime> MessageConnection<S, R> {
    /// Creates a connection that dispatches handlers on `runtime`.
    pub fn with_runtime(sink: S, config: MessagingConfig, runtime: R) -> Self {
        let id = ConnectionId::new();
        let codec = match config.max_frame_length() {
            Some(max) => ClientMessageCodec::with_max_frame_length(max),
            None => ClientMessageCodec::new(),
        };
        let assembler = match config.fragment_idle_timeout() {
            Some(timeout) => FragmentAssembler::with_idle_timeout(timeout),
            None => FragmentAssembler::new(),
        };
        Self {
            id,
            state: ConnectionState::Created,
            codec,
            assembler,
            handler: None,
            writer: MessageWriter::new(id, sink),
            runtime,
            config,
        }
    }

    /// Returns the connection's unique identifier.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns true while the connection reads and dispatches messages.
    pub fn is_active(&self) -> bool {
        self.state == ConnectionState::Active
    }

    /// Returns the configuration the connection was created with.
    pub fn config(&self) -> &MessagingConfig {
        &self.config
    }

    /// Returns how many fragmented messages are partially assembled.
    pub fn pending_fragments(&self) -> usize {
        self.assembler.len()
    }

    /// Registers the handler for inbound messages.
    ///
    /// Must happen before [`activate`](Self::activate); a later call fails with
    /// [`HazelcastError::InvalidOperation`].
    pub fn set_message_handler<H: MessageHandler>(&mut self, handler: H) -> Result<()> {
        if self.state != ConnectionState::Created {
            return Err(HazelcastError::InvalidOperation(format!(
                "message handler of {} must be set before activation",
                self.id
            )));
        }
        self.handler = Some(Arc::new(handler));
        Ok(())
    }

    /// Starts reading. Requires a registered handler.
    pub fn activate(&mut self) -> Result<()> {
        match self.state {
            ConnectionState::Created => {}
            ConnectionState::Active => {
                return Err(HazelcastError::InvalidOperation(format!(
                    "connection {} is already active",
                    self.id
                )))
            }
            ConnectionState::Closed => {
                return Err(HazelcastError::InvalidOperation(format!(
                    "connection {} is closed",
                    self.id
                )))
            }
        }
        if self.handler.is_none() {
            return Err(HazelcastError::InvalidOperation(format!(
                "connection {} has no message handler",
                self.id
            )));
        }

        self.state = ConnectionState::Active;
        tracing::debug!(connection = %self.id, "activated connection");
        Ok(())
    }

    /// Consumes as many frames from `buf` as it holds.
    ///
    /// Completed messages are dispatched to the handler without waiting for
    /// it. Incomplete trailing bytes stay in `buf` or in the parse cursor for
    /// the next call. Returns whether at least one whole frame was decoded;
    /// a call that only consumed a frame header returns false.
    ///
    /// A [`HazelcastError::Protocol`] error means the stream is corrupt and
    /// the connection must be closed.
    pub fn receive_bytes(&mut self, buf: &mut BytesMut) -> Result<bool> {
        if self.state != ConnectionState::Active {
            return Err(HazelcastError::InvalidOperation(format!(
                "connection {} is not active",
                self.id
            )));
        }

        let before = self.codec.frames_decoded();
        let now = Instant::now();
        while let Some(unit) = self.codec.decode_message(buf)? {
            if let Some(message) = self.assembler.accept_at(unit, now) {
                self.dispatch(message);
            }
        }
        self.assembler.evict_idle(now);

        Ok(self.codec.frames_decoded() != before)
    }

    /// Reads `reader` until it ends, feeding every chunk to
    /// [`receive_bytes`](Self::receive_bytes).
    ///
    /// Returns `Ok(())` on a clean end of stream. A stream that ends inside a
    /// frame or between the frames of a message fails with
    /// [`HazelcastError::Connection`].
    pub async fn run<Rd>(&mut self, mut reader: Rd) -> Result<()>
    where
        Rd: AsyncRead + Unpin,
    {
        let mut buf = BytesMut::with_capacity(self.config.read_buffer_capacity());
        loop {
            if buf.capacity() == buf.len() {
                buf.reserve(self.config.read_buffer_capacity());
            }

            let bytes_read = reader.read_buf(&mut buf).await.map_err(|e| {
                HazelcastError::Connection(format!("failed to read from {}: {}", self.id, e))
            })?;

            if bytes_read == 0 {
                if buf.is_empty() && self.codec.is_idle() {
                    tracing::debug!(
                        connection = %self.id,
                        pending_fragments = self.assembler.len(),
                        "stream ended"
                    );
                    return Ok(());
                }
                return Err(HazelcastError::Connection(format!(
                    "connection {} closed unexpectedly",
                    self.id
                )));
            }

            self.receive_bytes(&mut buf)?;
        }
    }

    /// Sends a message to the peer.
    pub async fn send(&self, message: &ClientMessage) -> Result<()> {
        self.writer.send(message).await
    }

    /// Returns a writer sharing this connection's sink and write lock.
    pub fn writer(&self) -> MessageWriter<S> {
        self.writer.clone()
    }

    /// Closes the connection, dropping partially assembled messages.
    ///
    /// Writers obtained from [`writer`](Self::writer) stop sending as well.
    pub fn close(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }

        let dropped = self.assembler.len();
        self.assembler.clear();
        self.writer.close();
        self.state = ConnectionState::Closed;
        tracing::debug!(
            connection = %self.id,
            dropped_fragments = dropped,
            "closed connection"
        );
    }

    fn dispatch(&self, message: ClientMessage) {
        let Some(handler) = self.handler.as_ref().map(Arc::clone) else {
            return;
        };

        tracing::trace!(
            connection = %self.id,
            message_type = ?message.message_type(),
            correlation_id = ?message.correlation_id(),
            "dispatching message"
        );
        let id = self.id;
        self.runtime.spawn(async move {
            handler.on_message(id, message).await;
        });
    }
}

impl<S, R> fmt::Debug for MessageConnection<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageConnection")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("pending_fragments", &self.assembler.len())
            .field("has_handler", &self.handler.is_some())
            .field("config", &self.config)
            .finish()
    }
}
