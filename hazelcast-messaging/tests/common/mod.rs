//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use hazelcast_core::protocol::{ClientMessage, ClientMessageCodec, Frame, FrameFlags};
use hazelcast_messaging::{
    ByteSink, ConnectionId, HazelcastError, MessageConnection, MessageHandler, MessagingConfig,
    Result,
};
use tokio::sync::mpsc;

static TRACING: Once = Once::new();

/// Installs a test subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Sink that records every `send_bytes` call, yielding between calls so
/// concurrent writers get a chance to interleave.
#[derive(Clone, Default)]
pub struct RecordingSink {
    sends: Arc<Mutex<Vec<Bytes>>>,
}

impl RecordingSink {
    pub fn sends(&self) -> Vec<Bytes> {
        self.sends.lock().unwrap().clone()
    }

    pub fn wire(&self) -> BytesMut {
        let mut wire = BytesMut::new();
        for chunk in self.sends.lock().unwrap().iter() {
            wire.extend_from_slice(chunk);
        }
        wire
    }
}

#[async_trait]
impl ByteSink for RecordingSink {
    async fn send_bytes(&mut self, bytes: Bytes) -> Result<()> {
        tokio::task::yield_now().await;
        self.sends.lock().unwrap().push(bytes);
        Ok(())
    }
}

/// Sink whose sends fail after `limit` successful ones.
#[derive(Clone)]
pub struct FailingSink {
    limit: usize,
    attempts: Arc<Mutex<usize>>,
}

impl FailingSink {
    pub fn after(limit: usize) -> Self {
        Self {
            limit,
            attempts: Arc::new(Mutex::new(0)),
        }
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl ByteSink for FailingSink {
    async fn send_bytes(&mut self, _bytes: Bytes) -> Result<()> {
        let mut attempts = self.attempts.lock().unwrap();
        *attempts += 1;
        if *attempts > self.limit {
            return Err(HazelcastError::Connection("connection reset by peer".to_string()));
        }
        Ok(())
    }
}

/// Handler that forwards every message to a channel.
pub struct ChannelHandler {
    tx: mpsc::UnboundedSender<(ConnectionId, ClientMessage)>,
}

#[async_trait]
impl MessageHandler for ChannelHandler {
    async fn on_message(&self, connection_id: ConnectionId, message: ClientMessage) {
        let _ = self.tx.send((connection_id, message));
    }
}

pub type Received = mpsc::UnboundedReceiver<(ConnectionId, ClientMessage)>;

/// Creates an activated connection whose handler feeds the returned channel.
pub fn active_connection<S: ByteSink>(sink: S, config: MessagingConfig) -> (MessageConnection<S>, Received) {
    init_tracing();
    let (tx, rx) = mpsc::unbounded_channel();
    let mut connection = MessageConnection::new(sink, config);
    connection
        .set_message_handler(ChannelHandler { tx })
        .expect("handler is set before activation");
    connection.activate().expect("handler is registered");
    (connection, rx)
}

/// Waits briefly for the next dispatched message.
pub async fn next_message(rx: &mut Received) -> ClientMessage {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a message")
        .expect("handler channel closed")
        .1
}

/// Asserts that no further message is dispatched within a short window.
pub async fn assert_no_message(rx: &mut Received) {
    let result = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
    assert!(result.is_err(), "unexpected message dispatched");
}

pub fn encode(message: &ClientMessage) -> BytesMut {
    let mut buf = BytesMut::new();
    ClientMessageCodec::new()
        .encode_message(message, &mut buf)
        .unwrap();
    buf
}

/// Builds one fragment send unit: header frame plus one data frame.
pub fn fragment(fragment_id: i64, flags: FrameFlags, data: &[u8]) -> ClientMessage {
    let mut message = ClientMessage::with_initial_frame(Frame::new_fragment_header(fragment_id, flags));
    message.append_data(data);
    message.set_final();
    message
}
