//! Async messaging layer of the Hazelcast client protocol engine.
//!
//! A [`MessageConnection`] turns a chunked inbound byte stream into complete
//! [`ClientMessage`](hazelcast_core::protocol::ClientMessage)s, reassembling
//! fragmented ones, and hands each to a [`MessageHandler`]. Outbound messages
//! go through a [`MessageWriter`], which keeps the frames of one message
//! together on the wire.
//!
//! # Example
//!
//! ```rust,no_run
//! use hazelcast_core::protocol::{ClientMessage, PARTITION_ID_ANY};
//! use hazelcast_messaging::{handler_fn, MessageConnection, MessagingConfig};
//! use tokio::net::TcpStream;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let stream = TcpStream::connect("127.0.0.1:5701").await?;
//!     let (mut connection, reader) =
//!         MessageConnection::from_stream(stream, MessagingConfig::from_env()?);
//!
//!     connection.set_message_handler(handler_fn(|id, message| async move {
//!         tracing::info!(connection = %id, message_type = ?message.message_type(), "response");
//!     }))?;
//!     connection.activate()?;
//!
//!     let writer = connection.writer();
//!     writer
//!         .send(&ClientMessage::create_for_encode(0x000B00, PARTITION_ID_ANY))
//!         .await?;
//!
//!     connection.run(reader).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod connection;
pub mod runtime;

pub use config::{ConfigError, MessagingConfig, MessagingConfigBuilder};
pub use connection::{
    handler_fn, ByteSink, ConnectionId, ConnectionState, FnHandler, MessageConnection,
    MessageHandler, MessageWriter, StreamSink,
};
pub use hazelcast_core::{HazelcastError, Result};
pub use runtime::{Runtime, TokioRuntime};
