//! Connection-level plumbing: the inbound reader, the outbound writer, and
//! the seams toward the transport and the invocation layer.

#[allow(clippy::module_inception)]
mod connection;
mod handler;
mod transport;
mod writer;

pub use connection::{ConnectionId, ConnectionState, MessageConnection};
pub use handler::{handler_fn, FnHandler, MessageHandler};
pub use transport::{ByteSink, StreamSink};
pub use writer::MessageWriter;
