//! Executors that run message handlers.
//!
//! A [`MessageConnection`](crate::MessageConnection) never awaits its
//! [`MessageHandler`](crate::MessageHandler). Each complete message becomes
//! its own task, started through [`Runtime::spawn`], and the reader goes back
//! to parsing immediately.
//!
//! [`TokioRuntime`] spawns on the ambient Tokio runtime. A
//! [`tokio::runtime::Handle`] is also a [`Runtime`], for readers driven from
//! threads that are not inside a Tokio context:
//!
//! ```rust
//! use hazelcast_messaging::{MessageConnection, MessagingConfig, StreamSink};
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let (_peer, stream) = tokio::io::duplex(1024);
//! let connection = MessageConnection::with_runtime(
//!     StreamSink::new(stream),
//!     MessagingConfig::default(),
//!     rt.handle().clone(),
//! );
//! # drop(connection);
//! ```

use std::future::Future;

/// Starts handler tasks for a connection.
pub trait Runtime: Send + Sync + 'static {
    /// Runs `future` to completion in the background.
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Spawns onto the Tokio runtime of the calling context.
///
/// Panics like [`tokio::spawn`] when used outside a Tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioRuntime;

impl Runtime for TokioRuntime {
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(future);
    }
}

impl Runtime for tokio::runtime::Handle {
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::runtime::Handle::spawn(self, future);
    }
}
