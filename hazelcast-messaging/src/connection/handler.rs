//! Consumer side of a connection.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use hazelcast_core::protocol::ClientMessage;

use super::ConnectionId;

/// Receives every complete message read from a connection.
///
/// Each call runs on its own spawned task, so handlers may be invoked
/// concurrently and in any order relative to each other. The reader does not
/// wait for a handler before parsing further bytes.
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    /// Handles one complete message.
    async fn on_message(&self, connection_id: ConnectionId, message: ClientMessage);
}

#[async_trait]
impl<H> MessageHandler for Arc<H>
where
    H: MessageHandler + ?Sized,
{
    async fn on_message(&self, connection_id: ConnectionId, message: ClientMessage) {
        (**self).on_message(connection_id, message).await
    }
}

/// A [`MessageHandler`] backed by an async closure. See [`handler_fn`].
#[derive(Debug, Clone)]
pub struct FnHandler<F> {
    f: F,
}

/// Creates a [`MessageHandler`] from an async closure.
///
/// ```rust
/// use hazelcast_messaging::connection::handler_fn;
///
/// let handler = handler_fn(|connection_id, message| async move {
///     tracing::info!(%connection_id, frames = message.frame_count(), "received");
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(ConnectionId, ClientMessage) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> MessageHandler for FnHandler<F>
where
    F: Fn(ConnectionId, ClientMessage) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn on_message(&self, connection_id: ConnectionId, message: ClientMessage) {
        (self.f)(connection_id, message).await
    }
}
