//! Boundary to the realtime messaging backend.
//!
//! The session controller never touches a socket directly; it dials through
//! a [`Connector`] and talks to the resulting [`Transport`] handle. The
//! events channel is handed to the connector before the dial starts, so
//! nothing the server sends right after accepting can be missed.

mod ws;

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

pub use ws::WsConnector;

use crate::protocol::{ClientEvent, ServerEvent};

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("connection timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection closed")]
    Closed,
}

/// Lifecycle and wire events delivered by a transport
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The connection is established and ready
    Opened,
    /// The connection attempt failed
    ConnectError(String),
    /// The connection dropped or was closed by the server
    Closed,
    /// A wire event from the server
    Server(ServerEvent),
}

/// Handle to one connection
pub trait Transport: Send {
    /// Queue an event for sending. Fails once the connection is gone.
    fn emit(&self, event: ClientEvent) -> TransportResult<()>;

    /// Tear the connection down. Nothing is sent or delivered afterwards.
    fn close(&self);
}

/// Dials new connections
#[async_trait]
pub trait Connector: Send + Sync {
    /// Start a new connection, delivering lifecycle and server events on
    /// `events`. The dial itself completes in the background; its outcome
    /// arrives as [`TransportEvent::Opened`] or
    /// [`TransportEvent::ConnectError`].
    async fn open(
        &self,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> TransportResult<Box<dyn Transport>>;
}
