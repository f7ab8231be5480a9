//! MessagePusher trait: the seam between routing decisions and transport.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::connection::ConnectionId;

/// Channel used to push outbound messages to one connection's socket task
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),
    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// Outbound delivery abstraction.
///
/// UseCases decide *who* receives a message; this trait owns *how* it gets
/// there. The WebSocket implementation lives in the infrastructure layer.
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Associate a connection with its outbound channel
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Drop a connection's outbound channel
    async fn unregister_connection(&self, connection_id: &ConnectionId);

    /// Deliver to exactly one connection; errors if it is not registered
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// Deliver to every target, tolerating individual failures
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
