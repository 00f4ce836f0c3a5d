//! Response sender seam between handlers and the transport.
//!
//! Handlers address outbound messages by connection id through the
//! [`ClientResponseSender`] trait; the production implementation delegates
//! to the connection manager's delivery channel. Tests substitute a
//! recording implementation so handler behavior can be asserted without
//! sockets.

use super::{manager::ConnectionManager, ConnectionId};
use std::sync::Arc;

/// Abstract send primitive for messages addressed to client connections.
///
/// All sends are fire-and-forget from the handlers' perspective: a
/// returned error is logged by the caller and never escalated.
pub trait ClientResponseSender: Send + Sync + std::fmt::Debug {
    /// Sends a serialized envelope to a specific connection.
    fn send_to_connection(
        &self,
        connection_id: ConnectionId,
        message: String,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), String>> + Send + '_>>;

    /// Checks whether a connection is currently open.
    fn is_connection_open(
        &self,
        connection_id: ConnectionId,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = bool> + Send + '_>>;
}

/// Production [`ClientResponseSender`] backed by the connection manager.
#[derive(Clone, Debug)]
pub struct WsResponseSender {
    /// Connection manager used for lookup and delivery
    connection_manager: Arc<ConnectionManager>,
}

impl WsResponseSender {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }
}

impl ClientResponseSender for WsResponseSender {
    fn send_to_connection(
        &self,
        connection_id: ConnectionId,
        message: String,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), String>> + Send + '_>> {
        let connection_manager = self.connection_manager.clone();
        Box::pin(async move {
            if !connection_manager.is_connection_open(connection_id).await {
                return Err(format!("Connection {} is not open", connection_id));
            }
            connection_manager
                .send_to_connection(connection_id, message)
                .await;
            Ok(())
        })
    }

    fn is_connection_open(
        &self,
        connection_id: ConnectionId,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = bool> + Send + '_>> {
        let connection_manager = self.connection_manager.clone();
        Box::pin(async move { connection_manager.is_connection_open(connection_id).await })
    }
}
