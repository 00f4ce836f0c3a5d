//! Connection manager for tracking and managing client connections.
//!
//! This module provides the central management system for all client
//! connections, handling connection lifecycle, id assignment, and message
//! delivery through a broadcast channel that each connection's outgoing
//! task subscribes to.

use super::{client::ClientConnection, ConnectionId};
use futures_util::sink::SinkExt;
use futures_util::stream::SplitSink;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio_tungstenite::{tungstenite::Message, WebSocketStream};
use tracing::info;

/// Central manager for all client connections.
///
/// The `ConnectionManager` tracks active connections, assigns unique ids,
/// and provides message delivery. It uses async-safe data structures to
/// handle concurrent access from multiple connection handlers.
///
/// # Architecture
///
/// * Uses `RwLock<HashMap>` for thread-safe connection storage
/// * Implements atomic connection id generation
/// * Provides a broadcast channel for outgoing messages; each connection's
///   outgoing task filters for its own id
#[derive(Debug)]
pub struct ConnectionManager {
    /// Map of connection id to client connection information
    connections: Arc<RwLock<HashMap<ConnectionId, ClientConnection>>>,
    ws_senders: Arc<
        RwLock<
            HashMap<
                ConnectionId,
                Arc<tokio::sync::Mutex<SplitSink<WebSocketStream<tokio::net::TcpStream>, Message>>>,
            >,
        >,
    >,

    /// Atomic counter for generating unique connection ids
    next_id: Arc<std::sync::atomic::AtomicUsize>,

    /// Broadcast sender for outgoing messages to specific connections
    sender: broadcast::Sender<(ConnectionId, String)>,
}

impl ConnectionManager {
    /// Creates a new connection manager with an outgoing channel sized for
    /// message queuing under load.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1000);
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            ws_senders: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(std::sync::atomic::AtomicUsize::new(1)),
            sender,
        }
    }

    /// Adds a new connection and returns its unique id.
    ///
    /// # Arguments
    ///
    /// * `remote_addr` - The network address of the connecting client
    pub async fn add_connection(&self, remote_addr: SocketAddr) -> ConnectionId {
        let connection_id = self
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let connection = ClientConnection::new(remote_addr);
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, connection);
        info!("🔗 Connection {} from {}", connection_id, remote_addr);
        connection_id
    }

    /// Register the WebSocket sender for a connection
    pub async fn register_ws_sender(
        &self,
        connection_id: ConnectionId,
        ws_sender: Arc<
            tokio::sync::Mutex<SplitSink<WebSocketStream<tokio::net::TcpStream>, Message>>,
        >,
    ) {
        let mut senders = self.ws_senders.write().await;
        senders.insert(connection_id, ws_sender);
    }

    /// Remove the WebSocket sender for a connection
    pub async fn remove_ws_sender(&self, connection_id: ConnectionId) {
        let mut senders = self.ws_senders.write().await;
        senders.remove(&connection_id);
    }

    /// Removes a connection from the manager.
    ///
    /// Cleans up the connection entry and logs the disconnection.
    /// This should be called when a client disconnects or times out.
    pub async fn remove_connection(&self, connection_id: ConnectionId) {
        let mut connections = self.connections.write().await;
        if let Some(connection) = connections.remove(&connection_id) {
            info!(
                "❌ Connection {} from {} disconnected",
                connection_id, connection.remote_addr
            );
        }
    }

    /// Whether the connection is still registered.
    pub async fn is_connection_open(&self, connection_id: ConnectionId) -> bool {
        let connections = self.connections.read().await;
        connections.contains_key(&connection_id)
    }

    /// Number of currently registered connections.
    pub async fn connection_count(&self) -> usize {
        let connections = self.connections.read().await;
        connections.len()
    }

    /// Queues a message for delivery to the specified connection through
    /// the internal broadcast channel.
    pub async fn send_to_connection(&self, connection_id: ConnectionId, message: String) {
        if let Err(e) = self.sender.send((connection_id, message)) {
            tracing::error!(
                "Failed to send message to connection {}: {:?}",
                connection_id,
                e
            );
        }
    }

    /// Sends a close frame to a connection and removes it.
    pub async fn close_connection(&self, connection_id: ConnectionId) {
        let senders = self.ws_senders.read().await;
        if let Some(ws_sender) = senders.get(&connection_id) {
            let mut ws_sender = ws_sender.lock().await;
            let _ = ws_sender.send(Message::Close(None)).await;
        }
        drop(senders);
        self.remove_connection(connection_id).await;
        self.remove_ws_sender(connection_id).await;
    }

    /// Creates a new receiver for outgoing messages.
    ///
    /// Each connection handler should call this to get a receiver
    /// for messages targeted to their specific connection.
    pub fn subscribe(&self) -> broadcast::Receiver<(ConnectionId, String)> {
        self.sender.subscribe()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
