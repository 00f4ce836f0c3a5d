//! Session/response primitives shared by all domain handlers.
//!
//! `SessionContext` bundles the registries, the client send seam, and the
//! upstream send handle, and implements the send discipline the handlers
//! rely on:
//!
//! * connection resolution is by client id, fresh at the moment of send,
//!   never cached across an await
//! * an unresolvable connection silently skips the send
//! * broadcast fans out over a point-in-time snapshot of the client
//!   registry, and one failed recipient never aborts the fan-out

use crate::connection::{ClientResponseSender, ConnectionId};
use crate::services::Services;
use gateway_events::{EventTimestamps, EventType, ResponseBuilder};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Handle for queueing messages to the upstream game-logic process.
///
/// Sends are fire-and-forget; the worker owns the actual TCP connection
/// and drains this queue, so handlers never block on upstream I/O.
#[derive(Debug, Clone)]
pub struct UpstreamHandle {
    tx: mpsc::UnboundedSender<String>,
}

impl UpstreamHandle {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }

    pub fn send(&self, message: String) {
        if self.tx.send(message).is_err() {
            error!("Upstream queue is closed, dropping message");
        }
    }
}

/// Everything a handler needs to read state and emit messages.
#[derive(Debug, Clone)]
pub struct SessionContext {
    services: Arc<Services>,
    sender: Arc<dyn ClientResponseSender>,
    upstream: UpstreamHandle,
}

impl SessionContext {
    pub fn new(
        services: Arc<Services>,
        sender: Arc<dyn ClientResponseSender>,
        upstream: UpstreamHandle,
    ) -> Self {
        Self {
            services,
            sender,
            upstream,
        }
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    pub fn sender(&self) -> &Arc<dyn ClientResponseSender> {
        &self.sender
    }

    /// Fresh connection lookup for a client. `0` is the unauthenticated
    /// sentinel and never resolves.
    pub fn resolve_connection(&self, client_id: i64) -> Option<ConnectionId> {
        if client_id == 0 {
            return None;
        }
        self.services.clients.connection_of(client_id)
    }

    /// Sends a serialized envelope to one client, resolving the connection
    /// at this moment. Unresolvable or failed sends are logged and skipped.
    pub async fn send_to_client(&self, client_id: i64, message: String) {
        let Some(connection_id) = self.resolve_connection(client_id) else {
            debug!("No open connection for client {}, skipping send", client_id);
            return;
        };
        if let Err(e) = self.sender.send_to_connection(connection_id, message).await {
            warn!("Failed to send to client {}: {}", client_id, e);
        }
    }

    /// Queues a serialized envelope for the upstream process.
    pub fn send_upstream(&self, message: String) {
        self.upstream.send(message);
    }

    /// Broadcasts a serialized envelope to every connected client, minus an
    /// optional excluded client id. Snapshot semantics: clients connecting
    /// or disconnecting during the fan-out are tolerated, not serialized
    /// against.
    ///
    /// # Returns
    ///
    /// The number of clients the message was delivered to.
    pub async fn broadcast(&self, message: &str, exclude_client_id: Option<i64>) -> usize {
        let sessions = self.services.clients.list();
        let mut delivered = 0;
        for session in sessions {
            if Some(session.client_id) == exclude_client_id {
                continue;
            }
            let Some(connection_id) = session.connection_id else {
                continue;
            };
            match self
                .sender
                .send_to_connection(connection_id, message.to_string())
                .await
            {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(
                        "Broadcast delivery to client {} failed: {}",
                        session.client_id, e
                    );
                }
            }
        }
        debug!("📡 Broadcasted message to {} clients", delivered);
        delivered
    }

    /// Builds and unicasts a success envelope with an optional single body
    /// key, echoing the event's timestamps.
    pub async fn send_success(
        &self,
        client_id: i64,
        message: &str,
        event_type: EventType,
        timestamps: &EventTimestamps,
        body: Option<(&str, serde_json::Value)>,
    ) {
        let mut builder = ResponseBuilder::success()
            .message(message)
            .event_type(event_type)
            .client_id(client_id)
            .timestamps(timestamps);
        if let Some((key, value)) = body {
            builder = builder.body(key, value);
        }
        self.send_to_client(client_id, builder.build_string()).await;
    }

    /// Builds and unicasts an error envelope, echoing the event's
    /// timestamps.
    pub async fn send_error(
        &self,
        client_id: i64,
        message: &str,
        event_type: EventType,
        timestamps: &EventTimestamps,
    ) {
        let envelope = ResponseBuilder::error()
            .message(message)
            .event_type(event_type)
            .client_id(client_id)
            .timestamps(timestamps)
            .build_string();
        self.send_to_client(client_id, envelope).await;
    }
}
