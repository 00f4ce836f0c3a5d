//! Client session handlers: ping, join, listing, disconnect.

use super::EventHandlers;
use gateway_events::{Event, EventType, ResponseBuilder};
use serde_json::json;
use tracing::{debug, info, warn};

impl EventHandlers {
    /// Liveness check. Unicast to the sender only; a closed socket means
    /// the ping is silently skipped.
    pub(crate) async fn handle_ping_client(&self, event: Event) {
        let client_id = event.client_id;
        if let Err(mismatch) = event.data.as_client() {
            warn!("Dropping pingClient from client {}: {}", client_id, mismatch);
            return;
        }

        let Some(connection_id) = self.ctx().resolve_connection(client_id) else {
            debug!("Skipping ping, no open connection for client {}", client_id);
            return;
        };
        if !self.ctx().sender().is_connection_open(connection_id).await {
            debug!("Skipping ping, connection closed for client {}", client_id);
            return;
        }

        self.ctx()
            .send_success(
                client_id,
                "Pong!",
                EventType::PingClient,
                &event.timestamps,
                None,
            )
            .await;
    }

    /// Authenticates a client session and announces it to everyone,
    /// including the joining client.
    pub(crate) async fn handle_join_client(&self, event: Event) {
        let client_id = event.client_id;
        let info = match event.data.as_client() {
            Ok(info) => info,
            Err(mismatch) => {
                warn!("Dropping joinGameClient from client {}: {}", client_id, mismatch);
                return;
            }
        };

        if info.client_id == 0 || info.hash.is_empty() {
            self.ctx()
                .send_error(
                    client_id,
                    "Authentication failed for user!",
                    EventType::JoinGameClient,
                    &event.timestamps,
                )
                .await;
            return;
        }

        self.ctx()
            .services()
            .clients
            .load(info, event.origin_connection_id);
        info!("👋 Client {} joined", info.client_id);

        let broadcast = ResponseBuilder::success()
            .message("Authentication success for user!")
            .event_type(EventType::JoinGameClient)
            .client_id(info.client_id)
            .hash(&info.hash)
            .timestamps(&event.timestamps)
            .build_string();
        self.ctx().broadcast(&broadcast, None).await;
    }

    /// Lists every known session with its live connection status.
    /// Unicast to the requester.
    pub(crate) async fn handle_get_connected_clients(&self, event: Event) {
        let client_id = event.client_id;
        if client_id == 0 {
            self.ctx()
                .send_error(
                    client_id,
                    "Getting connected clients failed!",
                    EventType::GetConnectedClients,
                    &event.timestamps,
                )
                .await;
            return;
        }

        let mut clients_list = Vec::new();
        for session in self.ctx().services().clients.list() {
            let connected = match session.connection_id {
                Some(connection_id) => self.ctx().sender().is_connection_open(connection_id).await,
                None => false,
            };
            clients_list.push(json!({
                "clientId": session.client_id,
                "characterId": session.character_id,
                "status": if connected { "connected" } else { "disconnected" },
            }));
        }

        self.ctx()
            .send_success(
                client_id,
                "Getting connected clients success!",
                EventType::GetConnectedClients,
                &event.timestamps,
                Some(("clientsList", json!(clients_list))),
            )
            .await;
    }

    /// Removes the client's session and world state, then tells everyone
    /// else. The disconnecting client is excluded from the broadcast.
    pub(crate) async fn handle_disconnect_client(&self, event: Event) {
        let info = match event.data.as_client() {
            Ok(info) => info.clone(),
            Err(mismatch) => {
                warn!("Dropping disconnectClient: {}", mismatch);
                return;
            }
        };

        if info.client_id == 0 {
            debug!("Graceful disconnect without client identification, nothing to clean up");
            return;
        }

        let character_id = self
            .ctx()
            .services()
            .clients
            .get(info.client_id)
            .map(|session| session.character_id)
            .unwrap_or(info.character_id);

        self.ctx().services().clients.remove(info.client_id);
        if character_id != 0 {
            self.ctx().services().characters.remove(character_id);
            self.ctx().services().skills.remove(character_id);
        }
        info!("👋 Client {} disconnected", info.client_id);

        let broadcast = ResponseBuilder::success()
            .message("Client disconnected!")
            .event_type(EventType::DisconnectClient)
            .client_id(info.client_id)
            .timestamps(&event.timestamps)
            .build_string();
        self.ctx().broadcast(&broadcast, Some(info.client_id)).await;
    }
}
