//! Chunk lifecycle handlers. These never answer a client directly; the
//! relay acknowledges chunk init/join/disconnect to the upstream process
//! only.

use super::EventHandlers;
use gateway_events::{Event, ResponseBuilder};
use serde_json::json;
use tracing::warn;

impl EventHandlers {
    /// Chunk initialization announcement. Stores the chunk's addressing
    /// info and acknowledges upstream.
    pub(crate) async fn handle_chunk_server_data(&self, event: Event) {
        let chunk = match event.data.as_chunk() {
            Ok(chunk) => chunk.clone(),
            Err(mismatch) => {
                warn!("Dropping chunkServerData: {}", mismatch);
                return;
            }
        };
        let chunk_id = chunk.id;
        self.ctx().services().chunks.load(chunk);

        if chunk_id == 0 {
            let response = ResponseBuilder::error()
                .message("Init failed for chunk!")
                .header("chunkId", json!(chunk_id))
                .header("eventType", json!("chunkServerData"))
                .timestamps(&event.timestamps)
                .build_string();
            self.ctx().send_upstream(response);
            return;
        }

        let response = ResponseBuilder::success()
            .message("Init success for chunk!")
            .header("chunkId", json!(chunk_id))
            .header("eventType", json!("chunkServerData"))
            .timestamps(&event.timestamps)
            .build_string();
        self.ctx().send_upstream(response);
    }

    /// A client joining through a chunk. Registers the session and
    /// acknowledges the join upstream with the character id in the body.
    pub(crate) async fn handle_join_chunk(&self, event: Event) {
        let info = match event.data.as_client() {
            Ok(info) => info,
            Err(mismatch) => {
                warn!("Dropping joinGameChunk: {}", mismatch);
                return;
            }
        };

        self.ctx()
            .services()
            .clients
            .load(info, event.origin_connection_id);

        if info.client_id == 0 || info.hash.is_empty() {
            let response = ResponseBuilder::error()
                .message("Authentication failed for user!")
                .hash(&info.hash)
                .client_id(info.client_id)
                .header("eventType", json!("joinGame"))
                .timestamps(&event.timestamps)
                .build_string();
            self.ctx().send_upstream(response);
            return;
        }

        let response = ResponseBuilder::success()
            .message("Authentication success for user!")
            .hash(&info.hash)
            .client_id(info.client_id)
            .header("eventType", json!("joinGame"))
            .timestamps(&event.timestamps)
            .body("characterId", json!(info.character_id))
            .build_string();
        self.ctx().send_upstream(response);
    }

    /// A client leaving through a chunk. Relayed upstream as a disconnect
    /// acknowledgement.
    pub(crate) async fn handle_disconnect_chunk(&self, event: Event) {
        let info = match event.data.as_client() {
            Ok(info) => info,
            Err(mismatch) => {
                warn!("Dropping disconnectChunk: {}", mismatch);
                return;
            }
        };

        let response = ResponseBuilder::success()
            .message("Client disconnected!")
            .client_id(info.client_id)
            .header("eventType", json!("disconnectClient"))
            .timestamps(&event.timestamps)
            .build_string();
        self.ctx().send_upstream(response);
    }
}
