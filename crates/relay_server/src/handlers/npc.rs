//! NPC handlers: upstream data pushes and the spawn push sent to clients
//! joining a character.

use super::{EventHandlers, NPC_SPAWN_RADIUS};
use gateway_events::{Event, EventTimestamps, Position, ResponseBuilder};
use serde_json::json;
use tracing::{info, warn};

impl EventHandlers {
    /// Upstream bulk push of NPC records.
    pub(crate) async fn handle_set_all_npcs_list(&self, event: Event) {
        let npcs = match event.data.as_npc_list() {
            Ok(npcs) => npcs.clone(),
            Err(mismatch) => {
                warn!("Dropping setAllNPCsList: {}", mismatch);
                return;
            }
        };
        let count = npcs.len();
        self.ctx().services().npcs.load_list(npcs);
        info!("Loaded {} NPC record(s) from upstream", count);
    }

    /// Upstream push of NPC attributes.
    pub(crate) async fn handle_set_all_npcs_attributes(&self, event: Event) {
        let attributes = match event.data.as_npc_attributes() {
            Ok(attributes) => attributes.clone(),
            Err(mismatch) => {
                warn!("Dropping setAllNPCsAttributes: {}", mismatch);
                return;
            }
        };
        self.ctx().services().npcs.load_attributes(attributes);
    }

    /// Pushes the NPCs near a position to one client, as part of a
    /// successful character join.
    pub(crate) async fn push_npc_spawn_data(
        &self,
        client_id: i64,
        position: &Position,
        timestamps: &EventTimestamps,
    ) {
        let nearby = self
            .ctx()
            .services()
            .npcs
            .npcs_within(position, NPC_SPAWN_RADIUS);
        let npcs: Vec<_> = nearby.iter().map(|npc| npc.to_spawn_wire()).collect();

        let response = ResponseBuilder::success()
            .message("NPCs spawn data for area")
            .header("eventType", json!("spawnNPCs"))
            .client_id(client_id)
            .timestamps(timestamps)
            .body("npcsSpawn", json!(npcs))
            .body("spawnRadius", json!(NPC_SPAWN_RADIUS))
            .body("npcCount", json!(nearby.len()))
            .build_string();
        self.ctx().send_to_client(client_id, response).await;
    }
}
