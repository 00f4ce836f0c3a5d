//! Spawn zone handlers.

use super::EventHandlers;
use gateway_events::{Event, EventType};
use tracing::{debug, info, warn};

impl EventHandlers {
    /// Upstream bulk push of spawn zone configurations.
    pub(crate) async fn handle_set_all_spawn_zones(&self, event: Event) {
        let zones = match event.data.as_spawn_zone_list() {
            Ok(zones) => zones.clone(),
            Err(mismatch) => {
                warn!("Dropping setAllSpawnZones: {}", mismatch);
                return;
            }
        };
        for zone in &zones {
            debug!(
                "Spawn zone {} '{}' mob {} x{} respawn {}s enabled {}",
                zone.zone_id,
                zone.zone_name,
                zone.spawn_mob_id,
                zone.spawn_count,
                zone.respawn_time_secs,
                zone.spawn_enabled
            );
        }
        let count = zones.len();
        self.ctx().services().zones.load_list(zones);
        info!("Loaded {} spawn zone(s) from upstream", count);
    }

    /// Answers a zone lookup with its stored configuration. Unicast to
    /// the requester.
    pub(crate) async fn handle_get_spawn_zone_data(&self, event: Event) {
        let client_id = event.client_id;
        let zone_id = match event.data.as_int() {
            Ok(zone_id) => *zone_id,
            Err(mismatch) => {
                warn!("Dropping getSpawnZoneData from client {}: {}", client_id, mismatch);
                return;
            }
        };

        if client_id == 0 {
            self.ctx()
                .send_error(
                    client_id,
                    "Getting spawn zone data failed!",
                    EventType::GetSpawnZoneData,
                    &event.timestamps,
                )
                .await;
            return;
        }

        let Some(zone) = self.ctx().services().zones.get(zone_id) else {
            self.ctx()
                .send_error(
                    client_id,
                    "Getting spawn zone data failed!",
                    EventType::GetSpawnZoneData,
                    &event.timestamps,
                )
                .await;
            return;
        };

        self.ctx()
            .send_success(
                client_id,
                "Getting spawn zone data success!",
                EventType::GetSpawnZoneData,
                &event.timestamps,
                Some(("spawnZone", zone.to_wire())),
            )
            .await;
    }
}
