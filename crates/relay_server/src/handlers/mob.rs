//! Mob handlers: zone spawns, movement relays, deaths, and the upstream
//! template/attribute pushes.

use super::EventHandlers;
use gateway_events::{Event, EventType, ResponseBuilder};
use serde_json::json;
use tracing::{info, warn};

impl EventHandlers {
    /// Answers a spawn request with the zone's configuration and the live
    /// mobs currently in it. Unicast to the requester.
    pub(crate) async fn handle_spawn_mobs_in_zone(&self, event: Event) {
        let client_id = event.client_id;
        let zone = match event.data.as_spawn_zone() {
            Ok(zone) => zone.clone(),
            Err(mismatch) => {
                warn!(
                    "Dropping spawnMobsInZone from client {}: {}",
                    client_id, mismatch
                );
                return;
            }
        };

        self.ctx().services().zones.upsert(zone.clone());
        let mobs: Vec<_> = self
            .ctx()
            .services()
            .mobs
            .instances_in_zone(zone.zone_id)
            .iter()
            .map(|mob| mob.to_wire())
            .collect();

        if client_id == 0 {
            self.ctx()
                .send_error(
                    client_id,
                    "Spawning mobs failed!",
                    EventType::SpawnMobsInZone,
                    &event.timestamps,
                )
                .await;
            return;
        }

        let response = ResponseBuilder::success()
            .message("Spawning mobs success!")
            .event_type(EventType::SpawnMobsInZone)
            .client_id(client_id)
            .timestamps(&event.timestamps)
            .body("spawnZone", zone.to_wire())
            .body("mobs", json!(mobs))
            .build_string();
        self.ctx().send_to_client(client_id, response).await;
    }

    /// Relays mob movement. Accepts either a bare zone id (resend every
    /// mob in the zone) or the list of mobs that moved (resend only
    /// those). Unicast to the requester.
    pub(crate) async fn handle_zone_move_mobs(&self, event: Event) {
        let client_id = event.client_id;

        let mobs = if let Ok(zone_id) = event.data.as_int() {
            self.ctx().services().mobs.instances_in_zone(*zone_id)
        } else if let Ok(moved) = event.data.as_mob_list() {
            for mob in moved {
                self.ctx().services().mobs.upsert_instance(mob.clone());
            }
            moved.clone()
        } else {
            self.ctx()
                .send_error(
                    client_id,
                    "Invalid data type for zone move mobs!",
                    EventType::ZoneMoveMobs,
                    &event.timestamps,
                )
                .await;
            return;
        };

        if client_id == 0 {
            self.ctx()
                .send_error(
                    client_id,
                    "Moving mobs failed!",
                    EventType::ZoneMoveMobs,
                    &event.timestamps,
                )
                .await;
            return;
        }

        let mobs: Vec<_> = mobs.iter().map(|mob| mob.to_wire()).collect();
        self.ctx()
            .send_success(
                client_id,
                "Moving mobs success!",
                EventType::ZoneMoveMobs,
                &event.timestamps,
                Some(("mobs", json!(mobs))),
            )
            .await;
    }

    /// Drops the dead instance from the cache and broadcasts the death to
    /// every client, no exclusions.
    pub(crate) async fn handle_mob_death(&self, event: Event) {
        let (mob_uid, zone_id) = match event.data.as_mob_death() {
            Ok(pair) => pair,
            Err(mismatch) => {
                warn!("Dropping mobDeath: {}", mismatch);
                return;
            }
        };

        self.ctx().services().mobs.remove_instance(mob_uid);
        info!(
            "💀 Broadcasting death of mob uid {} in zone {}",
            mob_uid, zone_id
        );
        let broadcast = ResponseBuilder::success()
            .message("Mob died")
            .event_type(EventType::MobDeath)
            .timestamps(&event.timestamps)
            .body("mobUID", json!(mob_uid))
            .body("zoneId", json!(zone_id))
            .build_string();
        self.ctx().broadcast(&broadcast, None).await;
    }

    /// Upstream bulk push of mob templates.
    pub(crate) async fn handle_set_all_mobs_list(&self, event: Event) {
        let mobs = match event.data.as_mob_list() {
            Ok(mobs) => mobs.clone(),
            Err(mismatch) => {
                warn!("Dropping setAllMobsList: {}", mismatch);
                return;
            }
        };
        let count = mobs.len();
        self.ctx().services().mobs.load_templates(mobs);
        info!("Loaded {} mob template(s) from upstream", count);
    }

    /// Looks up a mob template and reports it to the upstream process.
    pub(crate) async fn handle_get_mob_data(&self, event: Event) {
        let requested = match event.data.as_mob() {
            Ok(mob) => mob,
            Err(mismatch) => {
                warn!("Dropping getMobData: {}", mismatch);
                return;
            }
        };

        let found = self
            .ctx()
            .services()
            .mobs
            .template(requested.id)
            .unwrap_or_default();
        let mob = json!({
            "id": found.id,
            "uid": found.uid,
            "zoneId": found.zone_id,
            "name": found.name,
        });

        let response = ResponseBuilder::success()
            .message("Getting mob data success!")
            .event_type(EventType::GetMobData)
            .client_id(event.client_id)
            .timestamps(&event.timestamps)
            .body("mob", mob)
            .build_string();
        self.ctx().send_upstream(response);
    }

    /// Upstream push of mob template attributes.
    pub(crate) async fn handle_set_mobs_attributes(&self, event: Event) {
        let attributes = match event.data.as_mob_attributes() {
            Ok(attributes) => attributes.clone(),
            Err(mismatch) => {
                warn!("Dropping setMobsAttributes: {}", mismatch);
                return;
            }
        };
        self.ctx().services().mobs.load_attributes(attributes);
    }
}
