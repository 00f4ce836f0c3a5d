//! Character handlers: join (with deferral), movement, listing, and the
//! upstream data pushes that feed the character registry.
//!
//! The join path is the one place the pending-request coordinator is
//! used: a join for a character the registry has not seen yet is queued,
//! not answered, and replayed verbatim when the record arrives.

use super::EventHandlers;
use crate::pending::PendingJoinRequest;
use gateway_events::{Event, EventTimestamps, EventType, ResponseBuilder};
use serde_json::json;
use tracing::{error, info, warn};

impl EventHandlers {
    /// Joins a client to a character, deferring if the character record
    /// has not arrived from upstream yet. No response is sent for a
    /// deferred join until the replay.
    pub(crate) async fn handle_join_character(&self, event: Event) {
        let client_id = event.client_id;
        let requested = match event.data.as_character() {
            Ok(record) => record,
            Err(mismatch) => {
                warn!(
                    "Dropping joinGameCharacter from client {}: {}",
                    client_id, mismatch
                );
                return;
            }
        };
        let character_id = requested.character_id;

        // Sentinel ids never reach the registry or the pending queue.
        if client_id == 0 || character_id == 0 {
            self.ctx()
                .send_error(
                    client_id,
                    "Authentication failed for character!",
                    EventType::JoinGameCharacter,
                    &event.timestamps,
                )
                .await;
            return;
        }

        self.ctx()
            .services()
            .clients
            .set_character_id(client_id, character_id);

        if !self.ctx().services().characters.contains(character_id) {
            self.pending().defer(PendingJoinRequest {
                client_id,
                character_id,
                timestamps: event.timestamps.clone(),
                origin_connection_id: event.origin_connection_id,
            });
            info!(
                "⏳ Character {} not yet available, join for client {} deferred ({} waiting)",
                character_id,
                client_id,
                self.pending().queued_for(character_id)
            );
            // A record landing between the check above and the enqueue finds
            // an empty queue to drain; re-check so the request is replayed
            // here instead of waiting for the next push. take_waiters keeps
            // a concurrent drain exactly-once.
            if self.ctx().services().characters.contains(character_id) {
                self.notify_character_available(character_id).await;
            }
            return;
        }

        self.complete_join(client_id, character_id, &event.timestamps)
            .await;
    }

    /// Finishes a join, immediately or as a replay: authentication check,
    /// broadcast to everyone (sender included), then the two documented
    /// side effects of a successful join.
    pub(crate) async fn complete_join(
        &self,
        client_id: i64,
        character_id: i64,
        timestamps: &EventTimestamps,
    ) {
        let Some(record) = self.ctx().services().characters.get(character_id) else {
            error!(
                "Join for client {} lost character {} between check and read",
                client_id, character_id
            );
            return;
        };

        if client_id == 0 || record.character_id == 0 {
            self.ctx()
                .send_error(
                    client_id,
                    "Authentication failed for character!",
                    EventType::JoinGameCharacter,
                    timestamps,
                )
                .await;
            return;
        }

        let broadcast = ResponseBuilder::success()
            .message("Authentication success for character!")
            .event_type(EventType::JoinGameCharacter)
            .client_id(client_id)
            .timestamps(timestamps)
            .body("character", record.to_wire())
            .build_string();
        self.ctx().broadcast(&broadcast, None).await;
        info!("🧙 Client {} joined character {}", client_id, character_id);

        // Join side effects: derived skill state, then nearby NPC data for
        // the joining client only.
        self.ctx()
            .services()
            .skills
            .init_for_character(character_id, &record.skills);
        self.push_npc_spawn_data(client_id, &record.position, timestamps)
            .await;
    }

    /// Replays every join waiting on a character id, exactly once each.
    ///
    /// The queue is removed atomically before the replays start, so a join
    /// arriving mid-drain lands in a fresh queue. The registry is
    /// re-checked first; if the record is somehow absent the queue is left
    /// untouched for the next arrival.
    pub(crate) async fn notify_character_available(&self, character_id: i64) {
        if !self.pending().is_waiting(character_id) {
            return;
        }
        if !self.ctx().services().characters.contains(character_id) {
            error!(
                "Replay for character {} aborted, record not in registry; queue left intact",
                character_id
            );
            return;
        }

        let waiters = self.pending().take_waiters(character_id);
        if waiters.is_empty() {
            return;
        }
        info!(
            "▶️ Character {} available, replaying {} deferred join(s)",
            character_id,
            waiters.len()
        );
        for waiter in waiters {
            self.complete_join(waiter.client_id, waiter.character_id, &waiter.timestamps)
                .await;
        }
    }

    /// Broadcasts a character movement to everyone, sender included.
    pub(crate) async fn handle_move_character(&self, event: Event) {
        let client_id = event.client_id;
        let movement = match event.data.as_movement() {
            Ok(movement) => movement,
            Err(mismatch) => {
                warn!("Dropping moveCharacter from client {}: {}", client_id, mismatch);
                return;
            }
        };

        self.ctx()
            .services()
            .characters
            .set_position(movement.character_id, movement.position);

        if client_id == 0 {
            self.ctx()
                .send_error(
                    client_id,
                    "Movement failed for character!",
                    EventType::MoveCharacter,
                    &event.timestamps,
                )
                .await;
            return;
        }

        // Minimal payload: just who moved and where to.
        let character = json!({
            "id": movement.character_id,
            "position": movement.position.to_wire(),
        });
        let broadcast = ResponseBuilder::success()
            .message("Movement success for character!")
            .event_type(EventType::MoveCharacter)
            .client_id(client_id)
            .timestamps(&event.timestamps)
            .body("character", character)
            .build_string();
        self.ctx().broadcast(&broadcast, None).await;
    }

    /// Lists every loaded character with its owning client. Unicast to
    /// the requester.
    pub(crate) async fn handle_get_connected_characters(&self, event: Event) {
        let client_id = event.client_id;
        if client_id == 0 {
            self.ctx()
                .send_error(
                    client_id,
                    "Getting connected characters failed!",
                    EventType::GetConnectedCharacters,
                    &event.timestamps,
                )
                .await;
            return;
        }

        let characters: Vec<_> = self
            .ctx()
            .services()
            .characters
            .list()
            .iter()
            .map(|record| {
                json!({
                    "clientId": record.client_id,
                    "character": record.to_wire(),
                })
            })
            .collect();

        self.ctx()
            .send_success(
                client_id,
                "Getting connected characters success!",
                EventType::GetConnectedCharacters,
                &event.timestamps,
                Some(("characters", json!(characters))),
            )
            .await;
    }

    /// Upstream push of a single character record. Stores it and replays
    /// any joins waiting on it.
    pub(crate) async fn handle_set_character_data(&self, event: Event) {
        let record = match event.data.as_character() {
            Ok(record) => record.clone(),
            Err(mismatch) => {
                warn!("Dropping setCharacterData: {}", mismatch);
                return;
            }
        };
        let character_id = record.character_id;
        self.ctx().services().characters.add(record);
        self.notify_character_available(character_id).await;
    }

    /// Upstream bulk push of character records. Each id with waiters gets
    /// its deferred joins replayed.
    pub(crate) async fn handle_set_characters_list(&self, event: Event) {
        let records = match event.data.as_character_list() {
            Ok(records) => records.clone(),
            Err(mismatch) => {
                warn!("Dropping setCharactersList: {}", mismatch);
                return;
            }
        };
        let ids: Vec<i64> = records.iter().map(|r| r.character_id).collect();
        self.ctx().services().characters.load_list(records);
        info!("Loaded {} character record(s) from upstream", ids.len());
        for character_id in ids {
            self.notify_character_available(character_id).await;
        }
    }

    /// Upstream push of character attributes.
    pub(crate) async fn handle_set_character_attributes(&self, event: Event) {
        let attributes = match event.data.as_character_attributes() {
            Ok(attributes) => attributes.clone(),
            Err(mismatch) => {
                warn!("Dropping setCharacterAttributes: {}", mismatch);
                return;
            }
        };
        self.ctx().services().characters.load_attributes(attributes);
    }
}
