//! Domain event handlers and the dispatcher.
//!
//! Every decoded [`Event`] is routed by type to exactly one handler
//! method. Handlers share one shape: check the payload variant (mismatch
//! is logged and the event dropped), validate identity fields, apply the
//! state change, then unicast, broadcast, or forward upstream per the
//! event's delivery policy. No handler failure is fatal; everything
//! degrades to a log line.

mod character;
mod chunk;
mod client;
mod mob;
mod npc;
mod zone;

use crate::pending::PendingJoinCoordinator;
use crate::session::SessionContext;
use gateway_events::{Event, EventType};

/// Radius of the NPC spawn push sent to a client joining a character.
pub const NPC_SPAWN_RADIUS: f64 = 1000.0;

/// All domain handlers behind one dispatch entry point.
#[derive(Debug)]
pub struct EventHandlers {
    ctx: SessionContext,
    pending: PendingJoinCoordinator,
}

impl EventHandlers {
    pub fn new(ctx: SessionContext) -> Self {
        Self {
            ctx,
            pending: PendingJoinCoordinator::new(),
        }
    }

    pub fn ctx(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn pending(&self) -> &PendingJoinCoordinator {
        &self.pending
    }

    /// Routes one event to its handler.
    pub async fn dispatch(&self, event: Event) {
        match event.event_type {
            EventType::PingClient => self.handle_ping_client(event).await,
            EventType::JoinGameClient => self.handle_join_client(event).await,
            EventType::GetConnectedClients => self.handle_get_connected_clients(event).await,
            EventType::DisconnectClient => self.handle_disconnect_client(event).await,

            EventType::JoinGameCharacter => self.handle_join_character(event).await,
            EventType::MoveCharacter => self.handle_move_character(event).await,
            EventType::GetConnectedCharacters => self.handle_get_connected_characters(event).await,
            EventType::SetCharacterData => self.handle_set_character_data(event).await,
            EventType::SetCharactersList => self.handle_set_characters_list(event).await,
            EventType::SetCharacterAttributes => self.handle_set_character_attributes(event).await,

            EventType::SpawnMobsInZone => self.handle_spawn_mobs_in_zone(event).await,
            EventType::ZoneMoveMobs => self.handle_zone_move_mobs(event).await,
            EventType::MobDeath => self.handle_mob_death(event).await,
            EventType::SetAllMobsList => self.handle_set_all_mobs_list(event).await,
            EventType::GetMobData => self.handle_get_mob_data(event).await,
            EventType::SetMobsAttributes => self.handle_set_mobs_attributes(event).await,

            EventType::ChunkServerData => self.handle_chunk_server_data(event).await,
            EventType::JoinGameChunk => self.handle_join_chunk(event).await,
            EventType::DisconnectChunk => self.handle_disconnect_chunk(event).await,

            EventType::SetAllSpawnZones => self.handle_set_all_spawn_zones(event).await,
            EventType::GetSpawnZoneData => self.handle_get_spawn_zone_data(event).await,

            EventType::SetAllNpcsList => self.handle_set_all_npcs_list(event).await,
            EventType::SetAllNpcsAttributes => self.handle_set_all_npcs_attributes(event).await,
        }
    }
}
