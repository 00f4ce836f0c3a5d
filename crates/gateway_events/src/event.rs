//! The typed event envelope and its tagged payload.
//!
//! One [`Event`] is one inbound unit of work: it is constructed by the
//! transport layer (total construction, no validation) and dispatched to
//! exactly one domain handler method. Handlers inspect the payload through
//! the fallible `as_*` accessors; asking for the wrong variant yields a
//! [`TypeMismatch`] rather than a panic.

use crate::error::TypeMismatch;
use crate::timestamps::EventTimestamps;
use crate::types::{
    CharacterAttribute, CharacterRecord, ChunkInfoRecord, ClientInfo, MobAttribute, MobRecord,
    MovementData, NpcAttribute, NpcRecord, SpawnZoneRecord,
};
use serde_json::Value;

/// Closed set of event types understood by the gateway.
///
/// The wire strings are fixed; anything else arriving on the wire is
/// rejected at decode time. Types whose data arrives only from the upstream
/// game-logic process (never from a client) answer `true` from
/// [`EventType::is_upstream_only`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    PingClient,
    JoinGameClient,
    GetConnectedClients,
    DisconnectClient,
    JoinGameCharacter,
    MoveCharacter,
    GetConnectedCharacters,
    SetCharacterData,
    SetCharactersList,
    SetCharacterAttributes,
    SpawnMobsInZone,
    ZoneMoveMobs,
    MobDeath,
    SetAllMobsList,
    GetMobData,
    SetMobsAttributes,
    ChunkServerData,
    JoinGameChunk,
    DisconnectChunk,
    SetAllSpawnZones,
    GetSpawnZoneData,
    SetAllNpcsList,
    SetAllNpcsAttributes,
}

impl EventType {
    /// The exact wire string for this event type.
    pub fn as_wire(&self) -> &'static str {
        match self {
            EventType::PingClient => "pingClient",
            EventType::JoinGameClient => "joinGameClient",
            EventType::GetConnectedClients => "getConnectedClients",
            EventType::DisconnectClient => "disconnectClient",
            EventType::JoinGameCharacter => "joinGameCharacter",
            EventType::MoveCharacter => "moveCharacter",
            EventType::GetConnectedCharacters => "getConnectedCharacters",
            EventType::SetCharacterData => "setCharacterData",
            EventType::SetCharactersList => "setCharactersList",
            EventType::SetCharacterAttributes => "setCharacterAttributes",
            EventType::SpawnMobsInZone => "spawnMobsInZone",
            EventType::ZoneMoveMobs => "zoneMoveMobs",
            EventType::MobDeath => "mobDeath",
            EventType::SetAllMobsList => "setAllMobsList",
            EventType::GetMobData => "getMobData",
            EventType::SetMobsAttributes => "setMobsAttributes",
            EventType::ChunkServerData => "chunkServerData",
            EventType::JoinGameChunk => "joinGameChunk",
            EventType::DisconnectChunk => "disconnectChunk",
            EventType::SetAllSpawnZones => "setAllSpawnZones",
            EventType::GetSpawnZoneData => "getSpawnZoneData",
            EventType::SetAllNpcsList => "setAllNPCsList",
            EventType::SetAllNpcsAttributes => "setAllNPCsAttributes",
        }
    }

    /// Parses a wire string into an event type.
    ///
    /// # Returns
    ///
    /// `Some(EventType)` for a known string, `None` otherwise.
    pub fn from_wire(s: &str) -> Option<Self> {
        Some(match s {
            "pingClient" => EventType::PingClient,
            "joinGameClient" => EventType::JoinGameClient,
            "getConnectedClients" => EventType::GetConnectedClients,
            "disconnectClient" => EventType::DisconnectClient,
            "joinGameCharacter" => EventType::JoinGameCharacter,
            "moveCharacter" => EventType::MoveCharacter,
            "getConnectedCharacters" => EventType::GetConnectedCharacters,
            "setCharacterData" => EventType::SetCharacterData,
            "setCharactersList" => EventType::SetCharactersList,
            "setCharacterAttributes" => EventType::SetCharacterAttributes,
            "spawnMobsInZone" => EventType::SpawnMobsInZone,
            "zoneMoveMobs" => EventType::ZoneMoveMobs,
            "mobDeath" => EventType::MobDeath,
            "setAllMobsList" => EventType::SetAllMobsList,
            "getMobData" => EventType::GetMobData,
            "setMobsAttributes" => EventType::SetMobsAttributes,
            "chunkServerData" => EventType::ChunkServerData,
            "joinGameChunk" => EventType::JoinGameChunk,
            "disconnectChunk" => EventType::DisconnectChunk,
            "setAllSpawnZones" => EventType::SetAllSpawnZones,
            "getSpawnZoneData" => EventType::GetSpawnZoneData,
            "setAllNPCsList" => EventType::SetAllNpcsList,
            "setAllNPCsAttributes" => EventType::SetAllNpcsAttributes,
            _ => return None,
        })
    }

    /// Whether this type's payload arrives only from the upstream process.
    pub fn is_upstream_only(&self) -> bool {
        matches!(
            self,
            EventType::SetCharacterData
                | EventType::SetCharactersList
                | EventType::SetCharacterAttributes
                | EventType::SetAllMobsList
                | EventType::SetMobsAttributes
                | EventType::SetAllSpawnZones
                | EventType::SetAllNpcsList
                | EventType::SetAllNpcsAttributes
        )
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Closed tagged union over event payloads.
///
/// Exactly one variant is active per [`Event`]. Handlers read the payload
/// through the fallible accessors below; each returns `Err(TypeMismatch)`
/// naming the expected and actual variants when the wrong one is asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    /// No payload beyond the event header
    None,
    /// Scalar integer payload (e.g. a zone id)
    Int(i64),
    /// Scalar float payload
    Float(f64),
    /// Scalar string payload
    Text(String),
    /// Opaque structured payload passed through untouched
    Json(Value),
    Client(ClientInfo),
    Character(CharacterRecord),
    Movement(MovementData),
    Chunk(ChunkInfoRecord),
    Mob(MobRecord),
    SpawnZone(SpawnZoneRecord),
    /// A mob instance died: which instance, in which zone
    MobDeath { mob_uid: i64, zone_id: i64 },
    CharacterList(Vec<CharacterRecord>),
    CharacterAttributes(Vec<CharacterAttribute>),
    MobList(Vec<MobRecord>),
    MobAttributes(Vec<MobAttribute>),
    SpawnZoneList(Vec<SpawnZoneRecord>),
    NpcList(Vec<NpcRecord>),
    NpcAttributes(Vec<NpcAttribute>),
}

macro_rules! accessor {
    ($fn_name:ident, $variant:ident, $ty:ty, $name:literal) => {
        pub fn $fn_name(&self) -> Result<&$ty, TypeMismatch> {
            match self {
                EventData::$variant(inner) => Ok(inner),
                other => Err(TypeMismatch {
                    expected: $name,
                    actual: other.variant_name(),
                }),
            }
        }
    };
}

impl EventData {
    /// The name of the active variant, for mismatch diagnostics.
    pub fn variant_name(&self) -> &'static str {
        match self {
            EventData::None => "none",
            EventData::Int(_) => "int",
            EventData::Float(_) => "float",
            EventData::Text(_) => "text",
            EventData::Json(_) => "json",
            EventData::Client(_) => "client",
            EventData::Character(_) => "character",
            EventData::Movement(_) => "movement",
            EventData::Chunk(_) => "chunk",
            EventData::Mob(_) => "mob",
            EventData::SpawnZone(_) => "spawnZone",
            EventData::MobDeath { .. } => "mobDeath",
            EventData::CharacterList(_) => "characterList",
            EventData::CharacterAttributes(_) => "characterAttributes",
            EventData::MobList(_) => "mobList",
            EventData::MobAttributes(_) => "mobAttributes",
            EventData::SpawnZoneList(_) => "spawnZoneList",
            EventData::NpcList(_) => "npcList",
            EventData::NpcAttributes(_) => "npcAttributes",
        }
    }

    accessor!(as_int, Int, i64, "int");
    accessor!(as_json, Json, Value, "json");
    accessor!(as_client, Client, ClientInfo, "client");
    accessor!(as_character, Character, CharacterRecord, "character");
    accessor!(as_movement, Movement, MovementData, "movement");
    accessor!(as_chunk, Chunk, ChunkInfoRecord, "chunk");
    accessor!(as_mob, Mob, MobRecord, "mob");
    accessor!(as_spawn_zone, SpawnZone, SpawnZoneRecord, "spawnZone");
    accessor!(as_character_list, CharacterList, Vec<CharacterRecord>, "characterList");
    accessor!(
        as_character_attributes,
        CharacterAttributes,
        Vec<CharacterAttribute>,
        "characterAttributes"
    );
    accessor!(as_mob_list, MobList, Vec<MobRecord>, "mobList");
    accessor!(as_mob_attributes, MobAttributes, Vec<MobAttribute>, "mobAttributes");
    accessor!(as_spawn_zone_list, SpawnZoneList, Vec<SpawnZoneRecord>, "spawnZoneList");
    accessor!(as_npc_list, NpcList, Vec<NpcRecord>, "npcList");
    accessor!(as_npc_attributes, NpcAttributes, Vec<NpcAttribute>, "npcAttributes");

    /// Fallible accessor for the mob-death pair.
    pub fn as_mob_death(&self) -> Result<(i64, i64), TypeMismatch> {
        match self {
            EventData::MobDeath { mob_uid, zone_id } => Ok((*mob_uid, *zone_id)),
            other => Err(TypeMismatch {
                expected: "mobDeath",
                actual: other.variant_name(),
            }),
        }
    }
}

/// One typed inbound unit of work.
///
/// Immutable once constructed. Carries only the numeric origin connection
/// id, never a live handle; handlers re-resolve the connection by
/// `client_id` at the moment of send.
#[derive(Debug, Clone)]
pub struct Event {
    /// The event type, drawn from the closed wire set
    pub event_type: EventType,
    /// The originating client id (`0` = unset/unauthenticated)
    pub client_id: i64,
    /// The tagged payload
    pub data: EventData,
    /// Correlation timestamps, stamped at ingress and echoed on egress
    pub timestamps: EventTimestamps,
    /// Numeric id of the connection the event arrived on, if any
    pub origin_connection_id: Option<usize>,
}

impl Event {
    /// Creates a new event. Construction is total; interpretation is
    /// validated when a handler inspects the payload.
    pub fn new(event_type: EventType, client_id: i64, data: EventData) -> Self {
        Self {
            event_type,
            client_id,
            data,
            timestamps: EventTimestamps::default(),
            origin_connection_id: None,
        }
    }

    pub fn with_timestamps(mut self, timestamps: EventTimestamps) -> Self {
        self.timestamps = timestamps;
        self
    }

    pub fn with_origin(mut self, connection_id: usize) -> Self {
        self.origin_connection_id = Some(connection_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClientInfo;

    #[test]
    fn wire_strings_round_trip() {
        let all = [
            EventType::PingClient,
            EventType::JoinGameClient,
            EventType::GetConnectedClients,
            EventType::DisconnectClient,
            EventType::JoinGameCharacter,
            EventType::MoveCharacter,
            EventType::GetConnectedCharacters,
            EventType::SetCharacterData,
            EventType::SetCharactersList,
            EventType::SetCharacterAttributes,
            EventType::SpawnMobsInZone,
            EventType::ZoneMoveMobs,
            EventType::MobDeath,
            EventType::SetAllMobsList,
            EventType::GetMobData,
            EventType::SetMobsAttributes,
            EventType::ChunkServerData,
            EventType::JoinGameChunk,
            EventType::DisconnectChunk,
            EventType::SetAllSpawnZones,
            EventType::GetSpawnZoneData,
            EventType::SetAllNpcsList,
            EventType::SetAllNpcsAttributes,
        ];
        for ty in all {
            assert_eq!(EventType::from_wire(ty.as_wire()), Some(ty));
        }
        assert_eq!(EventType::from_wire("noSuchEvent"), None);
    }

    #[test]
    fn upstream_only_marking() {
        assert!(EventType::SetCharactersList.is_upstream_only());
        assert!(EventType::SetAllNpcsAttributes.is_upstream_only());
        assert!(!EventType::JoinGameCharacter.is_upstream_only());
        assert!(!EventType::PingClient.is_upstream_only());
    }

    #[test]
    fn wrong_variant_yields_type_mismatch() {
        let data = EventData::Client(ClientInfo {
            client_id: 5,
            hash: "abc".to_string(),
            character_id: 0,
        });
        let err = data.as_character().unwrap_err();
        assert_eq!(err.expected, "character");
        assert_eq!(err.actual, "client");
    }

    #[test]
    fn right_variant_is_accessible() {
        let data = EventData::MobDeath { mob_uid: 1001, zone_id: 3 };
        assert_eq!(data.as_mob_death().unwrap(), (1001, 3));
        assert!(data.as_mob_list().is_err());
    }
}
