//! Wire-to-event decoding.
//!
//! The inbound frame layout is shared by clients and the upstream process:
//!
//! ```json
//! {
//!   "header": {
//!     "eventType": "joinGameCharacter",
//!     "clientId": 5,
//!     "hash": "…",
//!     "timestamps": { "clientSendMs": 1, "requestId": "…" }
//!   },
//!   "body": { ... }
//! }
//! ```
//!
//! `eventType` and `clientId` are also accepted at the top level, the
//! relaxed form some senders use. Which [`EventData`] variant the body is
//! parsed into is fixed per event type; the payload-shape table lives
//! here and nowhere else.

use crate::connection::ConnectionId;
use gateway_events::{
    CharacterAttribute, CharacterRecord, ChunkInfoRecord, ClientInfo, Event, EventData, EventType,
    EventTimestamps, MobAttribute, MobRecord, MovementData, NpcAttribute, NpcRecord,
    SpawnZoneRecord,
};
use serde_json::Value;

/// Why a frame could not be turned into an event.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("missing or non-string eventType")]
    MissingEventType,

    #[error("unknown event type: {0}")]
    UnknownEventType(String),
}

fn field<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    root.get("header")
        .and_then(|h| h.get(key))
        .or_else(|| root.get(key))
}

fn parse_body<T: serde::de::DeserializeOwned + Default>(body: &Value) -> T {
    serde_json::from_value(body.clone()).unwrap_or_default()
}

fn parse_body_list<T: serde::de::DeserializeOwned>(body: &Value, key: &str) -> Vec<T> {
    body.get(key)
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

/// Decodes one raw frame into an [`Event`], stamping ingress timestamps
/// and recording the originating connection if the frame arrived over a
/// client socket.
pub fn decode_message(
    raw: &str,
    origin_connection_id: Option<ConnectionId>,
) -> Result<Event, DecodeError> {
    let root: Value = serde_json::from_str(raw)?;

    let type_str = field(&root, "eventType")
        .and_then(|v| v.as_str())
        .ok_or(DecodeError::MissingEventType)?;
    let event_type = EventType::from_wire(type_str)
        .ok_or_else(|| DecodeError::UnknownEventType(type_str.to_string()))?;

    let client_id = field(&root, "clientId").and_then(|v| v.as_i64()).unwrap_or(0);
    let hash = field(&root, "hash")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let empty_body = Value::Object(serde_json::Map::new());
    let body = root.get("body").unwrap_or(&empty_body);

    let timestamps = EventTimestamps::at_ingress(
        field(&root, "timestamps")
            .and_then(|t| t.get("clientSendMs"))
            .and_then(|v| v.as_i64()),
        field(&root, "timestamps")
            .and_then(|t| t.get("requestId"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
    );

    let client_info = || ClientInfo {
        client_id,
        hash: hash.clone(),
        character_id: body.get("characterId").and_then(|v| v.as_i64()).unwrap_or(0),
    };

    let data = match event_type {
        EventType::PingClient
        | EventType::JoinGameClient
        | EventType::DisconnectClient
        | EventType::JoinGameChunk
        | EventType::DisconnectChunk => EventData::Client(client_info()),

        EventType::GetConnectedClients | EventType::GetConnectedCharacters => EventData::None,

        EventType::JoinGameCharacter | EventType::SetCharacterData => {
            EventData::Character(parse_body::<CharacterRecord>(body))
        }
        EventType::SetCharactersList => EventData::CharacterList(parse_body_list::<CharacterRecord>(
            body,
            "charactersList",
        )),
        EventType::SetCharacterAttributes => EventData::CharacterAttributes(
            parse_body_list::<CharacterAttribute>(body, "attributesData"),
        ),

        EventType::MoveCharacter => {
            let mut movement = parse_body::<MovementData>(body);
            movement.client_id = client_id;
            EventData::Movement(movement)
        }

        EventType::SpawnMobsInZone => EventData::SpawnZone(parse_body::<SpawnZoneRecord>(body)),
        EventType::ZoneMoveMobs => {
            // Two accepted shapes for the same event: a bare zone id, or
            // the list of mobs that actually moved.
            if body.get("mobsList").is_some() {
                EventData::MobList(parse_body_list::<MobRecord>(body, "mobsList"))
            } else {
                EventData::Int(body.get("zoneId").and_then(|v| v.as_i64()).unwrap_or(0))
            }
        }
        EventType::MobDeath => EventData::MobDeath {
            mob_uid: body.get("mobUID").and_then(|v| v.as_i64()).unwrap_or(0),
            zone_id: body.get("zoneId").and_then(|v| v.as_i64()).unwrap_or(0),
        },
        EventType::SetAllMobsList => {
            EventData::MobList(parse_body_list::<MobRecord>(body, "mobsList"))
        }
        EventType::GetMobData => EventData::Mob(parse_body::<MobRecord>(body)),
        EventType::SetMobsAttributes => {
            EventData::MobAttributes(parse_body_list::<MobAttribute>(body, "attributesData"))
        }

        EventType::ChunkServerData => EventData::Chunk(parse_body::<ChunkInfoRecord>(body)),

        EventType::SetAllSpawnZones => EventData::SpawnZoneList(
            parse_body_list::<SpawnZoneRecord>(body, "spawnZonesData"),
        ),
        EventType::GetSpawnZoneData => {
            EventData::Int(body.get("zoneId").and_then(|v| v.as_i64()).unwrap_or(0))
        }

        EventType::SetAllNpcsList => {
            EventData::NpcList(parse_body_list::<NpcRecord>(body, "npcsList"))
        }
        EventType::SetAllNpcsAttributes => {
            EventData::NpcAttributes(parse_body_list::<NpcAttribute>(body, "attributesData"))
        }
    };

    let mut event = Event::new(event_type, client_id, data).with_timestamps(timestamps);
    if let Some(connection_id) = origin_connection_id {
        event = event.with_origin(connection_id);
    }
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_character_parses_id_and_stamps_ingress() {
        let raw = r#"{
            "header": {
                "eventType": "joinGameCharacter",
                "clientId": 5,
                "hash": "tok",
                "timestamps": { "clientSendMs": 123, "requestId": "r-1" }
            },
            "body": { "characterId": 42 }
        }"#;

        let event = decode_message(raw, Some(7)).unwrap();
        assert_eq!(event.event_type, EventType::JoinGameCharacter);
        assert_eq!(event.client_id, 5);
        assert_eq!(event.origin_connection_id, Some(7));
        assert_eq!(event.timestamps.client_send_ms, Some(123));
        assert!(event.timestamps.server_recv_ms.is_some());
        assert_eq!(event.data.as_character().unwrap().character_id, 42);
    }

    #[test]
    fn move_character_reads_flat_position() {
        let raw = r#"{
            "eventType": "moveCharacter",
            "clientId": 5,
            "body": { "characterId": 42, "posX": 1.5, "posY": 2.5, "posZ": 0.0, "rotZ": 90.0 }
        }"#;

        let event = decode_message(raw, None).unwrap();
        let movement = event.data.as_movement().unwrap();
        assert_eq!(movement.client_id, 5);
        assert_eq!(movement.character_id, 42);
        assert_eq!(movement.position.x, 1.5);
        assert_eq!(movement.position.rotation_z, 90.0);
    }

    #[test]
    fn zone_move_mobs_accepts_both_shapes() {
        let by_zone = decode_message(
            r#"{ "eventType": "zoneMoveMobs", "clientId": 5, "body": { "zoneId": 3 } }"#,
            None,
        )
        .unwrap();
        assert_eq!(*by_zone.data.as_int().unwrap(), 3);

        let by_list = decode_message(
            r#"{ "eventType": "zoneMoveMobs", "clientId": 5,
                 "body": { "mobsList": [ { "id": 1, "UID": 1001, "zoneId": 3 } ] } }"#,
            None,
        )
        .unwrap();
        let mobs = by_list.data.as_mob_list().unwrap();
        assert_eq!(mobs[0].uid, 1001);
    }

    #[test]
    fn upstream_character_push_parses_wire_keys() {
        let raw = r#"{
            "header": { "eventType": "setCharacterData", "clientId": 5 },
            "body": {
                "id": 42, "clientId": 5, "name": "Aria", "class": "Mage",
                "race": "Elf", "level": 12, "currentExp": 3400,
                "expForNextLevel": 5000, "currentHealth": 80, "maxHealth": 100,
                "currentMana": 150, "maxMana": 200,
                "posX": 1.0, "posY": 2.0, "posZ": 3.0, "rotZ": 90.0,
                "attributesData": [
                    { "id": 1, "characterId": 42, "name": "Strength", "slug": "strength", "value": 10 }
                ],
                "skillsData": [
                    { "skillSlug": "fireball", "skillName": "Fireball", "skillLevel": 2 }
                ]
            }
        }"#;

        let event = decode_message(raw, None).unwrap();
        let record = event.data.as_character().unwrap();
        assert_eq!(record.character_id, 42);
        assert_eq!(record.class_name, "Mage");
        assert_eq!(record.experience_points, 3400);
        assert_eq!(record.position.y, 2.0);
        assert_eq!(record.attributes[0].slug, "strength");
        assert_eq!(record.skills[0].skill_slug, "fireball");
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let err = decode_message(r#"{ "eventType": "noSuchEvent" }"#, None).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownEventType(_)));

        let err = decode_message(r#"{ "body": {} }"#, None).unwrap_err();
        assert!(matches!(err, DecodeError::MissingEventType));
    }

    #[test]
    fn missing_client_id_defaults_to_sentinel() {
        let event = decode_message(r#"{ "eventType": "pingClient" }"#, None).unwrap();
        assert_eq!(event.client_id, 0);
        assert_eq!(event.data.as_client().unwrap().client_id, 0);
    }
}
