//! # Domain Record Types
//!
//! Read-mostly snapshots of the entities the gateway relays between clients
//! and the upstream game-logic process. The authoritative copies live in the
//! relay's registries; these types are the wire/transfer representation.
//!
//! ## Key Types
//!
//! - [`ClientInfo`] - Session identity for one connected client
//! - [`CharacterRecord`] - Full character snapshot with attributes
//! - [`MobRecord`] / [`NpcRecord`] / [`SpawnZoneRecord`] - world entity snapshots
//! - [`ChunkInfoRecord`] - Addressing info for a world chunk
//!
//! ## Sentinel Convention
//!
//! An id of `0` is the universal "absent/unauthenticated" sentinel and must
//! never be treated as a valid reference.
//!
//! ## Wire Shaping
//!
//! Each record knows how to transcode itself into the nested JSON shape the
//! clients consume (`to_wire`). Deserialization from upstream payloads uses
//! the flat camelCase field layout via serde.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A 3D position with facing, as carried by movement and spawn payloads.
///
/// Inbound payloads carry positions as flat `posX`/`posY`/`posZ`/`rotZ`
/// keys alongside the other body fields, so records embed this type with
/// `#[serde(flatten)]`. Outbound wire shapes nest it (`to_wire`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    #[serde(rename = "posX")]
    pub x: f64,
    #[serde(rename = "posY")]
    pub y: f64,
    #[serde(rename = "posZ")]
    pub z: f64,
    #[serde(rename = "rotZ")]
    pub rotation_z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64, rotation_z: f64) -> Self {
        Self { x, y, z, rotation_z }
    }

    /// Planar distance to another position, ignoring the vertical axis.
    /// NPC spawn pushes use a horizontal radius.
    pub fn planar_distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn to_wire(&self) -> Value {
        json!({ "x": self.x, "y": self.y, "z": self.z, "rotationZ": self.rotation_z })
    }
}

/// Session identity for one connected client.
///
/// `client_id` and the `hash` token are issued by the upstream login flow;
/// this tier only checks that they are non-zero/non-empty. `character_id`
/// stays `0` until the client joins a character.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientInfo {
    pub client_id: i64,
    pub hash: String,
    pub character_id: i64,
}

/// One named attribute of a character (strength, agility, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterAttribute {
    pub id: i64,
    pub character_id: i64,
    pub name: String,
    pub slug: String,
    pub value: i64,
}

/// One skill known by a character, as supplied alongside its attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillRecord {
    pub skill_name: String,
    pub skill_slug: String,
    pub scale_stat: String,
    pub school: String,
    pub skill_effect_type: String,
    pub skill_level: i64,
    pub coeff: f64,
    pub flat_add: f64,
    pub cooldown_ms: i64,
    pub gcd_ms: i64,
}

/// Full snapshot of one character as supplied by the upstream process.
///
/// A `character_id` of `0` means "no such character" (registry miss).
/// Upstream bodies key the id as `id` and attributes as `attributesData`;
/// client join requests use `characterId`, hence the alias.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterRecord {
    #[serde(rename = "id", alias = "characterId")]
    pub character_id: i64,
    pub client_id: i64,
    pub name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub race: String,
    pub level: i64,
    #[serde(rename = "currentExp")]
    pub experience_points: i64,
    pub exp_for_next_level: i64,
    pub current_health: i64,
    pub max_health: i64,
    pub current_mana: i64,
    pub max_mana: i64,
    #[serde(flatten)]
    pub position: Position,
    #[serde(rename = "attributesData", alias = "attributes")]
    pub attributes: Vec<CharacterAttribute>,
    #[serde(rename = "skillsData", alias = "skills")]
    pub skills: Vec<SkillRecord>,
}

impl CharacterRecord {
    /// Transcodes the record into the nested shape client UIs consume.
    ///
    /// Produces `{id, name, class, race, level, exp{current,nextLevel},
    /// stats{health{current,max}, mana{current,max}}, position, attributes[]}`.
    pub fn to_wire(&self) -> Value {
        json!({
            "id": self.character_id,
            "name": self.name,
            "class": self.class_name,
            "race": self.race,
            "level": self.level,
            "exp": { "current": self.experience_points, "nextLevel": self.exp_for_next_level },
            "stats": {
                "health": { "current": self.current_health, "max": self.max_health },
                "mana": { "current": self.current_mana, "max": self.max_mana },
            },
            "position": self.position.to_wire(),
            "attributes": self.attributes.iter().map(attribute_to_wire).collect::<Vec<_>>(),
        })
    }
}

fn attribute_to_wire(attr: &CharacterAttribute) -> Value {
    json!({ "id": attr.id, "name": attr.name, "slug": attr.slug, "value": attr.value })
}

/// A character movement update: who moved and where to.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MovementData {
    pub client_id: i64,
    pub character_id: i64,
    #[serde(flatten)]
    pub position: Position,
}

/// Addressing and extent information for one world chunk.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChunkInfoRecord {
    pub id: i64,
    pub ip: String,
    pub port: u16,
    pub pos_x: f64,
    pub pos_y: f64,
    pub pos_z: f64,
    pub size_x: f64,
    pub size_y: f64,
    pub size_z: f64,
}

/// One named attribute of a mob template.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MobAttribute {
    pub id: i64,
    pub mob_id: i64,
    pub name: String,
    pub slug: String,
    pub value: i64,
}

/// Snapshot of one mob, either a template (`uid == 0`) or a live
/// per-zone instance (`uid != 0`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MobRecord {
    pub id: i64,
    #[serde(rename = "UID", alias = "uid")]
    pub uid: i64,
    pub zone_id: i64,
    pub name: String,
    pub slug: String,
    pub race: String,
    pub level: i64,
    pub current_health: i64,
    pub max_health: i64,
    pub current_mana: i64,
    pub max_mana: i64,
    #[serde(flatten)]
    pub position: Position,
    pub is_aggressive: bool,
    pub is_dead: bool,
    #[serde(rename = "attributesData", alias = "attributes")]
    pub attributes: Vec<MobAttribute>,
}

impl MobRecord {
    pub fn to_wire(&self) -> Value {
        json!({
            "id": self.id,
            "uid": self.uid,
            "zoneId": self.zone_id,
            "name": self.name,
            "slug": self.slug,
            "race": self.race,
            "level": self.level,
            "isAggressive": self.is_aggressive,
            "isDead": self.is_dead,
            "stats": {
                "health": { "current": self.current_health, "max": self.max_health },
                "mana": { "current": self.current_mana, "max": self.max_mana },
            },
            "position": self.position.to_wire(),
            "attributes": self.attributes.iter().map(|a| json!({
                "id": a.id, "name": a.name, "slug": a.slug, "value": a.value
            })).collect::<Vec<_>>(),
        })
    }
}

/// One named attribute of an NPC.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NpcAttribute {
    pub id: i64,
    pub npc_id: i64,
    pub name: String,
    pub slug: String,
    pub value: i64,
}

/// Snapshot of one NPC as pushed by the upstream process.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NpcRecord {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub race: String,
    pub level: i64,
    pub npc_type: i64,
    pub is_interactable: bool,
    pub dialogue_id: i64,
    pub quest_id: i64,
    pub current_health: i64,
    pub max_health: i64,
    pub current_mana: i64,
    pub max_mana: i64,
    #[serde(flatten)]
    pub position: Position,
    #[serde(rename = "attributesData", alias = "attributes")]
    pub attributes: Vec<NpcAttribute>,
}

impl NpcRecord {
    /// Transcodes the record into the spawn-push shape sent to joining clients.
    pub fn to_spawn_wire(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "slug": self.slug,
            "race": self.race,
            "level": self.level,
            "npcType": self.npc_type,
            "isInteractable": self.is_interactable,
            "dialogueId": self.dialogue_id,
            "questId": self.quest_id,
            "stats": {
                "health": { "current": self.current_health, "max": self.max_health },
                "mana": { "current": self.current_mana, "max": self.max_mana },
            },
            "position": self.position.to_wire(),
            "attributes": self.attributes.iter().map(|a| json!({
                "id": a.id, "name": a.name, "slug": a.slug, "value": a.value
            })).collect::<Vec<_>>(),
        })
    }
}

/// Configuration and live state of one mob spawn zone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpawnZoneRecord {
    #[serde(rename = "id", alias = "zoneId")]
    pub zone_id: i64,
    #[serde(rename = "name")]
    pub zone_name: String,
    pub pos_x: f64,
    pub size_x: f64,
    pub pos_y: f64,
    pub size_y: f64,
    pub pos_z: f64,
    pub size_z: f64,
    pub spawn_mob_id: i64,
    #[serde(rename = "maxMobSpawnCount", alias = "spawnCount")]
    pub spawn_count: i64,
    #[serde(rename = "respawnTime")]
    pub respawn_time_secs: i64,
    pub spawn_enabled: bool,
    #[serde(skip)]
    pub spawned_mob_uids: Vec<i64>,
}

impl SpawnZoneRecord {
    pub fn to_wire(&self) -> Value {
        json!({
            "id": self.zone_id,
            "name": self.zone_name,
            "bounds": {
                "minX": self.pos_x, "maxX": self.size_x,
                "minY": self.pos_y, "maxY": self.size_y,
                "minZ": self.pos_z, "maxZ": self.size_z,
            },
            "spawnMobId": self.spawn_mob_id,
            "maxSpawnCount": self.spawn_count,
            "spawnedMobsCount": self.spawned_mob_uids.len(),
            "respawnTime": self.respawn_time_secs,
            "spawnEnabled": self.spawn_enabled,
        })
    }
}
