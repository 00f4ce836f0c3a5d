//! Service-locator facade over the entity registries.
//!
//! Handlers receive one `Arc<Services>` instead of seven registry
//! references. All members are cheap to construct and internally
//! synchronized.

use crate::registry::{
    CharacterRegistry, ChunkRegistry, ClientRegistry, MobRegistry, NpcRegistry, SkillRegistry,
    SpawnZoneRegistry,
};

/// All entity registries behind one handle.
#[derive(Debug, Default)]
pub struct Services {
    pub clients: ClientRegistry,
    pub characters: CharacterRegistry,
    pub mobs: MobRegistry,
    pub npcs: NpcRegistry,
    pub zones: SpawnZoneRegistry,
    pub chunks: ChunkRegistry,
    pub skills: SkillRegistry,
}

impl Services {
    pub fn new() -> Self {
        Self::default()
    }
}
