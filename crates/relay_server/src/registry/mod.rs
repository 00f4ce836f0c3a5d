//! In-memory entity registries.
//!
//! Authoritative local caches of the world state this relay has learned
//! from the upstream game-logic process. All registries are lock-free
//! concurrent maps safe to share across handler invocations; a get on a
//! missing key returns `None` (the 0-id sentinel never appears as a key).

pub mod characters;
pub mod chunks;
pub mod clients;
pub mod mobs;
pub mod npcs;
pub mod skills;
pub mod zones;

pub use characters::CharacterRegistry;
pub use chunks::ChunkRegistry;
pub use clients::{ClientRegistry, ClientSession};
pub use mobs::MobRegistry;
pub use npcs::NpcRegistry;
pub use skills::{SkillRegistry, SkillState};
pub use zones::SpawnZoneRegistry;
