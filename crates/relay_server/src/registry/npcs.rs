//! Registry of NPC records pushed by the upstream process.

use dashmap::DashMap;
use gateway_events::{NpcAttribute, NpcRecord, Position};

/// Concurrent map of NPC id to record.
#[derive(Debug, Default)]
pub struct NpcRegistry {
    npcs: DashMap<i64, NpcRecord>,
}

impl NpcRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_list(&self, npcs: Vec<NpcRecord>) {
        for npc in npcs {
            self.npcs.insert(npc.id, npc);
        }
    }

    pub fn load_attributes(&self, attributes: Vec<NpcAttribute>) {
        for attribute in attributes {
            if let Some(mut npc) = self.npcs.get_mut(&attribute.npc_id) {
                npc.attributes.retain(|a| a.id != attribute.id);
                npc.attributes.push(attribute);
            }
        }
    }

    pub fn get(&self, npc_id: i64) -> Option<NpcRecord> {
        self.npcs.get(&npc_id).map(|n| n.clone())
    }

    /// NPCs within a horizontal radius of a position, in id order.
    /// Used for the spawn push sent to a client joining a character.
    pub fn npcs_within(&self, center: &Position, radius: f64) -> Vec<NpcRecord> {
        let mut nearby: Vec<NpcRecord> = self
            .npcs
            .iter()
            .filter(|entry| entry.position.planar_distance(center) <= radius)
            .map(|entry| entry.clone())
            .collect();
        nearby.sort_by_key(|n| n.id);
        nearby
    }

    pub fn len(&self) -> usize {
        self.npcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.npcs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn npc(id: i64, x: f64, y: f64) -> NpcRecord {
        NpcRecord {
            id,
            name: format!("npc-{id}"),
            position: Position::new(x, y, 0.0, 0.0),
            ..Default::default()
        }
    }

    #[test]
    fn radius_filter_is_planar() {
        let registry = NpcRegistry::new();
        registry.load_list(vec![npc(1, 10.0, 0.0), npc(2, 2000.0, 0.0)]);

        let nearby = registry.npcs_within(&Position::default(), 1000.0);
        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].id, 1);
    }
}
