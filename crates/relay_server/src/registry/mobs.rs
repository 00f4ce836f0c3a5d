//! Registry of mob templates and live per-zone mob instances.

use dashmap::DashMap;
use gateway_events::{MobAttribute, MobRecord};

/// Mob state split the way the upstream process supplies it: templates
/// keyed by mob id (`uid == 0`), live instances keyed by instance uid.
#[derive(Debug, Default)]
pub struct MobRegistry {
    templates: DashMap<i64, MobRecord>,
    instances: DashMap<i64, MobRecord>,
}

impl MobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk-loads mob templates.
    pub fn load_templates(&self, mobs: Vec<MobRecord>) {
        for mob in mobs {
            self.templates.insert(mob.id, mob);
        }
    }

    /// Attaches attributes to the templates they belong to.
    pub fn load_attributes(&self, attributes: Vec<MobAttribute>) {
        for attribute in attributes {
            if let Some(mut template) = self.templates.get_mut(&attribute.mob_id) {
                template.attributes.retain(|a| a.id != attribute.id);
                template.attributes.push(attribute);
            }
        }
    }

    pub fn template(&self, mob_id: i64) -> Option<MobRecord> {
        self.templates.get(&mob_id).map(|m| m.clone())
    }

    /// Inserts or updates a live instance, keyed by its uid.
    pub fn upsert_instance(&self, mob: MobRecord) {
        if mob.uid == 0 {
            return; // 0 is the absent sentinel, never a valid instance key
        }
        self.instances.insert(mob.uid, mob);
    }

    pub fn remove_instance(&self, uid: i64) {
        self.instances.remove(&uid);
    }

    /// Snapshot of all live instances currently in a zone, in uid order so
    /// repeated reads are stable.
    pub fn instances_in_zone(&self, zone_id: i64) -> Vec<MobRecord> {
        let mut mobs: Vec<MobRecord> = self
            .instances
            .iter()
            .filter(|entry| entry.zone_id == zone_id)
            .map(|entry| entry.clone())
            .collect();
        mobs.sort_by_key(|m| m.uid);
        mobs
    }
}
