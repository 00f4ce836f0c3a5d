//! Registry of mob spawn zones.

use dashmap::DashMap;
use gateway_events::SpawnZoneRecord;

/// Concurrent map of zone id to spawn zone configuration and live state.
#[derive(Debug, Default)]
pub struct SpawnZoneRegistry {
    zones: DashMap<i64, SpawnZoneRecord>,
}

impl SpawnZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_list(&self, zones: Vec<SpawnZoneRecord>) {
        for zone in zones {
            self.zones.insert(zone.zone_id, zone);
        }
    }

    pub fn upsert(&self, zone: SpawnZoneRecord) {
        self.zones.insert(zone.zone_id, zone);
    }

    pub fn get(&self, zone_id: i64) -> Option<SpawnZoneRecord> {
        self.zones.get(&zone_id).map(|z| z.clone())
    }

    pub fn list(&self) -> Vec<SpawnZoneRecord> {
        self.zones.iter().map(|entry| entry.clone()).collect()
    }
}
