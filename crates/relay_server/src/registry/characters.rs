//! Registry of character records pushed by the upstream process.

use dashmap::DashMap;
use gateway_events::{CharacterAttribute, CharacterRecord, Position};

/// Concurrent map of character id to record.
///
/// A miss returns `None`; callers treat that as "not yet available" and
/// defer rather than erroring (the deferred-join path).
#[derive(Debug, Default)]
pub struct CharacterRegistry {
    characters: DashMap<i64, CharacterRecord>,
}

impl CharacterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a single character record.
    pub fn add(&self, record: CharacterRecord) {
        self.characters.insert(record.character_id, record);
    }

    /// Bulk-loads a list of character records.
    pub fn load_list(&self, records: Vec<CharacterRecord>) {
        for record in records {
            self.add(record);
        }
    }

    /// Attaches attributes to the characters they belong to.
    pub fn load_attributes(&self, attributes: Vec<CharacterAttribute>) {
        for attribute in attributes {
            if let Some(mut record) = self.characters.get_mut(&attribute.character_id) {
                record.attributes.retain(|a| a.id != attribute.id);
                record.attributes.push(attribute);
            }
        }
    }

    pub fn set_position(&self, character_id: i64, position: Position) {
        if let Some(mut record) = self.characters.get_mut(&character_id) {
            record.position = position;
        }
    }

    pub fn get(&self, character_id: i64) -> Option<CharacterRecord> {
        self.characters.get(&character_id).map(|r| r.clone())
    }

    pub fn contains(&self, character_id: i64) -> bool {
        self.characters.contains_key(&character_id)
    }

    pub fn remove(&self, character_id: i64) {
        self.characters.remove(&character_id);
    }

    pub fn list(&self) -> Vec<CharacterRecord> {
        self.characters.iter().map(|entry| entry.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(character_id: i64, client_id: i64) -> CharacterRecord {
        CharacterRecord {
            character_id,
            client_id,
            name: format!("char-{character_id}"),
            ..Default::default()
        }
    }

    #[test]
    fn miss_is_none_not_a_zero_record() {
        let registry = CharacterRegistry::new();
        assert!(registry.get(42).is_none());
        assert!(!registry.contains(42));
    }

    #[test]
    fn attributes_attach_to_their_character() {
        let registry = CharacterRegistry::new();
        registry.add(record(42, 5));
        registry.load_attributes(vec![
            CharacterAttribute {
                id: 1,
                character_id: 42,
                name: "Strength".to_string(),
                slug: "strength".to_string(),
                value: 10,
            },
            CharacterAttribute {
                id: 2,
                character_id: 99, // no such character, silently skipped
                name: "Agility".to_string(),
                slug: "agility".to_string(),
                value: 7,
            },
        ]);

        let stored = registry.get(42).unwrap();
        assert_eq!(stored.attributes.len(), 1);
        assert_eq!(stored.attributes[0].slug, "strength");
    }

    #[test]
    fn position_update_is_visible_to_readers() {
        let registry = CharacterRegistry::new();
        registry.add(record(42, 5));
        registry.set_position(42, Position::new(1.0, 2.0, 3.0, 45.0));

        assert_eq!(registry.get(42).unwrap().position.x, 1.0);
    }
}
