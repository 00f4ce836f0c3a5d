//! Per-character skill state.
//!
//! Initialized as a side effect of a successful character join, from the
//! skill list carried by the character record. This tier only stores the
//! state; skill execution stays upstream.

use dashmap::DashMap;
use gateway_events::SkillRecord;

/// Runtime state of one known skill.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillState {
    pub skill_slug: String,
    pub skill_name: String,
    pub skill_level: i64,
    pub cooldown_ms: i64,
}

impl From<&SkillRecord> for SkillState {
    fn from(record: &SkillRecord) -> Self {
        Self {
            skill_slug: record.skill_slug.clone(),
            skill_name: record.skill_name.clone(),
            skill_level: record.skill_level,
            cooldown_ms: record.cooldown_ms,
        }
    }
}

/// Concurrent map of character id to known skills.
#[derive(Debug, Default)]
pub struct SkillRegistry {
    skills: DashMap<i64, Vec<SkillState>>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the character's skill state from its record snapshot.
    pub fn init_for_character(&self, character_id: i64, skills: &[SkillRecord]) {
        let state: Vec<SkillState> = skills.iter().map(SkillState::from).collect();
        self.skills.insert(character_id, state);
    }

    pub fn get(&self, character_id: i64) -> Option<Vec<SkillState>> {
        self.skills.get(&character_id).map(|s| s.clone())
    }

    pub fn remove(&self, character_id: i64) {
        self.skills.remove(&character_id);
    }
}
