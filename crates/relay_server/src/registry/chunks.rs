//! Registry of world chunk addressing info.

use dashmap::DashMap;
use gateway_events::ChunkInfoRecord;

/// Concurrent map of chunk id to addressing and extent info, loaded when
/// the upstream process initializes a chunk.
#[derive(Debug, Default)]
pub struct ChunkRegistry {
    chunks: DashMap<i64, ChunkInfoRecord>,
}

impl ChunkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, chunk: ChunkInfoRecord) {
        self.chunks.insert(chunk.id, chunk);
    }

    pub fn get(&self, chunk_id: i64) -> Option<ChunkInfoRecord> {
        self.chunks.get(&chunk_id).map(|c| c.clone())
    }

    pub fn list(&self) -> Vec<ChunkInfoRecord> {
        self.chunks.iter().map(|entry| entry.clone()).collect()
    }
}
