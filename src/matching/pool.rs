use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::{PlayerId, PlayerProfile, QueueEntry};

/// Players waiting for one role, keyed by id
#[derive(Debug, Clone, Default)]
pub struct Pool {
    entries: HashMap<PlayerId, QueueEntry>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the player's entry, returning the previous one
    pub fn upsert(&mut self, profile: PlayerProfile, joined_at: DateTime<Utc>) -> Option<QueueEntry> {
        self.entries.insert(profile.id, QueueEntry::new(profile, joined_at))
    }

    pub fn remove(&mut self, id: PlayerId) -> Option<QueueEntry> {
        self.entries.remove(&id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&QueueEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Unordered; callers must not rely on iteration order
    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.values()
    }

    pub fn ids(&self) -> Vec<PlayerId> {
        self.entries.keys().copied().collect()
    }

    pub fn entries(&self) -> Vec<QueueEntry> {
        self.entries.values().cloned().collect()
    }
}
