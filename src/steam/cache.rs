//! Time-bounded cache of successful metadata lookups

use crate::domain::NumericAppId;
use crate::steam::GameDetails;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

struct CachedEntry {
    details: GameDetails,
    stored_at: Instant,
}

/// Shared by all requests; expired entries are replaced on the next successful lookup
pub struct MetadataCache {
    ttl: Duration,
    entries: RwLock<HashMap<NumericAppId, CachedEntry>>,
}

impl MetadataCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, app_id: &NumericAppId) -> Option<GameDetails> {
        self.get_at(app_id, Instant::now())
    }

    pub fn insert(&self, app_id: NumericAppId, details: GameDetails) {
        self.insert_at(app_id, details, Instant::now());
    }

    fn get_at(&self, app_id: &NumericAppId, now: Instant) -> Option<GameDetails> {
        let entries = self.entries.read();
        entries
            .get(app_id)
            .filter(|entry| now.saturating_duration_since(entry.stored_at) < self.ttl)
            .map(|entry| entry.details.clone())
    }

    fn insert_at(&self, app_id: NumericAppId, details: GameDetails, now: Instant) {
        let mut entries = self.entries.write();
        entries.retain(|_, entry| now.saturating_duration_since(entry.stored_at) < self.ttl);
        entries.insert(
            app_id,
            CachedEntry {
                details,
                stored_at: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
