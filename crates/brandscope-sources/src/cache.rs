//! Time-limited cache of profile lookups, keyed by platform and normalized
//! username.

use std::collections::HashMap;
use std::time::Duration;

use brandscope_core::{Platform, ProfileCounts};
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Lowercase, trimmed, without a leading `@`.
#[must_use]
pub fn normalize_username(handle: &str) -> String {
    handle.trim().trim_start_matches('@').trim().to_lowercase()
}

/// Entries older than the TTL read as misses.
#[derive(Debug)]
pub struct ProfileCache {
    ttl: Duration,
    entries: RwLock<HashMap<(Platform, String), (Instant, ProfileCounts)>>,
}

impl ProfileCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, platform: Platform, handle: &str) -> Option<ProfileCounts> {
        let key = (platform, normalize_username(handle));
        let entries = self.entries.read().await;
        entries
            .get(&key)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, counts)| *counts)
    }

    pub async fn insert(&self, platform: Platform, handle: &str, counts: ProfileCounts) {
        let key = (platform, normalize_username(handle));
        let mut entries = self.entries.write().await;
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < self.ttl);
        entries.insert(key, (Instant::now(), counts));
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
