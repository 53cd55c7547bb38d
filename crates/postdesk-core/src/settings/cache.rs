use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde_json::Value;

/// How long a cached value is trusted without going back to the store.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// A decoded value served from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedValue {
    pub value: Value,
    pub encrypted: bool,
}

struct CacheEntry {
    value: Value,
    encrypted: bool,
    stored_at: Instant,
}

/// In-process cache of decoded setting values with a fixed TTL.
pub struct SettingsCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl SettingsCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // Entries can always be rebuilt from the store, so a poisoned map is reused.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fresh value for `key`, evicting it if it has gone stale.
    pub fn get(&self, key: &str) -> Option<CachedValue> {
        let mut entries = self.entries();
        let fresh = entries.get(key)?.stored_at.elapsed() <= self.ttl;
        if !fresh {
            entries.remove(key);
            tracing::debug!(key, "cache entry expired");
            return None;
        }
        entries.get(key).map(|entry| CachedValue {
            value: entry.value.clone(),
            encrypted: entry.encrypted,
        })
    }

    pub fn set(&self, key: &str, value: Value, encrypted: bool) {
        self.entries().insert(
            key.to_string(),
            CacheEntry {
                value,
                encrypted,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, key: &str) {
        self.entries().remove(key);
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Number of entries, including ones that have expired but not yet been read.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SettingsCache {
    fn default() -> Self {
        Self::new()
    }
}
