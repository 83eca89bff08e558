//! In-memory entity cache.
//!
//! An explicitly constructed store, created at application start and
//! passed by reference to the reconciler and to whatever code reads the
//! cache. Call [`InMemoryEntityCache::clear`] on shutdown or test teardown.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::cache::{CacheEntry, CacheKey};
use crate::ports::EntityCache;

/// Entity cache backed by a `HashMap`.
///
/// Lock poisoning is recovered from: entries are plain values, so a
/// panicking writer cannot leave one half-updated.
#[derive(Debug, Default)]
pub struct InMemoryEntityCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl InMemoryEntityCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered copy of every entry, for exact-state comparison.
    pub fn snapshot(&self) -> BTreeMap<CacheKey, CacheEntry> {
        self.read_guard()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Returns true if the key is cached and marked stale.
    pub fn is_stale(&self, key: &CacheKey) -> bool {
        self.read_guard().get(key).map(|e| e.stale).unwrap_or(false)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.read_guard().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.read_guard().is_empty()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.write_guard().clear();
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EntityCache for InMemoryEntityCache {
    fn read(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.read_guard().get(key).cloned()
    }

    fn write(&self, key: CacheKey, value: Value) {
        self.write_guard().insert(key, CacheEntry::fresh(value));
    }

    fn invalidate(&self, key: &CacheKey) {
        if let Some(entry) = self.write_guard().get_mut(key) {
            entry.stale = true;
        }
    }
}
