//! EntityCache port - Keyed cache owned by the consuming application.
//!
//! Two tiers of update:
//!
//! - `write` stores a value directly (optimistic update, entry is fresh)
//! - `invalidate` marks an entry stale so it is refetched on next read
//!
//! The sync client writes to the cache but never owns it; concurrent writes
//! from other application code are the cache owner's responsibility.

use serde_json::Value;

use crate::domain::cache::{CacheEntry, CacheKey};

/// Port for the consumer's entity cache.
pub trait EntityCache: Send + Sync {
    /// Returns the entry for a key, if cached.
    fn read(&self, key: &CacheKey) -> Option<CacheEntry>;

    /// Stores a value, replacing any previous entry and clearing staleness.
    fn write(&self, key: CacheKey, value: Value);

    /// Marks an entry stale. Keys not present are left absent.
    fn invalidate(&self, key: &CacheKey);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_cache_object_safe(_: &dyn EntityCache) {}
}
