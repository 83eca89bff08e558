//! Cache module - keys, entries and merge rules for the entity cache.

mod keys;
mod messages;

pub use keys::{CacheEntry, CacheKey};
pub use messages::{merge_message, optimistic_message, MergeOutcome};
