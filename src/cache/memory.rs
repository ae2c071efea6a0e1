use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use tracing::debug;

use crate::cache::dependency::DependencyToken;
use crate::cache::lock::mutex_lock;
use crate::cache::store::{CacheEntry, ResolutionCache};
use crate::types::identifiers::CacheKey;

const SOURCE: &str = "cache::memory";

struct Slot {
    entry: Arc<CacheEntry>,
    dependency: DependencyToken,
}

/// In-process resolution cache with LRU capacity and dependency-driven eviction.
///
/// Entries whose dependency reports a change are dropped on the lookup that
/// notices it, so the caller sees a miss and recomputes.
pub struct MemoryResolutionCache {
    slots: Mutex<LruCache<CacheKey, Slot>>,
}

impl MemoryResolutionCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            slots: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Drop every entry.
    pub fn flush(&self) {
        mutex_lock(&self.slots, SOURCE, "flush").clear();
    }

    /// Number of stored entries, including ones not yet found stale.
    pub fn len(&self) -> usize {
        mutex_lock(&self.slots, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResolutionCache for MemoryResolutionCache {
    fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        let (entry, checked) = {
            let mut slots = mutex_lock(&self.slots, SOURCE, "get");
            let slot = slots.get(key)?;
            (Arc::clone(&slot.entry), slot.dependency.clone())
        };

        // Dependency checks may do I/O; they run without the lock
        if !checked.has_changed() {
            return Some(entry);
        }

        let mut slots = mutex_lock(&self.slots, SOURCE, "evict");
        // A concurrent put may have replaced the slot since it was checked
        let same_slot = slots
            .peek(key)
            .is_some_and(|slot| slot.dependency.same_as(&checked));
        if same_slot {
            debug!(key = %key, "Evicting entry with changed dependency");
            slots.pop(key);
        }
        None
    }

    fn put(&self, key: CacheKey, entry: CacheEntry, dependency: DependencyToken) {
        let evicted = mutex_lock(&self.slots, SOURCE, "put").push(
            key,
            Slot {
                entry: Arc::new(entry),
                dependency,
            },
        );

        if let Some((evicted_key, _)) = evicted {
            debug!(key = %evicted_key, "Entry displaced");
        }
    }
}
