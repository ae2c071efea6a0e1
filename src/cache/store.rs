// The store interface is deliberately small:
// get and put only
// eviction belongs to the implementation
// callers tolerate a miss at any time

use std::sync::Arc;

use crate::cache::dependency::DependencyToken;
use crate::types::identifiers::{CacheKey, VirtualPath};

/// What the static file provider keeps per resolved path.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub source_path: VirtualPath,
    pub content: String,
    pub dependency: DependencyToken,
}

/// Process-wide keyed store backing the static file provider.
///
/// `get` and `put` must each be atomic; a `get` never observes a partially
/// written entry. Nothing stronger is required: two callers may both miss and
/// both `put`, and the last write wins.
pub trait ResolutionCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>>;

    /// `dependency` tells the store when to evict. It is not interpreted by callers.
    fn put(&self, key: CacheKey, entry: CacheEntry, dependency: DependencyToken);
}

impl<C: ResolutionCache + ?Sized> ResolutionCache for Arc<C> {
    fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        (**self).get(key)
    }

    fn put(&self, key: CacheKey, entry: CacheEntry, dependency: DependencyToken) {
        (**self).put(key, entry, dependency)
    }
}
