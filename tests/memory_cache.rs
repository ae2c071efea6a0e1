use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

use vpath_core::cache::{
    CacheEntry, Dependency, DependencyToken, MemoryResolutionCache, ResolutionCache, Unchanging,
};
use vpath_core::types::{CacheKey, ProviderId, VirtualPath};

/// Dependency flipped by hand.
struct Switch(Arc<AtomicBool>);

impl Dependency for Switch {
    fn has_changed(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn describe(&self) -> String {
        "switch".to_string()
    }
}

fn key(path: &str) -> CacheKey {
    CacheKey::derive(ProviderId::STATIC_FILE, "test", &VirtualPath::parse(path).unwrap())
}

fn entry(path: &str, content: &str, dependency: &DependencyToken) -> CacheEntry {
    CacheEntry {
        source_path: VirtualPath::parse(path).unwrap(),
        content: content.to_string(),
        dependency: dependency.clone(),
    }
}

fn cache(capacity: usize) -> MemoryResolutionCache {
    MemoryResolutionCache::new(NonZeroUsize::new(capacity).unwrap())
}

#[test]
fn get_returns_stored_entry() {
    let cache = cache(4);
    let token = DependencyToken::new(Unchanging);

    cache.put(key("/a.html"), entry("/a.html", "alpha", &token), token.clone());
    let hit = cache.get(&key("/a.html")).expect("entry should be cached");

    assert_eq!(hit.content, "alpha");
    assert_eq!(hit.source_path.as_str(), "/a.html");
    assert!(hit.dependency.same_as(&token));
    assert!(cache.get(&key("/b.html")).is_none());
}

#[test]
fn changed_dependency_evicts_on_lookup() {
    let cache = cache(4);
    let flag = Arc::new(AtomicBool::new(false));
    let token = DependencyToken::new(Switch(Arc::clone(&flag)));

    cache.put(key("/a.html"), entry("/a.html", "alpha", &token), token.clone());
    assert!(cache.get(&key("/a.html")).is_some());

    flag.store(true, Ordering::SeqCst);

    assert!(cache.get(&key("/a.html")).is_none());
    assert!(cache.is_empty(), "stale entry must be removed, not just hidden");
}

#[test]
fn last_put_wins() {
    let cache = cache(4);
    let token = DependencyToken::new(Unchanging);

    cache.put(key("/a.html"), entry("/a.html", "first", &token), token.clone());
    cache.put(key("/a.html"), entry("/a.html", "second", &token), token.clone());

    assert_eq!(cache.get(&key("/a.html")).unwrap().content, "second");
    assert_eq!(cache.len(), 1);
}

#[test]
fn capacity_displaces_least_recently_used() {
    let cache = cache(2);
    let token = DependencyToken::new(Unchanging);

    cache.put(key("/a.html"), entry("/a.html", "a", &token), token.clone());
    cache.put(key("/b.html"), entry("/b.html", "b", &token), token.clone());
    // Touch a so b becomes the oldest
    assert!(cache.get(&key("/a.html")).is_some());
    cache.put(key("/c.html"), entry("/c.html", "c", &token), token.clone());

    assert_eq!(cache.len(), 2);
    assert!(cache.get(&key("/a.html")).is_some());
    assert!(cache.get(&key("/b.html")).is_none());
    assert!(cache.get(&key("/c.html")).is_some());
}

#[test]
fn flush_empties_cache() {
    let cache = cache(4);
    let token = DependencyToken::new(Unchanging);
    cache.put(key("/a.html"), entry("/a.html", "a", &token), token.clone());

    cache.flush();

    assert!(cache.is_empty());
    assert!(cache.get(&key("/a.html")).is_none());
}

#[test]
fn token_debug_uses_description() {
    let token = DependencyToken::new(Unchanging);

    assert_eq!(format!("{token:?}"), "DependencyToken(\"unchanging\")");
}

/// Dependency whose check takes a while, like a metadata syscall on a slow disk.
struct Slow(Duration);

impl Dependency for Slow {
    fn has_changed(&self) -> bool {
        thread::sleep(self.0);
        false
    }

    fn describe(&self) -> String {
        format!("slow {:?}", self.0)
    }
}

#[test]
fn dependency_checks_run_concurrently() {
    const LOOKUPS: usize = 4;
    const CHECK: Duration = Duration::from_millis(200);
    let cache = cache(LOOKUPS);
    for i in 0..LOOKUPS {
        let path = format!("/slow-{i}.html");
        let token = DependencyToken::new(Slow(CHECK));
        cache.put(key(&path), entry(&path, "slow", &token), token);
    }

    let started = Instant::now();
    thread::scope(|s| {
        for i in 0..LOOKUPS {
            let cache = &cache;
            s.spawn(move || {
                assert!(cache.get(&key(&format!("/slow-{i}.html"))).is_some());
            });
        }
    });
    let elapsed = started.elapsed();

    assert!(
        elapsed < CHECK * 3,
        "{LOOKUPS} lookups on distinct keys took {elapsed:?}, checks were serialized"
    );
}

/// Stores a fresh entry under `/a.html` while it is being checked, then reports a change.
struct Superseded(Weak<MemoryResolutionCache>);

impl Dependency for Superseded {
    fn has_changed(&self) -> bool {
        if let Some(cache) = self.0.upgrade() {
            let fresh = DependencyToken::new(Unchanging);
            cache.put(key("/a.html"), entry("/a.html", "fresh", &fresh), fresh);
        }
        true
    }

    fn describe(&self) -> String {
        "superseded".to_string()
    }
}

#[test]
fn stale_check_keeps_entry_stored_meanwhile() {
    let cache = Arc::new(cache(4));
    let stale = DependencyToken::new(Superseded(Arc::downgrade(&cache)));
    cache.put(key("/a.html"), entry("/a.html", "old", &stale), stale.clone());

    // Reentrant put from inside the check must not deadlock
    assert!(cache.get(&key("/a.html")).is_none());

    let hit = cache.get(&key("/a.html")).expect("fresh entry must survive");
    assert_eq!(hit.content, "fresh");
    assert!(!hit.dependency.same_as(&stale));
}
