use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::cache::lock::{rw_read, rw_write};
use crate::cache::{Dependency, DependencyToken};
use crate::types::identifiers::VirtualPath;
use crate::vfs::VirtualFileSystem;

const SOURCE: &str = "vfs::memory";

#[derive(Clone)]
struct MemoryFile {
    bytes: Arc<[u8]>,
    generation: u64,
    modified_at: DateTime<Utc>,
}

#[derive(Default)]
struct Files {
    entries: RwLock<HashMap<VirtualPath, MemoryFile>>,
    next_generation: AtomicU64,
}

impl Files {
    fn current(&self, path: &VirtualPath) -> Option<MemoryFile> {
        rw_read(&self.entries, SOURCE, "current").get(path).cloned()
    }
}

/// Virtual file system held entirely in memory.
///
/// Every write or removal bumps a generation counter, so tokens issued before
/// it report a change.
pub struct MemoryFileSystem {
    identity: String,
    files: Arc<Files>,
}

impl MemoryFileSystem {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            identity: format!("mem-{}", name.as_ref()),
            files: Arc::new(Files::default()),
        }
    }

    pub fn write(&self, path: &VirtualPath, content: impl Into<Vec<u8>>) {
        let generation = self.files.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let file = MemoryFile {
            bytes: Arc::from(content.into()),
            generation,
            modified_at: Utc::now(),
        };
        rw_write(&self.files.entries, SOURCE, "write").insert(path.clone(), file);
    }

    pub fn remove(&self, path: &VirtualPath) -> bool {
        rw_write(&self.files.entries, SOURCE, "remove")
            .remove(path)
            .is_some()
    }
}

impl VirtualFileSystem for MemoryFileSystem {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn exists(&self, path: &VirtualPath) -> bool {
        rw_read(&self.files.entries, SOURCE, "exists").contains_key(path)
    }

    fn open(&self, path: &VirtualPath) -> io::Result<Box<dyn Read + Send + '_>> {
        match self.files.current(path) {
            Some(file) => Ok(Box::new(Cursor::new(file.bytes))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such virtual file: {path}"),
            )),
        }
    }

    fn dependency_token(&self, path: &VirtualPath, since: DateTime<Utc>) -> DependencyToken {
        let generation = self.files.current(path).map(|file| file.generation);
        DependencyToken::new(MemoryDependency {
            files: Arc::clone(&self.files),
            path: path.clone(),
            generation,
            since,
        })
    }
}

struct MemoryDependency {
    files: Arc<Files>,
    path: VirtualPath,
    generation: Option<u64>,
    since: DateTime<Utc>,
}

impl Dependency for MemoryDependency {
    fn has_changed(&self) -> bool {
        match (self.files.current(&self.path), self.generation) {
            (Some(file), Some(generation)) => {
                file.generation != generation || file.modified_at > self.since
            }
            _ => true,
        }
    }

    fn describe(&self) -> String {
        format!("memory:{}@{:?}", self.path, self.generation)
    }
}
