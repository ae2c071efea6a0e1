use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::cache::{Dependency, DependencyToken};
use crate::types::identifiers::VirtualPath;
use crate::vfs::VirtualFileSystem;

/// Virtual file system rooted at a directory on disk.
#[derive(Debug)]
pub struct DirectoryFileSystem {
    root: PathBuf,
    identity: String,
}

impl DirectoryFileSystem {
    /// The root must exist. Its canonical form names the store.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = fs::canonicalize(root)?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a directory: {}", root.display()),
            ));
        }

        // First 12 hex chars of the root digest keep cache keys short and separator-free
        let digest = Sha256::digest(root.to_string_lossy().as_bytes());
        let identity = format!("dir-{}", &hex::encode(digest)[..12]);

        Ok(Self { root, identity })
    }

    /// `VirtualPath` has no `..` segments, so the result stays under the root.
    fn physical(&self, path: &VirtualPath) -> PathBuf {
        path.segments()
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }
}

impl VirtualFileSystem for DirectoryFileSystem {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn exists(&self, path: &VirtualPath) -> bool {
        self.physical(path).is_file()
    }

    fn open(&self, path: &VirtualPath) -> io::Result<Box<dyn Read + Send + '_>> {
        let file = fs::File::open(self.physical(path))?;
        Ok(Box::new(file))
    }

    fn dependency_token(&self, path: &VirtualPath, since: DateTime<Utc>) -> DependencyToken {
        let file = self.physical(path);
        let snapshot = Snapshot::of(&file);
        DependencyToken::new(FileDependency {
            file,
            since,
            snapshot,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    len: u64,
    modified: Option<SystemTime>,
}

impl Snapshot {
    fn of(file: &Path) -> Option<Self> {
        let meta = fs::metadata(file).ok()?;
        Some(Snapshot {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

struct FileDependency {
    file: PathBuf,
    since: DateTime<Utc>,
    snapshot: Option<Snapshot>,
}

impl Dependency for FileDependency {
    fn has_changed(&self) -> bool {
        let (Some(issued), Some(current)) = (self.snapshot, Snapshot::of(&self.file)) else {
            return true;
        };
        if issued != current {
            return true;
        }
        match current.modified {
            Some(modified) => DateTime::<Utc>::from(modified) > self.since,
            None => false,
        }
    }

    fn describe(&self) -> String {
        format!("file:{}", self.file.display())
    }
}
