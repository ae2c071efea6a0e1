pub mod decode;
pub mod directory;
pub mod memory;

use std::io::{self, Read};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::cache::DependencyToken;
use crate::types::identifiers::VirtualPath;

pub use decode::{decode_text, DecodeError};
pub use directory::DirectoryFileSystem;
pub use memory::MemoryFileSystem;

/// Backing store that static content is read from.
pub trait VirtualFileSystem: Send + Sync {
    /// Stable name of this store, part of every cache key derived from it.
    fn identity(&self) -> &str;

    fn exists(&self, path: &VirtualPath) -> bool;

    fn open(&self, path: &VirtualPath) -> io::Result<Box<dyn Read + Send + '_>>;

    /// A token that reports a change once `path` is modified after `since`.
    fn dependency_token(&self, path: &VirtualPath, since: DateTime<Utc>) -> DependencyToken;
}

impl<F: VirtualFileSystem + ?Sized> VirtualFileSystem for Arc<F> {
    fn identity(&self) -> &str {
        (**self).identity()
    }

    fn exists(&self, path: &VirtualPath) -> bool {
        (**self).exists(path)
    }

    fn open(&self, path: &VirtualPath) -> io::Result<Box<dyn Read + Send + '_>> {
        (**self).open(path)
    }

    fn dependency_token(&self, path: &VirtualPath, since: DateTime<Utc>) -> DependencyToken {
        (**self).dependency_token(path, since)
    }
}
