use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VirtualPathError {
    #[error("Virtual path is empty")]
    Empty,
    #[error("Virtual path must be rooted at '/': {0}")]
    NotRooted(String),
    #[error("Virtual path contains a NUL byte")]
    NulByte,
    #[error("Virtual path escapes the root: {0}")]
    EscapesRoot(String),
}

/// A normalized, rooted path into a virtual file system.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VirtualPath(String);

impl VirtualPath {
    /// Parse and normalize a caller-supplied path.
    ///
    /// Backslashes become `/`, empty and `.` segments are dropped and `..`
    /// pops the previous segment. Popping past the root is rejected.
    pub fn parse(raw: &str) -> Result<Self, VirtualPathError> {
        if raw.is_empty() {
            return Err(VirtualPathError::Empty);
        }
        if raw.contains('\0') {
            return Err(VirtualPathError::NulByte);
        }

        let unified = raw.replace('\\', "/");
        if !unified.starts_with('/') {
            return Err(VirtualPathError::NotRooted(raw.to_string()));
        }

        let mut segments: Vec<&str> = Vec::new();
        for segment in unified.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(VirtualPathError::EscapesRoot(raw.to_string()));
                    }
                }
                other => segments.push(other),
            }
        }

        Ok(VirtualPath(format!("/{}", segments.join("/"))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final segment of the path, empty for the root.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// Suffix of the final segment starting at its last `.`, dot included.
    ///
    /// A leading dot alone (`/.profile`) is not an extension.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx..]),
        }
    }

    /// Segments after the root, for mapping onto a directory tree.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Names the provider that produced a result. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProviderId(&'static str);

impl ProviderId {
    pub const STATIC_FILE: ProviderId = ProviderId::new("static_file");
    pub const DYNAMIC_PAGE: ProviderId = ProviderId::new("dynamic_page");

    pub const fn new(kind: &'static str) -> Self {
        ProviderId(kind)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Lookup key in the resolution cache.
///
/// Format: `<providerKind>_<backingStoreIdentity>_<virtualPath>`. The format is
/// lossy, so a hit must still be checked against the entry's source path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn derive(provider: ProviderId, store_identity: &str, path: &VirtualPath) -> Self {
        CacheKey(format!(
            "{}_{}_{}",
            provider.as_str(),
            store_identity,
            path.as_str()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
