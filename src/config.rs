use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::MemoryResolutionCache;
use crate::provider::{
    DynamicPageProvider, ExtensionFilter, PageExecutor, ProviderChain, StaticFileProvider,
};
use crate::vfs::VirtualFileSystem;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

// Key point:
// Serializable
// Comparable
// Explicit defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    pub static_extensions: Vec<String>,
    pub dynamic_extensions: Vec<String>,
    pub cache_capacity: usize,
}

impl ResolverConfig {
    pub fn v0() -> Self {
        Self {
            static_extensions: vec![".html".into(), ".htm".into()],
            dynamic_extensions: vec![".page".into()],
            cache_capacity: 1024,
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: ResolverConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for ext in self.static_extensions.iter().chain(&self.dynamic_extensions) {
            let malformed = !ext.starts_with('.')
                || ext.len() < 2
                || ext[1..].contains(|c: char| c == '.' || c == '/');
            if malformed {
                return Err(ConfigError::Invalid(format!(
                    "extension must look like \".html\": {ext:?}"
                )));
            }
        }

        if let Some(shared) = self.static_extensions.iter().find(|ext| {
            self.dynamic_extensions
                .iter()
                .any(|other| other.eq_ignore_ascii_case(ext))
        }) {
            return Err(ConfigError::Invalid(format!(
                "extension {shared:?} is both static and dynamic"
            )));
        }

        self.capacity()?;
        Ok(())
    }

    pub fn capacity(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.cache_capacity)
            .ok_or_else(|| ConfigError::Invalid("cache_capacity must be positive".to_string()))
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::v0()
    }
}

impl ProviderChain {
    /// Standard wiring: static files first, then executable pages.
    ///
    /// The returned cache is the one the static provider writes to, so the host
    /// can share or flush it.
    pub fn from_config<F>(
        config: &ResolverConfig,
        files: F,
        executor: Arc<dyn PageExecutor>,
    ) -> Result<(Self, Arc<MemoryResolutionCache>), ConfigError>
    where
        F: VirtualFileSystem + 'static,
    {
        config.validate()?;

        let cache = Arc::new(MemoryResolutionCache::new(config.capacity()?));
        let chain = ProviderChain::new()
            .with_provider(StaticFileProvider::new(
                ExtensionFilter::new(config.static_extensions.iter().cloned()),
                files,
                Arc::clone(&cache),
            ))
            .with_provider(DynamicPageProvider::new(
                ExtensionFilter::new(config.dynamic_extensions.iter().cloned()),
                executor,
            ));

        Ok((chain, cache))
    }
}
