use std::io::Read;

use chrono::Utc;
use tracing::debug;

use crate::cache::{CacheEntry, ResolutionCache};
use crate::provider::eligibility::ExtensionFilter;
use crate::provider::ContentProvider;
use crate::types::content_result::{ContentRequest, ContentResult, Resolution, ResolveError};
use crate::types::identifiers::{CacheKey, ProviderId, VirtualPath};
use crate::vfs::{decode_text, VirtualFileSystem};

/// Serves content files verbatim from a virtual file system, caching each
/// body until the file's dependency token reports a change.
pub struct StaticFileProvider<F, C> {
    filter: ExtensionFilter,
    files: F,
    cache: C,
}

impl<F, C> StaticFileProvider<F, C>
where
    F: VirtualFileSystem,
    C: ResolutionCache,
{
    pub fn new(filter: ExtensionFilter, files: F, cache: C) -> Self {
        Self {
            filter,
            files,
            cache,
        }
    }

    /// Serves `.html` and `.htm`.
    pub fn with_default_extensions(files: F, cache: C) -> Self {
        Self::new(ExtensionFilter::new([".html", ".htm"]), files, cache)
    }

    pub fn cache_key(&self, path: &VirtualPath) -> CacheKey {
        CacheKey::derive(ProviderId::STATIC_FILE, self.files.identity(), path)
    }

    fn read(&self, path: &VirtualPath) -> Result<String, ResolveError> {
        let load_failure = |reason: String| ResolveError::LoadFailure {
            path: path.clone(),
            reason,
        };

        let mut raw = Vec::new();
        self.files
            .open(path)
            .and_then(|mut reader| reader.read_to_end(&mut raw))
            .map_err(|e| load_failure(e.to_string()))?;

        decode_text(raw).map_err(|e| load_failure(e.to_string()))
    }
}

impl<F, C> ContentProvider for StaticFileProvider<F, C>
where
    F: VirtualFileSystem,
    C: ResolutionCache,
{
    fn id(&self) -> ProviderId {
        ProviderId::STATIC_FILE
    }

    fn resolve(&self, request: &ContentRequest<'_>) -> Result<Resolution, ResolveError> {
        let path = request.path();

        if !self.filter.accepts(path) {
            return Ok(Resolution::Abstained);
        }

        if !self.files.exists(path) {
            debug!(path = %path, "Static file not found, abstaining");
            return Ok(Resolution::Abstained);
        }

        let key = self.cache_key(path);

        if let Some(entry) = self.cache.get(&key) {
            // Keys are lossy; only the stored path proves the entry is ours
            if entry.source_path == *path {
                debug!(path = %path, key = %key, "Static file cache hit");
                return Ok(Resolution::Produced(ContentResult::cacheable(
                    entry.content.clone(),
                    entry.dependency.clone(),
                    key,
                )));
            }
            debug!(
                path = %path,
                key = %key,
                cached_path = %entry.source_path,
                "Cache key collision, treating as miss"
            );
        } else {
            debug!(path = %path, key = %key, "Static file cache miss");
        }

        // Token before the read: a write racing the read must invalidate the entry
        let dependency = self.files.dependency_token(path, Utc::now());
        let content = self.read(path)?;

        let entry = CacheEntry {
            source_path: path.clone(),
            content: content.clone(),
            dependency: dependency.clone(),
        };
        self.cache.put(key.clone(), entry, dependency.clone());

        Ok(Resolution::Produced(ContentResult::cacheable(content, dependency, key)))
    }
}
