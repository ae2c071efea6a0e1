use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::cache::DependencyToken;
use crate::types::identifiers::{CacheKey, ProviderId, VirtualPath, VirtualPathError};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to load {path}: {reason}")]
    LoadFailure { path: VirtualPath, reason: String },
}

impl From<VirtualPathError> for ResolveError {
    fn from(err: VirtualPathError) -> Self {
        ResolveError::InvalidArgument(err.to_string())
    }
}

/// Per-request state handed in by the hosting framework.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub received_at: DateTime<Utc>,
    /// Free-form values the host wants visible to page execution.
    pub items: BTreeMap<String, String>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            received_at: Utc::now(),
            items: BTreeMap::new(),
        }
    }

    pub fn with_item(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.items.insert(key.into(), value.into());
        self
    }
}

/// A validated content request: a context is present and the path is normalized.
#[derive(Debug, Clone)]
pub struct ContentRequest<'a> {
    context: &'a RequestContext,
    path: VirtualPath,
}

impl<'a> ContentRequest<'a> {
    pub fn new(context: Option<&'a RequestContext>, virtual_path: &str) -> Result<Self, ResolveError> {
        let context = context.ok_or_else(|| {
            ResolveError::InvalidArgument("request context is required".to_string())
        })?;
        let path = VirtualPath::parse(virtual_path)?;
        Ok(Self { context, path })
    }

    pub fn context(&self) -> &'a RequestContext {
        self.context
    }

    pub fn path(&self) -> &VirtualPath {
        &self.path
    }
}

#[derive(Clone)]
struct CacheBinding {
    dependency: DependencyToken,
    key: CacheKey,
}

/// Resolved content plus what a caller needs to cache it.
///
/// A cacheable result always carries both a dependency token and a cache key;
/// an uncacheable one carries neither.
#[derive(Clone)]
pub struct ContentResult {
    content: String,
    caching: Option<CacheBinding>,
    produced_by: Option<ProviderId>,
}

impl ContentResult {
    pub fn uncacheable(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            caching: None,
            produced_by: None,
        }
    }

    pub fn cacheable(content: impl Into<String>, dependency: DependencyToken, key: CacheKey) -> Self {
        Self {
            content: content.into(),
            caching: Some(CacheBinding { dependency, key }),
            produced_by: None,
        }
    }

    pub(crate) fn produced_by_provider(mut self, provider: ProviderId) -> Self {
        self.produced_by = Some(provider);
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_cacheable(&self) -> bool {
        self.caching.is_some()
    }

    pub fn dependency_token(&self) -> Option<&DependencyToken> {
        self.caching.as_ref().map(|c| &c.dependency)
    }

    pub fn cache_key(&self) -> Option<&CacheKey> {
        self.caching.as_ref().map(|c| &c.key)
    }

    /// Set by the chain that returned this result.
    pub fn produced_by(&self) -> Option<ProviderId> {
        self.produced_by
    }
}

impl fmt::Debug for ContentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentResult")
            .field("content", &self.content)
            .field("cacheable", &self.is_cacheable())
            .field("cache_key", &self.cache_key())
            .field("dependency_token", &self.dependency_token())
            .field("produced_by", &self.produced_by)
            .finish()
    }
}

/// Outcome of asking a single provider. Failures travel as `Err(ResolveError)`.
#[derive(Debug, Clone)]
pub enum Resolution {
    Produced(ContentResult),
    Abstained,
}
