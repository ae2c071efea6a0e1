use std::io::{self, Write};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::provider::eligibility::ExtensionFilter;
use crate::provider::ContentProvider;
use crate::types::content_result::{
    ContentRequest, ContentResult, RequestContext, Resolution, ResolveError,
};
use crate::types::identifiers::{ProviderId, VirtualPath};

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Executable page not found: {0}")]
    NotFound(VirtualPath),
    #[error("Page execution failed: {0}")]
    Failed(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Host environment that runs executable pages.
pub trait PageExecutor: Send + Sync {
    /// Run the page at `path`, writing everything it renders to `output`.
    fn execute(
        &self,
        context: &RequestContext,
        path: &VirtualPath,
        output: &mut dyn Write,
    ) -> Result<(), ExecutionError>;
}

impl<E> PageExecutor for E
where
    E: Fn(&RequestContext, &VirtualPath, &mut dyn Write) -> Result<(), ExecutionError> + Send + Sync,
{
    fn execute(
        &self,
        context: &RequestContext,
        path: &VirtualPath,
        output: &mut dyn Write,
    ) -> Result<(), ExecutionError> {
        self(context, path, output)
    }
}

/// Executes pages and returns their output. Results are never cacheable.
pub struct DynamicPageProvider {
    filter: ExtensionFilter,
    executor: Arc<dyn PageExecutor>,
}

impl DynamicPageProvider {
    pub fn new(filter: ExtensionFilter, executor: Arc<dyn PageExecutor>) -> Self {
        Self { filter, executor }
    }

    /// Serves `.page`.
    pub fn with_default_extensions(executor: Arc<dyn PageExecutor>) -> Self {
        Self::new(ExtensionFilter::new([".page"]), executor)
    }
}

impl ContentProvider for DynamicPageProvider {
    fn id(&self) -> ProviderId {
        ProviderId::DYNAMIC_PAGE
    }

    fn resolve(&self, request: &ContentRequest<'_>) -> Result<Resolution, ResolveError> {
        let path = request.path();

        if !self.filter.accepts(path) {
            return Ok(Resolution::Abstained);
        }

        // Eligibility is settled by path shape, so every failure from here is fatal
        let load_failure = |reason: String| ResolveError::LoadFailure {
            path: path.clone(),
            reason,
        };

        let mut buffer = Vec::new();
        self.executor
            .execute(request.context(), path, &mut buffer)
            .map_err(|e| load_failure(e.to_string()))?;

        let content = String::from_utf8(buffer).map_err(|e| load_failure(e.to_string()))?;
        debug!(path = %path, bytes = content.len(), "Executed dynamic page");

        Ok(Resolution::Produced(ContentResult::uncacheable(content)))
    }
}
