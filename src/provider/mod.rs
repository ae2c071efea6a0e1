pub mod dynamic_page;
pub mod eligibility;
pub mod static_file;

use std::sync::Arc;

use tracing::debug;

use crate::types::content_result::{
    ContentRequest, ContentResult, RequestContext, Resolution, ResolveError,
};
use crate::types::identifiers::ProviderId;

pub use dynamic_page::{DynamicPageProvider, ExecutionError, PageExecutor};
pub use eligibility::ExtensionFilter;
pub use static_file::StaticFileProvider;

/// Turns a request into content, or declines it.
///
/// `Ok(Resolution::Abstained)` means the request is not this provider's to
/// handle. `Err` means the provider took the request and could not finish it.
pub trait ContentProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    fn resolve(&self, request: &ContentRequest<'_>) -> Result<Resolution, ResolveError>;
}

/// Ask `providers` in order; the first one that does not abstain wins.
///
/// Returns `Ok(None)` when every provider abstains. Errors are returned as-is,
/// without trying later providers.
pub fn resolve_chain(
    providers: &[Arc<dyn ContentProvider>],
    request: &ContentRequest<'_>,
) -> Result<Option<ContentResult>, ResolveError> {
    for provider in providers {
        match provider.resolve(request)? {
            Resolution::Produced(result) => {
                return Ok(Some(result.produced_by_provider(provider.id())));
            }
            Resolution::Abstained => {
                debug!(provider = %provider.id(), path = %request.path(), "Provider abstained");
            }
        }
    }
    Ok(None)
}

/// Ordered set of providers. Registration order is priority order.
#[derive(Clone, Default)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn ContentProvider>>,
}

impl ProviderChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: impl ContentProvider + 'static) -> Self {
        self.register(Arc::new(provider));
        self
    }

    pub fn register(&mut self, provider: Arc<dyn ContentProvider>) {
        self.providers.push(provider);
    }

    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Entry point for the hosting framework.
    ///
    /// A missing context or malformed path fails with `InvalidArgument` before
    /// any provider is consulted.
    pub fn resolve(
        &self,
        context: Option<&RequestContext>,
        virtual_path: &str,
    ) -> Result<Option<ContentResult>, ResolveError> {
        let request = ContentRequest::new(context, virtual_path)?;
        self.resolve_request(&request)
    }

    pub fn resolve_request(
        &self,
        request: &ContentRequest<'_>,
    ) -> Result<Option<ContentResult>, ResolveError> {
        resolve_chain(&self.providers, request)
    }
}
