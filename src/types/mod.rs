pub mod content_result;
pub mod identifiers;

pub use content_result::{ContentRequest, ContentResult, RequestContext, Resolution, ResolveError};
pub use identifiers::{CacheKey, ProviderId, VirtualPath, VirtualPathError};
