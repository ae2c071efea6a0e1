pub mod dependency;
pub(crate) mod lock;
pub mod memory;
pub mod store;

pub use dependency::{Dependency, DependencyToken, Unchanging};
pub use memory::MemoryResolutionCache;
pub use store::{CacheEntry, ResolutionCache};
