//! Virtual-path content resolution with dependency-invalidated caching.
//!
//! `vpath-core` resolves a logical path to text by asking an ordered chain of
//! providers. Each provider either produces content or abstains; the first
//! one that produces wins. Static files are cached under a key derived from
//! the provider, the backing store and the path, and stay cached until the
//! store's dependency token for that file reports a change.

pub mod cache;
pub mod config;
pub mod provider;
pub mod types;
pub mod vfs;
