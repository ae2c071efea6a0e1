use std::fmt;
use std::sync::Arc;

/// A condition under which cached content stops being valid.
///
/// Implemented by backing stores. The resolution pipeline only hands tokens
/// around; cache stores poll them to decide eviction.
pub trait Dependency: Send + Sync {
    /// True once the watched resource differs from when the token was issued.
    fn has_changed(&self) -> bool;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

/// Opaque, cheaply cloneable handle to a [`Dependency`].
#[derive(Clone)]
pub struct DependencyToken(Arc<dyn Dependency>);

impl DependencyToken {
    pub fn new<D: Dependency + 'static>(dependency: D) -> Self {
        DependencyToken(Arc::new(dependency))
    }

    pub fn has_changed(&self) -> bool {
        self.0.has_changed()
    }

    /// Whether both handles point at the same issued token.
    pub fn same_as(&self, other: &DependencyToken) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for DependencyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DependencyToken")
            .field(&self.0.describe())
            .finish()
    }
}

/// A dependency that never changes. For content with no backing resource.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unchanging;

impl Dependency for Unchanging {
    fn has_changed(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        "unchanging".to_string()
    }
}
