//! Extension loading: the seam where an OEM could plug in a device-specific
//! backend without this runtime's core knowing about it ahead of time.
//!
//! Stands in for the reference implementation's dlopen-based discovery of
//! OEM extension libraries; loading arbitrary shared objects at runtime has
//! no safe, idiomatic Rust equivalent, so this runtime exposes the seam as a
//! trait instead and ships a no-op default.

use crate::backend::Backend;
use std::sync::Arc;

/// Discovers additional backends beyond the ones registered directly by the
/// embedding application.
pub trait ExtensionLoader: Send + Sync {
    /// Backends to register, in the order they should be tried.
    fn discover(&self) -> Vec<Arc<dyn Backend>> {
        Vec::new()
    }
}

/// Discovers nothing. The default when an embedder configures no extension
/// mechanism of its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopExtensionLoader;

impl ExtensionLoader for NoopExtensionLoader {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_loader_discovers_nothing() {
        assert!(NoopExtensionLoader.discover().is_empty());
    }
}
