//! Bridges a `Backend`'s string identity to the `i64` device/version identity
//! `nnrt-cache`'s sidecar schema expects, without making `nnrt-cache` depend
//! on `nnrt-backend`.

use nnrt_backend::Backend;
use nnrt_cache::CacheIdentity;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// A stable, nonzero `i64` derived from a backend's `device_id()` string.
/// Stands in for the reference runtime's process-wide numeric backend IDs,
/// which this crate doesn't model (§4.6's `backend_id` is opaque beyond
/// "stable and nonzero per process").
pub fn numeric_device_id(backend: &dyn Backend) -> i64 {
    let mut hasher = DefaultHasher::new();
    backend.device_id().hash(&mut hasher);
    let hashed = hasher.finish() as i64;
    if hashed == 0 {
        1
    } else {
        hashed.abs()
    }
}

pub struct BackendCacheIdentity<'a> {
    backend: &'a dyn Backend,
}

impl<'a> BackendCacheIdentity<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }
}

impl CacheIdentity for BackendCacheIdentity<'_> {
    fn device_id(&self) -> i64 {
        numeric_device_id(self.backend)
    }

    fn op_version(&self) -> i64 {
        self.backend.op_version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nnrt_backend::CpuReferenceBackend;

    #[test]
    fn numeric_device_id_is_stable_and_nonzero() {
        let backend = CpuReferenceBackend::new();
        let a = numeric_device_id(&backend);
        let b = numeric_device_id(&backend);
        assert_eq!(a, b);
        assert_ne!(a, 0);
    }
}
