//! The Backend Registry (component G): a process-wide singleton mapping
//! device ids to registered backends, first-registration-wins.
//!
//! Mirrors the registry/builder shape used throughout this runtime's core
//! crate, but the instance itself lives behind a `OnceLock` rather than being
//! owned by a caller: backend registration happens once, near process start,
//! and every later compile/execute call needs to reach the same instance.

use crate::backend::Backend;
use nnrt_core::{NnrtResult, NnrtStatus};
use std::sync::{Arc, Mutex, OnceLock};

static GLOBAL: OnceLock<BackendRegistry> = OnceLock::new();

/// Mutex-guarded, insertion-order-tracked set of registered backends.
pub struct BackendRegistry {
    backends: Mutex<Vec<Arc<dyn Backend>>>,
}

impl BackendRegistry {
    fn new() -> Self {
        BackendRegistry {
            backends: Mutex::new(Vec::new()),
        }
    }

    /// The process-wide registry instance, lazily created on first access.
    pub fn global() -> &'static BackendRegistry {
        GLOBAL.get_or_init(BackendRegistry::new)
    }

    /// Registers `backend` under its `device_id()`. Fails with `Failed` if a
    /// backend is already registered under that device id; registration does
    /// not overwrite.
    pub fn register(&self, backend: Arc<dyn Backend>) -> NnrtResult<()> {
        let mut backends = self.backends.lock().expect("backend registry mutex poisoned");
        if backends.iter().any(|b| b.device_id() == backend.device_id()) {
            log::warn!(
                "BackendRegistry::register: device '{}' already registered.",
                backend.device_id()
            );
            return Err(NnrtStatus::Failed);
        }
        backends.push(backend);
        Ok(())
    }

    pub fn get(&self, device_id: &str) -> Option<Arc<dyn Backend>> {
        let backends = self.backends.lock().expect("backend registry mutex poisoned");
        backends.iter().find(|b| b.device_id() == device_id).cloned()
    }

    /// Looks a backend up by its stable nonzero numeric id, assigned in
    /// registration order starting at 1. Id `0` is an alias for the
    /// first-registered backend, matching the testable property that
    /// `GetBackend(0)` always resolves to whatever registered first.
    pub fn get_by_backend_id(&self, backend_id: usize) -> Option<Arc<dyn Backend>> {
        let backends = self.backends.lock().expect("backend registry mutex poisoned");
        if backend_id == 0 {
            return backends.first().cloned();
        }
        backends.get(backend_id - 1).cloned()
    }

    /// The stable nonzero numeric id that would be returned by
    /// `get_by_backend_id` for the backend registered under `device_id`, i.e.
    /// its 1-based registration order.
    pub fn backend_id_of(&self, device_id: &str) -> Option<usize> {
        let backends = self.backends.lock().expect("backend registry mutex poisoned");
        backends.iter().position(|b| b.device_id() == device_id).map(|i| i + 1)
    }

    pub fn list_device_ids(&self) -> Vec<String> {
        let backends = self.backends.lock().expect("backend registry mutex poisoned");
        backends.iter().map(|b| b.device_id().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.backends.lock().expect("backend registry mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::CpuReferenceBackend;

    #[test]
    fn registration_rejects_duplicate_device_id() {
        let registry = BackendRegistry::new();
        assert!(registry.register(Arc::new(CpuReferenceBackend::new())).is_ok());
        assert_eq!(
            registry.register(Arc::new(CpuReferenceBackend::new())),
            Err(NnrtStatus::Failed)
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregistered_device_id_is_none() {
        let registry = BackendRegistry::new();
        assert!(registry.get("does-not-exist").is_none());
    }

    #[test]
    fn get_backend_id_zero_aliases_first_registered() {
        let registry = BackendRegistry::new();
        registry.register(Arc::new(CpuReferenceBackend::new())).unwrap();
        let first = registry.get_by_backend_id(0).unwrap();
        assert_eq!(first.device_id(), "cpu-reference");
        assert_eq!(registry.backend_id_of("cpu-reference"), Some(1));
        assert_eq!(
            registry.get_by_backend_id(1).unwrap().device_id(),
            registry.get_by_backend_id(0).unwrap().device_id()
        );
    }

    #[test]
    fn get_backend_id_out_of_range_is_none() {
        let registry = BackendRegistry::new();
        registry.register(Arc::new(CpuReferenceBackend::new())).unwrap();
        assert!(registry.get_by_backend_id(2).is_none());
    }
}
