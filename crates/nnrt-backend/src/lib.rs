//! Backend trait, the process-wide backend registry, extension-loading seam,
//! and a CPU reference backend for tests.

pub mod backend;
pub mod extension;
pub mod reference;
pub mod registry;

pub use backend::{Backend, CompiledKernel};
pub use extension::{ExtensionLoader, NoopExtensionLoader};
pub use reference::CpuReferenceBackend;
pub use registry::BackendRegistry;
