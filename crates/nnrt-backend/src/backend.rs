//! The `Backend` contract (component F): something that can report which
//! operators it supports and compile a `LiteGraph` into an executable kernel.

use nnrt_core::{LiteGraph, NnrtResult, SupportedOperationsQuery, Tensor};

/// A compiled, backend-owned executable form of one `LiteGraph`.
pub trait CompiledKernel: Send + Sync {
    /// Runs the kernel against `inputs`, in the same order as the owning
    /// graph's subgraph input indices, and returns outputs in output-index order.
    fn execute(&self, inputs: &[Tensor]) -> NnrtResult<Vec<Tensor>>;

    /// The kernel's own cacheable byte buffers, handed to `CompiledCache::save`
    /// by the compiler driver. Empty by default: a backend that cannot
    /// serialize its compiled form simply produces nothing to cache, and the
    /// next restore attempt degrades to a recompile.
    fn to_cache_buffers(&self) -> Vec<Vec<u8>> {
        Vec::new()
    }
}

/// An execution target: CPU reference, an accelerator, or an OEM extension's
/// device. Concrete accelerator backends are out of scope for this runtime;
/// this trait is the seam a deployment plugs them into.
pub trait Backend: Send + Sync {
    /// Human-readable backend name (e.g. `"cpu-reference"`).
    fn name(&self) -> &str;

    /// Stable identifier used as the `BackendRegistry` key.
    fn device_id(&self) -> &str;

    /// One entry per node in `graph.nodes`, `true` iff this backend can
    /// execute that node's operator.
    fn get_supported_operations(&self, graph: &LiteGraph) -> Vec<bool>;

    /// Compiles every node in `graph` into one executable kernel. Callers are
    /// expected to have checked `get_supported_operations` first; a backend
    /// given an unsupported graph fails the whole compile rather than
    /// partially lowering it.
    fn compile(&self, graph: &LiteGraph) -> NnrtResult<Box<dyn CompiledKernel>>;

    /// A version tag for this backend's compiled-artifact format, stored in
    /// and checked against a cache sidecar's `opVersion` field.
    fn op_version(&self) -> i64 {
        1
    }

    /// Attempts to reconstruct a kernel from a previously cached buffer set
    /// without recompiling `graph`. Returns `(kernel, needs_recompile)`; a
    /// backend unable to restore from cache bytes returns `needs_recompile =
    /// true` and falls back to a fresh `compile`, which the compiler driver
    /// treats exactly like a cache miss.
    fn prepare_from_cache(
        &self,
        _buffers: &[Vec<u8>],
        graph: &LiteGraph,
    ) -> NnrtResult<(Box<dyn CompiledKernel>, bool)> {
        Ok((self.compile(graph)?, true))
    }
}

/// Bridges `Backend::get_supported_operations` to `ModelGraph`'s decoupled
/// query seam, so `ModelGraph::get_supported_operations` can take any
/// `&dyn Backend` directly.
impl SupportedOperationsQuery for dyn Backend {
    fn get_supported_operations(&self, graph: &LiteGraph) -> Vec<bool> {
        Backend::get_supported_operations(self, graph)
    }
}
