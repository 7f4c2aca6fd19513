//! The Compiler driver (§4.9): attempts a cache restore, falls through to a
//! fresh compile on any miss, and writes the freshly compiled artifact back
//! to the cache.

use crate::cache_identity::{numeric_device_id, BackendCacheIdentity};
use crate::config::CompileConfig;
use nnrt_backend::{Backend, CompiledKernel};
use nnrt_core::{ModelGraph, NnrtResult, NnrtStatus, TensorDesc};
use nnrt_cache::CompiledCache;

/// The output of compilation: a runnable kernel plus the graph's I/O tensor
/// descriptors, which an `Executor` needs to validate bindings against.
pub struct PreparedArtifact {
    pub kernel: Box<dyn CompiledKernel>,
    pub input_descs: Vec<TensorDesc>,
    pub output_descs: Vec<TensorDesc>,
    /// `true` if this artifact was reconstructed from an on-disk cache rather
    /// than freshly compiled.
    pub from_cache: bool,
}

const CACHE_MODEL_NAME: &str = "model";

/// Drives `graph` through `backend`, consulting the cache described by
/// `config` first. `graph` must already be built (`ModelGraph::build` or
/// `build_from_lite_graph` called).
pub fn compile(graph: &ModelGraph, config: &CompileConfig, backend: &dyn Backend) -> NnrtResult<PreparedArtifact> {
    let lite_graph = graph.lite_graph()?;

    let (kernel, from_cache) = if config.cache_enabled() {
        let dir = config.cache_dir.as_ref().unwrap();
        let version = config.version.unwrap();
        match CompiledCache::restore(dir, CACHE_MODEL_NAME, version, numeric_device_id(backend)) {
            Ok(restored) => {
                let buffers: Vec<Vec<u8>> = (0..restored.len()).map(|i| restored.buffer(i).to_vec()).collect();
                let (kernel, needs_recompile) = backend.prepare_from_cache(&buffers, lite_graph)?;
                if needs_recompile {
                    log::info!("compiler: cache restore reported needs_recompile, recompiling.");
                    (backend.compile(lite_graph)?, false)
                } else {
                    (kernel, true)
                }
            }
            Err(NnrtStatus::InvalidFile) | Err(NnrtStatus::OperationForbidden) => {
                log::info!("compiler: cache miss, compiling fresh.");
                (backend.compile(lite_graph)?, false)
            }
            Err(other) => return Err(other),
        }
    } else {
        (backend.compile(lite_graph)?, false)
    };

    if config.cache_enabled() && !from_cache {
        let dir = config.cache_dir.as_ref().unwrap();
        let version = config.version.unwrap();
        let buffers = kernel.to_cache_buffers();
        if !buffers.is_empty() {
            let identity = BackendCacheIdentity::new(backend);
            if let Err(e) = CompiledCache::save(&buffers, dir, CACHE_MODEL_NAME, version, &identity) {
                log::warn!("compiler: failed to save compiled cache: {}.", e);
            }
        }
    }

    let input_descs = lite_graph
        .sub_graph
        .input_indices
        .iter()
        .map(|&i| lite_graph.tensors[i].desc().clone())
        .collect();
    let output_descs = lite_graph
        .sub_graph
        .output_indices
        .iter()
        .map(|&i| lite_graph.tensors[i].desc().clone())
        .collect();

    Ok(PreparedArtifact { kernel, input_descs, output_descs, from_cache })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nnrt_backend::CpuReferenceBackend;
    use nnrt_core::{DataType, OperatorRegistry, OperatorType, Tensor, TensorRole};
    use nnrt_ops::register_all;

    fn relu_graph() -> ModelGraph {
        let mut registry = OperatorRegistry::new();
        register_all(&mut registry);

        let mut graph = ModelGraph::new();
        let x = graph
            .add_tensor(TensorDesc::new(DataType::Float32, vec![3]).unwrap(), TensorRole::Tensor)
            .unwrap();
        let y = graph
            .add_tensor(TensorDesc::new(DataType::Float32, vec![3]).unwrap(), TensorRole::Tensor)
            .unwrap();
        graph.add_operation(OperatorType::Relu, vec![], vec![x], vec![y], &registry).unwrap();
        graph.specify_inputs_and_outputs(vec![x], vec![y]).unwrap();
        graph.build().unwrap();
        graph
    }

    fn bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn compiles_without_cache_configured() {
        let graph = relu_graph();
        let backend = CpuReferenceBackend::new();
        let config = CompileConfig::default();
        let artifact = compile(&graph, &config, &backend).unwrap();
        assert!(!artifact.from_cache);
        assert_eq!(artifact.input_descs.len(), 1);
        assert_eq!(artifact.output_descs.len(), 1);

        let mut input = Tensor::new(TensorDesc::new(DataType::Float32, vec![3]).unwrap(), TensorRole::Tensor);
        input.set_buffer(bytes(&[-1.0, 0.0, 2.0])).unwrap();
        let outputs = artifact.kernel.execute(&[input]).unwrap();
        assert_eq!(outputs.len(), 1);
    }

    #[test]
    fn cache_miss_falls_through_to_compile() {
        let graph = relu_graph();
        let backend = CpuReferenceBackend::new();
        let dir = std::env::temp_dir().join(format!("nnrt-compiler-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let config = CompileConfig {
            cache_dir: Some(dir),
            version: Some(1),
            ..Default::default()
        };
        let artifact = compile(&graph, &config, &backend).unwrap();
        assert!(!artifact.from_cache);
    }
}
