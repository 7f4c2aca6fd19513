//! Hand-built tensors, registries, and small graphs that every crate's test
//! suite otherwise re-derives inline. Kept deliberately small: a handful of
//! shapes and one canonical single-op graph cover the cases the downstream
//! suites actually exercise.

use nnrt_backend::CpuReferenceBackend;
use nnrt_core::{DataType, ModelGraph, OperatorRegistry, OperatorType, Tensor, TensorDesc, TensorRole};

/// A populated registry with every builder this workspace ships.
pub fn full_registry() -> OperatorRegistry {
    let mut registry = OperatorRegistry::new();
    nnrt_ops::register_all(&mut registry);
    registry
}

/// A backend that supports `Relu`/`Sigmoid`/`Add`/`Mul`/`Clip`.
pub fn reference_backend() -> CpuReferenceBackend {
    CpuReferenceBackend::new()
}

/// A `Float32` tensor of `shape` with `values` packed in as a little-endian
/// buffer. Panics (test-only) if `values.len()` doesn't match the shape's
/// element count.
pub fn f32_tensor(shape: Vec<i32>, values: &[f32]) -> Tensor {
    let desc = TensorDesc::new(DataType::Float32, shape).unwrap();
    let mut tensor = Tensor::new(desc, TensorRole::Tensor);
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    tensor.set_buffer(bytes).unwrap();
    tensor
}

/// An unbound `Float32` tensor of `shape`, role `Tensor`, no buffer set yet.
pub fn f32_tensor_template(shape: Vec<i32>) -> Tensor {
    Tensor::new(TensorDesc::new(DataType::Float32, shape).unwrap(), TensorRole::Tensor)
}

/// A single `Float32` `OpParameter` tensor carrying one scalar value, the
/// shape every scalar-parametric operator builder (`Clip`, `LeakyRelu`, ...)
/// expects its parameter tensors in.
pub fn scalar_param(value: f32) -> Tensor {
    let mut tensor = Tensor::new(TensorDesc::new(DataType::Float32, vec![1]).unwrap(), TensorRole::OpParameter);
    tensor.set_buffer(value.to_le_bytes().to_vec()).unwrap();
    tensor
}

/// A built, single-`Relu` model graph over a fixed `[3]` shape: the smallest
/// graph that exercises `ModelGraph::build` end to end, used by every crate
/// downstream of `nnrt-core` that needs *a* built graph rather than one
/// tailored to a specific operator.
pub fn single_relu_graph() -> ModelGraph {
    let registry = full_registry();
    let mut graph = ModelGraph::new();
    let input = graph
        .add_tensor(TensorDesc::new(DataType::Float32, vec![3]).unwrap(), TensorRole::Tensor)
        .unwrap();
    let output = graph
        .add_tensor(TensorDesc::new(DataType::Float32, vec![3]).unwrap(), TensorRole::Tensor)
        .unwrap();
    graph
        .add_operation(OperatorType::Relu, vec![], vec![input], vec![output], &registry)
        .unwrap();
    graph.specify_inputs_and_outputs(vec![input], vec![output]).unwrap();
    graph.build().unwrap();
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_relu_graph_is_built() {
        let graph = single_relu_graph();
        assert!(graph.is_built());
        let lite = graph.lite_graph().unwrap();
        assert_eq!(lite.nodes.len(), 1);
    }

    #[test]
    fn full_registry_is_non_empty() {
        assert!(full_registry().len() > 0);
    }
}
