//! The Execution driver (§4.10): binds caller-owned output destinations to a
//! prepared kernel's results, scanning every output for capacity sufficiency
//! before reconciling any (possibly dynamic) output shape.

use nnrt_backend::CompiledKernel;
use nnrt_core::{NnrtResult, NnrtStatus, Tensor, TensorDesc, TensorRole};

/// A caller-owned output destination: the descriptor the caller expects back,
/// and the byte capacity it has reserved to receive it.
pub struct OutputBinding {
    pub desc: TensorDesc,
    pub capacity: usize,
}

impl OutputBinding {
    pub fn new(desc: TensorDesc, capacity: usize) -> Self {
        Self { desc, capacity }
    }
}

/// Runs `kernel` against `inputs`, binding its results against `bindings` in
/// order. Every binding's capacity is scanned for sufficiency before any
/// output is mutated, so a caller sees every insufficient index in one pass
/// rather than failing on the first.
pub fn execute(kernel: &dyn CompiledKernel, inputs: &[Tensor], bindings: &[OutputBinding]) -> NnrtResult<Vec<Tensor>> {
    // Step 1 (§4.10): conceptually convert every input/output to an IOTensor
    // view at the backend boundary; logged here since this driver's kernel
    // trait takes owned `Tensor`s directly rather than raw IOTensor buffers.
    for input in inputs {
        let _ = input.convert_to_io_tensor();
    }

    let produced = kernel.execute(inputs)?;

    if produced.len() != bindings.len() {
        log::error!(
            "Executor::execute: kernel produced {} outputs, {} bindings were supplied.",
            produced.len(),
            bindings.len()
        );
        return Err(NnrtStatus::Failed);
    }

    let mut any_insufficient = false;
    for (i, (out, binding)) in produced.iter().zip(bindings).enumerate() {
        let needed = out.buffer().map(|b| b.len()).unwrap_or(0);
        if needed > binding.capacity {
            log::error!(
                "Executor::execute: output {} needs {} bytes, binding capacity is {}.",
                i,
                needed,
                binding.capacity
            );
            any_insufficient = true;
        }
    }
    if any_insufficient {
        return Err(NnrtStatus::Failed);
    }

    let mut outputs = Vec::with_capacity(produced.len());
    for (produced_tensor, binding) in produced.into_iter().zip(bindings) {
        let mut out = Tensor::new(binding.desc.clone(), TensorRole::Tensor);
        out.set_dimensions(produced_tensor.desc().shape().to_vec())?;
        if let Some(buf) = produced_tensor.buffer() {
            out.set_buffer(buf.to_vec())?;
        }
        outputs.push(out);
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nnrt_backend::{Backend, CpuReferenceBackend};
    use nnrt_core::{DataType, LiteGraph, LiteGraphNode, OperatorType, Primitive, QuantMode, SubGraph};

    fn f32_tensor(shape: Vec<i32>, values: &[f32]) -> Tensor {
        let desc = TensorDesc::new(DataType::Float32, shape).unwrap();
        let mut t = Tensor::new(desc, TensorRole::Tensor);
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        t.set_buffer(bytes).unwrap();
        t
    }

    fn relu_lite_graph() -> LiteGraph {
        LiteGraph {
            name: "NNR_Model".to_string(),
            tensors: vec![
                f32_tensor(vec![3], &[0.0, 0.0, 0.0]),
                f32_tensor(vec![3], &[0.0, 0.0, 0.0]),
            ],
            nodes: vec![LiteGraphNode {
                name: "Relu:0".to_string(),
                quant_type: QuantMode::None,
                input_indices: vec![0],
                output_indices: vec![1],
                primitive: Primitive::new(OperatorType::Relu, Vec::new()),
            }],
            sub_graph: SubGraph {
                name: "NNRt_SubGraph".to_string(),
                input_indices: vec![0],
                output_indices: vec![1],
                node_indices: vec![0],
            },
        }
    }

    #[test]
    fn execute_reconciles_output_shape_and_buffer() {
        let backend = CpuReferenceBackend::new();
        let graph = relu_lite_graph();
        let kernel = backend.compile(&graph).unwrap();

        let input = f32_tensor(vec![3], &[-2.0, 1.0, 5.0]);
        let binding = OutputBinding::new(TensorDesc::new(DataType::Float32, vec![-1]).unwrap(), 12);
        let outputs = execute(kernel.as_ref(), &[input], &[binding]).unwrap();

        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].desc().shape(), &[3]);
        assert_eq!(outputs[0].buffer().unwrap().len(), 12);
    }

    #[test]
    fn insufficient_capacity_fails_without_mutating_other_outputs() {
        let backend = CpuReferenceBackend::new();
        let graph = relu_lite_graph();
        let kernel = backend.compile(&graph).unwrap();

        let input = f32_tensor(vec![3], &[-2.0, 1.0, 5.0]);
        let binding = OutputBinding::new(TensorDesc::new(DataType::Float32, vec![-1]).unwrap(), 4);
        assert_eq!(
            execute(kernel.as_ref(), &[input], &[binding]),
            Err(NnrtStatus::Failed)
        );
    }

    #[test]
    fn output_count_mismatch_is_failed() {
        let backend = CpuReferenceBackend::new();
        let graph = relu_lite_graph();
        let kernel = backend.compile(&graph).unwrap();

        let input = f32_tensor(vec![3], &[-2.0, 1.0, 5.0]);
        assert_eq!(
            execute(kernel.as_ref(), &[input], &[]),
            Err(NnrtStatus::Failed)
        );
    }
}
