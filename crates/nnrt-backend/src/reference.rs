//! A small CPU interpreter over `LiteGraph`, used as the backend integration
//! tests and `nnrt-compiler`'s doctests compile against. Not a performance
//! backend: every tensor is read and written as a flat `f32` buffer.
//!
//! Supports the operators whose semantics don't depend on a wire-format
//! payload (`Relu`, `Sigmoid`, `Add`, `Mul`), plus `Clip`, whose two scalar
//! bounds a builder encodes into the primitive payload as two little-endian
//! `f32`s (min then max) — the one concrete payload convention this runtime
//! defines, since `Clip`'s bounds are consumed as `OpParameter` tensors at
//! build time and are gone from the lowered graph's tensor list.

use crate::backend::{Backend, CompiledKernel};
use nnrt_core::{LiteGraph, NnrtResult, NnrtStatus, OperatorType, Tensor, TensorRole};

fn supports(op_type: OperatorType) -> bool {
    matches!(
        op_type,
        OperatorType::Relu | OperatorType::Sigmoid | OperatorType::Add | OperatorType::Mul | OperatorType::Clip
    )
}

fn read_f32(tensor: &Tensor) -> NnrtResult<Vec<f32>> {
    let buf = tensor.buffer().ok_or(NnrtStatus::InvalidParameter)?;
    if buf.len() % 4 != 0 {
        return Err(NnrtStatus::InvalidParameter);
    }
    Ok(buf
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn write_f32(template: &Tensor, values: &[f32]) -> NnrtResult<Tensor> {
    let mut tensor = Tensor::new(template.desc().clone(), TensorRole::Tensor);
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    tensor.set_buffer(bytes)?;
    Ok(tensor)
}

/// A CPU backend that directly interprets the handful of operators above.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuReferenceBackend;

impl CpuReferenceBackend {
    pub fn new() -> Self {
        CpuReferenceBackend
    }
}

impl Backend for CpuReferenceBackend {
    fn name(&self) -> &str {
        "CPU reference interpreter"
    }

    fn device_id(&self) -> &str {
        "cpu-reference"
    }

    fn get_supported_operations(&self, graph: &LiteGraph) -> Vec<bool> {
        graph.nodes.iter().map(|n| supports(n.primitive.op_type())).collect()
    }

    fn compile(&self, graph: &LiteGraph) -> NnrtResult<Box<dyn CompiledKernel>> {
        if self.get_supported_operations(graph).iter().any(|&ok| !ok) {
            log::error!("CpuReferenceBackend::compile: graph contains an unsupported operator.");
            return Err(NnrtStatus::Failed);
        }
        Ok(Box::new(CpuReferenceKernel { graph: graph.clone() }))
    }
}

struct CpuReferenceKernel {
    graph: LiteGraph,
}

impl CompiledKernel for CpuReferenceKernel {
    fn execute(&self, inputs: &[Tensor]) -> NnrtResult<Vec<Tensor>> {
        let sub_graph = &self.graph.sub_graph;
        if inputs.len() != sub_graph.input_indices.len() {
            log::error!("CpuReferenceKernel::execute: input count mismatch.");
            return Err(NnrtStatus::InvalidParameter);
        }

        let mut working: Vec<Tensor> = self.graph.tensors.clone();
        for (&idx, input) in sub_graph.input_indices.iter().zip(inputs) {
            working[idx] = input.clone();
        }

        for &node_idx in &sub_graph.node_indices {
            let node = &self.graph.nodes[node_idx];
            let op_type = node.primitive.op_type();
            let output = match op_type {
                OperatorType::Relu => {
                    let a = read_f32(&working[node.input_indices[0]])?;
                    let out: Vec<f32> = a.iter().map(|&v| v.max(0.0)).collect();
                    write_f32(&working[node.input_indices[0]], &out)?
                }
                OperatorType::Sigmoid => {
                    let a = read_f32(&working[node.input_indices[0]])?;
                    let out: Vec<f32> = a.iter().map(|&v| 1.0 / (1.0 + (-v).exp())).collect();
                    write_f32(&working[node.input_indices[0]], &out)?
                }
                OperatorType::Add => {
                    let a = read_f32(&working[node.input_indices[0]])?;
                    let b = read_f32(&working[node.input_indices[1]])?;
                    let out: Vec<f32> = a.iter().zip(&b).map(|(&x, &y)| x + y).collect();
                    write_f32(&working[node.input_indices[0]], &out)?
                }
                OperatorType::Mul => {
                    let a = read_f32(&working[node.input_indices[0]])?;
                    let b = read_f32(&working[node.input_indices[1]])?;
                    let out: Vec<f32> = a.iter().zip(&b).map(|(&x, &y)| x * y).collect();
                    write_f32(&working[node.input_indices[0]], &out)?
                }
                OperatorType::Clip => {
                    let payload = node.primitive.payload();
                    if payload.len() != 8 {
                        log::error!("CpuReferenceKernel: Clip primitive payload must be 8 bytes.");
                        return Err(NnrtStatus::InvalidParameter);
                    }
                    let min = f32::from_le_bytes(payload[0..4].try_into().unwrap());
                    let max = f32::from_le_bytes(payload[4..8].try_into().unwrap());
                    let a = read_f32(&working[node.input_indices[0]])?;
                    let out: Vec<f32> = a.iter().map(|&v| v.clamp(min, max)).collect();
                    write_f32(&working[node.input_indices[0]], &out)?
                }
                other => {
                    log::error!("CpuReferenceKernel: operator {:?} unsupported.", other);
                    return Err(NnrtStatus::Failed);
                }
            };
            working[node.output_indices[0]] = output;
        }

        Ok(sub_graph.output_indices.iter().map(|&idx| working[idx].clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nnrt_core::{DataType, LiteGraphNode, OperatorType, Primitive, QuantMode, SubGraph, Tensor, TensorDesc};

    fn f32_tensor(shape: Vec<i32>, values: &[f32]) -> Tensor {
        let desc = TensorDesc::new(DataType::Float32, shape).unwrap();
        let mut t = Tensor::new(desc, TensorRole::Tensor);
        let mut bytes = Vec::new();
        for v in values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        t.set_buffer(bytes).unwrap();
        t
    }

    fn single_relu_graph() -> LiteGraph {
        let input = f32_tensor(vec![3], &[-1.0, 0.0, 2.0]);
        let output = f32_tensor(vec![3], &[0.0, 0.0, 0.0]);
        LiteGraph {
            name: "NNR_Model".to_string(),
            tensors: vec![input, output],
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
    fn relu_executes_elementwise_max_with_zero() {
        let backend = CpuReferenceBackend::new();
        let graph = single_relu_graph();
        assert!(backend.get_supported_operations(&graph).iter().all(|&ok| ok));
        let kernel = backend.compile(&graph).unwrap();
        let input = f32_tensor(vec![3], &[-5.0, 0.0, 7.0]);
        let outputs = kernel.execute(&[input]).unwrap();
        assert_eq!(read_f32(&outputs[0]).unwrap(), vec![0.0, 0.0, 7.0]);
    }

    #[test]
    fn unsupported_operator_fails_compile() {
        let backend = CpuReferenceBackend::new();
        let mut graph = single_relu_graph();
        graph.nodes[0].primitive = Primitive::new(OperatorType::Lstm, Vec::new());
        assert_eq!(backend.compile(&graph).err(), Some(NnrtStatus::Failed));
    }

    #[test]
    fn clip_reads_bounds_from_primitive_payload() {
        let backend = CpuReferenceBackend::new();
        let mut graph = single_relu_graph();
        let mut payload = Vec::new();
        payload.extend_from_slice(&0.0f32.to_le_bytes());
        payload.extend_from_slice(&3.0f32.to_le_bytes());
        graph.nodes[0].primitive = Primitive::new(OperatorType::Clip, payload);
        let kernel = backend.compile(&graph).unwrap();
        let input = f32_tensor(vec![3], &[-2.0, 1.0, 9.0]);
        let outputs = kernel.execute(&[input]).unwrap();
        assert_eq!(read_f32(&outputs[0]).unwrap(), vec![0.0, 1.0, 3.0]);
    }
}
