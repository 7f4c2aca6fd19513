//! LiteGraph: the backend-neutral lowered form a Model Graph emits.

use crate::operator::QuantMode;
use crate::primitive::Primitive;
use crate::tensor::Tensor;

/// One lowered operator: a remapped name, its quant tag, remapped I/O indices
/// into the owning `LiteGraph`'s tensor list, and its opaque primitive.
#[derive(Debug, Clone)]
pub struct LiteGraphNode {
    pub name: String,
    pub quant_type: QuantMode,
    pub input_indices: Vec<usize>,
    pub output_indices: Vec<usize>,
    pub primitive: Primitive,
}

/// A single subgraph: the node ordering plus the graph-level I/O indices.
#[derive(Debug, Clone)]
pub struct SubGraph {
    pub name: String,
    pub input_indices: Vec<usize>,
    pub output_indices: Vec<usize>,
    /// Node indices in insertion order, i.e. `0..node_count`.
    pub node_indices: Vec<usize>,
}

/// The backend-neutral lowered IR: non-parameter tensors in a remapped index
/// space, the node list, and a single subgraph. Exclusively owns its tensors
/// and primitive blobs.
#[derive(Debug, Clone)]
pub struct LiteGraph {
    pub name: String,
    pub tensors: Vec<Tensor>,
    pub nodes: Vec<LiteGraphNode>,
    pub sub_graph: SubGraph,
}

impl LiteGraph {
    pub fn input_tensors(&self) -> impl Iterator<Item = &Tensor> {
        self.sub_graph
            .input_indices
            .iter()
            .filter_map(move |&idx| self.tensors.get(idx))
    }

    pub fn output_tensors(&self) -> impl Iterator<Item = &Tensor> {
        self.sub_graph
            .output_indices
            .iter()
            .filter_map(move |&idx| self.tensors.get(idx))
    }
}
