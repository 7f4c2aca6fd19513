//! Model Graph (InnerModel): owns tensors and operator builders, tracks I/O
//! indices, and lowers itself to a backend-neutral `LiteGraph`.
//!
//! State machine: `Empty`/`Defining` allow the mutating `add_*`/`specify_*`
//! calls; `Build` (or `build_from_lite_graph`/`build_from_meta_graph`, for a
//! caller-supplied externally-lowered graph) moves the model to `Built`, after
//! which every mutating call returns `OperationForbidden`.

use crate::error::{NnrtResult, NnrtStatus};
use crate::lite_graph::{LiteGraph, LiteGraphNode, SubGraph};
use crate::operator::{OperatorBuilder, OperatorRegistry, OperatorType};
use crate::tensor::{QuantizationParam, Tensor, TensorRole};
use crate::tensor_desc::TensorDesc;
use crate::validation::{validate_disjoint, validate_index_bounds};

const DEFAULT_MODEL_NAME: &str = "NNR_Model";
const SUB_GRAPH_NAME: &str = "NNRt_SubGraph";

/// Decouples `ModelGraph::get_supported_operations` from any concrete backend
/// type, the same way `nnrt-cache::CacheIdentity` keeps that crate from
/// depending on `nnrt-backend` directly. `nnrt-backend` implements this for
/// `dyn Backend`.
pub trait SupportedOperationsQuery {
    /// One entry per node in `graph.nodes`, `true` iff this backend can
    /// execute that node's operator.
    fn get_supported_operations(&self, graph: &LiteGraph) -> Vec<bool>;
}

/// Owns all tensors and operator builders for one model definition, and its
/// lowered form once built.
pub struct ModelGraph {
    tensors: Vec<Tensor>,
    operators: Vec<Box<dyn OperatorBuilder>>,
    input_indices: Vec<usize>,
    output_indices: Vec<usize>,
    io_specified: bool,
    name: String,
    profiling_enabled: bool,
    lite_graph: Option<LiteGraph>,
    built: bool,
}

impl ModelGraph {
    pub fn new() -> Self {
        ModelGraph {
            tensors: Vec::new(),
            operators: Vec::new(),
            input_indices: Vec::new(),
            output_indices: Vec::new(),
            io_specified: false,
            name: DEFAULT_MODEL_NAME.to_string(),
            profiling_enabled: false,
            lite_graph: None,
            built: false,
        }
    }

    pub fn set_profiling(&mut self, enabled: bool) {
        self.profiling_enabled = enabled;
    }

    pub fn profiling_enabled(&self) -> bool {
        self.profiling_enabled
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn tensors(&self) -> &[Tensor] {
        &self.tensors
    }

    /// Adds a tensor described by `desc`; auto-names it `"Tensor: <index>"` if it
    /// has no explicit name. Returns the tensor's index in this graph.
    pub fn add_tensor(&mut self, mut desc: TensorDesc, role: TensorRole) -> NnrtResult<usize> {
        self.reject_if_built()?;
        let index = self.tensors.len();
        if desc.name().is_none() {
            desc.set_name(format!("Tensor: {}", index));
        }
        self.tensors.push(Tensor::new(desc, role));
        Ok(index)
    }

    fn reject_if_built(&self) -> NnrtResult<()> {
        if self.built {
            log::error!("ModelGraph mutation rejected, graph already built.");
            return Err(NnrtStatus::OperationForbidden);
        }
        Ok(())
    }

    fn check_tensor_index(&self, index: usize) -> NnrtResult<()> {
        if index >= self.tensors.len() {
            log::error!("ModelGraph: tensor index {} out of bounds.", index);
            return Err(NnrtStatus::InvalidParameter);
        }
        Ok(())
    }

    pub fn set_tensor_value(&mut self, index: usize, data: Vec<u8>) -> NnrtResult<()> {
        self.reject_if_built()?;
        self.check_tensor_index(index)?;
        self.tensors[index].set_buffer(data)
    }

    pub fn set_tensor_quant_param(
        &mut self,
        index: usize,
        params: Vec<QuantizationParam>,
    ) -> NnrtResult<()> {
        self.reject_if_built()?;
        self.check_tensor_index(index)?;
        self.tensors[index].set_quant_params(params)
    }

    fn validate_io_indices(&self, inputs: &[usize], outputs: &[usize]) -> NnrtResult<()> {
        validate_index_bounds(inputs, self.tensors.len())?;
        validate_index_bounds(outputs, self.tensors.len())?;
        for &idx in inputs.iter().chain(outputs.iter()) {
            if self.tensors[idx].role() != TensorRole::Tensor {
                log::error!(
                    "ModelGraph: index {} refers to an OP_PARAMETER tensor, not allowed here.",
                    idx
                );
                return Err(NnrtStatus::InvalidParameter);
            }
        }
        validate_disjoint(inputs, outputs)?;
        Ok(())
    }

    /// Validates the operator's I/O, looks up its builder in `registry`, and
    /// invokes `Build`; appends the builder to this graph's operator list in
    /// call order on success.
    pub fn add_operation(
        &mut self,
        op_type: OperatorType,
        params: Vec<usize>,
        inputs: Vec<usize>,
        outputs: Vec<usize>,
        registry: &OperatorRegistry,
    ) -> NnrtResult<()> {
        self.reject_if_built()?;
        self.validate_io_indices(&inputs, &outputs)?;
        validate_index_bounds(&params, self.tensors.len())?;

        let mut builder = registry.get_ops_builder(op_type).ok_or_else(|| {
            log::error!("ModelGraph::add_operation: no builder registered for {:?}.", op_type);
            NnrtStatus::InvalidParameter
        })?;
        builder.build(&params, &inputs, &outputs, &self.tensors)?;
        self.operators.push(builder);
        Ok(())
    }

    /// May be called at most once; derives the graph-level input/output
    /// indices.
    pub fn specify_inputs_and_outputs(
        &mut self,
        inputs: Vec<usize>,
        outputs: Vec<usize>,
    ) -> NnrtResult<()> {
        self.reject_if_built()?;
        if self.io_specified {
            log::error!("ModelGraph::specify_inputs_and_outputs called more than once.");
            return Err(NnrtStatus::OperationForbidden);
        }
        self.validate_io_indices(&inputs, &outputs)?;
        self.input_indices = inputs;
        self.output_indices = outputs;
        self.io_specified = true;
        Ok(())
    }

    /// Lowers the ops-based definition into a `LiteGraph`: tensors with role
    /// `OpParameter` are excluded, producing a compact index space; each
    /// operator's primitive is emitted as a node named `<builder_name>:<index>`
    /// in insertion order; a single subgraph carries the remapped graph I/O.
    pub fn build(&mut self) -> NnrtResult<()> {
        self.reject_if_built()?;
        if self.tensors.is_empty() || self.operators.is_empty() || self.input_indices.is_empty()
            || self.output_indices.is_empty()
        {
            log::error!("ModelGraph::build failed precondition: empty tensors/operators/IO.");
            return Err(NnrtStatus::InvalidParameter);
        }

        let mut index_map: Vec<Option<usize>> = vec![None; self.tensors.len()];
        let mut kept_tensors = Vec::new();
        for (i, tensor) in self.tensors.iter().enumerate() {
            if tensor.role() == TensorRole::Tensor {
                index_map[i] = Some(kept_tensors.len());
                kept_tensors.push(tensor.clone());
            }
        }
        let remap = |indices: &[usize]| -> Vec<usize> {
            indices
                .iter()
                .filter_map(|&i| index_map[i])
                .collect()
        };

        let mut nodes = Vec::with_capacity(self.operators.len());
        for (i, op) in self.operators.iter().enumerate() {
            let primitive = op.get_primitive().ok_or_else(|| {
                log::error!("ModelGraph::build: operator {} produced a null primitive.", op.name());
                NnrtStatus::Failed
            })?;
            nodes.push(LiteGraphNode {
                name: format!("{}:{}", op.name(), i),
                quant_type: op.quant_type(),
                input_indices: remap(op.inputs()),
                output_indices: remap(op.outputs()),
                primitive,
            });
        }

        let node_indices = (0..nodes.len()).collect();
        let sub_graph = SubGraph {
            name: SUB_GRAPH_NAME.to_string(),
            input_indices: remap(&self.input_indices),
            output_indices: remap(&self.output_indices),
            node_indices,
        };

        self.lite_graph = Some(LiteGraph {
            name: self.name.clone(),
            tensors: kept_tensors,
            nodes,
            sub_graph,
        });
        self.built = true;
        Ok(())
    }

    /// Takes the model directly to `Built` state from an externally-lowered
    /// graph, bypassing the ops-based `Defining` pathway entirely.
    pub fn build_from_lite_graph(&mut self, lite_graph: LiteGraph) -> NnrtResult<()> {
        self.reject_if_built()?;
        self.lite_graph = Some(lite_graph);
        self.built = true;
        Ok(())
    }

    /// Requires a built graph; callers use the returned `LiteGraph` together
    /// with a chosen backend to query supported operations.
    pub fn lite_graph(&self) -> NnrtResult<&LiteGraph> {
        self.lite_graph.as_ref().ok_or_else(|| {
            log::error!("ModelGraph::lite_graph called before build.");
            NnrtStatus::OperationForbidden
        })
    }

    /// Component E's final state-machine transition out of `Built`: requires
    /// a built graph (otherwise `OperationForbidden`), then asks `backend`
    /// which of this graph's lowered nodes it supports, one bool per node.
    pub fn get_supported_operations(
        &self,
        backend: &dyn SupportedOperationsQuery,
    ) -> NnrtResult<Vec<bool>> {
        let lite_graph = self.lite_graph()?;
        Ok(backend.get_supported_operations(lite_graph))
    }
}

impl Default for ModelGraph {
    fn default() -> Self {
        ModelGraph::new()
    }
}
