//! The Operator Builder contract (component C) and the Operator Registry
//! (component D).
//!
//! Concrete builders live in the `nnrt-ops` crate, which depends on this one;
//! this module only defines the trait, the closed operator/param-tag enums, and
//! a generic registry that stores builder factories without knowing about any
//! concrete operator. This mirrors the registry/impl split the rest of this
//! runtime's ambient operation-registry pattern already uses.

use crate::error::{NnrtResult, NnrtStatus};
use crate::primitive::Primitive;
use crate::tensor::Tensor;
use crate::validation::{validate_arity, validate_index_bounds, validate_max_count};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Closed set of operator types. Each variant corresponds to one family of
/// concrete builders in `nnrt-ops`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorType {
    Add,
    Mul,
    Maximum,
    SquaredDifference,
    Conv2D,
    DepthwiseConv2DNative,
    MatMul,
    Softmax,
    Reshape,
    Transpose,
    Concat,
    Split,
    Slice,
    StridedSlice,
    Gather,
    GatherND,
    OneHot,
    Pad,
    Fill,
    Cast,
    QuantDtypeCast,
    SparseToDense,
    ResizeBilinear,
    ResizeNearestNeighbor,
    BatchNorm,
    LayerNorm,
    InstanceNorm,
    Lrn,
    Lstm,
    ReduceMax,
    ReduceMin,
    ReduceMean,
    ReduceSum,
    ReduceProd,
    ReduceAll,
    All,
    Any,
    Clip,
    Ceil,
    Floor,
    Round,
    Relu,
    Relu6,
    Sigmoid,
    Gelu,
    HSwish,
    HardSigmoid,
    PRelu,
    LeakyRelu,
    DetectionPostProcess,
}

/// Closed set of operator parameter semantic tags (partial per the enumeration
/// in the component design; new builders add new tags here rather than reusing
/// an unrelated one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamTag {
    AllKeepDims,
    AnyKeepDims,
    ClipMax,
    ClipMin,
    BatchNormEpsilon,
    LayerNormBeginNormAxis,
    LayerNormEpsilon,
    LayerNormBeginParamAxis,
    InstanceNormEpsilon,
    LrnDepthRadius,
    LrnAlpha,
    LrnBeta,
    LrnBias,
    LrnNormRegion,
    OneHotAxis,
    PadConstantValue,
    ReduceCoeff,
    ReduceToEnd,
    ReduceKeepDims,
    ResizeNewHeight,
    ResizeNewWidth,
    ResizePreserveAspectRatio,
    ResizeCoordinateTransformMode,
    ResizeExcludeOutside,
    LeakyReluNegativeSlope,
    LstmBidirectional,
    LstmHasBias,
    LstmInputSize,
    LstmHiddenSize,
    LstmNumLayers,
    LstmNumDirections,
    LstmDropout,
    LstmZoneoutCell,
    LstmZoneoutHidden,
    LstmProjSize,
    DetectionPostProcessInputSize,
    DetectionPostProcessScale,
    DetectionPostProcessNmsIouThreshold,
    DetectionPostProcessNmsScoreThreshold,
    DetectionPostProcessMaxDetections,
    DetectionPostProcessDetectionsPerClass,
    DetectionPostProcessMaxClassesPerDetection,
    DetectionPostProcessNumClasses,
    DetectionPostProcessUseRegularNms,
    DetectionPostProcessOutQuantized,
}

/// The quantization mode a builder records for its node, derived from its first
/// output tensor's quantization at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantMode {
    None,
    All,
}

/// Every concrete operator implements this. `Build` validates and stores
/// parameters; `get_primitive` emits the opaque IR blob once built.
pub trait OperatorBuilder: Send + Sync {
    fn op_type(&self) -> OperatorType;

    /// `params`/`inputs`/`outputs` are indices into `all_tensors`.
    fn build(
        &mut self,
        params: &[usize],
        inputs: &[usize],
        outputs: &[usize],
        all_tensors: &[Tensor],
    ) -> NnrtResult<()>;

    /// `None` if `build` has not yet succeeded; otherwise a freshly allocated
    /// primitive owned by the caller.
    fn get_primitive(&self) -> Option<Primitive>;

    fn name(&self) -> &str;
    fn inputs(&self) -> &[usize];
    fn outputs(&self) -> &[usize];
    fn quant_type(&self) -> QuantMode;
    fn is_built(&self) -> bool;
}

/// Common bookkeeping every concrete builder embeds: name, arity-checked
/// indices, a one-shot `built` flag, and the recorded quantization mode.
///
/// Concrete builders in `nnrt-ops` hold one of these and delegate the trait's
/// bookkeeping accessors to it, keeping each builder's own code to its
/// parameter dispatch table and shape checks.
#[derive(Debug, Clone, Default)]
pub struct BuilderCore {
    name: String,
    inputs: Vec<usize>,
    outputs: Vec<usize>,
    quant_type: Option<QuantMode>,
    built: bool,
}

impl BuilderCore {
    pub fn new() -> Self {
        BuilderCore::default()
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[usize] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[usize] {
        &self.outputs
    }

    pub fn quant_type(&self) -> QuantMode {
        self.quant_type.unwrap_or(QuantMode::None)
    }

    /// Shared entry guard + arity/index/param-count validation every builder
    /// runs before touching its own parameter dispatch table. Returns an error
    /// without mutating `self` if any check fails.
    pub fn validate_entry(
        &self,
        params: &[usize],
        inputs: &[usize],
        outputs: &[usize],
        all_tensors: &[Tensor],
        in_arity: usize,
        out_arity: usize,
        max_params: usize,
    ) -> NnrtResult<()> {
        if self.built {
            log::error!("Build failed, operator already built.");
            return Err(NnrtStatus::OperationForbidden);
        }
        validate_arity(inputs.len(), in_arity, "inputs")?;
        validate_arity(outputs.len(), out_arity, "outputs")?;
        validate_index_bounds(inputs, all_tensors.len())?;
        validate_index_bounds(outputs, all_tensors.len())?;
        validate_index_bounds(params, all_tensors.len())?;
        validate_max_count(params.len(), max_params, "params")?;
        Ok(())
    }

    /// Finalizes bookkeeping after a builder's own parameter/shape validation
    /// has succeeded: records indices, the quantization mode read off the first
    /// output tensor, the generated name, and flips `built` last.
    pub fn finish(
        &mut self,
        name: impl Into<String>,
        inputs: &[usize],
        outputs: &[usize],
        all_tensors: &[Tensor],
    ) {
        self.quant_type = Some(
            outputs
                .first()
                .and_then(|&idx| all_tensors.get(idx))
                .map(|t| if t.is_quantized() { QuantMode::All } else { QuantMode::None })
                .unwrap_or(QuantMode::None),
        );
        self.inputs = inputs.to_vec();
        self.outputs = outputs.to_vec();
        self.name = name.into();
        self.built = true;
    }
}

/// Factory for a fresh, unbuilt concrete operator builder instance.
pub type BuilderFactory = Arc<dyn Fn() -> Box<dyn OperatorBuilder> + Send + Sync>;

/// Maps `OperatorType -> factory`. Duplicate registration of the same type is
/// ignored with a warning; the first registration wins.
#[derive(Clone, Default)]
pub struct OperatorRegistry {
    factories: HashMap<OperatorType, BuilderFactory>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        OperatorRegistry::default()
    }

    /// Idempotent at the type level: a second `register` for an already-present
    /// `op_type` is a no-op (first registration wins), logged as a warning.
    pub fn register(&mut self, op_type: OperatorType, factory: BuilderFactory) {
        if self.factories.contains_key(&op_type) {
            log::warn!(
                "OperatorRegistry::register: {:?} already registered, ignoring.",
                op_type
            );
            return;
        }
        self.factories.insert(op_type, factory);
    }

    /// A fresh builder instance for `op_type`, or `None` if it was never
    /// registered (the caller's stand-in for a null builder pointer).
    pub fn get_ops_builder(&self, op_type: OperatorType) -> Option<Box<dyn OperatorBuilder>> {
        self.factories.get(&op_type).map(|factory| factory())
    }

    pub fn registered_types(&self) -> Vec<OperatorType> {
        self.factories.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Fluent construction of a populated `OperatorRegistry`, mirroring the
/// registry-builder convenience used elsewhere in this runtime's ambient stack.
#[derive(Default)]
pub struct RegistryBuilder {
    registry: OperatorRegistry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        RegistryBuilder::default()
    }

    pub fn add(mut self, op_type: OperatorType, factory: BuilderFactory) -> Self {
        self.registry.register(op_type, factory);
        self
    }

    pub fn build(self) -> OperatorRegistry {
        self.registry
    }
}
