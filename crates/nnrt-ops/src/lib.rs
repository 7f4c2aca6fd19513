//! Concrete operator builders and the `register_all` function that populates
//! an `OperatorRegistry` with every one of them.
//!
//! Most operators share `SimpleBuilder`'s fixed-arity, bounded-param-count
//! contract and differ only in their arity numbers; `Clip` and `LeakyRelu`
//! additionally pack a consumed scalar parameter into their primitive
//! payload, `Concat`/`Split`/`Lstm` have a variable arity `SimpleBuilder`
//! can't express, and `LayerNorm` validates gamma/beta against the input's
//! shape on top of reading its own scalar parameters.

pub mod clip;
pub mod layer_norm;
pub mod leaky_relu;
pub mod simple;
pub mod variadic;

use clip::ClipBuilder;
use layer_norm::LayerNormBuilder;
use leaky_relu::LeakyReluBuilder;
use nnrt_core::{OperatorRegistry, OperatorType};
use simple::SimpleBuilder;
use std::sync::Arc;
use variadic::{ConcatBuilder, LstmBuilder, SplitBuilder};

/// Populates `registry` with every concrete operator builder this crate
/// provides. Stands in for the reference implementation's static-init-order
/// self-registration; callers invoke this explicitly, typically once near
/// process start.
pub fn register_all(registry: &mut OperatorRegistry) {
    macro_rules! simple {
        ($op:expr, $in_arity:expr, $out_arity:expr, $max_params:expr) => {
            registry.register(
                $op,
                Arc::new(|| {
                    Box::new(SimpleBuilder::new($op, $in_arity, $out_arity, $max_params))
                        as Box<dyn nnrt_core::OperatorBuilder>
                }),
            );
        };
    }

    // Elementwise binary.
    simple!(OperatorType::Add, 2, 1, 0);
    simple!(OperatorType::Mul, 2, 1, 0);
    simple!(OperatorType::Maximum, 2, 1, 0);
    simple!(OperatorType::SquaredDifference, 2, 1, 0);
    simple!(OperatorType::MatMul, 2, 1, 0);
    simple!(OperatorType::Reshape, 2, 1, 0);
    simple!(OperatorType::Transpose, 2, 1, 0);
    simple!(OperatorType::PRelu, 2, 1, 0);
    simple!(OperatorType::GatherND, 2, 1, 0);

    // Elementwise unary.
    simple!(OperatorType::Cast, 1, 1, 0);
    simple!(OperatorType::QuantDtypeCast, 1, 1, 0);
    simple!(OperatorType::Ceil, 1, 1, 0);
    simple!(OperatorType::Floor, 1, 1, 0);
    simple!(OperatorType::Round, 1, 1, 0);
    simple!(OperatorType::Relu, 1, 1, 0);
    simple!(OperatorType::Relu6, 1, 1, 0);
    simple!(OperatorType::Sigmoid, 1, 1, 0);
    simple!(OperatorType::Gelu, 1, 1, 0);
    simple!(OperatorType::HSwish, 1, 1, 0);
    simple!(OperatorType::HardSigmoid, 1, 1, 0);
    simple!(OperatorType::Softmax, 1, 1, 0);

    // Reductions: up to (coeff, to_end, keep_dims).
    simple!(OperatorType::ReduceMax, 1, 1, 3);
    simple!(OperatorType::ReduceMin, 1, 1, 3);
    simple!(OperatorType::ReduceMean, 1, 1, 3);
    simple!(OperatorType::ReduceSum, 1, 1, 3);
    simple!(OperatorType::ReduceProd, 1, 1, 3);
    simple!(OperatorType::ReduceAll, 1, 1, 3);
    simple!(OperatorType::All, 1, 1, 1);
    simple!(OperatorType::Any, 1, 1, 1);

    // Indexing / shape manipulation.
    simple!(OperatorType::Gather, 2, 1, 1);
    simple!(OperatorType::Slice, 1, 1, 2);
    simple!(OperatorType::StridedSlice, 1, 1, 3);
    simple!(OperatorType::OneHot, 1, 1, 3);
    simple!(OperatorType::Pad, 1, 1, 2);
    simple!(OperatorType::Fill, 1, 1, 1);
    simple!(OperatorType::SparseToDense, 3, 1, 0);

    // Resize.
    simple!(OperatorType::ResizeBilinear, 1, 1, 5);
    simple!(OperatorType::ResizeNearestNeighbor, 1, 1, 5);

    // Normalization.
    simple!(OperatorType::BatchNorm, 5, 1, 1);
    simple!(OperatorType::InstanceNorm, 3, 1, 1);
    simple!(OperatorType::Lrn, 1, 1, 4);

    // Convolution.
    simple!(OperatorType::Conv2D, 2, 1, 0);
    simple!(OperatorType::DepthwiseConv2DNative, 2, 1, 0);

    // Detection head: box_encodings, class_predictions, anchors -> boxes,
    // classes, scores, num_detections.
    simple!(OperatorType::DetectionPostProcess, 3, 4, 10);

    registry.register(
        OperatorType::Clip,
        Arc::new(|| Box::<ClipBuilder>::default() as Box<dyn nnrt_core::OperatorBuilder>),
    );
    registry.register(
        OperatorType::LeakyRelu,
        Arc::new(|| Box::<LeakyReluBuilder>::default() as Box<dyn nnrt_core::OperatorBuilder>),
    );
    registry.register(
        OperatorType::LayerNorm,
        Arc::new(|| Box::<LayerNormBuilder>::default() as Box<dyn nnrt_core::OperatorBuilder>),
    );
    registry.register(
        OperatorType::Concat,
        Arc::new(|| Box::<ConcatBuilder>::default() as Box<dyn nnrt_core::OperatorBuilder>),
    );
    registry.register(
        OperatorType::Split,
        Arc::new(|| Box::<SplitBuilder>::default() as Box<dyn nnrt_core::OperatorBuilder>),
    );
    registry.register(
        OperatorType::Lstm,
        Arc::new(|| Box::<LstmBuilder>::default() as Box<dyn nnrt_core::OperatorBuilder>),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every `OperatorType` variant has exactly one registered builder.
    #[test]
    fn register_all_covers_every_operator_type() {
        let mut registry = OperatorRegistry::new();
        register_all(&mut registry);

        let all_types = [
            OperatorType::Add,
            OperatorType::Mul,
            OperatorType::Maximum,
            OperatorType::SquaredDifference,
            OperatorType::Conv2D,
            OperatorType::DepthwiseConv2DNative,
            OperatorType::MatMul,
            OperatorType::Softmax,
            OperatorType::Reshape,
            OperatorType::Transpose,
            OperatorType::Concat,
            OperatorType::Split,
            OperatorType::Slice,
            OperatorType::StridedSlice,
            OperatorType::Gather,
            OperatorType::GatherND,
            OperatorType::OneHot,
            OperatorType::Pad,
            OperatorType::Fill,
            OperatorType::Cast,
            OperatorType::QuantDtypeCast,
            OperatorType::SparseToDense,
            OperatorType::ResizeBilinear,
            OperatorType::ResizeNearestNeighbor,
            OperatorType::BatchNorm,
            OperatorType::LayerNorm,
            OperatorType::InstanceNorm,
            OperatorType::Lrn,
            OperatorType::Lstm,
            OperatorType::ReduceMax,
            OperatorType::ReduceMin,
            OperatorType::ReduceMean,
            OperatorType::ReduceSum,
            OperatorType::ReduceProd,
            OperatorType::ReduceAll,
            OperatorType::All,
            OperatorType::Any,
            OperatorType::Clip,
            OperatorType::Ceil,
            OperatorType::Floor,
            OperatorType::Round,
            OperatorType::Relu,
            OperatorType::Relu6,
            OperatorType::Sigmoid,
            OperatorType::Gelu,
            OperatorType::HSwish,
            OperatorType::HardSigmoid,
            OperatorType::PRelu,
            OperatorType::LeakyRelu,
            OperatorType::DetectionPostProcess,
        ];
        for op_type in all_types {
            assert!(
                registry.get_ops_builder(op_type).is_some(),
                "no builder registered for {:?}",
                op_type
            );
        }
        assert_eq!(registry.len(), all_types.len());
    }
}
