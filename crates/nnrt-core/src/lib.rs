//! Core types shared by every crate in this runtime: the status enum, tensor
//! descriptors and tensors, the opaque IR primitive, the operator-builder
//! contract and registry, and the lite-graph / model-graph data model.
//!
//! Concrete operator builders, accelerator backends, the compiled cache, and
//! the compiler/executor drivers all build on top of these types from their
//! own crates; this crate has no knowledge of any of them.

pub mod error;
pub mod lite_graph;
pub mod model_graph;
pub mod operator;
pub mod primitive;
pub mod tensor;
pub mod tensor_desc;
pub mod validation;

pub use error::{NnrtResult, NnrtStatus};
pub use lite_graph::{LiteGraph, LiteGraphNode, SubGraph};
pub use model_graph::{ModelGraph, SupportedOperationsQuery};
pub use operator::{
    BuilderCore, BuilderFactory, OperatorBuilder, OperatorRegistry, OperatorType, ParamTag,
    QuantMode, RegistryBuilder,
};
pub use primitive::Primitive;
pub use tensor::{IoTensor, QuantizationParam, Tensor, TensorRole};
pub use tensor_desc::{DataType, ElementCount, Format, TensorDesc};
