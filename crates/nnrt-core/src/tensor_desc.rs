//! Tensor Descriptor: dtype, format, shape, and name for a tensor value.
//!
//! Ported from the reference `TensorDesc` class: a plain value object with typed
//! getters/setters, an element-count computation that treats any non-positive
//! dimension as "dynamic" rather than an error, and a byte-size computation that
//! folds that dynamic signal into a zero-sized success rather than propagating it.

use crate::error::{NnrtResult, NnrtStatus};
use serde::{Deserialize, Serialize};

/// Closed set of element data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float16,
    Float32,
    Float64,
}

impl DataType {
    /// Size in bytes of one element, or 0 for a type the size table doesn't cover.
    ///
    /// `Bool` is sized as a single byte, matching `sizeof(bool)` on every platform
    /// the reference implementation targets.
    pub fn type_size(self) -> usize {
        match self {
            DataType::Bool => 1,
            DataType::Int8 | DataType::UInt8 => 1,
            DataType::Int16 | DataType::UInt16 | DataType::Float16 => 2,
            DataType::Int32 | DataType::UInt32 | DataType::Float32 => 4,
            DataType::Int64 | DataType::UInt64 | DataType::Float64 => 8,
        }
    }
}

/// Closed set of tensor memory layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    None,
    Nhwc,
    Nchw,
}

/// The result of `TensorDesc::get_element_num`: either a known count, or a signal
/// that the shape is dynamic (not an error — deferred to execution time).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementCount {
    Known(usize),
    Dynamic,
}

/// A dtype/format/shape/name value object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorDesc {
    data_type: DataType,
    format: Format,
    shape: Vec<i32>,
    name: Option<String>,
}

impl TensorDesc {
    /// A descriptor with shape `shape` and the given dtype; format defaults to `None`.
    pub fn new(data_type: DataType, shape: Vec<i32>) -> NnrtResult<Self> {
        let mut desc = TensorDesc {
            data_type,
            format: Format::None,
            shape: Vec::new(),
            name: None,
        };
        desc.set_shape(shape)?;
        Ok(desc)
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn set_data_type(&mut self, data_type: DataType) {
        self.data_type = data_type;
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    pub fn shape(&self) -> &[i32] {
        &self.shape
    }

    /// Replaces the shape. Rejects an empty slice: a descriptor always carries at
    /// least one dimension once shaped.
    pub fn set_shape(&mut self, shape: Vec<i32>) -> NnrtResult<()> {
        if shape.is_empty() {
            log::error!("TensorDesc::set_shape failed, shape is empty.");
            return Err(NnrtStatus::InvalidParameter);
        }
        self.shape = shape;
        Ok(())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// `Dynamic` if any dimension is `<= 0`; otherwise the product of all dimensions.
    /// Fails with `InvalidParameter` if the shape has never been set.
    pub fn get_element_num(&self) -> NnrtResult<ElementCount> {
        if self.shape.is_empty() {
            log::error!("TensorDesc::get_element_num failed, shape is empty.");
            return Err(NnrtStatus::InvalidParameter);
        }
        let mut count: usize = 1;
        for (i, &dim) in self.shape.iter().enumerate() {
            if dim <= 0 {
                log::warn!(
                    "get_element_num returns dynamic, shape[{}] is {}.",
                    i,
                    dim
                );
                return Ok(ElementCount::Dynamic);
            }
            count *= dim as usize;
        }
        Ok(ElementCount::Known(count))
    }

    /// `element_num * type_size(dtype)`. Dynamic shapes fold to `0` (still `Ok`);
    /// an unrecognized dtype (zero-sized) surfaces as `InvalidParameter`.
    pub fn get_byte_size(&self) -> NnrtResult<usize> {
        match self.get_element_num()? {
            ElementCount::Dynamic => Ok(0),
            ElementCount::Known(count) => {
                let type_size = self.data_type.type_size();
                if type_size == 0 {
                    log::error!("TensorDesc::get_byte_size failed, data type is invalid.");
                    return Err(NnrtStatus::InvalidParameter);
                }
                Ok(count * type_size)
            }
        }
    }

    /// True iff any dimension is `<= 0`.
    pub fn is_dynamic_shape(&self) -> bool {
        matches!(self.get_element_num(), Ok(ElementCount::Dynamic))
    }
}
