//! `proptest` generators for the value types every crate's property tests
//! need: shapes, dtypes, and small `Float32` buffers sized to match them.

use nnrt_core::DataType;
use proptest::collection::vec;
use proptest::prelude::*;

/// A non-empty shape of 1-4 dimensions, each in `1..=16` (always static:
/// dynamic-shape edge cases are covered separately by `nnrt-core`'s own
/// `tensor_desc` proptests, which generate non-positive dims deliberately).
pub fn static_shape() -> impl Strategy<Value = Vec<i32>> {
    vec(1i32..=16, 1..=4)
}

/// One of the numeric (non-`Bool`) dtypes, the ones every arithmetic
/// operator builder and the CPU reference backend actually operate on.
pub fn numeric_data_type() -> impl Strategy<Value = DataType> {
    prop_oneof![
        Just(DataType::Int8),
        Just(DataType::Int16),
        Just(DataType::Int32),
        Just(DataType::Int64),
        Just(DataType::UInt8),
        Just(DataType::UInt16),
        Just(DataType::UInt32),
        Just(DataType::UInt64),
        Just(DataType::Float16),
        Just(DataType::Float32),
        Just(DataType::Float64),
    ]
}

/// A buffer of `f32` values, one per element of `shape`.
pub fn f32_buffer_for(shape: &[i32]) -> impl Strategy<Value = Vec<f32>> {
    let count: usize = shape.iter().map(|&d| d.max(0) as usize).product();
    vec(any::<f32>().prop_filter("finite", |v| v.is_finite()), count)
}
