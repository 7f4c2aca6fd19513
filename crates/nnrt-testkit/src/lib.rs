//! Shared test fixtures and `proptest` generators, not part of the public
//! runtime surface. Each crate still colocates its own `#[cfg(test)]`
//! fixtures for cases specific to it; this crate exists for the handful of
//! tensor/graph shapes and strategies several crates would otherwise
//! duplicate verbatim.

pub mod fixtures;
pub mod strategies;

pub use fixtures::{f32_tensor, f32_tensor_template, full_registry, reference_backend, scalar_param, single_relu_graph};
pub use strategies::{f32_buffer_for, numeric_data_type, static_shape};
