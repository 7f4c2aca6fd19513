//! The Compiler and Execution drivers: the pieces that turn a built
//! `ModelGraph` plus a chosen `Backend` into a runnable artifact, consulting
//! and maintaining the on-disk compiled cache along the way, and then bind
//! caller tensors to that artifact at run time.

pub mod cache_identity;
pub mod compiler;
pub mod config;
pub mod executor;

pub use cache_identity::{numeric_device_id, BackendCacheIdentity};
pub use compiler::{compile, PreparedArtifact};
pub use config::{CompileConfig, PerformanceMode, Priority};
pub use executor::{execute, OutputBinding};
