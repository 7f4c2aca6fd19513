//! Compiled-model disk cache: a sidecar JSON describing N backend-owned byte
//! buffers, each checksummed with a sub-sampling CRC-16 variant so restoring a
//! large compiled artifact stays bounded-latency.

pub mod cache;
pub mod crc16;
pub mod sidecar;

pub use cache::{CacheIdentity, CompiledCache, RestoredCache};
pub use crc16::crc16;
pub use sidecar::{CacheData, Sidecar, MISSING_OP_VERSION};
