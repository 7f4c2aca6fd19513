//! Return-code enum shared by every component of the runtime.
//!
//! Every fallible operation in this crate (and the crates built on top of it)
//! resolves to one of these codes rather than an open-ended error type, mirroring
//! the closed status enum the rest of the runtime's ABI is built around. `SUCCESS`
//! has no variant here: the `Ok` side of `NnrtResult` carries it implicitly, and
//! `DYNAMIC_SHAPE` is modeled as a non-error value (see `tensor_desc::ElementCount`)
//! rather than a status code, since it is a deferred-computation signal, not a failure.

use thiserror::Error;

/// One of the runtime's closed set of non-success return codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum NnrtStatus {
    #[error("operation failed")]
    Failed,
    #[error("invalid parameter")]
    InvalidParameter,
    #[error("memory allocation error")]
    MemoryError,
    #[error("operation forbidden in current state")]
    OperationForbidden,
    #[error("null pointer")]
    NullPtr,
    #[error("invalid or corrupted file")]
    InvalidFile,
    #[error("backend device unavailable")]
    UnavailableDevice,
    #[error("cache save exception")]
    SaveCacheException,
}

/// The runtime's standard result alias: every public entry point returns this.
pub type NnrtResult<T> = Result<T, NnrtStatus>;

/// Logs a guard-clause rejection the way every public entry point is expected to:
/// naming the component and the specific guard that tripped, per the error-handling
/// policy that invalid inputs are reported, never assumed away.
#[macro_export]
macro_rules! reject {
    ($status:expr, $($arg:tt)*) => {{
        log::warn!($($arg)*);
        return Err($status);
    }};
}
