//! Enumeration range checks and index-array bounds checks shared by the graph
//! and operator-builder layers.

use crate::error::{NnrtResult, NnrtStatus};

/// Every index in `indices` must be `< bound`.
pub fn validate_index_bounds(indices: &[usize], bound: usize) -> NnrtResult<()> {
    for &idx in indices {
        if idx >= bound {
            log::error!(
                "validate_index_bounds failed, index {} out of bounds (len {}).",
                idx,
                bound
            );
            return Err(NnrtStatus::InvalidParameter);
        }
    }
    Ok(())
}

/// `slice.len()` must equal `expected` exactly.
pub fn validate_arity(slice_len: usize, expected: usize, what: &str) -> NnrtResult<()> {
    if slice_len != expected {
        log::error!(
            "validate_arity failed for {}: expected {}, got {}.",
            what,
            expected,
            slice_len
        );
        return Err(NnrtStatus::InvalidParameter);
    }
    Ok(())
}

/// `slice_len` must not exceed `max`.
pub fn validate_max_count(slice_len: usize, max: usize, what: &str) -> NnrtResult<()> {
    if slice_len > max {
        log::error!(
            "validate_max_count failed for {}: {} exceeds max {}.",
            what,
            slice_len,
            max
        );
        return Err(NnrtStatus::InvalidParameter);
    }
    Ok(())
}

/// Two index lists must not share any element (used for the graph's
/// input/output disjointness invariant).
pub fn validate_disjoint(a: &[usize], b: &[usize]) -> NnrtResult<()> {
    for &x in a {
        if b.contains(&x) {
            log::error!(
                "validate_disjoint failed, index {} appears in both lists.",
                x
            );
            return Err(NnrtStatus::InvalidParameter);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_check_catches_out_of_range() {
        assert!(validate_index_bounds(&[0, 1, 2], 3).is_ok());
        assert_eq!(
            validate_index_bounds(&[0, 3], 3),
            Err(NnrtStatus::InvalidParameter)
        );
    }

    #[test]
    fn arity_check() {
        assert!(validate_arity(2, 2, "inputs").is_ok());
        assert_eq!(
            validate_arity(1, 2, "inputs"),
            Err(NnrtStatus::InvalidParameter)
        );
    }

    #[test]
    fn disjoint_check() {
        assert!(validate_disjoint(&[0, 1], &[2, 3]).is_ok());
        assert_eq!(
            validate_disjoint(&[0, 1], &[1, 2]),
            Err(NnrtStatus::InvalidParameter)
        );
    }
}
