/*!
 * Serde Helpers
 * Skip-serializing predicates and serde_with re-exports
 */

pub use serde_with::{
    serde_as, skip_serializing_none, DurationMicroSeconds, DurationMilliSeconds, DurationSeconds,
};

/// Skip serializing if u64 is zero
#[inline]
pub fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

/// Skip serializing if usize is zero
#[inline]
pub fn is_zero_usize(value: &usize) -> bool {
    *value == 0
}
