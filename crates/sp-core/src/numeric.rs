//! Float checks shared by the table and grid code.

use crate::CoreError;

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Check that `xs` is finite and strictly increasing.
///
/// Returns the index of the first offending element on failure.
pub fn ensure_strictly_increasing(xs: &[f64], what: &'static str) -> Result<(), CoreError> {
    for (i, pair) in xs.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            ensure_finite(pair[0], what)?;
            ensure_finite(pair[1], what)?;
            return Err(CoreError::NotIncreasing { what, index: i + 1 });
        }
    }
    xs.iter().try_for_each(|&x| ensure_finite(x, what).map(|_| ()))
}

/// Number of entries in a sorted slice that are `<= x`.
pub fn bisect_right(sorted: &[f64], x: f64) -> usize {
    sorted.partition_point(|&v| v <= x)
}
