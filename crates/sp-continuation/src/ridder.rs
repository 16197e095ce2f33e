//! Ridders' method for bracketed scalar roots.

use crate::error::{ContinuationError, ContinuationResult};

/// Root finder configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RidderConfig {
    /// Absolute tolerance on the root
    pub xtol: f64,
    /// Relative tolerance on the root
    pub rtol: f64,
    /// Maximum iterations
    pub max_iterations: usize,
}

impl Default for RidderConfig {
    fn default() -> Self {
        Self {
            xtol: 1e-5,
            rtol: 4.0 * f64::EPSILON,
            max_iterations: 100,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RidderResult {
    pub root: f64,
    pub iterations: usize,
    /// Objective evaluations, endpoints included
    pub function_calls: usize,
}

/// Find a root of `f` on `[a, b]`, where `f(a)` and `f(b)` differ in sign.
///
/// The returned root is always a point at which `f` was evaluated.
pub fn ridder<F>(
    mut f: F,
    a: f64,
    b: f64,
    config: &RidderConfig,
) -> ContinuationResult<RidderResult>
where
    F: FnMut(f64) -> ContinuationResult<f64>,
{
    let (mut lo, mut hi) = (a, b);
    let (mut f_lo, mut f_hi) = (f(lo)?, f(hi)?);
    let mut calls = 2;
    let done = |root: f64, iterations: usize, calls: usize| RidderResult {
        root,
        iterations,
        function_calls: calls,
    };

    if f_lo == 0.0 {
        return Ok(done(lo, 0, calls));
    }
    if f_hi == 0.0 {
        return Ok(done(hi, 0, calls));
    }
    if f_lo * f_hi > 0.0 || f_lo.is_nan() || f_hi.is_nan() {
        return Err(ContinuationError::NotBracketed {
            low: lo,
            high: hi,
            f_low: f_lo,
            f_high: f_hi,
        });
    }

    let mut root = f64::NAN;
    for iter in 1..=config.max_iterations {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid)?;
        calls += 1;
        let s = (f_mid * f_mid - f_lo * f_hi).sqrt();
        if s == 0.0 {
            return Ok(done(mid, iter, calls));
        }

        let direction = if f_lo >= f_hi { 1.0 } else { -1.0 };
        let next = mid + (mid - lo) * direction * f_mid / s;
        let tol = config.xtol + config.rtol * next.abs();
        if (next - root).abs() <= tol {
            return Ok(done(root, iter, calls));
        }
        root = next;
        let f_root = f(root)?;
        calls += 1;
        if f_root == 0.0 {
            return Ok(done(root, iter, calls));
        }

        if f_mid.signum() != f_root.signum() {
            lo = mid;
            f_lo = f_mid;
            hi = root;
            f_hi = f_root;
        } else if f_lo.signum() != f_root.signum() {
            hi = root;
            f_hi = f_root;
        } else {
            lo = root;
            f_lo = f_root;
        }

        if (hi - lo).abs() <= tol {
            return Ok(done(root, iter, calls));
        }
    }

    Err(ContinuationError::NoConvergence {
        low: lo,
        high: hi,
        iterations: config.max_iterations,
    })
}
