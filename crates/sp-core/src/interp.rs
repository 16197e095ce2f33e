//! Monotone piecewise-linear interpolation.
//!
//! Linear interpolation between ordered nodes never overshoots the data, so it
//! preserves monotonicity of the tabulated values. Outside the node range the
//! caller chooses between linear extrapolation from the edge segment and a
//! domain error carrying the offending input.

use crate::error::{CoreError, CoreResult};
use crate::numeric::ensure_strictly_increasing;

/// Behaviour for arguments outside `[xs[0], xs[n-1]]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extrapolation {
    /// Continue the first/last segment.
    Linear,
    /// Reject with [`CoreError::OutOfDomain`].
    Error,
}

/// Piecewise-linear interpolant over strictly increasing nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearInterp {
    xs: Vec<f64>,
    ys: Vec<f64>,
    extrapolation: Extrapolation,
}

impl LinearInterp {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>, extrapolation: Extrapolation) -> CoreResult<Self> {
        if xs.len() < 2 {
            return Err(CoreError::InvalidArg {
                what: "interpolation needs at least two nodes",
            });
        }
        if ys.len() != xs.len() {
            return Err(CoreError::LengthMismatch {
                what: "interpolation values",
                expected: xs.len(),
                got: ys.len(),
            });
        }
        ensure_strictly_increasing(&xs, "interpolation nodes")?;
        Ok(Self {
            xs,
            ys,
            extrapolation,
        })
    }

    /// Closed domain covered by the nodes.
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    pub fn eval(&self, x: f64) -> CoreResult<f64> {
        let (min, max) = self.domain();
        if self.extrapolation == Extrapolation::Error && !(min..=max).contains(&x) {
            return Err(CoreError::OutOfDomain { value: x, min, max });
        }
        Ok(eval_segment(&self.xs, &self.ys, x))
    }
}

/// Evaluate the piecewise-linear interpolant of `(xs, ys)` at every `targets`
/// entry, extrapolating linearly past both edges.
///
/// `xs` must be strictly increasing with at least two entries; callers
/// validate this once for a whole batch of columns.
pub fn resample_linear(xs: &[f64], ys: &[f64], targets: &[f64]) -> Vec<f64> {
    targets.iter().map(|&x| eval_segment(xs, ys, x)).collect()
}

fn eval_segment(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let n = xs.len();
    // Index of the left node of the bracketing segment, clamped to the edges.
    let k = xs.partition_point(|&v| v <= x).clamp(1, n - 1) - 1;
    let (x0, x1) = (xs[k], xs[k + 1]);
    let (y0, y1) = (ys[k], ys[k + 1]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> LinearInterp {
        LinearInterp::new(vec![0.0, 1.0, 3.0], vec![0.0, 2.0, 4.0], Extrapolation::Linear)
            .unwrap()
    }

    #[test]
    fn reproduces_nodes() {
        let f = ramp();
        assert_eq!(f.eval(0.0).unwrap(), 0.0);
        assert_eq!(f.eval(1.0).unwrap(), 2.0);
        assert_eq!(f.eval(3.0).unwrap(), 4.0);
    }

    #[test]
    fn interpolates_and_extrapolates() {
        let f = ramp();
        assert!((f.eval(2.0).unwrap() - 3.0).abs() < 1e-12);
        assert!((f.eval(-1.0).unwrap() + 2.0).abs() < 1e-12);
        assert!((f.eval(5.0).unwrap() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn strict_domain_reports_value() {
        let f = LinearInterp::new(vec![0.0, 1.0], vec![1.0, 2.0], Extrapolation::Error).unwrap();
        let err = f.eval(1.5).unwrap_err();
        assert_eq!(
            err,
            CoreError::OutOfDomain {
                value: 1.5,
                min: 0.0,
                max: 1.0
            }
        );
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn rejects_unsorted_nodes() {
        let err = LinearInterp::new(vec![0.0, 2.0, 1.0], vec![0.0; 3], Extrapolation::Linear);
        assert!(matches!(err, Err(CoreError::NotIncreasing { index: 2, .. })));
    }

    #[test]
    fn resample_batch() {
        let out = resample_linear(&[0.0, 1.0], &[1.0, 3.0], &[-1.0, 0.5, 2.0]);
        assert_eq!(out, vec![-1.0, 2.0, 5.0]);
    }
}
