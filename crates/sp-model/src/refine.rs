//! Grid refinement around the EOS phase transition.

use crate::config::GridHierarchy;
use nalgebra::DMatrix;
use tracing::warn;

/// Outcome of one refinement step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RefineDecision {
    /// No transition, no crossing, or the star is between the phase bounds.
    Unchanged,
    /// Central density fell back below the transition; uniform coarse grid restored.
    Revert,
    /// Grid rebuilt with the finest step on `[s0, s1]`.
    Refine { s0: f64, s1: f64 },
}

/// Rows `i` where the energy density crosses `e1` between points `i` and `i+1`
/// along any angular column.
pub(crate) fn crossing_rows(energy: &DMatrix<f64>, e1: f64) -> Vec<usize> {
    let rows = energy.nrows();
    (0..rows.saturating_sub(1))
        .filter(|&i| {
            (0..energy.ncols()).any(|j| (energy[(i, j)] >= e1) != (energy[(i + 1, j)] >= e1))
        })
        .collect()
}

/// Radial interval `[s0, s1]` containing every crossing of `e1`, or `None`
/// when the energy field never crosses it.
pub fn transition_interval(
    energy: &DMatrix<f64>,
    points: &[f64],
    e1: f64,
    s_max: f64,
) -> Option<(f64, f64)> {
    let rows = crossing_rows(energy, e1);
    let (&first, &last) = (rows.first()?, rows.last()?);
    if last - first + 1 != rows.len() {
        warn!(
            first,
            last,
            crossings = rows.len(),
            "Energy density crosses the transition in disjoint regions; refining their envelope"
        );
    }
    let s0 = points[first].max(0.0);
    let s1 = points[last + 1].min(s_max);
    Some((s0, s1))
}

/// Grid points from 0 up to `s_max`, placed in pairs whose step depends on the
/// distance to `[s0, s1]` through `hierarchy`.
pub fn refined_points(s0: f64, s1: f64, s_max: f64, hierarchy: &GridHierarchy) -> Vec<f64> {
    let mut points = vec![0.0];
    let mut s = 0.0;
    loop {
        let distance = (s - s0).abs() + (s - s1).abs() - (s0 - s1).abs();
        let ds = hierarchy.step_for(distance);
        s += 2.0 * ds;
        if s > s_max {
            break;
        }
        points.push(s - ds);
        points.push(s);
    }
    points
}
