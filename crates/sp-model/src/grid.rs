//! Non-uniform radial grid in the compactified coordinate `s`.

use crate::error::{ModelError, ModelResult};
use crate::fields::Fields;

/// Radial grid with a ghost slot.
///
/// `coordinates()` is `[0] ++ points()` and `spacing()` has the same length,
/// so index `k` of either addresses interior point `k - 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    coordinates: Vec<f64>,
    spacing: Vec<f64>,
}

impl Grid {
    /// Points `0, step, 2 step, ...` strictly below `s_max`.
    pub fn uniform(step: f64, s_max: f64) -> ModelResult<Self> {
        Self::from_points(uniform_points(step, s_max))
    }

    pub fn from_points(points: Vec<f64>) -> ModelResult<Self> {
        validate_points(&points)?;
        let spacing = spacing_for(&points);
        let coordinates = std::iter::once(0.0).chain(points).collect();
        Ok(Self {
            coordinates,
            spacing,
        })
    }

    /// Interior coordinates.
    pub fn points(&self) -> &[f64] {
        &self.coordinates[1..]
    }

    /// Ghost-prefixed coordinates, as handed to the solver.
    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    pub fn spacing(&self) -> &[f64] {
        &self.spacing
    }

    /// Number of interior points.
    pub fn len(&self) -> usize {
        self.coordinates.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move to `new_points`, resampling every field onto them.
    ///
    /// Fails without touching either the grid or the fields when
    /// `new_points` has fewer than two entries or is not strictly increasing.
    pub fn resample(&mut self, new_points: Vec<f64>, fields: &mut Fields) -> ModelResult<()> {
        if fields.grid_points() != self.len() {
            return Err(ModelError::Invariant {
                what: format!(
                    "fields have {} rows for a grid of {} points",
                    fields.grid_points(),
                    self.len()
                ),
            });
        }
        let next = Grid::from_points(new_points)?;
        fields.resample(self.points(), next.points());
        *self = next;
        Ok(())
    }
}

/// Uniform points from 0 in steps of `step`, strictly below `s_max`.
pub fn uniform_points(step: f64, s_max: f64) -> Vec<f64> {
    if !(step.is_finite() && step > 0.0) {
        return Vec::new();
    }
    (0..)
        .map(|k| k as f64 * step)
        .take_while(|s| *s < s_max)
        .collect()
}

/// Finite-difference spacing for `points`, with a leading ghost entry of 0.
///
/// One-sided differences at both ends, centered differences inside.
pub fn spacing_for(points: &[f64]) -> Vec<f64> {
    let n = points.len();
    let mut ds = vec![0.0; n + 1];
    if n < 2 {
        return ds;
    }
    ds[1] = points[1] - points[0];
    for k in 1..n - 1 {
        ds[k + 1] = (points[k + 1] - points[k - 1]) / 2.0;
    }
    ds[n] = points[n - 1] - points[n - 2];
    ds
}

fn validate_points(points: &[f64]) -> ModelResult<()> {
    if points.len() < 2 {
        return Err(ModelError::Domain {
            what: "grid point count (at least 2 required)".into(),
            value: points.len() as f64,
        });
    }
    if let Some(k) = points.iter().position(|s| !s.is_finite()) {
        return Err(ModelError::Domain {
            what: format!("grid coordinate {k}"),
            value: points[k],
        });
    }
    if let Some(k) = points.windows(2).position(|w| w[1] <= w[0]) {
        return Err(ModelError::Domain {
            what: format!("grid coordinate {} not above its predecessor", k + 1),
            value: points[k + 1],
        });
    }
    Ok(())
}
