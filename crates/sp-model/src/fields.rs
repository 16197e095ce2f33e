//! Field arrays defined on the (radial, angular) grid.

use nalgebra::{DMatrix, DVector};
use sp_core::resample_linear;

/// Metric potentials and matter fields, one row per radial grid point and one
/// column per angular point. `vp`/`vm` hold the prograde and retrograde
/// orbital velocities with the ghost slot at index 0.
#[derive(Clone, Debug, PartialEq)]
pub struct Fields {
    pub rho: DMatrix<f64>,
    pub gama: DMatrix<f64>,
    pub alpha: DMatrix<f64>,
    pub omega: DMatrix<f64>,
    pub energy: DMatrix<f64>,
    pub pressure: DMatrix<f64>,
    pub enthalpy: DMatrix<f64>,
    pub velocity_sq: DMatrix<f64>,
    pub vp: DVector<f64>,
    pub vm: DVector<f64>,
}

impl Fields {
    pub fn zeros(grid_points: usize, angular_points: usize) -> Self {
        let m = || DMatrix::zeros(grid_points, angular_points);
        Self {
            rho: m(),
            gama: m(),
            alpha: m(),
            omega: m(),
            energy: m(),
            pressure: m(),
            enthalpy: m(),
            velocity_sq: m(),
            vp: DVector::zeros(grid_points + 1),
            vm: DVector::zeros(grid_points + 1),
        }
    }

    pub fn grid_points(&self) -> usize {
        self.rho.nrows()
    }

    pub fn angular_points(&self) -> usize {
        self.rho.ncols()
    }

    fn matrices_mut(&mut self) -> [&mut DMatrix<f64>; 8] {
        [
            &mut self.rho,
            &mut self.gama,
            &mut self.alpha,
            &mut self.omega,
            &mut self.energy,
            &mut self.pressure,
            &mut self.enthalpy,
            &mut self.velocity_sq,
        ]
    }

    /// Linearly resample every field from coordinates `from` onto `to`,
    /// column by column. Values outside `from` are extrapolated linearly.
    pub(crate) fn resample(&mut self, from: &[f64], to: &[f64]) {
        for m in self.matrices_mut() {
            *m = resample_matrix(m, from, to);
        }
        self.vp = resample_ghosted(&self.vp, from, to);
        self.vm = resample_ghosted(&self.vm, from, to);
    }
}

fn resample_matrix(m: &DMatrix<f64>, from: &[f64], to: &[f64]) -> DMatrix<f64> {
    let columns: Vec<Vec<f64>> = m
        .column_iter()
        .map(|col| {
            let ys: Vec<f64> = col.iter().copied().collect();
            resample_linear(from, &ys, to)
        })
        .collect();
    DMatrix::from_fn(to.len(), m.ncols(), |i, j| columns[j][i])
}

fn resample_ghosted(v: &DVector<f64>, from: &[f64], to: &[f64]) -> DVector<f64> {
    let ys: Vec<f64> = v.iter().skip(1).copied().collect();
    let values = resample_linear(from, &ys, to);
    DVector::from_iterator(to.len() + 1, std::iter::once(0.0).chain(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_have_matching_shapes() {
        let f = Fields::zeros(10, 4);
        assert_eq!(f.grid_points(), 10);
        assert_eq!(f.angular_points(), 4);
        assert_eq!(f.energy.shape(), (10, 4));
        assert_eq!(f.vp.len(), 11);
    }

    #[test]
    fn resample_is_linear_in_each_column() {
        let from = [0.0, 0.5, 1.0];
        let to = [0.0, 0.25, 0.75, 1.0];
        let mut f = Fields::zeros(3, 2);
        for (i, s) in from.iter().enumerate() {
            f.energy[(i, 0)] = 2.0 * s;
            f.energy[(i, 1)] = 1.0 - s;
            f.vp[i + 1] = 4.0 * s;
        }
        f.resample(&from, &to);
        assert_eq!(f.energy.shape(), (4, 2));
        assert!((f.energy[(1, 0)] - 0.5).abs() < 1e-12);
        assert!((f.energy[(2, 1)] - 0.25).abs() < 1e-12);
        assert_eq!(f.vp[0], 0.0);
        assert!((f.vp[3] - 3.0).abs() < 1e-12);
        assert_eq!(f.rho.nrows(), 4);
    }
}
