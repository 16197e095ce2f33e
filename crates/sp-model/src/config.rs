//! Model configuration: relaxation controls, grid hierarchy and surface conditions.

use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use sp_core::{UnitSystem, bisect_right};

/// Base step of the coarsest refinement tier.
pub const DEFAULT_BASE_STEP: f64 = 1.5e-2;

/// Step sizes by distance from the transition interval.
///
/// `steps` runs finest to coarsest and has one more entry than `ranges`;
/// a point whose distance lies in `[ranges[k-1], ranges[k])` uses `steps[k]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridHierarchy {
    pub steps: Vec<f64>,
    pub ranges: Vec<f64>,
}

impl GridHierarchy {
    /// Four tiers `dx/27, dx/9, dx/3, dx` switching at distances 0.01, 0.03, 0.09.
    pub fn from_base(dx: f64) -> Self {
        Self {
            steps: vec![dx / 27.0, dx / 9.0, dx / 3.0, dx],
            ranges: vec![0.01, 0.03, 0.09],
        }
    }

    pub fn finest(&self) -> f64 {
        self.steps.first().copied().unwrap_or(DEFAULT_BASE_STEP)
    }

    pub fn coarsest(&self) -> f64 {
        self.steps.last().copied().unwrap_or(DEFAULT_BASE_STEP)
    }

    /// Step size for a point at `distance` from the refinement interval.
    ///
    /// Distances past the last range, or past the last step of a hierarchy
    /// with too few steps, use the coarsest step.
    pub fn step_for(&self, distance: f64) -> f64 {
        let tier = bisect_right(&self.ranges, distance);
        self.steps
            .get(tier)
            .copied()
            .unwrap_or_else(|| self.coarsest())
    }

    fn validate(&self) -> ModelResult<()> {
        if self.steps.len() != self.ranges.len() + 1 {
            return Err(config(format!(
                "grid hierarchy has {} steps for {} ranges, expected {}",
                self.steps.len(),
                self.ranges.len(),
                self.ranges.len() + 1
            )));
        }
        if let Some(s) = self.steps.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(config(format!("grid step {s} must be positive")));
        }
        if let Some(r) = self.ranges.iter().find(|r| !(r.is_finite() && **r > 0.0)) {
            return Err(config(format!("grid range {r} must be positive")));
        }
        if self.ranges.windows(2).any(|w| w[1] <= w[0]) {
            return Err(config("grid ranges must be strictly increasing".into()));
        }
        Ok(())
    }
}

impl Default for GridHierarchy {
    fn default() -> Self {
        Self::from_base(DEFAULT_BASE_STEP)
    }
}

/// Surface pressure, surface energy density and minimum enthalpy in solver units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConditions {
    pub pressure: f64,
    pub energy: f64,
    pub min_enthalpy: f64,
}

impl SurfaceConditions {
    /// Iron-crust surface: `p = 1.01e8 dyn/cm^2`, `e = 7.8 g/cm^3`, `h = 1 cm^2/s^2`.
    pub fn from_units(units: &UnitSystem) -> Self {
        let c2 = units.c_squared();
        Self {
            pressure: 1.01e8 / (units.density_scale * c2),
            energy: 7.8 / units.density_scale,
            min_enthalpy: 1.0 / c2,
        }
    }
}

impl Default for SurfaceConditions {
    fn default() -> Self {
        Self::from_units(&UnitSystem::V1)
    }
}

/// Equilibrium model configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Under-relaxation factor passed to the solver
    pub convergence_factor: f64,
    /// Relative accuracy target for the relaxation
    pub accuracy: f64,
    /// Iteration cap per relaxation call
    pub max_iterations: usize,
    /// Refinement steps allowed per solve
    pub max_refine_steps: usize,
    /// A relaxation finishing in fewer iterations counts as converged
    pub convergence_threshold: usize,
    /// Outer edge of the compactified radial coordinate
    pub s_max: f64,
    /// Number of angular grid points
    pub angular_points: usize,
    pub hierarchy: GridHierarchy,
    /// Fail with a convergence error instead of warning
    pub strict: bool,
    pub surface: SurfaceConditions,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            convergence_factor: 1.0,
            accuracy: 1e-5,
            max_iterations: 10,
            max_refine_steps: 20,
            convergence_threshold: 4,
            s_max: 0.9999,
            angular_points: 65,
            hierarchy: GridHierarchy::default(),
            strict: true,
            surface: SurfaceConditions::default(),
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> ModelResult<()> {
        for (what, v) in [
            ("convergence_factor", self.convergence_factor),
            ("accuracy", self.accuracy),
            ("s_max", self.s_max),
            ("surface pressure", self.surface.pressure),
            ("surface energy", self.surface.energy),
            ("minimum enthalpy", self.surface.min_enthalpy),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(config(format!("{what} must be positive, got {v}")));
            }
        }
        if self.max_iterations == 0 {
            return Err(config("max_iterations must be positive".into()));
        }
        if self.convergence_threshold == 0 {
            return Err(config("convergence_threshold must be positive".into()));
        }
        if self.angular_points < 2 {
            return Err(config(format!(
                "angular_points must be at least 2, got {}",
                self.angular_points
            )));
        }
        self.hierarchy.validate()?;
        if 2.0 * self.hierarchy.coarsest() >= self.s_max {
            return Err(config(format!(
                "coarsest step {} leaves fewer than two grid points below s_max {}",
                self.hierarchy.coarsest(),
                self.s_max
            )));
        }
        Ok(())
    }

    /// Angular grid `[0] ++ linspace(0, 1, angular_points)`.
    pub fn angular_grid(&self) -> Vec<f64> {
        let m = self.angular_points;
        std::iter::once(0.0)
            .chain((0..m).map(|j| j as f64 / (m - 1) as f64))
            .collect()
    }
}

fn config(what: String) -> ModelError {
    ModelError::Config { what }
}
