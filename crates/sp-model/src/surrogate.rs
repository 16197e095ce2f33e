//! Deterministic analytic stand-in for the relaxation solver.
//!
//! The surrogate never iterates anything. It writes a closed-form oblate
//! density profile into the fields and reports global quantities from simple
//! fits, so the orchestration logic (refinement, caching, continuation) can
//! be exercised without the numerical kernel.
//!
//! The static mass curve peaks at `critical_density`:
//!
//! ```text
//! Ms(ec) = max_mass * x (2 - x),  x = ec / critical_density
//! M      = Ms (1 + spin_gain (1 - r))
//! M0     = rest_mass_ratio * M
//! J      = angular_momentum_scale * Ms * sqrt(1 - r)
//! Omega  = Omega_K * sqrt((1 - r) / (1 - shedding_axis_ratio))
//! ```
//!
//! so constant-`J` sequences gain mass with `ec` below the peak and lose it
//! beyond, and `Omega` reaches `Omega_K` at `shedding_axis_ratio`.

use crate::error::{ModelError, ModelResult};
use crate::fields::Fields;
use crate::refine::crossing_rows;
use crate::solver::{
    MassRadius, RelaxOutcome, RelaxRequest, RelaxationSolver, SeedOutcome, SeedRequest,
    SummaryRequest,
};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use sp_eos::{EosTables, TransitionIndices};

/// Surrogate fit parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurrogateParams {
    /// Peak static mass (solar masses)
    pub max_mass: f64,
    /// Central density of the static mass peak
    pub critical_density: f64,
    pub rest_mass_ratio: f64,
    /// Relative mass gain per unit of `1 - r_ratio`
    pub spin_gain: f64,
    /// Static equatorial radius (km)
    pub static_radius: f64,
    /// Mass-shedding angular velocity of the peak-mass star (1/s)
    pub keplerian_omega: f64,
    /// Axis ratio at which `Omega` reaches `Omega_K`
    pub shedding_axis_ratio: f64,
    pub angular_momentum_scale: f64,
    /// Density whose crossing needs fine radial spacing to converge
    pub stiff_density: Option<f64>,
    /// Largest spacing around a stiff crossing that still converges quickly
    pub required_spacing: f64,
    /// Iterations reported for a well-resolved relaxation
    pub base_iterations: usize,
}

impl Default for SurrogateParams {
    fn default() -> Self {
        Self {
            max_mass: 2.0,
            critical_density: 3.0,
            rest_mass_ratio: 1.1,
            spin_gain: 0.2,
            static_radius: 12.0,
            keplerian_omega: 1.0e4,
            shedding_axis_ratio: 0.55,
            angular_momentum_scale: 2.0,
            stiff_density: None,
            required_spacing: 1e-3,
            base_iterations: 2,
        }
    }
}

/// Running call counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolverCalls {
    pub seed: usize,
    pub relax: usize,
    pub summarize: usize,
}

impl SolverCalls {
    pub fn total(&self) -> usize {
        self.seed + self.relax + self.summarize
    }
}

#[derive(Clone, Debug, Default)]
pub struct SurrogateSolver {
    params: SurrogateParams,
    calls: SolverCalls,
    transition_rows: Option<TransitionIndices>,
}

impl SurrogateSolver {
    pub fn new(params: SurrogateParams) -> Self {
        Self {
            params,
            calls: SolverCalls::default(),
            transition_rows: None,
        }
    }

    pub fn params(&self) -> &SurrogateParams {
        &self.params
    }

    pub fn calls(&self) -> SolverCalls {
        self.calls
    }

    /// Mixed-phase rows of the tables seen by the last seed or relax call.
    pub fn transition_rows(&self) -> Option<TransitionIndices> {
        self.transition_rows
    }

    fn static_mass(&self, ec: f64) -> ModelResult<f64> {
        let x = ec / self.params.critical_density;
        if !(x > 0.0 && x < 2.0) {
            return Err(ModelError::Solver {
                message: format!(
                    "central density {ec} outside surrogate range (0, {})",
                    2.0 * self.params.critical_density
                ),
            });
        }
        Ok(self.params.max_mass * x * (2.0 - x))
    }

    fn keplerian_omega(&self, static_mass: f64) -> f64 {
        self.params.keplerian_omega * (static_mass / self.params.max_mass).sqrt()
    }

    fn angular_velocity(&self, static_mass: f64, axis_ratio: f64) -> f64 {
        let shed = 1.0 - self.params.shedding_axis_ratio;
        self.keplerian_omega(static_mass) * ((1.0 - axis_ratio) / shed).sqrt()
    }

    /// Whether a stiff crossing sits on grid spacing coarser than required.
    fn under_resolved(&self, fields: &Fields, spacing: &[f64]) -> bool {
        let Some(stiff) = self.params.stiff_density else {
            return false;
        };
        crossing_rows(&fields.energy, stiff).into_iter().any(|i| {
            spacing[i + 1] > self.params.required_spacing
                || spacing[i + 2] > self.params.required_spacing
        })
    }
}

impl RelaxationSolver for SurrogateSolver {
    fn name(&self) -> &str {
        "surrogate"
    }

    fn seed(&mut self, request: &SeedRequest<'_>, fields: &mut Fields) -> ModelResult<SeedOutcome> {
        self.calls.seed += 1;
        self.transition_rows = request.eos.transition;
        let ec = central_density(&request.eos, request.center_enthalpy);
        let mu = uniform_mu(fields.angular_points());
        fill_profile(fields, request.coordinates, &mu, ec, 1.0, 0.0);
        Ok(SeedOutcome {
            equatorial_radius: 1.0 / ec.sqrt(),
        })
    }

    fn relax(
        &mut self,
        request: &RelaxRequest<'_>,
        fields: &mut Fields,
    ) -> ModelResult<RelaxOutcome> {
        self.calls.relax += 1;
        self.transition_rows = request.eos.transition;
        let ec = central_density(&request.eos, request.center_enthalpy);
        let ms = self.static_mass(ec)?;
        let omega = self.angular_velocity(ms, request.axis_ratio);
        fill_profile(
            fields,
            request.coordinates,
            request.mu,
            ec,
            request.axis_ratio,
            omega,
        );
        let iterations = if self.under_resolved(fields, request.spacing) {
            request.max_iterations
        } else {
            self.params.base_iterations.min(request.max_iterations)
        };
        Ok(RelaxOutcome {
            iterations,
            equatorial_radius: 1.0 / ec.sqrt(),
            angular_velocity: omega,
        })
    }

    fn summarize(
        &mut self,
        request: &SummaryRequest<'_>,
        fields: &Fields,
    ) -> ModelResult<MassRadius> {
        self.calls.summarize += 1;
        let ec = fields.energy[(0, 0)];
        let ms = self.static_mass(ec)?;
        let r = request.axis_ratio;
        let p = &self.params;

        let mass = ms * (1.0 + p.spin_gain * (1.0 - r));
        let rest_mass = p.rest_mass_ratio * mass;
        let omega_k = self.keplerian_omega(ms);
        let vp = DVector::from_iterator(
            request.coordinates.len(),
            request
                .coordinates
                .iter()
                .map(|s| request.angular_velocity * s / (1.0 + s)),
        );
        Ok(MassRadius {
            mass,
            rest_mass,
            angular_momentum: p.angular_momentum_scale * ms * (1.0 - r).sqrt(),
            radius: p.static_radius * (1.0 + 0.5 * (1.0 - r)),
            omega_k,
            proper_mass: 0.5 * (mass + rest_mass),
            vm: -vp.clone(),
            vp,
        })
    }
}

/// Invert the enthalpy table for the scaled central energy density.
///
/// With declared mixed-phase rows the search stays on one side of the
/// transition, so a flat enthalpy segment resolves to its low-density end.
fn central_density(tables: &EosTables<'_>, center_enthalpy: f64) -> f64 {
    let log_h = &tables.log_h[1..];
    let log_e = &tables.log_e[1..];
    let x = center_enthalpy.log10();
    let (lo, hi) = match tables.transition {
        Some(rows) if rows.start >= 2 && rows.end < log_h.len() => {
            if x <= log_h[rows.start - 1] {
                (0, rows.start)
            } else {
                (rows.end - 1, log_h.len())
            }
        }
        _ => (0, log_h.len()),
    };
    let (log_h, log_e) = (&log_h[lo..hi], &log_e[lo..hi]);
    let k = log_h.partition_point(|&v| v < x).clamp(1, log_h.len() - 1);
    let (h0, h1) = (log_h[k - 1], log_h[k]);
    let t = if h1 > h0 { (x - h0) / (h1 - h0) } else { 0.0 };
    10f64.powf(log_e[k - 1] + t * (log_e[k] - log_e[k - 1]))
}

fn uniform_mu(angular_points: usize) -> Vec<f64> {
    let m = angular_points.max(2);
    std::iter::once(0.0)
        .chain((0..m).map(|j| j as f64 / (m - 1) as f64))
        .collect()
}

/// Parabolic energy profile with an elliptical surface of axis ratio `r`.
fn fill_profile(fields: &mut Fields, coordinates: &[f64], mu: &[f64], ec: f64, r: f64, omega: f64) {
    let (rows, cols) = (fields.grid_points(), fields.angular_points());
    for i in 0..rows {
        let s = coordinates[i + 1];
        for j in 0..cols {
            let m = mu[j + 1];
            let surface = 0.5 * (1.0 - (1.0 - r) * m * m);
            let u = s / surface;
            let e = (ec * (1.0 - u * u)).max(0.0);
            fields.energy[(i, j)] = e;
            fields.pressure[(i, j)] = 0.1 * e * e / ec;
            fields.enthalpy[(i, j)] = 0.1 * e;
            fields.rho[(i, j)] = -0.5 * ec * (1.0 - s);
            fields.gama[(i, j)] = 0.25 * ec * (1.0 - s);
            fields.alpha[(i, j)] = 0.1 * (1.0 - r) * (1.0 - s);
            fields.omega[(i, j)] = omega * (1.0 - s) * (1.0 - s);
            fields.velocity_sq[(i, j)] = (omega * s * (1.0 - m * m).sqrt()).powi(2) * 1e-8;
        }
    }
}
