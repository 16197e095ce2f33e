//! Interface to the external relaxation solver.
//!
//! The solver owns the physics: it seeds a spherical star, iterates the field
//! equations to self-consistency at a fixed axis ratio, and integrates global
//! quantities. The model only orchestrates calls and owns the data.

use crate::error::ModelResult;
use crate::fields::Fields;
use nalgebra::DVector;
use sp_eos::EosTables;

/// Inputs for building a spherical initial guess.
#[derive(Clone, Copy, Debug)]
pub struct SeedRequest<'a> {
    /// Ghost-prefixed radial coordinates
    pub coordinates: &'a [f64],
    pub eos: EosTables<'a>,
    pub center_enthalpy: f64,
    pub center_pressure: f64,
    pub surface_pressure: f64,
    pub surface_energy: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeedOutcome {
    pub equatorial_radius: f64,
}

/// Inputs for one relaxation call at fixed axis ratio.
#[derive(Clone, Copy, Debug)]
pub struct RelaxRequest<'a> {
    pub coordinates: &'a [f64],
    pub spacing: &'a [f64],
    /// Ghost-prefixed angular coordinates
    pub mu: &'a [f64],
    pub eos: EosTables<'a>,
    pub center_enthalpy: f64,
    pub min_enthalpy: f64,
    pub accuracy: f64,
    pub convergence_factor: f64,
    pub max_iterations: usize,
    pub axis_ratio: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelaxOutcome {
    /// Iterations used; equal to `max_iterations` when the cap was hit
    pub iterations: usize,
    pub equatorial_radius: f64,
    pub angular_velocity: f64,
}

/// Inputs for integrating global quantities of a relaxed star.
#[derive(Clone, Copy, Debug)]
pub struct SummaryRequest<'a> {
    pub coordinates: &'a [f64],
    pub spacing: &'a [f64],
    pub mu: &'a [f64],
    pub eos: EosTables<'a>,
    pub axis_ratio: f64,
    pub surface_energy: f64,
    pub equatorial_radius: f64,
    pub angular_velocity: f64,
}

/// Global quantities reported by the solver.
#[derive(Clone, Debug, PartialEq)]
pub struct MassRadius {
    /// Gravitational mass (solar masses)
    pub mass: f64,
    /// Rest mass (solar masses)
    pub rest_mass: f64,
    pub angular_momentum: f64,
    /// Circumferential equatorial radius (km)
    pub radius: f64,
    /// Mass-shedding angular velocity (1/s)
    pub omega_k: f64,
    /// Proper mass (solar masses)
    pub proper_mass: f64,
    /// Prograde orbital velocity, ghost slot at 0
    pub vp: DVector<f64>,
    /// Retrograde orbital velocity, ghost slot at 0
    pub vm: DVector<f64>,
}

/// External relaxation solver for stationary axisymmetric stars.
pub trait RelaxationSolver: Send {
    /// Identifier for logging.
    fn name(&self) -> &str;

    /// Fill `fields` with a spherical star for the given central state.
    fn seed(&mut self, request: &SeedRequest<'_>, fields: &mut Fields) -> ModelResult<SeedOutcome>;

    /// Relax `fields` in place towards equilibrium at `request.axis_ratio`.
    fn relax(&mut self, request: &RelaxRequest<'_>, fields: &mut Fields)
    -> ModelResult<RelaxOutcome>;

    /// Integrate mass, radius, angular momentum and orbital velocities.
    fn summarize(&mut self, request: &SummaryRequest<'_>, fields: &Fields)
    -> ModelResult<MassRadius>;
}
