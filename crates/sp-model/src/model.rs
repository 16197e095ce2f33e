//! Equilibrium model: state, converge-and-refine loop and memoization.

use crate::cache::ResultCache;
use crate::config::ModelConfig;
use crate::error::{ModelError, ModelResult};
use crate::fields::Fields;
use crate::grid::{Grid, uniform_points};
use crate::refine::{RefineDecision, refined_points, transition_interval};
use crate::snapshot::ModelSnapshot;
use crate::solver::{RelaxRequest, RelaxationSolver, SeedRequest, SummaryRequest};
use sp_eos::{CentralValues, EosView};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reject axis ratios outside the open interval `(0.5, 1)`.
pub fn check_axis_ratio(r_ratio: f64) -> ModelResult<()> {
    if r_ratio > 0.5 && r_ratio < 1.0 {
        Ok(())
    } else {
        Err(ModelError::Config {
            what: format!("axis ratio {r_ratio} outside (0.5, 1)"),
        })
    }
}

/// Call counters accumulated over the model's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolveStats {
    pub solves: usize,
    pub cache_hits: usize,
    pub seeds: usize,
    pub relaxations: usize,
    pub refinements: usize,
    pub summaries: usize,
    /// Solves accepted without reaching the iteration threshold
    pub unconverged: usize,
}

#[derive(Clone, Copy, Debug)]
struct CentralState {
    ec: f64,
    values: CentralValues,
}

/// A rotating star identified by central density `ec` and axis ratio `r_ratio`,
/// solved by an external relaxation solver `S`.
pub struct EquilibriumModel<S> {
    solver: S,
    config: ModelConfig,
    eos: Arc<EosView>,
    mu: Vec<f64>,
    grid: Grid,
    fields: Fields,
    central: Option<CentralState>,
    r_ratio: Option<f64>,
    equatorial_radius: f64,
    angular_velocity: f64,
    initialized: bool,
    refined: bool,
    last_iterations: usize,
    last: Option<Arc<ModelSnapshot>>,
    cache: ResultCache,
    stats: SolveStats,
}

impl<S: RelaxationSolver> EquilibriumModel<S> {
    pub fn new(solver: S, eos: Arc<EosView>, config: ModelConfig) -> ModelResult<Self> {
        config.validate()?;
        let grid = Grid::uniform(config.hierarchy.coarsest(), config.s_max)?;
        let fields = Fields::zeros(grid.len(), config.angular_points);
        let mu = config.angular_grid();
        Ok(Self {
            solver,
            config,
            eos,
            mu,
            grid,
            fields,
            central: None,
            r_ratio: None,
            equatorial_radius: 0.0,
            angular_velocity: 0.0,
            initialized: false,
            refined: false,
            last_iterations: 0,
            last: None,
            cache: ResultCache::new(),
            stats: SolveStats::default(),
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn eos(&self) -> &Arc<EosView> {
        &self.eos
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn stats(&self) -> SolveStats {
        self.stats
    }

    pub fn central_density(&self) -> Option<f64> {
        self.central.map(|c| c.ec)
    }

    pub fn central_values(&self) -> Option<CentralValues> {
        self.central.map(|c| c.values)
    }

    pub fn axis_ratio(&self) -> Option<f64> {
        self.r_ratio
    }

    /// Most recent result, fresh or from the cache.
    pub fn last(&self) -> Option<&Arc<ModelSnapshot>> {
        self.last.as_ref()
    }

    /// Iteration count of the most recent relaxation.
    pub fn last_iterations(&self) -> usize {
        self.last_iterations
    }

    pub fn is_refined(&self) -> bool {
        self.refined
    }

    /// Bind a new EOS. Clears the cache and drops any transition refinement.
    ///
    /// The current central density is re-evaluated against the new tables
    /// first; if it is out of range nothing changes.
    pub fn set_eos(&mut self, eos: Arc<EosView>) -> ModelResult<()> {
        let central = match self.central {
            Some(c) => Some(central_state(&eos, c.ec)?),
            None => None,
        };
        if self.refined {
            let coarse = uniform_points(self.config.hierarchy.coarsest(), self.config.s_max);
            self.grid.resample(coarse, &mut self.fields)?;
            self.refined = false;
        }
        self.eos = eos;
        self.central = central;
        self.cache.clear();
        debug!(eos = self.eos.name(), "EOS bound");
        Ok(())
    }

    /// Set `ec` and the derived central enthalpy and pressure atomically.
    pub fn set_central_density(&mut self, ec: f64) -> ModelResult<()> {
        self.central = Some(central_state(&self.eos, ec)?);
        Ok(())
    }

    /// Solve at `(r_ratio, ec)` using the configured strictness.
    pub fn solve(&mut self, r_ratio: f64, ec: f64) -> ModelResult<Arc<ModelSnapshot>> {
        self.solve_with(r_ratio, ec, self.config.strict)
    }

    pub fn solve_with(
        &mut self,
        r_ratio: f64,
        ec: f64,
        strict: bool,
    ) -> ModelResult<Arc<ModelSnapshot>> {
        check_axis_ratio(r_ratio)?;
        self.set_central_density(ec)?;
        self.solve_current(r_ratio, strict)
    }

    /// Solve at `r_ratio` keeping the current central density.
    pub fn spin(&mut self, r_ratio: f64) -> ModelResult<Arc<ModelSnapshot>> {
        check_axis_ratio(r_ratio)?;
        self.solve_current(r_ratio, self.config.strict)
    }

    fn solve_current(&mut self, r_ratio: f64, strict: bool) -> ModelResult<Arc<ModelSnapshot>> {
        let central = self.central.ok_or_else(|| ModelError::Config {
            what: "central density not set".into(),
        })?;
        let ec = central.ec;
        self.r_ratio = Some(r_ratio);
        self.stats.solves += 1;

        if let Some(hit) = self.cache.get(ec, r_ratio) {
            self.stats.cache_hits += 1;
            debug!(ec, r_ratio, "Cache hit");
            self.last = Some(hit.clone());
            return Ok(hit);
        }

        if !self.initialized {
            self.seed(central)?;
            self.initialized = true;
        }

        let mut iterations = self.relax(central, r_ratio)?;
        let mut refine_steps = 0;
        let converged = if self.config.max_refine_steps > 0 {
            while iterations >= self.config.convergence_threshold
                && refine_steps < self.config.max_refine_steps
            {
                self.refine(ec)?;
                iterations = self.relax(central, r_ratio)?;
                refine_steps += 1;
            }
            iterations < self.config.convergence_threshold
        } else {
            iterations < self.config.max_iterations
        };

        if !converged {
            if strict {
                return Err(ModelError::Convergence {
                    ec,
                    r_ratio,
                    iterations,
                    refine_steps,
                });
            }
            self.stats.unconverged += 1;
            warn!(
                ec,
                r_ratio, iterations, refine_steps, "Relaxation not converged; keeping best effort"
            );
        }

        let snapshot = Arc::new(self.summarize(ec, r_ratio)?);
        // only converged results are cached
        let stored = if converged {
            self.cache.put(ec, r_ratio, snapshot)
        } else {
            snapshot
        };
        self.last = Some(stored.clone());
        Ok(stored)
    }

    fn seed(&mut self, central: CentralState) -> ModelResult<()> {
        let request = SeedRequest {
            coordinates: self.grid.coordinates(),
            eos: self.eos.tables(),
            center_enthalpy: central.values.enthalpy,
            center_pressure: central.values.pressure,
            surface_pressure: self.config.surface.pressure,
            surface_energy: self.config.surface.energy,
        };
        let outcome = self.solver.seed(&request, &mut self.fields)?;
        self.equatorial_radius = outcome.equatorial_radius;
        self.stats.seeds += 1;
        debug!(
            solver = self.solver.name(),
            ec = central.ec,
            r_e = outcome.equatorial_radius,
            "Seeded spherical star"
        );
        Ok(())
    }

    fn relax(&mut self, central: CentralState, r_ratio: f64) -> ModelResult<usize> {
        let request = RelaxRequest {
            coordinates: self.grid.coordinates(),
            spacing: self.grid.spacing(),
            mu: &self.mu,
            eos: self.eos.tables(),
            center_enthalpy: central.values.enthalpy,
            min_enthalpy: self.config.surface.min_enthalpy,
            accuracy: self.config.accuracy,
            convergence_factor: self.config.convergence_factor,
            max_iterations: self.config.max_iterations,
            axis_ratio: r_ratio,
        };
        let outcome = self.solver.relax(&request, &mut self.fields)?;
        self.equatorial_radius = outcome.equatorial_radius;
        self.angular_velocity = outcome.angular_velocity;
        self.last_iterations = outcome.iterations;
        self.stats.relaxations += 1;
        debug!(
            ec = central.ec,
            r_ratio,
            iterations = outcome.iterations,
            "Relaxed"
        );
        Ok(outcome.iterations)
    }

    /// Rebuild the grid around the transition crossing, or restore the coarse
    /// grid once the center has dropped below the transition.
    fn refine(&mut self, ec: f64) -> ModelResult<RefineDecision> {
        self.stats.refinements += 1;
        let Some(bounds) = self.eos.transition() else {
            return Ok(RefineDecision::Unchanged);
        };

        if ec <= bounds.e0 && self.refined {
            let coarse = uniform_points(self.config.hierarchy.coarsest(), self.config.s_max);
            self.grid.resample(coarse, &mut self.fields)?;
            self.refined = false;
            info!(
                size = self.grid.len(),
                iterations = self.last_iterations,
                "Reverted to coarse grid"
            );
            return Ok(RefineDecision::Revert);
        }

        if ec >= bounds.e1 {
            let Some((s0, s1)) = transition_interval(
                &self.fields.energy,
                self.grid.points(),
                bounds.e1,
                self.config.s_max,
            ) else {
                debug!(ec, e1 = bounds.e1, "No transition crossing on the grid");
                return Ok(RefineDecision::Unchanged);
            };
            let points = refined_points(s0, s1, self.config.s_max, &self.config.hierarchy);
            self.grid.resample(points, &mut self.fields)?;
            self.refined = true;
            info!(
                s0,
                s1,
                size = self.grid.len(),
                iterations = self.last_iterations,
                "Refined grid around transition"
            );
            return Ok(RefineDecision::Refine { s0, s1 });
        }

        Ok(RefineDecision::Unchanged)
    }

    fn summarize(&mut self, ec: f64, r_ratio: f64) -> ModelResult<ModelSnapshot> {
        let request = SummaryRequest {
            coordinates: self.grid.coordinates(),
            spacing: self.grid.spacing(),
            mu: &self.mu,
            eos: self.eos.tables(),
            axis_ratio: r_ratio,
            surface_energy: self.config.surface.energy,
            equatorial_radius: self.equatorial_radius,
            angular_velocity: self.angular_velocity,
        };
        let out = self.solver.summarize(&request, &self.fields)?;
        self.stats.summaries += 1;
        if out.vp.len() != self.grid.coordinates().len() || out.vm.len() != out.vp.len() {
            return Err(ModelError::Solver {
                message: format!(
                    "orbital velocity arrays have {} and {} entries for {} coordinates",
                    out.vp.len(),
                    out.vm.len(),
                    self.grid.coordinates().len()
                ),
            });
        }
        self.fields.vp = out.vp;
        self.fields.vm = out.vm;
        Ok(ModelSnapshot {
            mass: out.mass,
            rest_mass: out.rest_mass,
            r_ratio,
            radius: out.radius,
            omega: self.angular_velocity,
            omega_k: out.omega_k,
            angular_momentum: out.angular_momentum,
            kinetic_energy: 0.5 * self.angular_velocity * out.angular_momentum,
            proper_mass: out.proper_mass,
            ec,
        })
    }
}

fn central_state(eos: &EosView, ec: f64) -> ModelResult<CentralState> {
    let values = eos.central_values(ec).map_err(|_| ModelError::Domain {
        what: format!("central energy density outside the '{}' table", eos.name()),
        value: ec,
    })?;
    Ok(CentralState { ec, values })
}
