//! Spin-down at fixed rest mass.
//!
//! Each step advances the central density and root-finds the axis ratio that
//! restores the target rest mass. The next axis ratio is predicted by
//! quadratic extrapolation of the last three accepted values and bracketed
//! with a window sized by the smoothed prediction error.

use crate::error::{ContinuationError, ContinuationResult};
use crate::ridder::{RidderConfig, ridder};
use crate::step::{AXIS_RATIO_CEILING, AXIS_RATIO_FLOOR, Step, Termination};
use sp_core::timing::{Timer, sequence_timing};
use sp_model::{EquilibriumModel, ModelSnapshot, RelaxationSolver};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};

/// Axis-ratio window searched when a target rest mass is given up front.
pub const INITIAL_SEARCH: (f64, f64) = (0.6, 0.999);

/// Spin-down configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct SpinDownOptions {
    /// Central density at which the sequence stops
    pub target_ec: f64,
    /// Central density increment per step; its sign sets the direction
    pub step: f64,
    /// Rest mass to hold; defaults to the model's current rest mass
    pub target_rest_mass: Option<f64>,
    /// Report each step at info level instead of debug
    pub display: bool,
    /// Weight of the newest prediction error in the smoothed estimate
    pub smoothing: f64,
    /// Initial bracket width
    pub initial_step_error: f64,
    pub ridder: RidderConfig,
}

impl Default for SpinDownOptions {
    fn default() -> Self {
        Self {
            target_ec: 0.0,
            step: 1e-2,
            target_rest_mass: None,
            display: false,
            smoothing: 0.7,
            initial_step_error: 1e-2,
            ridder: RidderConfig::default(),
        }
    }
}

/// Lazy constant-rest-mass sequence over a borrowed model.
pub struct SpinDown<'m, S> {
    model: &'m mut EquilibriumModel<S>,
    options: SpinDownOptions,
    target_rest_mass: Option<f64>,
    history: VecDeque<f64>,
    step_error: f64,
    finished: Option<Termination>,
    failed: bool,
}

impl<'m, S: RelaxationSolver> SpinDown<'m, S> {
    pub fn new(
        model: &'m mut EquilibriumModel<S>,
        options: SpinDownOptions,
    ) -> ContinuationResult<Self> {
        let (step, target_ec, alpha) = (options.step, options.target_ec, options.smoothing);
        if !(step.is_finite() && step != 0.0) {
            return Err(invalid(format!("step must be finite and non-zero, got {step}")));
        }
        if !target_ec.is_finite() {
            return Err(invalid(format!("target_ec must be finite, got {target_ec}")));
        }
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(invalid(format!("smoothing must lie in (0, 1], got {alpha}")));
        }
        if !(options.initial_step_error > 0.0) {
            return Err(invalid("initial_step_error must be positive".into()));
        }
        if let Some(m0) = options.target_rest_mass {
            if !(m0.is_finite() && m0 > 0.0) {
                return Err(invalid(format!("target rest mass must be positive, got {m0}")));
            }
        }
        let step_error = options.initial_step_error;
        Ok(Self {
            model,
            options,
            target_rest_mass: None,
            history: VecDeque::with_capacity(3),
            step_error,
            finished: None,
            failed: false,
        })
    }

    pub fn model(&self) -> &EquilibriumModel<S> {
        self.model
    }

    /// Rest mass held along the sequence, once established.
    pub fn target_rest_mass(&self) -> Option<f64> {
        self.target_rest_mass
    }

    /// Smoothed prediction error used as the next bracket width.
    pub fn step_error(&self) -> f64 {
        self.step_error
    }

    /// Last accepted axis ratios, oldest first.
    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    pub fn termination(&self) -> Option<Termination> {
        self.finished
    }

    /// Advance by one accepted model or report why the sequence ended.
    pub fn advance(&mut self) -> ContinuationResult<Step> {
        if let Some(t) = self.finished {
            return Ok(Step::Finished(t));
        }
        let target = match self.target_rest_mass {
            Some(m0) => m0,
            None => self.establish_target()?,
        };

        let ec = self
            .model
            .central_density()
            .ok_or_else(|| invalid("central density not set".into()))?;
        if (ec < self.options.target_ec) != (self.options.step > 0.0) {
            return Ok(self.finish(Termination::TargetReached));
        }

        let timer = Timer::start();
        self.model.set_central_density(ec + self.options.step)?;
        let predicted = self.predict()?;

        let delta = self.step_error.max(self.options.ridder.xtol);
        let mut low = predicted.min(AXIS_RATIO_CEILING - delta).max(AXIS_RATIO_FLOOR);
        let mut high = (low + delta).min(AXIS_RATIO_CEILING);
        let bracket_calls = match self.bracket(&mut low, &mut high, delta, target)? {
            Bracketing::Found { calls } => calls,
            Bracketing::Boundary(r_ratio) => {
                return Ok(self.finish(Termination::BoundaryReached { r_ratio }));
            }
        };

        let model = &mut *self.model;
        let result = ridder(
            |r| rest_mass_residual(model, r, target),
            low,
            high,
            &self.options.ridder,
        )?;
        let snapshot = self.model.spin(result.root)?;
        let accepted = snapshot.r_ratio;

        if self.history.len() == 3 {
            self.history.pop_front();
        }
        self.history.push_back(accepted);
        let alpha = self.options.smoothing;
        self.step_error = self.step_error * (1.0 - alpha) + (accepted - predicted).abs() * alpha;

        if let Some(dt) = timer.stop() {
            sequence_timing::SPIN_DOWN_STEPS.record(dt);
        }
        self.report(&snapshot, target, predicted, bracket_calls + result.function_calls);
        Ok(Step::Model(snapshot))
    }

    fn establish_target(&mut self) -> ContinuationResult<f64> {
        let target = match self.options.target_rest_mass {
            Some(m0) => {
                let model = &mut *self.model;
                let (lo, hi) = INITIAL_SEARCH;
                let found = ridder(
                    |r| rest_mass_residual(model, r, m0),
                    lo,
                    hi,
                    &self.options.ridder,
                )?;
                self.model.spin(found.root)?;
                info!(target_rest_mass = m0, r_ratio = found.root, "Spin-down initialized");
                m0
            }
            None => {
                let last = self.model.last().ok_or_else(|| {
                    invalid("spin-down without a target rest mass needs a solved model".into())
                })?;
                last.rest_mass
            }
        };
        self.target_rest_mass = Some(target);
        Ok(target)
    }

    /// Quadratic extrapolation from the last three accepted axis ratios, or
    /// the current axis ratio until three are available.
    fn predict(&self) -> ContinuationResult<f64> {
        match (self.history.front(), self.history.get(1), self.history.get(2)) {
            (Some(p0), Some(p1), Some(p2)) => Ok(3.0 * p2 - 3.0 * p1 + p0),
            _ => self
                .model
                .axis_ratio()
                .ok_or_else(|| invalid("axis ratio not set".into())),
        }
    }

    /// Widen `[low, high]` until the residual changes sign, stopping at the
    /// axis-ratio clamp that still holds no root.
    fn bracket(
        &mut self,
        low: &mut f64,
        high: &mut f64,
        mut delta: f64,
        target: f64,
    ) -> ContinuationResult<Bracketing> {
        let mut f_low = rest_mass_residual(self.model, *low, target)?;
        let mut f_high = rest_mass_residual(self.model, *high, target)?;
        let mut calls = 2;

        while f_low * f_high > 0.0 {
            delta *= 2.0;
            if f_high > 0.0 {
                if *high >= AXIS_RATIO_CEILING {
                    return Ok(Bracketing::Boundary(AXIS_RATIO_CEILING));
                }
                *low = *high;
                f_low = f_high;
                *high = (*high + delta).min(AXIS_RATIO_CEILING);
                f_high = rest_mass_residual(self.model, *high, target)?;
            } else {
                if *low <= AXIS_RATIO_FLOOR {
                    return Ok(Bracketing::Boundary(AXIS_RATIO_FLOOR));
                }
                *high = *low;
                f_high = f_low;
                *low = (*low - delta).max(AXIS_RATIO_FLOOR);
                f_low = rest_mass_residual(self.model, *low, target)?;
            }
            calls += 1;
        }

        let msg = "Bracketed rest-mass root";
        if self.options.display {
            info!(low = *low, high = *high, delta, f_low, f_high, "{msg}");
        } else {
            debug!(low = *low, high = *high, delta, f_low, f_high, "{msg}");
        }
        Ok(Bracketing::Found { calls })
    }

    fn report(&self, snapshot: &ModelSnapshot, target: f64, predicted: f64, calls: usize) {
        let mass_error = (snapshot.rest_mass - target) / target;
        let msg = "Spin-down step accepted";
        if self.options.display {
            info!(
                ec = snapshot.ec,
                r_ratio = snapshot.r_ratio,
                predicted,
                mass_error,
                calls,
                "{msg}"
            );
        } else {
            debug!(
                ec = snapshot.ec,
                r_ratio = snapshot.r_ratio,
                predicted,
                mass_error,
                calls,
                "{msg}"
            );
        }
    }

    fn finish(&mut self, termination: Termination) -> Step {
        self.finished = Some(termination);
        if self.options.display {
            info!(?termination, "Spin-down finished");
        } else {
            debug!(?termination, "Spin-down finished");
        }
        Step::Finished(termination)
    }
}

impl<S: RelaxationSolver> Iterator for SpinDown<'_, S> {
    type Item = ContinuationResult<Arc<ModelSnapshot>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.advance() {
            Ok(Step::Model(snapshot)) => Some(Ok(snapshot)),
            Ok(Step::Finished(_)) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

enum Bracketing {
    Found { calls: usize },
    Boundary(f64),
}

fn rest_mass_residual<S: RelaxationSolver>(
    model: &mut EquilibriumModel<S>,
    r_ratio: f64,
    target: f64,
) -> ContinuationResult<f64> {
    Ok(model.spin(r_ratio)?.rest_mass / target - 1.0)
}

fn invalid(what: String) -> ContinuationError {
    ContinuationError::InvalidArg { what }
}
