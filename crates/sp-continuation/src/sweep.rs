//! Serpentine sweep between the mass-shedding limit and near-spherical stars.
//!
//! At one central density the axis ratio is lowered by `r_step` while the star
//! is sub-Keplerian; the density then advances and the axis ratio climbs back
//! towards `AXIS_RATIO_CEILING`; the density advances again, and so on until
//! `end_ec` is passed.

use crate::error::{ContinuationError, ContinuationResult};
use crate::step::{AXIS_RATIO_CEILING, AXIS_RATIO_FLOOR, Step, Termination};
use sp_core::timing::{Timer, sequence_timing};
use sp_model::{EquilibriumModel, ModelSnapshot, RelaxationSolver};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeplerSweepOptions {
    pub end_ec: f64,
    /// Central density increment between passes
    pub ec_step: f64,
    /// Axis-ratio increment within a pass
    pub r_step: f64,
}

impl Default for KeplerSweepOptions {
    fn default() -> Self {
        Self {
            end_ec: 0.0,
            ec_step: 1e-3,
            r_step: 1e-2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    /// Lowering the axis ratio; `emitted` once the current model was yielded.
    Descend { emitted: bool },
    /// Raising the axis ratio from `start` in `k` steps of `r_step`.
    Ascend { start: f64, k: usize },
    Done(Termination),
}

/// Lazy serpentine sequence over a borrowed, already solved model.
pub struct KeplerSweep<'m, S> {
    model: &'m mut EquilibriumModel<S>,
    options: KeplerSweepOptions,
    phase: Phase,
    failed: bool,
}

impl<'m, S: RelaxationSolver> KeplerSweep<'m, S> {
    pub fn new(
        model: &'m mut EquilibriumModel<S>,
        options: KeplerSweepOptions,
    ) -> ContinuationResult<Self> {
        if model.last().is_none() {
            return Err(ContinuationError::InvalidArg {
                what: "Kepler sweep needs a solved starting model".into(),
            });
        }
        for (what, v) in [("ec_step", options.ec_step), ("r_step", options.r_step)] {
            if !(v.is_finite() && v > 0.0) {
                return Err(ContinuationError::InvalidArg {
                    what: format!("{what} must be positive, got {v}"),
                });
            }
        }
        Ok(Self {
            model,
            options,
            phase: Phase::Descend { emitted: false },
            failed: false,
        })
    }

    pub fn model(&self) -> &EquilibriumModel<S> {
        self.model
    }

    pub fn advance(&mut self) -> ContinuationResult<Step> {
        loop {
            match self.phase {
                Phase::Done(t) => return Ok(Step::Finished(t)),
                Phase::Descend { emitted } => {
                    let current = self.current()?;
                    if current.omega >= current.omega_k {
                        if let Some(step) = self.next_density(current.r_ratio, |r| {
                            Phase::Ascend { start: r, k: 0 }
                        })? {
                            return Ok(step);
                        }
                        continue;
                    }
                    if !emitted {
                        self.phase = Phase::Descend { emitted: true };
                        return Ok(Step::Model(current));
                    }
                    let next = current.r_ratio - self.options.r_step;
                    if next < AXIS_RATIO_FLOOR {
                        debug!(r_ratio = current.r_ratio, "Descent reached the axis-ratio floor");
                        if let Some(step) = self.next_density(current.r_ratio, |r| {
                            Phase::Ascend { start: r, k: 0 }
                        })? {
                            return Ok(step);
                        }
                        continue;
                    }
                    self.model.spin(next)?;
                    self.phase = Phase::Descend { emitted: false };
                }
                Phase::Ascend { start, k } => {
                    let r = start + k as f64 * self.options.r_step;
                    if r < AXIS_RATIO_CEILING {
                        let snapshot = self.model.spin(r)?;
                        self.phase = Phase::Ascend { start, k: k + 1 };
                        return Ok(Step::Model(snapshot));
                    }
                    let last = self.current()?.r_ratio;
                    if let Some(step) =
                        self.next_density(last, |_| Phase::Descend { emitted: false })?
                    {
                        return Ok(step);
                    }
                }
            }
        }
    }

    fn current(&self) -> ContinuationResult<Arc<ModelSnapshot>> {
        self.model
            .last()
            .cloned()
            .ok_or_else(|| ContinuationError::InvalidArg {
                what: "model has no solved state".into(),
            })
    }

    /// Move to the next central density at axis ratio `r_ratio`, or finish
    /// once `end_ec` is passed.
    fn next_density(
        &mut self,
        r_ratio: f64,
        then: impl FnOnce(f64) -> Phase,
    ) -> ContinuationResult<Option<Step>> {
        let ec = self.current()?.ec + self.options.ec_step;
        if ec > self.options.end_ec {
            let t = Termination::TargetReached;
            self.phase = Phase::Done(t);
            return Ok(Some(Step::Finished(t)));
        }
        self.model.solve(r_ratio, ec)?;
        info!(ec, r_ratio, "Kepler sweep advanced central density");
        self.phase = then(r_ratio);
        Ok(None)
    }
}

impl<S: RelaxationSolver> Iterator for KeplerSweep<'_, S> {
    type Item = ContinuationResult<Arc<ModelSnapshot>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let timer = Timer::start();
        match self.advance() {
            Ok(Step::Model(snapshot)) => {
                if let Some(dt) = timer.stop() {
                    sequence_timing::SWEEP_STEPS.record(dt);
                }
                Some(Ok(snapshot))
            }
            Ok(Step::Finished(_)) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
