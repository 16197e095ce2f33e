//! Turning-point stability test along a constant angular momentum sequence.

use crate::error::{ContinuationError, ContinuationResult};
use crate::ridder::{RidderConfig, ridder};
use crate::step::{AXIS_RATIO_CEILING, AXIS_RATIO_FLOOR};
use sp_model::{EquilibriumModel, RelaxationSolver};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StabilityOptions {
    /// Central density perturbation
    pub delta_ec: f64,
    /// Half-width of the axis-ratio bracket around the current model
    pub half_width: f64,
    pub ridder: RidderConfig,
}

impl Default for StabilityOptions {
    fn default() -> Self {
        Self {
            delta_ec: 1e-4,
            half_width: 1e-2,
            ridder: RidderConfig::default(),
        }
    }
}

/// Whether the current model is stable against collapse.
///
/// Perturbs `ec`, finds the axis ratio that restores the angular momentum and
/// reports stable iff the gravitational mass grew. The model is returned to
/// its original `(ec, r_ratio)` afterwards, also when the search fails.
pub fn is_stable<S: RelaxationSolver>(
    model: &mut EquilibriumModel<S>,
    options: &StabilityOptions,
) -> ContinuationResult<bool> {
    let (ec, r_ratio) = match (model.central_density(), model.axis_ratio()) {
        (Some(ec), Some(r)) => (ec, r),
        _ => {
            return Err(ContinuationError::InvalidArg {
                what: "stability test needs a solved model".into(),
            });
        }
    };
    if !(options.delta_ec.is_finite() && options.delta_ec != 0.0) {
        return Err(ContinuationError::InvalidArg {
            what: format!("delta_ec must be finite and non-zero, got {}", options.delta_ec),
        });
    }
    let base = model.spin(r_ratio)?;
    if !(base.angular_momentum > 0.0) {
        return Err(ContinuationError::InvalidArg {
            what: format!(
                "stability test needs a rotating model, J = {}",
                base.angular_momentum
            ),
        });
    }

    let perturbed = perturbed_mass(model, ec, r_ratio, base.angular_momentum, options);
    let restored = model
        .set_central_density(ec)
        .and_then(|_| model.spin(r_ratio))
        .map_err(ContinuationError::from);

    let mass = perturbed?;
    restored?;
    let stable = mass > base.mass;
    debug!(ec, r_ratio, mass, base_mass = base.mass, stable, "Stability test");
    Ok(stable)
}

/// Mass at `ec + delta_ec` with the angular momentum held at `j`.
fn perturbed_mass<S: RelaxationSolver>(
    model: &mut EquilibriumModel<S>,
    ec: f64,
    r_ratio: f64,
    j: f64,
    options: &StabilityOptions,
) -> ContinuationResult<f64> {
    model.set_central_density(ec + options.delta_ec)?;
    let low = (r_ratio - options.half_width).max(AXIS_RATIO_FLOOR);
    let high = (r_ratio + options.half_width).min(AXIS_RATIO_CEILING);
    let found = ridder(
        |r| Ok(model.spin(r)?.angular_momentum / j - 1.0),
        low,
        high,
        &options.ridder,
    )?;
    debug!(
        r_ratio = found.root,
        calls = found.function_calls,
        "Angular momentum restored"
    );
    Ok(model.spin(found.root)?.mass)
}
