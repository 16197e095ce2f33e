//! Validated in-memory EOS tables and synthetic generators.
//!
//! The generators produce smooth, physically ordered tables without reading
//! files: a single polytrope `p = K (e c^2)^Γ`, and the same polytrope joined
//! through a constant-pressure mixed phase to a stiff linear phase (a
//! first-order transition in the style of hybrid hadron-quark tables).

use crate::error::{EosError, EosResult};
use crate::model::{EquationOfState, TransitionIndices};
use serde::{Deserialize, Serialize};
use sp_core::UnitSystem;
use sp_core::numeric::ensure_strictly_increasing;

/// Baryon rest mass [g].
const BARYON_MASS_G: f64 = 1.66e-24;

/// Polytrope parameters. Energy densities are in units of
/// `UnitSystem::density_scale`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolytropeSpec {
    /// Adiabatic index Γ (> 1).
    pub gamma: f64,
    /// `p / (e c^2)` at `e = 1` (scaled units).
    pub pressure_ratio: f64,
    /// log10 of the lowest tabulated scaled energy density.
    pub log_e_min: f64,
    /// log10 of the highest tabulated scaled energy density.
    pub log_e_max: f64,
    /// Number of table rows.
    pub points: usize,
}

impl Default for PolytropeSpec {
    fn default() -> Self {
        Self {
            gamma: 2.0,
            pressure_ratio: 0.1,
            log_e_min: -8.0,
            log_e_max: 1.0,
            points: 200,
        }
    }
}

/// First-order transition joined onto a polytropic low-density phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionSpec {
    /// Scaled energy density where the mixed phase begins.
    pub e0: f64,
    /// Scaled energy density where the mixed phase ends.
    pub e1: f64,
    /// `dp / d(e c^2)` of the dense phase.
    #[serde(default = "default_sound_speed_sq")]
    pub sound_speed_sq: f64,
}

fn default_sound_speed_sq() -> f64 {
    1.0 / 3.0
}

/// Serializable description of a synthetic table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EosSpec {
    Polytrope(PolytropeSpec),
    Hybrid {
        low_density: PolytropeSpec,
        transition: TransitionSpec,
    },
}

impl EosSpec {
    pub fn build(&self, units: &UnitSystem) -> EosResult<TabulatedEos> {
        match self {
            EosSpec::Polytrope(spec) => TabulatedEos::polytrope(spec, units),
            EosSpec::Hybrid {
                low_density,
                transition,
            } => TabulatedEos::hybrid(low_density, transition, units),
        }
    }
}

/// An equation of state held as four equal-length cgs columns.
#[derive(Clone, Debug, PartialEq)]
pub struct TabulatedEos {
    name: String,
    energy_density: Vec<f64>,
    pressure: Vec<f64>,
    enthalpy: Vec<f64>,
    number_density: Vec<f64>,
    transition: Option<TransitionIndices>,
}

impl TabulatedEos {
    /// Build a table from raw columns, validating shape and ordering.
    pub fn new(
        name: impl Into<String>,
        energy_density: Vec<f64>,
        pressure: Vec<f64>,
        enthalpy: Vec<f64>,
        number_density: Vec<f64>,
        transition: Option<TransitionIndices>,
    ) -> EosResult<Self> {
        let n = energy_density.len();
        if n == 0 {
            return Err(EosError::Config {
                what: "table has no points".to_string(),
            });
        }
        for (what, col) in [
            ("pressure", &pressure),
            ("enthalpy", &enthalpy),
            ("number density", &number_density),
        ] {
            if col.len() != n {
                return Err(EosError::Config {
                    what: format!("{what} column has {} rows, expected {n}", col.len()),
                });
            }
        }
        ensure_strictly_increasing(&energy_density, "energy density")?;
        for (what, col) in [
            ("energy density", &energy_density),
            ("pressure", &pressure),
            ("enthalpy", &enthalpy),
            ("number density", &number_density),
        ] {
            if let Some(i) = col.iter().position(|v| !v.is_finite() || *v <= 0.0) {
                return Err(EosError::Config {
                    what: format!("{what} must be positive and finite (row {i}: {})", col[i]),
                });
            }
        }
        if let Some(t) = transition {
            if t.start > t.end || t.end >= n {
                return Err(EosError::Config {
                    what: format!(
                        "transition rows {}..={} invalid for {n}-row table",
                        t.start, t.end
                    ),
                });
            }
        }
        Ok(Self {
            name: name.into(),
            energy_density,
            pressure,
            enthalpy,
            number_density,
            transition,
        })
    }

    /// Single polytrope over the configured density range.
    pub fn polytrope(spec: &PolytropeSpec, units: &UnitSystem) -> EosResult<Self> {
        validate_polytrope(spec)?;
        let step = (spec.log_e_max - spec.log_e_min) / (spec.points - 1) as f64;
        let scaled: Vec<f64> = (0..spec.points)
            .map(|i| 10f64.powf(spec.log_e_min + step * i as f64))
            .collect();
        let pressure: Vec<f64> = scaled
            .iter()
            .map(|&e| polytrope_pressure(spec, units, e))
            .collect();
        let name = format!("polytrope(gamma={})", spec.gamma);
        assemble(name, spec.gamma, &scaled, pressure, None, units)
    }

    /// Polytrope up to `e0`, constant pressure from `e0` to `e1`, then
    /// `p = p_t + cs^2 (e - e1) c^2` up to the top of the table.
    pub fn hybrid(
        low: &PolytropeSpec,
        transition: &TransitionSpec,
        units: &UnitSystem,
    ) -> EosResult<Self> {
        validate_polytrope(low)?;
        let (e0, e1) = (transition.e0, transition.e1);
        let (lo, hi) = (10f64.powf(low.log_e_min), 10f64.powf(low.log_e_max));
        if !(lo < e0 && e0 < e1 && e1 < hi) {
            return Err(EosError::Config {
                what: format!("transition [{e0}, {e1}] must lie strictly inside [{lo}, {hi}]"),
            });
        }
        if !(transition.sound_speed_sq > 0.0 && transition.sound_speed_sq <= 1.0) {
            return Err(EosError::Config {
                what: format!(
                    "dense-phase sound speed squared {} outside (0, 1]",
                    transition.sound_speed_sq
                ),
            });
        }

        let n_low = low.points / 2;
        let n_high = low.points - n_low;
        let (l0, l1) = (e0.log10(), e1.log10());
        let mut scaled = Vec::with_capacity(low.points + 2);
        let step_low = (l0 - low.log_e_min) / n_low as f64;
        scaled.extend((0..n_low).map(|i| 10f64.powf(low.log_e_min + step_low * i as f64)));
        let start = scaled.len();
        scaled.push(e0);
        scaled.push(e1);
        let step_high = (low.log_e_max - l1) / n_high as f64;
        scaled.extend((1..=n_high).map(|i| 10f64.powf(l1 + step_high * i as f64)));

        let p_t = polytrope_pressure(low, units, e0);
        let rest = units.density_scale * units.c_squared();
        let pressure: Vec<f64> = scaled
            .iter()
            .map(|&e| {
                if e < e0 {
                    polytrope_pressure(low, units, e)
                } else if e <= e1 {
                    p_t
                } else {
                    p_t + transition.sound_speed_sq * (e - e1) * rest
                }
            })
            .collect();

        let name = format!("hybrid(gamma={}, e0={e0}, e1={e1})", low.gamma);
        let indices = TransitionIndices {
            start,
            end: start + 1,
        };
        assemble(name, low.gamma, &scaled, pressure, Some(indices), units)
    }
}

impl EquationOfState for TabulatedEos {
    fn name(&self) -> &str {
        &self.name
    }

    fn energy_density(&self) -> &[f64] {
        &self.energy_density
    }

    fn pressure(&self) -> &[f64] {
        &self.pressure
    }

    fn enthalpy(&self) -> &[f64] {
        &self.enthalpy
    }

    fn number_density(&self) -> &[f64] {
        &self.number_density
    }

    fn transition(&self) -> Option<TransitionIndices> {
        self.transition
    }
}

fn validate_polytrope(spec: &PolytropeSpec) -> EosResult<()> {
    if !(spec.gamma > 1.0 && spec.gamma.is_finite()) {
        return Err(EosError::Config {
            what: format!("polytropic index {} must exceed 1", spec.gamma),
        });
    }
    if !(spec.pressure_ratio > 0.0 && spec.pressure_ratio.is_finite()) {
        return Err(EosError::Config {
            what: format!("pressure ratio {} must be positive", spec.pressure_ratio),
        });
    }
    if spec.points < 4 {
        return Err(EosError::Config {
            what: format!("need at least 4 table points, got {}", spec.points),
        });
    }
    if !(spec.log_e_min < spec.log_e_max) {
        return Err(EosError::Config {
            what: format!(
                "empty density range [{}, {}]",
                spec.log_e_min, spec.log_e_max
            ),
        });
    }
    Ok(())
}

/// Pressure [dyn/cm^2] of the polytrope at scaled energy density `e`.
fn polytrope_pressure(spec: &PolytropeSpec, units: &UnitSystem, e: f64) -> f64 {
    spec.pressure_ratio * units.density_scale * units.c_squared() * e.powf(spec.gamma)
}

/// Integrate the enthalpy `h = ∫ c^2 dp / (e c^2 + p)` along the table and
/// derive the baryon density, then hand the columns to `TabulatedEos::new`.
fn assemble(
    name: String,
    gamma: f64,
    scaled: &[f64],
    pressure: Vec<f64>,
    transition: Option<TransitionIndices>,
    units: &UnitSystem,
) -> EosResult<TabulatedEos> {
    let c2 = units.c_squared();
    let energy: Vec<f64> = scaled.iter().map(|e| e * units.density_scale).collect();

    let mut enthalpy = Vec::with_capacity(energy.len());
    // Low-pressure limit of the polytropic integral.
    enthalpy.push(c2 * gamma / (gamma - 1.0) * pressure[0] / (energy[0] * c2));
    for i in 1..energy.len() {
        let dp = pressure[i] - pressure[i - 1];
        let mean = 0.5 * ((energy[i] + energy[i - 1]) * c2 + pressure[i] + pressure[i - 1]);
        enthalpy.push(enthalpy[i - 1] + c2 * dp / mean);
    }

    let number_density = energy
        .iter()
        .zip(&pressure)
        .zip(&enthalpy)
        .map(|((e, p), h)| (e + p / c2) / BARYON_MASS_G * (-h / c2).exp())
        .collect();

    TabulatedEos::new(name, energy, pressure, enthalpy, number_density, transition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polytrope_is_monotone() {
        let units = UnitSystem::V1;
        let eos = TabulatedEos::polytrope(&PolytropeSpec::default(), &units).unwrap();
        assert_eq!(eos.len(), 200);
        assert!(eos.transition().is_none());
        assert!(eos.pressure().windows(2).all(|w| w[1] > w[0]));
        assert!(eos.enthalpy().windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn hybrid_marks_mixed_phase() {
        let units = UnitSystem::V1;
        let t = TransitionSpec {
            e0: 0.5,
            e1: 0.8,
            sound_speed_sq: 1.0 / 3.0,
        };
        let eos = TabulatedEos::hybrid(&PolytropeSpec::default(), &t, &units).unwrap();
        let idx = eos.transition().unwrap();
        let e = eos.energy_density();
        assert!((e[idx.start] / units.density_scale - 0.5).abs() < 1e-12);
        assert!((e[idx.end] / units.density_scale - 0.8).abs() < 1e-12);
        assert_eq!(eos.pressure()[idx.start], eos.pressure()[idx.end]);
        assert_eq!(eos.enthalpy()[idx.start], eos.enthalpy()[idx.end]);
    }

    #[test]
    fn hybrid_rejects_inverted_transition() {
        let t = TransitionSpec {
            e0: 0.8,
            e1: 0.5,
            sound_speed_sq: 0.3,
        };
        let err = TabulatedEos::hybrid(&PolytropeSpec::default(), &t, &UnitSystem::V1);
        assert!(matches!(err, Err(EosError::Config { .. })));
    }

    #[test]
    fn new_rejects_ragged_columns() {
        let err = TabulatedEos::new(
            "bad",
            vec![1.0, 2.0],
            vec![1.0],
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            None,
        );
        assert!(matches!(err, Err(EosError::Config { .. })));
    }

    #[test]
    fn new_rejects_non_positive_values() {
        let err = TabulatedEos::new(
            "bad",
            vec![1.0, 2.0],
            vec![0.0, 1.0],
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            None,
        );
        assert!(err.unwrap_err().to_string().contains("pressure"));
    }

    #[test]
    fn hybrid_spec_builds_table() {
        let spec = EosSpec::Hybrid {
            low_density: PolytropeSpec::default(),
            transition: TransitionSpec {
                e0: 0.5,
                e1: 0.8,
                sound_speed_sq: 0.3,
            },
        };
        let eos = spec.build(&UnitSystem::V1).unwrap();
        assert!(eos.transition().is_some());
    }
}
