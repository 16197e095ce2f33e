//! Logarithmic lookup tables derived from a bound equation of state.
//!
//! The columns are stored as log10 of dimensionless quantities, each with a
//! sentinel `0` prepended so table index `i` lines up with the solver's
//! one-based table convention (index 0 is the ghost slot).

use crate::error::{EosError, EosResult};
use crate::model::{EquationOfState, TransitionIndices};
use sp_core::{CoreError, Extrapolation, LinearInterp, UnitSystem};

/// Energy densities bounding the mixed-phase region, in units of
/// `UnitSystem::density_scale`. Always `e0 <= e1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionBounds {
    pub e0: f64,
    pub e1: f64,
}

/// Enthalpy and pressure at the stellar center for a given central density.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CentralValues {
    /// `h / c^2`
    pub enthalpy: f64,
    /// `p / (density_scale c^2)`
    pub pressure: f64,
}

/// Borrowed view of the four log tables, as handed to the relaxation solver.
#[derive(Clone, Copy, Debug)]
pub struct EosTables<'a> {
    pub log_e: &'a [f64],
    pub log_p: &'a [f64],
    pub log_h: &'a [f64],
    pub log_n0: &'a [f64],
    /// Number of tabulated points (sentinel excluded).
    pub size: usize,
    /// Mixed-phase rows, indexed like the tables (sentinel at 0), so
    /// interpolation can avoid straddling the transition.
    pub transition: Option<TransitionIndices>,
}

/// Immutable lookup tables for one equation of state.
#[derive(Clone, Debug, PartialEq)]
pub struct EosView {
    name: String,
    log_e: Vec<f64>,
    log_p: Vec<f64>,
    log_h: Vec<f64>,
    log_n0: Vec<f64>,
    h_at_e: LinearInterp,
    p_at_e: LinearInterp,
    transition: Option<TransitionBounds>,
    transition_rows: Option<TransitionIndices>,
    units: UnitSystem,
}

impl EosView {
    /// Build the log tables and interpolants for `eos`.
    ///
    /// Binding the same table twice yields bit-identical lookup tables.
    pub fn bind(eos: &dyn EquationOfState, units: &UnitSystem) -> EosResult<Self> {
        let n = eos.len();
        if n == 0 {
            return Err(EosError::Config {
                what: format!("EOS '{}' exposes no tabulated points", eos.name()),
            });
        }
        if n < 2 {
            return Err(EosError::Config {
                what: format!("EOS '{}' needs at least two points to interpolate", eos.name()),
            });
        }

        let c2 = units.c_squared();
        let scale = units.density_scale;
        let log_e = with_sentinel(eos.energy_density().iter().map(|e| (e / scale).log10()));
        let log_p = with_sentinel(eos.pressure().iter().map(|p| (p / scale / c2).log10()));
        let log_h = with_sentinel(eos.enthalpy().iter().map(|h| (h / c2).log10()));
        let log_n0 = with_sentinel(eos.number_density().iter().map(|n| n.log10()));

        for (what, col) in [
            ("pressure", &log_p),
            ("enthalpy", &log_h),
            ("number density", &log_n0),
        ] {
            if col.len() != log_e.len() {
                return Err(EosError::Config {
                    what: format!("{what} column length differs from energy density"),
                });
            }
            if let Some(i) = col.iter().position(|v| !v.is_finite()) {
                return Err(EosError::Config {
                    what: format!("{what} is not positive at table row {}", i - 1),
                });
            }
        }

        let h_at_e = LinearInterp::new(
            log_e[1..].to_vec(),
            log_h[1..].to_vec(),
            Extrapolation::Error,
        )?;
        let p_at_e = LinearInterp::new(
            log_e[1..].to_vec(),
            log_p[1..].to_vec(),
            Extrapolation::Error,
        )?;

        let transition_rows = eos.transition().map(|t| TransitionIndices {
            start: t.start + 1,
            end: t.end + 1,
        });
        let transition = eos.transition().map(|t| {
            let e = eos.energy_density();
            TransitionBounds {
                e0: e[t.start] / scale,
                e1: e[t.end] / scale,
            }
        });

        Ok(Self {
            name: eos.name().to_string(),
            log_e,
            log_p,
            log_h,
            log_n0,
            h_at_e,
            p_at_e,
            transition,
            transition_rows,
            units: *units,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> &UnitSystem {
        &self.units
    }

    pub fn transition(&self) -> Option<TransitionBounds> {
        self.transition
    }

    /// Number of tabulated points (sentinel excluded).
    pub fn table_size(&self) -> usize {
        self.log_e.len() - 1
    }

    pub fn tables(&self) -> EosTables<'_> {
        EosTables {
            log_e: &self.log_e,
            log_p: &self.log_p,
            log_h: &self.log_h,
            log_n0: &self.log_n0,
            size: self.table_size(),
            transition: self.transition_rows,
        }
    }

    /// log10 enthalpy at a log10 scaled energy density.
    pub fn enthalpy_at(&self, log_energy_density: f64) -> EosResult<f64> {
        lookup(&self.h_at_e, log_energy_density)
    }

    /// log10 scaled pressure at a log10 scaled energy density.
    pub fn pressure_at(&self, log_energy_density: f64) -> EosResult<f64> {
        lookup(&self.p_at_e, log_energy_density)
    }

    /// Central enthalpy and pressure for scaled central density `ec`.
    pub fn central_values(&self, ec: f64) -> EosResult<CentralValues> {
        if !(ec > 0.0 && ec.is_finite()) {
            let (min, max) = self.h_at_e.domain();
            return Err(EosError::Domain {
                what: "central energy density",
                value: ec,
                min: 10f64.powf(min),
                max: 10f64.powf(max),
            });
        }
        let lg = ec.log10();
        Ok(CentralValues {
            enthalpy: 10f64.powf(self.enthalpy_at(lg)?),
            pressure: 10f64.powf(self.pressure_at(lg)?),
        })
    }
}

fn with_sentinel(values: impl Iterator<Item = f64>) -> Vec<f64> {
    std::iter::once(0.0).chain(values).collect()
}

fn lookup(f: &LinearInterp, x: f64) -> EosResult<f64> {
    f.eval(x).map_err(|err| match err {
        CoreError::OutOfDomain { value, min, max } => EosError::Domain {
            what: "log10 energy density",
            value,
            min,
            max,
        },
        other => EosError::from(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{PolytropeSpec, TabulatedEos, TransitionSpec};

    struct EmptyEos;

    impl EquationOfState for EmptyEos {
        fn name(&self) -> &str {
            "empty"
        }
        fn energy_density(&self) -> &[f64] {
            &[]
        }
        fn pressure(&self) -> &[f64] {
            &[]
        }
        fn enthalpy(&self) -> &[f64] {
            &[]
        }
        fn number_density(&self) -> &[f64] {
            &[]
        }
    }

    fn polytrope() -> TabulatedEos {
        TabulatedEos::polytrope(&PolytropeSpec::default(), &UnitSystem::V1).unwrap()
    }

    #[test]
    fn tables_carry_sentinel() {
        let view = EosView::bind(&polytrope(), &UnitSystem::V1).unwrap();
        let t = view.tables();
        assert_eq!(t.size, 200);
        assert_eq!(t.log_e.len(), 201);
        assert_eq!(t.log_e[0], 0.0);
        assert_eq!(t.log_h[0], 0.0);
        assert!((t.log_e[1] + 8.0).abs() < 1e-12);
    }

    #[test]
    fn empty_eos_is_config_error() {
        let err = EosView::bind(&EmptyEos, &UnitSystem::V1).unwrap_err();
        assert!(matches!(err, EosError::Config { .. }));
    }

    #[test]
    fn out_of_range_lookup_reports_input() {
        let view = EosView::bind(&polytrope(), &UnitSystem::V1).unwrap();
        let err = view.enthalpy_at(2.5).unwrap_err();
        assert!(matches!(err, EosError::Domain { value, .. } if value == 2.5));
        assert!(err.to_string().contains("2.5"));
        assert!(view.pressure_at(-9.0).is_err());
    }

    #[test]
    fn central_values_increase_with_density() {
        let view = EosView::bind(&polytrope(), &UnitSystem::V1).unwrap();
        let a = view.central_values(0.5).unwrap();
        let b = view.central_values(1.0).unwrap();
        assert!(b.enthalpy > a.enthalpy);
        assert!(b.pressure > a.pressure);
        // p / (e c^2) = 0.1 at e = 1 for the default polytrope
        assert!((b.pressure - 0.1).abs() < 1e-3);
        assert!(view.central_values(0.0).is_err());
        assert!(view.central_values(50.0).is_err());
    }

    #[test]
    fn transition_bounds_are_scaled() {
        let t = TransitionSpec {
            e0: 0.5,
            e1: 0.8,
            sound_speed_sq: 1.0 / 3.0,
        };
        let eos = TabulatedEos::hybrid(&PolytropeSpec::default(), &t, &UnitSystem::V1).unwrap();
        let view = EosView::bind(&eos, &UnitSystem::V1).unwrap();
        let b = view.transition().unwrap();
        assert!((b.e0 - 0.5).abs() < 1e-12);
        assert!((b.e1 - 0.8).abs() < 1e-12);
        assert!(b.e0 <= b.e1);
    }

    #[test]
    fn solver_tables_carry_transition_rows() {
        let t = TransitionSpec {
            e0: 0.5,
            e1: 0.8,
            sound_speed_sq: 1.0 / 3.0,
        };
        let eos = TabulatedEos::hybrid(&PolytropeSpec::default(), &t, &UnitSystem::V1).unwrap();
        let raw = eos.transition().unwrap();
        let view = EosView::bind(&eos, &UnitSystem::V1).unwrap();
        let tables = view.tables();
        let rows = tables.transition.unwrap();
        assert_eq!(rows.start, raw.start + 1);
        assert_eq!(rows.end, raw.end + 1);
        assert!((10f64.powf(tables.log_e[rows.start]) - 0.5).abs() < 1e-9);
        assert!((10f64.powf(tables.log_e[rows.end]) - 0.8).abs() < 1e-9);
        // the mixed phase is flat in pressure
        assert_eq!(tables.log_p[rows.start], tables.log_p[rows.end]);

        let plain = EosView::bind(&polytrope(), &UnitSystem::V1).unwrap();
        assert!(plain.tables().transition.is_none());
    }

    #[test]
    fn rebinding_is_bit_identical() {
        let eos = polytrope();
        let a = EosView::bind(&eos, &UnitSystem::V1).unwrap();
        let b = EosView::bind(&eos, &UnitSystem::V1).unwrap();
        let (ta, tb) = (a.tables(), b.tables());
        for (x, y) in [
            (ta.log_e, tb.log_e),
            (ta.log_p, tb.log_p),
            (ta.log_h, tb.log_h),
            (ta.log_n0, tb.log_n0),
        ] {
            assert!(x.iter().zip(y).all(|(u, v)| u.to_bits() == v.to_bits()));
        }
        assert_eq!(a, b);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::table::{PolytropeSpec, TabulatedEos};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn lookups_are_monotone(x in -7.9_f64..0.9, dx in 0.0_f64..0.09) {
            let eos = TabulatedEos::polytrope(&PolytropeSpec::default(), &UnitSystem::V1).unwrap();
            let view = EosView::bind(&eos, &UnitSystem::V1).unwrap();
            prop_assert!(view.enthalpy_at(x).unwrap() <= view.enthalpy_at(x + dx).unwrap());
            prop_assert!(view.pressure_at(x).unwrap() <= view.pressure_at(x + dx).unwrap());
        }
    }
}
