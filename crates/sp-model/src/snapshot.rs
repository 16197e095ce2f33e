//! Immutable summary of a solved model.

use serde::{Deserialize, Serialize};
use sp_core::{AngularVelocity, Length, Mass, UnitSystem, km, rad_per_s};

/// Scalar outputs of one converged (or best-effort) model.
///
/// Masses are in solar masses, `R` in km and angular velocities in 1/s.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    #[serde(rename = "M")]
    pub mass: f64,
    #[serde(rename = "M0")]
    pub rest_mass: f64,
    pub r_ratio: f64,
    #[serde(rename = "R")]
    pub radius: f64,
    #[serde(rename = "Omega")]
    pub omega: f64,
    #[serde(rename = "Omega_K")]
    pub omega_k: f64,
    #[serde(rename = "J")]
    pub angular_momentum: f64,
    /// Rotational kinetic energy `Omega J / 2`
    #[serde(rename = "T")]
    pub kinetic_energy: f64,
    #[serde(rename = "Mp")]
    pub proper_mass: f64,
    pub ec: f64,
}

impl ModelSnapshot {
    pub fn is_sub_keplerian(&self) -> bool {
        self.omega <= self.omega_k
    }

    pub fn mass_quantity(&self, units: &UnitSystem) -> Mass {
        units.solar_masses(self.mass)
    }

    pub fn rest_mass_quantity(&self, units: &UnitSystem) -> Mass {
        units.solar_masses(self.rest_mass)
    }

    pub fn radius_quantity(&self) -> Length {
        km(self.radius)
    }

    pub fn omega_quantity(&self) -> AngularVelocity {
        rad_per_s(self.omega)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uom::si::length::meter;
    use uom::si::mass::kilogram;

    fn snapshot() -> ModelSnapshot {
        ModelSnapshot {
            mass: 1.4,
            rest_mass: 1.54,
            r_ratio: 0.9,
            radius: 12.6,
            omega: 3000.0,
            omega_k: 7000.0,
            angular_momentum: 1.2,
            kinetic_energy: 1800.0,
            proper_mass: 1.47,
            ec: 1.0,
        }
    }

    #[test]
    fn serializes_with_record_names() {
        let json = serde_json::to_value(snapshot()).unwrap();
        for key in ["M", "M0", "r_ratio", "R", "Omega", "Omega_K", "J", "T", "Mp", "ec"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn converts_to_quantities() {
        let s = snapshot();
        let m = s.mass_quantity(&UnitSystem::V1).get::<kilogram>();
        assert!((m / 1.4 / 1.987e30 - 1.0).abs() < 1e-9);
        assert!((s.radius_quantity().get::<meter>() - 12_600.0).abs() < 1e-6);
        assert!(s.is_sub_keplerian());
    }
}
