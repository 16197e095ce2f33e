// sp-core/src/units.rs

use uom::si::f64::{
    AngularVelocity as UomAngularVelocity, Length as UomLength, Mass as UomMass,
    MassDensity as UomMassDensity, Ratio as UomRatio,
};

// Public canonical unit types (SI, f64)
pub type AngularVelocity = UomAngularVelocity;
pub type Length = UomLength;
pub type Mass = UomMass;
pub type Density = UomMassDensity;
pub type Ratio = UomRatio;

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn km(v: f64) -> Length {
    use uom::si::length::kilometer;
    Length::new::<kilometer>(v)
}

#[inline]
pub fn g_per_cm3(v: f64) -> Density {
    use uom::si::mass_density::gram_per_cubic_centimeter;
    Density::new::<gram_per_cubic_centimeter>(v)
}

#[inline]
pub fn rad_per_s(v: f64) -> AngularVelocity {
    use uom::si::angular_velocity::radian_per_second;
    AngularVelocity::new::<radian_per_second>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

/// Fixed table of physical constants (cgs) shared by table construction and
/// solver boundary data.
///
/// The table is versioned so results can be traced back to the constants
/// that produced them; it is always passed explicitly.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitSystem {
    pub version: u32,
    /// Speed of light [cm/s]
    pub c: f64,
    /// Gravitational constant [cm^3 g^-1 s^-2]
    pub g: f64,
    /// Solar mass [g]
    pub msun: f64,
    /// Energy densities are tabulated in units of this many g/cm^3.
    pub density_scale: f64,
}

impl UnitSystem {
    pub const V1: UnitSystem = UnitSystem {
        version: 1,
        c: 2.9979e10,
        g: 6.6732e-8,
        msun: 1.987e33,
        density_scale: 1e15,
    };

    /// Square of the solver length unit [cm^2]: `density_scale^-1 * c^2 / G`.
    pub fn kappa(&self) -> f64 {
        self.c * self.c / (self.g * self.density_scale)
    }

    /// Solver length unit in km.
    pub fn length_unit_km(&self) -> f64 {
        self.kappa().sqrt() * 1e-5
    }

    pub fn c_squared(&self) -> f64 {
        self.c * self.c
    }

    pub fn solar_masses(&self, v: f64) -> Mass {
        kg(v * self.msun * 1e-3)
    }
}

impl Default for UnitSystem {
    fn default() -> Self {
        Self::V1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _l = km(12.0);
        let _m = kg(2.0e30);
        let _rho = g_per_cm3(1e15);
        let _w = rad_per_s(1.0e3);
        let _r = unitless(0.5);
    }

    #[test]
    fn length_unit_matches_kappa() {
        // sqrt(c^2 / (G * 1e15)) ~ 36.7 km for the v1 constants
        let l = UnitSystem::V1.length_unit_km();
        assert!(l > 36.0 && l < 37.5, "length unit {l}");
    }

    #[test]
    fn solar_mass_conversion() {
        use uom::si::mass::kilogram;
        let m = UnitSystem::V1.solar_masses(1.0);
        assert!((m.get::<kilogram>() - 1.987e30).abs() / 1.987e30 < 1e-12);
    }
}
