//! Equation-of-state trait.

/// Indices of the first and last table rows of a first-order phase
/// transition (mixed-phase region). Both rows sit at the transition pressure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionIndices {
    pub start: usize,
    pub end: usize,
}

/// Tabulated equation of state in cgs units.
///
/// All four columns have the same length and are ordered by increasing
/// energy density. Implementations must be thread-safe (Send + Sync) so a
/// bound table can be shared read-only.
pub trait EquationOfState: Send + Sync {
    /// Name of the table (for logging).
    fn name(&self) -> &str;

    /// Energy density divided by c^2 [g/cm^3].
    fn energy_density(&self) -> &[f64];

    /// Pressure [dyn/cm^2].
    fn pressure(&self) -> &[f64];

    /// Specific enthalpy [cm^2/s^2].
    fn enthalpy(&self) -> &[f64];

    /// Baryon number density [cm^-3].
    fn number_density(&self) -> &[f64];

    /// Mixed-phase region, when the table declares one.
    fn transition(&self) -> Option<TransitionIndices> {
        None
    }

    /// Number of tabulated points.
    fn len(&self) -> usize {
        self.energy_density().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
