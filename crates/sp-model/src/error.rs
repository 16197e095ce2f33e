//! Error types for equilibrium-model operations.

use sp_eos::EosError;
use thiserror::Error;

/// Errors raised while configuring or solving an equilibrium model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// An interpolation input or grid coordinate is outside its valid range.
    #[error("Domain error: {what} = {value}")]
    Domain { what: String, value: f64 },

    /// Relaxation and refinement exhausted their budget.
    #[error(
        "Not converged at ec={ec}, r_ratio={r_ratio}: {iterations} iterations after {refine_steps} refinement steps"
    )]
    Convergence {
        ec: f64,
        r_ratio: f64,
        iterations: usize,
        refine_steps: usize,
    },

    /// Invalid parameter or configuration, rejected before any state change.
    #[error("Configuration error: {what}")]
    Config { what: String },

    /// Failure reported by the relaxation solver.
    #[error("Solver error: {message}")]
    Solver { message: String },

    #[error("Invariant violated: {what}")]
    Invariant { what: String },
}

pub type ModelResult<T> = Result<T, ModelError>;

impl From<EosError> for ModelError {
    fn from(e: EosError) -> Self {
        match e {
            EosError::Domain { what, value, .. } => ModelError::Domain {
                what: what.to_string(),
                value,
            },
            EosError::Config { what } => ModelError::Config { what },
        }
    }
}
