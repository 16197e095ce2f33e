//! Error types for continuation sequences.

use sp_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContinuationError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Root not bracketed on [{low}, {high}]: f(low) = {f_low}, f(high) = {f_high}")]
    NotBracketed {
        low: f64,
        high: f64,
        f_low: f64,
        f_high: f64,
    },

    #[error("Root finder stalled after {iterations} iterations on [{low}, {high}]")]
    NoConvergence {
        low: f64,
        high: f64,
        iterations: usize,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },
}

pub type ContinuationResult<T> = Result<T, ContinuationError>;
