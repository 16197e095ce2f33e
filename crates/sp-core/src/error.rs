use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Value {value} outside interpolation domain [{min}, {max}]")]
    OutOfDomain { value: f64, min: f64, max: f64 },

    #[error("Sequence not strictly increasing: {what} (index={index})")]
    NotIncreasing { what: &'static str, index: usize },

    #[error("Length mismatch: {what} (expected={expected}, got={got})")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
}
