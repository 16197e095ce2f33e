//! Equation-of-state errors.

use sp_core::CoreError;
use thiserror::Error;

/// Result type for EOS operations.
pub type EosResult<T> = Result<T, EosError>;

/// Errors raised while building or querying EOS tables.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EosError {
    /// Malformed or empty table.
    #[error("EOS configuration error: {what}")]
    Config { what: String },

    /// Lookup argument outside the tabulated range.
    #[error("{what} = {value} outside tabulated range [{min}, {max}]")]
    Domain {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl From<CoreError> for EosError {
    fn from(err: CoreError) -> Self {
        EosError::Config {
            what: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_error_names_value() {
        let err = EosError::Domain {
            what: "log10 energy density",
            value: 3.25,
            min: -8.0,
            max: 1.0,
        };
        assert!(err.to_string().contains("3.25"));
    }

    #[test]
    fn core_error_becomes_config() {
        let err: EosError = CoreError::NotIncreasing {
            what: "energy density",
            index: 4,
        }
        .into();
        assert!(matches!(err, EosError::Config { .. }));
    }
}
