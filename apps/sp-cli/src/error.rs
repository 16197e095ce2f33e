use sp_continuation::ContinuationError;
use sp_eos::EosError;
use sp_model::ModelError;
use sp_results::{ResultsError, SequenceFailure};

pub type CliResult<T> = Result<T, CliError>;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Run file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Eos(#[from] EosError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Continuation(#[from] ContinuationError),

    #[error(transparent)]
    Results(#[from] ResultsError),

    #[error(transparent)]
    Sequence(#[from] SequenceFailure<ContinuationError>),
}
