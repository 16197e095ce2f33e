//! sp-results: diagnostic dumps of partially computed sequences.

pub mod drain;
pub mod store;
pub mod types;

pub use drain::{SequenceFailure, drain_or_dump};
pub use store::DumpStore;
pub use types::DumpInfo;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dump not found: {path}")]
    NotFound { path: String },
}
