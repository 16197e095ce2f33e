//! Drain a sequence, dumping the partial result if it fails.

use crate::ResultsError;
use crate::store::DumpStore;
use sp_model::ModelSnapshot;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, warn};

/// A sequence error, with the fate of the partial dump attached.
#[derive(thiserror::Error, Debug)]
pub enum SequenceFailure<E>
where
    E: std::error::Error + 'static,
{
    #[error("{source} (partial sequence of {records} models dumped to {})", .path.display())]
    Dumped {
        source: E,
        path: PathBuf,
        records: usize,
    },

    #[error("{source} (dumping {records} models failed: {dump_error})")]
    DumpFailed {
        source: E,
        dump_error: ResultsError,
        records: usize,
    },
}

impl<E> SequenceFailure<E>
where
    E: std::error::Error + 'static,
{
    /// The error that stopped the sequence.
    pub fn cause(&self) -> &E {
        match self {
            SequenceFailure::Dumped { source, .. } => source,
            SequenceFailure::DumpFailed { source, .. } => source,
        }
    }
}

/// Collect every snapshot of `sequence`. On the first error the snapshots
/// gathered so far are dumped under `label` before the error is returned.
pub fn drain_or_dump<I, E>(
    sequence: I,
    store: &DumpStore,
    label: &str,
) -> Result<Vec<Arc<ModelSnapshot>>, SequenceFailure<E>>
where
    I: IntoIterator<Item = Result<Arc<ModelSnapshot>, E>>,
    E: std::error::Error + 'static,
{
    let mut collected = Vec::new();
    for item in sequence {
        match item {
            Ok(snapshot) => collected.push(snapshot),
            Err(source) => {
                let records = collected.len();
                let dumped = store.dump(label, collected.iter().map(|s| s.as_ref()));
                return Err(match dumped {
                    Ok(info) => {
                        warn!(
                            path = %info.path.display(),
                            records,
                            "Sequence failed; partial result dumped"
                        );
                        SequenceFailure::Dumped {
                            source,
                            path: info.path,
                            records,
                        }
                    }
                    Err(dump_error) => {
                        error!(%dump_error, records, "Sequence failed and so did its dump");
                        SequenceFailure::DumpFailed {
                            source,
                            dump_error,
                            records,
                        }
                    }
                });
            }
        }
    }
    Ok(collected)
}
