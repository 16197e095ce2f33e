//! Dump metadata.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a dump landed and what it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpInfo {
    pub path: PathBuf,
    pub label: String,
    /// UTC time the dump was written, RFC 3339
    pub timestamp: String,
    pub records: usize,
}
