//! Flat JSON dumps of model snapshots.

use crate::types::DumpInfo;
use crate::{ResultsError, ResultsResult};
use chrono::Utc;
use sp_model::ModelSnapshot;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory of `<label>-<UTC timestamp>.json` files, each a JSON array of
/// snapshot records.
#[derive(Clone, Debug)]
pub struct DumpStore {
    root_dir: PathBuf,
}

impl DumpStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Write `records` as one flat array. Never overwrites an earlier dump.
    pub fn dump<'a, I>(&self, label: &str, records: I) -> ResultsResult<DumpInfo>
    where
        I: IntoIterator<Item = &'a ModelSnapshot>,
    {
        let records: Vec<&ModelSnapshot> = records.into_iter().collect();
        let now = Utc::now();
        let label = sanitize(label);
        let stem = format!("{label}-{}", now.format("%Y%m%dT%H%M%S%.3fZ"));

        let mut path = self.root_dir.join(format!("{stem}.json"));
        let mut n = 1;
        while path.exists() {
            path = self.root_dir.join(format!("{stem}-{n}.json"));
            n += 1;
        }

        let json = serde_json::to_string_pretty(&records)?;
        fs::write(&path, json)?;

        Ok(DumpInfo {
            path,
            label,
            timestamp: now.to_rfc3339(),
            records: records.len(),
        })
    }

    pub fn load(&self, path: &Path) -> ResultsResult<Vec<ModelSnapshot>> {
        if !path.exists() {
            return Err(ResultsError::NotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Dump files in the store, oldest first.
    pub fn list(&self) -> ResultsResult<Vec<PathBuf>> {
        let mut dumps = Vec::new();
        for entry in fs::read_dir(&self.root_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                dumps.push(path);
            }
        }
        dumps.sort();
        Ok(dumps)
    }
}

fn sanitize(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "sequence".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize("spin-down_1"), "spin-down_1");
        assert_eq!(sanitize("ec=1.13 r/0.7"), "ec_1_13_r_0_7");
        assert_eq!(sanitize(""), "sequence");
    }
}
