//! YAML run files.

use crate::error::CliResult;
use serde::{Deserialize, Serialize};
use sp_core::UnitSystem;
use sp_eos::{EosSpec, EosView, PolytropeSpec};
use sp_model::{EquilibriumModel, ModelConfig, SurrogateParams, SurrogateSolver};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_DUMP_DIR: &str = "starspin-dumps";

/// Everything needed to build a model driven by the surrogate solver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub model: ModelConfig,
    pub eos: EosSpec,
    pub surrogate: SurrogateParams,
    /// Where partial sequences are dumped on failure
    pub dump_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            eos: EosSpec::Polytrope(PolytropeSpec::default()),
            surrogate: SurrogateParams::default(),
            dump_dir: None,
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> CliResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn dump_dir(&self) -> PathBuf {
        self.dump_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DUMP_DIR))
    }

    pub fn build_model(&self) -> CliResult<EquilibriumModel<SurrogateSolver>> {
        let units = UnitSystem::V1;
        let eos = self.eos.build(&units)?;
        let view = EosView::bind(&eos, &units)?;
        let solver = SurrogateSolver::new(self.surrogate.clone());
        Ok(EquilibriumModel::new(
            solver,
            Arc::new(view),
            self.model.clone(),
        )?)
    }
}
