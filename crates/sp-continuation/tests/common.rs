#![allow(dead_code)]

use sp_core::UnitSystem;
use sp_eos::{EosView, PolytropeSpec, TabulatedEos, TransitionSpec};
use sp_model::{EquilibriumModel, ModelConfig, SurrogateParams, SurrogateSolver};
use std::sync::Arc;

pub fn polytrope() -> Arc<EosView> {
    let units = UnitSystem::V1;
    let eos = TabulatedEos::polytrope(&PolytropeSpec::default(), &units).unwrap();
    Arc::new(EosView::bind(&eos, &units).unwrap())
}

pub fn hybrid() -> Arc<EosView> {
    let units = UnitSystem::V1;
    let transition = TransitionSpec {
        e0: 0.5,
        e1: 0.8,
        sound_speed_sq: 1.0 / 3.0,
    };
    let eos = TabulatedEos::hybrid(&PolytropeSpec::default(), &transition, &units).unwrap();
    Arc::new(EosView::bind(&eos, &units).unwrap())
}

pub fn config() -> ModelConfig {
    ModelConfig {
        angular_points: 17,
        ..ModelConfig::default()
    }
}

pub fn plain_model() -> EquilibriumModel<SurrogateSolver> {
    EquilibriumModel::new(SurrogateSolver::default(), polytrope(), config()).unwrap()
}

pub fn transition_model() -> EquilibriumModel<SurrogateSolver> {
    let solver = SurrogateSolver::new(SurrogateParams {
        stiff_density: Some(0.8),
        ..SurrogateParams::default()
    });
    EquilibriumModel::new(solver, hybrid(), config()).unwrap()
}
