//! End-to-end solves against the surrogate solver.

use sp_core::UnitSystem;
use sp_eos::{EosView, PolytropeSpec, TabulatedEos, TransitionSpec};
use sp_model::{
    EquilibriumModel, ModelConfig, ModelError, SurrogateParams, SurrogateSolver,
    transition_interval,
};
use std::sync::Arc;

fn polytrope() -> Arc<EosView> {
    let units = UnitSystem::V1;
    let eos = TabulatedEos::polytrope(&PolytropeSpec::default(), &units).unwrap();
    Arc::new(EosView::bind(&eos, &units).unwrap())
}

fn hybrid() -> Arc<EosView> {
    let units = UnitSystem::V1;
    let transition = TransitionSpec {
        e0: 0.5,
        e1: 0.8,
        sound_speed_sq: 1.0 / 3.0,
    };
    let eos = TabulatedEos::hybrid(&PolytropeSpec::default(), &transition, &units).unwrap();
    Arc::new(EosView::bind(&eos, &units).unwrap())
}

fn stiff(required_spacing: f64) -> SurrogateSolver {
    SurrogateSolver::new(SurrogateParams {
        stiff_density: Some(0.8),
        required_spacing,
        ..SurrogateParams::default()
    })
}

#[test]
fn plain_star_converges_sub_keplerian() {
    let mut model =
        EquilibriumModel::new(SurrogateSolver::default(), polytrope(), ModelConfig::default())
            .unwrap();
    let snapshot = model.solve(0.9, 1.0).unwrap();

    assert!(model.last_iterations() < model.config().max_iterations);
    assert!(snapshot.is_sub_keplerian());
    assert!(snapshot.rest_mass > snapshot.mass);
    assert_eq!(model.stats().refinements, 0);
    assert_eq!(model.stats().unconverged, 0);
}

#[test]
fn repeated_solve_hits_cache() {
    let mut model =
        EquilibriumModel::new(SurrogateSolver::default(), polytrope(), ModelConfig::default())
            .unwrap();
    let first = model.solve(0.85, 1.2).unwrap();
    let calls = model.solver().calls();
    let second = model.solve(0.85, 1.2).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(model.solver().calls(), calls);
    assert_eq!(model.stats().cache_hits, 1);
    assert!(Arc::ptr_eq(model.last().unwrap(), &first));
}

#[test]
fn transition_star_refines_to_finest_tier() {
    let mut model = EquilibriumModel::new(stiff(1e-3), hybrid(), ModelConfig::default()).unwrap();
    model.solve(0.9, 0.9).unwrap();
    assert!(model.is_refined());
    assert!(model.stats().refinements >= 1);

    let finest = model.config().hierarchy.finest();
    let points = model.grid().points();
    let (s0, s1) = transition_interval(
        &model.fields().energy,
        points,
        0.8,
        model.config().s_max,
    )
    .unwrap();

    let fine_inside = points.windows(2).any(|w| {
        (s0..=s1).contains(&w[1]) && ((w[1] - w[0]) - finest).abs() < 1e-9
    });
    assert!(fine_inside, "no finest-tier point inside [{s0}, {s1}]");
    assert!(points.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn refinement_budget_is_respected() {
    let config = ModelConfig {
        max_refine_steps: 3,
        ..ModelConfig::default()
    };
    let mut model = EquilibriumModel::new(stiff(1e-9), hybrid(), config).unwrap();
    let err = model.solve(0.9, 0.9).unwrap_err();

    assert!(matches!(err, ModelError::Convergence { refine_steps: 3, .. }));
    let stats = model.stats();
    assert_eq!(stats.refinements, 3);
    assert_eq!(stats.relaxations, 4);
    assert_eq!(stats.summaries, 0);
}

#[test]
fn non_strict_call_overrides_config() {
    let config = ModelConfig {
        max_refine_steps: 1,
        ..ModelConfig::default()
    };
    let mut model = EquilibriumModel::new(stiff(1e-9), hybrid(), config).unwrap();
    assert!(model.solve(0.9, 0.9).is_err());
    let snapshot = model.solve_with(0.9, 0.9, false).unwrap();
    assert_eq!(snapshot.r_ratio, 0.9);
    assert_eq!(model.stats().unconverged, 1);
}

#[test]
fn strict_solve_after_lenient_one_still_fails() {
    let config = ModelConfig {
        max_refine_steps: 1,
        ..ModelConfig::default()
    };
    let mut model = EquilibriumModel::new(stiff(1e-9), hybrid(), config).unwrap();
    let lenient = model.solve_with(0.9, 0.9, false).unwrap();
    assert_eq!(model.stats().unconverged, 1);
    assert!(model.cache().is_empty());

    let err = model.solve(0.9, 0.9).unwrap_err();
    assert!(matches!(err, ModelError::Convergence { .. }));
    assert_eq!(model.stats().cache_hits, 0);

    // a second lenient call re-solves rather than reusing the first result
    let again = model.solve_with(0.9, 0.9, false).unwrap();
    assert!(!Arc::ptr_eq(&lenient, &again));
    assert_eq!(model.stats().unconverged, 2);
}

#[test]
fn solver_sees_transition_rows() {
    let view = hybrid();
    let rows = view.tables().transition.unwrap();
    let mut model = EquilibriumModel::new(stiff(1e-3), view, ModelConfig::default()).unwrap();
    model.solve(0.9, 0.9).unwrap();
    assert_eq!(model.solver().transition_rows(), Some(rows));

    let mut plain =
        EquilibriumModel::new(SurrogateSolver::default(), polytrope(), ModelConfig::default())
            .unwrap();
    plain.solve(0.9, 1.0).unwrap();
    assert_eq!(plain.solver().transition_rows(), None);
}

#[test]
fn snapshot_serializes_as_flat_record() {
    let mut model =
        EquilibriumModel::new(SurrogateSolver::default(), polytrope(), ModelConfig::default())
            .unwrap();
    let snapshot = model.solve(0.7, 1.0).unwrap();
    let json = serde_json::to_value(&*snapshot).unwrap();
    assert_eq!(json["r_ratio"], 0.7);
    assert_eq!(json["ec"], 1.0);
    assert!(json["Omega"].as_f64().unwrap() <= json["Omega_K"].as_f64().unwrap());
}
