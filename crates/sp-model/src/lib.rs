//! Equilibrium model for rapidly rotating relativistic stars.
//!
//! This crate owns the non-uniform radial grid and the field arrays on it,
//! drives an external relaxation solver until the iteration count drops below
//! a threshold, refines the grid around an EOS phase transition when the
//! solver struggles, and memoizes converged models by `(ec, r_ratio)`.

pub mod cache;
pub mod config;
pub mod error;
pub mod fields;
pub mod grid;
pub mod model;
pub mod refine;
pub mod snapshot;
pub mod solver;
pub mod surrogate;

pub use cache::{ModelKey, ResultCache};
pub use config::{GridHierarchy, ModelConfig, SurfaceConditions};
pub use error::{ModelError, ModelResult};
pub use fields::Fields;
pub use grid::Grid;
pub use model::{EquilibriumModel, SolveStats, check_axis_ratio};
pub use refine::{RefineDecision, refined_points, transition_interval};
pub use snapshot::ModelSnapshot;
pub use solver::{
    MassRadius, RelaxOutcome, RelaxRequest, RelaxationSolver, SeedOutcome, SeedRequest,
    SummaryRequest,
};
pub use surrogate::{SolverCalls, SurrogateParams, SurrogateSolver};
