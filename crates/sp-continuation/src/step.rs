//! Items produced by continuation sequences.

use sp_model::ModelSnapshot;
use std::sync::Arc;

/// Lowest axis ratio a sequence will evaluate.
pub const AXIS_RATIO_FLOOR: f64 = 0.5001;
/// Highest axis ratio a sequence will evaluate.
pub const AXIS_RATIO_CEILING: f64 = 0.9999;

/// Why a sequence stopped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Termination {
    /// Central density walked past its target.
    TargetReached,
    /// No root even at the clamped axis ratio; a physical limit of the
    /// sequence such as mass shedding or the non-rotating star.
    BoundaryReached { r_ratio: f64 },
}

/// Result of advancing a sequence by one step.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Model(Arc<ModelSnapshot>),
    Finished(Termination),
}
