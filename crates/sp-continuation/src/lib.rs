//! Continuation sequences of equilibrium models.
//!
//! Provides:
//! - Ridders bracketed root finder over model outputs
//! - `SpinDown`: constant-rest-mass sequence with predictive bracketing
//! - `is_stable`: turning-point test along constant angular momentum
//! - `KeplerSweep`: serpentine walk between the mass-shedding limit and
//!   near-spherical stars
//!
//! Sequences are explicit iterators over a mutably borrowed model. Each step
//! commits model state, so dropping a sequence early needs no cleanup.

pub mod error;
pub mod ridder;
pub mod spin_down;
pub mod stability;
pub mod step;
pub mod sweep;

pub use error::{ContinuationError, ContinuationResult};
pub use ridder::{RidderConfig, RidderResult, ridder};
pub use spin_down::{SpinDown, SpinDownOptions};
pub use stability::{StabilityOptions, is_stable};
pub use step::{AXIS_RATIO_CEILING, AXIS_RATIO_FLOOR, Step, Termination};
pub use sweep::{KeplerSweep, KeplerSweepOptions};
