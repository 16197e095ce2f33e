//! sp-core: stable foundation for starspin.
//!
//! Contains:
//! - units (versioned physical-constant table + uom constructors)
//! - numeric (finiteness and ordering checks, tier lookup)
//! - interp (monotone piecewise-linear interpolation)
//! - timing (opt-in wall-clock timers)
//! - error (shared error types)

pub mod error;
pub mod interp;
pub mod numeric;
pub mod timing;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use interp::{Extrapolation, LinearInterp, resample_linear};
pub use numeric::*;
pub use units::*;
