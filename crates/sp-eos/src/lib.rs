//! sp-eos: equation-of-state tables for starspin.
//!
//! Provides:
//! - `EquationOfState` trait isolating table sources from the model
//! - `TabulatedEos`, a validated table with synthetic generators
//!   (pure polytrope, polytrope with a first-order phase transition)
//! - `EosView`, the log10 lookup tables and density conversions consumed by
//!   the equilibrium model and handed to the relaxation solver
//!
//! # Example
//!
//! ```
//! use sp_core::UnitSystem;
//! use sp_eos::{EosView, PolytropeSpec, TabulatedEos};
//!
//! let units = UnitSystem::V1;
//! let eos = TabulatedEos::polytrope(&PolytropeSpec::default(), &units).unwrap();
//! let view = EosView::bind(&eos, &units).unwrap();
//! let center = view.central_values(1.0).unwrap();
//! assert!(center.enthalpy > 0.0 && center.pressure > 0.0);
//! ```

pub mod error;
pub mod model;
pub mod table;
pub mod view;

// Re-exports for ergonomics
pub use error::{EosError, EosResult};
pub use model::{EquationOfState, TransitionIndices};
pub use table::{EosSpec, PolytropeSpec, TabulatedEos, TransitionSpec};
pub use view::{CentralValues, EosTables, EosView, TransitionBounds};
