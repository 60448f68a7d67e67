//! optimization — bounded minimizer, numerical helpers, and error surface.
//!
//! Purpose
//! -------
//! Provide the numerical optimization layer used by mixture fitting and
//! structural refinement: an Argmin-backed bounded minimizer, stable
//! transforms between bounded and free parameter spaces, and a single
//! error/result surface.
//!
//! Key behaviors
//! -------------
//! - `minimizer` minimizes an objective over per-coordinate bounds with a
//!   backend chosen by numeric code (0 L-BFGS, 1 Nelder–Mead, 3 truncated
//!   Newton).
//! - `numerical_stability` supplies overflow-safe softplus/logistic maps and
//!   the [`Bound`](numerical_stability::Bound) transform.
//! - `errors::OptError` normalizes configuration problems, numerical
//!   failures, backend errors and cooperative cancellation.
//!
//! Invariants & assumptions
//! ------------------------
//! - Invalid states are reported as `OptError`, never as panics.
//! - Cancellation (`Stopped`, `Killed`) raised inside an objective reaches
//!   the caller unchanged through the Argmin boundary.
//!
//! Conventions
//! -----------
//! - All solvers minimize. Outcomes report values and points in model
//!   space.
//! - This layer does not log except at debug level when `verbose` is set.
//!
//! Downstream usage
//! ----------------
//! - `mixture` and `refinement` build objectives as closures over their own
//!   state and call `minimizer::minimize_bounded_with`.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each submodule; mixture and refinement tests
//!   exercise the minimizer on real residual surfaces.

pub mod errors;
pub mod minimizer;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_xrd::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::minimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
