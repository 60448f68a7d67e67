//! minimizer — bounded minimization on top of Argmin.
//!
//! Purpose
//! -------
//! Minimize a scalar objective over a box of per-coordinate bounds with one
//! of three backends selected by a numeric code: L-BFGS (0), Nelder–Mead
//! simplex (1), or truncated Newton (3). Callers implement [`Objective`]
//! (or pass a closure) and get back an [`OptimOutcome`] in model space.
//!
//! Key behaviors
//! -------------
//! - Bounds are enforced by variable transforms: the solvers search an
//!   unconstrained θ-space and the adapter maps each candidate through
//!   `Bound::to_model` before evaluating the objective.
//! - Derivatives come from finite differences of that composite cost.
//! - A caller-owned [`BestTracker`] records the best evaluated point, so a
//!   run aborted by the objective (cancellation) or by the backend still
//!   leaves a usable best point behind.
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives never see a point outside their bounds.
//! - Errors raised by the objective come back as the same [`OptError`]
//!   value; `OptError::Stopped` and `OptError::Killed` are never rewrapped.
//!
//! Conventions
//! -----------
//! - `x` denotes model-space vectors, `theta` free-space vectors.
//! - `SolverOptions::lbfgsb_like()` is the default configuration.
//!
//! Downstream usage
//! ----------------
//! - `mixture::optimizer` minimizes the residual over fractions, scales and
//!   background shifts.
//! - `refinement` minimizes the residual over the selected refinable
//!   properties with method code 0.
//!
//! Testing notes
//! -------------
//! - Unit tests in each submodule; [`api`] runs every backend on small
//!   quadratics and checks cancellation propagation.
//!
//! [`OptError`]: crate::optimization::errors::OptError

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::adapter::BestTracker;
pub use self::api::{minimize_bounded, minimize_bounded_with};
pub use self::traits::{
    LineSearcher, Objective, OptimOutcome, SolverMethod, SolverOptions, Tolerances,
};
pub use self::types::{Cost, FnEvalMap, Grad, Theta, DEFAULT_LBFGS_MEM};

pub mod prelude {
    pub use super::api::{minimize_bounded, minimize_bounded_with};
    pub use super::traits::{Objective, OptimOutcome, SolverMethod, SolverOptions};
    pub use super::types::Theta;
}
