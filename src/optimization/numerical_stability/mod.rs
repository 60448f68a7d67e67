//! numerical_stability — overflow-safe transforms for bounded searches.
//!
//! Purpose
//! -------
//! Collect the small numeric primitives that let unconstrained solvers work
//! on box-constrained problems: stable softplus/logistic maps and the
//! per-coordinate [`Bound`] transform built on them.
//!
//! Key behaviors
//! -------------
//! - Evaluate softplus, logistic and their inverses without overflow or
//!   catastrophic cancellation.
//! - Map free coordinates into `[lo, hi]`, `[lo, ∞)`, `(-∞, hi]` or ℝ and
//!   back, nudging values that sit exactly on a finite bound inside.
//!
//! Invariants & assumptions
//! ------------------------
//! - Outputs of `Bound::to_model` always lie inside the bound, for any
//!   finite input.
//! - Inputs to the inverse maps may sit on or outside a bound; they are
//!   clamped before inversion rather than producing NaN.
//!
//! Conventions
//! -----------
//! - "free" / θ-space is the solver's unconstrained space; "model" space is
//!   the bounded space the objective is evaluated in.
//!
//! Downstream usage
//! ----------------
//! - The bounded adapter in `minimizer` maps every candidate through
//!   `Bound::to_model` before calling the objective.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] cover agreement with naive formulas
//!   and round trips for all four bound kinds.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    safe_logistic, safe_logit, safe_softplus, safe_softplus_inv, Bound, LOGIT_EPS, START_OFFSET,
};

pub mod prelude {
    pub use super::transformations::{Bound, LOGIT_EPS};
}
