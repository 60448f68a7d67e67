//! probabilities — Markov-chain stacking models for layered structures.
//!
//! Purpose
//! -------
//! Compute the weight (`W`) and conditional-probability (`P`) matrices that
//! describe how layer types follow each other in a disordered layered
//! crystal, for interaction ranges ("Reichweite") R = 0..3 and G = 1..6
//! layer types, from a handful of human-meaningful independent variables.
//!
//! Key behaviors
//! -------------
//! - [`core`] owns the shared pieces: the supported-bounds table and base-G
//!   index flattening ([`core::shape`]), the generic sequence-weight →
//!   `W`/`P` solver ([`core::matrices`]), per-cell validity masks
//!   ([`core::validation`]) and parameter records ([`core::params`]).
//! - [`models`] holds the closed-form derivation per (R, G) behind the single
//!   [`ProbabilityModel`] type.
//!
//! Invariants & assumptions
//! ------------------------
//! - Only pairs in the bounds table can be constructed.
//! - Every row of `P` sums to one and the diagonal of `W` sums to one, or
//!   the validity masks say otherwise; invalid-but-computed states are
//!   normal and never raise.
//! - Every stored value is derived from the current parameters; there is
//!   no partially updated state visible to callers.
//!
//! Conventions
//! -----------
//! - Matrices are `rank × rank` with `rank = G^max(R, 1)`; R0 models use
//!   the same pairwise storage as R1.
//! - Errors are reported as [`errors::ProbError`] via [`errors::ProbResult`].
//!
//! Downstream usage
//! ----------------
//! - Phases own one [`ProbabilityModel`] consistent with their (R, G) and
//!   feed its `P` and diagonal `W` into the interference calculation.
//! - The refinement layer reads and writes independent variables by name
//!   and consults each parameter's inherit flag and refinement info.
//!
//! Testing notes
//! -------------
//! - Unit tests in every submodule; the model-level suite sweeps all
//!   supported pairs for stochasticity, normalization and validity flags.

pub mod core;
pub mod errors;
pub mod models;

pub use self::errors::{ProbError, ProbResult};
pub use self::models::{get_correct_probability_model, ModelKind, ModelUpdate, ProbabilityModel};

pub mod prelude {
    pub use super::core::{EffectiveParams, ModelShape, ValidityMasks, VALIDITY_TOL};
    pub use super::errors::{ProbError, ProbResult};
    pub use super::models::{
        get_correct_probability_model, ModelKind, ModelUpdate, ProbabilityModel,
    };
}
