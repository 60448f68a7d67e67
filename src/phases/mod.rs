//! phases — layered phases and the collaborators of the intensity model.
//!
//! Purpose
//! -------
//! Supply the minimal phase graph the mixture layer fits against: a
//! [`Phase`] owns its stacking [`ProbabilityModel`](crate::probabilities::ProbabilityModel),
//! one [`Component`] per layer type, and a [`CsdsDistribution`]; a
//! [`Goniometer`] supplies the geometry.
//!
//! Key behaviors
//! -------------
//! - `Phase::get_diffracted_intensity` evaluates the Markov-chain
//!   interference sum averaged over the CSDS, times the Lorentz-polarisation
//!   factor.
//! - Every refinable scalar is addressed by a [`PhaseProperty`]; the phase
//!   exposes get/set/info for it and reports whether inheritance from a
//!   base phase makes it non-refinable.
//! - `Phase::refinables` builds the phase's subtree for the refinement tree.
//!
//! Invariants & assumptions
//! ------------------------
//! - `components().len() == g()` for the lifetime of a phase.
//! - Setters clamp to declared ranges; non-finite input is ignored rather
//!   than stored.
//!
//! Conventions
//! -----------
//! - Angles are `2θ` in degrees; lengths in ångström; `s = 2 sin θ / λ`.
//!
//! Testing notes
//! -------------
//! - Unit tests check the intensity against the Laue function for a
//!   single-type stack, CSDS normalization and property paths.

pub mod component;
pub mod csds;
pub mod goniometer;
pub mod phase;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::component::{Component, ComponentField};
pub use self::csds::CsdsDistribution;
pub use self::goniometer::Goniometer;
pub use self::phase::{Phase, PhaseId, PhaseProperty};
