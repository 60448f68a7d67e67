//! refinement — structural refinement of a mixture.
//!
//! Purpose
//! -------
//! Discover the refinable properties of a mixture's phases, search their
//! ranges for the lowest residual, and report the run through a
//! [`RefineContext`].
//!
//! Key behaviors
//! -------------
//! - [`refinables`] flattens the per-phase property trees; selected leaves
//!   are those flagged `refine` and currently refinable.
//! - [`refiner`] drives one run under the mixture's refine lock, polling a
//!   [`CancelToken`] at every evaluation.
//! - [`methods`] holds the search methods: bounded L-BFGS (code 0), genetic
//!   (1) and grid search (100).
//!
//! Invariants & assumptions
//! ------------------------
//! - At most one run per mixture at a time; a second request is rejected,
//!   not queued.
//! - Cancellation is cooperative; its latency is one residual evaluation.
pub mod cancel;
pub mod context;
pub mod info;
pub mod methods;
pub mod refinables;
pub mod refiner;

pub use self::{
    cancel::CancelToken,
    context::{RefineContext, RefineStatus},
    info::RefinementInfo,
    methods::{BruteForceOptions, GeneticOptions, RefineMethod},
    refinables::{PropertyPath, RefinableNode, RefinementRow, RefinementTree},
    refiner::{refine, spawn_refinement, RefineOptions},
};
