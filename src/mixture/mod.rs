//! mixture — phase/specimen grids and the fit of fractions, scales and
//! background shifts.
//!
//! Purpose
//! -------
//! Combine phases and specimens into a [`Mixture`], compute calculated
//! patterns for a flat solution vector and fit that vector against the
//! experimental data.
//!
//! Key behaviors
//! -------------
//! - [`data`]: the grid and its parallel per-row/per-column lists, kept in
//!   lock-step by every edit.
//! - [`mixture`]: pools, pattern write-back, freeze/thaw, refine lock and the
//!   refinable-property tree.
//! - [`optimizer`]: cached residual parts, residual evaluation and the
//!   bounded fit with post-processing.
//! - [`statistics`]: `Rp`, `Rwp` and `Rpder`.
//!
//! Conventions
//! -----------
//! - Rows are specimens, columns are phase slots.
//! - Solution vectors are `fractions ++ scales [++ bgshifts]`.
pub mod data;
pub mod errors;
#[allow(clippy::module_inception)]
pub mod mixture;
pub mod optimizer;
pub mod specimen;
pub mod statistics;

pub use self::{
    data::MixtureData,
    errors::{MixtureError, MixtureResult},
    mixture::{Mixture, MixtureOptions, RefineGuard},
    optimizer::{get_residual, get_residual_parts, optimize, optimize_with, ResidualParts},
    specimen::{Specimen, SpecimenId},
    statistics::ResidualKind,
};
