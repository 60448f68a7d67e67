//! Errors for mixtures (grid construction and edits, solution vectors,
//! method selection, refinable-property lookup).
//!
//! ## Conventions
//! - **Rows are specimens, columns are phase slots**; indices are 0-based.
//! - Probability-model and optimizer failures are wrapped unchanged so the
//!   cancellation signals in [`OptError`] stay inspectable.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, PyErr};

use crate::{optimization::errors::OptError, probabilities::ProbError};

/// Result alias for mixture operations.
pub type MixtureResult<T> = Result<T, MixtureError>;

#[derive(Debug, Clone, PartialEq)]
pub enum MixtureError {
    // ---- Construction / shape ----
    /// A per-row or per-column list disagrees with the phase matrix.
    ShapeMismatch { what: &'static str, expected: usize, found: usize },

    /// Row index outside the phase matrix.
    RowOutOfRange { index: usize, rows: usize },

    /// Column index outside the phase matrix.
    ColumnOutOfRange { index: usize, cols: usize },

    /// A phase id that is not in the mixture's phase pool.
    UnknownPhase { index: usize },

    /// A specimen id that is not in the mixture's specimen pool.
    UnknownSpecimen { index: usize },

    /// Experimental pattern arrays of different lengths.
    PatternLengthMismatch { two_theta: usize, intensity: usize },

    // ---- Solutions ----
    /// Flat solution vector of the wrong length.
    SolutionLengthMismatch { expected: usize, found: usize },

    /// Fractions, scales and background shifts must be finite.
    NonFiniteSolution { index: usize, value: f64 },

    // ---- Methods ----
    /// Unknown fit method code (valid: 0, 1, 3).
    UnsupportedFitMethod { code: i64 },

    /// Unknown refine method code (valid: 0, 1, 100).
    UnsupportedRefineMethod { code: i64 },

    /// Unknown residual statistic name.
    UnknownResidualKind { name: String },

    // ---- Refinement ----
    /// A refinable property path does not resolve in this mixture.
    UnknownProperty { path: String },

    /// A refinement option outside its accepted range.
    InvalidRefineOption { option: &'static str, reason: &'static str },

    // ---- Wrapped ----
    Probability(ProbError),
    Optimization(OptError),
}

impl MixtureError {
    /// `true` when this wraps a cooperative stop or kill signal.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, MixtureError::Optimization(e) if e.is_cancellation())
    }
}

impl std::error::Error for MixtureError {}

impl std::fmt::Display for MixtureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Construction / shape ----
            MixtureError::ShapeMismatch { what, expected, found } => {
                write!(f, "Length of {what} must be {expected}, found {found}")
            }
            MixtureError::RowOutOfRange { index, rows } => {
                write!(f, "Specimen row {index} is out of range for {rows} rows")
            }
            MixtureError::ColumnOutOfRange { index, cols } => {
                write!(f, "Phase column {index} is out of range for {cols} columns")
            }
            MixtureError::UnknownPhase { index } => write!(f, "Unknown phase id {index}"),
            MixtureError::UnknownSpecimen { index } => write!(f, "Unknown specimen id {index}"),
            MixtureError::PatternLengthMismatch { two_theta, intensity } => write!(
                f,
                "Experimental pattern length mismatch: {two_theta} angles, {intensity} intensities"
            ),

            // ---- Solutions ----
            MixtureError::SolutionLengthMismatch { expected, found } => {
                write!(f, "Solution length mismatch: expected {expected}, found {found}")
            }
            MixtureError::NonFiniteSolution { index, value } => {
                write!(f, "Solution entry {index} must be finite, got {value}")
            }

            // ---- Methods ----
            MixtureError::UnsupportedFitMethod { code } => {
                write!(f, "Unsupported optimizer method code {code}; valid codes are 0, 1, 3")
            }
            MixtureError::UnsupportedRefineMethod { code } => {
                write!(f, "Unsupported refine method code {code}; valid codes are 0, 1, 100")
            }
            MixtureError::UnknownResidualKind { name } => {
                write!(f, "Unknown residual kind '{name}'; valid kinds are Rp, Rwp, Rpder")
            }

            // ---- Refinement ----
            MixtureError::UnknownProperty { path } => {
                write!(f, "Unknown refinable property {path}")
            }
            MixtureError::InvalidRefineOption { option, reason } => {
                write!(f, "Invalid refinement option {option}: {reason}")
            }

            // ---- Wrapped ----
            MixtureError::Probability(e) => write!(f, "Probability model error: {e}"),
            MixtureError::Optimization(e) => write!(f, "Optimization error: {e}"),
        }
    }
}

impl From<ProbError> for MixtureError {
    fn from(err: ProbError) -> Self {
        MixtureError::Probability(err)
    }
}

impl From<OptError> for MixtureError {
    fn from(err: OptError) -> Self {
        MixtureError::Optimization(err)
    }
}

/// Inside objectives the mixture error must travel as an `OptError`;
/// wrapped optimizer errors are unwrapped so cancellation survives.
impl From<MixtureError> for OptError {
    fn from(err: MixtureError) -> Self {
        match err {
            MixtureError::Optimization(e) => e,
            other => OptError::ObjectiveFailed { text: other.to_string() },
        }
    }
}

#[cfg(feature = "python-bindings")]
impl std::convert::From<MixtureError> for PyErr {
    fn from(err: MixtureError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
