//! Errors for stacking-probability models (model selection, parameter access,
//! legacy-argument translation and index math).
//!
//! Numerical degeneracy inside a model (zero weights, cells outside `[0, 1]`,
//! rows that do not sum to one) is **not** an error: it is reported through
//! the validity masks. [`ProbError`] is reserved for caller mistakes that can
//! be detected before any tensor is touched.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, PyErr};

/// Result alias for probability-model operations.
pub type ProbResult<T> = Result<T, ProbError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ProbError {
    // ---- Model selection ----
    /// The (R, G) pair is not in the supported bounds table.
    UnsupportedModel { r: usize, g: usize },

    // ---- Parameters ----
    /// No independent variable with this name exists on the model.
    UnknownParameter { name: String, model: String },

    /// Parameter values must be finite.
    NonFiniteParameter { name: String, value: f64 },

    /// A legacy `Wn`-style argument could not be translated.
    LegacyTranslation { name: String, reason: &'static str },

    // ---- Index math ----
    /// A layer-type index is outside `[0, G)`.
    LayerIndexOutOfRange { index: usize, g: usize },

    /// An index tuple has the wrong length for the requested lookup.
    IndexLengthMismatch { expected: usize, found: usize },
}

impl std::error::Error for ProbError {}

impl std::fmt::Display for ProbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Model selection ----
            ProbError::UnsupportedModel { r, g } => {
                write!(f, "cannot handle R{r} for {g}-layer structures")
            }

            // ---- Parameters ----
            ProbError::UnknownParameter { name, model } => {
                write!(f, "Unknown parameter '{name}' for model {model}")
            }
            ProbError::NonFiniteParameter { name, value } => {
                write!(f, "Parameter '{name}' must be finite, got {value}")
            }
            ProbError::LegacyTranslation { name, reason } => {
                write!(f, "Cannot translate legacy argument '{name}': {reason}")
            }

            // ---- Index math ----
            ProbError::LayerIndexOutOfRange { index, g } => {
                write!(f, "Layer index {index} is out of range for {g} layer types")
            }
            ProbError::IndexLengthMismatch { expected, found } => {
                write!(f, "Index tuple length mismatch: expected {expected}, found {found}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl std::convert::From<ProbError> for PyErr {
    fn from(err: ProbError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
