//! Errors raised by the bounded minimizer and its callers' objectives.
//!
//! Cancellation signals (`Stopped`, `Killed`) are ordinary variants so a
//! cost function can return them through argmin and have them recovered on
//! the other side by [`From<argmin::core::Error>`].
use argmin::core::{ArgminError, Error};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, PyErr};

pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    /// Stop requested: callers keep the best point seen so far.
    Stopped,
    /// Kill requested: callers discard the run.
    Killed,

    GradientDimMismatch { expected: usize, found: usize },
    InvalidGradient { index: usize, value: f64, reason: &'static str },
    HessianDimMismatch { expected: usize, found: (usize, usize) },
    InvalidHessian { row: usize, col: usize, value: f64 },

    // Solver configuration.
    InvalidTolGrad { tol: f64, reason: &'static str },
    InvalidTolCost { tol: f64, reason: &'static str },
    InvalidMaxIter { max_iter: usize, reason: &'static str },
    NoTolerancesProvided,
    InvalidLineSearch { name: String, reason: &'static str },
    InvalidLBFGSMem { mem: usize, reason: &'static str },
    /// Fit method code outside 0 (L-BFGS), 1 (Nelder-Mead), 3 (Newton-CG).
    UnsupportedMethod { code: i64 },

    // Start point and bounds.
    InvalidBounds { index: usize, lower: f64, upper: f64 },
    BoundsLengthMismatch { expected: usize, found: usize },
    EmptyParameterVector,
    InvalidStartValue { index: usize, value: f64 },

    // Objective and outcome.
    NonFiniteCost { value: f64 },
    /// Model-side failure inside a residual evaluation.
    ObjectiveFailed { text: String },
    InvalidThetaHat { index: usize, value: f64, reason: &'static str },
    MissingThetaHat,

    /// Error reported by argmin itself; `kind` names the argmin variant.
    Solver { kind: &'static str, text: String },
}

impl OptError {
    /// `true` for the two cooperative cancellation signals.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, OptError::Stopped | OptError::Killed)
    }
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Cancellation ----
            OptError::Stopped => f.write_str("refinement stopped"),
            OptError::Killed => f.write_str("refinement killed"),

            // ---- Derivatives ----
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "gradient has {found} entries, solution has {expected}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "gradient entry {index} is {value}: {reason}")
            }
            OptError::HessianDimMismatch { expected, found } => {
                write!(f, "Hessian is {}x{}, expected {expected}x{expected}", found.0, found.1)
            }
            OptError::InvalidHessian { row, col, value } => {
                write!(f, "Hessian entry ({row}, {col}) is {value}")
            }

            // ---- Solver configuration ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "gradient tolerance {tol} {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "cost-change tolerance {tol} {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "iteration limit {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                f.write_str("solver needs a gradient or a cost-change tolerance")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "line search '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "L-BFGS history size {mem}: {reason}")
            }
            OptError::UnsupportedMethod { code } => write!(f, "no fit method with code {code}"),

            // ---- Start point ----
            OptError::InvalidBounds { index, lower, upper } => {
                write!(f, "bound {index} is not an interval: [{lower}, {upper}]")
            }
            OptError::BoundsLengthMismatch { expected, found } => {
                write!(f, "{found} bounds given for {expected} parameters")
            }
            OptError::EmptyParameterVector => f.write_str("nothing to optimize"),
            OptError::InvalidStartValue { index, value } => {
                write!(f, "start value {index} is {value}")
            }

            // ---- Residual and outcome ----
            OptError::NonFiniteCost { value } => write!(f, "residual evaluated to {value}"),
            OptError::ObjectiveFailed { text } => write!(f, "residual evaluation failed: {text}"),
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "best point entry {index} is {value}: {reason}")
            }
            OptError::MissingThetaHat => f.write_str("solver returned no best point"),

            // ---- Backend ----
            OptError::Solver { kind, text } => write!(f, "argmin {kind}: {text}"),
        }
    }
}

impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        // Our own errors are boxed by argmin when a cost function fails.
        let err = match err.downcast::<OptError>() {
            Ok(own) => return own,
            Err(e) => e,
        };
        match err.downcast::<ArgminError>() {
            Ok(argmin_err) => {
                let kind = match &argmin_err {
                    ArgminError::InvalidParameter { .. } => "invalid parameter",
                    ArgminError::NotImplemented { .. } => "not implemented",
                    ArgminError::NotInitialized { .. } => "not initialized",
                    ArgminError::ConditionViolated { .. } => "condition violated",
                    ArgminError::CheckpointNotFound { .. } => "checkpoint not found",
                    ArgminError::PotentialBug { .. } => "potential bug",
                    ArgminError::ImpossibleError { .. } => "impossible error",
                    _ => "error",
                };
                OptError::Solver { kind, text: argmin_err.to_string() }
            }
            Err(other) => OptError::Solver { kind: "backend", text: other.to_string() },
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<OptError> for PyErr {
    fn from(err: OptError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
