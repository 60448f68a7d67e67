//! Input and outcome checks for the bounded minimizer.
//!
//! Every check returns the first problem it finds as an [`OptError`], so
//! callers in the mixture fit and the structural refinement can report a
//! precise reason instead of a generic solver failure. Start vectors and
//! bounds are checked before any solver is built; gradients, Hessians and
//! costs are checked as the solver produces them.
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{types::Hessian, Grad, Theta},
    numerical_stability::Bound,
};

/// Shared rule for optional stopping tolerances: absent, or finite and > 0.
fn check_tolerance(tol: Option<f64>, err: fn(f64, &'static str) -> OptError) -> OptResult<()> {
    match tol {
        Some(t) if !t.is_finite() => Err(err(t, "must be finite")),
        Some(t) if t <= 0.0 => Err(err(t, "must be strictly positive")),
        _ => Ok(()),
    }
}

/// # Errors
/// [`OptError::InvalidTolGrad`] for a non-finite or non-positive value.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    check_tolerance(tol, |tol, reason| OptError::InvalidTolGrad { tol, reason })
}

/// # Errors
/// [`OptError::InvalidTolCost`] for a non-finite or non-positive value.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    check_tolerance(tol, |tol, reason| OptError::InvalidTolCost { tol, reason })
}

/// Check that a finite-difference gradient has `dim` finite entries.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] on a length mismatch.
/// - [`OptError::InvalidGradient`] at the first NaN or infinite entry.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    match grad.iter().position(|g| !g.is_finite()) {
        Some(index) => Err(OptError::InvalidGradient {
            index,
            value: grad[index],
            reason: "finite differences produced a non-finite slope",
        }),
        None => Ok(()),
    }
}

/// Unwrap the solver's best parameter vector, rejecting non-finite entries.
///
/// # Errors
/// - [`OptError::MissingThetaHat`] when the solver reported no best point.
/// - [`OptError::InvalidThetaHat`] at the first non-finite entry.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta = theta_hat.ok_or(OptError::MissingThetaHat)?;
    if let Some(index) = theta.iter().position(|v| !v.is_finite()) {
        return Err(OptError::InvalidThetaHat {
            index,
            value: theta[index],
            reason: "best point left the finite domain",
        });
    }
    Ok(theta)
}

/// Residuals are non-negative in practice, but only finiteness is required.
///
/// # Errors
/// [`OptError::NonFiniteCost`] for NaN or infinite values.
pub fn validate_value(value: f64) -> OptResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(OptError::NonFiniteCost { value })
    }
}

/// Check a `dim × dim` Hessian with finite entries (Newton-CG path).
///
/// # Errors
/// - [`OptError::HessianDimMismatch`] on a shape mismatch.
/// - [`OptError::InvalidHessian`] at the first non-finite entry.
pub fn validate_hessian(hessian: &Hessian, dim: usize) -> OptResult<()> {
    if hessian.nrows() != dim || hessian.ncols() != dim {
        return Err(OptError::HessianDimMismatch {
            expected: dim,
            found: (hessian.nrows(), hessian.ncols()),
        });
    }
    for ((i, j), &value) in hessian.indexed_iter() {
        if !value.is_finite() {
            return Err(OptError::InvalidHessian { row: i, col: j, value });
        }
    }
    Ok(())
}

/// Validate a start vector against its bounds.
///
/// # Errors
/// - [`OptError::EmptyParameterVector`] if `x0` is empty.
/// - [`OptError::BoundsLengthMismatch`] if `bounds.len() != x0.len()`.
/// - [`OptError::InvalidBounds`] for NaN or inverted bounds.
/// - [`OptError::InvalidStartValue`] for non-finite start values.
pub fn validate_start(x0: &Theta, bounds: &[Bound]) -> OptResult<()> {
    if x0.is_empty() {
        return Err(OptError::EmptyParameterVector);
    }
    if bounds.len() != x0.len() {
        return Err(OptError::BoundsLengthMismatch { expected: x0.len(), found: bounds.len() });
    }
    for (index, (b, &value)) in bounds.iter().zip(x0.iter()).enumerate() {
        if !b.is_valid() {
            return Err(OptError::InvalidBounds { index, lower: b.lower, upper: b.upper });
        }
        if !value.is_finite() {
            return Err(OptError::InvalidStartValue { index, value });
        }
    }
    Ok(())
}
