//! minimizer::finite_diff — finite-difference gradient and Hessian helpers.
//!
//! Purpose
//! -------
//! Provide finite-difference derivatives of a free-space cost so that the
//! gradient-based solvers can run on objectives that only expose values.
//!
//! Key behaviors
//! -------------
//! - [`fd_gradient`]: central differences first, forward differences when an
//!   evaluation failed or the central result does not validate.
//! - [`compute_hessian`]: central-difference Hessian of a gradient function,
//!   forward-difference fallback, symmetrized in place.
//!
//! Invariants & assumptions
//! ------------------------
//! - Any error raised by the objective while differencing is routed into a
//!   shared `closure_err` cell and returned unchanged once differencing is
//!   over. Cancellation signals therefore reach the caller intact.
//! - Returned gradients and Hessians pass [`validate_grad`] and
//!   [`validate_hessian`].
//!
//! Testing notes
//! -------------
//! - Unit tests cover the quadratic happy path, error capture, and the
//!   Hessian fallback to an error when every entry is non-finite.
use crate::optimization::{
    errors::OptResult,
    minimizer::{
        types::Hessian,
        validation::{validate_grad, validate_hessian},
        Grad, Theta,
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Gradient of `func` at `theta` by finite differences.
///
/// `func` must write the first evaluation error into `closure_err` and
/// return `NaN`; the cell is inspected after each differencing pass.
///
/// # Errors
/// - The captured objective error (converted through `From<Error>`).
/// - [`validate_grad`] errors when the forward pass is still non-finite.
pub fn fd_gradient<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let central = theta.central_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    match validate_grad(&central, theta.len()) {
        Ok(()) => Ok(central),
        Err(_) => run_fd_diff(theta, func, closure_err),
    }
}

/// Forward-difference gradient with error capture and validation.
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// Finite-difference Hessian of the gradient function `f` at `theta`.
///
/// Central differences are tried first; when they fail validation the
/// forward-difference matrix is validated and returned instead. The
/// central-path error is discarded.
///
/// # Errors
/// - [`validate_hessian`] errors from the forward path.
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut cent_hess = theta.central_hessian(f);
    match validate_hessian(&cent_hess, dim) {
        Ok(_) => {
            symmetrize_hess(&mut cent_hess);
            Ok(cent_hess)
        }
        Err(_) => {
            let mut forward_hess = theta.forward_hessian(f);
            validate_hessian(&forward_hess, dim)?;
            symmetrize_hess(&mut forward_hess);
            Ok(forward_hess)
        }
    }
}

// ---- Helper methods ----

/// Average each off-diagonal pair; the diagonal is untouched.
fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use approx::assert_relative_eq;
    use ndarray::{array, Array1, Array2};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Central/forward gradient paths and error capture.
    // - Hessian construction, symmetry, and validation failure.
    //
    // They intentionally DO NOT cover:
    // - Solver runs (see `api` tests).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A smooth quadratic yields its analytic gradient.
    //
    // Given
    // -----
    // - f(x) = x₀² + 3x₁ at (1, 2).
    //
    // Expect
    // ------
    // - Gradient ≈ (2, 3).
    fn fd_gradient_matches_quadratic() {
        let theta: Theta = array![1.0, 2.0];
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |x: &Theta| x[0] * x[0] + 3.0 * x[1];

        let g = fd_gradient(&theta, &f, &closure_err).unwrap();

        assert_relative_eq!(g[0], 2.0, epsilon = 1e-5);
        assert_relative_eq!(g[1], 3.0, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // An error captured during differencing is returned unchanged.
    //
    // Given
    // -----
    // - A closure that stores `OptError::Stopped` and returns NaN.
    //
    // Expect
    // ------
    // - `fd_gradient` returns `Err(OptError::Stopped)`.
    fn fd_gradient_propagates_captured_error() {
        let theta: Theta = Array1::from(vec![1.0_f64]);
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_: &Theta| {
            closure_err.replace(Some(OptError::Stopped.into()));
            f64::NAN
        };

        let err = fd_gradient(&theta, &f, &closure_err).unwrap_err();

        assert_eq!(err, OptError::Stopped);
    }

    #[test]
    fn run_fd_diff_rejects_non_finite_gradient() {
        let theta: Theta = array![0.0, 1.0];
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_x: &Theta| f64::NAN;

        let err = run_fd_diff(&theta, &f, &closure_err).unwrap_err();

        assert!(matches!(err, OptError::InvalidGradient { .. }));
    }

    #[test]
    // Purpose
    // -------
    // The Hessian of a quadratic is symmetric and matches the analytic form.
    //
    // Given
    // -----
    // - Gradient g(θ) = (2θ₀ + θ₁, θ₀ + 4θ₁).
    //
    // Expect
    // ------
    // - H ≈ [[2, 1], [1, 4]].
    fn compute_hessian_quadratic() {
        let theta: Theta = array![0.3, -0.2];
        let grad_fn = |t: &Theta| array![2.0 * t[0] + t[1], t[0] + 4.0 * t[1]];

        let h = compute_hessian(&grad_fn, &theta).unwrap();

        assert_eq!(h.shape(), &[2, 2]);
        assert_relative_eq!(h[[0, 0]], 2.0, epsilon = 1e-5);
        assert_relative_eq!(h[[1, 1]], 4.0, epsilon = 1e-5);
        assert_eq!(h[[0, 1]], h[[1, 0]]);
    }

    #[test]
    fn compute_hessian_non_finite_is_error() {
        let theta: Theta = array![0.0];
        let grad_fn = |_t: &Theta| array![f64::NAN];

        let err = compute_hessian(&grad_fn, &theta).unwrap_err();

        assert!(matches!(err, OptError::InvalidHessian { .. }));
    }

    #[test]
    fn symmetrize_averages_off_diagonal() {
        let mut h: Hessian = Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 0.0, 3.0]).unwrap();
        symmetrize_hess(&mut h);
        assert_eq!(h, array![[1.0, 1.0], [1.0, 3.0]]);
    }
}
