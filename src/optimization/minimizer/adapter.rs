//! minimizer::adapter — bridge from a bounded [`Objective`] to Argmin.
//!
//! Purpose
//! -------
//! Let Argmin's unconstrained solvers search a box-constrained problem.
//! The adapter evaluates the objective at `Bound::to_model(θ)` for every
//! free-space candidate θ and provides finite-difference gradients and
//! Hessians of that composite cost.
//!
//! Key behaviors
//! -------------
//! - Every successful evaluation is reported to a caller-owned
//!   [`BestTracker`], so the best model-space point survives a solver that
//!   aborts with an error.
//! - Objective errors travel through Argmin boxed and are recovered as the
//!   original [`OptError`] by the caller.
//!
//! Invariants & assumptions
//! ------------------------
//! - `bounds.len()` equals the dimension of every θ the solver proposes;
//!   the entry point validates this once before building the adapter.
//! - The objective never sees a point outside its bounds.
//!
//! Testing notes
//! -------------
//! - Unit tests check the model-space mapping, tracker updates, and error
//!   capture through the gradient path.
use crate::optimization::{
    errors::OptError,
    minimizer::{
        finite_diff::{compute_hessian, fd_gradient},
        traits::Objective,
        types::{Cost, Grad, Hessian, Theta},
    },
    numerical_stability::Bound,
};
use argmin::core::{CostFunction, Error, Gradient, Hessian as HessianFn};
use std::cell::RefCell;

/// Best model-space point seen during a run.
///
/// Owned by the caller and shared by reference with the adapter; only
/// finite values are recorded, and ties keep the earlier point.
#[derive(Debug, Default)]
pub struct BestTracker {
    best: RefCell<Option<(Theta, Cost)>>,
}

impl BestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `(x, value)` if it improves on the current best.
    pub fn observe(&self, x: &Theta, value: Cost) {
        if !value.is_finite() {
            return;
        }
        let mut slot = self.best.borrow_mut();
        let better = match slot.as_ref() {
            Some((_, best)) => value < *best,
            None => true,
        };
        if better {
            *slot = Some((x.clone(), value));
        }
    }

    pub fn best(&self) -> Option<(Theta, Cost)> {
        self.best.borrow().clone()
    }

    pub fn best_value(&self) -> Option<Cost> {
        self.best.borrow().as_ref().map(|(_, v)| *v)
    }
}

#[derive(Debug)]
pub struct BoundedAdapter<'a, F: Objective> {
    pub f: &'a F,
    pub bounds: &'a [Bound],
    pub tracker: &'a BestTracker,
}

impl<'a, F: Objective> BoundedAdapter<'a, F> {
    pub fn new(f: &'a F, bounds: &'a [Bound], tracker: &'a BestTracker) -> Self {
        Self { f, bounds, tracker }
    }

    /// Map a free-space vector into model space coordinate-wise.
    pub fn to_model(&self, theta: &Theta) -> Theta {
        Theta::from_iter(theta.iter().zip(self.bounds.iter()).map(|(&t, b)| b.to_model(t)))
    }

    /// Map a model-space vector into free space coordinate-wise.
    pub fn to_free(&self, x: &Theta) -> Theta {
        Theta::from_iter(x.iter().zip(self.bounds.iter()).map(|(&v, b)| b.to_free(v)))
    }

    /// Cost closure for finite differencing: errors go to `closure_err`
    /// (first one wins) and the closure returns `NaN`.
    fn capture_cost<'b>(
        &'b self, closure_err: &'b RefCell<Option<Error>>,
    ) -> impl Fn(&Theta) -> f64 + 'b {
        move |theta: &Theta| -> f64 {
            match self.cost(theta) {
                Ok(val) => val,
                Err(e) => {
                    let mut slot = closure_err.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                    f64::NAN
                }
            }
        }
    }
}

impl<'a, F: Objective> CostFunction for BoundedAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate the objective at `to_model(θ)`.
    ///
    /// # Errors
    /// - Any `OptError` raised by the objective.
    /// - `OptError::NonFiniteCost` for a NaN or infinite value.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let x = self.to_model(theta);
        let value = self.f.value(&x)?;
        if !value.is_finite() {
            return Err((OptError::NonFiniteCost { value }).into());
        }
        self.tracker.observe(&x, value);
        Ok(value)
    }
}

impl<'a, F: Objective> Gradient for BoundedAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Finite-difference gradient of the composite cost in free space.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let cost_func = self.capture_cost(&closure_err);
        Ok(fd_gradient(theta, &cost_func, &closure_err)?)
    }
}

impl<'a, F: Objective> HessianFn for BoundedAdapter<'a, F> {
    type Param = Theta;
    type Hessian = Hessian;

    /// Finite-difference Hessian built on [`Gradient::gradient`]. A failed
    /// gradient evaluation yields a NaN row internally and its error is
    /// returned once differencing is over.
    fn hessian(&self, theta: &Self::Param) -> Result<Self::Hessian, Error> {
        let grad_err: RefCell<Option<Error>> = RefCell::new(None);
        let grad_fn = |t: &Theta| -> Grad {
            match self.gradient(t) {
                Ok(g) => g,
                Err(e) => {
                    let mut slot = grad_err.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                    Grad::from_elem(t.len(), f64::NAN)
                }
            }
        };
        let hess = compute_hessian(&grad_fn, theta);
        if let Some(err) = grad_err.take() {
            return Err(err);
        }
        Ok(hess?)
    }
}
