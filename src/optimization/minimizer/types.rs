//! Numeric aliases and concrete argmin solver types for the bounded
//! minimizer. Solutions are `ndarray` vectors of `f64`; the line-search
//! aliases follow argmin's `(Param, Gradient, Float)` generics.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    neldermead::NelderMead,
    newton::NewtonCG,
    quasinewton::LBFGS,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// A solution vector: free coordinates inside the solver, bounded model
/// values (fractions, scales, refined properties) outside it.
pub type Theta = Array1<f64>;

/// Gradient vector, same shape as [`Theta`].
pub type Grad = Array1<f64>;

/// Dense Hessian, `n × n` for `n = Theta.len()`.
pub type Hessian = Array2<f64>;

/// Residual being minimized.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
pub type FnEvalMap = HashMap<String, u64>;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Offset added to each free coordinate to span the initial Nelder–Mead
/// simplex.
pub const SIMPLEX_STEP: f64 = 0.5;

/// Hager–Zhang line search specialized to this crate's numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// More–Thuente line search specialized to this crate's numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// L-BFGS solver wired to the Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

/// L-BFGS solver wired to the More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;

/// Downhill simplex.
pub type Simplex = NelderMead<Theta, Cost>;

/// Truncated Newton (Newton–CG) with a More–Thuente line search.
pub type TruncatedNewton = NewtonCG<MoreThuenteLS, Cost>;
