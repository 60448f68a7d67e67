//! minimizer::builders — construct configured Argmin solvers.
//!
//! One builder per [`SolverMethod`](crate::optimization::minimizer::SolverMethod)
//! backend. Each applies the tolerances from [`SolverOptions`] that the
//! backend understands and leaves the rest to Argmin defaults.
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    minimizer::{
        traits::SolverOptions,
        types::{
            Cost, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente, MoreThuenteLS, Simplex,
            Theta, TruncatedNewton, DEFAULT_LBFGS_MEM, SIMPLEX_STEP,
        },
    },
};

pub fn build_optimizer_hager_zhang(opts: &SolverOptions) -> OptResult<LbfgsHagerZhang> {
    let hager_zhang = HagerZhangLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsHagerZhang::new(hager_zhang, mem);
    configure_lbfgs(lbfgs, opts)
}

pub fn build_optimizer_more_thuente(opts: &SolverOptions) -> OptResult<LbfgsMoreThuente> {
    let more_thuente = MoreThuenteLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsMoreThuente::new(more_thuente, mem);
    configure_lbfgs(lbfgs, opts)
}

pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &SolverOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

/// Nelder–Mead around `theta0` (free space): `theta0` plus one vertex per
/// coordinate shifted by [`SIMPLEX_STEP`]. The simplex standard-deviation
/// tolerance is `tol_cost`, else `tol_grad`.
pub fn build_simplex(theta0: &Theta, opts: &SolverOptions) -> OptResult<Simplex> {
    let mut vertices = Vec::with_capacity(theta0.len() + 1);
    vertices.push(theta0.clone());
    for i in 0..theta0.len() {
        let mut v = theta0.clone();
        v[i] += SIMPLEX_STEP;
        vertices.push(v);
    }
    let mut solver = Simplex::new(vertices);
    if let Some(tol) = opts.tols.tol_cost.or(opts.tols.tol_grad) {
        solver = solver.with_sd_tolerance(tol)?;
    }
    Ok(solver)
}

/// Newton–CG with a More–Thuente line search; `tol_cost` bounds the change
/// in cost between iterations.
pub fn build_truncated_newton(opts: &SolverOptions) -> OptResult<TruncatedNewton> {
    let mut solver = TruncatedNewton::new(MoreThuenteLS::new());
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance(c)?;
    }
    Ok(solver)
}
