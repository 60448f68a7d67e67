//! minimizer::api — public entry points for bounded minimization.
use crate::optimization::{
    errors::OptResult,
    minimizer::{
        adapter::{BestTracker, BoundedAdapter},
        builders::{
            build_optimizer_hager_zhang, build_optimizer_more_thuente, build_simplex,
            build_truncated_newton,
        },
        run::{run_solver, SolverRun},
        traits::{LineSearcher, Objective, OptimOutcome, SolverMethod, SolverOptions},
        validation::validate_start,
        Theta,
    },
    numerical_stability::Bound,
};

/// Minimize `f` from `x0` (model space) subject to per-coordinate `bounds`.
///
/// See [`minimize_bounded_with`]; this variant owns its tracker.
pub fn minimize_bounded<F: Objective>(
    f: &F, x0: &Theta, bounds: &[Bound], method: SolverMethod, opts: &SolverOptions,
) -> OptResult<OptimOutcome> {
    let tracker = BestTracker::new();
    minimize_bounded_with(f, x0, bounds, method, opts, &tracker)
}

/// Minimize `f` and report every evaluation to a caller-owned tracker.
///
/// Behavior
/// --------
/// - `x0` is validated against `bounds`, passed to `f.check`, moved inside
///   the bounds with [`Bound::interior_start`] (scaled by the largest
///   `|x0|`, at least 1) and mapped to free space.
/// - The chosen backend runs on the free-space problem.
/// - The outcome holds the lowest point seen, either the solver's best or
///   the tracker's best (finite-difference probes included), in model space.
///
/// # Errors
/// - Validation errors from [`validate_start`] and `f.check`.
/// - Any objective or solver error. When that happens the tracker still
///   holds the best point evaluated before the failure.
pub fn minimize_bounded_with<F: Objective>(
    f: &F, x0: &Theta, bounds: &[Bound], method: SolverMethod, opts: &SolverOptions,
    tracker: &BestTracker,
) -> OptResult<OptimOutcome> {
    validate_start(x0, bounds)?;
    f.check(x0)?;
    let magnitude = x0.iter().fold(1.0_f64, |m, v| m.max(v.abs()));
    let start =
        Theta::from_iter(x0.iter().zip(bounds.iter()).map(|(&v, b)| b.interior_start(v, magnitude)));
    let problem = BoundedAdapter::new(f, bounds, tracker);
    let theta0 = problem.to_free(&start);

    let run = match method {
        SolverMethod::Lbfgs => match opts.line_searcher {
            LineSearcher::MoreThuente => {
                let solver = build_optimizer_more_thuente(opts)?;
                run_solver(theta0, opts, problem, solver)?
            }
            LineSearcher::HagerZhang => {
                let solver = build_optimizer_hager_zhang(opts)?;
                run_solver(theta0, opts, problem, solver)?
            }
        },
        SolverMethod::NelderMead => {
            let solver = build_simplex(&theta0, opts)?;
            run_solver(theta0, opts, problem, solver)?
        }
        SolverMethod::TruncatedNewton => {
            let solver = build_truncated_newton(opts)?;
            run_solver(theta0, opts, problem, solver)?
        }
    };
    finish(run, bounds, tracker)
}

// ---- Helper methods ----

fn finish(run: SolverRun, bounds: &[Bound], tracker: &BestTracker) -> OptResult<OptimOutcome> {
    let solver_best = run.best_param.map(|theta| {
        Theta::from_iter(theta.iter().zip(bounds.iter()).map(|(&t, b)| b.to_model(t)))
    });
    let (x_hat, value) = match (solver_best, tracker.best()) {
        (_, Some((tx, tv))) if !run.best_cost.is_finite() || tv < run.best_cost => (Some(tx), tv),
        (None, Some((tx, tv))) => (Some(tx), tv),
        (sx, _) => (sx, run.best_cost),
    };
    OptimOutcome::new(x_hat, value, run.termination, run.iterations, run.fn_evals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::{OptError, OptResult};
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use std::cell::Cell;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Convergence of each backend on small bounded quadratics.
    // - Active bounds, and error propagation with the tracker intact.
    //
    // They intentionally DO NOT cover:
    // - Mixture objectives (see `mixture` and the integration tests).
    // -------------------------------------------------------------------------

    fn quadratic(x: &Theta) -> OptResult<f64> {
        Ok((x[0] - 0.3).powi(2) + (x[1] - 2.0).powi(2))
    }

    #[test]
    // Purpose
    // -------
    // L-BFGS through the bound transforms finds an interior minimum.
    //
    // Given
    // -----
    // - f(x) = (x₀ - 0.3)² + (x₁ - 2)², bounds [0, 1] × [0, ∞), x0 = (0.9, 0.5).
    //
    // Expect
    // ------
    // - x_hat ≈ (0.3, 2.0), value ≈ 0.
    fn lbfgs_finds_interior_minimum() {
        let bounds = [Bound::new(0.0, 1.0), Bound::at_least(0.0)];
        let out = minimize_bounded(
            &quadratic,
            &array![0.9, 0.5],
            &bounds,
            SolverMethod::Lbfgs,
            &SolverOptions::lbfgsb_like(),
        )
        .unwrap();

        assert_abs_diff_eq!(out.x_hat[0], 0.3, epsilon = 1e-3);
        assert_abs_diff_eq!(out.x_hat[1], 2.0, epsilon = 1e-3);
        assert!(out.value < 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // Nelder–Mead respects an active upper bound.
    //
    // Given
    // -----
    // - Same objective, bounds [0, 1] × [0, 1]; the minimum lies at x₁ = 1.
    //
    // Expect
    // ------
    // - x_hat₁ close to 1 and never above it.
    fn nelder_mead_stops_at_active_bound() {
        let bounds = [Bound::new(0.0, 1.0), Bound::new(0.0, 1.0)];
        let opts = SolverOptions::lbfgsb_like().with_max_iter(2000).unwrap();
        let out = minimize_bounded(
            &quadratic,
            &array![0.5, 0.5],
            &bounds,
            SolverMethod::NelderMead,
            &opts,
        )
        .unwrap();

        assert_abs_diff_eq!(out.x_hat[0], 0.3, epsilon = 1e-2);
        assert!(out.x_hat[1] <= 1.0 && out.x_hat[1] > 0.98);
    }

    #[test]
    // Purpose
    // -------
    // Coordinates starting on a finite bound are free to leave it.
    //
    // Given
    // -----
    // - The quadratic with x0 = (0, 0) on bounds [0, 1] × [0, ∞), L-BFGS.
    //
    // Expect
    // ------
    // - x_hat ≈ (0.3, 2.0).
    fn lbfgs_leaves_start_on_lower_bound() {
        let bounds = [Bound::new(0.0, 1.0), Bound::at_least(0.0)];
        let out = minimize_bounded(
            &quadratic,
            &array![0.0, 0.0],
            &bounds,
            SolverMethod::Lbfgs,
            &SolverOptions::lbfgsb_like(),
        )
        .unwrap();

        assert_abs_diff_eq!(out.x_hat[0], 0.3, epsilon = 1e-3);
        assert_abs_diff_eq!(out.x_hat[1], 2.0, epsilon = 1e-3);
    }

    #[test]
    fn truncated_newton_runs_on_unbounded_quadratic() {
        let bounds = [Bound::unbounded(), Bound::unbounded()];
        let opts = SolverOptions::lbfgsb_like().with_max_iter(50).unwrap();
        let out = minimize_bounded(
            &quadratic,
            &array![1.0, 1.0],
            &bounds,
            SolverMethod::TruncatedNewton,
            &opts,
        )
        .unwrap();

        assert!(out.value < 1e-3);
    }

    #[test]
    // Purpose
    // -------
    // A cancellation raised by the objective aborts the run, and the caller's
    // tracker still knows the best point seen before it.
    //
    // Given
    // -----
    // - An objective that returns `OptError::Stopped` from its 6th call on.
    //
    // Expect
    // ------
    // - `Err(OptError::Stopped)` and a tracked best point.
    fn stop_signal_propagates_and_tracker_survives() {
        let calls = Cell::new(0usize);
        let f = |x: &Theta| -> OptResult<f64> {
            calls.set(calls.get() + 1);
            if calls.get() > 5 {
                return Err(OptError::Stopped);
            }
            quadratic(x)
        };
        let bounds = [Bound::new(0.0, 1.0), Bound::at_least(0.0)];
        let tracker = BestTracker::new();

        let err = minimize_bounded_with(
            &f,
            &array![0.9, 0.5],
            &bounds,
            SolverMethod::Lbfgs,
            &SolverOptions::lbfgsb_like(),
            &tracker,
        )
        .unwrap_err();

        assert_eq!(err, OptError::Stopped);
        assert!(tracker.best().is_some());
    }

    #[test]
    fn invalid_start_is_rejected_before_solving() {
        let err = minimize_bounded(
            &quadratic,
            &array![0.5],
            &[Bound::new(0.0, 1.0), Bound::unbounded()],
            SolverMethod::Lbfgs,
            &SolverOptions::lbfgsb_like(),
        )
        .unwrap_err();
        assert_eq!(err, OptError::BoundsLengthMismatch { expected: 1, found: 2 });
    }
}
