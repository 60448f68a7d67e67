//! minimizer::run — drive an Argmin executor and collect its final state.
use crate::optimization::{
    errors::OptResult,
    minimizer::{
        adapter::BoundedAdapter,
        traits::{Objective, SolverOptions},
        Cost, FnEvalMap, Theta,
    },
};
use argmin::core::{CostFunction, Executor, IterState, Solver, State, TerminationStatus};
use log::debug;

/// Raw result of one executor run, still in free space.
#[derive(Debug, Clone)]
pub struct SolverRun {
    pub best_param: Option<Theta>,
    pub best_cost: Cost,
    pub termination: TerminationStatus,
    pub iterations: u64,
    pub fn_evals: FnEvalMap,
}

/// Run `solver` on `problem` from the free-space start `theta0`.
///
/// Generic over the gradient (`G`) and Hessian (`H`) slots of the state so
/// the same driver serves L-BFGS, Nelder–Mead and Newton–CG. Honors
/// `opts.tols.max_iter`; with `opts.verbose` the initial cost is logged and,
/// behind the `obs_slog` feature, a terminal observer is attached.
///
/// # Errors
/// - Any error the solver or the objective raised, converted into
///   `OptError` (objective errors are recovered unchanged).
pub fn run_solver<'a, F, S, G, H>(
    theta0: Theta, opts: &SolverOptions, problem: BoundedAdapter<'a, F>, solver: S,
) -> OptResult<SolverRun>
where
    F: Objective,
    S: Solver<BoundedAdapter<'a, F>, IterState<Theta, G, (), H, (), Cost>>,
    G: Clone,
    H: Clone,
    IterState<Theta, G, (), H, (), Cost>: State<Param = Theta, Float = Cost>,
{
    if opts.verbose {
        let c0 = problem.cost(&theta0)?;
        debug!("minimizer start: cost(theta0) = {c0:.6}");
    }
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut state = optimizer.run()?.state().clone();
    Ok(SolverRun {
        termination: state.get_termination_status().clone(),
        iterations: state.get_iter(),
        fn_evals: state.get_func_counts().clone(),
        best_cost: state.get_best_cost(),
        best_param: state.take_best_param(),
    })
}
