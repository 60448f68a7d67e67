//! Refiner: structural refinement of a mixture's selected properties.
//!
//! Purpose
//! -------
//! Search the refinement ranges of every selected, refinable property for
//! the values that minimise the mixture residual, re-fitting fractions,
//! scales and background shifts at each candidate point.
//!
//! Key behaviors
//! -------------
//! - [`refine`] claims the mixture's refine lock (returning `None` when it is
//!   already held), freezes pattern write-back for the run and always thaws
//!   and releases on the way out.
//! - The objective polls the [`CancelToken`], clamps the candidate into the
//!   ranges, reuses the previous residual for a bit-identical candidate,
//!   otherwise applies it and calls [`optimize`].
//! - Outcomes map to [`RefineStatus`]:
//!   - finished normally: best solution applied, `Finished`;
//!   - stop: best solution applied and reported as last, `Stopped`;
//!   - kill: initial solution restored, `Finished`;
//!   - any other error: logged, best (else initial) solution applied,
//!     `Error`.
//! - No selected property: `Error` without running any method.
//! - Invalid options: `Error` with the reason as message, before any
//!   evaluation.
//!
//! Invariants & assumptions
//! ------------------------
//! - Run faults never propagate; every outcome is reported through the
//!   returned [`RefineContext`].
//!
//! Downstream usage
//! ----------------
//! - [`spawn_refinement`] runs the same procedure on a worker thread.
use log::{debug, error, info, warn};
use ndarray::Array1;
use std::{
    cell::RefCell,
    sync::{Arc, Mutex, PoisonError},
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::{
    mixture::{optimize, Mixture, MixtureError, MixtureResult},
    optimization::{
        errors::{OptError, OptResult},
        minimizer::{minimize_bounded, SolverMethod, SolverOptions, Theta},
        numerical_stability::Bound,
    },
    refinement::{
        cancel::CancelToken,
        context::{RefineContext, RefineStatus},
        methods::{run_brute, run_genetic, BruteForceOptions, GeneticOptions, RefineMethod},
    },
};

/// Configuration of one refinement run.
///
/// - `method`: search method (codes 0, 1, 100).
/// - `fit_method`: method code passed to [`optimize`] at each point.
/// - `solver`: options of the L-BFGS search.
/// - `throttle`: pause before each uncached evaluation, for progress polling.
#[derive(Debug, Clone, PartialEq)]
pub struct RefineOptions {
    pub method: RefineMethod,
    pub fit_method: i64,
    pub solver: SolverOptions,
    pub genetic: GeneticOptions,
    pub brute: BruteForceOptions,
    pub throttle: Option<Duration>,
}

impl Default for RefineOptions {
    fn default() -> Self {
        RefineOptions {
            method: RefineMethod::Lbfgs,
            fit_method: 0,
            solver: SolverOptions::lbfgsb_like(),
            genetic: GeneticOptions::default(),
            brute: BruteForceOptions::default(),
            throttle: None,
        }
    }
}

impl RefineOptions {
    /// Default options for the method `code`.
    ///
    /// # Errors
    /// - [`MixtureError::UnsupportedRefineMethod`] for an unknown code.
    pub fn for_method(code: i64) -> MixtureResult<Self> {
        Ok(RefineOptions { method: RefineMethod::from_code(code)?, ..Default::default() })
    }

    /// Check the options a run depends on.
    ///
    /// # Errors
    /// - [`MixtureError::UnsupportedFitMethod`] for an unknown `fit_method`.
    /// - [`MixtureError::InvalidRefineOption`] for genetic options out of
    ///   range when the genetic search is selected.
    pub fn validate(&self) -> MixtureResult<()> {
        SolverMethod::from_code(self.fit_method)
            .map_err(|_| MixtureError::UnsupportedFitMethod { code: self.fit_method })?;
        if self.method == RefineMethod::Genetic {
            self.genetic.validate()?;
        }
        Ok(())
    }
}

struct RefineObjective<'a> {
    mixture: RefCell<&'a mut Mixture>,
    ctx: RefCell<&'a mut RefineContext>,
    token: &'a CancelToken,
    fit_method: i64,
    throttle: Option<Duration>,
    cache: RefCell<Option<(Vec<f64>, f64)>>,
}

impl RefineObjective<'_> {
    fn eval(&self, x: &Theta) -> OptResult<f64> {
        self.token.check()?;
        let solution = self.ctx.borrow().clamp(&x.to_vec());
        if let Some((last, residual)) = self.cache.borrow().as_ref() {
            let identical = last.len() == solution.len()
                && last.iter().zip(solution.iter()).all(|(a, b)| a.to_bits() == b.to_bits());
            if identical {
                return Ok(*residual);
            }
        }
        if let Some(pause) = self.throttle {
            thread::sleep(pause);
        }

        let residual = {
            let mut mixture = self.mixture.borrow_mut();
            self.ctx.borrow().apply_solution(&mut mixture, &solution)?;
            optimize(&mut mixture, self.fit_method, true)?
        };
        self.ctx.borrow_mut().record(&solution, residual);
        *self.cache.borrow_mut() = Some((solution, residual));
        Ok(residual)
    }
}

/// Refine `mixture` in the calling thread.
///
/// Returns `None` without doing anything when another refinement holds the
/// mixture's lock.
pub fn refine(
    mixture: &mut Mixture, options: &RefineOptions, token: &CancelToken,
) -> Option<RefineContext> {
    let _guard = mixture.try_lock_refine()?;
    Some(run_locked(mixture, options, token))
}

/// Run [`refine`] on a dedicated thread.
///
/// The refine lock is claimed before spawning; `None` means it was already
/// held and no thread was started.
pub fn spawn_refinement(
    mixture: Arc<Mutex<Mixture>>, options: RefineOptions, token: CancelToken,
) -> Option<JoinHandle<RefineContext>> {
    let guard = mixture.lock().unwrap_or_else(PoisonError::into_inner).try_lock_refine()?;
    Some(thread::spawn(move || {
        let _guard = guard;
        let mut mixture = mixture.lock().unwrap_or_else(PoisonError::into_inner);
        run_locked(&mut mixture, &options, &token)
    }))
}

fn run_locked(mixture: &mut Mixture, options: &RefineOptions, token: &CancelToken) -> RefineContext {
    mixture.freeze_updates();
    let ctx = run_frozen(mixture, options, token);
    if let Err(e) = mixture.thaw_updates() {
        warn!("Pattern update after refining '{}' failed: {e}", mixture.name);
    }
    info!(
        "Refinement of '{}' ended with status {} (best residual {:?})",
        mixture.name,
        ctx.status(),
        ctx.best_residual
    );
    ctx
}

fn run_frozen(mixture: &mut Mixture, options: &RefineOptions, token: &CancelToken) -> RefineContext {
    if let Err(e) = options.validate() {
        error!("Refinement of '{}' rejected: {e}", mixture.name);
        return failed_context(e.to_string());
    }
    let selected = mixture.update_refinement_treestore().selected();
    let mut ctx = match RefineContext::new(mixture, &selected) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Cannot read refinable properties of '{}': {e} ({e:?})", mixture.name);
            return failed_context(e.to_string());
        }
    };
    if ctx.is_empty() {
        ctx.message = Some("No refinable properties selected".to_string());
        ctx.set_status(RefineStatus::Error);
        return ctx;
    }

    debug!(
        "Refining {} properties of '{}' with {:?}",
        ctx.len(),
        mixture.name,
        options.method
    );
    ctx.set_status(RefineStatus::Running);
    let result = {
        let objective = RefineObjective {
            mixture: RefCell::new(&mut *mixture),
            ctx: RefCell::new(&mut ctx),
            token,
            fit_method: options.fit_method,
            throttle: options.throttle,
            cache: RefCell::new(None),
        };
        run_method(&objective, options)
    };

    match result {
        Ok(()) => {
            finalize(mixture, &mut ctx, options, Choice::Best);
            ctx.set_status(RefineStatus::Finished);
        }
        Err(OptError::Stopped) => {
            ctx.last_solution = ctx.best_solution.clone();
            ctx.last_residual = ctx.best_residual;
            finalize(mixture, &mut ctx, options, Choice::Best);
            ctx.set_status(RefineStatus::Stopped);
        }
        Err(OptError::Killed) => {
            finalize(mixture, &mut ctx, options, Choice::Initial);
            ctx.set_status(RefineStatus::Finished);
        }
        Err(e) => {
            error!("Refinement of '{}' failed: {e} ({e:?})", mixture.name);
            ctx.message = Some(e.to_string());
            finalize(mixture, &mut ctx, options, Choice::Best);
            ctx.set_status(RefineStatus::Error);
        }
    }
    ctx
}

fn run_method(objective: &RefineObjective<'_>, options: &RefineOptions) -> OptResult<()> {
    let f = |x: &Theta| -> OptResult<f64> { objective.eval(x) };
    let (x0, ranges) = {
        let ctx = objective.ctx.borrow();
        (ctx.initial_solution.clone(), ctx.ranges.clone())
    };
    let initial = f(&Array1::from(x0.clone()))?;
    objective.ctx.borrow_mut().initial_residual = Some(initial);

    match options.method {
        RefineMethod::Lbfgs => {
            let bounds: Vec<Bound> = ranges.iter().map(|r| Bound::new(r.minimum, r.maximum)).collect();
            minimize_bounded(&f, &Array1::from(x0), &bounds, SolverMethod::Lbfgs, &options.solver)?;
        }
        RefineMethod::Genetic => {
            run_genetic(&f, &x0, &ranges, &options.genetic)?;
        }
        RefineMethod::BruteForce => {
            run_brute(&f, &ranges, &options.brute)?;
        }
    }
    Ok(())
}

enum Choice {
    Best,
    Initial,
}

/// Apply the chosen solution and re-fit fractions and scales to it.
fn finalize(mixture: &mut Mixture, ctx: &mut RefineContext, options: &RefineOptions, choice: Choice) {
    let applied = match choice {
        Choice::Best => ctx.apply_best_solution(mixture),
        Choice::Initial => ctx.apply_initial_solution(mixture),
    };
    let refit = applied.and_then(|()| optimize(mixture, options.fit_method, true));
    if let Err(e) = refit {
        error!("Applying the refined solution to '{}' failed: {e} ({e:?})", mixture.name);
        ctx.message.get_or_insert_with(|| e.to_string());
        ctx.set_status(RefineStatus::Error);
    }
}

fn failed_context(message: String) -> RefineContext {
    let mut ctx = RefineContext::empty();
    ctx.message = Some(message);
    ctx.set_status(RefineStatus::Error);
    ctx
}
