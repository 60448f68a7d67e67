//! Public API surface for bounded minimization.
//!
//! - [`Objective`]: trait callers implement for the function being minimized.
//! - [`SolverMethod`]: which backend solver to run (numeric codes 0, 1, 3).
//! - [`SolverOptions`] and [`Tolerances`]: configuration for the solver.
//! - [`LineSearcher`]: choice of line search used by L-BFGS.
//! - [`OptimOutcome`]: normalized result of a run, in model space.
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
        Cost, FnEvalMap, Theta,
    },
};
use argmin::core::TerminationStatus;
use std::str::FromStr;

/// User-implemented objective in model space.
///
/// Required:
/// - `value(&Theta) -> OptResult<Cost>`: evaluate the objective at a point
///   that already satisfies the bounds. Errors abort the run and are
///   returned unchanged (this is how cooperative cancellation travels).
///
/// Optional:
/// - `check(&Theta) -> OptResult<()>`: called once on the start vector.
pub trait Objective {
    fn value(&self, x: &Theta) -> OptResult<Cost>;

    fn check(&self, _x: &Theta) -> OptResult<()> {
        Ok(())
    }
}

impl<F> Objective for F
where
    F: Fn(&Theta) -> OptResult<Cost>,
{
    fn value(&self, x: &Theta) -> OptResult<Cost> {
        self(x)
    }
}

/// Backend solver selection.
///
/// Numeric codes: `0` = L-BFGS (bounded through variable transforms, the
/// L-BFGS-B stand-in), `1` = Nelder–Mead simplex, `3` = truncated Newton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverMethod {
    #[default]
    Lbfgs,
    NelderMead,
    TruncatedNewton,
}

impl SolverMethod {
    /// Map a numeric method code.
    ///
    /// # Errors
    /// - [`OptError::UnsupportedMethod`] for any code other than 0, 1, 3.
    pub fn from_code(code: i64) -> OptResult<Self> {
        match code {
            0 => Ok(SolverMethod::Lbfgs),
            1 => Ok(SolverMethod::NelderMead),
            3 => Ok(SolverMethod::TruncatedNewton),
            _ => Err(OptError::UnsupportedMethod { code }),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            SolverMethod::Lbfgs => 0,
            SolverMethod::NelderMead => 1,
            SolverMethod::TruncatedNewton => 3,
        }
    }
}

/// Line search for the L-BFGS path; parsed case-insensitively from
/// `"MoreThuente"` or `"HagerZhang"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "expected MoreThuente or HagerZhang",
            }),
        }
    }
}

/// Stopping rules and solver wiring shared by the fraction/scale fit and
/// the L-BFGS refinement path.
///
/// `verbose` attaches the slog observer when the `obs_slog` feature is on.
/// `lbfgs_mem` falls back to [`DEFAULT_LBFGS_MEM`](super::DEFAULT_LBFGS_MEM)
/// when `None`. The default is [`SolverOptions::lbfgsb_like`].
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl SolverOptions {
    /// # Errors
    /// - [`OptError::InvalidLBFGSMem`] for a zero history size.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if lbfgs_mem == Some(0) {
            return Err(OptError::InvalidLBFGSMem { mem: 0, reason: "history must hold a step" });
        }
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem })
    }

    /// Stopping rules of a classic L-BFGS-B call with `factr = 1e6`:
    /// `tol_cost = 1e6 · ε`, `tol_grad = 1e-5`, at most 15000 iterations.
    pub fn lbfgsb_like() -> Self {
        Self {
            tols: Tolerances {
                tol_grad: Some(1e-5),
                tol_cost: Some(1e6 * f64::EPSILON),
                max_iter: Some(15_000),
            },
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
        }
    }

    /// Same stopping rules with a different iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> OptResult<Self> {
        self.tols = Tolerances::new(self.tols.tol_grad, self.tols.tol_cost, Some(max_iter))?;
        Ok(self)
    }
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self::lbfgsb_like()
    }
}

/// Stopping rules. `tol_grad` doubles as the simplex spread and Newton-CG
/// tolerance; at least one rule must be set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] when every rule is `None`.
    /// - Tolerance errors from the validation helpers; a zero iteration cap.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if max_iter == Some(0) {
            return Err(OptError::InvalidMaxIter { max_iter: 0, reason: "at least one step" });
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Result of one bounded minimization with `x_hat` in model space.
/// `converged` is `false` only when argmin reports `NotTerminated`.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub x_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
}

impl OptimOutcome {
    /// # Errors
    /// - A missing or non-finite best point, or a non-finite residual.
    pub fn new(
        x_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap,
    ) -> OptResult<Self> {
        let x_hat = validate_theta_hat(x_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            other => (true, format!("{other:?}")),
        };
        Ok(Self { x_hat, value, converged, status, iterations: iterations as usize, fn_evals })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmin::core::TerminationReason;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Method codes map to solvers and anything else is a configuration error.
    //
    // Given
    // -----
    // - Codes 0, 1, 3 and 2.
    //
    // Expect
    // ------
    // - Lbfgs, NelderMead, TruncatedNewton; code 2 rejected.
    fn solver_method_codes() {
        assert_eq!(SolverMethod::from_code(0).unwrap(), SolverMethod::Lbfgs);
        assert_eq!(SolverMethod::from_code(1).unwrap(), SolverMethod::NelderMead);
        assert_eq!(SolverMethod::from_code(3).unwrap(), SolverMethod::TruncatedNewton);
        assert_eq!(SolverMethod::from_code(2), Err(OptError::UnsupportedMethod { code: 2 }));
        assert_eq!(SolverMethod::TruncatedNewton.code(), 3);
    }

    #[test]
    fn tolerances_and_options_are_validated() {
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(matches!(
            Tolerances::new(Some(-1.0), None, None),
            Err(OptError::InvalidTolGrad { .. })
        ));
        assert!(matches!(
            Tolerances::new(None, None, Some(0)),
            Err(OptError::InvalidMaxIter { .. })
        ));
        let tols = Tolerances::new(Some(1e-6), None, Some(10)).unwrap();
        assert!(matches!(
            SolverOptions::new(tols, LineSearcher::MoreThuente, false, Some(0)),
            Err(OptError::InvalidLBFGSMem { .. })
        ));
        let lb = SolverOptions::lbfgsb_like();
        assert_eq!(lb.tols.tol_cost, Some(1e6 * f64::EPSILON));
        assert_eq!("hagerzhang".parse::<LineSearcher>().unwrap(), LineSearcher::HagerZhang);
    }

    #[test]
    fn outcome_maps_termination_status() {
        let done = OptimOutcome::new(
            Some(array![1.0]),
            0.5,
            TerminationStatus::Terminated(TerminationReason::SolverConverged),
            4,
            FnEvalMap::new(),
        )
        .unwrap();
        assert!(done.converged);
        let open =
            OptimOutcome::new(Some(array![1.0]), 0.5, TerminationStatus::NotTerminated, 4, FnEvalMap::new())
                .unwrap();
        assert!(!open.converged);
        assert_eq!(
            OptimOutcome::new(None, 0.5, TerminationStatus::NotTerminated, 0, FnEvalMap::new()),
            Err(OptError::MissingThetaHat)
        );
    }
}
