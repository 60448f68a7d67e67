//! Fit of fractions, scales and background shifts for fixed phases.
//!
//! Purpose
//! -------
//! Given a mixture whose structural parameters are fixed, find the phase
//! fractions, per-specimen scales and (optionally) background shifts that
//! minimise the summed residual between experimental and calculated
//! patterns.
//!
//! Key behaviors
//! -------------
//! - [`get_residual_parts`] evaluates every phase pattern once and keeps only
//!   the non-excluded points; [`get_residual`] then costs a candidate
//!   solution with a few multiply-adds per point.
//! - [`optimize`] runs the bounded minimizer (fractions and scales in
//!   `[0, ∞)`, background shifts unbounded), rounds scales and shifts to six
//!   decimals, renormalises fractions to sum to one while keeping every
//!   `fraction · scale` product, and writes the result back.
//!
//! Invariants & assumptions
//! ------------------------
//! - The residual is a sum of non-negative statistics, one per specimen with
//!   data; specimens without data contribute nothing.
//! - If the backend fails for a reason other than cancellation the lowest
//!   evaluated point is used instead.
//!
//! Conventions
//! -----------
//! - Method codes: `0` = L-BFGS, `1` = Nelder–Mead simplex, `3` = truncated
//!   Newton.
use log::{debug, warn};
use ndarray::Array1;

use crate::{
    mixture::{
        data::parse_solution,
        errors::{MixtureError, MixtureResult},
        mixture::Mixture,
        statistics::ResidualKind,
    },
    optimization::{
        errors::OptResult,
        minimizer::{minimize_bounded_with, BestTracker, SolverMethod, SolverOptions},
        numerical_stability::Bound,
    },
};

/// Decimal digits kept for scales and background shifts.
const ROUND_DIGITS: i32 = 6;

/// Experimental and per-phase intensities of one specimen row at its
/// non-excluded points.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecimenParts {
    pub row: usize,
    pub experimental: Vec<f64>,
    /// One entry per phase column; `None` for empty cells.
    pub phases: Vec<Option<Vec<f64>>>,
}

/// Everything [`get_residual`] needs, computed once per fit.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidualParts {
    pub shape: (usize, usize),
    pub auto_bg: bool,
    pub kind: ResidualKind,
    /// Background shifts used when they are not part of the solution.
    pub bgshifts: Vec<f64>,
    pub specimens: Vec<SpecimenParts>,
}

/// Evaluate the phase patterns of every specimen with data and restrict
/// them, with the experimental intensities, to the exclusion selector.
pub fn get_residual_parts(mixture: &Mixture) -> MixtureResult<ResidualParts> {
    let mut specimens = Vec::new();
    for rp in mixture.calculate_row_patterns()? {
        let specimen = mixture.specimen(rp.specimen)?;
        let Some(exp) = specimen.experimental() else { continue };
        let selector = specimen.get_exclusion_selector(&exp.two_theta);
        let keep = |a: &Array1<f64>| -> Vec<f64> {
            a.iter().zip(selector.iter()).filter(|(_, s)| **s).map(|(&v, _)| v).collect()
        };
        specimens.push(SpecimenParts {
            row: rp.row,
            experimental: keep(&exp.intensity),
            phases: rp.phases.iter().map(|p| p.as_ref().map(&keep)).collect(),
        });
    }
    Ok(ResidualParts {
        shape: mixture.data().shape(),
        auto_bg: mixture.options.auto_bg,
        kind: mixture.options.residual_kind,
        bgshifts: mixture.data().bgshifts().to_vec(),
        specimens,
    })
}

/// Summed residual of `solution` over all specimens with data.
///
/// # Errors
/// - [`MixtureError::SolutionLengthMismatch`] /
///   [`MixtureError::NonFiniteSolution`] from parsing `solution`.
pub fn get_residual(solution: &[f64], parts: &ResidualParts) -> MixtureResult<f64> {
    let parsed = parse_solution(solution, parts.shape, parts.auto_bg)?;
    let bgshifts = parsed.bgshifts.as_deref().unwrap_or(&parts.bgshifts);
    let mut residual = 0.0;
    for sp in &parts.specimens {
        let scale = parsed.scales[sp.row];
        let bgshift = bgshifts.get(sp.row).copied().unwrap_or(0.0);
        let mut calc = vec![0.0; sp.experimental.len()];
        for (pattern, &fraction) in sp.phases.iter().zip(parsed.fractions.iter()) {
            if let Some(pattern) = pattern {
                for (c, &i) in calc.iter_mut().zip(pattern.iter()) {
                    *c += fraction * i;
                }
            }
        }
        for c in calc.iter_mut() {
            *c = scale * *c + bgshift;
        }
        residual += parts.kind.compute(&sp.experimental, &calc);
    }
    Ok(residual)
}

/// [`optimize_with`] using the L-BFGS-B-like defaults.
pub fn optimize(mixture: &mut Mixture, method: i64, silent: bool) -> MixtureResult<f64> {
    optimize_with(mixture, method, silent, &SolverOptions::lbfgsb_like())
}

/// Fit fractions, scales and (with `auto_bg`) background shifts, write them
/// back into `mixture` and return the final residual.
///
/// Behavior
/// --------
/// - Returns `0.0` without touching the mixture when no specimen has data.
/// - `silent` suppresses the per-fit debug log.
///
/// # Errors
/// - [`MixtureError::UnsupportedFitMethod`] for unknown `method` codes.
/// - Cancellation signals raised by the caller's objective are returned
///   wrapped in [`MixtureError::Optimization`].
/// - Errors from evaluating phase patterns.
pub fn optimize_with(
    mixture: &mut Mixture, method: i64, silent: bool, opts: &SolverOptions,
) -> MixtureResult<f64> {
    let solver = SolverMethod::from_code(method)
        .map_err(|_| MixtureError::UnsupportedFitMethod { code: method })?;
    let parts = get_residual_parts(mixture)?;
    if parts.specimens.is_empty() {
        return Ok(0.0);
    }

    let (rows, cols) = parts.shape;
    let x0 = Array1::from(mixture.get_current_solution());
    let bounds: Vec<Bound> = (0..x0.len())
        .map(|i| if i < cols + rows { Bound::at_least(0.0) } else { Bound::unbounded() })
        .collect();
    if !silent {
        debug!("Fitting {} fractions/scales of mixture '{}' with {:?}", x0.len(), mixture.name, solver);
    }

    let objective =
        |x: &Array1<f64>| -> OptResult<f64> { Ok(get_residual(&x.to_vec(), &parts)?) };
    let tracker = BestTracker::new();
    let raw = match minimize_bounded_with(&objective, &x0, &bounds, solver, opts, &tracker) {
        Ok(outcome) => outcome.x_hat,
        Err(e) if e.is_cancellation() => return Err(e.into()),
        Err(e) => {
            warn!("Solver failed on mixture '{}' ({e}); using the best evaluated point", mixture.name);
            tracker.best().map(|(x, _)| x).unwrap_or_else(|| x0.clone())
        }
    };

    let solution = post_process(&raw.to_vec(), parts.shape, parts.auto_bg)
        .unwrap_or_else(|_| x0.to_vec());
    let residual = get_residual(&solution, &parts)?;
    mixture.set_solution(&solution)?;
    Ok(residual)
}

/// Round scales and shifts, then renormalise fractions to sum to one and
/// fold their old sum into the scales.
pub fn post_process(raw: &[f64], shape: (usize, usize), auto_bg: bool) -> MixtureResult<Vec<f64>> {
    let parsed = parse_solution(raw, shape, auto_bg)?;
    let round = |v: f64| {
        let p = 10f64.powi(ROUND_DIGITS);
        (v * p).round() / p
    };
    let mut fractions = parsed.fractions;
    let mut scales: Vec<f64> = parsed.scales.into_iter().map(round).collect();
    let total: f64 = fractions.iter().sum();
    if total > 0.0 {
        fractions.iter_mut().for_each(|f| *f /= total);
        scales.iter_mut().for_each(|s| *s *= total);
    }
    let mut out = fractions;
    out.extend(scales);
    if let Some(bg) = parsed.bgshifts {
        out.extend(bg.into_iter().map(round));
    }
    Ok(out)
}
