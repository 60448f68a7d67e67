//! Exhaustive grid search over the refinement ranges.
use ndarray::Array1;

use crate::{
    optimization::{errors::OptResult, minimizer::Objective},
    refinement::info::RefinementInfo,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BruteForceOptions {
    /// Grid points per refined property, bounds included.
    pub samples_per_dim: usize,
}

impl Default for BruteForceOptions {
    fn default() -> Self {
        BruteForceOptions { samples_per_dim: 10 }
    }
}

fn axis(range: &RefinementInfo, n: usize) -> Vec<f64> {
    match n {
        0 | 1 => vec![range.minimum + 0.5 * range.span()],
        _ => (0..n).map(|k| range.minimum + range.span() * k as f64 / (n - 1) as f64).collect(),
    }
}

/// Evaluate every grid point and return the lowest `(solution, value)`.
///
/// Points are visited with the last coordinate varying fastest. Non-finite
/// values never win.
///
/// # Errors
/// - Any objective error ends the search.
pub fn run_brute<F: Objective>(
    f: &F, ranges: &[RefinementInfo], opts: &BruteForceOptions,
) -> OptResult<(Vec<f64>, f64)> {
    let axes: Vec<Vec<f64>> = ranges.iter().map(|r| axis(r, opts.samples_per_dim)).collect();
    let mut index = vec![0usize; axes.len()];
    let mut best: Option<(Vec<f64>, f64)> = None;
    loop {
        let point: Vec<f64> = index.iter().zip(axes.iter()).map(|(&i, a)| a[i]).collect();
        let value = f.value(&Array1::from(point.clone()))?;
        let better = value.is_finite() && best.as_ref().map_or(true, |(_, b)| value < *b);
        if better || best.is_none() {
            best = Some((point, if value.is_finite() { value } else { f64::INFINITY }));
        }

        // Odometer increment.
        let mut dim = axes.len();
        loop {
            if dim == 0 {
                return Ok(best.unwrap_or_default());
            }
            dim -= 1;
            index[dim] += 1;
            if index[dim] < axes[dim].len() {
                break;
            }
            index[dim] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::minimizer::Theta;
    use std::cell::Cell;

    #[test]
    // Purpose
    // -------
    // Every grid point is visited once and the minimum is on the grid.
    //
    // Given
    // -----
    // - f(x) = |x₀ - 0.5| + |x₁ - 1|, ranges [0, 1] × [0, 2], 5 samples.
    //
    // Expect
    // ------
    // - 25 evaluations; best (0.5, 1.0) with value 0.
    fn grid_search_visits_every_point() {
        let calls = Cell::new(0);
        let f = |x: &Theta| -> OptResult<f64> {
            calls.set(calls.get() + 1);
            Ok((x[0] - 0.5).abs() + (x[1] - 1.0).abs())
        };
        let ranges = [RefinementInfo::new(0.0, 1.0, true), RefinementInfo::new(0.0, 2.0, true)];
        let (x, v) = run_brute(&f, &ranges, &BruteForceOptions { samples_per_dim: 5 }).unwrap();
        assert_eq!(calls.get(), 25);
        assert_eq!(x, vec![0.5, 1.0]);
        assert_eq!(v, 0.0);
    }
}
