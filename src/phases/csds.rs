//! Crystallite-size distribution (CSDS) of a phase.
//!
//! The number of layers `N` in a coherent scattering domain follows a
//! discretized log-normal law whose parameters derive from the average:
//! `α = 0.9485 ln(avg) - 0.0017`, `β² = 0.1032 ln(avg) + 0.0034`.
use statrs::distribution::{ContinuousCDF, LogNormal};

use crate::refinement::info::RefinementInfo;

/// Hard cap on the number of layers considered.
pub const MAX_LAYERS: usize = 200;

/// Declared range of the CSDS average.
pub const AVERAGE_RANGE: (f64, f64) = (1.0, MAX_LAYERS as f64);

/// Cumulative probability at which the distribution tail is cut.
pub const TAIL_CUTOFF: f64 = 1.0 - 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct CsdsDistribution {
    average: f64,
    pub minimum: usize,
    pub maximum: usize,
    pub info: RefinementInfo,
}

impl Default for CsdsDistribution {
    fn default() -> Self {
        CsdsDistribution::new(10.0)
    }
}

impl CsdsDistribution {
    pub fn new(average: f64) -> Self {
        let mut out = CsdsDistribution {
            average: AVERAGE_RANGE.0,
            minimum: 1,
            maximum: MAX_LAYERS,
            info: RefinementInfo::new(AVERAGE_RANGE.0, AVERAGE_RANGE.1, false),
        };
        out.set_average(average);
        out
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    /// Set the average number of layers, clamped to [`AVERAGE_RANGE`]. A
    /// non-finite value leaves the average unchanged.
    pub fn set_average(&mut self, value: f64) {
        if value.is_finite() {
            self.average = value.max(AVERAGE_RANGE.0).min(AVERAGE_RANGE.1);
        }
    }

    /// `(α, β)` of the underlying log-normal law.
    pub fn log_normal_params(&self) -> (f64, f64) {
        let ln_avg = self.average.ln();
        let alpha = 0.9485 * ln_avg - 0.0017;
        let beta = (0.1032 * ln_avg + 0.0034).max(1e-6).sqrt();
        (alpha, beta)
    }

    /// Normalized probabilities `q(N)` for `N = 1..=len`; index 0 is `N = 1`.
    ///
    /// Mass for `N` is `CDF(N + ½) - CDF(N - ½)`; the sequence stops at
    /// `maximum` layers or once the cumulative probability passes
    /// [`TAIL_CUTOFF`]. Mass below `minimum` is dropped.
    pub fn distribution(&self) -> Vec<f64> {
        let (alpha, beta) = self.log_normal_params();
        let cap = self.maximum.clamp(1, MAX_LAYERS);
        let first = self.minimum.clamp(1, cap);
        let law = match LogNormal::new(alpha, beta) {
            Ok(law) => law,
            Err(_) => return point_mass(self.average.round() as usize, cap),
        };
        let mut q = Vec::with_capacity(cap);
        for n in 1..=cap {
            let lo = law.cdf(n as f64 - 0.5);
            let hi = law.cdf(n as f64 + 0.5);
            q.push(if n < first { 0.0 } else { (hi - lo).max(0.0) });
            if hi >= TAIL_CUTOFF {
                break;
            }
        }
        let total: f64 = q.iter().sum();
        if total <= 0.0 {
            return point_mass(self.average.round() as usize, cap);
        }
        q.iter_mut().for_each(|v| *v /= total);
        q
    }
}

fn point_mass(n: usize, cap: usize) -> Vec<f64> {
    let n = n.clamp(1, cap);
    let mut q = vec![0.0; n];
    q[n - 1] = 1.0;
    q
}
