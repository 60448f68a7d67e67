//! Numerical stability utilities and box-constraint transforms.
//!
//! Provides safe implementations of the nonlinear maps used to turn a
//! box-constrained search into an unconstrained one:
//!
//! - [`safe_softplus`] / [`safe_softplus_inv`]: ℝ ↔ (0, ∞) without overflow.
//! - [`safe_logistic`] / [`safe_logit`]: ℝ ↔ (0, 1) without overflow.
//! - [`Bound`]: per-coordinate interval with `to_model` / `to_free`.
//!
//! The guards use explicit cutoffs (`|x| > 20.0`) to keep `f64` arithmetic in
//! a well-conditioned regime, and values sitting exactly on a finite bound
//! are nudged inside by [`LOGIT_EPS`] before inversion.
//!
//! Near a finite bound both maps flatten out (`d x / d θ → 0`), so a start
//! value on the bound would never move. Solver starts therefore go through
//! [`Bound::interior_start`] first.

/// Distance kept from a finite bound when mapping into the free space.
pub const LOGIT_EPS: f64 = 1e-10;

/// Relative distance from a finite bound for solver start values: a share
/// of the interval width, or of the caller's magnitude for half-lines.
pub const START_OFFSET: f64 = 0.05;

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// For sufficiently large `x`, `softplus(x) ≈ x`; otherwise `ln1p(exp(x))`.
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}

/// Stable inverse of softplus on `(0, ∞)`: `t = ln(exp(x) - 1)`.
///
/// `x` must be finite and `> 0`.
pub fn safe_softplus_inv(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp_m1().ln() }
}

/// Logistic function `1 / (1 + exp(-x))`, evaluated on the side that cannot
/// overflow.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Inverse of [`safe_logistic`] on `(0, 1)`; the input is clamped to
/// `[LOGIT_EPS, 1 - LOGIT_EPS]`.
pub fn safe_logit(u: f64) -> f64 {
    let u = u.max(LOGIT_EPS).min(1.0 - LOGIT_EPS);
    (u / (1.0 - u)).ln()
}

/// Closed interval for one coordinate; either side may be infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub lower: f64,
    pub upper: f64,
}

impl Bound {
    pub fn new(lower: f64, upper: f64) -> Self {
        Bound { lower, upper }
    }

    pub fn unbounded() -> Self {
        Bound { lower: f64::NEG_INFINITY, upper: f64::INFINITY }
    }

    /// `[lower, ∞)`
    pub fn at_least(lower: f64) -> Self {
        Bound { lower, upper: f64::INFINITY }
    }

    pub fn is_valid(&self) -> bool {
        !self.lower.is_nan() && !self.upper.is_nan() && self.lower <= self.upper
    }

    pub fn clamp(&self, x: f64) -> f64 {
        x.max(self.lower).min(self.upper)
    }

    /// Start value for a solver: `x` clamped into the bound and moved at
    /// least [`START_OFFSET`] · width (half-lines: · `magnitude`) away from
    /// each finite side. A degenerate interval returns its only point.
    pub fn interior_start(&self, x: f64, magnitude: f64) -> f64 {
        let x = self.clamp(x);
        match (self.lower.is_finite(), self.upper.is_finite()) {
            (true, true) => {
                let span = self.upper - self.lower;
                if span <= 0.0 {
                    return self.lower;
                }
                let gap = START_OFFSET * span;
                x.max(self.lower + gap).min(self.upper - gap)
            }
            (true, false) => x.max(self.lower + START_OFFSET * magnitude),
            (false, true) => x.min(self.upper - START_OFFSET * magnitude),
            (false, false) => x,
        }
    }

    /// Map a free coordinate into the interval.
    ///
    /// - finite `[lo, hi]`: `lo + (hi - lo) · logistic(θ)`
    /// - `[lo, ∞)`: `lo + softplus(θ)`
    /// - `(-∞, hi]`: `hi - softplus(θ)`
    /// - unbounded: identity
    pub fn to_model(&self, theta: f64) -> f64 {
        match (self.lower.is_finite(), self.upper.is_finite()) {
            (true, true) => {
                if self.upper == self.lower {
                    self.lower
                } else {
                    self.lower + (self.upper - self.lower) * safe_logistic(theta)
                }
            }
            (true, false) => self.lower + safe_softplus(theta),
            (false, true) => self.upper - safe_softplus(theta),
            (false, false) => theta,
        }
    }

    /// Inverse of [`to_model`](Self::to_model); `x` is clamped inside the
    /// interval (at least `LOGIT_EPS` from a finite bound) first.
    pub fn to_free(&self, x: f64) -> f64 {
        match (self.lower.is_finite(), self.upper.is_finite()) {
            (true, true) => {
                let span = self.upper - self.lower;
                if span <= 0.0 {
                    0.0
                } else {
                    safe_logit((x - self.lower) / span)
                }
            }
            (true, false) => safe_softplus_inv((x - self.lower).max(LOGIT_EPS)),
            (false, true) => safe_softplus_inv((self.upper - x).max(LOGIT_EPS)),
            (false, false) => x,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // Stable transforms agree with the naive formulas on a safe grid.
    //
    // Given
    // -----
    // - x ∈ {-5, -0.5, 0, 0.5, 5}.
    //
    // Expect
    // ------
    // - softplus, logistic and their inverses match closed forms.
    fn stable_transforms_match_naive_forms() {
        for &x in &[-5.0_f64, -0.5, 0.0, 0.5, 5.0] {
            assert_relative_eq!(safe_softplus(x), (1.0 + x.exp()).ln(), epsilon = 1e-12);
            assert_relative_eq!(safe_logistic(x), 1.0 / (1.0 + (-x).exp()), epsilon = 1e-12);
            assert_relative_eq!(safe_logit(safe_logistic(x)), x, epsilon = 1e-9);
            assert_relative_eq!(safe_softplus_inv(safe_softplus(x)), x, epsilon = 1e-9);
        }
        assert_eq!(safe_softplus(50.0), 50.0);
        assert!(safe_logistic(-800.0) >= 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Every bound kind maps the free line into its interval and back.
    //
    // Given
    // -----
    // - [0, 2], [1, ∞), (-∞, 3], unbounded; points strictly inside.
    //
    // Expect
    // ------
    // - `to_model(to_free(x)) ≈ x` and outputs stay in range for extreme θ.
    fn bounds_round_trip_inside_interval() {
        let cases = [
            (Bound::new(0.0, 2.0), 0.7),
            (Bound::at_least(1.0), 4.0),
            (Bound::new(f64::NEG_INFINITY, 3.0), -2.0),
            (Bound::unbounded(), -12.5),
        ];
        for (b, x) in cases {
            assert_relative_eq!(b.to_model(b.to_free(x)), x, epsilon = 1e-9);
            for theta in [-40.0, 40.0] {
                let y = b.to_model(theta);
                assert!(y >= b.lower && y <= b.upper, "{b:?} {theta} -> {y}");
            }
        }
        let fixed = Bound::new(1.5, 1.5);
        assert_eq!(fixed.to_model(fixed.to_free(1.5)), 1.5);
        assert!(!Bound::new(2.0, 1.0).is_valid());
    }

    #[test]
    // Purpose
    // -------
    // Start values on a finite bound are moved to where the transform still
    // has a usable slope.
    //
    // Given
    // -----
    // - [0, ∞) with x = 0 and magnitude 2; [4, 20] with x = 4 and x = 30;
    //   (-∞, 1] with x = 1; a fixed interval; an interior value.
    //
    // Expect
    // ------
    // - 0.1, 4.8, 19.2, 0.95, the fixed point, and the interior value
    //   unchanged; the softplus slope at the moved start exceeds 0.05.
    fn interior_start_leaves_flat_region() {
        let half = Bound::at_least(0.0);
        assert_relative_eq!(half.interior_start(0.0, 2.0), 0.1, epsilon = 1e-15);
        let interval = Bound::new(4.0, 20.0);
        assert_relative_eq!(interval.interior_start(4.0, 1.0), 4.8, epsilon = 1e-12);
        assert_relative_eq!(interval.interior_start(30.0, 1.0), 19.2, epsilon = 1e-12);
        assert_relative_eq!(interval.interior_start(12.0, 1.0), 12.0);
        let upper = Bound::new(f64::NEG_INFINITY, 1.0);
        assert_relative_eq!(upper.interior_start(1.0, 1.0), 0.95, epsilon = 1e-12);
        assert_eq!(Bound::new(1.5, 1.5).interior_start(1.5, 1.0), 1.5);

        let theta = half.to_free(half.interior_start(0.0, 2.0));
        assert!(safe_logistic(theta) > 0.05);
    }
}
