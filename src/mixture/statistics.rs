//! Goodness-of-fit statistics between experimental and calculated patterns.
//!
//! - `Rp   = Σ|e - c| / Σ|e| · 100`
//! - `Rwp  = sqrt(Σ w (e - c)² / Σ w e²) · 100`, `w = 1/e` (0 where `e <= 0`)
//! - `Rpder` = `Rp` of the first differences of both patterns
//!
//! All three return 0 when the denominator vanishes; they are non-negative
//! for finite input.
use std::str::FromStr;

use crate::mixture::errors::MixtureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResidualKind {
    #[default]
    Rp,
    Rwp,
    Rpder,
}

impl FromStr for ResidualKind {
    type Err = MixtureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rp" => Ok(ResidualKind::Rp),
            "rwp" => Ok(ResidualKind::Rwp),
            "rpder" => Ok(ResidualKind::Rpder),
            _ => Err(MixtureError::UnknownResidualKind { name: s.to_string() }),
        }
    }
}

impl ResidualKind {
    pub fn compute(&self, exp: &[f64], calc: &[f64]) -> f64 {
        match self {
            ResidualKind::Rp => rp(exp, calc),
            ResidualKind::Rwp => rwp(exp, calc),
            ResidualKind::Rpder => rpder(exp, calc),
        }
    }
}

pub fn rp(exp: &[f64], calc: &[f64]) -> f64 {
    let (num, den) = exp
        .iter()
        .zip(calc.iter())
        .fold((0.0, 0.0), |(n, d), (&e, &c)| (n + (e - c).abs(), d + e.abs()));
    if den > 0.0 { num / den * 100.0 } else { 0.0 }
}

pub fn rwp(exp: &[f64], calc: &[f64]) -> f64 {
    let (num, den) = exp.iter().zip(calc.iter()).fold((0.0, 0.0), |(n, d), (&e, &c)| {
        let w = if e > 0.0 { 1.0 / e } else { 0.0 };
        (n + w * (e - c).powi(2), d + w * e * e)
    });
    if den > 0.0 { (num / den).sqrt() * 100.0 } else { 0.0 }
}

pub fn rpder(exp: &[f64], calc: &[f64]) -> f64 {
    let diff = |v: &[f64]| v.windows(2).map(|w| w[1] - w[0]).collect::<Vec<f64>>();
    rp(&diff(exp), &diff(calc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // Each statistic matches a hand computation and is 0 for a perfect fit.
    //
    // Given
    // -----
    // - e = [1, 2, 4], c = [1, 3, 3].
    //
    // Expect
    // ------
    // - Rp = 2/7·100; Rwp = sqrt((1/2 + 1/4) / 7)·100; Rpder = 3/3·100.
    fn statistics_match_hand_computation() {
        let e = [1.0, 2.0, 4.0];
        let c = [1.0, 3.0, 3.0];
        assert_relative_eq!(rp(&e, &c), 200.0 / 7.0, epsilon = 1e-12);
        assert_relative_eq!(rwp(&e, &c), (0.75_f64 / 7.0).sqrt() * 100.0, epsilon = 1e-12);
        // de = [1, 2], dc = [2, 0] -> |1-2| + |2-0| = 3 over 3.
        assert_relative_eq!(rpder(&e, &c), 100.0, epsilon = 1e-12);
        for kind in [ResidualKind::Rp, ResidualKind::Rwp, ResidualKind::Rpder] {
            assert_eq!(kind.compute(&e, &e), 0.0);
        }
    }

    #[test]
    fn degenerate_inputs_are_zero() {
        assert_eq!(rp(&[], &[]), 0.0);
        assert_eq!(rwp(&[0.0, -1.0], &[1.0, 1.0]), 0.0);
        assert_eq!(rpder(&[1.0], &[2.0]), 0.0);
        assert_eq!("RWP".parse::<ResidualKind>().unwrap(), ResidualKind::Rwp);
        assert!("chi2".parse::<ResidualKind>().is_err());
    }
}
