//! R2 models for G = 2 and G = 3.
//!
//! Both are restricted models in which a non-first layer is always isolated
//! between first-type layers (`P22 = 0`, and for G = 3 no two non-first
//! layers touch). Consequently the pair weights are fixed by the marginals:
//! `W12 = W21 = W2` (and `W13 = W31 = W3`), `W11 = W1 - (1 - W1)`, which is
//! only non-negative for `W1 >= 0.5`.
//!
//! The triple weights are driven by one pivot whose meaning flips at
//! `W1 = 2/3`:
//!
//! - G = 2: `P112` (below) or `P211` (above).
//! - G = 3: `P11x` (below) or `Px11` (above), x any non-first type.
//!
//! Contexts that never occur (e.g. `22`, `23`) receive the "next layer is of
//! the first type" row.
use crate::probabilities::core::{ModelShape, ParameterSpec, SequenceWeights};

pub(super) fn specs_g2() -> Vec<ParameterSpec> {
    vec![ParameterSpec::new("W1", 0.5, 1.0, 0.8), ParameterSpec::unit("P112_or_P211", 0.5)]
}

pub(super) fn specs_g3() -> Vec<ParameterSpec> {
    vec![
        ParameterSpec::new("W1", 0.5, 1.0, 0.8),
        ParameterSpec::unit("P11x_or_Px11", 0.5),
        ParameterSpec::unit("G1", 0.5),
        ParameterSpec::unit("G2", 0.5),
        ParameterSpec::unit("G3", 0.5),
        ParameterSpec::unit("G4", 0.5),
    ]
}

const PIVOT_THRESHOLD: f64 = 2.0 / 3.0;

/// `[W1, P112_or_P211]`
pub(super) fn weights_g2(shape: &ModelShape, v: &[f64]) -> SequenceWeights {
    let (w1, p) = (v[0], v[1]);
    let w2 = 1.0 - w1;
    let w11 = w1 - w2;

    // W112 == W211 by stationarity
    let w112 = if w1 <= PIVOT_THRESHOLD { w11 * p } else { w2 * p };
    let w111 = w11 - w112;
    let w212 = w2 - w112;

    let mut seq = SequenceWeights::zeros(shape);
    seq.set(&[0, 0, 0], w111);
    seq.set(&[0, 0, 1], w112);
    seq.set(&[0, 1, 0], w2);
    seq.set(&[1, 0, 0], w112);
    seq.set(&[1, 0, 1], w212);
    seq
}

/// `[W1, P11x_or_Px11, G1, G2, G3, G4]` with `G1 = W2/(W2+W3)`,
/// `G2 = W112/W11x`, `G3 = W211/Wx11`, `G4 = W212/(W212+W213)`.
pub(super) fn weights_g3(shape: &ModelShape, v: &[f64]) -> SequenceWeights {
    let (w1, p, g1, g2, g3, g4) = (v[0], v[1], v[2], v[3], v[4], v[5]);
    let wx = 1.0 - w1;
    let w2 = wx * g1;
    let w3 = wx * (1.0 - g1);
    let w11 = w1 - wx;

    // W11x == Wx11 by stationarity
    let w11x = if w1 <= PIVOT_THRESHOLD { w11 * p } else { wx * p };
    let w111 = w11 - w11x;

    let w112 = w11x * g2;
    let w113 = w11x * (1.0 - g2);
    let w211 = w11x * g3;
    let w311 = w11x * (1.0 - g3);

    let rest2 = w2 - w211;
    let w212 = rest2 * g4;
    let w213 = rest2 * (1.0 - g4);
    let w312 = w2 - w112 - w212;
    let w313 = (w3 - w311) - w312;

    let mut seq = SequenceWeights::zeros(shape);
    seq.set(&[0, 0, 0], w111);
    seq.set(&[0, 0, 1], w112);
    seq.set(&[0, 0, 2], w113);
    seq.set(&[0, 1, 0], w2);
    seq.set(&[0, 2, 0], w3);
    seq.set(&[1, 0, 0], w211);
    seq.set(&[1, 0, 1], w212);
    seq.set(&[1, 0, 2], w213);
    seq.set(&[2, 0, 0], w311);
    seq.set(&[2, 0, 1], w312);
    seq.set(&[2, 0, 2], w313);
    seq
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_stationary(seq: &SequenceWeights, g: usize) {
        assert_abs_diff_eq!(seq.total(), 1.0, epsilon = 1e-12);
        // Σ_i W(i, a, b) == Σ_k W(a, b, k)
        for a in 0..g {
            for b in 0..g {
                let lead: f64 = (0..g).map(|i| seq.get(&[i, a, b])).sum();
                let trail: f64 = (0..g).map(|k| seq.get(&[a, b, k])).sum();
                assert_abs_diff_eq!(lead, trail, epsilon = 1e-12);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Triple weights are stationary on both sides of the pivot threshold and
    // never place two type-2 layers next to each other.
    //
    // Given
    // -----
    // - R2G2 at W1 = 0.6 and 0.9; R2G3 at W1 = 0.6 and 0.8.
    //
    // Expect
    // ------
    // - Stationary tables; every sequence containing (1, 1) has zero weight.
    fn restricted_r2_tables_are_stationary() {
        let s2 = ModelShape::new(2, 2).unwrap();
        for w1 in [0.6, 0.9] {
            let seq = weights_g2(&s2, &[w1, 0.4]);
            assert_stationary(&seq, 2);
            assert_eq!(seq.get(&[1, 1, 0]), 0.0);
            assert_eq!(seq.get(&[0, 1, 1]), 0.0);
        }
        let s3 = ModelShape::new(2, 3).unwrap();
        for v in [[0.6, 0.3, 0.4, 0.7, 0.2, 0.5], [0.8, 0.5, 0.5, 0.5, 0.5, 0.5]] {
            let seq = weights_g3(&s3, &v);
            assert_stationary(&seq, 3);
            assert_eq!(seq.get(&[1, 2, 0]), 0.0);
        }
    }

    #[test]
    // Purpose
    // -------
    // Below the threshold the pivot is P112 (share of 11-contexts followed by
    // type 2); above it the pivot is P211.
    //
    // Given
    // -----
    // - (W1, P) = (0.6, 0.5) and (0.9, 0.5).
    //
    // Expect
    // ------
    // - W112 / W11 = 0.5 below; W211 / W21 = 0.5 above.
    fn r2g2_pivot_switches_meaning_at_two_thirds() {
        let s2 = ModelShape::new(2, 2).unwrap();
        let low = weights_g2(&s2, &[0.6, 0.5]);
        let w11 = low.get(&[0, 0, 0]) + low.get(&[0, 0, 1]);
        assert_abs_diff_eq!(low.get(&[0, 0, 1]) / w11, 0.5, epsilon = 1e-12);

        let high = weights_g2(&s2, &[0.9, 0.5]);
        let w21 = high.get(&[1, 0, 0]) + high.get(&[1, 0, 1]);
        assert_abs_diff_eq!(high.get(&[1, 0, 0]) / w21, 0.5, epsilon = 1e-12);
    }
}
