//! R1 (nearest-neighbour) models for G = 2, 3, 4.
//!
//! All three share the same pivot: `W1` is the fraction of the first layer
//! type and `P11_or_P22` changes meaning at `W1 = 0.5`.
//!
//! - `W1 <= 0.5`: the pivot is `P11`, so `W11 = W1 · P11`.
//! - `W1 > 0.5`: the pivot is `P22` (for G > 2 read "P of a non-first layer
//!   following a non-first layer"), so `W11 = W1 - (1 - W1)(1 - P22)`.
//!
//! In either regime the pair weights `W1x = W1 - W11` of first→other and
//! other→first sequences are equal (stationarity). The remaining pair
//! weights are split with `G`/`R` ratio parameters and closed by row and
//! column sums, so `Σ_j W_ij = W_i = Σ_j W_ji` always holds and only the
//! `[0, 1]` ranges can be violated.
use crate::probabilities::core::{ModelShape, ParameterSpec, SequenceWeights};

pub(super) const PIVOT: &str = "P11_or_P22";

// ---- Parameter tables ----

pub(super) fn specs_g2() -> Vec<ParameterSpec> {
    vec![ParameterSpec::unit("W1", 0.75), ParameterSpec::unit(PIVOT, 0.5)]
}

pub(super) fn specs_g3() -> Vec<ParameterSpec> {
    vec![
        ParameterSpec::unit("W1", 1.0 / 3.0),
        ParameterSpec::unit(PIVOT, 1.0 / 3.0),
        ParameterSpec::unit("G1", 0.5),
        ParameterSpec::unit("G2", 0.5),
        ParameterSpec::unit("G3", 0.5),
        ParameterSpec::unit("G4", 0.5),
    ]
}

pub(super) fn specs_g4() -> Vec<ParameterSpec> {
    let mut specs = vec![
        ParameterSpec::unit("W1", 0.25),
        ParameterSpec::unit(PIVOT, 0.25),
        ParameterSpec::unit("R2", 1.0 / 3.0),
        ParameterSpec::unit("R3", 0.5),
    ];
    const G_NAMES: [&str; 8] = ["G1", "G2", "G3", "G4", "G5", "G6", "G7", "G8"];
    for (k, name) in G_NAMES.into_iter().enumerate() {
        let default = if k % 2 == 0 { 1.0 / 3.0 } else { 0.5 };
        specs.push(ParameterSpec::unit(name, default));
    }
    specs
}

// ---- Closed forms ----

/// `(W11, W1x)` from the fraction of the first type and the pivot.
fn pivot(w1: f64, p: f64) -> (f64, f64) {
    let wx = 1.0 - w1;
    let w11 = if w1 <= 0.5 { w1 * p } else { w1 - wx * (1.0 - p) };
    (w11, w1 - w11)
}

/// `[W1, P11_or_P22]`
pub(super) fn weights_g2(shape: &ModelShape, v: &[f64]) -> SequenceWeights {
    let (w1, p) = (v[0], v[1]);
    let w2 = 1.0 - w1;
    let (w11, w12) = pivot(w1, p);
    let mut seq = SequenceWeights::zeros(shape);
    seq.set(&[0, 0], w11);
    seq.set(&[0, 1], w12);
    seq.set(&[1, 0], w12);
    seq.set(&[1, 1], w2 - w12);
    seq
}

/// `[W1, P11_or_P22, G1, G2, G3, G4]` with `G1 = W2/(W2+W3)` and the
/// non-first block `Wxx = W22+W23+W32+W33` split as
/// `G2 = (W22+W23)/Wxx`, `G3 = W22/(W22+W23)`, `G4 = W32/(W32+W33)`.
/// The first row and column close the marginals.
pub(super) fn weights_g3(shape: &ModelShape, v: &[f64]) -> SequenceWeights {
    let (w1, p, g1, g2, g3, g4) = (v[0], v[1], v[2], v[3], v[4], v[5]);
    let wx = 1.0 - w1;
    let w2 = wx * g1;
    let w3 = wx * (1.0 - g1);
    let (w11, w1x) = pivot(w1, p);

    let wxx = wx - w1x;
    let w2x = wxx * g2;
    let w3x = wxx - w2x;
    let w22 = w2x * g3;
    let w23 = w2x - w22;
    let w32 = w3x * g4;
    let w33 = w3x - w32;

    let w21 = w2 - w2x;
    let w31 = w3 - w3x;
    let w12 = w2 - w22 - w32;
    let w13 = w3 - w23 - w33;

    let mut seq = SequenceWeights::zeros(shape);
    seq.set(&[0, 0], w11);
    seq.set(&[0, 1], w12);
    seq.set(&[0, 2], w13);
    seq.set(&[1, 0], w21);
    seq.set(&[1, 1], w22);
    seq.set(&[1, 2], w23);
    seq.set(&[2, 0], w31);
    seq.set(&[2, 1], w32);
    seq.set(&[2, 2], w33);
    seq
}

/// `[W1, P11_or_P22, R2, R3, G1..G8]`.
///
/// - `R2 = W2/(W2+W3+W4)`, `R3 = W3/(W3+W4)`.
/// - Row 1 split by `G1`, `G2`; column 1 split by `G3`, `G4`.
/// - Rows 2 and 3 (after removing their first-column weight) split by
///   `G5`, `G6` and `G7`, `G8`; row 4 closes every column.
pub(super) fn weights_g4(shape: &ModelShape, v: &[f64]) -> SequenceWeights {
    let (w1, p, r2, r3) = (v[0], v[1], v[2], v[3]);
    let g = &v[4..12];
    let wx = 1.0 - w1;
    let marg = [w1, wx * r2, wx * (1.0 - r2) * r3, wx - wx * r2 - wx * (1.0 - r2) * r3];
    let (w11, w1x) = pivot(w1, p);

    let mut pw = [[0.0_f64; 4]; 4];
    pw[0][0] = w11;
    pw[0][1] = w1x * g[0];
    pw[0][2] = (w1x - pw[0][1]) * g[1];
    pw[0][3] = w1x - pw[0][1] - pw[0][2];
    pw[1][0] = w1x * g[2];
    pw[2][0] = (w1x - pw[1][0]) * g[3];
    pw[3][0] = w1x - pw[1][0] - pw[2][0];

    for (row, (ga, gb)) in [(1usize, (g[4], g[5])), (2, (g[6], g[7]))] {
        let rest = marg[row] - pw[row][0];
        pw[row][1] = rest * ga;
        pw[row][2] = (rest - pw[row][1]) * gb;
        pw[row][3] = rest - pw[row][1] - pw[row][2];
    }
    for j in 1..4 {
        pw[3][j] = marg[j] - pw[0][j] - pw[1][j] - pw[2][j];
    }

    let mut seq = SequenceWeights::zeros(shape);
    for (i, row) in pw.iter().enumerate() {
        for (j, &w) in row.iter().enumerate() {
            seq.set(&[i, j], w);
        }
    }
    seq
}
