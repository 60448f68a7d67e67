//! R0 (memoryless) models for G = 1..6.
//!
//! The next layer type is independent of the current one, so `P[i, j] = W_j`
//! for every row. The G marginal fractions are parameterized by G-1 cascading
//! fractions `F1..F(G-1)` in `[0, 1]`:
//!
//! ```text
//! W_1 = F1
//! W_i = F_i · (1 - Σ_{k<i} W_k)      for 1 < i < G
//! W_G = 1 - Σ_{k<G} W_k
//! ```
//!
//! Every choice of `F` in the unit cube yields valid fractions, which is why
//! this parameterization replaced the direct `Wn` form (still accepted as a
//! legacy construction argument).
use crate::probabilities::core::{inv, ModelShape, ParameterSpec, SequenceWeights, MAX_G};

pub(super) const F_NAMES: [&str; MAX_G - 1] = ["F1", "F2", "F3", "F4", "F5"];
pub(super) const LEGACY_W_NAMES: [&str; MAX_G - 1] = ["W1", "W2", "W3", "W4", "W5"];

/// Defaults give equal fractions: `F_i = 1 / (G - i + 1)`.
pub(super) fn specs(g: usize) -> Vec<ParameterSpec> {
    (1..g).map(|i| ParameterSpec::unit(F_NAMES[i - 1], 1.0 / (g - i + 1) as f64)).collect()
}

/// Marginal fractions from the cascading `F` values.
pub(super) fn marginals(g: usize, f: &[f64]) -> Vec<f64> {
    let mut w = vec![0.0; g];
    let mut acc = 0.0;
    for i in 0..g.saturating_sub(1) {
        w[i] = f[i] * (1.0 - acc);
        acc += w[i];
    }
    w[g - 1] = 1.0 - acc;
    w
}

/// Legacy translation: `F_i = W_i / (1 - Σ_{k<i} W_k)`, 0 when the remainder
/// is empty.
pub(super) fn fractions_from_marginals(w: &[f64]) -> Vec<f64> {
    let mut acc = 0.0;
    let mut f = Vec::with_capacity(w.len());
    for &wi in w {
        f.push(wi * inv(1.0 - acc));
        acc += wi;
    }
    f
}

pub(super) fn sequence_weights(shape: &ModelShape, values: &[f64]) -> SequenceWeights {
    let g = shape.g;
    let w = marginals(g, values);
    let mut seq = SequenceWeights::zeros(shape);
    for i in 0..g {
        for j in 0..g {
            seq.set(&[i, j], w[i] * w[j]);
        }
    }
    seq
}
