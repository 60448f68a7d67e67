//! R3 model for G = 2.
//!
//! Restricted: `P22 = 0` and `P212 = 0`, i.e. every type-2 layer is
//! surrounded by at least two type-1 layers on each side. This fixes
//! `W112 = W121 = W211 = W2` and `W111 = 3·W1 - 2`, so `W1` lives in
//! `[2/3, 1]`.
//!
//! The pivot `P1111_or_P2111` flips at `W1 = 3/4`; the other quadruple
//! probability follows from `W1112 == W2111`. The transitions `P1121` and
//! `P1211` are `1` by construction and every context that cannot occur
//! (`122`, `212`, `221`, `222`) falls back to "next layer is type 1".
use crate::probabilities::core::{ModelShape, ParameterSpec, SequenceWeights};

pub(super) fn specs_g2() -> Vec<ParameterSpec> {
    vec![ParameterSpec::new("W1", 2.0 / 3.0, 1.0, 0.85), ParameterSpec::unit("P1111_or_P2111", 0.5)]
}

/// `[W1, P1111_or_P2111]`
pub(super) fn weights_g2(shape: &ModelShape, v: &[f64]) -> SequenceWeights {
    let (w1, p) = (v[0], v[1]);
    let w2 = 1.0 - w1;
    let w111 = 3.0 * w1 - 2.0;

    let w1112 = if w1 <= 0.75 { w111 * (1.0 - p) } else { w2 * p };
    let w1111 = w111 - w1112;
    let w2112 = w2 - w1112;

    let mut seq = SequenceWeights::zeros(shape);
    seq.set(&[0, 0, 0, 0], w1111);
    seq.set(&[0, 0, 0, 1], w1112);
    seq.set(&[0, 0, 1, 0], w2);
    seq.set(&[0, 1, 0, 0], w2);
    seq.set(&[1, 0, 0, 0], w1112);
    seq.set(&[1, 0, 0, 1], w2112);
    seq
}
