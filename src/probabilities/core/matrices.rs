//! Weight (`W`) and conditional-probability (`P`) storage.
//!
//! Every model derives the joint weight of each layer sequence of length
//! `R+1` (pairs for R0/R1) from its independent variables and hands the
//! table to [`ProbabilityMatrices::solve`], which fills the whole tensor
//! family in one pass:
//!
//! - `W[t, t]`: weight of context `t` (for R0/R1 the marginal `W_i`).
//! - `P[t, t']`: probability of moving from context `t` to its successor
//!   `t'`; zero for cells that are not a successor of `t`.
//! - `W[t, t']` (`t' != t`): `W[t, t] · P[t, t']`.
//! - `lW[i]`: marginal fraction of layer type `i`.
//!
//! A context with zero weight never raises. For R0 its row is the marginal
//! distribution of the next layer, so `P[i, j] = W_j` holds on every row;
//! for R ≥ 1 it falls back to "the next layer is of the first type". Either
//! way `P` stays row-stochastic.
use ndarray::{Array1, Array2};

use crate::probabilities::core::shape::ModelShape;

/// Guarded reciprocal: `1/x` for `x > 0`, otherwise `0`.
#[inline]
pub fn inv(x: f64) -> f64 {
    if x > 0.0 { 1.0 / x } else { 0.0 }
}

/// Joint weights of all layer sequences of length `context_len() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceWeights {
    g: usize,
    data: Array1<f64>,
}

impl SequenceWeights {
    pub fn zeros(shape: &ModelShape) -> Self {
        SequenceWeights { g: shape.g, data: Array1::zeros(shape.sequence_count()) }
    }

    fn offset(&self, seq: &[usize]) -> usize {
        seq.iter().fold(0, |acc, &i| acc * self.g + i)
    }

    /// Store the weight of `seq` (0-based layer types).
    pub fn set(&mut self, seq: &[usize], weight: f64) {
        let k = self.offset(seq);
        self.data[k] = weight;
    }

    pub fn get(&self, seq: &[usize]) -> f64 {
        self.data[self.offset(seq)]
    }

    /// Sum of all sequence weights.
    pub fn total(&self) -> f64 {
        self.data.sum()
    }

    /// Weight of the sequence `context ++ [next]` by flat context index.
    fn by_context(&self, context: usize, next: usize) -> f64 {
        self.data[context * self.g + next]
    }
}

/// The `W`/`P` matrix pair plus the marginal layer fractions.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityMatrices {
    pub w: Array2<f64>,
    pub p: Array2<f64>,
    pub lw: Array1<f64>,
}

impl ProbabilityMatrices {
    pub fn zeros(shape: &ModelShape) -> Self {
        let rank = shape.rank();
        ProbabilityMatrices {
            w: Array2::zeros((rank, rank)),
            p: Array2::zeros((rank, rank)),
            lw: Array1::zeros(shape.g),
        }
    }

    /// Rebuild `W`, `P` and `lW` from sequence weights.
    pub fn solve(&mut self, shape: &ModelShape, seq: &SequenceWeights) {
        let rank = shape.rank();
        let g = shape.g;
        self.w.fill(0.0);
        self.p.fill(0.0);
        self.lw.fill(0.0);

        let fallback = empty_context_row(shape, seq);
        for t in 0..rank {
            let context_weight: f64 = (0..g).map(|k| seq.by_context(t, k)).sum();
            self.w[[t, t]] = context_weight;
            self.lw[shape.head(t)] += context_weight;
            for k in 0..g {
                let succ = shape.successor(t, k);
                self.p[[t, succ]] = if context_weight > 0.0 {
                    seq.by_context(t, k) / context_weight
                } else {
                    fallback[k]
                };
            }
            for k in 0..g {
                let succ = shape.successor(t, k);
                if succ != t {
                    self.w[[t, succ]] = context_weight * self.p[[t, succ]];
                }
            }
        }
    }
}

/// Next-layer distribution used for a context without weight.
fn empty_context_row(shape: &ModelShape, seq: &SequenceWeights) -> Array1<f64> {
    let g = shape.g;
    let mut row = Array1::zeros(g);
    if shape.r == 0 {
        for t in 0..shape.rank() {
            for k in 0..g {
                row[k] += seq.by_context(t, k);
            }
        }
        let total = row.sum();
        if total > 0.0 {
            row /= total;
            return row;
        }
        row.fill(0.0);
    }
    row[0] = 1.0;
    row
}
