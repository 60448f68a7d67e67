//! Validity masks for `W` and `P`.
//!
//! The algebra of a model does not guarantee a physically meaningful result
//! for every parameter combination, so validity is checked after each
//! update instead of being enforced:
//!
//! - Both masks start with every cell at `1`.
//! - If the context weights on the diagonal of `W` do not sum to `1`, every
//!   diagonal cell of the W mask is decremented.
//! - Every `W` or `P` cell outside `[0, 1]` decrements its own mask cell.
//! - Every cell of a `P` row that does not sum to `1` is decremented.
//! - A matrix is valid iff its mask sums to `rank²`.
//!
//! All comparisons against `0` and `1` use [`VALIDITY_TOL`]; derived sums are
//! practically never exactly `1.0` in floating point.
use ndarray::Array2;

use crate::probabilities::core::matrices::ProbabilityMatrices;

/// Tolerance used for every unit-sum and range comparison.
pub const VALIDITY_TOL: f64 = 1e-9;

/// Per-cell validity masks plus the derived flags.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidityMasks {
    pub w_mask: Array2<i32>,
    pub p_mask: Array2<i32>,
    pub w_valid: bool,
    pub p_valid: bool,
}

impl ValidityMasks {
    /// Cells (row, col) of the W mask that were decremented.
    pub fn invalid_w_cells(&self) -> Vec<(usize, usize)> {
        invalid_cells(&self.w_mask)
    }

    /// Cells (row, col) of the P mask that were decremented.
    pub fn invalid_p_cells(&self) -> Vec<(usize, usize)> {
        invalid_cells(&self.p_mask)
    }
}

fn invalid_cells(mask: &Array2<i32>) -> Vec<(usize, usize)> {
    mask.indexed_iter().filter(|(_, &v)| v != 1).map(|(ij, _)| ij).collect()
}

#[inline]
fn out_of_unit_range(x: f64) -> bool {
    !(x >= -VALIDITY_TOL && x <= 1.0 + VALIDITY_TOL)
}

/// Build both masks for the current matrices.
pub fn validate(m: &ProbabilityMatrices) -> ValidityMasks {
    let rank = m.w.nrows();
    let mut w_mask = Array2::<i32>::ones((rank, rank));
    let mut p_mask = Array2::<i32>::ones((rank, rank));

    let diag_sum: f64 = m.w.diag().sum();
    if (diag_sum - 1.0).abs() > VALIDITY_TOL || !diag_sum.is_finite() {
        for i in 0..rank {
            w_mask[[i, i]] -= 1;
        }
    }

    for ((i, j), &x) in m.w.indexed_iter() {
        if out_of_unit_range(x) {
            w_mask[[i, j]] -= 1;
        }
    }
    for ((i, j), &x) in m.p.indexed_iter() {
        if out_of_unit_range(x) {
            p_mask[[i, j]] -= 1;
        }
    }

    for (i, row) in m.p.rows().into_iter().enumerate() {
        let s = row.sum();
        if (s - 1.0).abs() > VALIDITY_TOL || !s.is_finite() {
            p_mask.row_mut(i).mapv_inplace(|v| v - 1);
        }
    }

    let full = (rank * rank) as i32;
    let w_valid = w_mask.sum() == full;
    let p_valid = p_mask.sum() == full;
    ValidityMasks { w_mask, p_mask, w_valid, p_valid }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    fn matrices(w: Array2<f64>, p: Array2<f64>) -> ProbabilityMatrices {
        let g = w.nrows();
        ProbabilityMatrices { w, p, lw: Array1::zeros(g) }
    }

    #[test]
    // Purpose
    // -------
    // Well-formed matrices pass, and sums that are only equal to one up to
    // rounding are accepted.
    //
    // Given
    // -----
    // - Diagonal 0.1 + 0.2 + 0.7 (not exactly 1.0 in binary), uniform P.
    //
    // Expect
    // ------
    // - Both flags true, masks all ones.
    fn validate_accepts_rounding_level_deviations() {
        let third = 1.0 / 3.0;
        let m = matrices(
            array![[0.1, 0.0, 0.0], [0.0, 0.2, 0.0], [0.0, 0.0, 0.7]],
            Array2::from_elem((3, 3), third),
        );
        let v = validate(&m);
        assert!(v.w_valid && v.p_valid);
        assert!(v.invalid_w_cells().is_empty());
    }

    #[test]
    // Purpose
    // -------
    // Each rule decrements the cells it concerns and nothing else.
    //
    // Given
    // -----
    // - Diagonal sums to 1.1, one W cell negative, one P row summing to 1.2
    //   with a cell above 1.
    //
    // Expect
    // ------
    // - Flags false; the mask pinpoints diagonal, the negative cell and the
    //   bad P row (with the out-of-range cell decremented twice).
    fn validate_pinpoints_offending_cells() {
        let m = matrices(
            array![[0.6, -0.1], [0.1, 0.5]],
            array![[0.5, 0.5], [1.1, 0.1]],
        );
        let v = validate(&m);
        assert!(!v.w_valid && !v.p_valid);
        assert_eq!(v.w_mask, array![[0, 0], [1, 0]]);
        assert_eq!(v.p_mask, array![[1, 1], [-1, 0]]);
        assert_eq!(v.invalid_p_cells(), vec![(1, 0), (1, 1)]);
    }
}
