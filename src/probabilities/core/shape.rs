//! Model shape (R, G), the supported-bounds table and base-G index math.
//!
//! - `R`: Reichweite (interaction range), the number of preceding layers the
//!   next layer type depends on.
//! - `G`: number of distinct layer types.
//!
//! Matrices are stored as `rank × rank` with `rank = G^max(R, 1)`. An index
//! tuple of layer types is flattened with base-G positional weighting,
//! most significant first: `flat = Σ idx[i] · G^(len-1-i)`.
use crate::probabilities::errors::{ProbError, ProbResult};

/// Largest supported interaction range.
pub const MAX_R: usize = 3;

/// Largest supported number of layer types.
pub const MAX_G: usize = 6;

/// Supported G range (inclusive) per R, indexed by R.
pub const G_BOUNDS: [(usize, usize); MAX_R + 1] = [(1, 6), (2, 4), (2, 3), (2, 2)];

/// `true` iff `(r, g)` is marked supported in [`G_BOUNDS`].
pub fn is_supported(r: usize, g: usize) -> bool {
    match G_BOUNDS.get(r) {
        Some(&(lo, hi)) => g >= lo && g <= hi,
        None => false,
    }
}

/// Validated (R, G) pair.
///
/// Invariant: `is_supported(r, g)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelShape {
    pub r: usize,
    pub g: usize,
}

impl ModelShape {
    /// Construct a shape after consulting the bounds table.
    ///
    /// # Errors
    /// - [`ProbError::UnsupportedModel`] if `(r, g)` is not supported.
    pub fn new(r: usize, g: usize) -> ProbResult<Self> {
        if !is_supported(r, g) {
            return Err(ProbError::UnsupportedModel { r, g });
        }
        Ok(ModelShape { r, g })
    }

    /// Length of a stored context tuple: `max(R, 1)`.
    ///
    /// R0 models are stored like R1 models (pairwise), so their context is a
    /// single layer.
    pub fn context_len(&self) -> usize {
        self.r.max(1)
    }

    /// Dimension of the square `W`/`P` matrices: `G^max(R, 1)`.
    pub fn rank(&self) -> usize {
        self.g.pow(self.context_len() as u32)
    }

    /// Number of distinct layer sequences of length `context_len() + 1`.
    pub fn sequence_count(&self) -> usize {
        self.rank() * self.g
    }

    /// Flatten an index tuple (any length) using base-G weighting.
    ///
    /// # Errors
    /// - [`ProbError::LayerIndexOutOfRange`] if any index is `>= G`.
    pub fn flat_index(&self, indices: &[usize]) -> ProbResult<usize> {
        let mut flat = 0;
        for &index in indices {
            if index >= self.g {
                return Err(ProbError::LayerIndexOutOfRange { index, g: self.g });
            }
            flat = flat * self.g + index;
        }
        Ok(flat)
    }

    /// Inverse of [`flat_index`](Self::flat_index) for a tuple of length `len`.
    pub fn unflatten(&self, mut flat: usize, len: usize) -> Vec<usize> {
        let mut out = vec![0; len];
        for slot in out.iter_mut().rev() {
            *slot = flat % self.g;
            flat /= self.g;
        }
        out
    }

    /// Matrix coordinates of a weight lookup.
    ///
    /// - A tuple of length `context_len()` addresses the diagonal cell holding
    ///   that context's weight.
    /// - A tuple of length `context_len() + 1` addresses the transition cell
    ///   `(flat(first R), flat(last R))`.
    ///
    /// # Errors
    /// - [`ProbError::IndexLengthMismatch`] for any other tuple length.
    /// - [`ProbError::LayerIndexOutOfRange`] for indices `>= G`.
    pub fn w_coords(&self, indices: &[usize]) -> ProbResult<(usize, usize)> {
        let n = self.context_len();
        if indices.len() == n {
            let flat = self.flat_index(indices)?;
            return Ok((flat, flat));
        }
        self.p_coords(indices)
    }

    /// Matrix coordinates of a conditional-probability lookup.
    ///
    /// The tuple must have length `context_len() + 1`; the row is the
    /// context (first R indices) and the column is the successor context
    /// (last R indices).
    pub fn p_coords(&self, indices: &[usize]) -> ProbResult<(usize, usize)> {
        let n = self.context_len();
        if indices.len() != n + 1 {
            return Err(ProbError::IndexLengthMismatch { expected: n + 1, found: indices.len() });
        }
        let row = self.flat_index(&indices[..n])?;
        let col = self.flat_index(&indices[1..])?;
        Ok((row, col))
    }

    /// Successor context of `context` when a layer of type `next` follows.
    pub fn successor(&self, context: usize, next: usize) -> usize {
        (context * self.g + next) % self.rank()
    }

    /// Layer type at the head (oldest position) of a context.
    pub fn head(&self, context: usize) -> usize {
        context / self.g.pow(self.context_len() as u32 - 1)
    }

    /// Layer type at the tail (most recent position) of a context.
    pub fn tail(&self, context: usize) -> usize {
        context % self.g
    }
}
