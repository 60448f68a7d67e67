//! Search methods for structural refinement.
//!
//! - `0`: bounded L-BFGS through [`crate::optimization::minimizer`].
//! - `1`: [`genetic`] population search.
//! - `100`: [`brute`] grid search.
pub mod brute;
pub mod genetic;

use crate::mixture::{MixtureError, MixtureResult};

pub use self::{
    brute::{run_brute, BruteForceOptions},
    genetic::{run_genetic, GeneticOptions},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefineMethod {
    #[default]
    Lbfgs,
    Genetic,
    BruteForce,
}

impl RefineMethod {
    /// # Errors
    /// - [`MixtureError::UnsupportedRefineMethod`] for codes other than 0, 1, 100.
    pub fn from_code(code: i64) -> MixtureResult<Self> {
        match code {
            0 => Ok(RefineMethod::Lbfgs),
            1 => Ok(RefineMethod::Genetic),
            100 => Ok(RefineMethod::BruteForce),
            _ => Err(MixtureError::UnsupportedRefineMethod { code }),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            RefineMethod::Lbfgs => 0,
            RefineMethod::Genetic => 1,
            RefineMethod::BruteForce => 100,
        }
    }
}
