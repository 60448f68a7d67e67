//! Specimen: an experimental pattern, its exclusion ranges and the
//! calculated pattern written back by the mixture.
use ndarray::Array1;

use crate::mixture::errors::{MixtureError, MixtureResult};

/// Index of a specimen in its mixture's specimen pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecimenId(pub usize);

/// Measured `(2θ, I)` pair of equal length; `2θ` in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentalPattern {
    pub two_theta: Array1<f64>,
    pub intensity: Array1<f64>,
}

/// Last pattern pushed by the mixture: total plus one scaled contribution
/// per phase column (`None` for empty cells).
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatedPattern {
    pub total: Array1<f64>,
    pub phases: Vec<Option<Array1<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Specimen {
    pub name: String,
    experimental: Option<ExperimentalPattern>,
    /// Closed `2θ` intervals (degrees) left out of every residual.
    pub exclusion_ranges: Vec<(f64, f64)>,
    calculated: Option<CalculatedPattern>,
}

impl Specimen {
    pub fn new(name: impl Into<String>) -> Self {
        Specimen { name: name.into(), ..Default::default() }
    }

    /// Specimen with an experimental pattern.
    ///
    /// # Errors
    /// - [`MixtureError::PatternLengthMismatch`] for arrays of unequal length.
    pub fn with_experimental(
        name: impl Into<String>, two_theta: Array1<f64>, intensity: Array1<f64>,
    ) -> MixtureResult<Self> {
        let mut out = Specimen::new(name);
        out.set_experimental(two_theta, intensity)?;
        Ok(out)
    }

    pub fn set_experimental(
        &mut self, two_theta: Array1<f64>, intensity: Array1<f64>,
    ) -> MixtureResult<()> {
        if two_theta.len() != intensity.len() {
            return Err(MixtureError::PatternLengthMismatch {
                two_theta: two_theta.len(),
                intensity: intensity.len(),
            });
        }
        self.experimental = Some(ExperimentalPattern { two_theta, intensity });
        Ok(())
    }

    pub fn experimental(&self) -> Option<&ExperimentalPattern> {
        self.experimental.as_ref()
    }

    /// `true` when there is a non-empty experimental pattern.
    pub fn has_data(&self) -> bool {
        self.experimental.as_ref().map(|e| !e.two_theta.is_empty()).unwrap_or(false)
    }

    /// `true` for every angle outside all exclusion ranges.
    pub fn get_exclusion_selector(&self, two_theta: &Array1<f64>) -> Array1<bool> {
        two_theta.mapv(|t| {
            !self.exclusion_ranges.iter().any(|&(lo, hi)| t >= lo.min(hi) && t <= hi.max(lo))
        })
    }

    pub fn update_pattern(&mut self, total: Array1<f64>, phases: Vec<Option<Array1<f64>>>) {
        self.calculated = Some(CalculatedPattern { total, phases });
    }

    pub fn calculated(&self) -> Option<&CalculatedPattern> {
        self.calculated.as_ref()
    }
}
