//! Refinement context: the selected properties, their bounds and the
//! solutions recorded during one run.
use std::fmt;

use crate::{
    mixture::{Mixture, MixtureResult},
    refinement::{info::RefinementInfo, refinables::PropertyPath},
};

/// Lifecycle of one refinement run. Only one transition leaves `Created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineStatus {
    Created,
    Running,
    /// Stop signal observed; best solution applied.
    Stopped,
    /// Ran to completion, or was killed and rolled back.
    Finished,
    /// Nothing selected, or the method failed.
    Error,
}

impl RefineStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RefineStatus::Stopped | RefineStatus::Finished | RefineStatus::Error)
    }
}

impl fmt::Display for RefineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RefineStatus::Created => "created",
            RefineStatus::Running => "running",
            RefineStatus::Stopped => "stopped",
            RefineStatus::Finished => "finished",
            RefineStatus::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefineContext {
    pub ref_props: Vec<PropertyPath>,
    pub ranges: Vec<RefinementInfo>,
    pub initial_solution: Vec<f64>,
    pub initial_residual: Option<f64>,
    pub last_solution: Option<Vec<f64>>,
    pub last_residual: Option<f64>,
    pub best_solution: Option<Vec<f64>>,
    pub best_residual: Option<f64>,
    /// Number of distinct (uncached) objective evaluations.
    pub evaluations: usize,
    /// Error text of a failed run.
    pub message: Option<String>,
    status: RefineStatus,
}

impl RefineContext {
    /// Snapshot the current values of `selected` in `mixture`.
    pub fn new(mixture: &Mixture, selected: &[(PropertyPath, RefinementInfo)]) -> MixtureResult<Self> {
        let initial_solution = selected
            .iter()
            .map(|(path, _)| mixture.get_property(path))
            .collect::<MixtureResult<Vec<f64>>>()?;
        Ok(RefineContext {
            ref_props: selected.iter().map(|(p, _)| *p).collect(),
            ranges: selected.iter().map(|(_, i)| *i).collect(),
            initial_solution,
            ..RefineContext::empty()
        })
    }

    /// Context with nothing selected.
    pub fn empty() -> Self {
        RefineContext {
            ref_props: Vec::new(),
            ranges: Vec::new(),
            initial_solution: Vec::new(),
            initial_residual: None,
            last_solution: None,
            last_residual: None,
            best_solution: None,
            best_residual: None,
            evaluations: 0,
            message: None,
            status: RefineStatus::Created,
        }
    }

    pub fn status(&self) -> RefineStatus {
        self.status
    }

    /// Move to `status`; a terminal context stays unchanged.
    pub(crate) fn set_status(&mut self, status: RefineStatus) {
        if !self.status.is_terminal() {
            self.status = status;
        }
    }

    pub fn len(&self) -> usize {
        self.ref_props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ref_props.is_empty()
    }

    /// Clamp each coordinate of `solution` into its refinement range.
    pub fn clamp(&self, solution: &[f64]) -> Vec<f64> {
        solution.iter().zip(self.ranges.iter()).map(|(&v, r)| r.clamp(v)).collect()
    }

    /// Record an evaluated point; keeps the lowest residual as the best.
    pub(crate) fn record(&mut self, solution: &[f64], residual: f64) {
        self.evaluations += 1;
        self.last_solution = Some(solution.to_vec());
        self.last_residual = Some(residual);
        if residual.is_finite() && self.best_residual.map_or(true, |b| residual < b) {
            self.best_solution = Some(solution.to_vec());
            self.best_residual = Some(residual);
        }
    }

    /// Write `solution` into the referenced properties.
    pub fn apply_solution(&self, mixture: &mut Mixture, solution: &[f64]) -> MixtureResult<()> {
        for (path, &value) in self.ref_props.iter().zip(solution.iter()) {
            mixture.set_property(path, value)?;
        }
        Ok(())
    }

    /// Apply the best solution, or the initial one when none was recorded.
    pub fn apply_best_solution(&self, mixture: &mut Mixture) -> MixtureResult<()> {
        let solution = self.best_solution.as_deref().unwrap_or(&self.initial_solution);
        self.apply_solution(mixture, solution)
    }

    /// Apply the last evaluated solution, or the initial one.
    pub fn apply_last_solution(&self, mixture: &mut Mixture) -> MixtureResult<()> {
        let solution = self.last_solution.as_deref().unwrap_or(&self.initial_solution);
        self.apply_solution(mixture, solution)
    }

    pub fn apply_initial_solution(&self, mixture: &mut Mixture) -> MixtureResult<()> {
        self.apply_solution(mixture, &self.initial_solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::{Phase, PhaseId, PhaseProperty};

    #[test]
    // Purpose
    // -------
    // Best/last bookkeeping and the apply helpers.
    //
    // Given
    // -----
    // - A context over one CSDS average with range [5, 50] and three recorded
    //   points with residuals 3, 1, 2.
    //
    // Expect
    // ------
    // - Best is the second point, last is the third; applying each writes
    //   its value into the phase; a terminal status is sticky.
    fn records_and_applies_solutions() {
        let mut m = Mixture::new("M");
        m.add_phase_to_pool(Phase::new("P", 0, 1).unwrap());
        let path = PropertyPath { phase: PhaseId(0), property: PhaseProperty::CsdsAverage };
        let mut ctx = RefineContext::new(&m, &[(path, RefinementInfo::new(5.0, 50.0, true))]).unwrap();
        assert_eq!(ctx.initial_solution, vec![10.0]);
        assert_eq!(ctx.clamp(&[80.0]), vec![50.0]);

        ctx.record(&[20.0], 3.0);
        ctx.record(&[30.0], 1.0);
        ctx.record(&[40.0], 2.0);
        assert_eq!(ctx.best_solution, Some(vec![30.0]));
        assert_eq!(ctx.last_residual, Some(2.0));
        assert_eq!(ctx.evaluations, 3);

        ctx.apply_best_solution(&mut m).unwrap();
        assert_eq!(m.get_property(&path).unwrap(), 30.0);
        ctx.apply_last_solution(&mut m).unwrap();
        assert_eq!(m.get_property(&path).unwrap(), 40.0);
        ctx.apply_initial_solution(&mut m).unwrap();
        assert_eq!(m.get_property(&path).unwrap(), 10.0);

        ctx.set_status(RefineStatus::Stopped);
        ctx.set_status(RefineStatus::Error);
        assert_eq!(ctx.status(), RefineStatus::Stopped);
        assert_eq!(ctx.status().to_string(), "stopped");
    }
}
