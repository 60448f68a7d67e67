//! Phase/specimen grid of a mixture and its parallel per-row and
//! per-column lists.
//!
//! Rows are specimens (`specimens`, `scales`, `bgshifts`), columns are
//! phase slots (`phases`, `fractions`). Every edit inserts or removes the
//! matrix row/column and the matching list entries in the same call.
use crate::{
    mixture::{
        errors::{MixtureError, MixtureResult},
        specimen::SpecimenId,
    },
    phases::PhaseId,
};

/// Solution vector split into its parts; `bgshifts` is `None` when
/// background shifts are not part of the solution.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSolution {
    pub fractions: Vec<f64>,
    pub scales: Vec<f64>,
    pub bgshifts: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MixtureData {
    phase_matrix: Vec<Vec<Option<PhaseId>>>,
    specimens: Vec<Option<SpecimenId>>,
    phases: Vec<String>,
    fractions: Vec<f64>,
    scales: Vec<f64>,
    bgshifts: Vec<f64>,
}

impl MixtureData {
    /// Build a grid from explicit parts.
    ///
    /// # Errors
    /// - [`MixtureError::ShapeMismatch`] unless every matrix row has
    ///   `phases.len()` cells, `fractions.len() == phases.len()` and
    ///   `specimens`, `scales`, `bgshifts` all have one entry per row.
    pub fn new(
        phase_matrix: Vec<Vec<Option<PhaseId>>>, specimens: Vec<Option<SpecimenId>>,
        phases: Vec<String>, fractions: Vec<f64>, scales: Vec<f64>, bgshifts: Vec<f64>,
    ) -> MixtureResult<Self> {
        let rows = phase_matrix.len();
        let cols = phases.len();
        let check = |what: &'static str, expected: usize, found: usize| {
            if expected == found {
                Ok(())
            } else {
                Err(MixtureError::ShapeMismatch { what, expected, found })
            }
        };
        for row in &phase_matrix {
            check("phase matrix row", cols, row.len())?;
        }
        check("fractions", cols, fractions.len())?;
        check("specimens", rows, specimens.len())?;
        check("scales", rows, scales.len())?;
        check("bgshifts", rows, bgshifts.len())?;
        Ok(MixtureData { phase_matrix, specimens, phases, fractions, scales, bgshifts })
    }

    /// `(rows, cols)` = `(specimens, phase slots)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.specimens.len(), self.phases.len())
    }

    pub fn phase_matrix(&self) -> &[Vec<Option<PhaseId>>] {
        &self.phase_matrix
    }

    pub fn specimens(&self) -> &[Option<SpecimenId>] {
        &self.specimens
    }

    pub fn phases(&self) -> &[String] {
        &self.phases
    }

    pub fn fractions(&self) -> &[f64] {
        &self.fractions
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    pub fn bgshifts(&self) -> &[f64] {
        &self.bgshifts
    }

    fn check_row(&self, row: usize) -> MixtureResult<()> {
        let rows = self.specimens.len();
        if row < rows { Ok(()) } else { Err(MixtureError::RowOutOfRange { index: row, rows }) }
    }

    fn check_col(&self, col: usize) -> MixtureResult<()> {
        let cols = self.phases.len();
        if col < cols { Ok(()) } else { Err(MixtureError::ColumnOutOfRange { index: col, cols }) }
    }

    // ---- Grid edits ----

    /// Append a phase column; returns its index.
    pub fn add_phase(&mut self, name: impl Into<String>, fraction: f64) -> usize {
        for row in &mut self.phase_matrix {
            row.push(None);
        }
        self.phases.push(name.into());
        self.fractions.push(fraction);
        self.phases.len() - 1
    }

    pub fn del_phase(&mut self, col: usize) -> MixtureResult<()> {
        self.check_col(col)?;
        for row in &mut self.phase_matrix {
            row.remove(col);
        }
        self.phases.remove(col);
        self.fractions.remove(col);
        Ok(())
    }

    /// Append a specimen row; returns its index.
    pub fn add_specimen(&mut self, specimen: Option<SpecimenId>, scale: f64, bgshift: f64) -> usize {
        self.phase_matrix.push(vec![None; self.phases.len()]);
        self.specimens.push(specimen);
        self.scales.push(scale);
        self.bgshifts.push(bgshift);
        self.specimens.len() - 1
    }

    pub fn del_specimen(&mut self, row: usize) -> MixtureResult<()> {
        self.check_row(row)?;
        self.phase_matrix.remove(row);
        self.specimens.remove(row);
        self.scales.remove(row);
        self.bgshifts.remove(row);
        Ok(())
    }

    pub fn set_phase(&mut self, row: usize, col: usize, phase: Option<PhaseId>) -> MixtureResult<()> {
        self.check_row(row)?;
        self.check_col(col)?;
        self.phase_matrix[row][col] = phase;
        Ok(())
    }

    pub fn get_phase(&self, row: usize, col: usize) -> MixtureResult<Option<PhaseId>> {
        self.check_row(row)?;
        self.check_col(col)?;
        Ok(self.phase_matrix[row][col])
    }

    pub fn set_specimen(&mut self, row: usize, specimen: Option<SpecimenId>) -> MixtureResult<()> {
        self.check_row(row)?;
        self.specimens[row] = specimen;
        Ok(())
    }

    // ---- Solutions ----

    /// Length of the flat solution vector.
    pub fn solution_len(&self, auto_bg: bool) -> usize {
        let (rows, cols) = self.shape();
        cols + rows + if auto_bg { rows } else { 0 }
    }

    /// `fractions ++ scales [++ bgshifts]`.
    pub fn get_current_solution(&self, auto_bg: bool) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.solution_len(auto_bg));
        out.extend_from_slice(&self.fractions);
        out.extend_from_slice(&self.scales);
        if auto_bg {
            out.extend_from_slice(&self.bgshifts);
        }
        out
    }

    /// Split a flat solution vector into its parts.
    ///
    /// # Errors
    /// - [`MixtureError::SolutionLengthMismatch`] for a wrong length.
    /// - [`MixtureError::NonFiniteSolution`] for NaN or infinite entries.
    pub fn parse_solution(&self, solution: &[f64], auto_bg: bool) -> MixtureResult<ParsedSolution> {
        parse_solution(solution, self.shape(), auto_bg)
    }

    /// Overwrite fractions, scales and (when present) background shifts.
    pub fn set_solution(&mut self, solution: &[f64], auto_bg: bool) -> MixtureResult<()> {
        let parsed = self.parse_solution(solution, auto_bg)?;
        self.fractions = parsed.fractions;
        self.scales = parsed.scales;
        if let Some(bg) = parsed.bgshifts {
            self.bgshifts = bg;
        }
        Ok(())
    }
}

/// Split `solution` for a grid of `(rows, cols)`.
pub fn parse_solution(
    solution: &[f64], (rows, cols): (usize, usize), auto_bg: bool,
) -> MixtureResult<ParsedSolution> {
    let expected = cols + rows + if auto_bg { rows } else { 0 };
    if solution.len() != expected {
        return Err(MixtureError::SolutionLengthMismatch { expected, found: solution.len() });
    }
    if let Some((index, &value)) = solution.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(MixtureError::NonFiniteSolution { index, value });
    }
    Ok(ParsedSolution {
        fractions: solution[..cols].to_vec(),
        scales: solution[cols..cols + rows].to_vec(),
        bgshifts: if auto_bg { Some(solution[cols + rows..].to_vec()) } else { None },
    })
}
