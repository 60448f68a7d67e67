//! Mixture: phase and specimen pools, the phase/specimen grid and the
//! write-back of calculated patterns.
//!
//! Purpose
//! -------
//! Own everything a fit touches: the phases (with their probability models
//! and components), the specimens (with their experimental data), the grid
//! assigning phases to specimen rows, and the fraction/scale/background
//! solution. Expose the refinable properties of the used phases as a flat
//! tree.
//!
//! Key behaviors
//! -------------
//! - Grid edits delegate to [`MixtureData`] after checking that referenced
//!   phase/specimen ids exist in the pools.
//! - [`Mixture::apply_current_solution`] recomputes every assigned
//!   specimen's pattern as `scale · Σ fraction · I_phase + bgshift` and
//!   pushes it into the specimen. While updates are frozen the write-back is
//!   deferred and flushed once on the last thaw.
//! - The refine lock is an `AtomicBool` claimed by compare-and-swap; the
//!   returned guard releases it on drop.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every `Some(PhaseId)` in the grid and every `Some(SpecimenId)` row
//!   resolves in the pools. Pools are append-only so ids stay valid.
//!
//! Downstream usage
//! ----------------
//! - [`crate::mixture::optimizer`] reads the per-phase patterns once per fit.
//! - [`crate::refinement`] reads the refinement tree and sets properties
//!   through [`PropertyPath`]s.
use ndarray::Array1;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    mixture::{
        data::MixtureData,
        errors::{MixtureError, MixtureResult},
        specimen::{Specimen, SpecimenId},
        statistics::ResidualKind,
    },
    phases::{Goniometer, Phase, PhaseId},
    refinement::{
        info::RefinementInfo,
        refinables::{PropertyPath, RefinementTree},
    },
};

/// Fit configuration of a mixture.
///
/// - `auto_bg`: background shifts are part of the solution vector. When
///   `false` they keep their current values during a fit.
/// - `residual_kind`: statistic summed over specimens (default `Rp`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MixtureOptions {
    pub auto_bg: bool,
    pub residual_kind: ResidualKind,
}

/// Per-phase patterns of one specimen row, on its experimental `2θ` grid.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPatterns {
    pub row: usize,
    pub specimen: SpecimenId,
    /// One entry per phase column; `None` for empty cells.
    pub phases: Vec<Option<Array1<f64>>>,
}

/// Releases the mixture's refine lock on drop.
#[derive(Debug)]
pub struct RefineGuard {
    lock: Arc<AtomicBool>,
}

impl Drop for RefineGuard {
    fn drop(&mut self) {
        self.lock.store(false, Ordering::Release);
    }
}

#[derive(Debug, Default)]
pub struct Mixture {
    pub name: String,
    data: MixtureData,
    phases: Vec<Phase>,
    specimens: Vec<Specimen>,
    pub goniometer: Goniometer,
    pub options: MixtureOptions,
    refine_lock: Arc<AtomicBool>,
    freeze_depth: usize,
    pending_apply: bool,
}

impl Mixture {
    pub fn new(name: impl Into<String>) -> Self {
        Mixture { name: name.into(), ..Default::default() }
    }

    /// Mixture with a prebuilt grid.
    ///
    /// # Errors
    /// - [`MixtureError::UnknownPhase`] / [`MixtureError::UnknownSpecimen`] when
    ///   the grid references ids outside `phases` / `specimens`.
    pub fn with_data(
        name: impl Into<String>, data: MixtureData, phases: Vec<Phase>, specimens: Vec<Specimen>,
    ) -> MixtureResult<Self> {
        let mixture =
            Mixture { name: name.into(), data, phases, specimens, ..Default::default() };
        for id in mixture.data.specimens().iter().flatten() {
            mixture.specimen(*id)?;
        }
        for id in mixture.data.phase_matrix().iter().flatten().flatten() {
            mixture.phase(*id)?;
        }
        Ok(mixture)
    }

    pub fn data(&self) -> &MixtureData {
        &self.data
    }

    // ---- Pools ----

    pub fn add_phase_to_pool(&mut self, phase: Phase) -> PhaseId {
        self.phases.push(phase);
        PhaseId(self.phases.len() - 1)
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn phase(&self, id: PhaseId) -> MixtureResult<&Phase> {
        self.phases.get(id.0).ok_or(MixtureError::UnknownPhase { index: id.0 })
    }

    pub fn phase_mut(&mut self, id: PhaseId) -> MixtureResult<&mut Phase> {
        self.phases.get_mut(id.0).ok_or(MixtureError::UnknownPhase { index: id.0 })
    }

    pub fn add_specimen_to_pool(&mut self, specimen: Specimen) -> SpecimenId {
        self.specimens.push(specimen);
        SpecimenId(self.specimens.len() - 1)
    }

    pub fn specimens(&self) -> &[Specimen] {
        &self.specimens
    }

    pub fn specimen(&self, id: SpecimenId) -> MixtureResult<&Specimen> {
        self.specimens.get(id.0).ok_or(MixtureError::UnknownSpecimen { index: id.0 })
    }

    pub fn specimen_mut(&mut self, id: SpecimenId) -> MixtureResult<&mut Specimen> {
        self.specimens.get_mut(id.0).ok_or(MixtureError::UnknownSpecimen { index: id.0 })
    }

    // ---- Grid edits ----

    /// Append a phase column; returns its index.
    pub fn add_phase(&mut self, name: impl Into<String>, fraction: f64) -> usize {
        self.data.add_phase(name, fraction)
    }

    pub fn del_phase(&mut self, col: usize) -> MixtureResult<()> {
        self.data.del_phase(col)
    }

    /// Append a specimen row; returns its index.
    pub fn add_specimen(
        &mut self, specimen: Option<SpecimenId>, scale: f64, bgshift: f64,
    ) -> MixtureResult<usize> {
        if let Some(id) = specimen {
            self.specimen(id)?;
        }
        Ok(self.data.add_specimen(specimen, scale, bgshift))
    }

    pub fn del_specimen(&mut self, row: usize) -> MixtureResult<()> {
        self.data.del_specimen(row)
    }

    /// Assign `phase` to the grid cell `(row, col)`.
    pub fn set_phase(&mut self, row: usize, col: usize, phase: Option<PhaseId>) -> MixtureResult<()> {
        if let Some(id) = phase {
            self.phase(id)?;
        }
        self.data.set_phase(row, col, phase)
    }

    pub fn set_specimen(&mut self, row: usize, specimen: Option<SpecimenId>) -> MixtureResult<()> {
        if let Some(id) = specimen {
            self.specimen(id)?;
        }
        self.data.set_specimen(row, specimen)
    }

    // ---- Solutions ----

    pub fn get_current_solution(&self) -> Vec<f64> {
        self.data.get_current_solution(self.options.auto_bg)
    }

    /// Store `solution` and push the resulting patterns to the specimens.
    pub fn set_solution(&mut self, solution: &[f64]) -> MixtureResult<()> {
        self.data.set_solution(solution, self.options.auto_bg)?;
        self.apply_current_solution()
    }

    /// Recompute and write back every assigned specimen's pattern, or defer
    /// it while updates are frozen.
    pub fn apply_current_solution(&mut self) -> MixtureResult<()> {
        if self.freeze_depth > 0 {
            self.pending_apply = true;
            return Ok(());
        }
        self.pending_apply = false;
        let rows = self.calculate_row_patterns()?;
        let fractions = self.data.fractions().to_vec();
        let scales = self.data.scales().to_vec();
        let bgshifts = self.data.bgshifts().to_vec();
        for RowPatterns { row, specimen, phases } in rows {
            let (scale, bgshift) = (scales[row], bgshifts[row]);
            let len = self.specimen(specimen)?.experimental().map_or(0, |e| e.two_theta.len());
            let mut total = Array1::from_elem(len, bgshift);
            let scaled: Vec<Option<Array1<f64>>> = phases
                .into_iter()
                .zip(fractions.iter())
                .map(|(pattern, &fraction)| {
                    pattern.map(|p| {
                        let contribution = p * (scale * fraction);
                        total += &contribution;
                        contribution
                    })
                })
                .collect();
            self.specimen_mut(specimen)?.update_pattern(total, scaled);
        }
        Ok(())
    }

    // ---- Freeze / thaw ----

    pub fn freeze_updates(&mut self) {
        self.freeze_depth += 1;
    }

    /// Undo one [`freeze_updates`](Self::freeze_updates); the last thaw
    /// flushes a deferred pattern write-back.
    pub fn thaw_updates(&mut self) -> MixtureResult<()> {
        self.freeze_depth = self.freeze_depth.saturating_sub(1);
        if self.freeze_depth == 0 && self.pending_apply {
            self.apply_current_solution()?;
        }
        Ok(())
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_depth > 0
    }

    // ---- Refine lock ----

    /// Claim the refine lock; `None` when a refinement already holds it.
    pub fn try_lock_refine(&self) -> Option<RefineGuard> {
        self.refine_lock
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefineGuard { lock: Arc::clone(&self.refine_lock) })
    }

    pub fn is_refining(&self) -> bool {
        self.refine_lock.load(Ordering::Acquire)
    }

    /// Force the lock flag, bypassing the guard.
    pub fn set_refine_lock(&self, locked: bool) {
        self.refine_lock.store(locked, Ordering::Release);
    }

    // ---- Intensities ----

    /// Diffracted intensity of `id` at `two_theta`, with inherited values
    /// read from its base phase.
    pub fn phase_intensity(&self, id: PhaseId, two_theta: &Array1<f64>) -> MixtureResult<Array1<f64>> {
        let phase = self.phase(id)?;
        let base = match phase.based_on {
            Some(b) => Some(self.phase(b)?),
            None => None,
        };
        Ok(phase.get_diffracted_intensity(two_theta, &self.goniometer, base)?)
    }

    /// Unscaled per-phase patterns of every row whose specimen has data.
    pub fn calculate_row_patterns(&self) -> MixtureResult<Vec<RowPatterns>> {
        let mut out = Vec::new();
        for (row, cells) in self.data.phase_matrix().iter().enumerate() {
            let Some(specimen) = self.data.specimens()[row] else { continue };
            let Some(exp) = self.specimen(specimen)?.experimental() else { continue };
            if exp.two_theta.is_empty() {
                continue;
            }
            let phases = cells
                .iter()
                .map(|cell| cell.map(|id| self.phase_intensity(id, &exp.two_theta)).transpose())
                .collect::<MixtureResult<Vec<_>>>()?;
            out.push(RowPatterns { row, specimen, phases });
        }
        Ok(out)
    }

    // ---- Refinement tree ----

    /// Distinct phases referenced by the grid, in id order.
    pub fn used_phases(&self) -> Vec<PhaseId> {
        let mut ids: Vec<PhaseId> =
            self.data.phase_matrix().iter().flatten().flatten().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Flat refinable-property tree of the used phases.
    pub fn update_refinement_treestore(&self) -> RefinementTree {
        let nodes: Vec<_> = self
            .used_phases()
            .into_iter()
            .filter_map(|id| self.phases.get(id.0).map(|p| p.refinables(id)))
            .collect();
        RefinementTree::from_nodes(&nodes)
    }

    // ---- Properties ----

    fn unknown_property(path: &PropertyPath) -> MixtureError {
        MixtureError::UnknownProperty { path: format!("{path:?}") }
    }

    pub fn get_property(&self, path: &PropertyPath) -> MixtureResult<f64> {
        self.phase(path.phase)?
            .get_property(&path.property)
            .map_err(|_| Self::unknown_property(path))
    }

    pub fn set_property(&mut self, path: &PropertyPath, value: f64) -> MixtureResult<()> {
        self.phase_mut(path.phase)?
            .set_property(&path.property, value)
            .map_err(|_| Self::unknown_property(path))
    }

    pub fn property_info(&self, path: &PropertyPath) -> MixtureResult<RefinementInfo> {
        self.phase(path.phase)?.info(&path.property).map_err(|_| Self::unknown_property(path))
    }

    pub fn property_info_mut(&mut self, path: &PropertyPath) -> MixtureResult<&mut RefinementInfo> {
        let phase = self.phases.get_mut(path.phase.0).ok_or(MixtureError::UnknownPhase {
            index: path.phase.0,
        })?;
        phase.info_mut(&path.property).map_err(|_| Self::unknown_property(path))
    }
}
