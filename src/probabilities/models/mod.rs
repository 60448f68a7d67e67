//! models — the concrete (R, G) probability models behind one generic type.
//!
//! Purpose
//! -------
//! Provide [`ProbabilityModel`], a single model type parameterized by a
//! [`ModelKind`] that selects the parameter table and the closed-form
//! derivation for its (R, G) pair. There is no per-G type synthesis: the
//! kind dispatches to small functions in `r0`..`r3`.
//!
//! Key behaviors
//! -------------
//! - [`get_correct_probability_model`] consults the bounds table before any
//!   model exists and fails with "cannot handle R{R} for {G}-layer
//!   structures" for unsupported pairs.
//! - Independent variables are live: every setter re-runs the full update
//!   (derive sequence weights → solve `W`/`P` → validate) and returns a
//!   [`ModelUpdate`] describing the new validity state. Batch setters run the
//!   update once.
//! - Legacy `Wn`-style construction arguments are translated into the
//!   modern `F`/`G`/`R` parameterization by [`ProbabilityModel::from_args`].
//! - [`ProbabilityModel::resolve`] returns the effective parameter values
//!   after applying per-parameter inheritance from a base model.
//!
//! Invariants & assumptions
//! ------------------------
//! - `W`, `P` and the validity masks always reflect the current parameter
//!   values; there is no stale state between two public calls.
//! - Numerical degeneracy never raises: it shows up as `w_valid = false` or
//!   `p_valid = false` with the offending cells marked in the masks.
//!
//! Conventions
//! -----------
//! - Parameter names are 1-based in the layer types they mention (`W1`,
//!   `P11_or_P22`); matrix and tuple indices are 0-based.
//!
//! Testing notes
//! -------------
//! - Unit tests here cover every supported kind: row-stochasticity, weight
//!   normalization, pivot round-trips, R0 memorylessness, legacy
//!   translation and inheritance.
mod r0;
mod r1;
mod r2;
mod r3;

use ndarray::{Array1, Array2};

use crate::probabilities::{
    core::{
        inv, validate, EffectiveParams, ModelShape, Parameter, ParameterSet, ParameterSpec,
        ProbabilityMatrices, SequenceWeights, ValidityMasks,
    },
    errors::{ProbError, ProbResult},
};
use crate::refinement::info::RefinementInfo;

/// Closed-form family selected by (R, G).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    R0,
    R1G2,
    R1G3,
    R1G4,
    R2G2,
    R2G3,
    R3G2,
}

/// Select the model kind for `(r, g)`.
///
/// # Errors
/// - [`ProbError::UnsupportedModel`] if the pair is not in the bounds table.
pub fn get_correct_probability_model(r: usize, g: usize) -> ProbResult<ModelKind> {
    let shape = ModelShape::new(r, g)?;
    ModelKind::for_shape(&shape)
}

impl ModelKind {
    fn for_shape(shape: &ModelShape) -> ProbResult<Self> {
        let kind = match (shape.r, shape.g) {
            (0, _) => ModelKind::R0,
            (1, 2) => ModelKind::R1G2,
            (1, 3) => ModelKind::R1G3,
            (1, 4) => ModelKind::R1G4,
            (2, 2) => ModelKind::R2G2,
            (2, 3) => ModelKind::R2G3,
            (3, 2) => ModelKind::R3G2,
            (r, g) => return Err(ProbError::UnsupportedModel { r, g }),
        };
        Ok(kind)
    }

    /// Parameter table for this kind at `g` layer types.
    pub fn parameter_specs(&self, g: usize) -> Vec<ParameterSpec> {
        match self {
            ModelKind::R0 => r0::specs(g),
            ModelKind::R1G2 => r1::specs_g2(),
            ModelKind::R1G3 => r1::specs_g3(),
            ModelKind::R1G4 => r1::specs_g4(),
            ModelKind::R2G2 => r2::specs_g2(),
            ModelKind::R2G3 => r2::specs_g3(),
            ModelKind::R3G2 => r3::specs_g2(),
        }
    }

    fn sequence_weights(&self, shape: &ModelShape, values: &[f64]) -> SequenceWeights {
        match self {
            ModelKind::R0 => r0::sequence_weights(shape, values),
            ModelKind::R1G2 => r1::weights_g2(shape, values),
            ModelKind::R1G3 => r1::weights_g3(shape, values),
            ModelKind::R1G4 => r1::weights_g4(shape, values),
            ModelKind::R2G2 => r2::weights_g2(shape, values),
            ModelKind::R2G3 => r2::weights_g3(shape, values),
            ModelKind::R3G2 => r3::weights_g2(shape, values),
        }
    }
}

/// Validity state reported after every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelUpdate {
    pub w_valid: bool,
    pub p_valid: bool,
}

/// Stacking-probability model for one (R, G) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityModel {
    shape: ModelShape,
    kind: ModelKind,
    params: ParameterSet,
    matrices: ProbabilityMatrices,
    validity: ValidityMasks,
}

impl ProbabilityModel {
    /// Construct a model with default parameter values.
    ///
    /// # Errors
    /// - [`ProbError::UnsupportedModel`] for pairs outside the bounds table.
    pub fn new(r: usize, g: usize) -> ProbResult<Self> {
        let shape = ModelShape::new(r, g)?;
        let kind = ModelKind::for_shape(&shape)?;
        let params = ParameterSet::from_specs(&kind.parameter_specs(g));
        let matrices = ProbabilityMatrices::zeros(&shape);
        let validity = validate(&matrices);
        let mut model = ProbabilityModel { shape, kind, params, matrices, validity };
        model.update();
        Ok(model)
    }

    /// Construct a model from named arguments, accepting legacy names.
    ///
    /// Legacy arguments:
    /// - R0: `W1..W(G-1)` (marginal fractions) → `F1..F(G-1)`.
    /// - R1G3: `W2` → `G1 = W2 / (1 - W1)`.
    /// - R1G4: `W2`, `W3` → `R2 = W2 / (1 - W1)`, `R3 = W3 / (1 - W1 - W2)`.
    ///
    /// Divisions by an empty remainder yield 0.
    ///
    /// # Errors
    /// - [`ProbError::UnsupportedModel`], [`ProbError::UnknownParameter`] or
    ///   [`ProbError::NonFiniteParameter`].
    pub fn from_args(r: usize, g: usize, args: &[(&str, f64)]) -> ProbResult<Self> {
        let mut model = ProbabilityModel::new(r, g)?;
        let translated = model.translate_legacy(args)?;
        let borrowed: Vec<(&str, f64)> = translated.iter().map(|(n, v)| (n.as_str(), *v)).collect();
        model.set_params(&borrowed)?;
        Ok(model)
    }

    // ---- Accessors ----

    pub fn r(&self) -> usize {
        self.shape.r
    }

    pub fn g(&self) -> usize {
        self.shape.g
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn shape(&self) -> &ModelShape {
        &self.shape
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// Display name, e.g. `R1G3`.
    pub fn name(&self) -> String {
        format!("R{}G{}", self.shape.r, self.shape.g)
    }

    pub fn parameters(&self) -> &[Parameter] {
        self.params.as_slice()
    }

    /// Mutable access to a parameter's inherit flag and refinement info.
    ///
    /// The value itself can only change through the setters so that the
    /// update always runs.
    pub fn parameter_meta_mut(
        &mut self, name: &str,
    ) -> ProbResult<(&mut bool, &mut RefinementInfo)> {
        let model = self.name();
        let p = self
            .params
            .by_name_mut(name)
            .ok_or_else(|| ProbError::UnknownParameter { name: name.to_string(), model })?;
        Ok((&mut p.inherit, &mut p.info))
    }

    /// `W`: context weights on the diagonal, `W_t · P[t, t']` elsewhere.
    pub fn get_distribution_matrix(&self) -> &Array2<f64> {
        &self.matrices.w
    }

    /// `P`: conditional transition probabilities between contexts.
    pub fn get_probability_matrix(&self) -> &Array2<f64> {
        &self.matrices.p
    }

    /// Marginal fraction of each layer type.
    pub fn get_distribution_array(&self) -> &Array1<f64> {
        &self.matrices.lw
    }

    pub fn validity(&self) -> &ValidityMasks {
        &self.validity
    }

    pub fn w_valid(&self) -> bool {
        self.validity.w_valid
    }

    pub fn p_valid(&self) -> bool {
        self.validity.p_valid
    }

    /// Weight lookup by layer-type tuple: a context (length `max(R,1)`) or a
    /// transition (length `max(R,1) + 1`).
    pub fn weight_of(&self, indices: &[usize]) -> ProbResult<f64> {
        let (i, j) = self.shape.w_coords(indices)?;
        Ok(self.matrices.w[[i, j]])
    }

    /// Conditional probability of the last layer type given the preceding
    /// ones (tuple length `max(R,1) + 1`).
    pub fn probability_of(&self, indices: &[usize]) -> ProbResult<f64> {
        let (i, j) = self.shape.p_coords(indices)?;
        Ok(self.matrices.p[[i, j]])
    }

    // ---- Parameters ----

    fn unknown(&self, name: &str) -> ProbError {
        ProbError::UnknownParameter { name: name.to_string(), model: self.name() }
    }

    pub fn get_param(&self, name: &str) -> ProbResult<f64> {
        self.params.by_name(name).map(Parameter::value).ok_or_else(|| self.unknown(name))
    }

    /// Set one independent variable (clamped to its range) and update.
    pub fn set_param(&mut self, name: &str, value: f64) -> ProbResult<ModelUpdate> {
        self.set_params(&[(name, value)])
    }

    /// Set several independent variables and update exactly once.
    ///
    /// All names are checked before anything is written.
    pub fn set_params(&mut self, values: &[(&str, f64)]) -> ProbResult<ModelUpdate> {
        for &(name, value) in values {
            if self.params.index_of(name).is_none() {
                return Err(self.unknown(name));
            }
            if !value.is_finite() {
                return Err(ProbError::NonFiniteParameter { name: name.to_string(), value });
            }
        }
        for &(name, value) in values {
            if let Some(p) = self.params.by_name_mut(name) {
                p.set_value(value)?;
            }
        }
        Ok(self.update())
    }

    pub fn set_inherit(&mut self, name: &str, inherit: bool) -> ProbResult<()> {
        let (flag, _) = self.parameter_meta_mut(name)?;
        *flag = inherit;
        Ok(())
    }

    /// Recompute `W`, `P`, `lW` and the validity masks from the current
    /// parameter values.
    pub fn update(&mut self) -> ModelUpdate {
        let values = self.params.values();
        let seq = self.kind.sequence_weights(&self.shape, &values);
        self.solve(&seq);
        self.validity = validate(&self.matrices);
        ModelUpdate { w_valid: self.validity.w_valid, p_valid: self.validity.p_valid }
    }

    fn solve(&mut self, seq: &SequenceWeights) {
        self.matrices.solve(&self.shape, seq);
    }

    // ---- Inheritance ----

    /// Effective parameter values: inherited parameters take the value of the
    /// same-named parameter on `base` when `base` has the same (R, G).
    pub fn resolve(&self, base: Option<&ProbabilityModel>) -> EffectiveParams {
        let base = base.filter(|b| b.shape == self.shape);
        let values = self
            .params
            .iter()
            .map(|p| {
                let inherited = match base {
                    Some(b) if p.inherit => b.get_param(p.name()).ok(),
                    _ => None,
                };
                (p.name(), inherited.unwrap_or_else(|| p.value()))
            })
            .collect();
        EffectiveParams { values }
    }

    /// A copy of this model with the effective (inherited) values applied.
    pub fn resolved(&self, base: Option<&ProbabilityModel>) -> ProbResult<ProbabilityModel> {
        let effective = self.resolve(base);
        let mut out = self.clone();
        out.set_params(&effective.values)?;
        Ok(out)
    }

    // ---- Legacy arguments ----

    fn translate_legacy(&self, args: &[(&str, f64)]) -> ProbResult<Vec<(String, f64)>> {
        let lookup = |name: &str| args.iter().rev().find(|(n, _)| *n == name).map(|&(_, v)| v);
        let default_of = |name: &str| self.get_param(name).unwrap_or(0.0);
        let mut out: Vec<(String, f64)> = Vec::with_capacity(args.len());
        let g = self.shape.g;

        match self.kind {
            ModelKind::R0 => {
                let legacy: Vec<usize> = (1..g)
                    .filter(|&i| lookup(r0::LEGACY_W_NAMES[i - 1]).is_some())
                    .collect();
                if !legacy.is_empty() {
                    let mut w: Vec<f64> = self.matrices.lw.iter().copied().take(g - 1).collect();
                    for &i in &legacy {
                        w[i - 1] = lookup(r0::LEGACY_W_NAMES[i - 1]).unwrap_or(w[i - 1]);
                    }
                    if w.iter().any(|x| !x.is_finite()) {
                        return Err(ProbError::LegacyTranslation {
                            name: "W".to_string(),
                            reason: "legacy fractions must be finite",
                        });
                    }
                    for (i, f) in r0::fractions_from_marginals(&w).into_iter().enumerate() {
                        out.push((r0::F_NAMES[i].to_string(), f));
                    }
                }
                let legacy_names = &r0::LEGACY_W_NAMES[..g - 1];
                out.extend(
                    args.iter()
                        .filter(|(n, _)| !legacy_names.contains(n))
                        .map(|&(n, v)| (n.to_string(), v)),
                );
            }
            ModelKind::R1G3 => {
                let w1 = lookup("W1").unwrap_or_else(|| default_of("W1"));
                if let Some(w2) = lookup("W2") {
                    out.push(("G1".to_string(), w2 * inv(1.0 - w1)));
                }
                out.extend(
                    args.iter().filter(|(n, _)| *n != "W2").map(|&(n, v)| (n.to_string(), v)),
                );
            }
            ModelKind::R1G4 => {
                let w1 = lookup("W1").unwrap_or_else(|| default_of("W1"));
                let w2 = lookup("W2").unwrap_or_else(|| (1.0 - w1) * default_of("R2"));
                if lookup("W2").is_some() {
                    out.push(("R2".to_string(), w2 * inv(1.0 - w1)));
                }
                if let Some(w3) = lookup("W3") {
                    out.push(("R3".to_string(), w3 * inv(1.0 - w1 - w2)));
                }
                out.extend(
                    args.iter()
                        .filter(|(n, _)| *n != "W2" && *n != "W3")
                        .map(|&(n, v)| (n.to_string(), v)),
                );
            }
            _ => out.extend(args.iter().map(|&(n, v)| (n.to_string(), v))),
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probabilities::core::{is_supported, VALIDITY_TOL};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn all_supported() -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for r in 0..=3 {
            for g in 1..=6 {
                if is_supported(r, g) {
                    out.push((r, g));
                }
            }
        }
        out
    }

    fn assert_rows_or_flagged(model: &ProbabilityModel) {
        let p = model.get_probability_matrix();
        for (i, row) in p.rows().into_iter().enumerate() {
            let ok = (row.sum() - 1.0).abs() <= VALIDITY_TOL;
            let flagged = model.validity().p_mask.row(i).iter().all(|&m| m < 1);
            assert!(ok || flagged, "{} row {i}", model.name());
        }
        let diag: f64 = model.get_distribution_matrix().diag().sum();
        assert!((diag - 1.0).abs() <= VALIDITY_TOL || !model.w_valid(), "{}", model.name());
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // - Model selection for the whole (R, G) grid.
    // - Stochasticity / normalization at defaults and at a sweep of settings.
    // - Pivot round-trips, R0 memorylessness, legacy arguments, inheritance.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Model selection succeeds iff the pair is supported.
    //
    // Given
    // -----
    // - All 0 ≤ R ≤ 3, 1 ≤ G ≤ 6.
    //
    // Expect
    // ------
    // - `get_correct_probability_model` and `ProbabilityModel::new` agree with
    //   the bounds table.
    fn selection_agrees_with_bounds_table() {
        for r in 0..=3 {
            for g in 1..=6 {
                let kind = get_correct_probability_model(r, g);
                assert_eq!(kind.is_ok(), is_supported(r, g));
                assert_eq!(ProbabilityModel::new(r, g).is_ok(), is_supported(r, g));
            }
        }
        let err = ProbabilityModel::new(1, 5).unwrap_err();
        assert_eq!(err.to_string(), "cannot handle R1 for 5-layer structures");
    }

    #[test]
    // Purpose
    // -------
    // Defaults of every supported model are physically valid.
    //
    // Given
    // -----
    // - Each supported (R, G) at default parameters.
    //
    // Expect
    // ------
    // - `w_valid` and `p_valid` true; marginals sum to 1.
    fn defaults_are_valid_for_every_model() {
        for (r, g) in all_supported() {
            let m = ProbabilityModel::new(r, g).unwrap();
            assert!(m.w_valid(), "W invalid for R{r}G{g}: {:?}", m.validity().invalid_w_cells());
            assert!(m.p_valid(), "P invalid for R{r}G{g}: {:?}", m.validity().invalid_p_cells());
            assert_abs_diff_eq!(m.get_distribution_array().sum(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // For any parameter setting each P row sums to 1 or is flagged, and the
    // diagonal of W sums to 1 or W is flagged.
    //
    // Given
    // -----
    // - Every supported model with all parameters set to each value of a
    //   small grid (values are clamped into each parameter's own range).
    //
    // Expect
    // ------
    // - The stochasticity / normalization property holds everywhere.
    fn rows_are_stochastic_or_flagged_across_settings() {
        for (r, g) in all_supported() {
            let mut m = ProbabilityModel::new(r, g).unwrap();
            let names: Vec<&'static str> = m.parameters().iter().map(|p| p.name()).collect();
            for &x in &[0.0, 0.1, 0.35, 0.5, 0.7, 0.95, 1.0] {
                let vals: Vec<(&str, f64)> = names.iter().map(|&n| (n, x)).collect();
                m.set_params(&vals).unwrap();
                assert_rows_or_flagged(&m);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // The R1G2 pivot reads back the value written in both regimes and equals
    // the matching matrix cell.
    //
    // Given
    // -----
    // - W1 = 0.3 then P11_or_P22 = 0.42; W1 = 0.7 then P11_or_P22 = 0.63.
    //
    // Expect
    // ------
    // - Getter returns the written value; P[0,0] = 0.42, then P[1,1] = 0.63.
    fn r1g2_pivot_round_trips_in_both_regimes() {
        let mut m = ProbabilityModel::new(1, 2).unwrap();
        m.set_param("W1", 0.3).unwrap();
        m.set_param("P11_or_P22", 0.42).unwrap();
        assert_eq!(m.get_param("P11_or_P22").unwrap(), 0.42);
        assert_relative_eq!(m.probability_of(&[0, 0]).unwrap(), 0.42, epsilon = 1e-12);

        m.set_param("W1", 0.7).unwrap();
        let upd = m.set_param("P11_or_P22", 0.63).unwrap();
        assert_eq!(m.get_param("P11_or_P22").unwrap(), 0.63);
        assert_relative_eq!(m.probability_of(&[1, 1]).unwrap(), 0.63, epsilon = 1e-12);
        assert!(upd.w_valid && upd.p_valid);

        // reciprocal cell from the weight ratio
        let p21 = m.probability_of(&[1, 0]).unwrap();
        let p12 = m.probability_of(&[0, 1]).unwrap();
        assert_relative_eq!(0.7 * p12, 0.3 * p21, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // R0 models are memoryless: every row of P is the marginal vector.
    //
    // Given
    // -----
    // - R0G4 with F = (0.4, 0.5, 0.25).
    //
    // Expect
    // ------
    // - P[i, j] identical across i, equal to W_j = (0.4, 0.3, 0.075, 0.225).
    fn r0_rows_are_identical() {
        let mut m = ProbabilityModel::new(0, 4).unwrap();
        m.set_params(&[("F1", 0.4), ("F2", 0.5), ("F3", 0.25)]).unwrap();
        let expected = [0.4, 0.3, 0.075, 0.225];
        let p = m.get_probability_matrix();
        for i in 0..4 {
            for j in 0..4 {
                assert_abs_diff_eq!(p[[i, j]], expected[j], epsilon = 1e-12);
            }
        }
        assert_abs_diff_eq!(m.weight_of(&[2]).unwrap(), 0.075, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // An absent layer type does not break memorylessness.
    //
    // Given
    // -----
    // - R0G3 with F1 = 0, F2 = 0.5, so W = (0, 0.5, 0.5).
    //
    // Expect
    // ------
    // - Row 0 (zero weight) matches the other rows; P and W stay valid.
    fn r0_zero_fraction_keeps_rows_identical() {
        let mut m = ProbabilityModel::new(0, 3).unwrap();
        m.set_params(&[("F1", 0.0), ("F2", 0.5)]).unwrap();
        let p = m.get_probability_matrix();
        for i in 0..3 {
            assert_abs_diff_eq!(p[[i, 0]], 0.0, epsilon = 1e-15);
            assert_abs_diff_eq!(p[[i, 1]], 0.5, epsilon = 1e-12);
            assert_abs_diff_eq!(p[[i, 2]], 0.5, epsilon = 1e-12);
        }
        assert!(m.w_valid() && m.p_valid());
    }

    #[test]
    fn r0g1_is_trivial() {
        let m = ProbabilityModel::new(0, 1).unwrap();
        assert!(m.parameters().is_empty());
        assert_eq!(m.get_distribution_matrix()[[0, 0]], 1.0);
        assert_eq!(m.get_probability_matrix()[[0, 0]], 1.0);
        assert!(m.w_valid() && m.p_valid());
    }

    #[test]
    // Purpose
    // -------
    // Restricted models fix the forced transitions.
    //
    // Given
    // -----
    // - R2G2, R2G3 and R3G2 at defaults.
    //
    // Expect
    // ------
    // - P121 = 1 (R2), P131 = 1 (R2G3), P1121 = P1211 = 1 (R3G2), and empty
    //   contexts point to the first type.
    fn restricted_models_fix_forced_transitions() {
        let r2g2 = ProbabilityModel::new(2, 2).unwrap();
        assert_eq!(r2g2.probability_of(&[0, 1, 0]).unwrap(), 1.0);
        assert_eq!(r2g2.probability_of(&[1, 1, 0]).unwrap(), 1.0);
        let r2g3 = ProbabilityModel::new(2, 3).unwrap();
        assert_eq!(r2g3.probability_of(&[0, 2, 0]).unwrap(), 1.0);
        assert_eq!(r2g3.probability_of(&[2, 1, 0]).unwrap(), 1.0);
        let r3g2 = ProbabilityModel::new(3, 2).unwrap();
        assert_eq!(r3g2.probability_of(&[0, 0, 1, 0]).unwrap(), 1.0);
        assert_eq!(r3g2.probability_of(&[0, 1, 0, 0]).unwrap(), 1.0);
        assert_eq!(r3g2.probability_of(&[1, 0, 1, 0]).unwrap(), 1.0);
        assert_abs_diff_eq!(r3g2.weight_of(&[0, 0, 0]).unwrap(), 3.0 * 0.85 - 2.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Legacy constructor arguments are translated into the modern variables.
    //
    // Given
    // -----
    // - R0G3 with W1 = 0.5, W2 = 0.3; R1G3 with W1 = 0.4, W2 = 0.45;
    //   R1G4 with W1 = 0.4, W2 = 0.3, W3 = 0.2.
    //
    // Expect
    // ------
    // - Marginals reproduce the legacy fractions.
    fn legacy_arguments_reproduce_marginals() {
        let r0 = ProbabilityModel::from_args(0, 3, &[("W1", 0.5), ("W2", 0.3)]).unwrap();
        assert_abs_diff_eq!(r0.get_param("F2").unwrap(), 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(r0.get_distribution_array()[2], 0.2, epsilon = 1e-12);

        let r1g3 = ProbabilityModel::from_args(1, 3, &[("W1", 0.4), ("W2", 0.45)]).unwrap();
        assert_abs_diff_eq!(r1g3.get_param("G1").unwrap(), 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(r1g3.get_distribution_array()[1], 0.45, epsilon = 1e-12);

        let r1g4 =
            ProbabilityModel::from_args(1, 4, &[("W1", 0.4), ("W2", 0.3), ("W3", 0.2)]).unwrap();
        let lw = r1g4.get_distribution_array();
        assert_abs_diff_eq!(lw[1], 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(lw[2], 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(lw[3], 0.1, epsilon = 1e-12);

        assert!(matches!(
            ProbabilityModel::from_args(1, 2, &[("G7", 0.1)]),
            Err(ProbError::UnknownParameter { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Inherited parameters resolve to the base model's values; others keep
    // their own.
    //
    // Given
    // -----
    // - Two R1G2 models; the child inherits W1 only.
    //
    // Expect
    // ------
    // - Effective W1 from the base, pivot from the child; a base with a
    //   different shape is ignored.
    fn resolve_applies_inheritance_flags() {
        let mut base = ProbabilityModel::new(1, 2).unwrap();
        base.set_params(&[("W1", 0.6), ("P11_or_P22", 0.9)]).unwrap();
        let mut child = ProbabilityModel::new(1, 2).unwrap();
        child.set_params(&[("W1", 0.2), ("P11_or_P22", 0.3)]).unwrap();
        child.set_inherit("W1", true).unwrap();

        let eff = child.resolve(Some(&base));
        assert_eq!(eff.get("W1"), Some(0.6));
        assert_eq!(eff.get("P11_or_P22"), Some(0.3));

        let resolved = child.resolved(Some(&base)).unwrap();
        assert_abs_diff_eq!(resolved.get_distribution_array()[0], 0.6, epsilon = 1e-12);

        let other = ProbabilityModel::new(0, 2).unwrap();
        assert_eq!(child.resolve(Some(&other)).get("W1"), Some(0.2));
        assert_eq!(child.resolve(None).get("W1"), Some(0.2));
    }
}
