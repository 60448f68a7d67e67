//! Phase: a layered structure with its stacking model, components and CSDS.
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use std::f64::consts::PI;

use crate::{
    phases::{
        component::{Component, ComponentField},
        csds::CsdsDistribution,
        goniometer::Goniometer,
    },
    probabilities::{ProbError, ProbResult, ProbabilityModel},
    refinement::{
        info::RefinementInfo,
        refinables::{PropertyPath, RefinableNode},
    },
};

/// Index of a phase in its mixture's phase pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhaseId(pub usize);

/// Address of one refinable scalar inside a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseProperty {
    CsdsAverage,
    /// Independent variable of the probability model, by position.
    Probability(usize),
    Component { index: usize, field: ComponentField },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    pub name: String,
    probabilities: ProbabilityModel,
    components: Vec<Component>,
    pub csds: CsdsDistribution,
    /// Phase whose values inherited parameters are read from.
    pub based_on: Option<PhaseId>,
    /// Use the CSDS of `based_on` instead of our own.
    pub inherit_csds: bool,
}

impl Phase {
    /// New phase with `g` default components (basal spacings 10, 11, ... Å)
    /// and the default probability model for `(r, g)`.
    ///
    /// # Errors
    /// - [`ProbError::UnsupportedModel`] for an unsupported `(r, g)`.
    pub fn new(name: impl Into<String>, r: usize, g: usize) -> ProbResult<Self> {
        let probabilities = ProbabilityModel::new(r, g)?;
        let components = (0..g)
            .map(|i| Component::new(format!("Component {}", i + 1), 10.0 + i as f64, 1.0, 1.0))
            .collect();
        Ok(Phase {
            name: name.into(),
            probabilities,
            components,
            csds: CsdsDistribution::default(),
            based_on: None,
            inherit_csds: false,
        })
    }

    pub fn r(&self) -> usize {
        self.probabilities.r()
    }

    pub fn g(&self) -> usize {
        self.probabilities.g()
    }

    pub fn probabilities(&self) -> &ProbabilityModel {
        &self.probabilities
    }

    pub fn probabilities_mut(&mut self) -> &mut ProbabilityModel {
        &mut self.probabilities
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component_mut(&mut self, index: usize) -> ProbResult<&mut Component> {
        let g = self.g();
        self.components.get_mut(index).ok_or(ProbError::LayerIndexOutOfRange { index, g })
    }

    // ---- Refinable properties ----

    fn unknown_probability(&self, index: usize) -> ProbError {
        ProbError::UnknownParameter { name: format!("#{index}"), model: self.probabilities.name() }
    }

    /// Current value of `prop`.
    pub fn get_property(&self, prop: &PhaseProperty) -> ProbResult<f64> {
        match *prop {
            PhaseProperty::CsdsAverage => Ok(self.csds.average()),
            PhaseProperty::Probability(i) => self
                .probabilities
                .parameters()
                .get(i)
                .map(|p| p.value())
                .ok_or_else(|| self.unknown_probability(i)),
            PhaseProperty::Component { index, field } => self
                .components
                .get(index)
                .map(|c| c.get(field))
                .ok_or(ProbError::LayerIndexOutOfRange { index, g: self.g() }),
        }
    }

    /// Set `prop`; the owning setter clamps to the declared range and a
    /// probability change re-runs the model update.
    pub fn set_property(&mut self, prop: &PhaseProperty, value: f64) -> ProbResult<()> {
        match *prop {
            PhaseProperty::CsdsAverage => self.csds.set_average(value),
            PhaseProperty::Probability(i) => {
                let name = self
                    .probabilities
                    .parameters()
                    .get(i)
                    .map(|p| p.name())
                    .ok_or_else(|| self.unknown_probability(i))?;
                self.probabilities.set_param(name, value)?;
            }
            PhaseProperty::Component { index, field } => {
                self.component_mut(index)?.set(field, value);
            }
        }
        Ok(())
    }

    pub fn info(&self, prop: &PhaseProperty) -> ProbResult<RefinementInfo> {
        match *prop {
            PhaseProperty::CsdsAverage => Ok(self.csds.info),
            PhaseProperty::Probability(i) => self
                .probabilities
                .parameters()
                .get(i)
                .map(|p| p.info)
                .ok_or_else(|| self.unknown_probability(i)),
            PhaseProperty::Component { index, field } => self
                .components
                .get(index)
                .map(|c| *c.info(field))
                .ok_or(ProbError::LayerIndexOutOfRange { index, g: self.g() }),
        }
    }

    pub fn info_mut(&mut self, prop: &PhaseProperty) -> ProbResult<&mut RefinementInfo> {
        match *prop {
            PhaseProperty::CsdsAverage => Ok(&mut self.csds.info),
            PhaseProperty::Probability(i) => {
                let name = self
                    .probabilities
                    .parameters()
                    .get(i)
                    .map(|p| p.name())
                    .ok_or_else(|| self.unknown_probability(i))?;
                let (_, info) = self.probabilities.parameter_meta_mut(name)?;
                Ok(info)
            }
            PhaseProperty::Component { index, field } => {
                Ok(self.component_mut(index)?.info_mut(field))
            }
        }
    }

    /// A property read from the base phase is never refinable, whatever its
    /// `refine` flag says.
    pub fn is_refinable(&self, prop: &PhaseProperty) -> bool {
        let linked = self.based_on.is_some();
        match *prop {
            PhaseProperty::CsdsAverage => !(linked && self.inherit_csds),
            PhaseProperty::Probability(i) => match self.probabilities.parameters().get(i) {
                Some(p) => !(linked && p.inherit),
                None => false,
            },
            PhaseProperty::Component { index, .. } => index < self.components.len(),
        }
    }

    /// Refinable tree: the phase group holding the CSDS average, the
    /// probability parameters and one group per component.
    pub fn refinables(&self, id: PhaseId) -> RefinableNode {
        let value = |title: String, property: PhaseProperty| match self.info(&property) {
            Ok(info) => RefinableNode::Value {
                title,
                path: PropertyPath { phase: id, property },
                info,
                refinable: self.is_refinable(&property),
            },
            Err(_) => RefinableNode::Empty,
        };

        let probabilities = RefinableNode::Group {
            title: format!("Probabilities ({})", self.probabilities.name()),
            children: self
                .probabilities
                .parameters()
                .iter()
                .enumerate()
                .map(|(i, p)| value(p.name().to_string(), PhaseProperty::Probability(i)))
                .collect(),
        };
        let components = RefinableNode::Collection {
            title: "Components".to_string(),
            children: self
                .components
                .iter()
                .enumerate()
                .map(|(index, c)| RefinableNode::Group {
                    title: c.name.clone(),
                    children: ComponentField::ALL
                        .iter()
                        .map(|&field| {
                            value(field.title().to_string(), PhaseProperty::Component { index, field })
                        })
                        .collect(),
                })
                .collect(),
        };
        RefinableNode::Group {
            title: self.name.clone(),
            children: vec![
                value("CSDS average".to_string(), PhaseProperty::CsdsAverage),
                probabilities,
                components,
            ],
        }
    }

    // ---- Diffraction ----

    /// Calculated intensity at each `2θ` (degrees).
    ///
    /// Uses the effective stacking model (inherited parameters resolved
    /// against `base` when `based_on` is set) and sums the Markov-chain
    /// interference series
    /// `Σ_t w_t |F_t|² + 2 Re Σ_k c_k (w ∘ F̄)ᵀ (Φ P)^k F`
    /// weighted by the CSDS through `c_k = Σ_{N>k} q(N) (N - k) / N`, then
    /// applies the Lorentz-polarisation factor.
    ///
    /// # Errors
    /// - Propagates [`ProbError`] from resolving inherited parameters.
    pub fn get_diffracted_intensity(
        &self, two_theta: &Array1<f64>, goniometer: &Goniometer, base: Option<&Phase>,
    ) -> ProbResult<Array1<f64>> {
        let base = base.filter(|_| self.based_on.is_some());
        let model = match base {
            Some(b) => self.probabilities.resolved(Some(&b.probabilities))?,
            None => self.probabilities.clone(),
        };
        let csds = match base {
            Some(b) if self.inherit_csds => &b.csds,
            _ => &self.csds,
        };
        let coeffs = interference_coefficients(&csds.distribution());
        let shape = *model.shape();
        let rank = shape.rank();
        let w_mat = model.get_distribution_matrix();
        let weights: Vec<f64> = (0..rank).map(|t| w_mat[[t, t]]).collect();
        let tails: Vec<&Component> = (0..rank).map(|t| &self.components[shape.tail(t)]).collect();
        let p = model.get_probability_matrix();

        Ok(two_theta.mapv(|tt| {
            let s = goniometer.stl(tt);
            let lp = goniometer.lorentz_polarisation_factor(tt);
            lp * stack_intensity(s, &weights, &tails, p, &coeffs)
        }))
    }
}

/// `c_k` for `k = 1..len(q)-1` (index 0 is `k = 1`); `q[n-1]` is `q(N = n)`.
fn interference_coefficients(q: &[f64]) -> Vec<f64> {
    let n_max = q.len();
    (1..n_max)
        .map(|k| {
            (k + 1..=n_max).map(|n| q[n - 1] * (n - k) as f64 / n as f64).sum::<f64>()
        })
        .collect()
}

fn stack_intensity(
    s: f64, weights: &[f64], tails: &[&Component], p: &Array2<f64>, coeffs: &[f64],
) -> f64 {
    let rank = weights.len();
    let f: Vec<f64> = tails.iter().map(|c| c.structure_factor(s)).collect();
    let phase: Vec<Complex64> =
        tails.iter().map(|c| Complex64::from_polar(1.0, 2.0 * PI * s * c.d001())).collect();
    let wf: Vec<f64> = weights.iter().zip(f.iter()).map(|(w, f)| w * f).collect();

    let mut total: f64 = wf.iter().zip(f.iter()).map(|(a, b)| a * b).sum();
    let mut v: Vec<Complex64> = f.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    let mut next = vec![Complex64::new(0.0, 0.0); rank];
    let mut series = 0.0;
    for &c_k in coeffs {
        for t in 0..rank {
            let mut acc = Complex64::new(0.0, 0.0);
            for u in 0..rank {
                let pu = p[[t, u]];
                if pu != 0.0 {
                    acc += v[u] * pu;
                }
            }
            next[t] = phase[t] * acc;
        }
        std::mem::swap(&mut v, &mut next);
        let proj: f64 = wf.iter().zip(v.iter()).map(|(a, z)| a * z.re).sum();
        series += c_k * proj;
    }
    total += 2.0 * series;
    total.max(0.0)
}
