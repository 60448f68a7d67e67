//! Independent variables of a probability model.
//!
//! Each model is described by a static table of [`ParameterSpec`]s. The live
//! values are held in a [`ParameterSet`] that clamps every assignment into
//! the declared range, carries the per-parameter "inherit" flag and the
//! persisted [`RefinementInfo`].
use crate::{
    probabilities::errors::{ProbError, ProbResult},
    refinement::info::RefinementInfo,
};

/// Static description of one independent variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub minimum: f64,
    pub maximum: f64,
    pub default: f64,
}

impl ParameterSpec {
    pub const fn new(name: &'static str, minimum: f64, maximum: f64, default: f64) -> Self {
        ParameterSpec { name, minimum, maximum, default }
    }

    /// Unit-interval parameter.
    pub const fn unit(name: &'static str, default: f64) -> Self {
        ParameterSpec::new(name, 0.0, 1.0, default)
    }
}

/// Live value of an independent variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    spec: ParameterSpec,
    value: f64,
    pub inherit: bool,
    pub info: RefinementInfo,
}

impl Parameter {
    pub fn new(spec: ParameterSpec) -> Self {
        Parameter {
            spec,
            value: spec.default,
            inherit: false,
            info: RefinementInfo::new(spec.minimum, spec.maximum, false),
        }
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn spec(&self) -> &ParameterSpec {
        &self.spec
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Assign a value, clamped into `[minimum, maximum]`.
    ///
    /// # Errors
    /// - [`ProbError::NonFiniteParameter`] for NaN or infinite input.
    pub fn set_value(&mut self, value: f64) -> ProbResult<()> {
        if !value.is_finite() {
            return Err(ProbError::NonFiniteParameter { name: self.spec.name.to_string(), value });
        }
        self.value = value.max(self.spec.minimum).min(self.spec.maximum);
        Ok(())
    }
}

/// Ordered collection of a model's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    params: Vec<Parameter>,
}

impl ParameterSet {
    pub fn from_specs(specs: &[ParameterSpec]) -> Self {
        ParameterSet { params: specs.iter().copied().map(Parameter::new).collect() }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    pub fn as_slice(&self) -> &[Parameter] {
        &self.params
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name() == name)
    }

    pub fn get(&self, index: usize) -> Option<&Parameter> {
        self.params.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Parameter> {
        self.params.get_mut(index)
    }

    pub fn by_name(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name() == name)
    }

    pub fn by_name_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.params.iter_mut().find(|p| p.name() == name)
    }

    /// Current values in declaration order.
    pub fn values(&self) -> Vec<f64> {
        self.params.iter().map(Parameter::value).collect()
    }
}

/// Fully resolved parameter values (inheritance already applied).
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveParams {
    pub values: Vec<(&'static str, f64)>,
}

impl EffectiveParams {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.iter().find(|(n, _)| *n == name).map(|&(_, v)| v)
    }
}
