//! Layer component: one of the `G` layer types of a phase.
use crate::refinement::info::RefinementInfo;

/// Declared range of the basal spacing (Å).
pub const D001_RANGE: (f64, f64) = (5.0, 30.0);
/// Declared range of the scattering amplitude.
pub const AMPLITUDE_RANGE: (f64, f64) = (0.0, 100.0);
/// Declared range of the Debye–Waller B factor (Å²).
pub const B_FACTOR_RANGE: (f64, f64) = (0.0, 10.0);

/// Refinable scalar fields of a [`Component`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentField {
    D001,
    Amplitude,
    BFactor,
}

impl ComponentField {
    pub const ALL: [ComponentField; 3] =
        [ComponentField::D001, ComponentField::Amplitude, ComponentField::BFactor];

    pub fn title(&self) -> &'static str {
        match self {
            ComponentField::D001 => "d001",
            ComponentField::Amplitude => "Amplitude",
            ComponentField::BFactor => "B factor",
        }
    }

    pub fn range(&self) -> (f64, f64) {
        match self {
            ComponentField::D001 => D001_RANGE,
            ComponentField::Amplitude => AMPLITUDE_RANGE,
            ComponentField::BFactor => B_FACTOR_RANGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub name: String,
    d001: f64,
    amplitude: f64,
    b_factor: f64,
    infos: [RefinementInfo; 3],
}

impl Component {
    pub fn new(name: impl Into<String>, d001: f64, amplitude: f64, b_factor: f64) -> Self {
        let infos = ComponentField::ALL.map(|f| {
            let (lo, hi) = f.range();
            RefinementInfo::new(lo, hi, false)
        });
        let mut out =
            Component { name: name.into(), d001: D001_RANGE.0, amplitude: 0.0, b_factor: 0.0, infos };
        out.set(ComponentField::D001, d001);
        out.set(ComponentField::Amplitude, amplitude);
        out.set(ComponentField::BFactor, b_factor);
        out
    }

    pub fn d001(&self) -> f64 {
        self.d001
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn b_factor(&self) -> f64 {
        self.b_factor
    }

    pub fn get(&self, field: ComponentField) -> f64 {
        match field {
            ComponentField::D001 => self.d001,
            ComponentField::Amplitude => self.amplitude,
            ComponentField::BFactor => self.b_factor,
        }
    }

    /// Set a field, clamped to its declared range. Non-finite values are
    /// ignored.
    pub fn set(&mut self, field: ComponentField, value: f64) {
        if !value.is_finite() {
            return;
        }
        let (lo, hi) = field.range();
        let value = value.max(lo).min(hi);
        match field {
            ComponentField::D001 => self.d001 = value,
            ComponentField::Amplitude => self.amplitude = value,
            ComponentField::BFactor => self.b_factor = value,
        }
    }

    pub fn info(&self, field: ComponentField) -> &RefinementInfo {
        &self.infos[field as usize]
    }

    pub fn info_mut(&mut self, field: ComponentField) -> &mut RefinementInfo {
        &mut self.infos[field as usize]
    }

    /// Layer structure factor at scattering vector `s`:
    /// `amplitude · exp(-B s² / 4)`.
    pub fn structure_factor(&self, s: f64) -> f64 {
        self.amplitude * (-self.b_factor * s * s / 4.0).exp()
    }
}
