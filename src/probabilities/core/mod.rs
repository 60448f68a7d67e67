//! Shared machinery of every probability model: shape and index math,
//! matrix storage, validity masks and the independent-variable records.

pub mod matrices;
pub mod params;
pub mod shape;
pub mod validation;

pub use self::matrices::{inv, ProbabilityMatrices, SequenceWeights};
pub use self::params::{EffectiveParams, Parameter, ParameterSet, ParameterSpec};
pub use self::shape::{is_supported, ModelShape, G_BOUNDS, MAX_G, MAX_R};
pub use self::validation::{validate, ValidityMasks, VALIDITY_TOL};
