//! rust_xrd — stacking-probability models and mixture refinement for X-ray
//! diffraction of disordered layered structures, with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the probability models and residual statistics to Python via the `_rust_xrd`
//! extension module.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules as the public crate surface:
//!   - `probabilities`: Markov-chain weight/probability matrices for R0–R3
//!     and G = 1–6 layer types.
//!   - `phases`: components, CSDS, goniometer and diffracted intensities.
//!   - `mixture`: phase/specimen grids and the fraction/scale fit.
//!   - `refinement`: structural refinement with cooperative cancellation.
//!   - `optimization`: the bounded minimizer shared by both fits.
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   `_rust_xrd` Python extension when `python-bindings` is enabled.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, input validation and error mapping.
//!
//! Conventions
//! -----------
//! - Python-exposed classes live under `_rust_xrd.<submodule>`.
//! - Errors from core Rust code are converted to `ValueError` at the PyO3
//!   boundary.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by the
//!   end-to-end tests under `tests/`.

pub mod mixture;
pub mod optimization;
pub mod phases;
pub mod probabilities;
pub mod refinement;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{PyArray1, PyArray2, ToPyArray};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    mixture::{MixtureError, ResidualKind},
    probabilities::ProbabilityModel,
    utils::extract_f64_array,
};

/// ProbabilityModel — Python-facing wrapper for one (R, G) stacking model.
///
/// Purpose
/// -------
/// Let Python callers set independent variables and read the resulting
/// weight and probability matrices with their validity flags.
///
/// Parameters
/// ----------
/// Constructed from Python via `ProbabilityModel(R, G)`; unsupported pairs
/// raise `ValueError`.
///
/// Notes
/// -----
/// - Matrices are copied into fresh numpy arrays on every access.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "ProbabilityModel", module = "rust_xrd.probabilities")]
pub struct PyProbabilityModel {
    inner: ProbabilityModel,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyProbabilityModel {
    #[new]
    #[pyo3(text_signature = "(R, G, /)")]
    pub fn new(r: usize, g: usize) -> PyResult<Self> {
        Ok(PyProbabilityModel { inner: ProbabilityModel::new(r, g)? })
    }

    #[getter(R)]
    pub fn r(&self) -> usize {
        self.inner.r()
    }

    #[getter(G)]
    pub fn g(&self) -> usize {
        self.inner.g()
    }

    #[getter]
    pub fn name(&self) -> String {
        self.inner.name()
    }

    /// Independent variable names in declaration order.
    #[getter]
    pub fn parameter_names(&self) -> Vec<&'static str> {
        self.inner.parameters().iter().map(|p| p.name()).collect()
    }

    pub fn get_param(&self, name: &str) -> PyResult<f64> {
        Ok(self.inner.get_param(name)?)
    }

    /// Set one variable; returns `(W_valid, P_valid)`.
    pub fn set_param(&mut self, name: &str, value: f64) -> PyResult<(bool, bool)> {
        let update = self.inner.set_param(name, value)?;
        Ok((update.w_valid, update.p_valid))
    }

    #[getter(W)]
    pub fn w<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.get_distribution_matrix().to_pyarray(py)
    }

    #[getter(P)]
    pub fn p<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.get_probability_matrix().to_pyarray(py)
    }

    /// Marginal layer fractions.
    #[getter]
    pub fn mw<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.get_distribution_array().to_pyarray(py)
    }

    #[getter(W_valid)]
    pub fn w_valid(&self) -> bool {
        self.inner.w_valid()
    }

    #[getter(P_valid)]
    pub fn p_valid(&self) -> bool {
        self.inner.p_valid()
    }
}

/// Residual statistic (`"Rp"`, `"Rwp"` or `"Rpder"`) between two patterns
/// of equal length.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (exp, calc, kind = "Rp"), text_signature = "(exp, calc, /, kind='Rp')")]
pub fn residual<'py>(
    py: Python<'py>, exp: &Bound<'py, PyAny>, calc: &Bound<'py, PyAny>, kind: &str,
) -> PyResult<f64> {
    let kind: ResidualKind = kind.parse()?;
    let exp = extract_f64_array(py, exp)?;
    let calc = extract_f64_array(py, calc)?;
    let (exp, calc) = (exp.as_slice()?, calc.as_slice()?);
    if exp.len() != calc.len() {
        return Err(MixtureError::PatternLengthMismatch { two_theta: exp.len(), intensity: calc.len() }
            .into());
    }
    Ok(kind.compute(exp, calc))
}

/// _rust_xrd — PyO3 module initializer for the Python extension.
///
/// Key behaviors
/// -------------
/// - Create the `probabilities` and `statistics` submodules, attach them to
///   `_rust_xrd` and register them in `sys.modules` for dotted imports.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_xrd<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let probabilities_mod = PyModule::new(_py, "probabilities")?;
    let statistics_mod = PyModule::new(_py, "statistics")?;
    probabilities(_py, m, &probabilities_mod)?;
    statistics(_py, m, &statistics_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("rust_xrd.probabilities", probabilities_mod)?;
    _py.import("sys")?.getattr("modules")?.set_item("rust_xrd.statistics", statistics_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn probabilities<'py>(
    _py: Python, rust_xrd: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PyProbabilityModel>()?;
    rust_xrd.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn statistics<'py>(
    _py: Python, rust_xrd: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(residual, m)?)?;
    rust_xrd.add_submodule(m)?;
    Ok(())
}
