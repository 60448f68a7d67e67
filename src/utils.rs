//! Conversion helpers for the Python bindings.
#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArrayMethods, PyReadonlyArray1};
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyTypeError, prelude::*, types::PyAny};

/// Read a pattern (2θ grid or intensities) passed from Python as a
/// contiguous float64 array.
///
/// Contiguous numpy arrays are borrowed. Strided arrays, objects exposing
/// `to_numpy()` and plain sequences of numbers are copied.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_array<'py>(
    py: Python<'py>, pattern: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    let contiguous = |obj: &Bound<'py, PyAny>| {
        obj.extract::<PyReadonlyArray1<f64>>().ok().filter(|a| a.as_slice().is_ok())
    };
    if let Some(arr) = contiguous(pattern) {
        return Ok(arr);
    }
    if let Some(arr) = pattern.call_method0("to_numpy").ok().as_ref().and_then(contiguous) {
        return Ok(arr);
    }
    let values: Vec<f64> = pattern
        .extract()
        .map_err(|_| PyTypeError::new_err("pattern must be a 1-D sequence of floats"))?;
    Ok(values.into_pyarray(py).readonly())
}
