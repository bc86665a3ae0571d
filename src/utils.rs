//! Python extraction helpers for the `python-bindings` feature.
//!
//! - Turn Python dicts of numpy arrays / scalars into [`VarMap`]s.
//! - Turn coords and dims dicts into [`CoordsMap`] / [`DimsMap`].
//! - Turn stored [`Values`] back into numpy arrays.
//!
//! Non-contiguous or non-native dtypes are routed through `numpy.asarray`
//! before extraction. Complex, string and object arrays are rejected as
//! unsupported dtypes.
#[cfg(feature = "python-bindings")]
use numpy::{PyReadonlyArrayDyn, ToPyArray};

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::{PyAny, PyDict},
};

#[cfg(feature = "python-bindings")]
use crate::{
    convert::{
        options::{CoordsMap, DimsMap},
        source::DrawLayout,
    },
    data::{
        core::{
            coords::Coordinate,
            values::{Values, VarMap},
        },
        errors::DataError,
    },
};

/// Extract one variable from a numpy array, array-like, or scalar.
///
/// Errors
/// ------
/// - `ValueError` for complex, string and object arrays (unsupported
///   dtype).
/// - `TypeError` when the object is neither array-like nor a scalar.
#[cfg(feature = "python-bindings")]
pub fn extract_values<'py>(
    py: Python<'py>, name: &str, raw: &Bound<'py, PyAny>,
) -> PyResult<Values> {
    if let Ok(flag) = raw.extract::<bool>() {
        return Ok(Values::from(flag));
    }
    if let Ok(arr) = raw.extract::<PyReadonlyArrayDyn<'py, f64>>() {
        return Ok(Values::Float(arr.as_array().to_owned()));
    }
    if let Ok(arr) = raw.extract::<PyReadonlyArrayDyn<'py, i64>>() {
        return Ok(Values::Int(arr.as_array().to_owned()));
    }
    if let Ok(arr) = raw.extract::<PyReadonlyArrayDyn<'py, bool>>() {
        return Ok(Values::Bool(arr.as_array().to_owned()));
    }

    let array = py.import("numpy")?.call_method1("asarray", (raw,))?;
    let kind: String = array.getattr("dtype")?.getattr("kind")?.extract()?;
    match storage_for_kind(name, &kind)? {
        Some(StorageKind::Float) => {
            let cast = array.call_method1("astype", ("float64",))?;
            Ok(Values::Float(cast.extract::<PyReadonlyArrayDyn<'py, f64>>()?.as_array().to_owned()))
        }
        Some(StorageKind::Int) => {
            let cast = array.call_method1("astype", ("int64",))?;
            Ok(Values::Int(cast.extract::<PyReadonlyArrayDyn<'py, i64>>()?.as_array().to_owned()))
        }
        Some(StorageKind::Bool) => {
            Ok(Values::Bool(array.extract::<PyReadonlyArrayDyn<'py, bool>>()?.as_array().to_owned()))
        }
        None => Err(PyTypeError::new_err(format!(
            "variable {name:?}: expected a numeric or boolean array, got dtype kind {kind:?}"
        ))),
    }
}

/// Storage a numpy array is cast to before extraction.
#[cfg(feature = "python-bindings")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StorageKind {
    Float,
    Int,
    Bool,
}

/// Map a numpy `dtype.kind` code to the storage it is cast to.
///
/// Returns
/// -------
/// - `Ok(None)` for kinds that are not arrays of values at all (e.g.
///   datetimes, void).
///
/// Errors
/// ------
/// - `DataError::UnsupportedDtype` for complex (`c`), which cannot be cast
///   to `float64` without dropping the imaginary part, and for string /
///   object kinds (`U`, `S`, `O`).
#[cfg(feature = "python-bindings")]
fn storage_for_kind(name: &str, kind: &str) -> Result<Option<StorageKind>, DataError> {
    match kind {
        "f" => Ok(Some(StorageKind::Float)),
        "i" | "u" => Ok(Some(StorageKind::Int)),
        "b" => Ok(Some(StorageKind::Bool)),
        "c" => Err(DataError::UnsupportedDtype {
            var: name.to_string(),
            dtype: "complex",
            reason: "Complex values cannot be stored without losing the imaginary part.",
        }),
        "U" | "S" | "O" => Err(DataError::UnsupportedDtype {
            var: name.to_string(),
            dtype: "str",
            reason: "Variables must hold numeric or boolean values.",
        }),
        _ => Ok(None),
    }
}

/// Extract a `{name: array}` dict; `None` passes through.
#[cfg(feature = "python-bindings")]
pub fn extract_var_map<'py>(
    py: Python<'py>, raw: Option<&Bound<'py, PyDict>>,
) -> PyResult<Option<VarMap>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let mut vars = VarMap::new();
    for (key, value) in raw.iter() {
        let name: String = key.extract()?;
        let values = extract_values(py, &name, &value)?;
        vars.insert(name, values);
    }
    Ok(Some(vars))
}

/// Extract `{dim: labels}`; labels may be ints, floats, or strings.
#[cfg(feature = "python-bindings")]
pub fn extract_coords(raw: Option<&Bound<'_, PyDict>>) -> PyResult<CoordsMap> {
    let mut coords = CoordsMap::new();
    let Some(raw) = raw else {
        return Ok(coords);
    };
    for (key, value) in raw.iter() {
        let dim: String = key.extract()?;
        let labels = if let Ok(ints) = value.extract::<Vec<i64>>() {
            Coordinate::Int(ints)
        } else if let Ok(floats) = value.extract::<Vec<f64>>() {
            Coordinate::Float(floats)
        } else if let Ok(text) = value.extract::<Vec<String>>() {
            Coordinate::Text(text)
        } else {
            return Err(PyValueError::new_err(format!(
                "coords[{dim:?}] must be a sequence of ints, floats, or strings"
            )));
        };
        coords.insert(dim, labels);
    }
    Ok(coords)
}

/// Extract `{var: [dim, ...]}`.
#[cfg(feature = "python-bindings")]
pub fn extract_dims(raw: Option<&Bound<'_, PyDict>>) -> PyResult<DimsMap> {
    let mut dims = DimsMap::new();
    if let Some(raw) = raw {
        for (key, value) in raw.iter() {
            dims.insert(key.extract()?, value.extract()?);
        }
    }
    Ok(dims)
}

/// Parse a layout name: `"chain_draw"` (default) or `"flat"`.
#[cfg(feature = "python-bindings")]
pub fn extract_layout(raw: Option<&str>) -> PyResult<DrawLayout> {
    match raw.unwrap_or("chain_draw").to_lowercase().as_str() {
        "chain_draw" => Ok(DrawLayout::ChainDraw),
        "flat" => Ok(DrawLayout::Flat),
        other => Err(PyValueError::new_err(format!(
            "invalid layout {other:?} (expected 'chain_draw' or 'flat')"
        ))),
    }
}

/// Copy stored values into a new numpy array.
#[cfg(feature = "python-bindings")]
pub fn values_to_py<'py>(py: Python<'py>, values: &Values) -> PyResult<Bound<'py, PyAny>> {
    match values {
        Values::Float(arr) => Ok(arr.to_pyarray(py).into_any()),
        Values::Int(arr) => Ok(arr.to_pyarray(py).into_any()),
        Values::Bool(arr) => Ok(arr.to_pyarray(py).into_any()),
        Values::Text(_) => Err(PyValueError::new_err("string storage cannot be exported")),
    }
}
