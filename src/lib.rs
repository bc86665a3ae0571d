//! inference_data — canonical labeled container for probabilistic-inference
//! outputs, with optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the container to Python via the `_inference_data` extension module. The
//! crate converts posterior samples, predictive samples, sampler diagnostics
//! and fixed inputs into one validated, immutable [`InferenceData`].
//!
//! Key behaviors
//! -------------
//! - Re-export the two core modules: [`data`] (container, groups, labels,
//!   validation, merge) and [`convert`] (source adapters, label resolution,
//!   group assembly, derived groups).
//! - When `python-bindings` is enabled, define the `InferenceData` `#[pyclass]`
//!   wrapper, the `from_dict` `#[pyfunction]`, and the `#[pymodule]`
//!   initializer.
//!
//! Invariants & assumptions
//! ------------------------
//! - All conversion and validation logic lives in the inner modules; this
//!   file performs only FFI glue and error mapping.
//! - The Python wrapper never exposes mutation; merges return new objects.
//!
//! Conventions
//! -----------
//! - Errors travel as [`DataError`] / [`ConvertError`] internally and become
//!   `ValueError` (or `KeyError` for unknown group names) at the PyO3
//!   boundary.
//!
//! Downstream usage
//! ----------------
//! - Rust callers build a [`ConvertInputs`] and [`ConvertOptions`] and call
//!   [`convert()`], or assemble an [`InferenceData`] by hand.
//! - Python callers use `from_dict(...)` and the read-only accessors of the
//!   returned object.
//!
//! Testing notes
//! -------------
//! - Unit tests live in each inner module; `tests/` holds an end-to-end
//!   eight-schools conversion.

pub mod convert;
pub mod data;
pub mod utils;

pub use crate::convert::{
    ConvertError, ConvertInputs, ConvertOptions, ConvertResult, DrawLayout, InferenceSource,
    LogDensityModel, LogLikelihoodRequest, McmcRun, ParamDraw, PredictiveDraws, convert,
};
pub use crate::data::{
    Coordinate, DataArray, DataError, DataResult, Dataset, Group, InferenceData, MergePolicy,
    Values, VarMap,
};

#[cfg(feature = "python-bindings")]
use std::collections::BTreeMap;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyKeyError, prelude::*, types::PyDict};

#[cfg(feature = "python-bindings")]
use crate::utils::{
    extract_coords, extract_dims, extract_layout, extract_var_map, values_to_py,
};

/// InferenceData — Python-facing read-only view of a converted container.
///
/// Purpose
/// -------
/// Hold an [`InferenceData`] produced by `from_dict` or `merge` and expose
/// its groups, variables, dims and values to Python.
///
/// Fields
/// ------
/// - `inner`: [`InferenceData`]
///
/// Notes
/// -----
/// - Values are copied into fresh numpy arrays on access.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "InferenceData", module = "inference_data", frozen)]
pub struct PyInferenceData {
    inner: InferenceData,
}

#[cfg(feature = "python-bindings")]
impl PyInferenceData {
    fn dataset(&self, group: &str) -> PyResult<&Dataset> {
        self.inner
            .group_by_name(group)?
            .ok_or_else(|| PyKeyError::new_err(format!("group {group:?} is not present")))
    }

    fn array(&self, group: &str, var: &str) -> PyResult<&DataArray> {
        self.dataset(group)?
            .get(var)
            .ok_or_else(|| PyKeyError::new_err(format!("variable {var:?} not in group {group}")))
    }
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyInferenceData {
    /// Present group names in canonical order.
    pub fn groups(&self) -> Vec<&'static str> {
        self.inner.groups().map(Group::as_str).collect()
    }

    /// Variable names of one group.
    pub fn variables(&self, group: &str) -> PyResult<Vec<String>> {
        Ok(self.dataset(group)?.var_names().map(str::to_string).collect())
    }

    /// `{dim: extent}` of one group.
    pub fn dims(&self, group: &str) -> PyResult<BTreeMap<String, usize>> {
        Ok(self.dataset(group)?.dims())
    }

    /// Ordered dim names of one variable.
    pub fn var_dims(&self, group: &str, var: &str) -> PyResult<Vec<String>> {
        Ok(self.array(group, var)?.dims().to_vec())
    }

    /// Values of one variable as a numpy array.
    pub fn values<'py>(
        &self, py: Python<'py>, group: &str, var: &str,
    ) -> PyResult<Bound<'py, PyAny>> {
        values_to_py(py, self.array(group, var)?.values())
    }

    /// New container holding the groups of both inputs.
    ///
    /// With `combine=True`, a group present in both is unioned variable by
    /// variable instead of rejected.
    #[pyo3(signature = (other, combine = false))]
    pub fn merge(&self, other: PyRef<'_, PyInferenceData>, combine: bool) -> PyResult<Self> {
        let policy = if combine { MergePolicy::CombineGroups } else { MergePolicy::Disjoint };
        Ok(PyInferenceData { inner: self.inner.merge(&other.inner, policy)? })
    }

    pub fn __repr__(&self) -> String {
        let groups: Vec<String> = self
            .inner
            .iter()
            .map(|(group, ds)| format!("{group}({})", ds.var_names().collect::<Vec<_>>().join(", ")))
            .collect();
        format!("InferenceData[{}]", groups.join("; "))
    }
}

/// from_dict — build an `InferenceData` from Python dicts of arrays.
///
/// Parameters
/// ----------
/// - `posterior`, `sample_stats`: `{name: array}`; chain-indexed samples.
/// - `prior`, `prior_predictive`, `posterior_predictive`, `predictions`:
///   `{name: array}` predictive samples.
/// - `observed_data`, `constant_data`, `predictions_constant_data`:
///   `{name: array | scalar}` fixed inputs.
/// - `coords`: `{dim: labels}`; `dims`, `pred_dims`: `{var: [dim, ...]}`.
/// - `num_chains`: chain count for flat draws.
/// - `layout`: `"chain_draw"` (default) or `"flat"`; applies to every
///   sample dict.
///
/// Errors
/// ------
/// - `ValueError` for any conversion error; `TypeError` for inputs that are
///   not arrays or scalars.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (
    posterior = None,
    *,
    sample_stats = None,
    prior = None,
    prior_predictive = None,
    posterior_predictive = None,
    predictions = None,
    observed_data = None,
    constant_data = None,
    predictions_constant_data = None,
    coords = None,
    dims = None,
    pred_dims = None,
    num_chains = None,
    layout = None,
))]
#[allow(clippy::too_many_arguments)]
pub fn from_dict<'py>(
    py: Python<'py>, posterior: Option<&Bound<'py, PyDict>>,
    sample_stats: Option<&Bound<'py, PyDict>>, prior: Option<&Bound<'py, PyDict>>,
    prior_predictive: Option<&Bound<'py, PyDict>>,
    posterior_predictive: Option<&Bound<'py, PyDict>>, predictions: Option<&Bound<'py, PyDict>>,
    observed_data: Option<&Bound<'py, PyDict>>, constant_data: Option<&Bound<'py, PyDict>>,
    predictions_constant_data: Option<&Bound<'py, PyDict>>, coords: Option<&Bound<'py, PyDict>>,
    dims: Option<&Bound<'py, PyDict>>, pred_dims: Option<&Bound<'py, PyDict>>,
    num_chains: Option<usize>, layout: Option<&str>,
) -> PyResult<PyInferenceData> {
    let layout = extract_layout(layout)?;
    let predictive = |raw: Option<&Bound<'py, PyDict>>| -> PyResult<Option<PredictiveDraws>> {
        Ok(extract_var_map(py, raw)?.map(|vars| match layout {
            DrawLayout::Flat => PredictiveDraws::flat(vars),
            DrawLayout::ChainDraw => PredictiveDraws::grouped(vars),
        }))
    };

    let run = match extract_var_map(py, posterior)? {
        Some(draws) => {
            let run = McmcRun::new(draws).with_layout(layout);
            Some(match extract_var_map(py, sample_stats)? {
                Some(stats) => run.with_stats(stats),
                None => run,
            })
        }
        None => None,
    };
    let prior = predictive(prior)?;
    let prior_predictive = predictive(prior_predictive)?;
    let posterior_predictive = predictive(posterior_predictive)?;
    let predictions = predictive(predictions)?;
    let observed_data = extract_var_map(py, observed_data)?;
    let constant_data = extract_var_map(py, constant_data)?;
    let predictions_constant_data = extract_var_map(py, predictions_constant_data)?;

    let inputs = ConvertInputs {
        posterior: run.as_ref().map(|run| run as &dyn InferenceSource),
        prior: prior.as_ref(),
        prior_predictive: prior_predictive.as_ref(),
        posterior_predictive: posterior_predictive.as_ref(),
        predictions: predictions.as_ref(),
        observed_data: observed_data.as_ref(),
        constant_data: constant_data.as_ref(),
        predictions_constant_data: predictions_constant_data.as_ref(),
    };

    let mut opts = ConvertOptions {
        coords: extract_coords(coords)?,
        dims: extract_dims(dims)?,
        pred_dims: extract_dims(pred_dims)?,
        ..ConvertOptions::default()
    };
    if let Some(n) = num_chains {
        opts = opts.with_num_chains(n)?;
    }

    Ok(PyInferenceData { inner: convert(&inputs, &opts)? })
}

/// _inference_data — PyO3 module initializer for the Python extension.
///
/// Registers the `InferenceData` class and the `from_dict` function.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _inference_data<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<PyInferenceData>()?;
    m.add_function(wrap_pyfunction!(from_dict, m)?)?;
    Ok(())
}
