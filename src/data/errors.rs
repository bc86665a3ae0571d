//! Errors for the labeled-array container (array invariants, dtype checks,
//! group schema and merge conflicts).
//!
//! This module defines the container error type, [`DataError`], used by
//! `data::core` whenever a [`DataArray`](crate::data::core::DataArray),
//! [`Dataset`](crate::data::core::Dataset) or
//! [`InferenceData`](crate::data::core::InferenceData) would violate one of
//! its invariants. It implements `Display`/`Error` and converts to `PyErr`
//! when the `python-bindings` feature is enabled.
//!
//! ## Conventions
//! - `context` strings name the offending location as `group.var` or
//!   `var[dim]` so messages can be traced back to user inputs.
//! - Construction is all-or-nothing: every error is raised before any
//!   container is returned, never as a warning on a partial result.
#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyKeyError, PyValueError},
    prelude::*,
};

use crate::data::core::groups::Group;

/// Result alias for container construction and merging.
pub type DataResult<T> = Result<T, DataError>;

/// Unified error type for container invariants.
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    // ---- Shapes and labels ----
    /// A dims list, coordinate sequence, chain count or reshape disagrees
    /// with the actual array extents.
    ShapeMismatch { context: String, expected: usize, actual: usize, reason: &'static str },

    // ---- Element types ----
    /// Storage is not numeric or boolean, or two groups disagree on the dtype
    /// family of a same-named variable.
    UnsupportedDtype { var: String, dtype: &'static str, reason: &'static str },

    // ---- Group schema ----
    /// The same group (or the same variable inside a combined group) is
    /// defined by both inputs of a merge.
    GroupCollision { group: Group, var: Option<String> },

    /// A group name outside the fixed schema.
    UnknownGroup { name: String },
}

impl std::error::Error for DataError {}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Shapes and labels ----
            DataError::ShapeMismatch { context, expected, actual, reason } => {
                write!(f, "Shape mismatch at {context}: expected {expected}, got {actual}. {reason}")
            }
            // ---- Element types ----
            DataError::UnsupportedDtype { var, dtype, reason } => {
                write!(f, "Unsupported dtype {dtype} for variable {var:?}. {reason}")
            }
            // ---- Group schema ----
            DataError::GroupCollision { group, var: None } => {
                write!(f, "Group {group} is defined by both containers.")
            }
            DataError::GroupCollision { group, var: Some(var) } => {
                write!(f, "Variable {var:?} is defined twice in group {group}.")
            }
            DataError::UnknownGroup { name } => {
                write!(f, "Unknown group {name:?}.")
            }
        }
    }
}

/// Convert a [`DataError`] into a Python exception.
///
/// `UnknownGroup` becomes a `KeyError`; everything else a `ValueError`.
#[cfg(feature = "python-bindings")]
impl std::convert::From<DataError> for PyErr {
    fn from(err: DataError) -> PyErr {
        match err {
            DataError::UnknownGroup { .. } => PyKeyError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}
