//! Unified error handling for the conversion pipeline.
//!
//! This module defines `ConvertError`, the error type returned by
//! [`convert`](crate::convert::convert) and every stage behind it (source
//! inspection, dim resolution, group assembly, derived groups). Container
//! invariant failures raised by `data::core` are mapped into it variant by
//! variant, so callers match on one enum. An alias `ConvertResult<T>`
//! standardizes the return type across conversion code.
#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyKeyError, PyValueError},
    prelude::*,
};

use crate::data::{core::groups::Group, errors::DataError};

/// Result alias for conversion routines.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Unified error type for conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertError {
    // ---- Source capabilities ----
    /// The caller asked for a group the source object cannot supply.
    MissingAccessor { group: Group, reason: &'static str },

    // ---- Container invariants ----
    ShapeMismatch { context: String, expected: usize, actual: usize, reason: &'static str },

    UnsupportedDtype { var: String, dtype: &'static str, reason: &'static str },

    GroupCollision { group: Group, var: Option<String> },

    UnknownGroup { name: String },

    // ---- Log-density evaluation ----
    /// The model's evaluator returned an error for an observed variable.
    LogDensityFailed { var: String, message: String },
}

impl std::error::Error for ConvertError {}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Source capabilities ----
            ConvertError::MissingAccessor { group, reason } => {
                write!(f, "Cannot extract group {group} from the source object. {reason}")
            }

            // ---- Container invariants ----
            ConvertError::ShapeMismatch { context, expected, actual, reason } => {
                write!(f, "Shape mismatch at {context}: expected {expected}, got {actual}. {reason}")
            }
            ConvertError::UnsupportedDtype { var, dtype, reason } => {
                write!(f, "Unsupported dtype {dtype} for variable {var:?}. {reason}")
            }
            ConvertError::GroupCollision { group, var: None } => {
                write!(f, "Group {group} is defined by both containers.")
            }
            ConvertError::GroupCollision { group, var: Some(var) } => {
                write!(f, "Variable {var:?} is defined twice in group {group}.")
            }
            ConvertError::UnknownGroup { name } => write!(f, "Unknown group {name:?}."),

            // ---- Log-density evaluation ----
            ConvertError::LogDensityFailed { var, message } => {
                write!(f, "Log-density evaluation failed for observed variable {var:?}: {message}")
            }
        }
    }
}

impl From<DataError> for ConvertError {
    fn from(err: DataError) -> ConvertError {
        match err {
            DataError::ShapeMismatch { context, expected, actual, reason } => {
                ConvertError::ShapeMismatch { context, expected, actual, reason }
            }
            DataError::UnsupportedDtype { var, dtype, reason } => {
                ConvertError::UnsupportedDtype { var, dtype, reason }
            }
            DataError::GroupCollision { group, var } => ConvertError::GroupCollision { group, var },
            DataError::UnknownGroup { name } => ConvertError::UnknownGroup { name },
        }
    }
}

/// Convert a [`ConvertError`] into a Python exception.
///
/// `UnknownGroup` becomes a `KeyError`; everything else a `ValueError`.
#[cfg(feature = "python-bindings")]
impl std::convert::From<ConvertError> for PyErr {
    fn from(err: ConvertError) -> PyErr {
        match err {
            ConvertError::UnknownGroup { .. } => PyKeyError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}
