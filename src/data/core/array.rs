//! Labeled N-dimensional array.
//!
//! Purpose
//! -------
//! Attach an ordered list of dimension names and per-dimension coordinate
//! labels to one variable's storage, validating the pairing once at
//! construction so every consumer can rely on it.
//!
//! Key behaviors
//! -------------
//! - [`DataArray::new`] takes explicit labels and validates dtype, rank and
//!   coordinate lengths.
//! - [`DataArray::with_default_coords`] fills any missing coordinate with the
//!   integer range of its extent before validating.
//! - Read-only accessors expose values, dims, coordinates and per-dim sizes.
//!
//! Invariants & assumptions
//! ------------------------
//! - `values.ndim() == dims.len()`, dim names are unique.
//! - Every dim has a coordinate whose length equals its extent; coordinates
//!   for names outside `dims` are not stored.
//! - `values` is numeric or boolean.
use std::collections::BTreeMap;

use crate::data::{
    core::{
        coords::Coordinate,
        validation::{validate_dtype, validate_labels},
        values::{DType, Values},
    },
    errors::DataResult,
};

/// One variable: storage plus dimension names and coordinates.
///
/// Fields
/// ------
/// - `name`: variable name (used in error contexts and by datasets).
/// - `values`: [`Values`] storage.
/// - `dims`: one name per axis, in axis order.
/// - `coords`: labels for each name in `dims`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    name: String,
    values: Values,
    dims: Vec<String>,
    coords: BTreeMap<String, Coordinate>,
}

impl DataArray {
    /// Construct a validated [`DataArray`].
    ///
    /// Parameters
    /// ----------
    /// - `name`: variable name.
    /// - `values`: storage; must be numeric or boolean.
    /// - `dims`: one unique name per axis.
    /// - `coords`: labels keyed by dim name; entries for names outside `dims`
    ///   are dropped.
    ///
    /// Errors
    /// ------
    /// - `DataError::UnsupportedDtype` for text storage.
    /// - `DataError::ShapeMismatch` when labels and shape disagree (see
    ///   [`validate_labels`]).
    pub fn new(
        name: impl Into<String>, values: Values, dims: Vec<String>,
        mut coords: BTreeMap<String, Coordinate>,
    ) -> DataResult<Self> {
        let name = name.into();
        validate_dtype(&name, values.dtype())?;
        coords.retain(|dim, _| dims.contains(dim));
        validate_labels(&name, values.shape(), &dims, &coords)?;
        Ok(DataArray { name, values, dims, coords })
    }

    /// Like [`DataArray::new`], but dims without an entry in `coords` get
    /// `0..extent` labels.
    ///
    /// Errors
    /// ------
    /// - Same as [`DataArray::new`]. A rank mismatch is reported before any
    ///   default is synthesized.
    pub fn with_default_coords(
        name: impl Into<String>, values: Values, dims: Vec<String>,
        mut coords: BTreeMap<String, Coordinate>,
    ) -> DataResult<Self> {
        for (dim, &extent) in dims.iter().zip(values.shape()) {
            coords.entry(dim.clone()).or_insert_with(|| Coordinate::range(extent));
        }
        DataArray::new(name, values, dims, coords)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn dtype(&self) -> DType {
        self.values.dtype()
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn coords(&self) -> &BTreeMap<String, Coordinate> {
        &self.coords
    }

    pub fn coord(&self, dim: &str) -> Option<&Coordinate> {
        self.coords.get(dim)
    }

    /// `(dim, extent)` pairs in axis order.
    pub fn sizes(&self) -> Vec<(&str, usize)> {
        self.dims.iter().map(String::as_str).zip(self.shape().iter().copied()).collect()
    }
}
