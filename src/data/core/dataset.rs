//! Dataset: the variables of one group.
//!
//! Purpose
//! -------
//! Collect named [`DataArray`]s that live in the same group and enforce the
//! shared-axis rule between them.
//!
//! Key behaviors
//! -------------
//! - [`Dataset::new`] validates the shared-axis rule once.
//! - [`Dataset::dims`] reports every dim name with its extent.
//! - Iteration and lookup are ordered by variable name.
//! - Lookup comes in two forms: [`Dataset::get`] returns `Option` and never
//!   panics; `dataset["name"]` is a map-style shorthand that panics when the
//!   variable is missing. Library code only uses `get`.
//!
//! Invariants & assumptions
//! ------------------------
//! - A dim name used by several variables has one extent and one set of
//!   coordinate labels.
//! - Map keys equal each array's own name.
use std::collections::BTreeMap;

use crate::data::{
    core::{array::DataArray, groups::Group, validation::validate_shared_axes},
    errors::{DataError, DataResult},
};

/// Variables of one group keyed by name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    vars: BTreeMap<String, DataArray>,
}

impl Dataset {
    /// Build a dataset from labeled arrays.
    ///
    /// Parameters
    /// ----------
    /// - `arrays`: arrays to store; each is keyed by [`DataArray::name`].
    ///
    /// Errors
    /// ------
    /// - `DataError::ShapeMismatch` when two arrays disagree on a shared dim.
    ///
    /// Notes
    /// -----
    /// - A later array with an already used name replaces the earlier one.
    ///   Callers that must detect duplicates (merges) check beforehand.
    pub fn new(arrays: impl IntoIterator<Item = DataArray>) -> DataResult<Self> {
        let vars: BTreeMap<String, DataArray> =
            arrays.into_iter().map(|a| (a.name().to_string(), a)).collect();
        validate_shared_axes(&vars)?;
        Ok(Dataset { vars })
    }

    pub fn get(&self, var: &str) -> Option<&DataArray> {
        self.vars.get(var)
    }

    pub fn contains(&self, var: &str) -> bool {
        self.vars.contains_key(var)
    }

    pub fn var_names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DataArray)> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Every dim used in the dataset mapped to its extent.
    ///
    /// Extents are unique per dim by the shared-axis rule.
    pub fn dims(&self) -> BTreeMap<String, usize> {
        self.vars
            .values()
            .flat_map(|array| array.sizes())
            .map(|(dim, extent)| (dim.to_string(), extent))
            .collect()
    }

    /// Union two datasets of the same group.
    ///
    /// Errors
    /// ------
    /// - `DataError::GroupCollision { var: Some(..) }` when both define a
    ///   variable.
    /// - `DataError::ShapeMismatch` when the union violates the shared-axis
    ///   rule.
    pub(crate) fn combine(&self, other: &Dataset, group: Group) -> DataResult<Dataset> {
        if let Some(name) = other.var_names().find(|name| self.contains(name)) {
            return Err(DataError::GroupCollision { group, var: Some(name.to_string()) });
        }
        Dataset::new(self.vars.values().chain(other.vars.values()).cloned())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = (&'a String, &'a DataArray);
    type IntoIter = std::collections::btree_map::Iter<'a, String, DataArray>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.iter()
    }
}

impl std::ops::Index<&str> for Dataset {
    type Output = DataArray;

    /// Panics
    /// ------
    /// - If `var` is not in the dataset; use [`Dataset::get`] instead.
    fn index(&self, var: &str) -> &DataArray {
        match self.vars.get(var) {
            Some(array) => array,
            None => panic!("variable {var:?} not in dataset"),
        }
    }
}
