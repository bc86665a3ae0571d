//! data::core::validation — invariant checks behind every container
//! constructor.
//!
//! Purpose
//! -------
//! Centralize the checks that make a labeled array, a dataset, and a full
//! inference container valid, so constructors in [`super::array`],
//! [`super::dataset`] and [`super::inference_data`] stay small and all
//! report errors the same way.
//!
//! Key behaviors
//! -------------
//! - Array level: admissible dtype, rank equals number of dims, unique dim
//!   names, coordinate length equals extent.
//! - Dataset level: a dim shared by several variables has one extent and one
//!   set of labels.
//! - Container level: chain-indexed groups lead every variable with `chain`
//!   and `draw` while other groups never use those names, chain counts agree
//!   inside each comparable family, and same-named variables across groups
//!   share a dtype family.
//!
//! Invariants & assumptions
//! ------------------------
//! - Checks are pure and stop at the first violation.
//! - Group-level checks only see groups that are present; absent groups are
//!   never compared.
//!
//! Conventions
//! -----------
//! - Every failure is a [`DataError`]; nothing here panics.
use std::collections::BTreeMap;

use crate::data::{
    core::{
        array::DataArray,
        coords::Coordinate,
        dataset::Dataset,
        groups::{ChainFamily, Group},
        values::{DType, DTypeFamily},
    },
    errors::{DataError, DataResult},
};

/// Reject storage that is neither numeric nor boolean.
///
/// Errors
/// ------
/// - `DataError::UnsupportedDtype` when `dtype` belongs to the unsupported
///   family.
pub fn validate_dtype(var: &str, dtype: DType) -> DataResult<()> {
    if dtype.family() == DTypeFamily::Unsupported {
        return Err(DataError::UnsupportedDtype {
            var: var.to_string(),
            dtype: dtype.as_str(),
            reason: "Variables must hold numeric or boolean values.",
        });
    }
    Ok(())
}

/// Check dims and coordinates of one array against its shape.
///
/// Parameters
/// ----------
/// - `var`: name used in error contexts.
/// - `shape`: extents of the array.
/// - `dims`: one name per axis.
/// - `coords`: labels keyed by dim name; every dim must have an entry.
///
/// Errors
/// ------
/// - `DataError::ShapeMismatch` when `dims.len() != shape.len()`, when a dim
///   name repeats, when a dim has no coordinate, or when a coordinate's length
///   differs from its extent.
pub fn validate_labels(
    var: &str, shape: &[usize], dims: &[String], coords: &BTreeMap<String, Coordinate>,
) -> DataResult<()> {
    if dims.len() != shape.len() {
        return Err(DataError::ShapeMismatch {
            context: var.to_string(),
            expected: shape.len(),
            actual: dims.len(),
            reason: "Number of dims must equal the array rank.",
        });
    }
    for (axis, dim) in dims.iter().enumerate() {
        if dims[..axis].contains(dim) {
            return Err(DataError::ShapeMismatch {
                context: format!("{var}[{dim}]"),
                expected: 1,
                actual: dims.iter().filter(|d| *d == dim).count(),
                reason: "A dim name may label only one axis of an array.",
            });
        }
        let extent = shape[axis];
        let labels = coords.get(dim).map_or(0, Coordinate::len);
        if !coords.contains_key(dim) || labels != extent {
            return Err(DataError::ShapeMismatch {
                context: format!("{var}[{dim}]"),
                expected: extent,
                actual: labels,
                reason: "Coordinate length must equal the dimension extent.",
            });
        }
    }
    Ok(())
}

/// Enforce the shared-axis rule across the variables of one dataset.
///
/// Errors
/// ------
/// - `DataError::ShapeMismatch` when two variables use the same dim name with
///   different extents or different labels.
pub fn validate_shared_axes(vars: &BTreeMap<String, DataArray>) -> DataResult<()> {
    let mut seen: BTreeMap<&str, &Coordinate> = BTreeMap::new();
    for (name, array) in vars {
        for dim in array.dims() {
            let Some(coord) = array.coord(dim) else {
                continue;
            };
            let Some(known) = seen.get(dim.as_str()).copied() else {
                seen.insert(dim.as_str(), coord);
                continue;
            };
            if known.len() != coord.len() {
                return Err(DataError::ShapeMismatch {
                    context: format!("{name}[{dim}]"),
                    expected: known.len(),
                    actual: coord.len(),
                    reason: "Variables sharing a dim must agree on its extent.",
                });
            }
            if known != coord {
                return Err(DataError::ShapeMismatch {
                    context: format!("{name}[{dim}]"),
                    expected: known.len(),
                    actual: coord.len(),
                    reason: "Variables sharing a dim must agree on its coordinate labels.",
                });
            }
        }
    }
    Ok(())
}

/// Container-level checks run by every [`InferenceData`](super::InferenceData)
/// constructor, including merges.
///
/// Parameters
/// ----------
/// - `groups`: the datasets to be stored.
/// - `distinct_prediction_dims`: when `true`, `predictions` follows its own
///   coordinate convention and is exempt from the posterior chain check.
///
/// Errors
/// ------
/// - `DataError::ShapeMismatch` when a variable breaks its group's
///   chain/draw layout (see [`validate_group_layout`]), or when two
///   comparable groups disagree on the chain count.
/// - `DataError::UnsupportedDtype` when a variable name appears in two groups
///   with different dtype families.
pub fn validate_groups(
    groups: &BTreeMap<Group, Dataset>, distinct_prediction_dims: bool,
) -> DataResult<()> {
    for (&group, dataset) in groups {
        validate_group_layout(group, dataset)?;
    }
    validate_chain_agreement(groups, distinct_prediction_dims)?;
    validate_dtype_families(groups)
}

/// Check the chain/draw layout of every variable of one group.
///
/// Errors
/// ------
/// - `DataError::ShapeMismatch` when a variable of a chain-indexed group does
///   not lead with `chain`, `draw` (expected rank 2 vs the number of leading
///   dims that match), or when a variable of a non-indexed group uses either
///   name.
pub fn validate_group_layout(group: Group, dataset: &Dataset) -> DataResult<()> {
    const LEAD: [&str; 2] = ["chain", "draw"];
    for (name, array) in dataset.iter() {
        let dims = array.dims();
        if group.is_chain_indexed() {
            let leading =
                dims.iter().zip(LEAD).take_while(|(dim, lead)| dim.as_str() == *lead).count();
            if leading < LEAD.len() {
                return Err(DataError::ShapeMismatch {
                    context: format!("{group}.{name}"),
                    expected: LEAD.len(),
                    actual: leading,
                    reason: "Chain-indexed groups must lead every variable with chain and draw.",
                });
            }
        } else if let Some(dim) = dims.iter().find(|dim| LEAD.contains(&dim.as_str())) {
            return Err(DataError::ShapeMismatch {
                context: format!("{group}.{name}[{dim}]"),
                expected: 0,
                actual: 1,
                reason: "Groups without chain/draw indexing may not use chain or draw dims.",
            });
        }
    }
    Ok(())
}

fn validate_chain_agreement(
    groups: &BTreeMap<Group, Dataset>, distinct_prediction_dims: bool,
) -> DataResult<()> {
    let mut reference: Vec<(ChainFamily, Group, usize)> = Vec::new();
    for (&group, dataset) in groups {
        let Some(family) = group.chain_family() else {
            continue;
        };
        if distinct_prediction_dims && group == Group::Predictions {
            continue;
        }
        let Some(chains) = dataset.dims().get("chain").copied() else {
            continue;
        };
        let Some((_, first, expected)) = reference.iter().find(|(f, _, _)| *f == family).copied()
        else {
            reference.push((family, group, chains));
            continue;
        };
        if expected != chains {
            return Err(DataError::ShapeMismatch {
                context: format!("{group}.chain (vs {first})"),
                expected,
                actual: chains,
                reason: "Comparable chain-indexed groups must agree on the chain count.",
            });
        }
    }
    Ok(())
}

fn validate_dtype_families(groups: &BTreeMap<Group, Dataset>) -> DataResult<()> {
    let mut families: BTreeMap<&str, DTypeFamily> = BTreeMap::new();
    for (group, dataset) in groups {
        if !group.shares_variable_namespace() {
            continue;
        }
        for (name, array) in dataset.iter() {
            let family = array.dtype().family();
            let known = *families.entry(name.as_str()).or_insert(family);
            if known != family {
                return Err(DataError::UnsupportedDtype {
                    var: format!("{group}.{name}"),
                    dtype: array.dtype().as_str(),
                    reason: "Same-named variables must share a dtype family across groups.",
                });
            }
        }
    }
    Ok(())
}
