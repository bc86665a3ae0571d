//! Dimension / coordinate resolver.
//!
//! Purpose
//! -------
//! Compute the dim names and coordinate labels of every variable, applying
//! one precedence order everywhere and remembering earlier resolutions so the
//! same variable in two groups gets one axis scheme.
//!
//! Key behaviors
//! -------------
//! - Dims: explicit `dims` / `pred_dims` entry > dims already resolved for the
//!   same variable on the same side > `"<var>_dim_<i>"` defaults.
//! - Coords: explicit entry keyed by dim name > `0..extent`.
//! - Chain-indexed groups get `chain` and `draw` prepended to the resolved
//!   dims.
//!
//! Invariants & assumptions
//! ------------------------
//! - Training-side and prediction-side groups keep separate contexts, so
//!   predictions may label a variable differently from the posterior.
//! - The first resolution of a variable on a side is the one remembered.
//! - A remembered entry is reused only when its length equals the variable's
//!   own rank.
//!
//! Conventions
//! -----------
//! - "Own" dims exclude the leading `chain` / `draw` axes.
use std::collections::BTreeMap;

use tracing::trace;

use crate::{
    convert::{
        errors::{ConvertError, ConvertResult},
        options::{ConvertOptions, CoordsMap},
    },
    data::core::{coords::Coordinate, groups::Group},
};

/// Variable name → resolved own dims, one map per side.
///
/// Threaded explicitly through assembly; never global.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionContext {
    training: BTreeMap<String, Vec<String>>,
    prediction: BTreeMap<String, Vec<String>>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        ResolutionContext::default()
    }

    /// Own dims remembered for `var` on the side of `group`.
    pub fn known(&self, group: Group, var: &str) -> Option<&[String]> {
        self.side(group).get(var).map(Vec::as_slice)
    }

    fn side(&self, group: Group) -> &BTreeMap<String, Vec<String>> {
        if group.is_prediction_side() { &self.prediction } else { &self.training }
    }

    /// Resolve full dims and coords of one variable.
    ///
    /// Parameters
    /// ----------
    /// - `group`: group being assembled; selects the side and whether
    ///   `chain` / `draw` are prepended.
    /// - `var`: variable name.
    /// - `shape`: full storage shape (including `chain` / `draw` for
    ///   chain-indexed groups, which must have rank ≥ 2).
    /// - `opts`: explicit dims and coords.
    ///
    /// Returns
    /// -------
    /// - `(dims, coords)` covering every axis of `shape`.
    ///
    /// Errors
    /// ------
    /// - `ConvertError::ShapeMismatch` when an explicit dims list is longer
    ///   than the own rank, or an explicit coordinate's length differs from
    ///   its extent.
    pub fn resolve(
        &mut self, group: Group, var: &str, shape: &[usize], opts: &ConvertOptions,
    ) -> ConvertResult<(Vec<String>, CoordsMap)> {
        let lead = if group.is_chain_indexed() { 2 } else { 0 };
        let own_rank = shape.len().saturating_sub(lead);
        let explicit =
            if group.is_prediction_side() { opts.pred_dims.get(var) } else { opts.dims.get(var) };

        let own = resolve_dims(var, own_rank, explicit.map(Vec::as_slice), self.known(group, var))?;

        let side =
            if group.is_prediction_side() { &mut self.prediction } else { &mut self.training };
        side.entry(var.to_string()).or_insert_with(|| own.clone());

        let mut dims = Vec::with_capacity(lead + own.len());
        if lead == 2 {
            dims.push("chain".to_string());
            dims.push("draw".to_string());
        }
        dims.extend(own);

        let coords = resolve_coords(var, &dims, shape, &opts.coords)?;
        trace!(group = %group, var, dims = ?dims, "resolved variable labels");
        Ok((dims, coords))
    }
}

/// Own dims of a variable of rank `rank`.
///
/// Errors
/// ------
/// - `ConvertError::ShapeMismatch` when `explicit` names more axes than
///   `rank`.
///
/// Notes
/// -----
/// - A short explicit list names the leading axes; the remaining axes get
///   defaults that keep their positional index (`obs_dim_1`, …).
pub fn resolve_dims(
    var: &str, rank: usize, explicit: Option<&[String]>, known: Option<&[String]>,
) -> ConvertResult<Vec<String>> {
    if let Some(explicit) = explicit {
        if explicit.len() > rank {
            return Err(ConvertError::ShapeMismatch {
                context: format!("dims[{var}]"),
                expected: rank,
                actual: explicit.len(),
                reason: "More dims were supplied than the variable has axes.",
            });
        }
        let mut dims = explicit.to_vec();
        dims.extend((explicit.len()..rank).map(|i| default_dim(var, i)));
        return Ok(dims);
    }
    match known {
        Some(known) if known.len() == rank => Ok(known.to_vec()),
        _ => Ok((0..rank).map(|i| default_dim(var, i)).collect()),
    }
}

/// Coordinates for every dim of a variable.
///
/// Errors
/// ------
/// - `ConvertError::ShapeMismatch` when an explicit coordinate's length
///   differs from the extent of its dim.
pub fn resolve_coords(
    var: &str, dims: &[String], shape: &[usize], explicit: &CoordsMap,
) -> ConvertResult<CoordsMap> {
    let mut coords = CoordsMap::new();
    for (dim, &extent) in dims.iter().zip(shape) {
        let coord = match explicit.get(dim) {
            Some(labels) if labels.len() != extent => {
                return Err(ConvertError::ShapeMismatch {
                    context: format!("{var}[{dim}]"),
                    expected: extent,
                    actual: labels.len(),
                    reason: "Coordinate length must equal the dimension extent.",
                });
            }
            Some(labels) => labels.clone(),
            None => Coordinate::range(extent),
        };
        coords.insert(dim.clone(), coord);
    }
    Ok(coords)
}

fn default_dim(var: &str, axis: usize) -> String {
    format!("{var}_dim_{axis}")
}
