//! Group assembler — from plain sample maps to labeled datasets.
//!
//! Purpose
//! -------
//! Turn the `name → Values` maps delivered by source adapters into one
//! [`Dataset`] per group, reshaping flat draws to `chain × draw` where needed
//! and resolving labels through a shared [`ResolutionContext`].
//!
//! Key behaviors
//! -------------
//! - [`GroupAssembler::chain_indexed`] handles groups whose variables lead
//!   with `chain` / `draw`; flat draws are split into `num_chains` chains.
//! - [`GroupAssembler::unindexed`] handles fixed inputs (observed and constant
//!   data); scalars become 0-d arrays.
//! - The context lives as long as the assembler, so assembly order fixes
//!   which group's resolution a variable inherits.
//!
//! Invariants & assumptions
//! ------------------------
//! - Flat storage has rank ≥ 1 and its leading extent is divisible by the
//!   chain count; chain/draw storage has rank ≥ 2.
//! - An empty input map yields an empty dataset, which the container drops.
use tracing::debug;

use crate::{
    convert::{
        errors::{ConvertError, ConvertResult},
        options::ConvertOptions,
        resolver::ResolutionContext,
        source::DrawLayout,
    },
    data::core::{
        array::DataArray,
        dataset::Dataset,
        groups::Group,
        values::{Values, VarMap},
    },
};

/// Builds datasets for one conversion.
#[derive(Debug)]
pub struct GroupAssembler<'o> {
    opts: &'o ConvertOptions,
    context: ResolutionContext,
}

impl<'o> GroupAssembler<'o> {
    pub fn new(opts: &'o ConvertOptions) -> Self {
        GroupAssembler { opts, context: ResolutionContext::new() }
    }

    pub fn context(&self) -> &ResolutionContext {
        &self.context
    }

    /// Assemble a chain/draw-indexed group.
    ///
    /// Parameters
    /// ----------
    /// - `group`: target group; must be chain-indexed.
    /// - `vars`: samples keyed by variable name.
    /// - `layout`: layout of every entry in `vars`.
    /// - `chains`: chain count used to split `Flat` storage; ignored for
    ///   `ChainDraw` storage.
    ///
    /// Errors
    /// ------
    /// - `ConvertError::ShapeMismatch` for storage of insufficient rank, a
    ///   flat draw count not divisible by `chains`, or a label mismatch.
    /// - `ConvertError::UnsupportedDtype` for text storage.
    pub fn chain_indexed(
        &mut self, group: Group, vars: &VarMap, layout: DrawLayout, chains: usize,
    ) -> ConvertResult<Dataset> {
        let mut arrays = Vec::with_capacity(vars.len());
        for (name, values) in vars {
            let values = match layout {
                DrawLayout::Flat => split_flat_draws(group, name, values.clone(), chains)?,
                DrawLayout::ChainDraw => {
                    require_rank(group, name, values, 2, "Chain/draw storage needs chain and draw axes.")?;
                    values.clone()
                }
            };
            arrays.push(self.labeled(group, name, values)?);
        }
        let dataset = Dataset::new(arrays)?;
        debug!(group = %group, vars = dataset.len(), "assembled group");
        Ok(dataset)
    }

    /// Assemble a group without chain/draw axes.
    ///
    /// Errors
    /// ------
    /// - Same label and dtype errors as [`GroupAssembler::chain_indexed`].
    pub fn unindexed(&mut self, group: Group, vars: &VarMap) -> ConvertResult<Dataset> {
        let arrays = vars
            .iter()
            .map(|(name, values)| self.labeled(group, name, values.clone()))
            .collect::<ConvertResult<Vec<_>>>()?;
        let dataset = Dataset::new(arrays)?;
        debug!(group = %group, vars = dataset.len(), "assembled group");
        Ok(dataset)
    }

    fn labeled(&mut self, group: Group, name: &str, values: Values) -> ConvertResult<DataArray> {
        let (dims, coords) = self.context.resolve(group, name, values.shape(), self.opts)?;
        Ok(DataArray::new(name, values, dims, coords)?)
    }
}

/// Split a flat leading draws axis into `chains × draws / chains`.
///
/// Errors
/// ------
/// - `ConvertError::ShapeMismatch` when `values` is 0-d or its leading extent
///   is not a multiple of `chains`.
pub fn split_flat_draws(
    group: Group, var: &str, values: Values, chains: usize,
) -> ConvertResult<Values> {
    require_rank(group, var, &values, 1, "Flat draws need a leading draws axis.")?;
    let total = values.shape()[0];
    if chains == 0 || total % chains != 0 {
        return Err(ConvertError::ShapeMismatch {
            context: format!("{group}.{var}"),
            expected: chains,
            actual: total,
            reason: "The flat draw count must be divisible by num_chains.",
        });
    }
    if chains == 1 {
        return Ok(values.with_unit_chain());
    }
    debug!(group = %group, var, chains, draws = total / chains, "split flat draws");
    values.split_draws(chains).map_err(|_| ConvertError::ShapeMismatch {
        context: format!("{group}.{var}"),
        expected: chains,
        actual: total,
        reason: "Flat draws could not be reshaped to chain × draw.",
    })
}

fn require_rank(
    group: Group, var: &str, values: &Values, min: usize, reason: &'static str,
) -> ConvertResult<()> {
    if values.ndim() < min {
        return Err(ConvertError::ShapeMismatch {
            context: format!("{group}.{var}"),
            expected: min,
            actual: values.ndim(),
            reason,
        });
    }
    Ok(())
}
