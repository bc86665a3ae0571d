//! Source adapters — the capability interface conversion depends on.
//!
//! - [`InferenceSource`]: trait a backend's run object implements. Only
//!   `draws` is required; sampler statistics and a log-density model are
//!   optional capabilities with "not available" defaults.
//! - [`LogDensityModel`]: trait users implement so pointwise log-likelihood can
//!   be evaluated per posterior draw.
//! - [`SourceAdapter`]: tagged view selected by inspecting which capabilities
//!   a source exposes (`FittedRun` with a model, `SampledRun` without).
//! - [`McmcRun`]: in-memory run bundle implementing [`InferenceSource`].
//! - [`PredictiveDraws`]: plain mapping of predictive arrays plus their
//!   [`DrawLayout`].
//! - [`ParamDraw`]: one posterior draw handed to the model.
//!
//! Convention: `ChainDraw` storage is `chain × draw × shape`; `Flat` storage
//! is `draws × shape` with every draw on the leading axis.
use std::{collections::BTreeMap, sync::Arc};

use ndarray::ArrayD;

use crate::{
    convert::errors::{ConvertError, ConvertResult},
    data::core::{groups::Group, values::VarMap},
};

/// Layout of the leading axes of sample storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawLayout {
    /// Leading axes are `chain × draw`.
    #[default]
    ChainDraw,
    /// One leading axis enumerating every draw.
    Flat,
}

/// One posterior draw: every posterior variable at a fixed `(chain, draw)`.
///
/// Values are widened to `f64` (integers as-is, booleans as `0.0` / `1.0`).
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDraw {
    chain: usize,
    draw: usize,
    params: BTreeMap<String, ArrayD<f64>>,
}

impl ParamDraw {
    pub fn new(chain: usize, draw: usize, params: BTreeMap<String, ArrayD<f64>>) -> Self {
        ParamDraw { chain, draw, params }
    }

    pub fn chain(&self) -> usize {
        self.chain
    }

    pub fn draw(&self) -> usize {
        self.draw
    }

    pub fn get(&self, name: &str) -> Option<&ArrayD<f64>> {
        self.params.get(name)
    }

    /// Value of a single-element parameter (0-d or one element).
    pub fn scalar(&self, name: &str) -> Option<f64> {
        let value = self.params.get(name)?;
        if value.len() == 1 { value.iter().next().copied() } else { None }
    }
}

/// User-implemented generative model able to score observed data.
///
/// Required:
/// - `observed() -> VarMap`: observed-variable bindings used at inference
///   time. Each entry becomes one `observed_data` variable and one
///   `log_likelihood` variable.
/// - `pointwise_log_density(var, draw) -> anyhow::Result<ArrayD<f64>>`: log
///   density of every element of observed variable `var` under `draw`. The
///   result must have exactly the observed array's shape.
///
/// Implementations must be pure per call: conversion may evaluate draws in
/// any order and in parallel.
pub trait LogDensityModel: Send + Sync {
    fn observed(&self) -> VarMap;
    fn pointwise_log_density(&self, var: &str, draw: &ParamDraw) -> anyhow::Result<ArrayD<f64>>;
}

/// Capability interface of a backend run object.
///
/// Required:
/// - `draws() -> Option<&VarMap>`: posterior samples, `None` if the object
///   holds none.
///
/// Optional:
/// - `draws_layout()`: layout of `draws` (default `ChainDraw`).
/// - `sampler_stats()`: diagnostic fields such as `diverging`, stored with
///   the same layout as the draws (default none).
/// - `log_density_model()`: model for pointwise log-likelihood (default
///   none).
pub trait InferenceSource {
    fn draws(&self) -> Option<&VarMap>;

    fn draws_layout(&self) -> DrawLayout {
        DrawLayout::ChainDraw
    }

    fn sampler_stats(&self) -> Option<&VarMap> {
        None
    }

    fn log_density_model(&self) -> Option<&dyn LogDensityModel> {
        None
    }
}

/// Capability-tagged view of a source object.
#[derive(Clone, Copy)]
pub enum SourceAdapter<'a> {
    /// Draws plus a model able to score observed data.
    FittedRun {
        draws: &'a VarMap,
        layout: DrawLayout,
        stats: Option<&'a VarMap>,
        model: &'a dyn LogDensityModel,
    },
    /// Draws (and possibly stats) without a model.
    SampledRun { draws: &'a VarMap, layout: DrawLayout, stats: Option<&'a VarMap> },
}

impl<'a> SourceAdapter<'a> {
    /// Select the adapter variant from the capabilities `source` exposes.
    ///
    /// Errors
    /// ------
    /// - `ConvertError::MissingAccessor { group: Posterior }` when the source
    ///   exposes no draws.
    pub fn inspect(source: &'a dyn InferenceSource) -> ConvertResult<SourceAdapter<'a>> {
        let draws = source.draws().ok_or(ConvertError::MissingAccessor {
            group: Group::Posterior,
            reason: "The source object exposes no posterior draws.",
        })?;
        let layout = source.draws_layout();
        let stats = source.sampler_stats();
        Ok(match source.log_density_model() {
            Some(model) => SourceAdapter::FittedRun { draws, layout, stats, model },
            None => SourceAdapter::SampledRun { draws, layout, stats },
        })
    }

    pub fn draws(&self) -> &'a VarMap {
        match *self {
            SourceAdapter::FittedRun { draws, .. } | SourceAdapter::SampledRun { draws, .. } => {
                draws
            }
        }
    }

    pub fn layout(&self) -> DrawLayout {
        match *self {
            SourceAdapter::FittedRun { layout, .. } | SourceAdapter::SampledRun { layout, .. } => {
                layout
            }
        }
    }

    pub fn sampler_stats(&self) -> Option<&'a VarMap> {
        match *self {
            SourceAdapter::FittedRun { stats, .. } | SourceAdapter::SampledRun { stats, .. } => {
                stats
            }
        }
    }

    pub fn model(&self) -> Option<&'a dyn LogDensityModel> {
        match *self {
            SourceAdapter::FittedRun { model, .. } => Some(model),
            SourceAdapter::SampledRun { .. } => None,
        }
    }
}

impl std::fmt::Debug for SourceAdapter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            SourceAdapter::FittedRun { .. } => "FittedRun",
            SourceAdapter::SampledRun { .. } => "SampledRun",
        };
        f.debug_struct(kind)
            .field("draws", &self.draws().keys().collect::<Vec<_>>())
            .field("layout", &self.layout())
            .field("has_stats", &self.sampler_stats().is_some())
            .finish()
    }
}

/// In-memory MCMC run: draws, optional sampler statistics and an optional
/// model.
#[derive(Clone)]
pub struct McmcRun {
    draws: VarMap,
    layout: DrawLayout,
    stats: Option<VarMap>,
    model: Option<Arc<dyn LogDensityModel>>,
}

impl McmcRun {
    /// Run with `chain × draw × shape` draws and no other capability.
    pub fn new(draws: VarMap) -> Self {
        McmcRun { draws, layout: DrawLayout::ChainDraw, stats: None, model: None }
    }

    pub fn with_layout(mut self, layout: DrawLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_stats(mut self, stats: VarMap) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_model(mut self, model: Arc<dyn LogDensityModel>) -> Self {
        self.model = Some(model);
        self
    }
}

impl InferenceSource for McmcRun {
    fn draws(&self) -> Option<&VarMap> {
        Some(&self.draws)
    }

    fn draws_layout(&self) -> DrawLayout {
        self.layout
    }

    fn sampler_stats(&self) -> Option<&VarMap> {
        self.stats.as_ref()
    }

    fn log_density_model(&self) -> Option<&dyn LogDensityModel> {
        self.model.as_deref()
    }
}

/// Predictive samples as a plain mapping of arrays.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PredictiveDraws {
    vars: VarMap,
    layout: DrawLayout,
}

impl PredictiveDraws {
    /// Samples with every draw on the leading axis, as predictive samplers
    /// return them.
    pub fn flat(vars: VarMap) -> Self {
        PredictiveDraws { vars, layout: DrawLayout::Flat }
    }

    /// Samples already shaped `chain × draw × shape`.
    pub fn grouped(vars: VarMap) -> Self {
        PredictiveDraws { vars, layout: DrawLayout::ChainDraw }
    }

    pub fn vars(&self) -> &VarMap {
        &self.vars
    }

    pub fn layout(&self) -> DrawLayout {
        self.layout
    }
}
