//! Derived groups — sampler statistics and pointwise log-likelihood.
//!
//! Purpose
//! -------
//! Produce the two groups that are not supplied directly by the caller:
//! `sample_stats`, copied from the sampler's diagnostics, and
//! `log_likelihood`, evaluated from the posterior through a
//! [`LogDensityModel`].
//!
//! Key behaviors
//! -------------
//! - [`log_likelihood_targets`] turns the caller's request into the list of
//!   observed variables to evaluate, or `None` when the group is skipped.
//! - [`pointwise_log_likelihood`] evaluates each target once per posterior
//!   draw, fanning the draws out over `rayon`, and stacks the results into
//!   `chain × draw × obs-shape` arrays.
//! - [`sample_stats`] copies diagnostics unchanged; it never derives values
//!   from the posterior.
//!
//! Invariants & assumptions
//! ------------------------
//! - Each observed variable yields its own log-likelihood entry.
//! - Results are placed by `(chain, draw)` index, so the output does not
//!   depend on scheduling order.
//! - Each worker builds its own `ParamDraw` from the posterior cell it
//!   evaluates; no draw is materialized ahead of evaluation.
//! - The model sees only widened `f64` copies of the posterior; nothing is
//!   shared mutably between draws.
use std::collections::BTreeMap;

use ndarray::{ArrayD, IxDyn};
use rayon::prelude::*;
use tracing::debug;

use crate::{
    convert::{
        assembler::GroupAssembler,
        errors::{ConvertError, ConvertResult},
        options::LogLikelihoodRequest,
        source::{DrawLayout, LogDensityModel, ParamDraw},
    },
    data::core::{
        dataset::Dataset,
        groups::Group,
        values::{Values, VarMap},
    },
};

/// Copy sampler diagnostics into `sample_stats`.
///
/// Errors
/// ------
/// - Same as [`GroupAssembler::chain_indexed`].
pub fn sample_stats(
    assembler: &mut GroupAssembler<'_>, stats: &VarMap, layout: DrawLayout, chains: usize,
) -> ConvertResult<Dataset> {
    assembler.chain_indexed(Group::SampleStats, stats, layout, chains)
}

/// Observed variables whose log-likelihood should be computed.
///
/// Returns
/// -------
/// - `None` when the group is skipped (disabled, or `Auto` without a model).
/// - `Some(names)` otherwise, in observed-variable order for `Auto` and in
///   request order for `Only`.
///
/// Errors
/// ------
/// - `ConvertError::MissingAccessor { group: LogLikelihood }` for an `Only`
///   request without a model, or naming a variable the model does not
///   observe.
pub fn log_likelihood_targets(
    request: &LogLikelihoodRequest, model: Option<&dyn LogDensityModel>, observed: &VarMap,
) -> ConvertResult<Option<Vec<String>>> {
    match (request, model) {
        (LogLikelihoodRequest::Disabled, _) => Ok(None),
        (LogLikelihoodRequest::Auto, None) => {
            debug!("no log-density model available, skipping log_likelihood");
            Ok(None)
        }
        (LogLikelihoodRequest::Auto, Some(_)) => Ok(Some(observed.keys().cloned().collect())),
        (LogLikelihoodRequest::Only(_), None) => Err(ConvertError::MissingAccessor {
            group: Group::LogLikelihood,
            reason: "The source exposes no log-density model.",
        }),
        (LogLikelihoodRequest::Only(names), Some(_)) => {
            if names.iter().any(|name| !observed.contains_key(name)) {
                return Err(ConvertError::MissingAccessor {
                    group: Group::LogLikelihood,
                    reason: "Every requested variable must be observed by the model.",
                });
            }
            Ok(Some(names.clone()))
        }
    }
}

/// Pointwise log-likelihood of observed variables under every posterior draw.
///
/// Parameters
/// ----------
/// - `posterior`: assembled posterior; every variable leads with
///   `chain × draw`.
/// - `model`: evaluator.
/// - `observed`: observed arrays, used for the expected output shapes.
/// - `targets`: names to evaluate; each must be in `observed`.
///
/// Returns
/// -------
/// - One `chain × draw × obs-shape` float array per target.
///
/// Errors
/// ------
/// - `ConvertError::LogDensityFailed` when the model returns an error.
/// - `ConvertError::ShapeMismatch` when a per-draw result does not have the
///   observed array's shape.
/// - `ConvertError::MissingAccessor` when a target is not in `observed`.
pub fn pointwise_log_likelihood(
    posterior: &Dataset, model: &dyn LogDensityModel, observed: &VarMap, targets: &[String],
) -> ConvertResult<VarMap> {
    let dims = posterior.dims();
    let chains = dims.get("chain").copied().unwrap_or(0);
    let draws = dims.get("draw").copied().unwrap_or(0);

    let mut out = VarMap::new();
    for var in targets {
        let obs_shape = observed
            .get(var)
            .ok_or(ConvertError::MissingAccessor {
                group: Group::LogLikelihood,
                reason: "Every requested variable must be observed by the model.",
            })?
            .shape();
        let per_draw = (0..chains * draws)
            .into_par_iter()
            .map(|i| evaluate(model, var, &param_draw(posterior, i / draws, i % draws), obs_shape))
            .collect::<ConvertResult<Vec<ArrayD<f64>>>>()?;

        let mut shape = vec![chains, draws];
        shape.extend_from_slice(obs_shape);
        let flat: Vec<f64> = per_draw.iter().flat_map(|a| a.iter().copied()).collect();
        let stacked = ArrayD::from_shape_vec(IxDyn(&shape), flat).map_err(|_| {
            ConvertError::ShapeMismatch {
                context: format!("log_likelihood.{var}"),
                expected: shape.iter().product(),
                actual: per_draw.iter().map(|a| a.len()).sum(),
                reason: "Per-draw log densities could not be stacked to chain × draw.",
            }
        })?;
        debug!(var = %var, chains, draws, "computed pointwise log-likelihood");
        out.insert(var.clone(), Values::Float(stacked));
    }
    Ok(out)
}

fn param_draw(posterior: &Dataset, chain: usize, draw: usize) -> ParamDraw {
    let params: BTreeMap<String, ArrayD<f64>> = posterior
        .iter()
        .filter_map(|(name, array)| {
            array.values().draw_cell(chain, draw).to_f64().map(|v| (name.clone(), v))
        })
        .collect();
    ParamDraw::new(chain, draw, params)
}

fn evaluate(
    model: &dyn LogDensityModel, var: &str, draw: &ParamDraw, obs_shape: &[usize],
) -> ConvertResult<ArrayD<f64>> {
    let values = model.pointwise_log_density(var, draw).map_err(|err| {
        ConvertError::LogDensityFailed { var: var.to_string(), message: format!("{err:#}") }
    })?;
    if values.shape() != obs_shape {
        let (expected, actual) = first_mismatch(obs_shape, values.shape());
        return Err(ConvertError::ShapeMismatch {
            context: format!("log_likelihood.{var} (chain {}, draw {})", draw.chain(), draw.draw()),
            expected,
            actual,
            reason: "Pointwise log density must have the observed array's shape.",
        });
    }
    Ok(values)
}

// Rank difference if ranks differ, else the first differing extent.
fn first_mismatch(expected: &[usize], actual: &[usize]) -> (usize, usize) {
    if expected.len() != actual.len() {
        return (expected.len(), actual.len());
    }
    expected
        .iter()
        .zip(actual)
        .find(|(e, a)| e != a)
        .map_or((0, 0), |(e, a)| (*e, *a))
}
