//! Conversion entry point.
//!
//! Purpose
//! -------
//! Run the whole pipeline (source inspection, label resolution, group
//! assembly, derived groups, container validation) for one set of inputs and
//! return an immutable [`InferenceData`].
//!
//! Key behaviors
//! -------------
//! - Every input is optional; the result holds exactly the groups that
//!   received at least one variable.
//! - Groups are assembled in a fixed order (posterior, sample_stats,
//!   log_likelihood, posterior_predictive, observed_data, prior,
//!   prior_predictive, constant_data, predictions, predictions_constant_data),
//!   which decides the resolution a variable inherits when it appears in
//!   several groups.
//! - `sample_stats` and `log_likelihood` exist only when a posterior with at
//!   least one variable does.
//! - `predictions` may use its own chain count only when `pred_dims` labels
//!   a variable that is supplied on the prediction side.
//!
//! Invariants & assumptions
//! ------------------------
//! - Construction is all-or-nothing: the first error aborts the conversion
//!   and nothing is returned.
//! - Inputs are borrowed and never modified.
//!
//! Downstream usage
//! ----------------
//! - Build a [`ConvertInputs`] with the chaining setters, a
//!   [`ConvertOptions`], and call [`convert`]. Partial results can be
//!   combined afterwards with `InferenceData::merge`.
use tracing::debug;

use crate::{
    convert::{
        assembler::GroupAssembler,
        deriver::{log_likelihood_targets, pointwise_log_likelihood, sample_stats},
        errors::{ConvertError, ConvertResult},
        options::{ConvertOptions, LogLikelihoodRequest},
        source::{DrawLayout, InferenceSource, PredictiveDraws, SourceAdapter},
    },
    data::core::{
        dataset::Dataset, groups::Group, inference_data::InferenceData, values::VarMap,
    },
};

/// Borrowed inputs of one conversion.
///
/// Fields
/// ------
/// - `posterior`: run object supplying posterior draws and, optionally,
///   sampler statistics and a log-density model.
/// - `prior`, `prior_predictive`, `posterior_predictive`, `predictions`:
///   predictive samples.
/// - `observed_data`: explicit observed values; overrides the model's
///   bindings.
/// - `constant_data`, `predictions_constant_data`: fixed inputs.
#[derive(Clone, Copy, Default)]
pub struct ConvertInputs<'a> {
    pub posterior: Option<&'a dyn InferenceSource>,
    pub prior: Option<&'a PredictiveDraws>,
    pub prior_predictive: Option<&'a PredictiveDraws>,
    pub posterior_predictive: Option<&'a PredictiveDraws>,
    pub predictions: Option<&'a PredictiveDraws>,
    pub observed_data: Option<&'a VarMap>,
    pub constant_data: Option<&'a VarMap>,
    pub predictions_constant_data: Option<&'a VarMap>,
}

impl<'a> ConvertInputs<'a> {
    pub fn new() -> Self {
        ConvertInputs::default()
    }

    pub fn with_posterior(mut self, source: &'a dyn InferenceSource) -> Self {
        self.posterior = Some(source);
        self
    }

    pub fn with_prior(mut self, draws: &'a PredictiveDraws) -> Self {
        self.prior = Some(draws);
        self
    }

    pub fn with_prior_predictive(mut self, draws: &'a PredictiveDraws) -> Self {
        self.prior_predictive = Some(draws);
        self
    }

    pub fn with_posterior_predictive(mut self, draws: &'a PredictiveDraws) -> Self {
        self.posterior_predictive = Some(draws);
        self
    }

    pub fn with_predictions(mut self, draws: &'a PredictiveDraws) -> Self {
        self.predictions = Some(draws);
        self
    }

    pub fn with_observed_data(mut self, vars: &'a VarMap) -> Self {
        self.observed_data = Some(vars);
        self
    }

    pub fn with_constant_data(mut self, vars: &'a VarMap) -> Self {
        self.constant_data = Some(vars);
        self
    }

    pub fn with_predictions_constant_data(mut self, vars: &'a VarMap) -> Self {
        self.predictions_constant_data = Some(vars);
        self
    }
}

/// Convert borrowed inference outputs into an [`InferenceData`].
///
/// Parameters
/// ----------
/// - `inputs`: the sources to convert; any subset may be present.
/// - `opts`: labels, log-likelihood request and chain count.
///
/// Returns
/// -------
/// - A validated container with one group per non-empty input, plus
///   `sample_stats` / `log_likelihood` when derivable.
///
/// Errors
/// ------
/// - `ConvertError::MissingAccessor` when the posterior source exposes no
///   draws, or a requested log-likelihood cannot be computed.
/// - `ConvertError::ShapeMismatch` for label / extent disagreements and
///   non-divisible flat draws.
/// - `ConvertError::UnsupportedDtype` for text storage or dtype-family
///   conflicts between groups.
/// - `ConvertError::LogDensityFailed` when the model fails on a draw.
///
/// Notes
/// -----
/// - Flat draws use `opts.num_chains` when set; otherwise posterior-derived
///   groups follow the posterior's chain count (1 without a posterior) and
///   prior-derived groups use 1.
pub fn convert(inputs: &ConvertInputs<'_>, opts: &ConvertOptions) -> ConvertResult<InferenceData> {
    let source = inputs.posterior.map(SourceAdapter::inspect).transpose()?;
    let mut assembler = GroupAssembler::new(opts);
    let mut groups: Vec<(Group, Dataset)> = Vec::new();
    let mut posterior_chains = None;
    let mut model_observed = None;

    match source {
        Some(source) => {
            let layout = source.layout();
            let chains = opts.num_chains.unwrap_or(1);
            let posterior = assembler.chain_indexed(Group::Posterior, source.draws(), layout, chains)?;
            posterior_chains = posterior.dims().get("chain").copied();

            let observed = source.model().map(|model| model.observed()).unwrap_or_default();
            let targets = log_likelihood_targets(&opts.log_likelihood, source.model(), &observed)?;

            if posterior.is_empty() {
                debug!("posterior holds no variables, skipping sample_stats and log_likelihood");
            } else {
                if let Some(stats) = source.sampler_stats() {
                    let ds = sample_stats(&mut assembler, stats, layout, chains)?;
                    groups.push((Group::SampleStats, ds));
                }
                if let (Some(model), Some(targets)) = (source.model(), targets) {
                    let ll = pointwise_log_likelihood(&posterior, model, &observed, &targets)?;
                    let ds = assembler.chain_indexed(
                        Group::LogLikelihood,
                        &ll,
                        DrawLayout::ChainDraw,
                        1,
                    )?;
                    groups.push((Group::LogLikelihood, ds));
                }
            }
            if source.model().is_some() {
                model_observed = Some(observed);
            }
            groups.push((Group::Posterior, posterior));
        }
        None if matches!(opts.log_likelihood, LogLikelihoodRequest::Only(_)) => {
            return Err(ConvertError::MissingAccessor {
                group: Group::LogLikelihood,
                reason: "No posterior source was supplied.",
            });
        }
        None => {}
    }

    let posterior_side_chains = opts.num_chains.or(posterior_chains).unwrap_or(1);
    let prior_side_chains = opts.num_chains.unwrap_or(1);

    if let Some(draws) = inputs.posterior_predictive {
        groups.push((
            Group::PosteriorPredictive,
            assembler.chain_indexed(
                Group::PosteriorPredictive,
                draws.vars(),
                draws.layout(),
                posterior_side_chains,
            )?,
        ));
    }

    if let Some(observed) = inputs.observed_data.or(model_observed.as_ref()) {
        groups.push((Group::ObservedData, assembler.unindexed(Group::ObservedData, observed)?));
    }

    for (group, draws) in
        [(Group::Prior, inputs.prior), (Group::PriorPredictive, inputs.prior_predictive)]
    {
        if let Some(draws) = draws {
            let ds =
                assembler.chain_indexed(group, draws.vars(), draws.layout(), prior_side_chains)?;
            groups.push((group, ds));
        }
    }

    if let Some(vars) = inputs.constant_data {
        groups.push((Group::ConstantData, assembler.unindexed(Group::ConstantData, vars)?));
    }

    if let Some(draws) = inputs.predictions {
        groups.push((
            Group::Predictions,
            assembler.chain_indexed(
                Group::Predictions,
                draws.vars(),
                draws.layout(),
                posterior_side_chains,
            )?,
        ));
    }

    if let Some(vars) = inputs.predictions_constant_data {
        groups.push((
            Group::PredictionsConstantData,
            assembler.unindexed(Group::PredictionsConstantData, vars)?,
        ));
    }

    let idata = InferenceData::with_prediction_convention(
        groups,
        names_prediction_variable(opts, inputs.predictions, inputs.predictions_constant_data),
    )?;
    debug!(groups = idata.len(), "conversion finished");
    Ok(idata)
}

/// Whether some `pred_dims` entry labels a variable that is actually
/// supplied on the prediction side. Entries naming absent variables are
/// ignored.
fn names_prediction_variable(
    opts: &ConvertOptions, predictions: Option<&PredictiveDraws>,
    predictions_constant_data: Option<&VarMap>,
) -> bool {
    opts.pred_dims.keys().any(|var| {
        predictions.is_some_and(|draws| draws.vars().contains_key(var))
            || predictions_constant_data.is_some_and(|vars| vars.contains_key(var))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::source::McmcRun;
    use crate::data::core::values::Values;
    use ndarray::{Array1, Array2, Array3};

    #[test]
    // Purpose
    // -------
    // Fixed inputs alone give a container with exactly that group.
    fn constant_data_alone_yields_single_group() {
        let constants = VarMap::from([("J".to_string(), Values::from(8_i64))]);
        let inputs = ConvertInputs::new().with_constant_data(&constants);

        let idata = convert(&inputs, &ConvertOptions::default()).unwrap();

        assert_eq!(idata.groups().collect::<Vec<_>>(), vec![Group::ConstantData]);
        assert_eq!(idata.constant_data().unwrap()["J"].shape(), &[] as &[usize]);
    }

    #[test]
    // Purpose
    // -------
    // Predictive groups follow the posterior's chain count when no explicit
    // `num_chains` is given.
    //
    // Given
    // -----
    // - posterior `mu` with 2 chains × 5 draws.
    // - flat posterior_predictive `y` with 10 draws × 3 points.
    //
    // Expect
    // ------
    // - posterior_predictive `y` has 2 chains × 5 draws.
    fn predictive_flat_draws_follow_posterior_chains() {
        let run = McmcRun::new(VarMap::from([(
            "mu".to_string(),
            Values::from(Array2::<f64>::zeros((2, 5))),
        )]));
        let pp = PredictiveDraws::flat(VarMap::from([(
            "y".to_string(),
            Values::from(Array2::<f64>::zeros((10, 3))),
        )]));
        let inputs = ConvertInputs::new().with_posterior(&run).with_posterior_predictive(&pp);

        let idata = convert(&inputs, &ConvertOptions::default()).unwrap();

        let dims = idata.posterior_predictive().unwrap().dims();
        assert_eq!((dims["chain"], dims["draw"], dims["y_dim_0"]), (2, 5, 3));
        assert!(idata.log_likelihood().is_none());
        assert!(idata.observed_data().is_none());
    }

    #[test]
    // Purpose
    // -------
    // Asking for specific log-likelihood variables without a posterior or a
    // model is a missing-accessor error, not a silent skip.
    fn explicit_log_likelihood_request_needs_a_model() {
        let only = ConvertOptions::default()
            .with_log_likelihood(LogLikelihoodRequest::Only(vec!["y".into()]));

        let err = convert(&ConvertInputs::new(), &only).unwrap_err();
        assert!(matches!(err, ConvertError::MissingAccessor { group: Group::LogLikelihood, .. }));

        let run = McmcRun::new(VarMap::from([(
            "mu".to_string(),
            Values::from(Array3::<f64>::zeros((1, 4, 1))),
        )]));
        let inputs = ConvertInputs::new().with_posterior(&run);
        assert!(convert(&inputs, &only).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Sampler statistics are dropped when the posterior holds no variables.
    //
    // Given
    // -----
    // - a run with empty draws and `diverging` flags of shape 4 × 500.
    //
    // Expect
    // ------
    // - an empty container: no posterior, no sample_stats.
    fn sample_stats_need_a_non_empty_posterior() {
        let run = McmcRun::new(VarMap::new()).with_stats(VarMap::from([(
            "diverging".to_string(),
            Values::from(Array2::from_elem((4, 500), false)),
        )]));
        let inputs = ConvertInputs::new().with_posterior(&run);

        let idata = convert(&inputs, &ConvertOptions::default()).unwrap();

        assert!(idata.is_empty());
        assert!(idata.sample_stats().is_none());
    }

    #[test]
    // Purpose
    // -------
    // Text storage is rejected with a typed error and nothing is returned.
    fn text_storage_aborts_the_conversion() {
        let constants = VarMap::from([(
            "label".to_string(),
            Values::from(Array1::from(vec!["a".to_string(), "b".to_string()])),
        )]);
        let inputs = ConvertInputs::new().with_constant_data(&constants);

        let err = convert(&inputs, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedDtype { dtype: "str", .. }));
    }
}
