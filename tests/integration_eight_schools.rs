//! Integration tests for converting eight-schools inference outputs.
//!
//! Purpose
//! -------
//! - Validate the end-to-end conversion path: from run objects and
//!   predictive sample maps, through label resolution and group assembly, to
//!   a validated `InferenceData` container and its merge.
//! - Use the classic eight-schools hierarchical model (8 schools, known
//!   standard errors) with realistic chain and draw counts.
//!
//! Coverage
//! --------
//! - `convert::convert` with every kind of input, alone and together.
//! - `convert::source::LogDensityModel` driving pointwise log-likelihood,
//!   checked against `statrs` normal densities.
//! - `convert::options::ConvertOptions`: coords, dims, pred_dims and
//!   `num_chains`.
//! - `data::core::inference_data::InferenceData::merge` under both policies.
//!
//! Exclusions
//! ----------
//! - Low-level validation rules and label resolution precedence, which are
//!   covered by unit tests next to their modules.
//! - Python bindings.
use std::sync::Arc;

use approx::assert_relative_eq;
use inference_data::{
    Coordinate, ConvertError, ConvertInputs, ConvertOptions, DataError, DrawLayout, Group,
    InferenceData, LogDensityModel, LogLikelihoodRequest, McmcRun, MergePolicy, ParamDraw,
    PredictiveDraws, Values, VarMap, convert,
};
use ndarray::{Array1, Array2, Array3, ArrayD, IxDyn};
use statrs::distribution::{Continuous, Normal};

const Y: [f64; 8] = [28.0, 8.0, -3.0, 7.0, -1.0, 1.0, 18.0, 12.0];
const SIGMA: [f64; 8] = [15.0, 10.0, 16.0, 11.0, 9.0, 11.0, 10.0, 18.0];
const TAU_OBS: [f64; 2] = [4.0, 6.5];

/// Eight-schools likelihood with two observed variables.
///
/// - `y[j] ~ Normal(theta[j], sigma[j])`
/// - `tau_obs[k] ~ Normal(mu, 10)`
struct EightSchools;

impl LogDensityModel for EightSchools {
    fn observed(&self) -> VarMap {
        VarMap::from([
            ("y".to_string(), Values::from(Array1::from(Y.to_vec()))),
            ("tau_obs".to_string(), Values::from(Array1::from(TAU_OBS.to_vec()))),
        ])
    }

    fn pointwise_log_density(&self, var: &str, draw: &ParamDraw) -> anyhow::Result<ArrayD<f64>> {
        match var {
            "y" => {
                let theta =
                    draw.get("theta").ok_or_else(|| anyhow::anyhow!("theta missing from draw"))?;
                let logp = theta
                    .iter()
                    .zip(Y.iter().zip(SIGMA.iter()))
                    .map(|(&t, (&y, &s))| normal_ln_pdf(t, s, y))
                    .collect::<anyhow::Result<Vec<f64>>>()?;
                Ok(ArrayD::from_shape_vec(IxDyn(&[Y.len()]), logp)?)
            }
            "tau_obs" => {
                let mu = draw.scalar("mu").ok_or_else(|| anyhow::anyhow!("mu missing from draw"))?;
                let logp = TAU_OBS
                    .iter()
                    .map(|&x| normal_ln_pdf(mu, 10.0, x))
                    .collect::<anyhow::Result<Vec<f64>>>()?;
                Ok(ArrayD::from_shape_vec(IxDyn(&[TAU_OBS.len()]), logp)?)
            }
            other => anyhow::bail!("{other} is not observed"),
        }
    }
}

fn normal_ln_pdf(mean: f64, sd: f64, x: f64) -> anyhow::Result<f64> {
    let dist = Normal::new(mean, sd).map_err(|e| anyhow::anyhow!("invalid normal: {e:?}"))?;
    Ok(dist.ln_pdf(x))
}

/// Purpose
/// -------
/// Build deterministic posterior draws for the eight-schools model.
///
/// Returns
/// -------
/// - `mu`, `tau`: `chains × draws`.
/// - `theta`: `chains × draws × 8`, centred near the observed effects.
fn posterior_draws(chains: usize, draws: usize) -> VarMap {
    let mu = Array2::from_shape_fn((chains, draws), |(c, d)| 4.0 + 0.01 * (c * draws + d) as f64);
    let tau = Array2::from_shape_fn((chains, draws), |(c, d)| 1.0 + 0.001 * (c + d) as f64);
    let theta = Array3::from_shape_fn((chains, draws, 8), |(c, d, j)| {
        0.5 * Y[j] + 0.002 * (c * draws + d) as f64
    });
    VarMap::from([
        ("mu".to_string(), Values::from(mu)),
        ("tau".to_string(), Values::from(tau)),
        ("theta".to_string(), Values::from(theta)),
    ])
}

fn diverging(chains: usize, draws: usize) -> VarMap {
    let flags = Array2::from_shape_fn((chains, draws), |(_, d)| d % 97 == 0);
    VarMap::from([("diverging".to_string(), Values::from(flags))])
}

fn group_names(idata: &InferenceData) -> Vec<&'static str> {
    idata.groups().map(Group::as_str).collect()
}

#[test]
// Purpose
// -------
// A sampled run without a model yields exactly posterior + sample_stats with
// default labels.
//
// Given
// -----
// - posterior `mu`, `tau` (4 × 500) and `theta` (4 × 500 × 8).
// - sampler stats `diverging` (4 × 500).
//
// Expect
// ------
// - groups: posterior, sample_stats.
// - theta dims `[chain, draw, theta_dim_0]`; diverging dims `[chain, draw]`.
fn sampled_run_yields_posterior_and_sample_stats() {
    let run = McmcRun::new(posterior_draws(4, 500)).with_stats(diverging(4, 500));
    let inputs = ConvertInputs::new().with_posterior(&run);

    let idata = convert(&inputs, &ConvertOptions::default()).unwrap();

    assert_eq!(group_names(&idata), vec!["posterior", "sample_stats"]);
    let posterior = idata.posterior().unwrap();
    assert_eq!(posterior["theta"].dims(), &["chain", "draw", "theta_dim_0"]);
    assert_eq!(posterior["theta"].shape(), &[4, 500, 8]);
    assert_eq!(posterior["mu"].dims(), &["chain", "draw"]);

    let stats = idata.sample_stats().unwrap();
    assert_eq!(stats["diverging"].dims(), &["chain", "draw"]);
    assert_eq!(stats["diverging"].shape(), &[4, 500]);
    assert_eq!(stats["diverging"].coord("chain"), Some(&Coordinate::range(4)));
}

#[test]
// Purpose
// -------
// A fitted run with two observed variables yields one log-likelihood and one
// observed-data entry per observed variable, matching closed-form densities.
//
// Given
// -----
// - posterior 2 chains × 25 draws, stats `diverging`.
// - model observing `y` (8) and `tau_obs` (2).
//
// Expect
// ------
// - log_likelihood and observed_data each hold exactly `{tau_obs, y}`.
// - sample_stats holds no log-likelihood entry.
// - `log_likelihood.y[c, d, j] == Normal(theta[c, d, j], sigma[j]).ln_pdf(y[j])`.
fn fitted_run_yields_pointwise_log_likelihood_per_observed_variable() {
    let draws = posterior_draws(2, 25);
    let theta = draws["theta"].as_float().unwrap().clone();
    let mu = draws["mu"].as_float().unwrap().clone();
    let run = McmcRun::new(draws).with_stats(diverging(2, 25)).with_model(Arc::new(EightSchools));
    let opts = ConvertOptions::default().with_dims("theta", ["school"]).with_dims("y", ["school"]);

    let idata = convert(&ConvertInputs::new().with_posterior(&run), &opts).unwrap();

    assert_eq!(
        group_names(&idata),
        vec!["posterior", "sample_stats", "log_likelihood", "observed_data"]
    );
    let ll = idata.log_likelihood().unwrap();
    let observed = idata.observed_data().unwrap();
    assert_eq!(ll.var_names().collect::<Vec<_>>(), vec!["tau_obs", "y"]);
    assert_eq!(observed.var_names().collect::<Vec<_>>(), vec!["tau_obs", "y"]);
    assert_eq!(idata.sample_stats().unwrap().var_names().collect::<Vec<_>>(), vec!["diverging"]);

    assert_eq!(ll["y"].dims(), &["chain", "draw", "school"]);
    assert_eq!(ll["y"].shape(), &[2, 25, 8]);
    assert_eq!(observed["y"].dims(), &["school"]);
    assert_eq!(ll["tau_obs"].shape(), &[2, 25, 2]);

    let ll_y = ll["y"].values().as_float().unwrap();
    for (c, d, j) in [(0, 0, 0), (1, 24, 7), (0, 13, 3)] {
        let expected = Normal::new(theta[[c, d, j]], SIGMA[j]).unwrap().ln_pdf(Y[j]);
        assert_relative_eq!(ll_y[[c, d, j]], expected, epsilon = 1e-12);
    }
    let ll_tau = ll["tau_obs"].values().as_float().unwrap();
    let expected = Normal::new(mu[[1, 3]], 10.0).unwrap().ln_pdf(TAU_OBS[1]);
    assert_relative_eq!(ll_tau[[1, 3, 1]], expected, epsilon = 1e-12);
}

#[test]
// Purpose
// -------
// Disabling log-likelihood keeps observed data but skips the derived group;
// restricting it evaluates only the named variable.
fn log_likelihood_request_controls_the_derived_group() {
    let run = McmcRun::new(posterior_draws(2, 10)).with_model(Arc::new(EightSchools));
    let inputs = ConvertInputs::new().with_posterior(&run);

    let disabled = ConvertOptions::default().with_log_likelihood(false);
    let idata = convert(&inputs, &disabled).unwrap();
    assert!(idata.log_likelihood().is_none());
    assert_eq!(idata.observed_data().unwrap().len(), 2);

    let only_y =
        ConvertOptions::default().with_log_likelihood(LogLikelihoodRequest::Only(vec!["y".into()]));
    let idata = convert(&inputs, &only_y).unwrap();
    assert_eq!(idata.log_likelihood().unwrap().var_names().collect::<Vec<_>>(), vec!["y"]);
}

#[test]
// Purpose
// -------
// Each input kind supplied alone yields exactly its own group and variables.
fn each_input_alone_yields_exactly_its_group() {
    let flat = PredictiveDraws::flat(VarMap::from([(
        "obs".to_string(),
        Values::from(Array2::<f64>::zeros((40, 8))),
    )]));
    let fixed = VarMap::from([("J".to_string(), Values::from(8_i64))]);
    let opts = ConvertOptions::default();

    let cases: Vec<(ConvertInputs<'_>, &str)> = vec![
        (ConvertInputs::new().with_prior(&flat), "prior"),
        (ConvertInputs::new().with_prior_predictive(&flat), "prior_predictive"),
        (ConvertInputs::new().with_posterior_predictive(&flat), "posterior_predictive"),
        (ConvertInputs::new().with_predictions(&flat), "predictions"),
        (ConvertInputs::new().with_observed_data(&fixed), "observed_data"),
        (ConvertInputs::new().with_constant_data(&fixed), "constant_data"),
        (ConvertInputs::new().with_predictions_constant_data(&fixed), "predictions_constant_data"),
    ];
    for (inputs, expected) in cases {
        let idata = convert(&inputs, &opts).unwrap();
        assert_eq!(group_names(&idata), vec![expected]);
        let ds = idata.group(expected.parse().unwrap()).unwrap();
        assert_eq!(ds.len(), 1);
    }

    let empty = convert(&ConvertInputs::new(), &opts).unwrap();
    assert!(empty.is_empty());
}

#[test]
// Purpose
// -------
// User coords and dims are recoverable from the container.
//
// Given
// -----
// - coords `school = [Choate, ..., Mt. Hermon]`, dims `theta: [school]`.
// - constant data `sigma` with dims `[school]`.
//
// Expect
// ------
// - posterior and constant_data carry the same school labels.
fn coords_and_dims_are_recoverable() {
    let schools = vec![
        "Choate", "Deerfield", "Phillips Andover", "Phillips Exeter", "Hotchkiss", "Lawrenceville",
        "St. Paul's", "Mt. Hermon",
    ];
    let opts = ConvertOptions::default()
        .with_coord("school", schools.clone())
        .with_dims("theta", ["school"])
        .with_dims("sigma", ["school"]);
    let run = McmcRun::new(posterior_draws(4, 20));
    let constants =
        VarMap::from([("sigma".to_string(), Values::from(Array1::from(SIGMA.to_vec())))]);
    let inputs = ConvertInputs::new().with_posterior(&run).with_constant_data(&constants);

    let idata = convert(&inputs, &opts).unwrap();

    let theta = &idata.posterior().unwrap()["theta"];
    assert_eq!(theta.dims(), &["chain", "draw", "school"]);
    assert_eq!(theta.coord("school"), Some(&Coordinate::from(schools.clone())));
    let sigma = &idata.constant_data().unwrap()["sigma"];
    assert_eq!(sigma.dims(), &["school"]);
    assert_eq!(sigma.coord("school"), Some(&Coordinate::from(schools)));
    assert_eq!(idata.posterior().unwrap().dims()["school"], 8);
}

#[test]
// Purpose
// -------
// Prior and posterior-predictive samples of the same observed variable
// resolve to the same labels.
//
// Given
// -----
// - coords `school = 0..8`; dims `theta: [school]`, `eta: [school]`.
// - prior `{mu, tau, eta, theta, obs}` and posterior_predictive `{obs}`,
//   each 1 chain × 100 draws.
//
// Expect
// ------
// - `obs` has extent 8 on the same dim in both groups.
fn prior_and_posterior_predictive_share_observed_labels() {
    let opts = ConvertOptions::default()
        .with_coord("school", 0_i64..8)
        .with_dims("theta", ["school"])
        .with_dims("eta", ["school"]);
    let obs = Values::from(Array3::<f64>::zeros((1, 100, 8)));
    let prior = PredictiveDraws::grouped(VarMap::from([
        ("mu".to_string(), Values::from(Array2::<f64>::zeros((1, 100)))),
        ("tau".to_string(), Values::from(Array2::<f64>::ones((1, 100)))),
        ("eta".to_string(), Values::from(Array3::<f64>::zeros((1, 100, 8)))),
        ("theta".to_string(), Values::from(Array3::<f64>::zeros((1, 100, 8)))),
        ("obs".to_string(), obs.clone()),
    ]));
    let pp = PredictiveDraws::grouped(VarMap::from([("obs".to_string(), obs)]));
    let inputs = ConvertInputs::new().with_prior(&prior).with_posterior_predictive(&pp);

    let idata = convert(&inputs, &opts).unwrap();

    assert_eq!(group_names(&idata), vec!["posterior_predictive", "prior"]);
    let prior_obs = &idata.prior().unwrap()["obs"];
    let pp_obs = &idata.posterior_predictive().unwrap()["obs"];
    assert_eq!(prior_obs.dims(), pp_obs.dims());
    assert_eq!(prior_obs.sizes().last(), Some(&("obs_dim_0", 8)));
    assert_eq!(idata.prior().unwrap()["eta"].coord("school"), Some(&Coordinate::range(8)));
}

#[test]
// Purpose
// -------
// Flat draws are split by `num_chains`; a non-divisible count is fatal.
fn flat_draws_split_by_num_chains() {
    let prior = PredictiveDraws::flat(VarMap::from([(
        "mu".to_string(),
        Values::from(Array1::<f64>::zeros(2000)),
    )]));
    let opts = ConvertOptions::default().with_num_chains(4).unwrap();

    let idata = convert(&ConvertInputs::new().with_prior(&prior), &opts).unwrap();
    let dims = idata.prior().unwrap().dims();
    assert_eq!((dims["chain"], dims["draw"]), (4, 500));

    let odd = PredictiveDraws::flat(VarMap::from([(
        "mu".to_string(),
        Values::from(Array1::<f64>::zeros(2001)),
    )]));
    let err = convert(&ConvertInputs::new().with_prior(&odd), &opts).unwrap_err();
    assert!(matches!(err, ConvertError::ShapeMismatch { expected: 4, actual: 2001, .. }));

    assert!(ConvertOptions::default().with_num_chains(0).is_err());
}

#[test]
// Purpose
// -------
// Flat out-of-sample predictions are split into chains and labeled with
// prediction dims.
//
// Given
// -----
// - predictions `obs` of shape (2000, 8), `num_chains = 4`,
//   `pred_dims = {obs: [school_pred]}`.
//
// Expect
// ------
// - predictions dims exactly `{chain: 4, draw: 500, school_pred: 8}`.
fn flat_predictions_use_prediction_dims() {
    let predictions = PredictiveDraws::flat(VarMap::from([(
        "obs".to_string(),
        Values::from(Array2::<f64>::zeros((2000, 8))),
    )]));
    let opts = ConvertOptions::default()
        .with_pred_dims("obs", ["school_pred"])
        .with_num_chains(4)
        .unwrap();

    let idata = convert(&ConvertInputs::new().with_predictions(&predictions), &opts).unwrap();

    let dims = idata.predictions().unwrap().dims();
    assert_eq!(dims.len(), 3);
    assert_eq!((dims["chain"], dims["draw"], dims["school_pred"]), (4, 500, 8));
    assert!(idata.has_distinct_prediction_dims());
}

#[test]
// Purpose
// -------
// Predictions may use their own chain count only when prediction dims are
// given.
//
// Given
// -----
// - posterior with 4 chains; predictions stored as 1 chain × 100 draws.
//
// Expect
// ------
// - without pred_dims: `ShapeMismatch` on the chain count.
// - with pred_dims: accepted.
fn prediction_chain_count_exempt_only_with_pred_dims() {
    let run = McmcRun::new(posterior_draws(4, 25));
    let predictions = PredictiveDraws::grouped(VarMap::from([(
        "obs".to_string(),
        Values::from(Array3::<f64>::zeros((1, 100, 3))),
    )]));
    let inputs = ConvertInputs::new().with_posterior(&run).with_predictions(&predictions);

    let err = convert(&inputs, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::ShapeMismatch { expected: 4, actual: 1, .. }));

    let opts = ConvertOptions::default().with_pred_dims("obs", ["school_pred"]);
    let idata = convert(&inputs, &opts).unwrap();
    assert_eq!(idata.predictions().unwrap().dims()["chain"], 1);
}

#[test]
// Purpose
// -------
// A `pred_dims` entry for a variable that is not supplied is ignored and
// grants no chain-count exemption.
//
// Given
// -----
// - posterior with 4 chains; predictions `obs` stored as 1 chain × 100 draws.
// - `pred_dims = {mu_pred: [school_pred]}` (no such prediction variable).
//
// Expect
// ------
// - `ShapeMismatch` on the chain count, as with no pred_dims at all.
fn unrelated_pred_dims_do_not_exempt_predictions() {
    let run = McmcRun::new(posterior_draws(4, 25));
    let predictions = PredictiveDraws::grouped(VarMap::from([(
        "obs".to_string(),
        Values::from(Array3::<f64>::zeros((1, 100, 3))),
    )]));
    let inputs = ConvertInputs::new().with_posterior(&run).with_predictions(&predictions);
    let opts = ConvertOptions::default().with_pred_dims("mu_pred", ["school_pred"]);

    let err = convert(&inputs, &opts).unwrap_err();
    assert!(matches!(err, ConvertError::ShapeMismatch { expected: 4, actual: 1, .. }));

    let constants =
        VarMap::from([("mu_pred".to_string(), Values::from(Array1::from(vec![0.0, 1.0, 2.0])))]);
    let labeled = inputs.with_predictions_constant_data(&constants);
    let idata = convert(&labeled, &opts).unwrap();
    assert!(idata.has_distinct_prediction_dims());
}

#[test]
// Purpose
// -------
// Separately converted pieces merge into one container; overlapping groups
// are rejected unless combining, and shared variables are always rejected.
fn separate_conversions_merge() {
    let run = McmcRun::new(posterior_draws(4, 50)).with_stats(diverging(4, 50));
    let posterior = convert(&ConvertInputs::new().with_posterior(&run), &ConvertOptions::default())
        .unwrap();

    let prior = PredictiveDraws::flat(VarMap::from([(
        "mu".to_string(),
        Values::from(Array1::<f64>::zeros(1000)),
    )]));
    let prior = convert(&ConvertInputs::new().with_prior(&prior), &ConvertOptions::default())
        .unwrap();

    let merged = posterior.merge(&prior, MergePolicy::Disjoint).unwrap();
    assert_eq!(group_names(&merged), vec!["posterior", "prior", "sample_stats"]);
    assert_eq!(merged.prior().unwrap().dims()["draw"], 1000);
    assert_eq!(posterior.len(), 2);

    let err = merged.merge(&posterior, MergePolicy::Disjoint).unwrap_err();
    assert!(matches!(err, DataError::GroupCollision { group: Group::Posterior, var: None }));

    let err = merged.merge(&posterior, MergePolicy::CombineGroups).unwrap_err();
    assert!(matches!(err, DataError::GroupCollision { var: Some(_), .. }));

    let extra = McmcRun::new(VarMap::from([(
        "sigma_extra".to_string(),
        Values::from(Array2::<f64>::ones((4, 50))),
    )]))
    .with_layout(DrawLayout::ChainDraw);
    let extra =
        convert(&ConvertInputs::new().with_posterior(&extra), &ConvertOptions::default()).unwrap();
    let combined = merged.merge(&extra, MergePolicy::CombineGroups).unwrap();
    assert_eq!(combined.posterior().unwrap().len(), 4);
}
