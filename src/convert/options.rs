//! Conversion options — labels, log-likelihood request and chain count.
//!
//! Purpose
//! -------
//! Collect every caller-facing knob of a conversion in one value so the entry
//! point takes explicit, validated configuration instead of loose arguments.
//!
//! Key behaviors
//! -------------
//! - [`ConvertOptions`] carries explicit coordinates (keyed by dim name),
//!   explicit dims for training-side groups, `pred_dims` for prediction-side
//!   groups, a [`LogLikelihoodRequest`] and an optional chain count for flat
//!   draws.
//! - Chaining builders fill those fields; only `with_num_chains` can fail.
//!
//! Invariants & assumptions
//! ------------------------
//! - `num_chains`, when set, is strictly positive.
//! - Entries naming variables or dims absent from the inputs are ignored by
//!   the resolver, never rejected.
//!
//! Conventions
//! -----------
//! - Dims lists exclude the leading `chain` / `draw` axes; they name the
//!   variable's own axes only.
use std::collections::BTreeMap;

use crate::{
    convert::errors::{ConvertError, ConvertResult},
    data::core::coords::Coordinate,
};

/// Variable name → dim names of its own axes.
pub type DimsMap = BTreeMap<String, Vec<String>>;

/// Dim name → coordinate labels.
pub type CoordsMap = BTreeMap<String, Coordinate>;

/// Which observed variables get a pointwise log-likelihood.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLikelihoodRequest {
    /// Every observed variable when the source exposes a model; skipped
    /// silently otherwise.
    #[default]
    Auto,
    /// Never compute the group.
    Disabled,
    /// Exactly the listed observed variables; the source must expose a model.
    Only(Vec<String>),
}

impl From<bool> for LogLikelihoodRequest {
    fn from(enabled: bool) -> Self {
        if enabled { LogLikelihoodRequest::Auto } else { LogLikelihoodRequest::Disabled }
    }
}

/// ConvertOptions — caller configuration for one conversion.
///
/// Fields
/// ------
/// - `coords`: [`CoordsMap`]
///   Explicit labels per dim name; lengths must match the resolved extent.
/// - `dims`: [`DimsMap`]
///   Explicit dims for variables outside the prediction-side groups.
/// - `pred_dims`: [`DimsMap`]
///   Explicit dims for `predictions` and `predictions_constant_data`. A
///   non-empty map marks the container's predictions as following their own
///   dim convention.
/// - `log_likelihood`: [`LogLikelihoodRequest`]
/// - `num_chains`: `Option<usize>`
///   Chain count used to split flat draws. `None` means "posterior chain
///   count if a posterior is present, else 1" for posterior-derived groups and
///   1 for prior-derived groups.
///
/// Notes
/// -----
/// - `Default` is the plain conversion: no labels, `Auto` log-likelihood and
///   no chain override.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConvertOptions {
    pub coords: CoordsMap,
    pub dims: DimsMap,
    pub pred_dims: DimsMap,
    pub log_likelihood: LogLikelihoodRequest,
    pub num_chains: Option<usize>,
}

impl ConvertOptions {
    pub fn new() -> ConvertOptions {
        ConvertOptions::default()
    }

    /// Add (or replace) the labels of one dim.
    pub fn with_coord(mut self, dim: impl Into<String>, labels: impl Into<Coordinate>) -> Self {
        self.coords.insert(dim.into(), labels.into());
        self
    }

    /// Set the dims of one variable for training-side groups.
    pub fn with_dims<S: Into<String>>(
        mut self, var: impl Into<String>, dims: impl IntoIterator<Item = S>,
    ) -> Self {
        self.dims.insert(var.into(), dims.into_iter().map(Into::into).collect());
        self
    }

    /// Set the dims of one variable for prediction-side groups.
    pub fn with_pred_dims<S: Into<String>>(
        mut self, var: impl Into<String>, dims: impl IntoIterator<Item = S>,
    ) -> Self {
        self.pred_dims.insert(var.into(), dims.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_log_likelihood(mut self, request: impl Into<LogLikelihoodRequest>) -> Self {
        self.log_likelihood = request.into();
        self
    }

    /// Set the chain count used to split flat draws.
    ///
    /// Errors
    /// ------
    /// - `ConvertError::ShapeMismatch` when `num_chains == 0`.
    pub fn with_num_chains(mut self, num_chains: usize) -> ConvertResult<Self> {
        if num_chains == 0 {
            return Err(ConvertError::ShapeMismatch {
                context: "num_chains".to_string(),
                expected: 1,
                actual: 0,
                reason: "At least one chain is required.",
            });
        }
        self.num_chains = Some(num_chains);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Builders fill the documented fields and leave the rest at defaults.
    fn builders_fill_fields() {
        let opts = ConvertOptions::new()
            .with_coord("school", 0_i64..8)
            .with_dims("theta", ["school"])
            .with_pred_dims("obs", ["school_pred"])
            .with_log_likelihood(false)
            .with_num_chains(4)
            .unwrap();

        assert_eq!(opts.coords["school"].len(), 8);
        assert_eq!(opts.dims["theta"], vec!["school".to_string()]);
        assert_eq!(opts.pred_dims["obs"], vec!["school_pred".to_string()]);
        assert_eq!(opts.log_likelihood, LogLikelihoodRequest::Disabled);
        assert_eq!(opts.num_chains, Some(4));
    }

    #[test]
    fn zero_chains_are_rejected() {
        let err = ConvertOptions::default().with_num_chains(0).unwrap_err();
        assert!(matches!(err, ConvertError::ShapeMismatch { actual: 0, .. }));
    }

    #[test]
    fn default_requests_auto_log_likelihood() {
        assert_eq!(ConvertOptions::default().log_likelihood, LogLikelihoodRequest::Auto);
        assert_eq!(LogLikelihoodRequest::from(true), LogLikelihoodRequest::Auto);
    }
}
