//! Fixed group schema of an inference container.
//!
//! Purpose
//! -------
//! Enumerate the ten group names an [`InferenceData`](super::InferenceData)
//! may hold and classify them by indexing scheme and provenance.
//!
//! Key behaviors
//! -------------
//! - [`Group`] parses from / renders to the canonical snake_case names.
//! - [`Group::is_chain_indexed`] tells whether variables carry leading
//!   `chain` / `draw` dims.
//! - [`Group::chain_family`] groups chain-indexed groups whose chain counts
//!   must agree.
//! - [`Group::is_prediction_side`] selects groups that resolve dims through
//!   `pred_dims` instead of `dims`.
//!
//! Conventions
//! -----------
//! - The declaration order is the canonical display order; `Ord` follows it.
use std::str::FromStr;

use crate::data::errors::DataError;

/// Name of a group in the fixed schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Group {
    Posterior,
    PosteriorPredictive,
    Predictions,
    Prior,
    PriorPredictive,
    SampleStats,
    LogLikelihood,
    ObservedData,
    ConstantData,
    PredictionsConstantData,
}

/// Chain-indexed groups whose chain counts are comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainFamily {
    /// Posterior draws and everything generated from them.
    Posterior,
    /// Draws from the unconditioned model.
    Prior,
}

impl Group {
    /// Every group, in canonical order.
    pub const ALL: [Group; 10] = [
        Group::Posterior,
        Group::PosteriorPredictive,
        Group::Predictions,
        Group::Prior,
        Group::PriorPredictive,
        Group::SampleStats,
        Group::LogLikelihood,
        Group::ObservedData,
        Group::ConstantData,
        Group::PredictionsConstantData,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Group::Posterior => "posterior",
            Group::PosteriorPredictive => "posterior_predictive",
            Group::Predictions => "predictions",
            Group::Prior => "prior",
            Group::PriorPredictive => "prior_predictive",
            Group::SampleStats => "sample_stats",
            Group::LogLikelihood => "log_likelihood",
            Group::ObservedData => "observed_data",
            Group::ConstantData => "constant_data",
            Group::PredictionsConstantData => "predictions_constant_data",
        }
    }

    /// Whether variables of this group lead with `chain` and `draw` dims.
    pub fn is_chain_indexed(self) -> bool {
        !matches!(
            self,
            Group::ObservedData | Group::ConstantData | Group::PredictionsConstantData
        )
    }

    /// Whether this group resolves dims through `pred_dims`.
    pub fn is_prediction_side(self) -> bool {
        matches!(self, Group::Predictions | Group::PredictionsConstantData)
    }

    /// Family of comparable chain counts; `None` for non-indexed groups.
    pub fn chain_family(self) -> Option<ChainFamily> {
        match self {
            Group::Posterior
            | Group::PosteriorPredictive
            | Group::Predictions
            | Group::SampleStats
            | Group::LogLikelihood => Some(ChainFamily::Posterior),
            Group::Prior | Group::PriorPredictive => Some(ChainFamily::Prior),
            Group::ObservedData | Group::ConstantData | Group::PredictionsConstantData => None,
        }
    }

    /// Whether same-named variables here must agree in dtype family with
    /// other groups. Derived groups keep their own namespaces.
    pub(crate) fn shares_variable_namespace(self) -> bool {
        !matches!(self, Group::SampleStats | Group::LogLikelihood)
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Group {
    type Err = DataError;

    /// Parse a canonical group name (exact, snake_case).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Group::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| DataError::UnknownGroup { name: s.to_string() })
    }
}
