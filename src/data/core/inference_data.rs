//! InferenceData — the immutable, validated group container.
//!
//! Purpose
//! -------
//! Own the mapping from [`Group`] to [`Dataset`] produced by a conversion and
//! guarantee the container-level invariants at construction time. Every
//! downstream consumer reads through the accessors defined here.
//!
//! Key behaviors
//! -------------
//! - [`InferenceData::new`] drops empty datasets, then validates chain-count
//!   agreement and dtype families across groups.
//! - Named accessors (`posterior()`, `sample_stats()`, …) and
//!   [`InferenceData::group`] return `Option<&Dataset>`; `None` means the group
//!   was not requested or not available.
//! - [`InferenceData::merge`] builds a new container from two inputs under a
//!   [`MergePolicy`]; neither input is touched.
//!
//! Invariants & assumptions
//! ------------------------
//! - No stored dataset is empty.
//! - Comparable chain-indexed groups agree on `chain` (see
//!   [`validate_groups`]).
//! - No `&mut` access is exposed; a container never changes after
//!   construction.
//!
//! Downstream usage
//! ----------------
//! - `convert::convert` is the usual producer; hand-built containers go
//!   through [`InferenceData::new`].
use std::collections::BTreeMap;

use crate::data::{
    core::{dataset::Dataset, groups::Group, validation::validate_groups},
    errors::{DataError, DataResult},
};

/// How [`InferenceData::merge`] treats a group present in both inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Any shared group is a `GroupCollision`.
    #[default]
    Disjoint,
    /// Shared groups are unioned variable by variable; a shared variable is
    /// still a `GroupCollision`.
    CombineGroups,
}

/// Canonical container of posterior, predictive and sampler outputs.
///
/// Fields
/// ------
/// - `groups`: non-empty datasets keyed by group, in canonical order.
/// - `distinct_prediction_dims`: `predictions` follows its own dim
///   convention (built with `pred_dims`) and is exempt from the posterior
///   chain-count check.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InferenceData {
    groups: BTreeMap<Group, Dataset>,
    distinct_prediction_dims: bool,
}

impl InferenceData {
    /// Build a validated container.
    ///
    /// Parameters
    /// ----------
    /// - `groups`: `(group, dataset)` pairs. Empty datasets are dropped; a
    ///   repeated group keeps the last dataset.
    ///
    /// Errors
    /// ------
    /// - `DataError::ShapeMismatch` when comparable groups disagree on the
    ///   chain count.
    /// - `DataError::UnsupportedDtype` when same-named variables in different
    ///   groups fall in different dtype families.
    pub fn new(groups: impl IntoIterator<Item = (Group, Dataset)>) -> DataResult<Self> {
        Self::build(groups, false)
    }

    /// Like [`InferenceData::new`] but marks `predictions` as following a
    /// distinct dim convention.
    pub(crate) fn with_prediction_convention(
        groups: impl IntoIterator<Item = (Group, Dataset)>, distinct_prediction_dims: bool,
    ) -> DataResult<Self> {
        Self::build(groups, distinct_prediction_dims)
    }

    fn build(
        groups: impl IntoIterator<Item = (Group, Dataset)>, distinct_prediction_dims: bool,
    ) -> DataResult<Self> {
        let groups: BTreeMap<Group, Dataset> =
            groups.into_iter().filter(|(_, ds)| !ds.is_empty()).collect();
        validate_groups(&groups, distinct_prediction_dims)?;
        Ok(InferenceData { groups, distinct_prediction_dims })
    }

    pub fn group(&self, group: Group) -> Option<&Dataset> {
        self.groups.get(&group)
    }

    /// Look a group up by its canonical name.
    ///
    /// Errors
    /// ------
    /// - `DataError::UnknownGroup` if `name` is not in the schema. A known
    ///   but absent group is `Ok(None)`.
    pub fn group_by_name(&self, name: &str) -> DataResult<Option<&Dataset>> {
        Ok(self.group(name.parse()?))
    }

    pub fn has_group(&self, group: Group) -> bool {
        self.groups.contains_key(&group)
    }

    /// Present groups in canonical order.
    pub fn groups(&self) -> impl Iterator<Item = Group> + '_ {
        self.groups.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Group, &Dataset)> {
        self.groups.iter().map(|(g, ds)| (*g, ds))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn has_distinct_prediction_dims(&self) -> bool {
        self.distinct_prediction_dims
    }

    pub fn posterior(&self) -> Option<&Dataset> {
        self.group(Group::Posterior)
    }

    pub fn posterior_predictive(&self) -> Option<&Dataset> {
        self.group(Group::PosteriorPredictive)
    }

    pub fn predictions(&self) -> Option<&Dataset> {
        self.group(Group::Predictions)
    }

    pub fn prior(&self) -> Option<&Dataset> {
        self.group(Group::Prior)
    }

    pub fn prior_predictive(&self) -> Option<&Dataset> {
        self.group(Group::PriorPredictive)
    }

    pub fn sample_stats(&self) -> Option<&Dataset> {
        self.group(Group::SampleStats)
    }

    pub fn log_likelihood(&self) -> Option<&Dataset> {
        self.group(Group::LogLikelihood)
    }

    pub fn observed_data(&self) -> Option<&Dataset> {
        self.group(Group::ObservedData)
    }

    pub fn constant_data(&self) -> Option<&Dataset> {
        self.group(Group::ConstantData)
    }

    pub fn predictions_constant_data(&self) -> Option<&Dataset> {
        self.group(Group::PredictionsConstantData)
    }

    /// Merge two containers into a new one.
    ///
    /// Parameters
    /// ----------
    /// - `other`: second input; its groups are added to those of `self`.
    /// - `policy`: treatment of groups present in both inputs.
    ///
    /// Returns
    /// -------
    /// - A new container holding the union of both group sets. The
    ///   distinct-prediction-dims flag is set if either input carries it.
    ///
    /// Errors
    /// ------
    /// - `DataError::GroupCollision { var: None }` for a shared group under
    ///   [`MergePolicy::Disjoint`].
    /// - `DataError::GroupCollision { var: Some(..) }` for a shared variable
    ///   under [`MergePolicy::CombineGroups`].
    /// - Any container-level violation of the merged result.
    pub fn merge(&self, other: &InferenceData, policy: MergePolicy) -> DataResult<InferenceData> {
        let mut groups = self.groups.clone();
        for (&group, dataset) in &other.groups {
            let merged = match (groups.get(&group), policy) {
                (None, _) => dataset.clone(),
                (Some(_), MergePolicy::Disjoint) => {
                    return Err(DataError::GroupCollision { group, var: None });
                }
                (Some(existing), MergePolicy::CombineGroups) => existing.combine(dataset, group)?,
            };
            groups.insert(group, merged);
        }
        Self::build(groups, self.distinct_prediction_dims || other.distinct_prediction_dims)
    }
}
