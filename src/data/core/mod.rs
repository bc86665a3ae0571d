//! core — labeled arrays, datasets, group schema and the inference container.
//!
//! Purpose
//! -------
//! Collect the container building blocks: typed element storage, coordinate
//! labels, labeled arrays, per-group datasets, the fixed group schema, the
//! validation routines that hold them together, and the immutable
//! [`InferenceData`] value itself. The conversion layer in `crate::convert`
//! produces these types; downstream diagnostics only read them.
//!
//! Key behaviors
//! -------------
//! - Represent storage as [`Values`] (float / int / bool, plus text for
//!   rejection) and labels as [`Coordinate`]s.
//! - Pair storage with dims and coordinates in [`DataArray`]; group arrays
//!   into a [`Dataset`]; key datasets by [`Group`] inside [`InferenceData`].
//! - Validate every invariant at construction and merge time via
//!   [`validation`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Array rank equals the number of dims; each coordinate's length equals
//!   its dim's extent; dims shared inside a dataset agree.
//! - Chain-indexed groups lead with `chain` and `draw`; comparable groups
//!   agree on the chain count.
//! - Only numeric and boolean storage survives validation.
//!
//! Conventions
//! -----------
//! - Maps are `BTreeMap`s so iteration order is deterministic (variables by
//!   name, groups by canonical schema order).
//! - This module performs no I/O and emits no log events.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for its own invariants; end-to-end
//!   behavior is covered by the conversion tests and `tests/`.

pub mod array;
pub mod coords;
pub mod dataset;
pub mod groups;
pub mod inference_data;
pub mod validation;
pub mod values;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::array::DataArray;
pub use self::coords::Coordinate;
pub use self::dataset::Dataset;
pub use self::groups::{ChainFamily, Group};
pub use self::inference_data::{InferenceData, MergePolicy};
pub use self::validation::{
    validate_dtype, validate_group_layout, validate_groups, validate_labels,
    validate_shared_axes,
};
pub use self::values::{DType, DTypeFamily, VarMap, Values};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::array::DataArray;
    pub use super::coords::Coordinate;
    pub use super::dataset::Dataset;
    pub use super::groups::Group;
    pub use super::inference_data::{InferenceData, MergePolicy};
    pub use super::values::{VarMap, Values};
}
