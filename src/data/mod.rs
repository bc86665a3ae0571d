//! data — the canonical inference container and its error type.
//!
//! Purpose
//! -------
//! Provide the read-only data model every downstream diagnostic consumes:
//! an [`InferenceData`] holding one [`Dataset`] per present [`Group`], each a
//! set of labeled [`DataArray`]s.
//!
//! Key behaviors
//! -------------
//! - [`core`] defines storage, labels, datasets, the group schema and the
//!   container, together with its validation and merge rules.
//! - [`errors`] defines [`DataError`] / [`DataResult`], which convert into
//!   `PyErr` under the `python-bindings` feature.
//!
//! Downstream usage
//! ----------------
//! - Consumers normally receive an [`InferenceData`] from
//!   `crate::convert::convert` and walk it through `group(..)` or the named
//!   accessors, then `Dataset::get` / `Dataset::dims`.
//! - Partial containers are combined with [`InferenceData::merge`].

pub mod core;
pub mod errors;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    ChainFamily, Coordinate, DType, DTypeFamily, DataArray, Dataset, Group, InferenceData,
    MergePolicy, Values, VarMap,
};
pub use self::errors::{DataError, DataResult};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use inference_data::data::prelude::*;
//
// to import the container surface in a single line.

pub mod prelude {
    pub use super::core::prelude::*;
    pub use super::errors::{DataError, DataResult};
}
