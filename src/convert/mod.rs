//! convert — from inference-engine outputs to an [`InferenceData`].
//!
//! Purpose
//! -------
//! Reconcile heterogeneous, independently produced sample arrays into one
//! validated container. The pipeline is
//! source adapters → label resolver → group assembler → derived groups →
//! container validation, driven by [`convert`].
//!
//! Key behaviors
//! -------------
//! - [`source`]: capability traits ([`InferenceSource`], [`LogDensityModel`])
//!   and in-memory carriers ([`McmcRun`], [`PredictiveDraws`]).
//! - [`resolver`]: dims/coords precedence and the shared
//!   [`ResolutionContext`].
//! - [`assembler`]: chain/draw reshaping and per-group datasets.
//! - [`deriver`]: `sample_stats` copy and parallel pointwise log-likelihood.
//! - [`options`] / [`errors`]: configuration and the [`ConvertError`] type.
//!
//! Invariants & assumptions
//! ------------------------
//! - Conversion is synchronous and side-effect free apart from `tracing`
//!   events; no subscriber is installed here.
//! - The only parallel section is per-draw log-density evaluation, which
//!   shares no mutable state.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each stage; `tests/integration_eight_schools.rs`
//!   exercises the public surface end to end.

pub mod api;
pub mod assembler;
pub mod deriver;
pub mod errors;
pub mod options;
pub mod resolver;
pub mod source;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{ConvertInputs, convert};
pub use self::errors::{ConvertError, ConvertResult};
pub use self::options::{ConvertOptions, CoordsMap, DimsMap, LogLikelihoodRequest};
pub use self::resolver::ResolutionContext;
pub use self::source::{
    DrawLayout, InferenceSource, LogDensityModel, McmcRun, ParamDraw, PredictiveDraws,
    SourceAdapter,
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use inference_data::convert::prelude::*;
//
// to import the conversion surface in a single line.

pub mod prelude {
    pub use super::{
        ConvertError, ConvertInputs, ConvertOptions, ConvertResult, DrawLayout, InferenceSource,
        LogDensityModel, LogLikelihoodRequest, McmcRun, ParamDraw, PredictiveDraws, convert,
    };
}
