//! Typed element storage for labeled arrays.
//!
//! Purpose
//! -------
//! Hold the raw N-dimensional storage of one variable together with its
//! element type, so the rest of the container can reason about dtypes and
//! shapes without being generic over the element type.
//!
//! Key behaviors
//! -------------
//! - [`Values`] wraps an `ndarray::ArrayD` of `f64`, `i64`, `bool`, or
//!   `String`. Only the first three are admissible in a validated container;
//!   `Text` exists so foreign inputs with string storage can be represented
//!   and rejected with a typed error.
//! - [`DType`] / [`DTypeFamily`] classify storage for validation.
//! - Chain/draw helpers split a flat draws axis, prepend a unit chain axis,
//!   or pick out one (chain, draw) cell.
//!
//! Invariants & assumptions
//! ------------------------
//! - Axis 0 of chain/draw-indexed storage is the chain axis, axis 1 the draw
//!   axis; flat storage carries every draw on axis 0.
//! - Reshapes always go through standard (row-major) layout so draw order
//!   within a chain is preserved: the flat draw `i` lands at
//!   `(i / draws, i % draws)`.
//!
//! Conventions
//! -----------
//! - [`VarMap`] is the plain "name → values" mapping exchanged between the
//!   source adapters and the assembler; it is ordered by name.
use std::collections::BTreeMap;

use ndarray::{Array, ArrayD, Axis, Dimension, IxDyn, ShapeError};

/// Plain mapping from variable name to storage.
pub type VarMap = BTreeMap<String, Values>;

/// Element type of a [`Values`] buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Float64,
    Int64,
    Bool,
    Text,
}

/// Compatibility class of a [`DType`].
///
/// Same-named variables in different groups must share a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DTypeFamily {
    Numeric,
    Boolean,
    Unsupported,
}

impl DType {
    pub fn family(self) -> DTypeFamily {
        match self {
            DType::Float64 | DType::Int64 => DTypeFamily::Numeric,
            DType::Bool => DTypeFamily::Boolean,
            DType::Text => DTypeFamily::Unsupported,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DType::Float64 => "float64",
            DType::Int64 => "int64",
            DType::Bool => "bool",
            DType::Text => "str",
        }
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage of one variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Float(ArrayD<f64>),
    Int(ArrayD<i64>),
    Bool(ArrayD<bool>),
    Text(ArrayD<String>),
}

// Apply the same element-generic expression to whichever array is held and
// rewrap the result in the matching variant.
macro_rules! map_values {
    ($values:expr, $arr:ident => $body:expr) => {
        match $values {
            Values::Float($arr) => Values::Float($body),
            Values::Int($arr) => Values::Int($body),
            Values::Bool($arr) => Values::Bool($body),
            Values::Text($arr) => Values::Text($body),
        }
    };
}

impl Values {
    pub fn dtype(&self) -> DType {
        match self {
            Values::Float(_) => DType::Float64,
            Values::Int(_) => DType::Int64,
            Values::Bool(_) => DType::Bool,
            Values::Text(_) => DType::Text,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Values::Float(a) => a.shape(),
            Values::Int(a) => a.shape(),
            Values::Bool(a) => a.shape(),
            Values::Text(a) => a.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_float(&self) -> Option<&ArrayD<f64>> {
        match self {
            Values::Float(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&ArrayD<i64>> {
        match self {
            Values::Int(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<&ArrayD<bool>> {
        match self {
            Values::Bool(a) => Some(a),
            _ => None,
        }
    }

    /// Numeric view of the storage as `f64`.
    ///
    /// Integers are widened, booleans map to `0.0` / `1.0`. Returns `None`
    /// for `Text`.
    pub fn to_f64(&self) -> Option<ArrayD<f64>> {
        match self {
            Values::Float(a) => Some(a.clone()),
            Values::Int(a) => Some(a.mapv(|v| v as f64)),
            Values::Bool(a) => Some(a.mapv(|v| if v { 1.0 } else { 0.0 })),
            Values::Text(_) => None,
        }
    }

    /// Split a flat leading draws axis of length `L` into `(chains, L / chains)`.
    ///
    /// The caller guarantees `ndim() >= 1`, `chains > 0` and `L % chains == 0`.
    pub(crate) fn split_draws(self, chains: usize) -> Result<Values, ShapeError> {
        Ok(map_values!(self, arr => split_leading_axis(arr, chains)?))
    }

    /// Prepend a chain axis of length one.
    pub(crate) fn with_unit_chain(self) -> Values {
        map_values!(self, arr => arr.insert_axis(Axis(0)))
    }

    /// Storage of one `(chain, draw)` cell of chain/draw-indexed storage.
    pub(crate) fn draw_cell(&self, chain: usize, draw: usize) -> Values {
        map_values!(self, arr => arr.index_axis(Axis(0), chain).index_axis(Axis(0), draw).to_owned())
    }
}

fn split_leading_axis<T: Clone>(arr: ArrayD<T>, chains: usize) -> Result<ArrayD<T>, ShapeError> {
    let mut shape = arr.shape().to_vec();
    shape[0] /= chains;
    shape.insert(0, chains);
    arr.as_standard_layout().into_owned().into_shape_with_order(IxDyn(&shape))
}

impl<D: Dimension> From<Array<f64, D>> for Values {
    fn from(arr: Array<f64, D>) -> Self {
        Values::Float(arr.into_dyn())
    }
}

impl<D: Dimension> From<Array<i64, D>> for Values {
    fn from(arr: Array<i64, D>) -> Self {
        Values::Int(arr.into_dyn())
    }
}

impl<D: Dimension> From<Array<bool, D>> for Values {
    fn from(arr: Array<bool, D>) -> Self {
        Values::Bool(arr.into_dyn())
    }
}

impl<D: Dimension> From<Array<String, D>> for Values {
    fn from(arr: Array<String, D>) -> Self {
        Values::Text(arr.into_dyn())
    }
}

impl From<f64> for Values {
    fn from(v: f64) -> Self {
        Values::Float(ArrayD::from_elem(IxDyn(&[]), v))
    }
}

impl From<i64> for Values {
    fn from(v: i64) -> Self {
        Values::Int(ArrayD::from_elem(IxDyn(&[]), v))
    }
}

impl From<bool> for Values {
    fn from(v: bool) -> Self {
        Values::Bool(ArrayD::from_elem(IxDyn(&[]), v))
    }
}
