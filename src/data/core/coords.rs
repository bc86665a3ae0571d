//! Coordinate labels for named dimensions.
//!
//! - [`Coordinate`] holds the ordered labels of one dimension.
//! - Defaults are integer ranges `0..extent`.
//!
//! Notes
//! -----
//! - Coordinates are metadata only; they never reorder or rescale values.

/// Ordered labels along one dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum Coordinate {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Text(Vec<String>),
}

impl Coordinate {
    /// Default labels `0, 1, …, extent - 1`.
    pub fn range(extent: usize) -> Self {
        Coordinate::Int((0..extent as i64).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Coordinate::Int(v) => v.len(),
            Coordinate::Float(v) => v.len(),
            Coordinate::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<i64>> for Coordinate {
    fn from(v: Vec<i64>) -> Self {
        Coordinate::Int(v)
    }
}

impl From<Vec<f64>> for Coordinate {
    fn from(v: Vec<f64>) -> Self {
        Coordinate::Float(v)
    }
}

impl From<Vec<String>> for Coordinate {
    fn from(v: Vec<String>) -> Self {
        Coordinate::Text(v)
    }
}

impl From<Vec<&str>> for Coordinate {
    fn from(v: Vec<&str>) -> Self {
        Coordinate::Text(v.into_iter().map(str::to_owned).collect())
    }
}

impl From<std::ops::Range<i64>> for Coordinate {
    fn from(r: std::ops::Range<i64>) -> Self {
        Coordinate::Int(r.collect())
    }
}
