//! Keys of the index.

use num_traits::ToPrimitive;

use crate::error::{KDStoreError, Result};
use crate::r#type::Coordinate;

/// An ordered tuple of coordinates, one per axis of the tree.
///
/// A point is *partial* if any of its coordinates is [`Coordinate::Unspecified`]. Partial points
/// can be used to query the index but never to store into it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Point {
    coords: Vec<Coordinate>,
}

impl Point {
    /// Create a point from its coordinates.
    pub fn new(coords: Vec<Coordinate>) -> Self {
        Self { coords }
    }

    /// Create a possibly partial point, where `None` marks a wildcard axis.
    pub fn partial<I: IntoIterator<Item = Option<u64>>>(coords: I) -> Self {
        Self {
            coords: coords.into_iter().map(Coordinate::from).collect(),
        }
    }

    /// The number of axes of this point.
    #[inline]
    pub fn arity(&self) -> usize {
        self.coords.len()
    }

    /// All coordinates of this point, in axis order.
    pub fn coords(&self) -> &[Coordinate] {
        &self.coords
    }

    /// Returns `true` if any coordinate is unspecified.
    pub fn is_partial(&self) -> bool {
        self.coords.iter().any(|c| !c.is_specified())
    }

    /// The coordinate on `axis`, or `None` if the axis is out of range.
    #[inline]
    pub fn coord(&self, axis: usize) -> Option<Coordinate> {
        self.coords.get(axis).copied()
    }

    /// The concrete value on `axis`, or `None` if the axis is unspecified or out of range.
    #[inline]
    pub fn value_at(&self, axis: usize) -> Option<u64> {
        self.coord(axis).and_then(|c| c.value())
    }

    /// Exact equality between two fully specified points.
    ///
    /// A partial point is never equal to anything, including itself.
    pub fn is_equal(&self, other: &Point) -> bool {
        self.arity() == other.arity()
            && self
                .coords
                .iter()
                .zip(other.coords.iter())
                .all(|(a, b)| match (a, b) {
                    (Coordinate::Specified(a), Coordinate::Specified(b)) => a == b,
                    _ => false,
                })
    }

    /// Whether this stored point matches `pattern`.
    ///
    /// Unspecified pattern axes match any value; specified ones must match exactly.
    pub fn is_partially_equal(&self, pattern: &Point) -> bool {
        self.arity() == pattern.arity()
            && self
                .coords
                .iter()
                .zip(pattern.coords.iter())
                .all(|(stored, wanted)| match wanted {
                    Coordinate::Unspecified => true,
                    Coordinate::Specified(w) => stored.value() == Some(*w),
                })
    }

    /// Whether this point lies inside the box spanned by `from` and `to`, inclusive.
    ///
    /// A missing bound, or an unspecified axis of a bound, falls back to `0` for the lower end and
    /// `u64::MAX` for the upper end.
    pub fn is_within(&self, from: Option<&Point>, to: Option<&Point>) -> bool {
        (0..self.arity()).all(|axis| {
            let Some(v) = self.value_at(axis) else {
                return false;
            };
            let lower = from.and_then(|p| p.value_at(axis)).unwrap_or(0);
            let upper = to.and_then(|p| p.value_at(axis)).unwrap_or(u64::MAX);
            lower <= v && v <= upper
        })
    }

    /// Euclidean distance between two points.
    ///
    /// Axes where either side is unspecified are left out of the sum.
    pub fn distance(&self, other: &Point) -> Result<f64> {
        if self.arity() != other.arity() {
            return Err(KDStoreError::PointSizeMismatch {
                left: self.arity(),
                right: other.arity(),
            });
        }
        Ok(self.distance_unchecked(other))
    }

    /// Distance without the arity check. Extra axes on either side are ignored.
    pub(crate) fn distance_unchecked(&self, other: &Point) -> f64 {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .filter_map(|(a, b)| match (a, b) {
                (Coordinate::Specified(a), Coordinate::Specified(b)) => {
                    let d = a.abs_diff(*b).to_f64().unwrap_or(f64::INFINITY);
                    Some(d * d)
                }
                _ => None,
            })
            .sum::<f64>()
            .sqrt()
    }
}

impl From<Vec<u64>> for Point {
    fn from(value: Vec<u64>) -> Self {
        Self::new(value.into_iter().map(Coordinate::Specified).collect())
    }
}

impl From<&[u64]> for Point {
    fn from(value: &[u64]) -> Self {
        Self::new(value.iter().copied().map(Coordinate::Specified).collect())
    }
}

impl<const N: usize> From<[u64; N]> for Point {
    fn from(value: [u64; N]) -> Self {
        Self::new(value.into_iter().map(Coordinate::Specified).collect())
    }
}

impl From<Vec<Coordinate>> for Point {
    fn from(value: Vec<Coordinate>) -> Self {
        Self::new(value)
    }
}

/// An axis-aligned box of keys, with optional lower and upper corners.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyRange {
    min: Option<Point>,
    max: Option<Point>,
}

impl KeyRange {
    pub fn new(min: Option<Point>, max: Option<Point>) -> Self {
        Self { min, max }
    }

    /// Every key greater than or equal to `min` on all of its specified axes.
    pub fn at_least(min: Point) -> Self {
        Self::new(Some(min), None)
    }

    /// Every key less than or equal to `max` on all of its specified axes.
    pub fn at_most(max: Point) -> Self {
        Self::new(None, Some(max))
    }

    pub fn min(&self) -> Option<&Point> {
        self.min.as_ref()
    }

    pub fn max(&self) -> Option<&Point> {
        self.max.as_ref()
    }
}
