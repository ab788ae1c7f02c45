//! Point capabilities
//!
//! Anything with a fixed number of coordinates can be indexed by the
//! spatial structures in `aeolus-algorithms`. Values that additionally carry
//! a target scalar (conceptually stored at index `D`) implement [`Sample`]
//! and can feed interpolation and cross-validation.

use crate::error::{Error, Result};

/// A value located in a fixed-dimension Euclidean space.
pub trait Point {
    /// Number of spatial coordinates.
    fn dimension(&self) -> usize;

    /// Coordinate along `axis`. `axis` must be below [`Point::dimension`].
    fn coord(&self, axis: usize) -> f64;

    /// Squared Euclidean distance to another point of the same dimension.
    #[inline]
    fn distance_sq(&self, other: &Self) -> f64 {
        (0..self.dimension())
            .map(|axis| {
                let d = self.coord(axis) - other.coord(axis);
                d * d
            })
            .sum()
    }

    /// Euclidean distance to another point of the same dimension.
    #[inline]
    fn distance(&self, other: &Self) -> f64 {
        self.distance_sq(other).sqrt()
    }
}

/// A point carrying a target value at index `D`.
pub trait Sample: Point {
    /// Target value, `None` while it is still unknown.
    fn value(&self) -> Option<f64>;

    /// Tuple access: indices `0..D` are coordinates, index `D` the target.
    ///
    /// An unknown target reads as [`Error::MissingValue`].
    fn get(&self, index: usize) -> Result<f64> {
        let dimension = self.dimension();
        if index < dimension {
            Ok(self.coord(index))
        } else if index == dimension {
            self.value().ok_or(Error::MissingValue)
        } else {
            Err(Error::IndexOutOfRange { index, dimension })
        }
    }
}

impl<P: Point + ?Sized> Point for &P {
    #[inline]
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    #[inline]
    fn coord(&self, axis: usize) -> f64 {
        (**self).coord(axis)
    }

    #[inline]
    fn distance_sq(&self, other: &Self) -> f64 {
        (**self).distance_sq(*other)
    }

    #[inline]
    fn distance(&self, other: &Self) -> f64 {
        (**self).distance(*other)
    }
}

impl<P: Sample + ?Sized> Sample for &P {
    #[inline]
    fn value(&self) -> Option<f64> {
        (**self).value()
    }
}
