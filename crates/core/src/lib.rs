//! # Aeolus Core
//!
//! Core types and traits for the Aeolus spatiotemporal interpolation library.
//!
//! This crate provides:
//! - `Point` / `Sample`: the coordinate capability indexed by KD-trees
//! - `MeasurementPoint`: longitude, latitude, scaled time plus one measured value
//! - `Error` / `Result`: the shared error taxonomy

pub mod error;
pub mod measurement;
pub mod point;

pub use error::{Error, Result};
pub use measurement::{MeasurementPoint, DEFAULT_TIME_SCALE};
pub use point::{Point, Sample};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::measurement::{MeasurementPoint, DEFAULT_TIME_SCALE};
    pub use crate::point::{Point, Sample};
}
