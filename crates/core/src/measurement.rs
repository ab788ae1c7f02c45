//! Spatiotemporal measurement points
//!
//! A [`MeasurementPoint`] is a longitude/latitude location plus a time axis
//! (day of year multiplied by a time scale), carrying one measured value.
//! Query points start with an unknown value that is written exactly once
//! by an interpolator.

use std::fmt;

use crate::error::{Error, Result};
use crate::point::{Point, Sample};

/// Default scale applied to the day-of-year axis.
pub const DEFAULT_TIME_SCALE: f64 = 0.1;

/// Days per month in a non-leap year.
const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// A measurement located in (longitude, latitude, scaled time).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementPoint {
    longitude: f64,
    latitude: f64,
    /// Unscaled time coordinate (day of year)
    day: f64,
    time_scale: f64,
    scaled_time: f64,
    value: Option<f64>,
}

impl MeasurementPoint {
    /// Spatial plus scaled-time dimension.
    pub const DIMENSION: usize = 3;

    /// Create a point from an already scaled time coordinate.
    pub fn new(longitude: f64, latitude: f64, scaled_time: f64, value: Option<f64>) -> Self {
        Self {
            longitude,
            latitude,
            day: scaled_time,
            time_scale: 1.0,
            scaled_time,
            value,
        }
    }

    /// Create a measured point from a calendar date (non-leap year).
    pub fn measured(
        longitude: f64,
        latitude: f64,
        month: u32,
        day: u32,
        value: f64,
        time_scale: f64,
    ) -> Result<Self> {
        let day_of_year = day_of_year(month, day)?;
        let mut p = Self::query(longitude, latitude, day_of_year, time_scale);
        p.value = Some(value);
        Ok(p)
    }

    /// Create a query point whose value is still unknown.
    pub fn query(longitude: f64, latitude: f64, day_of_year: u32, time_scale: f64) -> Self {
        let day = day_of_year as f64;
        Self {
            longitude,
            latitude,
            day,
            time_scale,
            scaled_time: day * time_scale,
            value: None,
        }
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn scaled_time(&self) -> f64 {
        self.scaled_time
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Whether the value still awaits an estimate.
    pub fn is_query(&self) -> bool {
        self.value.is_none()
    }

    /// Record the interpolated value of a query point.
    ///
    /// Only the unknown -> estimate transition is allowed.
    pub fn set_estimate(&mut self, estimate: f64) -> Result<()> {
        if self.value.is_some() {
            return Err(Error::EstimateAlreadySet);
        }
        self.value = Some(estimate);
        Ok(())
    }

    /// Re-derive the time coordinate under a different scale.
    pub fn rescale_time(&mut self, time_scale: f64) {
        self.time_scale = time_scale;
        self.scaled_time = self.day * time_scale;
    }

    /// Copy of this point with a different time scale.
    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.rescale_time(time_scale);
        self
    }
}

impl Point for MeasurementPoint {
    #[inline]
    fn dimension(&self) -> usize {
        Self::DIMENSION
    }

    /// # Panics
    ///
    /// If `axis >= 3`.
    #[inline]
    fn coord(&self, axis: usize) -> f64 {
        match axis {
            0 => self.longitude,
            1 => self.latitude,
            2 => self.scaled_time,
            _ => panic!("axis {axis} out of range for a {}-dimensional point", Self::DIMENSION),
        }
    }

    #[inline]
    fn distance_sq(&self, other: &Self) -> f64 {
        let dx = self.longitude - other.longitude;
        let dy = self.latitude - other.latitude;
        let dt = self.scaled_time - other.scaled_time;
        dx * dx + dy * dy + dt * dt
    }
}

impl Sample for MeasurementPoint {
    #[inline]
    fn value(&self) -> Option<f64> {
        self.value
    }
}

impl fmt::Display for MeasurementPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(v) => write!(
                f,
                "({}, {}, {}, {})",
                self.longitude, self.latitude, self.scaled_time, v
            ),
            None => write!(
                f,
                "({}, {}, {}, ?)",
                self.longitude, self.latitude, self.scaled_time
            ),
        }
    }
}

/// Day of year (1-based) for a calendar date in a non-leap year.
pub fn day_of_year(month: u32, day: u32) -> Result<u32> {
    if !(1..=12).contains(&month) {
        return Err(Error::invalid("month", month, "must be in 1..=12"));
    }
    let month_len = DAYS_IN_MONTH[(month - 1) as usize];
    if day == 0 || day > month_len {
        return Err(Error::invalid(
            "day",
            day,
            format!("must be in 1..={month_len} for month {month}"),
        ));
    }
    let preceding: u32 = DAYS_IN_MONTH[..(month - 1) as usize].iter().sum();
    Ok(preceding + day)
}
