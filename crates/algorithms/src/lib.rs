//! # Aeolus Algorithms
//!
//! Spatiotemporal interpolation and its validation.
//!
//! ## Available Algorithm Categories
//!
//! - **interpolation**: k-d tree k-nearest-neighbor search, IDW estimation,
//!   search-radius selection
//! - **validation**: k-fold cross-validation, bagging, parameter sweeps

pub mod interpolation;
pub mod validation;

mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::interpolation::{
        fill_estimates, idw_estimate, interpolate, nearest_distance_quantile, IdwParams, KdTree,
        NeighborList, TiePolicy, ZeroDistancePolicy,
    };
    pub use crate::validation::{
        evaluate, evaluate_bagged, sweep, BaggingParams, ConfigGrid, FoldConfig, Partition,
        Statistic, SweepReport,
    };
    pub use aeolus_core::prelude::*;
    pub use aeolus_parallel::ProcessingMode;
}
