//! Spatial search and interpolation
//!
//! - k-d tree: median-split construction, incremental insertion and bounded
//!   k-nearest-neighbor search with distance pruning
//! - Neighbor list: the bounded, distance-ordered candidate set a query fills
//! - IDW: Inverse Distance Weighting over a neighbor list
//! - Radius: search-radius selection from nearest-neighbor spacing

mod idw;
pub mod kdtree;
pub mod neighbors;
mod radius;

pub use idw::{fill_estimates, idw_estimate, interpolate, IdwParams, ZeroDistancePolicy};
pub use kdtree::{KdNode, KdTree};
pub use neighbors::{within_radius, Neighbor, NeighborList, TiePolicy};
pub use radius::{nearest_distance_quantile, nearest_distances};
