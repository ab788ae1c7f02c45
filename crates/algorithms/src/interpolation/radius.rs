//! Search-radius selection from nearest-neighbor spacing
//!
//! For a radius-limited interpolation the cutoff is taken from the
//! distribution of distances between each sample and its closest other
//! sample: the `quantile`-th of those distances covers that share of
//! the samples with at least one neighbor.

use aeolus_core::{Error, Point, Result};

use super::kdtree::KdTree;

/// Distance from each point to its nearest other point, ascending.
///
/// Duplicated locations report a distance of 0.
pub fn nearest_distances<P: Point>(points: &[P]) -> Result<Vec<f64>> {
    if points.len() < 2 {
        return Ok(Vec::new());
    }
    let dimension = points[0].dimension();
    let tree = KdTree::from_points(dimension, points.iter().collect())?;

    let mut distances = Vec::with_capacity(points.len());
    for p in points {
        let neighbors = tree.nearest_neighbors(2, &p)?;
        // Slot 0 is the point itself (or an identical duplicate)
        if let Some(n) = neighbors.as_slice().get(1) {
            distances.push(n.distance);
        }
    }
    distances.sort_by(f64::total_cmp);
    Ok(distances)
}

/// The nearest-neighbor distance at `quantile` (in `[0, 1]`).
///
/// Picks the element at index `floor(quantile * n)`, clamped to the last
/// element. Returns `None` for fewer than two points.
pub fn nearest_distance_quantile<P: Point>(points: &[P], quantile: f64) -> Result<Option<f64>> {
    if !(0.0..=1.0).contains(&quantile) {
        return Err(Error::invalid("quantile", quantile, "must be in [0, 1]"));
    }
    let distances = nearest_distances(points)?;
    if distances.is_empty() {
        return Ok(None);
    }
    let idx = ((quantile * distances.len() as f64) as usize).min(distances.len() - 1);
    Ok(Some(distances[idx]))
}
