//! Inverse Distance Weighting (IDW) interpolation
//!
//! Estimates the value at a query location as a weighted average of its
//! nearest sample points, where weights are inversely proportional to
//! distance raised to a power parameter.
//!
//! Reference:
//! Shepard, D. (1968). A two-dimensional interpolation function for
//! irregularly-spaced data. ACM National Conference.

use aeolus_core::{Error, MeasurementPoint, Result, Sample};

use super::kdtree::KdTree;
use super::neighbors::{within_radius, Neighbor};
use crate::maybe_rayon::*;

/// What to do when a neighbor coincides with the query (distance 0),
/// where the inverse-distance weight diverges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroDistancePolicy {
    /// Return the mean value of the coincident neighbors.
    #[default]
    Coincident,
    /// Fail with [`Error::Indeterminate`].
    Reject,
}

/// Parameters for IDW estimation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdwParams {
    /// Power parameter (default: 2.0).
    /// Higher values give more weight to nearby points.
    pub power: f64,
    /// Handling of neighbors at distance 0
    pub zero_distance: ZeroDistancePolicy,
    /// Maximum neighbor distance. Farther neighbors are ignored, except the
    /// nearest one which is always used. `None` uses every neighbor.
    pub radius: Option<f64>,
}

impl Default for IdwParams {
    fn default() -> Self {
        Self {
            power: 2.0,
            zero_distance: ZeroDistancePolicy::Coincident,
            radius: None,
        }
    }
}

impl IdwParams {
    pub fn with_power(power: f64) -> Self {
        Self {
            power,
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.power > 0.0 && self.power.is_finite()) {
            return Err(Error::invalid("power", self.power, "must be positive and finite"));
        }
        if let Some(r) = self.radius {
            if r.is_nan() || r < 0.0 {
                return Err(Error::invalid("radius", r, "must be non-negative"));
            }
        }
        Ok(())
    }
}

/// Weighted estimate from a set of neighbors.
///
/// # Algorithm
///
/// ```text
/// z = Σ(wi * zi)
/// where wi = (1 / di)^p / Σ(1 / dj)^p
/// ```
///
/// Weights are evaluated as `(dmin / di)^p`, which lies in (0, 1] and
/// leaves the normalized weights unchanged while staying finite for large
/// `p` or extreme distances. A single neighbor yields its own value exactly.
pub fn idw_estimate<P: Sample>(neighbors: &[Neighbor<'_, P>], params: &IdwParams) -> Result<f64> {
    params.validate()?;

    let used = match params.radius {
        Some(r) => within_radius(neighbors, r),
        None => neighbors,
    };

    if used.is_empty() {
        return Err(Error::Indeterminate("no neighbors to interpolate from".into()));
    }

    let mut coincident_sum = 0.0;
    let mut coincident = 0usize;
    for n in used {
        if n.distance == 0.0 {
            coincident_sum += n.point.value().ok_or(Error::MissingValue)?;
            coincident += 1;
        }
    }
    if coincident > 0 {
        return match params.zero_distance {
            ZeroDistancePolicy::Coincident => Ok(coincident_sum / coincident as f64),
            ZeroDistancePolicy::Reject => Err(Error::Indeterminate(
                "neighbor coincides with the query point".into(),
            )),
        };
    }

    // Relative to the nearest distance every weight lies in (0, 1]
    let nearest = used.iter().map(|n| n.distance).fold(f64::INFINITY, f64::min);
    let weight = |d: f64| (nearest / d).powf(params.power);

    let mut sum_w = 0.0;
    for n in used {
        sum_w += weight(n.distance);
    }
    if !(sum_w.is_finite() && sum_w > 0.0) {
        return Err(Error::Indeterminate(format!("inverse-distance weights sum to {sum_w}")));
    }

    let mut estimate = 0.0;
    for n in used {
        let value = n.point.value().ok_or(Error::MissingValue)?;
        estimate += weight(n.distance) / sum_w * value;
    }

    if !estimate.is_finite() {
        return Err(Error::Indeterminate(format!("non-finite estimate {estimate}")));
    }
    Ok(estimate)
}

/// Estimate the value at every query from its `k` nearest tree elements.
///
/// Each query succeeds or fails on its own.
pub fn interpolate<P>(tree: &KdTree<P>, queries: &[P], k: usize, params: &IdwParams) -> Vec<Result<f64>>
where
    P: Sample + Sync,
{
    queries
        .par_iter()
        .map(|q| {
            let neighbors = tree.nearest_neighbors(k, q)?;
            idw_estimate(neighbors.as_slice(), params)
        })
        .collect()
}

/// Interpolate and store estimates into query points whose value is unknown.
///
/// Points that already carry a value are left untouched. Returns the number
/// of estimates written; the first failure aborts with its error after all
/// points have been attempted.
pub fn fill_estimates(
    tree: &KdTree<MeasurementPoint>,
    queries: &mut [MeasurementPoint],
    k: usize,
    params: &IdwParams,
) -> Result<usize> {
    let outcomes: Vec<Result<bool>> = queries
        .par_iter_mut()
        .map(|q| {
            if !q.is_query() {
                return Ok(false);
            }
            let estimate = {
                let query: &MeasurementPoint = q;
                let neighbors = tree.nearest_neighbors(k, query)?;
                idw_estimate(neighbors.as_slice(), params)?
            };
            q.set_estimate(estimate)?;
            Ok(true)
        })
        .collect();

    let mut written = 0;
    for outcome in outcomes {
        if outcome? {
            written += 1;
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::neighbors::NeighborList;

    fn sample_points() -> Vec<MeasurementPoint> {
        vec![
            MeasurementPoint::new(0.5, 9.5, 0.0, Some(10.0)),
            MeasurementPoint::new(9.5, 9.5, 0.0, Some(20.0)),
            MeasurementPoint::new(0.5, 0.5, 0.0, Some(30.0)),
            MeasurementPoint::new(9.5, 0.5, 0.0, Some(40.0)),
        ]
    }

    #[test]
    fn test_single_neighbor_exact() {
        let pts = sample_points();
        let q = MeasurementPoint::new(3.3, 1.7, 0.0, None);
        for power in [0.5, 1.0, 2.0, 3.7, 10.0, 1100.0] {
            let mut list = NeighborList::new(1, &q).unwrap();
            list.add(&pts[1]);
            let est = idw_estimate(list.as_slice(), &IdwParams::with_power(power)).unwrap();
            assert_eq!(est, 20.0);
        }
    }

    #[test]
    fn test_extreme_weights_stay_finite() {
        let q = MeasurementPoint::new(0.0, 0.0, 0.0, None);
        let p = MeasurementPoint::new(1.0, 0.0, 0.0, Some(7.0));
        for (d, power) in [(2.0, 1100.0), (0.5, 1100.0), (1e200, 2.0), (1e-200, 2.0)] {
            let mut list = NeighborList::new(1, &q).unwrap();
            list.add_with_distance(&p, d);
            let est = idw_estimate(list.as_slice(), &IdwParams::with_power(power)).unwrap();
            assert_eq!(est, 7.0, "d={} P={}", d, power);
        }

        let mut list = NeighborList::new(1, &q).unwrap();
        list.add_with_distance(&p, f64::INFINITY);
        assert!(matches!(
            idw_estimate(list.as_slice(), &IdwParams::default()),
            Err(Error::Indeterminate(_))
        ));

        // The far neighbor's relative weight underflows to 0, leaving the near one
        let near = MeasurementPoint::new(0.5, 0.0, 0.0, Some(10.0));
        let far = MeasurementPoint::new(2.0, 0.0, 0.0, Some(50.0));
        let mut list = NeighborList::new(2, &q).unwrap();
        list.add(&near);
        list.add(&far);
        let est = idw_estimate(list.as_slice(), &IdwParams::with_power(1100.0)).unwrap();
        assert_eq!(est, 10.0);
    }

    #[test]
    fn test_center_is_average() {
        let pts = sample_points();
        let q = MeasurementPoint::new(5.0, 5.0, 0.0, None);
        let mut list = NeighborList::new(4, &q).unwrap();
        for p in &pts {
            list.add(p);
        }
        let est = idw_estimate(list.as_slice(), &IdwParams::default()).unwrap();
        assert!((est - 25.0).abs() < 1e-10, "got {}", est);
    }

    #[test]
    fn test_hand_computed_weights() {
        // distances 1 and 2, power 2: weights 1 and 1/4 -> 0.8 and 0.2
        let a = MeasurementPoint::new(1.0, 0.0, 0.0, Some(10.0));
        let b = MeasurementPoint::new(-2.0, 0.0, 0.0, Some(60.0));
        let q = MeasurementPoint::new(0.0, 0.0, 0.0, None);
        let mut list = NeighborList::new(2, &q).unwrap();
        list.add(&a);
        list.add(&b);
        let est = idw_estimate(list.as_slice(), &IdwParams::default()).unwrap();
        assert!((est - 20.0).abs() < 1e-10, "got {}", est);
    }

    #[test]
    fn test_power_effect() {
        let pts = sample_points();
        let q = MeasurementPoint::new(1.5, 8.5, 0.0, None);
        let mut list = NeighborList::new(4, &q).unwrap();
        for p in &pts {
            list.add(p);
        }
        let low = idw_estimate(list.as_slice(), &IdwParams::with_power(1.0)).unwrap();
        let high = idw_estimate(list.as_slice(), &IdwParams::with_power(4.0)).unwrap();
        assert!((high - 10.0).abs() < (low - 10.0).abs());
    }

    #[test]
    fn test_zero_distance_policies() {
        let a = MeasurementPoint::new(0.0, 0.0, 0.0, Some(10.0));
        let b = MeasurementPoint::new(0.0, 0.0, 0.0, Some(14.0));
        let c = MeasurementPoint::new(1.0, 0.0, 0.0, Some(100.0));
        let q = MeasurementPoint::new(0.0, 0.0, 0.0, None);
        let mut list = NeighborList::new(3, &q).unwrap();
        list.add(&a);
        list.add(&b);
        list.add(&c);

        let est = idw_estimate(list.as_slice(), &IdwParams::default()).unwrap();
        assert_eq!(est, 12.0);

        let reject = IdwParams {
            zero_distance: ZeroDistancePolicy::Reject,
            ..Default::default()
        };
        assert!(matches!(
            idw_estimate(list.as_slice(), &reject),
            Err(Error::Indeterminate(_))
        ));
    }

    #[test]
    fn test_radius_keeps_nearest() {
        let a = MeasurementPoint::new(5.0, 0.0, 0.0, Some(10.0));
        let b = MeasurementPoint::new(6.0, 0.0, 0.0, Some(50.0));
        let q = MeasurementPoint::new(0.0, 0.0, 0.0, None);
        let mut list = NeighborList::new(2, &q).unwrap();
        list.add(&a);
        list.add(&b);
        let params = IdwParams {
            radius: Some(1.0),
            ..Default::default()
        };
        assert_eq!(idw_estimate(list.as_slice(), &params).unwrap(), 10.0);
    }

    #[test]
    fn test_errors() {
        let empty: Vec<Neighbor<'_, MeasurementPoint>> = Vec::new();
        assert!(idw_estimate(&empty, &IdwParams::default()).is_err());

        let unknown = MeasurementPoint::new(1.0, 0.0, 0.0, None);
        let q = MeasurementPoint::new(0.0, 0.0, 0.0, None);
        let mut list = NeighborList::new(1, &q).unwrap();
        list.add(&unknown);
        assert_eq!(
            idw_estimate(list.as_slice(), &IdwParams::default()),
            Err(Error::MissingValue)
        );

        let a = MeasurementPoint::new(1.0, 0.0, 0.0, Some(1.0));
        let mut list = NeighborList::new(1, &q).unwrap();
        list.add(&a);
        assert!(idw_estimate(list.as_slice(), &IdwParams::with_power(0.0)).is_err());
    }

    #[test]
    fn test_interpolate_and_fill() {
        let tree = KdTree::from_points(3, sample_points()).unwrap();
        let mut queries = vec![
            MeasurementPoint::new(5.0, 5.0, 0.0, None),
            MeasurementPoint::new(0.5, 9.5, 0.0, None),
            MeasurementPoint::new(9.0, 9.0, 0.0, Some(99.0)),
        ];

        let estimates = interpolate(&tree, &queries, 4, &IdwParams::default());
        assert_eq!(estimates.len(), 3);
        assert!((estimates[0].as_ref().unwrap() - 25.0).abs() < 1e-10);
        assert_eq!(*estimates[1].as_ref().unwrap(), 10.0);

        let written = fill_estimates(&tree, &mut queries, 4, &IdwParams::default()).unwrap();
        assert_eq!(written, 2);
        assert!((queries[0].value().unwrap() - 25.0).abs() < 1e-10);
        assert_eq!(queries[1].value(), Some(10.0));
        assert_eq!(queries[2].value(), Some(99.0));
    }
}
