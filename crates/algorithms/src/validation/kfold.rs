//! k-fold cross-validation of IDW interpolation
//!
//! For each fold the held-out group is interpolated from a k-d tree built
//! over all other groups. Per-point error terms are averaged within the
//! fold, post-transformed, and the per-fold values are averaged.
//!
//! Evaluation is a pure function of (partition, configuration, statistic):
//! every fold builds its own tree, nothing is shared or mutated, and
//! callers may evaluate many configurations concurrently over one
//! partition.

use std::fmt;

use aeolus_core::{Error, Result, Sample};
use tracing::debug;

use super::partition::Partition;
use super::statistic::{PostTransform, Statistic};
use crate::interpolation::{idw_estimate, IdwParams, KdTree};

/// One point of the tuning grid: folds, neighbor count and IDW exponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldConfig {
    folds: usize,
    neighbors: usize,
    power: f64,
    radius: Option<f64>,
}

impl FoldConfig {
    /// Validate and create a configuration.
    ///
    /// Requires `folds >= 2`, `neighbors >= 1` and a positive, finite `power`.
    pub fn new(folds: usize, neighbors: usize, power: f64) -> Result<Self> {
        if folds < 2 {
            return Err(Error::invalid("folds", folds, "must be at least 2"));
        }
        if neighbors == 0 {
            return Err(Error::invalid("neighbors", neighbors, "must be at least 1"));
        }
        if !(power > 0.0 && power.is_finite()) {
            return Err(Error::invalid("power", power, "must be positive and finite"));
        }
        Ok(Self {
            folds,
            neighbors,
            power,
            radius: None,
        })
    }

    /// Ignore neighbors farther than `radius` (the nearest is always kept).
    pub fn with_radius(mut self, radius: f64) -> Result<Self> {
        if radius.is_nan() || radius < 0.0 {
            return Err(Error::invalid("radius", radius, "must be non-negative"));
        }
        self.radius = Some(radius);
        Ok(self)
    }

    pub fn folds(&self) -> usize {
        self.folds
    }

    pub fn neighbors(&self) -> usize {
        self.neighbors
    }

    pub fn power(&self) -> f64 {
        self.power
    }

    pub fn radius(&self) -> Option<f64> {
        self.radius
    }

    /// IDW parameters used to estimate held-out points.
    pub fn idw_params(&self) -> IdwParams {
        IdwParams {
            power: self.power,
            radius: self.radius,
            ..Default::default()
        }
    }
}

impl fmt::Display for FoldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(F={}, N={}, P={:.2}", self.folds, self.neighbors, self.power)?;
        if let Some(r) = self.radius {
            write!(f, ", R={r}")?;
        }
        f.write_str(")")
    }
}

/// Cross-validated `statistic` for `config` over `partition`.
///
/// `config.folds()` must equal the number of groups in the partition.
pub fn evaluate<P: Sample>(
    partition: &Partition<P>,
    config: &FoldConfig,
    statistic: Statistic,
) -> Result<f64> {
    evaluate_with(
        partition,
        config,
        |e, y| statistic.error_term(e, y),
        statistic.post_transform(),
    )
}

/// Value of `statistic` on a single fold.
///
/// Lets callers drive the fold loop themselves, e.g. to check a
/// cancellation flag between folds.
pub fn evaluate_fold<P: Sample>(
    partition: &Partition<P>,
    fold: usize,
    config: &FoldConfig,
    statistic: Statistic,
) -> Result<f64> {
    check_folds(partition, config)?;
    fold_value(
        partition,
        fold,
        config,
        &|e: f64, y: f64| statistic.error_term(e, y),
        statistic.post_transform(),
    )
}

/// The fold driver behind every statistic: `term(estimate, truth)` per
/// held-out point, fold mean, `transform`, then the mean over folds.
pub fn evaluate_with<P, F>(
    partition: &Partition<P>,
    config: &FoldConfig,
    term: F,
    transform: PostTransform,
) -> Result<f64>
where
    P: Sample,
    F: Fn(f64, f64) -> Result<f64>,
{
    check_folds(partition, config)?;

    let mut total = 0.0;
    for fold in 0..config.folds() {
        total += fold_value(partition, fold, config, &term, transform)?;
    }
    Ok(total / config.folds() as f64)
}

pub(crate) fn check_folds<P>(partition: &Partition<P>, config: &FoldConfig) -> Result<()> {
    if partition.folds() != config.folds() {
        return Err(Error::invalid(
            "folds",
            config.folds(),
            format!("partition has {} groups", partition.folds()),
        ));
    }
    Ok(())
}

fn fold_value<P, F>(
    partition: &Partition<P>,
    fold: usize,
    config: &FoldConfig,
    term: &F,
    transform: PostTransform,
) -> Result<f64>
where
    P: Sample,
    F: Fn(f64, f64) -> Result<f64>,
{
    let (held_out, training) = partition.split(fold)?;
    let dimension = held_out
        .first()
        .map(|p| p.dimension())
        .ok_or_else(|| Error::Indeterminate(format!("fold {fold} has no held-out points")))?;
    let training_len = training.len();

    let tree = KdTree::from_points(dimension, training)?;
    let value = score_held_out(&tree, held_out, config, term, transform)?;

    debug!(
        fold,
        held_out = held_out.len(),
        training = training_len,
        value,
        "fold evaluated"
    );
    Ok(value)
}

/// Interpolate every held-out point from `tree` and reduce the error terms
/// to one fold value.
pub(crate) fn score_held_out<P, F>(
    tree: &KdTree<&P>,
    held_out: &[P],
    config: &FoldConfig,
    term: &F,
    transform: PostTransform,
) -> Result<f64>
where
    P: Sample,
    F: Fn(f64, f64) -> Result<f64>,
{
    if held_out.is_empty() {
        return Err(Error::Indeterminate("empty held-out fold".into()));
    }

    let params = config.idw_params();
    let mut sum = 0.0;
    let mut truths = Vec::with_capacity(held_out.len());

    for p in held_out {
        let truth = p.value().ok_or(Error::MissingValue)?;
        let neighbors = tree.nearest_neighbors(config.neighbors(), &p)?;
        let estimate = idw_estimate(neighbors.as_slice(), &params)?;
        sum += term(estimate, truth)?;
        truths.push(truth);
    }

    transform.apply(sum / held_out.len() as f64, &truths)
}
