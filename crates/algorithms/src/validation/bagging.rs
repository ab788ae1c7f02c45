//! Bagged cross-validation
//!
//! Instead of one tree over the full training set, each fold is scored
//! against several bootstrap bags drawn with replacement from its training
//! points, and the fold value is the mean over bags. This shows how
//! sensitive a configuration is to the particular samples it sees.

use aeolus_core::{Error, Result, Sample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::kfold::{check_folds, score_held_out, FoldConfig};
use super::partition::Partition;
use super::statistic::Statistic;
use crate::interpolation::KdTree;

/// Bootstrap settings for [`evaluate_bagged`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaggingParams {
    /// Number of bags per fold
    pub bags: usize,
    /// Bag size as a fraction of the fold's training set
    pub alpha: f64,
    /// Seed for bag sampling, `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for BaggingParams {
    fn default() -> Self {
        Self {
            bags: 10,
            alpha: 0.8,
            seed: None,
        }
    }
}

impl BaggingParams {
    fn validate(&self) -> Result<()> {
        if self.bags == 0 {
            return Err(Error::invalid("bags", self.bags, "must be at least 1"));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(Error::invalid("alpha", self.alpha, "must be in (0, 1]"));
        }
        Ok(())
    }
}

/// Cross-validated `statistic` where every fold averages over bootstrap bags.
///
/// Each bag holds `floor(|training| * alpha)` points drawn with
/// replacement; a bag size of zero is an error.
pub fn evaluate_bagged<P: Sample>(
    partition: &Partition<P>,
    config: &FoldConfig,
    statistic: Statistic,
    params: &BaggingParams,
) -> Result<f64> {
    params.validate()?;
    check_folds(partition, config)?;

    let mut rng = match params.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    let term = |e: f64, y: f64| statistic.error_term(e, y);
    let transform = statistic.post_transform();

    let mut total = 0.0;
    for fold in 0..config.folds() {
        let (held_out, training) = partition.split(fold)?;
        let dimension = held_out
            .first()
            .map(|p| p.dimension())
            .ok_or_else(|| Error::Indeterminate(format!("fold {fold} has no held-out points")))?;

        let bag_size = (training.len() as f64 * params.alpha).floor() as usize;
        if bag_size == 0 {
            return Err(Error::invalid(
                "alpha",
                params.alpha,
                format!("bag of {} training points would be empty", training.len()),
            ));
        }

        let mut fold_total = 0.0;
        for _ in 0..params.bags {
            let bag: Vec<&P> = (0..bag_size)
                .map(|_| training[rng.random_range(0..training.len())])
                .collect();
            let tree = KdTree::from_points(dimension, bag)?;
            fold_total += score_held_out(&tree, held_out, config, &term, transform)?;
        }
        let value = fold_total / params.bags as f64;

        debug!(fold, bags = params.bags, bag_size, value, "bagged fold evaluated");
        total += value;
    }
    Ok(total / config.folds() as f64)
}
