//! Parameter sweeps over (neighbors, power) grids
//!
//! Every configuration is evaluated independently over the same shared
//! partition. A configuration that fails is recorded with its error and
//! does not stop the others.

use std::ops::RangeInclusive;

use aeolus_core::{Error, Result, Sample};
use aeolus_parallel::{ParallelStrategy, ProcessingMode};
use tracing::{info, warn};

use super::kfold::{evaluate, FoldConfig};
use super::partition::Partition;
use super::statistic::Statistic;

/// Cartesian grid of configurations: every neighbor count with every power.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigGrid {
    pub folds: usize,
    pub neighbors: RangeInclusive<usize>,
    pub powers: Vec<f64>,
    pub radius: Option<f64>,
}

impl Default for ConfigGrid {
    /// F = 10, N in 3..=7, P from 1.0 to 5.0 in steps of 0.1 (205 configurations)
    fn default() -> Self {
        Self {
            folds: 10,
            neighbors: 3..=7,
            powers: power_range(1.0, 5.0, 0.1),
            radius: None,
        }
    }
}

impl ConfigGrid {
    /// Validated configurations, neighbor count major and power minor.
    pub fn configurations(&self) -> Result<Vec<FoldConfig>> {
        let mut configs = Vec::with_capacity(self.len());
        for n in self.neighbors.clone() {
            for &p in &self.powers {
                let config = FoldConfig::new(self.folds, n, p)?;
                configs.push(match self.radius {
                    Some(r) => config.with_radius(r)?,
                    None => config,
                });
            }
        }
        Ok(configs)
    }

    pub fn len(&self) -> usize {
        self.neighbors.clone().count() * self.powers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `start, start + step, ...` up to `end` inclusive.
///
/// Values are computed from their index so the last one lands on `end`
/// instead of drifting by accumulated rounding.
pub fn power_range(start: f64, end: f64, step: f64) -> Vec<f64> {
    if step.is_nan() || step <= 0.0 || end < start {
        return Vec::new();
    }
    let count = ((end - start) / step).round() as usize + 1;
    (0..count).map(|i| start + i as f64 * step).collect()
}

/// Outcome of one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepEntry {
    pub config: FoldConfig,
    pub outcome: Result<f64>,
}

/// All outcomes of a sweep, in configuration order.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    statistic: Statistic,
    entries: Vec<SweepEntry>,
}

impl SweepReport {
    pub fn statistic(&self) -> Statistic {
        self.statistic
    }

    pub fn entries(&self) -> &[SweepEntry] {
        &self.entries
    }

    pub fn successes(&self) -> impl Iterator<Item = (&FoldConfig, f64)> + '_ {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().ok().map(|&v| (&e.config, v)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&FoldConfig, &Error)> + '_ {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().err().map(|err| (&e.config, err)))
    }

    /// Best successful configuration: lowest error, or highest CVR².
    ///
    /// The earliest configuration wins ties; NaN results are never best.
    pub fn best(&self) -> Option<(&FoldConfig, f64)> {
        let mut best: Option<(&FoldConfig, f64)> = None;
        for (config, value) in self.successes() {
            if value.is_nan() {
                continue;
            }
            match best {
                Some((_, b)) if !self.statistic.is_better(value, b) => {}
                _ => best = Some((config, value)),
            }
        }
        best
    }
}

/// Evaluate `statistic` for every configuration over `partition`.
pub fn sweep<P>(
    partition: &Partition<P>,
    configs: &[FoldConfig],
    statistic: Statistic,
    mode: ProcessingMode,
) -> SweepReport
where
    P: Sample + Sync,
{
    let outcomes = mode.par_map(0..configs.len(), |i| evaluate(partition, &configs[i], statistic));

    let entries: Vec<SweepEntry> = configs
        .iter()
        .zip(outcomes)
        .map(|(&config, outcome)| SweepEntry { config, outcome })
        .collect();
    let report = SweepReport { statistic, entries };

    for (config, err) in report.failures() {
        warn!(%statistic, %config, error = %err, "configuration failed");
    }
    match report.best() {
        Some((config, value)) => info!(
            %statistic,
            configs = configs.len(),
            failed = report.failures().count(),
            %config,
            value,
            "sweep finished"
        ),
        None => info!(%statistic, configs = configs.len(), "sweep finished without a result"),
    }
    report
}
