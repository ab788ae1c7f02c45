//! Cross-validation of interpolation parameters
//!
//! - Partition: seeded split of a dataset into `k` balanced folds
//! - Statistic: MAE, MARE, MSE, RMSE, RMSPE and CVR²
//! - k-fold: the single fold driver shared by every statistic
//! - Bagging: bootstrap variant of the fold driver
//! - Sweep: evaluation of a configuration grid with best-result selection

mod bagging;
mod kfold;
mod partition;
mod statistic;
mod sweep;

pub use bagging::{evaluate_bagged, BaggingParams};
pub use kfold::{evaluate, evaluate_fold, evaluate_with, FoldConfig};
pub use partition::Partition;
pub use statistic::{observed_variance, PostTransform, Statistic};
pub use sweep::{power_range, sweep, ConfigGrid, SweepEntry, SweepReport};
