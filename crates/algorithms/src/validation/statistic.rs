//! Cross-validation error statistics
//!
//! Every statistic is a per-point error term summed over a held-out fold,
//! divided by the fold size, then passed through a post-transform.
//!
//! | Statistic | Per-point term | Post-transform |
//! |-----------|----------------|----------------|
//! | MAE       | \|e - y\|        | none |
//! | MARE      | \|e - y\| / y    | none |
//! | MSE       | (e - y)²       | none |
//! | RMSE      | (e - y)²       | sqrt |
//! | RMSPE     | ((e - y) / y)² | sqrt, × 100 |
//! | CVR²      | (e - y)²       | max(0, 1 - mean / observed variance) |

use std::fmt;
use std::str::FromStr;

use aeolus_core::{Error, Result};

/// Error statistic computed by k-fold cross-validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    /// Mean absolute error
    Mae,
    /// Mean absolute relative error
    Mare,
    /// Mean squared error
    Mse,
    /// Root mean squared error
    Rmse,
    /// Root mean squared percentage error
    Rmspe,
    /// Cross-validation R² skill score, clamped to [0, 1]
    Cvr2,
}

impl Statistic {
    pub const ALL: [Statistic; 6] = [
        Statistic::Mae,
        Statistic::Mare,
        Statistic::Mse,
        Statistic::Rmse,
        Statistic::Rmspe,
        Statistic::Cvr2,
    ];

    /// Error contributed by one held-out point with estimate `e` and truth `y`.
    pub fn error_term(self, estimate: f64, truth: f64) -> Result<f64> {
        let diff = estimate - truth;
        match self {
            Statistic::Mae => Ok(diff.abs()),
            Statistic::Mse | Statistic::Rmse | Statistic::Cvr2 => Ok(diff * diff),
            Statistic::Mare => Ok(diff.abs() / nonzero_truth(truth, self)?),
            Statistic::Rmspe => {
                let rel = diff / nonzero_truth(truth, self)?;
                Ok(rel * rel)
            }
        }
    }

    pub fn post_transform(self) -> PostTransform {
        match self {
            Statistic::Mae | Statistic::Mare | Statistic::Mse => PostTransform::Identity,
            Statistic::Rmse => PostTransform::Sqrt,
            Statistic::Rmspe => PostTransform::SqrtScaled(100.0),
            Statistic::Cvr2 => PostTransform::SkillScore,
        }
    }

    /// Skill scores are maximized, error statistics minimized.
    pub fn higher_is_better(self) -> bool {
        matches!(self, Statistic::Cvr2)
    }

    /// Whether `a` is strictly better than `b` under this statistic.
    pub fn is_better(self, a: f64, b: f64) -> bool {
        if self.higher_is_better() {
            a > b
        } else {
            a < b
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Statistic::Mae => "mae",
            Statistic::Mare => "mare",
            Statistic::Mse => "mse",
            Statistic::Rmse => "rmse",
            Statistic::Rmspe => "rmspe",
            Statistic::Cvr2 => "cvr2",
        }
    }
}

fn nonzero_truth(truth: f64, statistic: Statistic) -> Result<f64> {
    if truth == 0.0 {
        Err(Error::DivisionByZero(format!(
            "{statistic} is undefined for a true value of 0"
        )))
    } else {
        Ok(truth)
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Statistic::Mae => "MAE",
            Statistic::Mare => "MARE",
            Statistic::Mse => "MSE",
            Statistic::Rmse => "RMSE",
            Statistic::Rmspe => "RMSPE",
            Statistic::Cvr2 => "CVR2",
        })
    }
}

impl FromStr for Statistic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Statistic::ALL
            .into_iter()
            .find(|stat| stat.name() == lower)
            .ok_or_else(|| {
                Error::invalid("statistic", s, "expected mae, mare, mse, rmse, rmspe or cvr2")
            })
    }
}

/// Transform applied to a fold's mean error term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PostTransform {
    Identity,
    Sqrt,
    /// Square root, then multiplied by the factor
    SqrtScaled(f64),
    /// Divide by the observed variance of the held-out truths, then
    /// `max(0, 1 - ratio)`
    SkillScore,
}

impl PostTransform {
    /// Finish a fold. `truths` are the held-out true values.
    pub fn apply(self, fold_mean: f64, truths: &[f64]) -> Result<f64> {
        match self {
            PostTransform::Identity => Ok(fold_mean),
            PostTransform::Sqrt => Ok(fold_mean.sqrt()),
            PostTransform::SqrtScaled(factor) => Ok(fold_mean.sqrt() * factor),
            PostTransform::SkillScore => {
                let variance = observed_variance(truths)?;
                if variance == 0.0 {
                    return Err(Error::Indeterminate(
                        "held-out values have zero variance".into(),
                    ));
                }
                Ok((1.0 - fold_mean / variance).max(0.0))
            }
        }
    }
}

/// Mean squared deviation of `values` from their own mean.
pub fn observed_variance(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::Indeterminate("variance of an empty fold".into()));
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    Ok(values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n)
}
