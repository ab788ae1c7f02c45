//! k-fold partitions
//!
//! A partition splits a dataset into `k` disjoint groups whose sizes differ
//! by at most one. It is created once per run and only read afterwards, so
//! it can be shared across threads evaluating different configurations.

use aeolus_core::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// `k` disjoint, size-balanced groups of points.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<P> {
    groups: Vec<Vec<P>>,
}

impl<P> Partition<P> {
    /// Shuffle `points` and deal them into `k` groups.
    ///
    /// With `n` points, the first `n mod k` groups receive `ceil(n / k)`
    /// points and the rest `floor(n / k)`. `seed` makes the shuffle
    /// reproducible; `None` draws from OS entropy.
    pub fn random(mut points: Vec<P>, k: usize, seed: Option<u64>) -> Result<Self> {
        check_fold_count(points.len(), k)?;
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        points.shuffle(&mut rng);
        Self::round_robin(points, k)
    }

    /// Deal `points` into `k` groups in order: point `i` joins group `i mod k`.
    pub fn round_robin(points: Vec<P>, k: usize) -> Result<Self> {
        check_fold_count(points.len(), k)?;
        let per_group = points.len().div_ceil(k);
        let mut groups: Vec<Vec<P>> = (0..k).map(|_| Vec::with_capacity(per_group)).collect();
        for (i, p) in points.into_iter().enumerate() {
            groups[i % k].push(p);
        }
        Ok(Self { groups })
    }

    /// Use explicit groups, e.g. a fixed partition in tests.
    pub fn from_groups(groups: Vec<Vec<P>>) -> Result<Self> {
        if groups.len() < 2 {
            return Err(Error::invalid("folds", groups.len(), "need at least 2 groups"));
        }
        let min = groups.iter().map(Vec::len).min().unwrap_or(0);
        let max = groups.iter().map(Vec::len).max().unwrap_or(0);
        if min == 0 {
            return Err(Error::invalid("groups", format!("{min}..{max}"), "groups must be non-empty"));
        }
        if max - min > 1 {
            return Err(Error::invalid(
                "groups",
                format!("{min}..{max}"),
                "group sizes must differ by at most 1",
            ));
        }
        Ok(Self { groups })
    }

    /// Number of groups (folds).
    pub fn folds(&self) -> usize {
        self.groups.len()
    }

    /// Total number of points across all groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Vec::is_empty)
    }

    pub fn group(&self, fold: usize) -> Option<&[P]> {
        self.groups.get(fold).map(Vec::as_slice)
    }

    pub fn groups(&self) -> &[Vec<P>] {
        &self.groups
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.groups.iter().map(Vec::len).collect()
    }

    /// Held-out group `fold` and the concatenation of all other groups.
    pub fn split(&self, fold: usize) -> Result<(&[P], Vec<&P>)> {
        let held_out = self.group(fold).ok_or_else(|| {
            Error::invalid("fold", fold, format!("partition has {} folds", self.folds()))
        })?;
        let training = self
            .groups
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != fold)
            .flat_map(|(_, g)| g.iter())
            .collect();
        Ok((held_out, training))
    }

    pub fn into_groups(self) -> Vec<Vec<P>> {
        self.groups
    }
}

fn check_fold_count(n: usize, k: usize) -> Result<()> {
    if k < 2 {
        return Err(Error::invalid("folds", k, "must be at least 2"));
    }
    if k > n {
        return Err(Error::invalid(
            "folds",
            k,
            format!("cannot exceed the number of points ({n})"),
        ));
    }
    Ok(())
}
