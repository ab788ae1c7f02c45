//! Parallel processing strategies

use std::ops::Range;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Processing mode for batch evaluations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    /// Single-threaded processing
    Sequential,
    /// Parallel processing using all available cores
    #[default]
    Parallel,
    /// Parallel with specified number of threads
    ParallelWith(usize),
}

/// Strategy for parallel execution
pub trait ParallelStrategy {
    /// Execute a function over indices
    fn par_for_each<F>(&self, range: Range<usize>, f: F)
    where
        F: Fn(usize) + Sync + Send;

    /// Map a function over indices and collect results in index order
    fn par_map<T, F>(&self, range: Range<usize>, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send;
}

#[cfg(feature = "rayon")]
fn scoped_pool(threads: usize) -> Option<rayon::ThreadPool> {
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            tracing::warn!(threads, error = %e, "failed to build thread pool, using global pool");
            None
        }
    }
}

impl ParallelStrategy for ProcessingMode {
    fn par_for_each<F>(&self, range: Range<usize>, f: F)
    where
        F: Fn(usize) + Sync + Send,
    {
        match self {
            ProcessingMode::Sequential => range.for_each(f),
            #[cfg(feature = "rayon")]
            ProcessingMode::Parallel => range.into_par_iter().for_each(f),
            #[cfg(feature = "rayon")]
            ProcessingMode::ParallelWith(threads) => match scoped_pool(*threads) {
                Some(pool) => pool.install(|| range.into_par_iter().for_each(f)),
                None => range.into_par_iter().for_each(f),
            },
            #[cfg(not(feature = "rayon"))]
            _ => range.for_each(f),
        }
    }

    fn par_map<T, F>(&self, range: Range<usize>, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        match self {
            ProcessingMode::Sequential => range.map(f).collect(),
            #[cfg(feature = "rayon")]
            ProcessingMode::Parallel => range.into_par_iter().map(f).collect(),
            #[cfg(feature = "rayon")]
            ProcessingMode::ParallelWith(threads) => match scoped_pool(*threads) {
                Some(pool) => pool.install(|| range.into_par_iter().map(f).collect()),
                None => range.into_par_iter().map(f).collect(),
            },
            #[cfg(not(feature = "rayon"))]
            _ => range.map(f).collect(),
        }
    }
}

/// Number of worker threads a `Parallel` sweep will use
pub fn num_threads() -> usize {
    #[cfg(feature = "rayon")]
    {
        rayon::current_num_threads()
    }
    #[cfg(not(feature = "rayon"))]
    {
        1
    }
}
