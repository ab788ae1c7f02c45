//! # Aeolus Parallel
//!
//! Execution strategies for running many independent evaluations.
//!
//! Cross-validation of one configuration is sequential; sweeping many
//! configurations over a shared read-only partition is embarrassingly
//! parallel. This crate provides the knob that decides how such sweeps run:
//! - Sequential execution on the calling thread
//! - Rayon's global pool
//! - A dedicated pool with a fixed number of threads
//!
//! Without the `rayon` feature every mode runs sequentially.

pub mod strategy;

pub use strategy::{num_threads, ParallelStrategy, ProcessingMode};
