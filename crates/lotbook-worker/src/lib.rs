//! Lotbook Worker - idempotent propagation operations and the job runtime
//!
//! This crate provides:
//! - `propagation`: the three document-rewrite operations (add, rename,
//!   remove) plus the job dispatcher shared by the runner and by inline
//!   fallback at trigger sites
//! - `runner`: the worker pool consuming the broker channel with bounded
//!   retry and backoff

pub mod propagation;
pub mod runner;

pub use runner::{JobRunner, RunnerConfig};
