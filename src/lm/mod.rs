//! Levenberg-Marquardt algorithm implementation.
//!
//! This module provides the bounded least-squares engine used by the
//! per-galaxy fitter. Bounds are handled outside the optimizer through the
//! parameter transforms in [`crate::parameters::bounds`].

pub mod algorithm;
pub mod config;
pub mod convergence;

// Re-export key types
pub use algorithm::{LevenbergMarquardt, LmResult};
pub use config::{DecompositionMethod, DiffMethod, LmConfig};
pub use convergence::{ConvergenceCriteria, ConvergenceStatus};
