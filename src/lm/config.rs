//! Configuration options for the Levenberg-Marquardt algorithm.
//!
//! This module defines the configuration options and parameter settings for the
//! Levenberg-Marquardt algorithm, including convergence criteria and the
//! method used to solve the damped normal equations.

use serde::{Deserialize, Serialize};

/// Method for calculating the Jacobian matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DiffMethod {
    /// Use forward finite differences to approximate the Jacobian
    #[default]
    FiniteDifference,

    /// Use the analytical Jacobian provided by the problem implementation
    Analytical,
}

/// Method for solving the linear system in the Levenberg-Marquardt step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecompositionMethod {
    /// Use Cholesky decomposition (fastest but requires positive definite matrix)
    Cholesky,

    /// Use SVD decomposition (most stable but slowest, handles rank-deficient matrices)
    SVD,

    /// Cholesky first, SVD when the damped matrix is not positive definite
    #[default]
    Auto,
}

/// Configuration options for the Levenberg-Marquardt algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LmConfig {
    /// Maximum number of accepted iterations. Default: 200
    pub max_iterations: usize,

    /// Tolerance for relative change in the cost. Default: 1e-10
    pub ftol: f64,

    /// Tolerance for relative change in parameter values. Default: 1e-10
    pub xtol: f64,

    /// Tolerance for gradient norm. Default: 1e-10
    pub gtol: f64,

    /// Initial value for the damping parameter. Default: 1e-3
    pub initial_lambda: f64,

    /// Factor by which to increase lambda. Default: 10.0
    pub lambda_up_factor: f64,

    /// Factor by which to decrease lambda. Default: 0.1
    pub lambda_down_factor: f64,

    /// Minimum value for lambda. Default: 1e-12
    pub min_lambda: f64,

    /// Maximum value for lambda. Default: 1e12
    pub max_lambda: f64,

    /// Damp with λ·diag(JᵀJ) (Marquardt) instead of λ·I. Default: true
    pub scale_diagonal: bool,

    /// Method to use for calculating the Jacobian. Default: FiniteDifference
    pub diff_method: DiffMethod,

    /// Method to use for solving the linear system. Default: Auto
    pub decomposition_method: DecompositionMethod,

    /// Whether to calculate and return the Jacobian at the solution. Default: true
    pub calc_jacobian: bool,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            ftol: 1e-10,
            xtol: 1e-10,
            gtol: 1e-10,
            initial_lambda: 1e-3,
            lambda_up_factor: 10.0,
            lambda_down_factor: 0.1,
            min_lambda: 1e-12,
            max_lambda: 1e12,
            scale_diagonal: true,
            diff_method: DiffMethod::default(),
            decomposition_method: DecompositionMethod::default(),
            calc_jacobian: true,
        }
    }
}
