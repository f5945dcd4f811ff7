//! Finite difference methods for numerical differentiation.
//!
//! This module provides functions for computing derivatives and Jacobians
//! using finite difference approximations.

use crate::error::{HaloFitError, Result};
use crate::problem::Problem;
use ndarray::{Array1, Array2};

/// Default step size for forward differences.
const DEFAULT_EPSILON: f64 = 1e-8;

/// Default step size for central differences.
const DEFAULT_CENTRAL_EPSILON: f64 = 1e-6;

/// Step for parameter `j`, scaled to its magnitude.
fn scaled_step(value: f64, eps: f64) -> f64 {
    if value.abs() > eps {
        value.abs() * eps
    } else {
        eps
    }
}

/// Compute the Jacobian matrix using forward finite differences.
///
/// The Jacobian is the matrix of partial derivatives of the residuals with
/// respect to the parameters: J[i,j] = ∂residual[i]/∂param[j].
///
/// # Arguments
///
/// * `problem` - The problem to evaluate
/// * `params` - The parameter values at which to evaluate the Jacobian
/// * `epsilon` - The step size for finite differences (optional)
///
/// # Returns
///
/// * `Result<Array2<f64>>` - The Jacobian matrix
pub fn jacobian(
    problem: &dyn Problem,
    params: &Array1<f64>,
    epsilon: Option<f64>,
) -> Result<Array2<f64>> {
    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    let n_params = params.len();
    let n_residuals = problem.residual_count();

    let residuals = problem.eval(params)?;
    check_len(residuals.len(), n_residuals)?;

    let mut jac = Array2::zeros((n_residuals, n_params));

    for j in 0..n_params {
        let mut params_perturbed = params.clone();
        let eps_j = scaled_step(params[j], eps);
        params_perturbed[j] += eps_j;

        let residuals_perturbed = problem.eval(&params_perturbed)?;
        check_len(residuals_perturbed.len(), n_residuals)?;

        for i in 0..n_residuals {
            jac[[i, j]] = (residuals_perturbed[i] - residuals[i]) / eps_j;
        }
    }

    Ok(jac)
}

/// Compute the Jacobian matrix using central finite differences.
///
/// Twice the evaluations of [`jacobian`]; used once per fit for the
/// covariance at the optimum, where the extra accuracy matters.
pub fn jacobian_central(
    problem: &dyn Problem,
    params: &Array1<f64>,
    epsilon: Option<f64>,
) -> Result<Array2<f64>> {
    let eps = epsilon.unwrap_or(DEFAULT_CENTRAL_EPSILON);
    let n_params = params.len();
    let n_residuals = problem.residual_count();

    let mut jac = Array2::zeros((n_residuals, n_params));

    for j in 0..n_params {
        let eps_j = scaled_step(params[j], eps);

        let mut forward = params.clone();
        forward[j] += eps_j;
        let mut backward = params.clone();
        backward[j] -= eps_j;

        let r_forward = problem.eval(&forward)?;
        let r_backward = problem.eval(&backward)?;
        check_len(r_forward.len(), n_residuals)?;
        check_len(r_backward.len(), n_residuals)?;

        for i in 0..n_residuals {
            jac[[i, j]] = (r_forward[i] - r_backward[i]) / (2.0 * eps_j);
        }
    }

    Ok(jac)
}

/// Compute the gradient of a scalar function using central finite differences.
///
/// # Arguments
///
/// * `f` - The function to differentiate
/// * `params` - The parameter values at which to evaluate the gradient
/// * `epsilon` - The step size for finite differences (optional)
pub fn gradient<F>(f: F, params: &Array1<f64>, epsilon: Option<f64>) -> Result<Array1<f64>>
where
    F: Fn(&Array1<f64>) -> Result<f64>,
{
    let eps = epsilon.unwrap_or(DEFAULT_CENTRAL_EPSILON);
    let n_params = params.len();

    let mut grad = Array1::zeros(n_params);

    for j in 0..n_params {
        let eps_j = scaled_step(params[j], eps);

        let mut params_forward = params.clone();
        params_forward[j] += eps_j;
        let mut params_backward = params.clone();
        params_backward[j] -= eps_j;

        let f_forward = f(&params_forward)?;
        let f_backward = f(&params_backward)?;

        grad[j] = (f_forward - f_backward) / (2.0 * eps_j);
    }

    Ok(grad)
}

fn check_len(got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(HaloFitError::DimensionMismatch(format!(
            "Expected {} residuals, got {}",
            expected, got
        )));
    }
    Ok(())
}
