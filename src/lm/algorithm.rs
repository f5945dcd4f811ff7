//! Implementation of the Levenberg-Marquardt algorithm.
//!
//! This module contains the core implementation of the Levenberg-Marquardt algorithm
//! for nonlinear least-squares optimization. The optimizer is deterministic: the
//! same problem and starting point always produce the same iterates.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};
use std::fmt;

use crate::error::{HaloFitError, Result};
use crate::problem::Problem;
use crate::utils::matrix_convert::{
    nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra,
};

use super::config::{DecompositionMethod, DiffMethod, LmConfig};
use super::convergence::{ConvergenceCriteria, ConvergenceStatus};

/// Result of the Levenberg-Marquardt optimization.
#[derive(Debug, Clone)]
pub struct LmResult {
    /// Optimized parameter values
    pub params: Array1<f64>,

    /// Residuals at the solution
    pub residuals: Array1<f64>,

    /// Sum of squared residuals
    pub cost: f64,

    /// Number of accepted iterations performed
    pub iterations: usize,

    /// Number of function evaluations
    pub func_evals: usize,

    /// Whether the optimization succeeded
    pub success: bool,

    /// Terminal state of the iteration
    pub status: ConvergenceStatus,

    /// A message describing the result
    pub message: String,

    /// The Jacobian matrix at the solution (if requested)
    pub jacobian: Option<Array2<f64>>,
}

impl fmt::Display for LmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result:")?;
        writeln!(f, "  Success: {}", self.success)?;
        writeln!(f, "  Message: {}", self.message)?;
        writeln!(f, "  Cost: {:.6e}", self.cost)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        writeln!(f, "  Parameters: {:?}", self.params)?;
        Ok(())
    }
}

/// The Levenberg-Marquardt optimizer.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    /// Configuration options
    config: LmConfig,
}

impl LevenbergMarquardt {
    /// Create a new Levenberg-Marquardt optimizer with default configuration.
    pub fn new() -> Self {
        Self {
            config: LmConfig::default(),
        }
    }

    /// Create a new Levenberg-Marquardt optimizer with the given configuration.
    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Set the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the tolerance for change in residual norm.
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.config.ftol = ftol;
        self
    }

    /// Set the tolerance for change in parameter values.
    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.config.xtol = xtol;
        self
    }

    /// Set the tolerance for gradient norm.
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.config.gtol = gtol;
        self
    }

    /// Set the initial value for the damping parameter.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.config.initial_lambda = lambda;
        self
    }

    /// Set the method used for calculating the Jacobian.
    pub fn with_differentiation_method(mut self, method: DiffMethod) -> Self {
        self.config.diff_method = method;
        self
    }

    /// Set the method used for solving the linear system.
    pub fn with_decomposition_method(mut self, method: DecompositionMethod) -> Self {
        self.config.decomposition_method = method;
        self
    }

    /// Set whether to calculate and return the Jacobian at the solution.
    pub fn with_calc_jacobian(mut self, calc_jacobian: bool) -> Self {
        self.config.calc_jacobian = calc_jacobian;
        self
    }

    /// Minimize the sum of squared residuals for the given problem.
    ///
    /// Failure to converge is not an error: the returned [`LmResult`] carries
    /// `success = false` and the terminal [`ConvergenceStatus`]. Errors are
    /// reserved for dimension mismatches and evaluation failures reported by
    /// the problem itself.
    ///
    /// # Arguments
    ///
    /// * `problem` - The problem to solve
    /// * `initial_params` - Initial guess for the parameter values
    pub fn minimize<P: Problem>(
        &self,
        problem: &P,
        initial_params: Array1<f64>,
    ) -> Result<LmResult> {
        let n_params = problem.parameter_count();
        if initial_params.len() != n_params {
            return Err(HaloFitError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                n_params,
                initial_params.len()
            )));
        }

        let criteria = ConvergenceCriteria::new(
            self.config.xtol,
            self.config.ftol,
            self.config.gtol,
            self.config.max_iterations,
        );

        let mut params = initial_params;
        let mut lambda = self.config.initial_lambda;
        let mut residuals = problem.eval(&params)?;
        let mut func_evals = 1;
        let mut cost = sum_of_squares(&residuals);
        let mut iterations = 0;

        if !cost.is_finite() {
            return self.finish(
                problem,
                params,
                residuals,
                cost,
                iterations,
                func_evals,
                ConvergenceStatus::NumericalError,
            );
        }
        if cost == 0.0 || n_params == 0 {
            return self.finish(
                problem,
                params,
                residuals,
                cost,
                iterations,
                func_evals,
                ConvergenceStatus::ZeroResidual,
            );
        }

        let mut jacobian = self.evaluate_jacobian(problem, &params)?;
        func_evals += n_params;

        loop {
            if jacobian.iter().any(|v| !v.is_finite()) {
                return self.finish(
                    problem,
                    params,
                    residuals,
                    cost,
                    iterations,
                    func_evals,
                    ConvergenceStatus::NumericalError,
                );
            }

            let j = ndarray_to_nalgebra(&jacobian)?;
            let r = ndarray_vec_to_nalgebra(&residuals);
            let jtj = j.transpose() * &j;
            let gradient = j.transpose() * &r;
            let gradient_norm = gradient.norm();

            if gradient_norm < self.config.gtol {
                return self.finish(
                    problem,
                    params,
                    residuals,
                    cost,
                    iterations,
                    func_evals,
                    ConvergenceStatus::GradientConvergence,
                );
            }

            // Inner loop: raise lambda until a step decreases the cost.
            loop {
                let step = match self.calculate_step(&jtj, &gradient, lambda) {
                    Some(step) => step,
                    None => {
                        lambda = (lambda * self.config.lambda_up_factor).min(self.config.max_lambda);
                        if lambda >= self.config.max_lambda {
                            return self.finish(
                                problem,
                                params,
                                residuals,
                                cost,
                                iterations,
                                func_evals,
                                ConvergenceStatus::DampingSaturated,
                            );
                        }
                        continue;
                    }
                };

                let new_params = &params - &step;
                let new_residuals = problem.eval(&new_params)?;
                func_evals += 1;
                let new_cost = sum_of_squares(&new_residuals);

                if new_cost.is_finite() && new_cost < cost {
                    iterations += 1;
                    let status = criteria.check(
                        &params,
                        &new_params,
                        cost,
                        new_cost,
                        gradient_norm,
                        iterations,
                    );

                    params = new_params;
                    residuals = new_residuals;
                    cost = new_cost;
                    lambda = (lambda * self.config.lambda_down_factor).max(self.config.min_lambda);

                    if status.is_terminated() {
                        return self.finish(
                            problem,
                            params,
                            residuals,
                            cost,
                            iterations,
                            func_evals,
                            status,
                        );
                    }
                    break;
                }

                // Rejected: a vanishing step means no further progress is possible.
                if ConvergenceCriteria::relative_step(&params, &new_params) < self.config.xtol {
                    return self.finish(
                        problem,
                        params,
                        residuals,
                        cost,
                        iterations,
                        func_evals,
                        ConvergenceStatus::ParameterConvergence,
                    );
                }

                lambda = (lambda * self.config.lambda_up_factor).min(self.config.max_lambda);
                if lambda >= self.config.max_lambda {
                    return self.finish(
                        problem,
                        params,
                        residuals,
                        cost,
                        iterations,
                        func_evals,
                        ConvergenceStatus::DampingSaturated,
                    );
                }
            }

            jacobian = self.evaluate_jacobian(problem, &params)?;
            func_evals += n_params;
        }
    }

    fn evaluate_jacobian<P: Problem>(&self, problem: &P, params: &Array1<f64>) -> Result<Array2<f64>> {
        match self.config.diff_method {
            DiffMethod::Analytical if problem.has_custom_jacobian() => problem.jacobian(params),
            _ => crate::utils::finite_difference::jacobian(problem, params, None),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn finish<P: Problem>(
        &self,
        problem: &P,
        params: Array1<f64>,
        residuals: Array1<f64>,
        cost: f64,
        iterations: usize,
        func_evals: usize,
        status: ConvergenceStatus,
    ) -> Result<LmResult> {
        let jacobian = if self.config.calc_jacobian && status.is_converged() {
            Some(self.evaluate_jacobian(problem, &params)?)
        } else {
            None
        };
        Ok(LmResult {
            params,
            residuals,
            cost,
            iterations,
            func_evals,
            success: status.is_converged(),
            status,
            message: status.description(),
            jacobian,
        })
    }

    /// Calculate the Levenberg-Marquardt step.
    ///
    /// Solves (JᵀJ + λD) δ = Jᵀr, where D is the identity or diag(JᵀJ)
    /// depending on the configuration. The new point is x − δ.
    ///
    /// Returns `None` if the damped system could not be solved.
    fn calculate_step(&self, jtj: &DMatrix<f64>, jtr: &DVector<f64>, lambda: f64) -> Option<Array1<f64>> {
        let n = jtj.nrows();
        let mut a = jtj.clone();
        for i in 0..n {
            let scale = if self.config.scale_diagonal {
                jtj[(i, i)].max(1e-12)
            } else {
                1.0
            };
            a[(i, i)] += lambda * scale;
        }

        let step = match self.config.decomposition_method {
            DecompositionMethod::Cholesky => a.cholesky().map(|c| c.solve(jtr)),
            DecompositionMethod::SVD => a.svd(true, true).solve(jtr, 1e-14).ok(),
            DecompositionMethod::Auto => match a.clone().cholesky() {
                Some(c) => Some(c.solve(jtr)),
                None => a.svd(true, true).solve(jtr, 1e-14).ok(),
            },
        }?;

        if step.iter().all(|v| v.is_finite()) {
            Some(nalgebra_vec_to_ndarray(&step))
        } else {
            None
        }
    }
}

fn sum_of_squares(residuals: &Array1<f64>) -> f64 {
    residuals.iter().map(|r| r * r).sum()
}
