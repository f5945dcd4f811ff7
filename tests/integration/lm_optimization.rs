//! Integration tests for the LM optimization algorithm.

use approx::assert_relative_eq;
use halofit_rs::lm::{ConvergenceStatus, DiffMethod, LevenbergMarquardt, LmConfig};
use halofit_rs::{HaloFitError, Problem, Result};
use ndarray::{array, Array1, Array2};

/// A straight line f(x) = a * x + b with an analytical Jacobian.
struct LinearModel {
    x_data: Array1<f64>,
    y_data: Array1<f64>,
}

impl Problem for LinearModel {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        if params.len() != 2 {
            return Err(HaloFitError::DimensionMismatch(format!(
                "Expected 2 parameters, got {}",
                params.len()
            )));
        }
        Ok(self.x_data.mapv(|x| params[0] * x + params[1]) - &self.y_data)
    }

    fn parameter_count(&self) -> usize {
        2
    }

    fn residual_count(&self) -> usize {
        self.x_data.len()
    }

    fn jacobian(&self, _params: &Array1<f64>) -> Result<Array2<f64>> {
        let mut jac = Array2::zeros((self.x_data.len(), 2));
        for (i, x) in self.x_data.iter().enumerate() {
            jac[[i, 0]] = *x;
            jac[[i, 1]] = 1.0;
        }
        Ok(jac)
    }

    fn has_custom_jacobian(&self) -> bool {
        true
    }
}

/// Exponential decay f(x) = a * exp(-b * x).
struct ExponentialModel {
    x_data: Array1<f64>,
    y_data: Array1<f64>,
}

impl Problem for ExponentialModel {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        Ok(self.x_data.mapv(|x| params[0] * (-params[1] * x).exp()) - &self.y_data)
    }

    fn parameter_count(&self) -> usize {
        2
    }

    fn residual_count(&self) -> usize {
        self.x_data.len()
    }
}

/// Rosenbrock as least squares: r = [10 (y - x²), 1 - x].
struct Rosenbrock;

impl Problem for Rosenbrock {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        let (x, y) = (params[0], params[1]);
        Ok(array![10.0 * (y - x * x), 1.0 - x])
    }

    fn parameter_count(&self) -> usize {
        2
    }

    fn residual_count(&self) -> usize {
        2
    }
}

/// sqrt(p) is undefined at a negative start.
struct SquareRoot;

impl Problem for SquareRoot {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        Ok(array![params[0].sqrt() - 2.0])
    }

    fn parameter_count(&self) -> usize {
        1
    }

    fn residual_count(&self) -> usize {
        1
    }
}

#[test]
fn test_linear_fit() {
    let x_data = Array1::linspace(0.0, 10.0, 11);
    // alternating ±0.1 noise
    let y_data = x_data.mapv(|x| 2.0 * x + 3.0) + Array1::from_shape_fn(11, |i| if i % 2 == 0 { 0.1 } else { -0.1 });
    let problem = LinearModel { x_data, y_data };

    for method in [DiffMethod::Analytical, DiffMethod::FiniteDifference] {
        let lm = LevenbergMarquardt::new().with_differentiation_method(method);
        let result = lm.minimize(&problem, array![1.0, 1.0]).unwrap();

        assert!(result.success, "{}", result.message);
        assert_relative_eq!(result.params[0], 2.0, epsilon = 0.05);
        assert_relative_eq!(result.params[1], 3.0, epsilon = 0.2);
        assert!(result.cost < 0.2);
    }
}

#[test]
fn test_exponential_fit() {
    let x_data = Array1::linspace(0.0, 5.0, 20);
    let y_data = x_data.mapv(|x| 2.0 * (-0.5_f64 * x).exp());
    let problem = ExponentialModel { x_data, y_data };

    let result = LevenbergMarquardt::new()
        .minimize(&problem, array![1.0, 0.1])
        .unwrap();

    assert!(result.success, "{}", result.message);
    assert_relative_eq!(result.params[0], 2.0, epsilon = 1e-4);
    assert_relative_eq!(result.params[1], 0.5, epsilon = 1e-4);
    assert!(result.cost < 1e-8);
}

#[test]
fn test_rosenbrock_optimization() {
    let lm = LevenbergMarquardt::with_config(LmConfig {
        max_iterations: 1000,
        ..LmConfig::default()
    });
    let result = lm.minimize(&Rosenbrock, array![-1.2, 1.0]).unwrap();

    assert!(result.success, "{}", result.message);
    assert_relative_eq!(result.params[0], 1.0, epsilon = 1e-4);
    assert_relative_eq!(result.params[1], 1.0, epsilon = 1e-4);
    assert!(result.cost < 1e-8);
}

#[test]
fn test_iteration_cap_is_not_success() {
    let lm = LevenbergMarquardt::new().with_max_iterations(1);
    let result = lm.minimize(&Rosenbrock, array![-1.2, 1.0]).unwrap();

    assert!(!result.success);
    assert_eq!(result.status, ConvergenceStatus::MaxIterationsReached);
}

#[test]
fn test_bad_inputs() {
    let problem = LinearModel {
        x_data: array![0.0, 1.0],
        y_data: array![1.0, 3.0],
    };
    let err = LevenbergMarquardt::new()
        .minimize(&problem, array![1.0, 1.0, 1.0])
        .unwrap_err();
    assert!(matches!(err, HaloFitError::DimensionMismatch(_)));

    let result = LevenbergMarquardt::new()
        .minimize(&SquareRoot, array![-1.0])
        .unwrap();
    assert!(!result.success);
    assert_eq!(result.status, ConvergenceStatus::NumericalError);
}
