//! # Uncertainty Calculation
//!
//! Parameter uncertainties at a rotation-curve solution:
//!
//! - covariance from the external-space Jacobian, scaled by reduced χ²
//! - standard errors of the free parameters
//! - propagation to derived parameters through a finite-difference gradient
//! - sanitising of meaningless errors before results are aggregated

mod covariance;

pub use covariance::{calculate_correlation, calculate_covariance, standard_errors_from_covariance};

use crate::error::Result;
use crate::parameters::Parameters;
use crate::utils::finite_difference;
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Covariance and standard errors of one fit.
#[derive(Debug, Clone)]
pub struct UncertaintyResult {
    /// Covariance of the varying parameters, in schema order
    pub covariance: Array2<f64>,
    /// Standard errors of varying and derived parameters
    pub standard_errors: HashMap<String, f64>,
}

/// Estimate standard errors for `params` at the solution.
///
/// `jacobian` is taken in external space. Derived parameters get
/// σ_d² = ∇dᵀ C ∇d, with ∇d the central-difference gradient of the derived
/// value with respect to the varying parameters.
pub fn uncertainty_analysis(
    jacobian: &Array2<f64>,
    params: &Parameters,
    redchi: f64,
) -> Result<UncertaintyResult> {
    let covariance = calculate_covariance(jacobian, redchi)?;
    let errors = standard_errors_from_covariance(&covariance);

    let mut standard_errors = HashMap::new();
    for (name, err) in params.varying_names().into_iter().zip(errors.iter()) {
        standard_errors.insert(name, *err);
    }

    let values = params.varying_values();
    for derived in params.iter().filter(|p| p.is_derived()) {
        let name = derived.name().to_string();
        let gradient = finite_difference::gradient(
            |x: &Array1<f64>| -> Result<f64> {
                let mut trial = params.clone();
                trial.set_varying_values(x)?;
                Ok(trial.value(&name)?)
            },
            &values,
            None,
        )?;
        let variance = gradient.dot(&covariance.dot(&gradient));
        let err = if variance >= 0.0 { variance.sqrt() } else { f64::NAN };
        standard_errors.insert(name, err);
    }

    Ok(UncertaintyResult {
        covariance,
        standard_errors,
    })
}

/// Replace an error that carries no information by +∞: missing, NaN, or at
/// least as large as the value itself.
pub fn sanitize_stderr(value: f64, stderr: Option<f64>) -> f64 {
    match stderr {
        Some(err) if err.is_finite() && err < value.abs() => err,
        _ => f64::INFINITY,
    }
}
