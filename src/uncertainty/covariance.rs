//! # Covariance Matrix Calculations
//!
//! Covariance, correlation and standard errors from the Jacobian of the
//! weighted residuals at a least-squares solution.

use crate::error::{HaloFitError, Result};
use crate::utils::matrix_convert::{nalgebra_to_ndarray, ndarray_to_nalgebra};
use ndarray::{Array1, Array2};

/// Calculate the covariance matrix from a Jacobian matrix.
///
/// For nonlinear least-squares problems the covariance is estimated as
///   covar = redchi * inv(J^T * J)
/// where J is the Jacobian of the residuals with respect to the external
/// parameter values and redchi the reduced chi-square.
///
/// # Errors
///
/// `SingularMatrix` when J^T J cannot be inverted, `DimensionMismatch` for an
/// empty Jacobian.
pub fn calculate_covariance(jacobian: &Array2<f64>, redchi: f64) -> Result<Array2<f64>> {
    if jacobian.ncols() == 0 || jacobian.nrows() == 0 {
        return Err(HaloFitError::DimensionMismatch(
            "cannot compute a covariance from an empty Jacobian".to_string(),
        ));
    }
    if jacobian.iter().any(|v| !v.is_finite()) {
        return Err(HaloFitError::SingularMatrix);
    }

    let j = ndarray_to_nalgebra(jacobian)?;
    let jtj = j.transpose() * &j;
    let inverse = jtj.try_inverse().ok_or(HaloFitError::SingularMatrix)?;

    Ok(nalgebra_to_ndarray(&inverse).mapv(|v| v * redchi))
}

/// Calculate the correlation matrix from a covariance matrix.
///
///   correl[i,j] = covar[i,j] / sqrt(covar[i,i] * covar[j,j])
pub fn calculate_correlation(covar: &Array2<f64>) -> Array2<f64> {
    let n = covar.nrows();
    let mut correl = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..n {
            if i == j {
                correl[[i, j]] = 1.0;
            } else {
                let denom = (covar[[i, i]] * covar[[j, j]]).sqrt();
                correl[[i, j]] = if denom > 0.0 { covar[[i, j]] / denom } else { 0.0 };
            }
        }
    }

    correl
}

/// Standard errors: square roots of the diagonal. A non-positive or
/// non-finite variance gives NaN.
pub fn standard_errors_from_covariance(covar: &Array2<f64>) -> Array1<f64> {
    covar
        .diag()
        .mapv(|v| if v > 0.0 && v.is_finite() { v.sqrt() } else { f64::NAN })
}
