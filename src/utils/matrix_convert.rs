//! Conversions between ndarray and nalgebra.
//!
//! Residuals and Jacobians live in ndarray; factorisations use nalgebra.

use crate::error::{HaloFitError, Result};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Convert an ndarray Array2 to a nalgebra DMatrix.
///
/// # Errors
///
/// * `HaloFitError::DimensionMismatch` if the matrix is empty
pub fn ndarray_to_nalgebra(arr: &Array2<f64>) -> Result<DMatrix<f64>> {
    let (rows, cols) = arr.dim();
    if rows == 0 || cols == 0 {
        return Err(HaloFitError::DimensionMismatch(format!(
            "cannot convert empty {}x{} matrix",
            rows, cols
        )));
    }
    Ok(DMatrix::from_fn(rows, cols, |i, j| arr[[i, j]]))
}

/// Convert a nalgebra DMatrix to an ndarray Array2.
pub fn nalgebra_to_ndarray(mat: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((mat.nrows(), mat.ncols()), |(i, j)| mat[(i, j)])
}

/// Convert an ndarray Array1 to a nalgebra DVector.
pub fn ndarray_vec_to_nalgebra(arr: &Array1<f64>) -> DVector<f64> {
    DVector::from_iterator(arr.len(), arr.iter().copied())
}

/// Convert a nalgebra DVector to an ndarray Array1.
pub fn nalgebra_vec_to_ndarray(vec: &DVector<f64>) -> Array1<f64> {
    Array1::from_iter(vec.iter().copied())
}
