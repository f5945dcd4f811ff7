//! Utility functions and helpers for the halofit-rs library.

pub mod finite_difference;
pub mod matrix_convert;
pub(crate) mod serde_float;
pub mod special;

// Re-export commonly used utilities
pub use finite_difference::{gradient, jacobian, jacobian_central};
pub use matrix_convert::{
    nalgebra_to_ndarray, nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra,
};
pub use special::{lambert_w0, simpson};
