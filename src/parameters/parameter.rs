//! Parameter definition and implementation
//!
//! This module provides the Parameter struct, the building block of a fit's
//! parameter table. A parameter is free (varied by the optimizer), fixed, or
//! derived from other parameters through a [`Derivation`].

use crate::parameters::bounds::{Bounds, BoundsError, BoundsTransform};
use crate::parameters::derivation::Derivation;
use crate::utils::serde_float::nan_as_null;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when working with parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Parameter '{name}' is derived and cannot be varied")]
    DerivedAndVary { name: String },

    #[error("Bounds error: {0}")]
    BoundsError(#[from] BoundsError),

    #[error("Cannot derive parameter '{name}': {message}")]
    DerivationFailed { name: String, message: String },

    #[error("Parameter '{name}' not found")]
    ParameterNotFound { name: String },

    #[error("Parameter '{name}' already exists")]
    DuplicateName { name: String },

    #[error("Expected {expected} values for the varying parameters, got {got}")]
    LengthMismatch { expected: usize, got: usize },
}

/// A fit parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Name of the parameter
    pub name: String,

    /// Current value of the parameter; NaN for a derived parameter not yet
    /// evaluated
    #[serde(with = "nan_as_null")]
    value: f64,

    /// Value when created (for reset operations)
    #[serde(with = "nan_as_null")]
    init_value: f64,

    /// Whether this parameter is varied during optimization
    vary: bool,

    /// Minimum and maximum bounds for the parameter value
    bounds: Bounds,

    /// How this parameter is computed from others (if it is derived)
    derivation: Option<Derivation>,

    /// Standard error of the parameter (set after fitting)
    stderr: Option<f64>,
}

impl Parameter {
    /// Create a new free, unbounded parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use halofit_rs::parameters::Parameter;
    ///
    /// let alpha = Parameter::new("alpha", 0.16);
    /// assert!(alpha.vary());
    /// assert_eq!(alpha.value(), 0.16);
    /// ```
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            init_value: value,
            vary: true,
            bounds: Bounds::unbounded(),
            derivation: None,
            stderr: None,
        }
    }

    /// Create a new free parameter with bounds.
    ///
    /// # Errors
    ///
    /// Fails when `min > max` or when `value` lies outside `[min, max]`.
    pub fn with_bounds(name: &str, value: f64, min: f64, max: f64) -> Result<Self, ParameterError> {
        let bounds = Bounds::new(min, max)?;
        if !bounds.is_within_bounds(value) {
            return Err(BoundsError::ValueOutsideBounds { value, min, max }.into());
        }
        let mut param = Self::new(name, value);
        param.bounds = bounds;
        Ok(param)
    }

    /// Create a fixed parameter.
    pub fn fixed(name: &str, value: f64) -> Self {
        let mut param = Self::new(name, value);
        param.vary = false;
        param
    }

    /// Create a derived parameter. Its value is NaN until the owning
    /// collection evaluates derivations.
    pub fn derived(name: &str, derivation: Derivation, bounds: Bounds) -> Self {
        Self {
            name: name.to_string(),
            value: f64::NAN,
            init_value: f64::NAN,
            vary: false,
            bounds,
            derivation: Some(derivation),
            stderr: None,
        }
    }

    /// Get the current value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Set the value, rejecting values outside the bounds.
    pub fn set_value(&mut self, value: f64) -> Result<(), ParameterError> {
        if !self.bounds.is_within_bounds(value) {
            return Err(BoundsError::ValueOutsideBounds {
                value,
                min: self.bounds.min,
                max: self.bounds.max,
            }
            .into());
        }
        self.value = value;
        Ok(())
    }

    /// Set the value, clamping it into the bounds.
    pub fn set_value_clamped(&mut self, value: f64) {
        self.value = self.bounds.clamp(value);
    }

    /// Set the value without a bounds check.
    ///
    /// Used for finite-difference probes around a solution sitting on a bound.
    pub(crate) fn set_value_unchecked(&mut self, value: f64) {
        self.value = value;
    }

    /// Value at construction.
    pub fn init_value(&self) -> f64 {
        self.init_value
    }

    /// Reset to the construction value and clear the error.
    pub fn reset(&mut self) {
        self.value = self.init_value;
        self.stderr = None;
    }

    /// Name of the parameter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the optimizer varies this parameter.
    pub fn vary(&self) -> bool {
        self.vary
    }

    /// Set whether the parameter is varied.
    pub fn set_vary(&mut self, vary: bool) -> Result<(), ParameterError> {
        if vary && self.derivation.is_some() {
            return Err(ParameterError::DerivedAndVary {
                name: self.name.clone(),
            });
        }
        self.vary = vary;
        Ok(())
    }

    /// Parameter bounds.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Replace the bounds; the current value is clamped into them.
    pub fn set_bounds(&mut self, min: f64, max: f64) -> Result<(), ParameterError> {
        self.bounds = Bounds::new(min, max)?;
        if self.value.is_finite() {
            self.value = self.bounds.clamp(self.value);
        }
        Ok(())
    }

    /// The Minuit transform for these bounds.
    pub fn transform(&self) -> BoundsTransform {
        BoundsTransform::new(self.bounds)
    }

    /// The derivation, if the parameter is derived.
    pub fn derivation(&self) -> Option<&Derivation> {
        self.derivation.as_ref()
    }

    /// Whether the parameter is derived from others.
    pub fn is_derived(&self) -> bool {
        self.derivation.is_some()
    }

    /// Standard error after fitting.
    pub fn stderr(&self) -> Option<f64> {
        self.stderr
    }

    /// Set the standard error.
    pub fn set_stderr(&mut self, stderr: Option<f64>) {
        self.stderr = stderr;
    }
}
