//! Parameters collection implementation
//!
//! This module provides the Parameters struct, an ordered table of Parameter
//! objects. Order is the schema order of the halo model and is preserved in
//! every result table. Derived parameters are recomputed after each update.

use crate::parameters::bounds::Bounds;
use crate::parameters::derivation::Derivation;
use crate::parameters::parameter::{Parameter, ParameterError};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// An ordered collection of parameters for one fit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    params: Vec<Parameter>,
}

impl Parameters {
    /// Create a new empty parameters collection
    ///
    /// # Examples
    ///
    /// ```
    /// use halofit_rs::parameters::Parameters;
    ///
    /// let params = Parameters::new();
    /// assert_eq!(params.len(), 0);
    /// ```
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter to the collection
    ///
    /// A derived parameter is accepted only when every input it reads is
    /// already in the table. Its value is computed immediately.
    ///
    /// # Examples
    ///
    /// ```
    /// use halofit_rs::parameters::{Derivation, Parameter, Parameters};
    /// use halofit_rs::parameters::bounds::Bounds;
    ///
    /// let mut params = Parameters::new();
    /// params.add(Parameter::with_bounds("MLd", 0.5, 0.01, 5.0).unwrap()).unwrap();
    /// params
    ///     .add(Parameter::derived(
    ///         "MLb",
    ///         Derivation::BulgeFromDisk { ratio: 1.4 },
    ///         Bounds::new(0.01, 5.0).unwrap(),
    ///     ))
    ///     .unwrap();
    /// assert!((params.value("MLb").unwrap() - 0.7).abs() < 1e-12);
    /// ```
    pub fn add(&mut self, param: Parameter) -> Result<(), ParameterError> {
        if self.contains(param.name()) {
            return Err(ParameterError::DuplicateName {
                name: param.name().to_string(),
            });
        }

        if let Some(derivation) = param.derivation() {
            if let Some(missing) = derivation.inputs().into_iter().find(|i| !self.contains(i)) {
                return Err(ParameterError::DerivationFailed {
                    name: param.name().to_string(),
                    message: format!("input '{}' must be added first", missing),
                });
            }
        }

        self.params.push(param);
        if self.params.last().map_or(false, |p| p.is_derived()) {
            let index = self.params.len() - 1;
            self.evaluate_at(index)?;
        }
        Ok(())
    }

    /// Add a free parameter with bounds.
    pub fn add_bounded(&mut self, name: &str, value: f64, min: f64, max: f64) -> Result<(), ParameterError> {
        self.add(Parameter::with_bounds(name, value, min, max)?)
    }

    /// Add a fixed parameter.
    pub fn add_fixed(&mut self, name: &str, value: f64) -> Result<(), ParameterError> {
        self.add(Parameter::fixed(name, value))
    }

    /// Add a derived parameter.
    pub fn add_derived(&mut self, name: &str, derivation: Derivation, bounds: Bounds) -> Result<(), ParameterError> {
        self.add(Parameter::derived(name, derivation, bounds))
    }

    /// Get a parameter by name.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name() == name)
    }

    /// Get a mutable parameter by name.
    ///
    /// Changing a value through this handle does not refresh derived
    /// parameters; call [`Parameters::update_derived`] afterwards.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.params.iter_mut().find(|p| p.name() == name)
    }

    /// Current value of a parameter.
    pub fn value(&self, name: &str) -> Result<f64, ParameterError> {
        self.get(name)
            .map(|p| p.value())
            .ok_or_else(|| ParameterError::ParameterNotFound {
                name: name.to_string(),
            })
    }

    /// Current value of a parameter, if present.
    pub fn value_opt(&self, name: &str) -> Option<f64> {
        self.get(name).map(|p| p.value())
    }

    /// Check whether a parameter exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameter names in schema order.
    pub fn names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name().to_string()).collect()
    }

    /// Iterate in schema order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    /// The varying parameters, in schema order.
    pub fn varying(&self) -> Vec<&Parameter> {
        self.params.iter().filter(|p| p.vary()).collect()
    }

    /// Names of the varying parameters, in schema order.
    pub fn varying_names(&self) -> Vec<String> {
        self.params
            .iter()
            .filter(|p| p.vary())
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Number of varying parameters.
    pub fn varying_count(&self) -> usize {
        self.params.iter().filter(|p| p.vary()).count()
    }

    /// External values of the varying parameters.
    pub fn varying_values(&self) -> Array1<f64> {
        self.params.iter().filter(|p| p.vary()).map(|p| p.value()).collect()
    }

    /// Internal (optimizer) values of the varying parameters.
    pub fn to_internal(&self) -> Result<Array1<f64>, ParameterError> {
        let mut internal = Vec::with_capacity(self.varying_count());
        for param in self.params.iter().filter(|p| p.vary()) {
            internal.push(param.transform().to_internal(param.value())?);
        }
        Ok(Array1::from(internal))
    }

    /// Update the varying parameters from internal values and refresh the
    /// derived ones.
    pub fn set_varying_from_internal(&mut self, internal: &Array1<f64>) -> Result<(), ParameterError> {
        self.check_varying_len(internal.len())?;
        for (param, x) in self.params.iter_mut().filter(|p| p.vary()).zip(internal.iter()) {
            let external = param.transform().to_external(*x);
            param.set_value_clamped(external);
        }
        self.update_derived()
    }

    /// Update the varying parameters from external values, without a bounds
    /// check, and refresh the derived ones.
    pub fn set_varying_values(&mut self, values: &Array1<f64>) -> Result<(), ParameterError> {
        self.check_varying_len(values.len())?;
        for (param, v) in self.params.iter_mut().filter(|p| p.vary()).zip(values.iter()) {
            param.set_value_unchecked(*v);
        }
        self.update_derived()
    }

    /// Recompute every derived parameter in schema order. Results are
    /// clamped to the parameter's bounds.
    pub fn update_derived(&mut self) -> Result<(), ParameterError> {
        for index in 0..self.params.len() {
            if self.params[index].is_derived() {
                self.evaluate_at(index)?;
            }
        }
        Ok(())
    }

    /// Reset all parameters to their initial values
    pub fn reset(&mut self) -> Result<(), ParameterError> {
        for param in self.params.iter_mut() {
            param.reset();
        }
        self.update_derived()
    }

    fn evaluate_at(&mut self, index: usize) -> Result<(), ParameterError> {
        let param = &self.params[index];
        let value = match param.derivation() {
            Some(derivation) => {
                let earlier = &self.params[..index];
                derivation.evaluate(param.name(), |name| {
                    earlier.iter().find(|p| p.name() == name).map(|p| p.value())
                })?
            }
            None => return Ok(()),
        };
        self.params[index].set_value_clamped(value);
        Ok(())
    }

    fn check_varying_len(&self, got: usize) -> Result<(), ParameterError> {
        let expected = self.varying_count();
        if got != expected {
            return Err(ParameterError::LengthMismatch { expected, got });
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}
