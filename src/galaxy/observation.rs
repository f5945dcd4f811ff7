//! A single galaxy: its rotation curve and catalog scalars.

use crate::error::{HaloFitError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Observed rotation curve and baryonic contributions, all in km/s at the
/// radii in kpc.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationCurve {
    pub radius: Array1<f64>,
    pub v_obs: Array1<f64>,
    pub v_err: Array1<f64>,
    pub v_gas: Array1<f64>,
    pub v_disk: Array1<f64>,
    pub v_bulge: Array1<f64>,
}

impl RotationCurve {
    pub fn len(&self) -> usize {
        self.radius.len()
    }

    pub fn is_empty(&self) -> bool {
        self.radius.is_empty()
    }
}

/// Catalog scalars of a galaxy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// 3.6 µm luminosity [1e9 L☉]
    pub luminosity: f64,
    /// HI gas mass [1e9 M☉]
    pub gas_mass: f64,
    /// Flat rotation velocity [km/s]; 0 when not measured
    pub v_flat: f64,
    /// Inclination [deg]
    pub inclination: f64,
    /// Quality flag: 1 high, 2 medium, 3 low
    pub quality: u8,
}

/// Disk and bulge mass-to-light ratios applied to the baryonic curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassToLight {
    pub disk: f64,
    pub bulge: f64,
}

/// An observed galaxy. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct GalaxyObservation {
    name: String,
    curve: RotationCurve,
    catalog: CatalogEntry,
}

impl GalaxyObservation {
    /// Build an observation, validating the data.
    ///
    /// # Errors
    ///
    /// `DataError` when the name is empty, the arrays are empty or differ in
    /// length, a sample is not finite, or an uncertainty is not positive.
    pub fn new(name: impl Into<String>, curve: RotationCurve, catalog: CatalogEntry) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(HaloFitError::data("<unnamed>", "galaxy name is empty"));
        }
        if curve.is_empty() {
            return Err(HaloFitError::data(name, "rotation curve has no samples"));
        }

        let n = curve.len();
        let columns = [
            ("v_obs", &curve.v_obs),
            ("v_err", &curve.v_err),
            ("v_gas", &curve.v_gas),
            ("v_disk", &curve.v_disk),
            ("v_bulge", &curve.v_bulge),
        ];
        for (column, values) in columns.iter() {
            if values.len() != n {
                return Err(HaloFitError::data(
                    name,
                    format!("{} has {} samples, radius has {}", column, values.len(), n),
                ));
            }
        }
        for (column, values) in std::iter::once(("radius", &curve.radius)).chain(columns) {
            if let Some(i) = values.iter().position(|v| !v.is_finite()) {
                return Err(HaloFitError::data(
                    name,
                    format!("{} is not finite at sample {}", column, i),
                ));
            }
        }
        if let Some(i) = curve.v_err.iter().position(|e| *e <= 0.0) {
            return Err(HaloFitError::data(
                name,
                format!("velocity uncertainty must be positive (sample {})", i),
            ));
        }
        if let Some(i) = curve.radius.iter().position(|r| *r <= 0.0) {
            return Err(HaloFitError::data(
                name,
                format!("radius must be positive (sample {})", i),
            ));
        }
        if !(catalog.luminosity.is_finite() && catalog.gas_mass.is_finite()) {
            return Err(HaloFitError::data(name, "catalog masses must be finite"));
        }

        Ok(Self {
            name,
            curve,
            catalog,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn curve(&self) -> &RotationCurve {
        &self.curve
    }

    pub fn catalog(&self) -> &CatalogEntry {
        &self.catalog
    }

    pub fn radius(&self) -> &Array1<f64> {
        &self.curve.radius
    }

    pub fn v_obs(&self) -> &Array1<f64> {
        &self.curve.v_obs
    }

    pub fn v_err(&self) -> &Array1<f64> {
        &self.curve.v_err
    }

    /// Number of rotation curve samples.
    pub fn len(&self) -> usize {
        self.curve.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curve.is_empty()
    }

    /// Whether any bulge sample is non-zero.
    pub fn has_bulge(&self) -> bool {
        self.curve.v_bulge.iter().any(|v| *v != 0.0)
    }

    /// Total rotation velocity for a halo velocity curve:
    /// V² = V_h² + |V_gas|V_gas + Υ_d|V_disk|V_disk + Υ_b|V_bul|V_bul.
    ///
    /// The bulge term is included only when the galaxy has a bulge.
    pub fn model_velocity(&self, v_halo: &Array1<f64>, ml: MassToLight) -> Array1<f64> {
        let bulge = self.has_bulge();
        let c = &self.curve;
        let mut v2 = v_halo.mapv(|v| v * v);
        v2.zip_mut_with(&c.v_gas, |acc, g| *acc += g.abs() * g);
        v2.zip_mut_with(&c.v_disk, |acc, d| *acc += ml.disk * d.abs() * d);
        if bulge {
            v2.zip_mut_with(&c.v_bulge, |acc, b| *acc += ml.bulge * b.abs() * b);
        }
        v2.mapv_into(f64::sqrt)
    }
}
