//! SPARC catalog ingestion and sample selection.
//!
//! Two whitespace-separated tables are read: the mass models (one row per
//! radius sample) and the galaxy catalog (one row per galaxy). Header lines
//! are skipped by count.

use crate::error::{HaloFitError, Result};
use crate::galaxy::observation::{CatalogEntry, GalaxyObservation, RotationCurve};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Header sizes of the SPARC tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparcFormat {
    pub mass_model_header_lines: usize,
    pub catalog_header_lines: usize,
}

impl Default for SparcFormat {
    fn default() -> Self {
        Self {
            mass_model_header_lines: 25,
            catalog_header_lines: 98,
        }
    }
}

/// The galaxies available for fitting, keyed by name.
///
/// Galaxies whose rows could not be read are kept out of the catalog and
/// reported through [`GalaxyCatalog::failures`].
#[derive(Debug, Default)]
pub struct GalaxyCatalog {
    galaxies: BTreeMap<String, GalaxyObservation>,
    failures: BTreeMap<String, HaloFitError>,
}

impl GalaxyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse SPARC mass-model and catalog tables.
    ///
    /// Galaxies missing from either table are skipped. A galaxy with a
    /// malformed row or data that fails validation is recorded as a
    /// `DataError` in [`GalaxyCatalog::failures`]; the other galaxies still
    /// load.
    pub fn from_sparc_str(mass_models: &str, catalog: &str, format: SparcFormat) -> Result<Self> {
        let mut result = Self::new();
        let curves = parse_mass_models(mass_models, format.mass_model_header_lines, &mut result.failures);
        let entries = parse_catalog(catalog, format.catalog_header_lines, &mut result.failures);

        for (name, curve) in curves {
            if result.failures.contains_key(&name) {
                continue;
            }
            let Some(entry) = entries.get(&name) else {
                tracing::debug!(galaxy = %name, "no catalog row, skipping");
                continue;
            };
            match GalaxyObservation::new(name.clone(), curve.into_curve(), *entry) {
                Ok(galaxy) => result.insert(galaxy),
                Err(error) => {
                    result.failures.insert(name, error);
                }
            }
        }

        for (name, error) in &result.failures {
            tracing::warn!(galaxy = %name, error = %error, "galaxy not loaded");
        }
        tracing::info!(
            galaxies = result.len(),
            failures = result.failures.len(),
            "SPARC catalog loaded"
        );
        Ok(result)
    }

    /// Read the SPARC tables from disk.
    pub fn from_sparc_files<P: AsRef<Path>>(mass_models: P, catalog: P, format: SparcFormat) -> Result<Self> {
        let mass_models = std::fs::read_to_string(mass_models)?;
        let catalog = std::fs::read_to_string(catalog)?;
        Self::from_sparc_str(&mass_models, &catalog, format)
    }

    /// Add or replace a galaxy.
    pub fn insert(&mut self, galaxy: GalaxyObservation) {
        self.galaxies.insert(galaxy.name().to_string(), galaxy);
    }

    pub fn get(&self, name: &str) -> Option<&GalaxyObservation> {
        self.galaxies.get(name)
    }

    pub fn len(&self) -> usize {
        self.galaxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.galaxies.is_empty()
    }

    /// Galaxy names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.galaxies.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GalaxyObservation> {
        self.galaxies.values()
    }

    /// Galaxies left out of the catalog because their data was unusable.
    pub fn failures(&self) -> &BTreeMap<String, HaloFitError> {
        &self.failures
    }
}

impl FromIterator<GalaxyObservation> for GalaxyCatalog {
    fn from_iter<I: IntoIterator<Item = GalaxyObservation>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for galaxy in iter {
            catalog.insert(galaxy);
        }
        catalog
    }
}

#[derive(Debug, Default)]
struct CurveColumns {
    radius: Vec<f64>,
    v_obs: Vec<f64>,
    v_err: Vec<f64>,
    v_gas: Vec<f64>,
    v_disk: Vec<f64>,
    v_bulge: Vec<f64>,
}

impl CurveColumns {
    fn into_curve(self) -> RotationCurve {
        RotationCurve {
            radius: Array1::from(self.radius),
            v_obs: Array1::from(self.v_obs),
            v_err: Array1::from(self.v_err),
            v_gas: Array1::from(self.v_gas),
            v_disk: Array1::from(self.v_disk),
            v_bulge: Array1::from(self.v_bulge),
        }
    }
}

fn field(fields: &[&str], index: usize, galaxy: &str, line: usize) -> Result<f64> {
    let raw = fields.get(index).ok_or_else(|| {
        HaloFitError::data(galaxy, format!("line {}: missing column {}", line, index))
    })?;
    raw.parse::<f64>().map_err(|e| {
        HaloFitError::data(galaxy, format!("line {}: column {} '{}': {}", line, index, raw, e))
    })
}

/// Columns: galaxy, distance, radius, Vobs, eVobs, Vgas, Vdisk, Vbul, ...
///
/// A malformed row drops every row of its galaxy.
fn parse_mass_models(
    text: &str,
    header_lines: usize,
    failures: &mut BTreeMap<String, HaloFitError>,
) -> BTreeMap<String, CurveColumns> {
    let mut curves: BTreeMap<String, CurveColumns> = BTreeMap::new();
    for (index, line) in text.lines().enumerate().skip(header_lines) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some(&name) = fields.first() else {
            continue;
        };
        if failures.contains_key(name) {
            continue;
        }
        let line_no = index + 1;
        let values = match [2, 3, 4, 5, 6, 7]
            .iter()
            .map(|&i| field(&fields, i, name, line_no))
            .collect::<Result<Vec<f64>>>()
        {
            Ok(values) => values,
            Err(error) => {
                curves.remove(name);
                failures.insert(name.to_string(), error);
                continue;
            }
        };

        let curve = curves.entry(name.to_string()).or_default();
        curve.radius.push(values[0]);
        curve.v_obs.push(values[1]);
        curve.v_err.push(values[2]);
        curve.v_gas.push(values[3]);
        curve.v_disk.push(values[4]);
        curve.v_bulge.push(values[5]);
    }
    curves
}

fn catalog_entry(fields: &[&str], name: &str, line_no: usize) -> Result<CatalogEntry> {
    let quality = field(fields, 17, name, line_no)?;
    Ok(CatalogEntry {
        inclination: field(fields, 5, name, line_no)?,
        luminosity: field(fields, 7, name, line_no)?,
        gas_mass: field(fields, 13, name, line_no)?,
        v_flat: field(fields, 15, name, line_no)?,
        quality: quality as u8,
    })
}

/// Columns used: 0 galaxy, 5 inclination, 7 luminosity, 13 MHI, 15 Vflat, 17 quality.
fn parse_catalog(
    text: &str,
    header_lines: usize,
    failures: &mut BTreeMap<String, HaloFitError>,
) -> BTreeMap<String, CatalogEntry> {
    let mut entries = BTreeMap::new();
    for (index, line) in text.lines().enumerate().skip(header_lines) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some(&name) = fields.first() else {
            continue;
        };
        match catalog_entry(&fields, name, index + 1) {
            Ok(entry) => {
                entries.insert(name.to_string(), entry);
            }
            Err(error) => {
                failures.entry(name.to_string()).or_insert(error);
            }
        }
    }
    entries
}

/// Why a galaxy was left out of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutReason {
    LowQuality,
    LowInclination,
    NoFlatVelocity,
    TooFewSamples,
}

impl fmt::Display for CutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CutReason::LowQuality => "quality flag 3",
            CutReason::LowInclination => "inclination too low",
            CutReason::NoFlatVelocity => "no flat velocity",
            CutReason::TooFewSamples => "too few samples for a wave model",
        };
        f.write_str(text)
    }
}

/// Sample selection applied before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleCuts {
    /// Galaxies with this quality flag are dropped.
    pub excluded_quality: Option<u8>,
    /// Inclination must exceed this many degrees.
    pub min_inclination: Option<f64>,
    /// Require a measured flat velocity.
    pub require_flat_velocity: bool,
    /// Wave models need more samples than this (plus one with a bulge).
    pub wave_min_samples: Option<usize>,
    /// Apply the wave sample-size cut to CDM models as well, so CDM
    /// reference fits cover the same galaxies as the wave fits.
    pub wave_sample: bool,
}

impl Default for SampleCuts {
    fn default() -> Self {
        Self {
            excluded_quality: Some(3),
            min_inclination: Some(30.0),
            require_flat_velocity: true,
            wave_min_samples: Some(11),
            wave_sample: false,
        }
    }
}

impl SampleCuts {
    /// No selection at all.
    pub fn none() -> Self {
        Self {
            excluded_quality: None,
            min_inclination: None,
            require_flat_velocity: false,
            wave_min_samples: None,
            wave_sample: false,
        }
    }

    /// The default cuts with the wave sample-size cut applied to every model.
    pub fn wave_sample() -> Self {
        Self {
            wave_sample: true,
            ..Self::default()
        }
    }

    /// The first cut a galaxy fails, if any.
    pub fn check(&self, galaxy: &GalaxyObservation, wave: bool) -> Option<CutReason> {
        let catalog = galaxy.catalog();
        if self.excluded_quality == Some(catalog.quality) {
            return Some(CutReason::LowQuality);
        }
        if let Some(min) = self.min_inclination {
            if !(catalog.inclination > min) {
                return Some(CutReason::LowInclination);
            }
        }
        if self.require_flat_velocity && catalog.v_flat == 0.0 {
            return Some(CutReason::NoFlatVelocity);
        }
        if let (true, Some(min)) = (wave || self.wave_sample, self.wave_min_samples) {
            let required = if galaxy.has_bulge() { min + 1 } else { min };
            if galaxy.len() <= required {
                return Some(CutReason::TooFewSamples);
            }
        }
        None
    }
}
