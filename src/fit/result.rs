//! Fit results and the tables that collect them.
//!
//! Non-finite statistics serialise as JSON `null`; reading them back gives
//! NaN (statistics) or +∞ (standard errors).

use crate::error::{HaloFitError, Result};
use crate::halo::ModelSpec;
use crate::utils::serde_float::{inf_as_null, nan_as_null};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How a parameter entered the fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterKind {
    Free,
    Fixed,
    Derived,
}

/// One row of a result's parameter table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRow {
    pub name: String,
    #[serde(with = "nan_as_null")]
    pub value: f64,
    /// 1σ error; +∞ when it carries no information
    #[serde(with = "inf_as_null")]
    pub stderr: f64,
    pub kind: ParameterKind,
}

/// Goodness-of-fit statistic used for comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statistic {
    ChiSquare,
    ReducedChiSquare,
    Bic,
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Statistic::ChiSquare => "chi2",
            Statistic::ReducedChiSquare => "redchi",
            Statistic::Bic => "BIC",
        })
    }
}

/// Result of fitting one model to one galaxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub galaxy: String,
    pub model: ModelSpec,
    /// Parameters in schema order
    pub parameters: Vec<ParameterRow>,
    /// χ² of the data alone
    #[serde(with = "nan_as_null")]
    pub chisqr: f64,
    /// Sum of squared prior residuals
    #[serde(with = "nan_as_null")]
    pub penalty: f64,
    pub ndata: usize,
    pub nvarys: usize,
    /// ndata − nvarys; may be negative
    pub dof: i64,
    /// (χ² + penalty) / dof; NaN when dof ≤ 0
    #[serde(with = "nan_as_null")]
    pub redchi: f64,
    /// χ² + penalty + nvarys ln ndata
    #[serde(with = "nan_as_null")]
    pub bic: f64,
    pub success: bool,
    pub message: String,
    pub nfev: usize,
    /// Number of restarts tried after the first fit
    pub restarts: usize,
    /// Total dark matter mass [M☉]
    #[serde(with = "nan_as_null")]
    pub virial_mass: f64,
    /// Envelope mass of wave models [M☉]
    pub halo_mass: Option<f64>,
    pub has_bulge: bool,
}

impl FitResult {
    pub fn statistic(&self, statistic: Statistic) -> f64 {
        match statistic {
            Statistic::ChiSquare => self.chisqr,
            Statistic::ReducedChiSquare => self.redchi,
            Statistic::Bic => self.bic,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterRow> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Value of a parameter, NaN when absent.
    pub fn value(&self, name: &str) -> f64 {
        self.parameter(name).map_or(f64::NAN, |p| p.value)
    }
}

impl fmt::Display for FitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} / {}: {}", self.galaxy, self.model, self.message)?;
        writeln!(
            f,
            "  chi2 = {:.4}, redchi = {:.4}, BIC = {:.4} ({} points, {} free)",
            self.chisqr, self.redchi, self.bic, self.ndata, self.nvarys
        )?;
        for p in &self.parameters {
            writeln!(f, "  {:<12} {:>14.6e} +/- {:.3e} ({:?})", p.name, p.value, p.stderr, p.kind)?;
        }
        Ok(())
    }
}

/// Results of one model over a set of galaxies, ordered by galaxy name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    results: BTreeMap<String, FitResult>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a result, keyed by its galaxy. Returns the result it replaced.
    ///
    /// Tables are built by the orchestrator or collected from results; they
    /// are not edited afterwards.
    pub(crate) fn insert(&mut self, result: FitResult) -> Option<FitResult> {
        self.results.insert(result.galaxy.clone(), result)
    }

    pub fn get(&self, galaxy: &str) -> Option<&FitResult> {
        self.results.get(galaxy)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FitResult> {
        self.results.values()
    }

    /// Galaxies fitted with a bulge.
    pub fn bulge(&self) -> ResultTable {
        self.filtered(|r| r.has_bulge)
    }

    /// Galaxies fitted without a bulge.
    pub fn no_bulge(&self) -> ResultTable {
        self.filtered(|r| !r.has_bulge)
    }

    /// Number of fits that did not converge.
    pub fn failed_count(&self) -> usize {
        self.results.values().filter(|r| !r.success).count()
    }

    fn filtered<F: Fn(&FitResult) -> bool>(&self, keep: F) -> ResultTable {
        self.results
            .values()
            .filter(|r| keep(r))
            .cloned()
            .collect()
    }
}

impl FromIterator<FitResult> for ResultTable {
    fn from_iter<I: IntoIterator<Item = FitResult>>(iter: I) -> Self {
        let mut table = ResultTable::new();
        for result in iter {
            table.insert(result);
        }
        table
    }
}

/// One scan point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanEntry {
    pub log10_m22: f64,
    pub table: ResultTable,
}

/// Result tables of a particle-mass scan, ordered by log10 m22.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanTable {
    entries: Vec<ScanEntry>,
}

impl ScanTable {
    /// Keys closer than this [dex] are the same scan point.
    const KEY_EPSILON: f64 = 1e-9;

    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the table for particle mass `m22`, replacing an existing one.
    pub fn insert(&mut self, m22: f64, table: ResultTable) {
        let key = m22.log10();
        match self
            .entries
            .iter_mut()
            .find(|e| (e.log10_m22 - key).abs() < Self::KEY_EPSILON)
        {
            Some(entry) => entry.table = table,
            None => {
                self.entries.push(ScanEntry {
                    log10_m22: key,
                    table,
                });
                self.entries
                    .sort_by(|a, b| a.log10_m22.total_cmp(&b.log10_m22));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScanEntry> {
        self.entries.iter()
    }

    /// The table whose log10 m22 is nearest to log10 `m22`, if within
    /// `tolerance` dex.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` when no scan point is close enough.
    pub fn select(&self, m22: f64, tolerance: f64) -> Result<&ResultTable> {
        let key = m22.log10();
        self.entries
            .iter()
            .filter(|e| (e.log10_m22 - key).abs() <= tolerance)
            .min_by(|a, b| {
                (a.log10_m22 - key)
                    .abs()
                    .total_cmp(&(b.log10_m22 - key).abs())
            })
            .map(|e| &e.table)
            .ok_or_else(|| {
                HaloFitError::ConfigurationError(format!(
                    "no scan point within {} dex of log10 m22 = {:.3}",
                    tolerance, key
                ))
            })
    }
}
