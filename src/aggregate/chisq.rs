//! Summed goodness-of-fit statistics.

use crate::aggregate::{align, Alignment};
use crate::error::Result;
use crate::fit::{ResultTable, ScanTable, Statistic};
use serde::{Deserialize, Serialize};

/// Sums of one statistic over the galaxies two tables share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareSums {
    pub statistic: Statistic,
    pub reference: f64,
    pub model: f64,
    /// Galaxies summed
    pub count: usize,
    pub dropped: Vec<String>,
    pub excluded: Vec<String>,
}

impl ChiSquareSums {
    /// Sum `statistic` over the shared valid subset of two tables.
    ///
    /// # Errors
    ///
    /// `AggregationMismatch` under [`Alignment::Strict`] when the tables
    /// cover different galaxies.
    pub fn compute(
        reference: &ResultTable,
        model: &ResultTable,
        statistic: Statistic,
        alignment: Alignment,
    ) -> Result<Self> {
        let aligned = align(reference, model, statistic, alignment)?;
        Ok(Self {
            statistic,
            reference: aligned.pairs.iter().map(|(_, a, _)| a).sum(),
            model: aligned.pairs.iter().map(|(_, _, b)| b).sum(),
            count: aligned.pairs.len(),
            dropped: aligned.dropped,
            excluded: aligned.excluded,
        })
    }

    /// (Σ_reference − Σ_model) / Σ_reference; positive when the model fits
    /// better.
    pub fn fractional_difference(&self) -> f64 {
        (self.reference - self.model) / self.reference
    }
}

/// NaN-skipping sum of a statistic over one table.
pub fn total(table: &ResultTable, statistic: Statistic) -> f64 {
    table
        .iter()
        .map(|r| r.statistic(statistic))
        .filter(|v| !v.is_nan())
        .sum()
}

/// Running sum of a statistic in galaxy-name order. Galaxies with a NaN
/// statistic are left out.
pub fn cumulative_curve(table: &ResultTable, statistic: Statistic) -> Vec<(String, f64)> {
    let mut running = 0.0;
    table
        .iter()
        .filter(|r| !r.statistic(statistic).is_nan())
        .map(|r| {
            running += r.statistic(statistic);
            (r.galaxy.clone(), running)
        })
        .collect()
}

/// Fractional difference of a statistic against `reference` at every scan
/// point, as (log10 m22, fraction).
pub fn fractional_curve(
    reference: &ResultTable,
    scan: &ScanTable,
    statistic: Statistic,
    alignment: Alignment,
) -> Result<Vec<(f64, f64)>> {
    scan.iter()
        .map(|entry| {
            let sums = ChiSquareSums::compute(reference, &entry.table, statistic, alignment)?;
            Ok((entry.log10_m22, sums.fractional_difference()))
        })
        .collect()
}

/// The scan table at particle mass `m22`, within `tolerance` dex.
///
/// # Errors
///
/// `ConfigurationError` when the scan has no such point.
pub fn select_scan_entry(scan: &ScanTable, m22: f64, tolerance: f64) -> Result<&ResultTable> {
    scan.select(m22, tolerance)
}
