//! ΔBIC between two result tables.

use crate::aggregate::{align, Alignment};
use crate::error::Result;
use crate::fit::{ResultTable, Statistic};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bin edges [−6, −2, 2, 6]: five bins.
pub const STANDARD_EDGES: [f64; 4] = [-6.0, -2.0, 2.0, 6.0];

/// Bin edges [−10, −6, −2, 2, 6, 10]: seven bins.
pub const EXTENDED_EDGES: [f64; 6] = [-10.0, -6.0, -2.0, 2.0, 6.0, 10.0];

/// Count, median and mean of a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub median: f64,
    pub mean: f64,
}

impl Summary {
    /// Summary of the finite values; NaN median and mean when there are none.
    pub fn of(values: impl IntoIterator<Item = f64>) -> Self {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);
        let count = sorted.len();
        if count == 0 {
            return Self {
                count,
                median: f64::NAN,
                mean: f64::NAN,
            };
        }
        let median = if count % 2 == 1 {
            sorted[count / 2]
        } else {
            0.5 * (sorted[count / 2 - 1] + sorted[count / 2])
        };
        let mean = sorted.iter().sum::<f64>() / count as f64;
        Self { count, median, mean }
    }
}

/// Counts and fractions over bins `lo < d ≤ hi`. The first bin is open
/// below, the last open above. Non-finite values are not counted, the same
/// subset [`Summary`] uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinnedFractions {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    pub fractions: Vec<f64>,
}

impl BinnedFractions {
    pub fn new(values: impl IntoIterator<Item = f64>, edges: &[f64]) -> Self {
        let mut counts = vec![0usize; edges.len() + 1];
        for value in values.into_iter().filter(|v| v.is_finite()) {
            counts[bin_index(value, edges)] += 1;
        }
        let total: usize = counts.iter().sum();
        let fractions = counts
            .iter()
            .map(|c| if total > 0 { *c as f64 / total as f64 } else { f64::NAN })
            .collect();
        Self {
            edges: edges.to_vec(),
            counts,
            fractions,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Bin of `value` for ascending `edges`: the number of edges strictly below it.
pub fn bin_index(value: f64, edges: &[f64]) -> usize {
    edges.iter().filter(|e| **e < value).count()
}

/// ΔBIC = BIC_reference − BIC_model per galaxy. Positive values favour the
/// model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaBic {
    pub values: BTreeMap<String, f64>,
    /// Galaxies present in only one table (intersect alignment)
    pub dropped: Vec<String>,
    /// Galaxies with a NaN BIC on either side
    pub excluded: Vec<String>,
}

impl DeltaBic {
    /// Compare two tables.
    ///
    /// # Errors
    ///
    /// `AggregationMismatch` under [`Alignment::Strict`] when the tables
    /// cover different galaxies.
    pub fn compute(reference: &ResultTable, model: &ResultTable, alignment: Alignment) -> Result<Self> {
        let aligned = align(reference, model, Statistic::Bic, alignment)?;
        let values = aligned
            .pairs
            .iter()
            .map(|(name, a, b)| (name.clone(), a - b))
            .collect();
        Ok(Self {
            values,
            dropped: aligned.dropped,
            excluded: aligned.excluded,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, galaxy: &str) -> Option<f64> {
        self.values.get(galaxy).copied()
    }

    pub fn summary(&self) -> Summary {
        Summary::of(self.values.values().copied())
    }

    pub fn bins(&self, edges: &[f64]) -> BinnedFractions {
        BinnedFractions::new(self.values.values().copied(), edges)
    }

    pub fn standard_bins(&self) -> BinnedFractions {
        self.bins(&STANDARD_EDGES)
    }

    pub fn extended_bins(&self) -> BinnedFractions {
        self.bins(&EXTENDED_EDGES)
    }
}

/// Shorthand for [`DeltaBic::compute`].
pub fn delta_bic(reference: &ResultTable, model: &ResultTable, alignment: Alignment) -> Result<DeltaBic> {
    DeltaBic::compute(reference, model, alignment)
}
