//! Population comparisons of result tables.
//!
//! ΔBIC per galaxy with summaries and binned fractions, summed and
//! fractional χ² statistics, cumulative curves, and scan-point selection.
//! Every sum skips NaN entries and runs in galaxy-name order, so results do
//! not depend on the order galaxies were fitted in.

pub mod chisq;
pub mod comparison;

pub use chisq::{cumulative_curve, fractional_curve, select_scan_entry, total, ChiSquareSums};
pub use comparison::{
    bin_index, delta_bic, BinnedFractions, DeltaBic, Summary, EXTENDED_EDGES, STANDARD_EDGES,
};

use crate::error::{HaloFitError, Result};
use crate::fit::{ResultTable, Statistic};
use serde::{Deserialize, Serialize};

/// How two tables over different galaxy sets are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    /// Different galaxy sets are an error.
    #[default]
    Strict,
    /// Compare the common galaxies and record the others as dropped.
    Intersect,
}

/// Paired statistics of two tables.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Aligned {
    /// (galaxy, left value, right value), neither NaN
    pub pairs: Vec<(String, f64, f64)>,
    pub dropped: Vec<String>,
    pub excluded: Vec<String>,
}

/// Pair `statistic` of the galaxies both tables share, in name order.
/// Pairs with NaN on either side are excluded.
pub(crate) fn align(
    left: &ResultTable,
    right: &ResultTable,
    statistic: Statistic,
    alignment: Alignment,
) -> Result<Aligned> {
    let only_left: Vec<String> = left
        .names()
        .filter(|n| right.get(n).is_none())
        .map(String::from)
        .collect();
    let only_right: Vec<String> = right
        .names()
        .filter(|n| left.get(n).is_none())
        .map(String::from)
        .collect();

    if alignment == Alignment::Strict && !(only_left.is_empty() && only_right.is_empty()) {
        return Err(HaloFitError::AggregationMismatch {
            only_left,
            only_right,
        });
    }

    let mut pairs = Vec::new();
    let mut excluded = Vec::new();
    for a in left.iter() {
        if let Some(b) = right.get(&a.galaxy) {
            let (x, y) = (a.statistic(statistic), b.statistic(statistic));
            if x.is_nan() || y.is_nan() {
                excluded.push(a.galaxy.clone());
            } else {
                pairs.push((a.galaxy.clone(), x, y));
            }
        }
    }

    let mut dropped = only_left;
    dropped.extend(only_right);
    dropped.sort();

    Ok(Aligned {
        pairs,
        dropped,
        excluded,
    })
}
