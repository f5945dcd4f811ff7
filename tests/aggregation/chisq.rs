//! Summed χ² comparisons.

use crate::test_helpers::{result, table};
use approx::assert_relative_eq;
use halofit_rs::aggregate::{cumulative_curve, fractional_curve, total, Alignment, ChiSquareSums};
use halofit_rs::fit::{ResultTable, ScanTable, Statistic};

#[test]
fn test_sum_is_order_invariant() {
    let rows = [
        ("NGC2403", 12.5, 30.0),
        ("DDO154", 40.25, 55.0),
        ("UGC00128", 7.0, 20.0),
        ("NGC3109", f64::NAN, f64::NAN),
    ];
    let forward = table(&rows);
    let backward: ResultTable = rows
        .iter()
        .rev()
        .map(|(name, chisqr, bic)| result(name, *chisqr, *bic))
        .collect();

    assert_eq!(total(&forward, Statistic::ChiSquare), total(&backward, Statistic::ChiSquare));
    assert_relative_eq!(total(&forward, Statistic::ChiSquare), 59.75);

    let curve = cumulative_curve(&backward, Statistic::ChiSquare);
    assert_eq!(curve.len(), 3);
    assert_eq!(curve[0].0, "DDO154");
    assert_relative_eq!(curve.last().unwrap().1, 59.75);
}

#[test]
fn test_fractional_difference() {
    let reference = table(&[("A", 40.0, 0.0), ("B", 60.0, 0.0)]);
    let model = table(&[("A", 30.0, 0.0), ("B", 45.0, 0.0)]);

    let sums = ChiSquareSums::compute(&reference, &model, Statistic::ChiSquare, Alignment::Strict).unwrap();
    assert_eq!(sums.count, 2);
    assert_relative_eq!(sums.fractional_difference(), 0.25, epsilon = 1e-12);

    let swapped = ChiSquareSums::compute(&model, &reference, Statistic::ChiSquare, Alignment::Strict).unwrap();
    assert!(swapped.fractional_difference() < 0.0);
}

#[test]
fn test_fractional_curve_over_scan() {
    let reference = table(&[("A", 40.0, 0.0), ("B", 60.0, 0.0)]);
    let mut scan = ScanTable::new();
    scan.insert(1.0, table(&[("A", 50.0, 0.0), ("B", 50.0, 0.0)]));
    scan.insert(0.1, table(&[("A", 80.0, 0.0), ("B", 70.0, 0.0)]));
    scan.insert(10.0, table(&[("A", 20.0, 0.0), ("B", 30.0, 0.0)]));

    let curve = fractional_curve(&reference, &scan, Statistic::ChiSquare, Alignment::Strict).unwrap();
    let masses: Vec<f64> = curve.iter().map(|(m, _)| *m).collect();
    assert_eq!(masses.len(), 3);
    assert!(masses.windows(2).all(|w| w[0] < w[1]));
    assert_relative_eq!(curve[0].1, -0.5, epsilon = 1e-12);
    assert_relative_eq!(curve[1].1, 0.0, epsilon = 1e-12);
    assert_relative_eq!(curve[2].1, 0.5, epsilon = 1e-12);

    let missing = table(&[("A", 40.0, 0.0)]);
    assert!(fractional_curve(&missing, &scan, Statistic::ChiSquare, Alignment::Strict).is_err());
}
