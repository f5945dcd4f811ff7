//! ΔBIC tables, bins and alignment.

use crate::test_helpers::table;
use approx::assert_relative_eq;
use halofit_rs::aggregate::{bin_index, delta_bic, Alignment, DeltaBic, EXTENDED_EDGES, STANDARD_EDGES};
use halofit_rs::HaloFitError;

#[test]
fn test_delta_bic_is_antisymmetric() {
    let a = table(&[("NGC2403", 10.0, 25.0), ("DDO154", 12.0, 30.0), ("UGC00128", 20.0, 41.0)]);
    let b = table(&[("NGC2403", 14.0, 22.0), ("DDO154", 9.0, 33.5), ("UGC00128", 18.0, 41.0)]);

    let ab = delta_bic(&a, &b, Alignment::Strict).unwrap();
    let ba = delta_bic(&b, &a, Alignment::Strict).unwrap();
    for (name, value) in &ab.values {
        assert_relative_eq!(*value, -ba.get(name).unwrap());
    }
    assert_relative_eq!(ab.get("NGC2403").unwrap(), 3.0);
    assert_relative_eq!(ab.get("DDO154").unwrap(), -3.5);
    assert_eq!(ab.get("UGC00128"), Some(0.0));
}

#[test]
fn test_bins_and_summary() {
    let reference = table(&[
        ("A", 0.0, 100.0),
        ("B", 0.0, 100.0),
        ("C", 0.0, 100.0),
        ("D", 0.0, 100.0),
        ("E", 0.0, 100.0),
        ("F", 0.0, f64::NAN),
    ]);
    let model = table(&[
        ("A", 0.0, 108.0), // -8
        ("B", 0.0, 103.0), // -3
        ("C", 0.0, 98.0),  // 2, upper edge belongs to the lower bin
        ("D", 0.0, 96.0),  // 4
        ("E", 0.0, 80.0),  // 20
        ("F", 0.0, 90.0),
    ]);

    let delta = DeltaBic::compute(&reference, &model, Alignment::Strict).unwrap();
    assert_eq!(delta.len(), 5);
    assert_eq!(delta.excluded, vec!["F".to_string()]);

    let bins = delta.standard_bins();
    assert_eq!(bins.counts, vec![1, 1, 1, 1, 1]);
    assert_relative_eq!(bins.fractions.iter().sum::<f64>(), 1.0, epsilon = 1e-12);

    let extended = delta.extended_bins();
    assert_eq!(extended.counts, vec![0, 1, 1, 1, 1, 0, 1]);

    let summary = delta.summary();
    assert_eq!(summary.count, 5);
    assert_relative_eq!(summary.median, 2.0);
    assert_relative_eq!(summary.mean, 3.0);

    assert_eq!(bin_index(-2.0, &STANDARD_EDGES), 1);
    assert_eq!(bin_index(-10.0, &EXTENDED_EDGES), 0);
}

#[test]
fn test_alignment() {
    let a = table(&[("A", 1.0, 10.0), ("B", 1.0, 10.0), ("C", 1.0, 10.0)]);
    let b = table(&[("B", 1.0, 12.0), ("C", 1.0, 8.0), ("D", 1.0, 9.0)]);

    match delta_bic(&a, &b, Alignment::Strict) {
        Err(HaloFitError::AggregationMismatch { only_left, only_right }) => {
            assert_eq!(only_left, vec!["A".to_string()]);
            assert_eq!(only_right, vec!["D".to_string()]);
        }
        other => panic!("expected a mismatch, got {:?}", other),
    }

    let delta = delta_bic(&a, &b, Alignment::Intersect).unwrap();
    assert_eq!(delta.len(), 2);
    assert_eq!(delta.dropped, vec!["A".to_string(), "D".to_string()]);
    assert_relative_eq!(delta.get("C").unwrap(), 2.0);
}
