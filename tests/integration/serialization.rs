//! JSON round trips and repeatability.

use crate::test_helpers::{cdm_galaxy, nfw_sample, table};
use halofit_rs::fit::{fit_galaxy, FitConfiguration, FitResult, ResultTable, ScanTable};
use halofit_rs::halo::{CdmProfile, ModelSpec};
use halofit_rs::orchestrator::fit_batch;

#[test]
fn test_fits_are_repeatable() {
    let config = FitConfiguration::builder(ModelSpec::Einasto).build().unwrap();
    let galaxies = nfw_sample();
    let first = fit_batch(&config, &galaxies).unwrap().table;
    let second = fit_batch(&config, &galaxies).unwrap().table;
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_non_finite_values_become_null() {
    let galaxy = cdm_galaxy("SYN0040", CdmProfile::Nfw, 8.0, 120.0, 3);
    let config = FitConfiguration::builder(ModelSpec::Nfw).build().unwrap();
    let result = fit_galaxy(&galaxy, &config).unwrap();
    assert!(result.redchi.is_nan());

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["redchi"].is_null());
    let c200 = json["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "c200")
        .unwrap();
    assert!(c200["stderr"].is_null());

    let back: FitResult = serde_json::from_value(json.clone()).unwrap();
    assert!(back.redchi.is_nan());
    assert!(back.parameter("c200").unwrap().stderr.is_infinite());
    assert_eq!(serde_json::to_value(&back).unwrap(), json);
}

#[test]
fn test_tables_round_trip() {
    let results = table(&[("NGC2403", 10.0, 20.0), ("DDO154", f64::NAN, f64::NAN)]);
    let text = serde_json::to_string(&results).unwrap();
    let back: ResultTable = serde_json::from_str(&text).unwrap();
    assert_eq!(back.len(), 2);
    assert_eq!(back.get("NGC2403"), results.get("NGC2403"));
    assert!(back.get("DDO154").unwrap().bic.is_nan());

    let mut scan = ScanTable::new();
    scan.insert(10.0, results.clone());
    scan.insert(1.0, results);
    let text = serde_json::to_string(&scan).unwrap();
    let back: ScanTable = serde_json::from_str(&text).unwrap();
    assert_eq!(back.len(), 2);
    assert_eq!(serde_json::to_string(&back).unwrap(), text);
}
