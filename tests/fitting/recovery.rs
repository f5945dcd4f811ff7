//! Parameter recovery from synthetic rotation curves.

use crate::test_helpers::{bulge_baryons, cdm_galaxy, dwarf_baryons, einasto_galaxy, init_tracing, noisy_nfw_galaxy};
use approx::assert_relative_eq;
use halofit_rs::fit::{fit_galaxy, predict, predict_halo, FitConfiguration};
use halofit_rs::halo::{CdmProfile, ModelSpec};
use ndarray::Array1;

#[test]
fn test_burkert_zero_noise_recovery() {
    let galaxy = cdm_galaxy("SYN0010", CdmProfile::Burkert, 5.0, 90.0, 20);
    let config = FitConfiguration::builder(ModelSpec::Burkert).build().unwrap();
    let result = fit_galaxy(&galaxy, &config).unwrap();

    assert!(result.success, "{}", result);
    assert!(result.chisqr < 1e-6);
    assert_relative_eq!(result.value("c200"), 5.0, max_relative = 1e-2);
    assert_relative_eq!(result.value("v200"), 90.0, max_relative = 1e-2);
    assert_relative_eq!(result.value("MLd"), 0.5, max_relative = 1e-2);
}

#[test]
fn test_einasto_zero_noise_fit() {
    let galaxy = cdm_galaxy("SYN0011", CdmProfile::Einasto, 5.0, 110.0, 20);
    let config = FitConfiguration::builder(ModelSpec::Einasto).build().unwrap();
    let result = fit_galaxy(&galaxy, &config).unwrap();

    assert!(result.success, "{}", result);
    assert_eq!(result.nvarys, 4);
    assert!(result.chisqr < 1e-4);

    let v = predict(&galaxy, &config, &result).unwrap();
    for (model, observed) in v.iter().zip(galaxy.v_obs().iter()) {
        assert_relative_eq!(*model, *observed, max_relative = 1e-2);
    }
}

#[test]
fn test_noisy_nfw_fit() {
    let galaxy = noisy_nfw_galaxy("SYN0012", 8.0, 120.0, 11);
    let config = FitConfiguration::builder(ModelSpec::Nfw).build().unwrap();
    let result = fit_galaxy(&galaxy, &config).unwrap();

    assert!(result.success, "{}", result);
    assert_eq!(result.ndata, 25);
    assert_eq!(result.dof, 22);
    // 5% errors on a 5%-noise curve
    assert!(result.redchi > 0.2 && result.redchi < 3.0, "redchi = {}", result.redchi);

    let c200 = result.parameter("c200").unwrap();
    assert!(c200.stderr > 0.0);
    assert!(c200.value >= 1.0 && c200.value <= 100.0);
}

#[test]
fn test_named_galaxies_under_einasto() {
    init_tracing();
    let config = FitConfiguration::builder(ModelSpec::Einasto).build().unwrap();
    let cases = [
        einasto_galaxy("NGC5055", 6.0, 150.0, &bulge_baryons(), 30.0),
        einasto_galaxy("NGC3109", 10.0, 60.0, &dwarf_baryons(), 12.0),
    ];

    for galaxy in &cases {
        let result = fit_galaxy(galaxy, &config).unwrap();
        assert!(result.success, "{}", result);
        assert!(result.bic.is_finite());
        assert!(result.redchi >= 0.0);
        assert_eq!(result.parameter("MLb").is_some(), galaxy.has_bulge());

        let v = predict(galaxy, &config, &result).unwrap();
        assert!(v.iter().all(|v| v.is_finite() && *v > 0.0));

        // no jumps between neighbouring radii 1.1% apart
        let radius = Array1::logspace(10.0, 0.0, 30f64.log10(), 300);
        let halo = predict_halo(galaxy, &config, &result, &radius).unwrap();
        for pair in halo.windows(2) {
            assert!((pair[1] - pair[0]).abs() < 0.05 * pair[0], "{:?}", pair);
        }
    }
}
