//! Wave (soliton + envelope) models.

use crate::test_helpers::{bulge_baryons, cdm_galaxy, dwarf_baryons, einasto_galaxy, noisy_nfw_galaxy};
use approx::assert_relative_eq;
use halofit_rs::fit::schema::build_parameters;
use halofit_rs::fit::{
    fit_galaxy, predict, predict_halo, CombineMode, FitConfiguration, MassMode, ParameterKind,
    RestartPolicy, WaveOptions, DEFAULT_M22, DEFAULT_M22_2,
};
use halofit_rs::halo::{CdmProfile, ModelSpec};
use ndarray::Array1;

#[test]
fn test_matched_without_junction_equals_summed() {
    let galaxy = cdm_galaxy("SYN0030", CdmProfile::Nfw, 8.0, 120.0, 20);
    let fit = |combine: CombineMode| {
        let wave = WaveOptions::default()
            .with_cdm_halo(CdmProfile::Nfw)
            .with_combine(combine)
            .with_junction(None);
        let config = FitConfiguration::builder(ModelSpec::WaveSingle)
            .wave(wave)
            .restart(RestartPolicy::disabled())
            .build()
            .unwrap();
        fit_galaxy(&galaxy, &config).unwrap()
    };

    let matched = fit(CombineMode::Matched);
    let summed = fit(CombineMode::Summed);
    assert_eq!(
        serde_json::to_string(&matched).unwrap(),
        serde_json::to_string(&summed).unwrap()
    );
}

#[test]
fn test_einasto_wave_fits() {
    let config = FitConfiguration::builder(ModelSpec::WaveSingle).build().unwrap();
    let cases = [
        einasto_galaxy("NGC5055", 6.0, 150.0, &bulge_baryons(), 30.0),
        einasto_galaxy("NGC3109", 10.0, 60.0, &dwarf_baryons(), 12.0),
    ];

    for galaxy in &cases {
        let result = fit_galaxy(galaxy, &config).unwrap();

        assert_eq!(result.ndata, 20);
        assert_eq!(result.has_bulge, galaxy.has_bulge());
        assert_eq!(result.restarts, 0);
        assert_eq!(result.parameter("alpha").unwrap().kind, ParameterKind::Derived);
        assert_eq!(result.parameter("m22").unwrap().kind, ParameterKind::Fixed);
        assert_eq!(result.parameter("m22").unwrap().stderr, 0.0);
        assert_relative_eq!(result.value("m22"), DEFAULT_M22);
        assert!(result.halo_mass.is_some());

        assert!(result.success, "{}", result);
        assert!(result.bic.is_finite());
        assert!(result.redchi >= 0.0);

        let v = predict(galaxy, &config, &result).unwrap();
        assert!(v.iter().all(|v| v.is_finite() && *v >= 0.0));

        let radius = Array1::linspace(0.1, 40.0, 60);
        let halo = predict_halo(galaxy, &config, &result, &radius).unwrap();
        assert!(halo.iter().all(|v| v.is_finite() && *v > 0.0));
    }
}

#[test]
fn test_restarts_run_through_seeds() {
    let galaxy = noisy_nfw_galaxy("SYN0031", 8.0, 120.0, 17);
    let wave = WaveOptions::default()
        .with_cdm_halo(CdmProfile::Nfw)
        .with_combine(CombineMode::Summed);

    // nothing is ever accepted, so every seed is tried
    let strict = RestartPolicy {
        enabled: true,
        redchi_threshold: 1e-12,
        soliton_seeds: vec![1e6, 1e8],
    };
    let config = FitConfiguration::builder(ModelSpec::WaveSingle)
        .wave(wave.clone())
        .restart(strict)
        .build()
        .unwrap();
    let result = fit_galaxy(&galaxy, &config).unwrap();
    assert_eq!(result.restarts, 2);

    let config = FitConfiguration::builder(ModelSpec::WaveSingle)
        .wave(wave)
        .restart(RestartPolicy::disabled())
        .build()
        .unwrap();
    assert_eq!(fit_galaxy(&galaxy, &config).unwrap().restarts, 0);
}

#[test]
fn test_multi_schema_and_scan_resolution() {
    let galaxy = cdm_galaxy("SYN0032", CdmProfile::Nfw, 8.0, 120.0, 20);
    let config = FitConfiguration::builder(ModelSpec::WaveMulti).build().unwrap();
    let params = build_parameters(&config, &galaxy).unwrap();
    for name in ["c200_2", "v200_2", "m22_2", "Msol_2", "alpha_2"] {
        assert!(params.contains(name), "missing {}", name);
    }
    assert_eq!(params.value("m22").unwrap(), DEFAULT_M22);
    assert_eq!(params.value("m22_2").unwrap(), DEFAULT_M22_2);

    let scan = FitConfiguration::builder(ModelSpec::WaveMulti)
        .wave(WaveOptions::default().with_mass(MassMode::Scan {
            masses: vec![0.5, 2.0],
            held: None,
        }))
        .build()
        .unwrap();
    assert!(scan.fixed_masses().is_err());
    let point = scan.at_mass(2.0).unwrap();
    assert_eq!(point.fixed_masses().unwrap(), Some((DEFAULT_M22, 2.0)));

    let single = FitConfiguration::builder(ModelSpec::WaveSingle)
        .wave(WaveOptions::default().with_mass(MassMode::Scan {
            masses: vec![3.0],
            held: None,
        }))
        .build()
        .unwrap();
    assert_eq!(single.at_mass(3.0).unwrap().fixed_masses().unwrap(), Some((3.0, DEFAULT_M22_2)));
}
