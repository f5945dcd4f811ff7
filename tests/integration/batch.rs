//! Batches, particle-mass scans and configuration files.

use crate::test_helpers::{cdm_galaxy, nfw_sample};
use approx::assert_relative_eq;
use halofit_rs::aggregate::{delta_bic, fractional_curve, select_scan_entry, Alignment};
use halofit_rs::fit::{CombineMode, FitConfiguration, MassMode, RestartPolicy, Statistic, WaveOptions};
use halofit_rs::galaxy::{CutReason, SampleCuts};
use halofit_rs::halo::{CdmProfile, ModelSpec};
use halofit_rs::orchestrator::{fit_batch, BatchFitter};
use halofit_rs::HaloFitError;
use std::collections::BTreeMap;

fn summed_wave(mass: MassMode) -> FitConfiguration {
    let wave = WaveOptions::default()
        .with_cdm_halo(CdmProfile::Nfw)
        .with_combine(CombineMode::Summed)
        .with_mass(mass);
    FitConfiguration::builder(ModelSpec::WaveSingle)
        .wave(wave)
        .restart(RestartPolicy::disabled())
        .galaxies(["NGC2403", "DDO154"])
        .build()
        .unwrap()
}

#[test]
fn test_input_order_does_not_matter() {
    let config = FitConfiguration::builder(ModelSpec::Nfw).build().unwrap();
    let galaxies = nfw_sample();
    let forward = fit_batch(&config, &galaxies).unwrap();
    let backward = fit_batch(&config, galaxies.iter().rev()).unwrap();

    assert_eq!(
        serde_json::to_string(&forward.table).unwrap(),
        serde_json::to_string(&backward.table).unwrap()
    );
    assert_eq!(forward.table.len(), 3);
}

#[test]
fn test_double_scan_holds_the_other_mass() {
    let galaxies = nfw_sample();
    let wave = WaveOptions::default()
        .with_cdm_halo(CdmProfile::Nfw)
        .with_combine(CombineMode::Summed)
        .with_mass(MassMode::Scan {
            masses: vec![0.5, 2.0],
            held: Some(10.0),
        });
    let config = FitConfiguration::builder(ModelSpec::WaveMulti)
        .wave(wave)
        .restart(RestartPolicy::disabled())
        .galaxies(["NGC2403"])
        .build()
        .unwrap();
    let scan = BatchFitter::new(&config).run_scan(&galaxies).unwrap();

    assert_eq!(scan.table.len(), 2);
    assert!(scan.failures.is_empty());
    for entry in scan.table.iter() {
        let m22_2 = 10f64.powf(entry.log10_m22);
        assert_eq!(entry.table.len(), 1);
        for result in entry.table.iter() {
            assert_eq!(result.value("m22"), 10.0);
            assert_relative_eq!(result.value("m22_2"), m22_2, max_relative = 1e-9);
        }
    }
}

#[test]
fn test_particle_mass_scan() {
    let galaxies = nfw_sample();
    let scan_config = summed_wave(MassMode::Scan {
        masses: vec![1.0, 0.1],
        held: None,
    });
    let scan = BatchFitter::new(&scan_config).run_scan(&galaxies).unwrap();

    assert_eq!(scan.table.len(), 2);
    let masses: Vec<f64> = scan.table.iter().map(|e| e.log10_m22).collect();
    assert_relative_eq!(masses[0], -1.0, epsilon = 1e-12);
    assert_relative_eq!(masses[1], 0.0, epsilon = 1e-12);

    let at_one = select_scan_entry(&scan.table, 1.0, 1e-6).unwrap();
    assert_eq!(at_one.len() + scan.failures.iter().filter(|f| f.m22 == 1.0).count(), 2);
    for result in at_one.iter() {
        assert_relative_eq!(result.value("m22"), 1.0);
    }

    let reference = FitConfiguration::builder(ModelSpec::Nfw)
        .galaxies(["NGC2403", "DDO154"])
        .build()
        .unwrap();
    let reference = fit_batch(&reference, &galaxies).unwrap().table;
    let curve = fractional_curve(&reference, &scan.table, Statistic::ChiSquare, Alignment::Intersect).unwrap();
    assert_eq!(curve.len(), 2);
}

#[test]
fn test_cdm_reference_on_the_wave_sample() {
    let mut galaxies = nfw_sample();
    // too short for a wave fit
    galaxies.push(cdm_galaxy("DDO064", CdmProfile::Nfw, 10.0, 80.0, 10));

    let wave_options = WaveOptions::default()
        .with_cdm_halo(CdmProfile::Nfw)
        .with_combine(CombineMode::Summed);
    let wave = FitConfiguration::builder(ModelSpec::WaveSingle)
        .wave(wave_options)
        .restart(RestartPolicy::disabled())
        .build()
        .unwrap();
    let wave = fit_batch(&wave, &galaxies).unwrap();
    assert_eq!(wave.cut.get("DDO064"), Some(&CutReason::TooFewSamples));

    let cdm = FitConfiguration::builder(ModelSpec::Nfw).build().unwrap();
    let cdm = fit_batch(&cdm, &galaxies).unwrap();
    match delta_bic(&cdm.table, &wave.table, Alignment::Strict) {
        Err(HaloFitError::AggregationMismatch { only_left, only_right }) => {
            assert_eq!(only_left, vec!["DDO064".to_string()]);
            assert!(only_right.is_empty());
        }
        other => panic!("expected a mismatch, got {:?}", other.map(|d| d.len())),
    }

    let cdm = FitConfiguration::builder(ModelSpec::Nfw)
        .selection(SampleCuts::wave_sample())
        .build()
        .unwrap();
    let cdm = fit_batch(&cdm, &galaxies).unwrap();
    assert_eq!(cdm.cut.get("DDO064"), Some(&CutReason::TooFewSamples));
    assert_eq!(
        cdm.table.names().collect::<Vec<_>>(),
        wave.table.names().collect::<Vec<_>>()
    );

    let delta = delta_bic(&cdm.table, &wave.table, Alignment::Strict).unwrap();
    assert_eq!(delta.len() + delta.excluded.len(), 3);
    assert!(delta.dropped.is_empty());
}

#[test]
fn test_best_fit_masses() {
    let galaxies = nfw_sample();
    let config = summed_wave(MassMode::BestFit);
    let masses: BTreeMap<String, f64> = [("NGC2403".to_string(), 0.5)].into_iter().collect();

    let outcome = BatchFitter::new(&config)
        .with_best_fit_masses(masses)
        .run(&galaxies)
        .unwrap();

    assert_relative_eq!(outcome.table.get("NGC2403").unwrap().value("m22"), 0.5);
    assert!(matches!(
        outcome.failures.get("DDO154"),
        Some(HaloFitError::DataError { .. })
    ));
}

#[test]
fn test_configuration_files() {
    let config: FitConfiguration = serde_json::from_str(
        r#"{
            "model": "WaveSingle",
            "wave": {
                "cdm_halo": "Nfw",
                "combine": "Summed",
                "mass": {"Scan": {"masses": [1.0, 10.0]}}
            },
            "optimizer": {"max_iterations": 500}
        }"#,
    )
    .unwrap();
    assert_eq!(config.scan_masses(), Some(&[1.0, 10.0][..]));
    assert_eq!(config.optimizer().max_iterations, 500);
    assert!(config.restart().enabled);

    let defaults: FitConfiguration = serde_json::from_str(r#"{"model": "WaveMulti"}"#).unwrap();
    assert_eq!(defaults.wave(), Some(&WaveOptions::default()));

    let rejected = [
        r#"{"model": "Nfw", "wave": {}}"#,
        r#"{"model": "WaveSingle", "routine": "Dc14Check"}"#,
        r#"{"model": "Nfw", "galaxies": []}"#,
        r#"{"model": "Nfw", "restart": {"redchi_threshold": -1.0}}"#,
        r#"{"model": "WaveSingle", "wave": {"mass": {"Scan": {"masses": []}}}}"#,
        r#"{"model": "WaveSingle", "wave": {"junction": 0.0}}"#,
        r#"{"model": "Nfw", "optimizer": {"max_iterations": 0}}"#,
    ];
    for text in rejected {
        assert!(serde_json::from_str::<FitConfiguration>(text).is_err(), "{}", text);
    }

    let round_trip: FitConfiguration =
        serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
    assert_eq!(round_trip, config);
}
