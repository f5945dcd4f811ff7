//! Prior routines and the CDM check routines.

use crate::test_helpers::{bulge_baryons, nfw_sample};
use approx::assert_relative_eq;
use halofit_rs::aggregate::{delta_bic, Alignment};
use halofit_rs::fit::{fit_galaxy, FitConfiguration, FitRoutine, ParameterKind};
use halofit_rs::galaxy::observe;
use halofit_rs::halo::{CdmHalo, CdmProfile, HaloModel, ModelSpec};
use halofit_rs::orchestrator::fit_batch;
use ndarray::Array1;
use rand_chacha::ChaCha8Rng;

#[test]
fn test_einasto_check_ties_bulge_to_disk() {
    let halo = HaloModel::Cdm(CdmHalo::new(CdmProfile::Einasto, 6.0, 150.0).with_alpha(0.17));
    // the synthetic bulge ratio 0.7 is 1.4 times the disk ratio 0.5
    let galaxy = observe::<ChaCha8Rng>(
        "NGC5055",
        Array1::linspace(0.5, 20.0, 20),
        &halo,
        &bulge_baryons(),
        0.05,
        None,
    )
    .unwrap();
    assert!(galaxy.has_bulge());

    let config = FitConfiguration::builder(ModelSpec::Einasto)
        .routine(FitRoutine::EinastoCheck)
        .build()
        .unwrap();
    let result = fit_galaxy(&galaxy, &config).unwrap();

    let mlb = result.parameter("MLb").unwrap();
    assert_eq!(mlb.kind, ParameterKind::Derived);
    assert_relative_eq!(mlb.value, 1.4 * result.value("MLd"), max_relative = 1e-9);
    assert_eq!(result.nvarys, 4);
    assert!(result.success, "{}", result);
    assert!(result.penalty >= 0.0);
    assert!(result.bic.is_finite());
}

#[test]
fn test_dc14_against_nfw_check() {
    let galaxies = nfw_sample();
    let nfw = FitConfiguration::builder(ModelSpec::Nfw)
        .routine(FitRoutine::CdmCheck)
        .build()
        .unwrap();
    let dc14 = FitConfiguration::builder(ModelSpec::Dc14)
        .routine(FitRoutine::Dc14Check)
        .build()
        .unwrap();

    let nfw = fit_batch(&nfw, &galaxies).unwrap();
    let dc14 = fit_batch(&dc14, &galaxies).unwrap();
    assert!(nfw.failures.is_empty() && dc14.failures.is_empty());

    for result in dc14.table.iter() {
        // log-scaled fit: c200 and MLd are stored as log10
        let log_c200 = result.value("c200");
        assert!((0.0..=2.0).contains(&log_c200));
        assert!(result.value("MLd") < 0.0);
        assert_eq!(result.parameter("mgas").unwrap().kind, ParameterKind::Fixed);
        assert_eq!(result.parameter("v200").unwrap().kind, ParameterKind::Derived);
    }

    let delta = delta_bic(&nfw.table, &dc14.table, Alignment::Strict).unwrap();
    assert_eq!(delta.len() + delta.excluded.len(), galaxies.len());

    let bins = delta.standard_bins();
    assert_eq!(bins.counts.len(), 5);
    assert_eq!(bins.total(), delta.len());
    assert!(!delta.is_empty());
    assert_relative_eq!(bins.fractions.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_mass_to_light_prior_adds_penalty() {
    let galaxies = nfw_sample();
    let galaxy = &galaxies[1];
    let uniform = FitConfiguration::builder(ModelSpec::Nfw).build().unwrap();
    let priors = FitConfiguration::builder(ModelSpec::Nfw)
        .routine(FitRoutine::MldPriors)
        .build()
        .unwrap();

    let a = fit_galaxy(galaxy, &uniform).unwrap();
    let b = fit_galaxy(galaxy, &priors).unwrap();

    assert!(!(a.penalty > 0.0));
    assert_eq!(a.nvarys, b.nvarys);
    assert_eq!(a.ndata, b.ndata);
    // the prior only counts in the objective, never in the data χ²
    assert!(b.success, "{}", b);
    assert!(b.penalty >= 0.0);
    assert_relative_eq!(b.redchi, (b.chisqr + b.penalty) / b.dof as f64, epsilon = 1e-12);
}
