//! Fit statistics and parameter errors of real fits.

use crate::test_helpers::{cdm_galaxy, noisy_nfw_galaxy};
use approx::assert_relative_eq;
use halofit_rs::fit::{fit_galaxy, FitConfiguration, FitRoutine, ParameterKind};
use halofit_rs::halo::{CdmProfile, ModelSpec};

#[test]
fn test_statistics_are_consistent() {
    let galaxy = noisy_nfw_galaxy("SYN0020", 8.0, 120.0, 3);
    let config = FitConfiguration::builder(ModelSpec::Nfw)
        .routine(FitRoutine::MldPriors)
        .build()
        .unwrap();
    let result = fit_galaxy(&galaxy, &config).unwrap();
    assert!(result.success);

    let objective = result.chisqr + result.penalty;
    assert!(result.penalty >= 0.0);
    assert_eq!(result.dof, result.ndata as i64 - result.nvarys as i64);
    assert_relative_eq!(result.redchi, objective / result.dof as f64, epsilon = 1e-12);
    assert_relative_eq!(
        result.bic,
        objective + result.nvarys as f64 * (result.ndata as f64).ln(),
        epsilon = 1e-9
    );
}

#[test]
fn test_saturated_fits_have_nan_redchi() {
    let config = FitConfiguration::builder(ModelSpec::Nfw).build().unwrap();
    for samples in [2, 3] {
        let galaxy = cdm_galaxy("SYN0021", CdmProfile::Nfw, 8.0, 120.0, samples);
        let result = fit_galaxy(&galaxy, &config).unwrap();
        assert!(result.dof <= 0);
        assert!(result.redchi.is_nan());
        assert!(!result.bic.is_finite() || result.success);
    }
}

#[test]
fn test_standard_errors() {
    let galaxy = noisy_nfw_galaxy("SYN0022", 8.0, 120.0, 5);
    let config = FitConfiguration::builder(ModelSpec::Nfw).build().unwrap();
    let result = fit_galaxy(&galaxy, &config).unwrap();
    assert!(result.success);

    for row in &result.parameters {
        match row.kind {
            ParameterKind::Fixed => assert_eq!(row.stderr, 0.0, "{}", row.name),
            _ => assert!(
                row.stderr.is_infinite() || (row.stderr > 0.0 && row.stderr < row.value.abs()),
                "{} = {} +/- {}",
                row.name,
                row.value,
                row.stderr
            ),
        }
    }
    assert_eq!(result.parameter("luminosity").unwrap().kind, ParameterKind::Fixed);
    assert_eq!(result.parameter("mstar").unwrap().kind, ParameterKind::Derived);
    assert_relative_eq!(
        result.value("mstar"),
        result.value("MLd") * result.value("luminosity"),
        max_relative = 1e-9
    );
}

#[test]
fn test_more_parameters_cost_bic() {
    // the same data fitted with and without a free Einasto shape
    let galaxy = cdm_galaxy("SYN0023", CdmProfile::Nfw, 8.0, 120.0, 20);
    let nfw = fit_galaxy(&galaxy, &FitConfiguration::builder(ModelSpec::Nfw).build().unwrap()).unwrap();
    let einasto = fit_galaxy(&galaxy, &FitConfiguration::builder(ModelSpec::Einasto).build().unwrap()).unwrap();

    assert_eq!(einasto.nvarys, nfw.nvarys + 1);
    assert!(nfw.success && einasto.success);

    // the extra parameter adds exactly ln N to the complexity term
    let nfw_term = nfw.bic - nfw.chisqr - nfw.penalty;
    let einasto_term = einasto.bic - einasto.chisqr - einasto.penalty;
    assert_relative_eq!(einasto_term - nfw_term, 20f64.ln(), epsilon = 1e-9);
    if einasto.chisqr >= nfw.chisqr {
        assert!(einasto.bic > nfw.bic);
    }
}
