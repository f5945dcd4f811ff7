//! SPARC-format fixtures through the whole pipeline.

use crate::test_helpers::init_tracing;
use halofit_rs::aggregate::{delta_bic, Alignment};
use halofit_rs::fit::FitConfiguration;
use halofit_rs::galaxy::{CutReason, GalaxyCatalog, SampleCuts, SparcFormat};
use halofit_rs::halo::{CdmHalo, CdmProfile, HaloModel, ModelSpec};
use halofit_rs::orchestrator::BatchFitter;
use halofit_rs::HaloFitError;
use ndarray::Array1;
use std::fmt::Write;

const FORMAT: SparcFormat = SparcFormat {
    mass_model_header_lines: 3,
    catalog_header_lines: 2,
};

/// Mass-model rows of an NFW galaxy: observed = sqrt(halo² + 0.5 disk² + gas²).
fn mass_model_rows(out: &mut String, name: &str, c200: f64, v200: f64, samples: usize) {
    let halo = HaloModel::Cdm(CdmHalo::new(CdmProfile::Nfw, c200, v200));
    let radius = Array1::linspace(0.5, 15.0, samples);
    let v_halo = halo.velocities(&radius);
    for (r, vh) in radius.iter().zip(v_halo.iter()) {
        let v_disk = 40.0 * r / (1.0 + r);
        let v_gas = 10.0;
        let v_obs = (vh * vh + 0.5 * v_disk * v_disk + v_gas * v_gas).sqrt();
        let v_err = (0.05 * v_obs).max(1.0);
        writeln!(
            out,
            "{:<10} 5.00 {:.4} {:.6} {:.6} {:.6} {:.6} 0.00 10.00 0.00",
            name, r, v_obs, v_err, v_gas, v_disk
        )
        .unwrap();
    }
}

fn fixture() -> (String, String) {
    let mut mass_models = String::from("Title: synthetic mass models\nUnits: kpc km/s\n-----\n");
    mass_model_rows(&mut mass_models, "NGC2403", 9.0, 130.0, 16);
    mass_model_rows(&mut mass_models, "UGC00128", 6.0, 100.0, 16);
    mass_model_rows(&mut mass_models, "F571-8", 12.0, 90.0, 16);
    mass_model_rows(&mut mass_models, "KK98-251", 8.0, 60.0, 16);

    let catalog = "\
Galaxy T D e_D f_D Inc e_Inc L e_L Reff SBeff Rdisk SBdisk MHI RHI Vflat e_Vflat Q Ref
-----
NGC2403   6 3.16 0.16 2 63 3 10.041 0.100 1.39 1.67 1.39 5.72 3.199 9.9 131.2 2.9 1 Ref
UGC00128  8 64.5 9.70 1 57 10 12.020 0.180 6.75 42.0 5.95 10.0 7.43 42.7 129.0 3.6 1 Ref
F571-8    5 53.3 8.00 1 85 5 10.000 0.100 4.32 80.0 5.00 80.0 1.78 17.0 139.0 3.0 3 Ref
KK98-251  10 6.8 0.34 2 59 5 10.000 0.010 1.00 9.00 1.28 9.00 0.11 3.50 0.0 0.0 2 Ref
"
    .to_string();
    (mass_models, catalog)
}

#[test]
fn test_catalog_to_delta_bic() {
    init_tracing();
    let (mass_models, catalog) = fixture();
    let catalog = GalaxyCatalog::from_sparc_str(&mass_models, catalog.as_str(), FORMAT).unwrap();
    assert_eq!(catalog.len(), 4);
    assert_eq!(catalog.get("NGC2403").unwrap().len(), 16);

    let nfw = FitConfiguration::builder(ModelSpec::Nfw).build().unwrap();
    let burkert = FitConfiguration::builder(ModelSpec::Burkert).build().unwrap();

    let nfw = BatchFitter::new(&nfw).run(catalog.iter()).unwrap();
    let burkert = BatchFitter::new(&burkert).run(catalog.iter()).unwrap();

    assert_eq!(nfw.cut.get("F571-8"), Some(&CutReason::LowQuality));
    assert_eq!(nfw.cut.get("KK98-251"), Some(&CutReason::NoFlatVelocity));
    assert_eq!(nfw.table.names().collect::<Vec<_>>(), vec!["NGC2403", "UGC00128"]);

    let ngc = nfw.table.get("NGC2403").unwrap();
    assert!(ngc.success, "{}", ngc);
    assert!(ngc.chisqr < 1e-3);
    assert!((ngc.value("c200") - 9.0).abs() < 0.1);

    let delta = delta_bic(&burkert.table, &nfw.table, Alignment::Strict).unwrap();
    assert_eq!(delta.len() + delta.excluded.len(), 2);
}

#[test]
fn test_selection_can_be_disabled() {
    let (mass_models, catalog) = fixture();
    let catalog = GalaxyCatalog::from_sparc_str(&mass_models, catalog.as_str(), FORMAT).unwrap();

    let config = FitConfiguration::builder(ModelSpec::Nfw)
        .selection(SampleCuts::none())
        .galaxies(["F571-8", "KK98-251"])
        .build()
        .unwrap();
    let outcome = BatchFitter::new(&config).run(catalog.iter()).unwrap();
    assert!(outcome.cut.is_empty());
    assert_eq!(outcome.table.len(), 2);
}

#[test]
fn test_bad_galaxies_are_reported_and_the_rest_load() {
    let (mut mass_models, mut catalog) = fixture();
    mass_models.push_str("DDO154 4.04 0.49 13.8 nan? 1.0 2.0 0.0 0.0 0.0\n");
    mass_models.push_str("DDO168 4.25 0.36 11.0 0.0 1.0 2.0 0.0 0.0 0.0\n");
    mass_models.push_str("DDO168 4.25 0.72 15.0 2.0 1.0 2.0 0.0 0.0 0.0\n");
    catalog.push_str("DDO154    10 4.04 0.20 2 64 3 0.053 0.002 0.37 1.2 0.5 1.2 0.28 5.0 47.0 1.0 2 Ref\n");
    catalog.push_str("DDO168    10 4.25 0.21 2 63 6 0.191 0.003 1.29 1.8 1.0 1.8 0.41 5.2 53.4 1.5 2 Ref\n");

    let catalog = GalaxyCatalog::from_sparc_str(&mass_models, catalog.as_str(), FORMAT).unwrap();
    assert_eq!(catalog.names(), vec!["F571-8", "KK98-251", "NGC2403", "UGC00128"]);

    let failed: Vec<&String> = catalog.failures().keys().collect();
    assert_eq!(failed, vec!["DDO154", "DDO168"]);
    for (name, error) in catalog.failures() {
        match error {
            HaloFitError::DataError { galaxy, .. } => assert_eq!(galaxy, name),
            other => panic!("expected a data error for {}, got {:?}", name, other),
        }
    }
}
