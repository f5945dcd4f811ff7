//! # halofit-rs
//!
//! `halofit-rs` fits dark-matter halo models to galaxy rotation curves and
//! compares the models across a galaxy sample.
//!
//! The library provides:
//! - Halo mass profiles: NFW, Burkert, DC14 and Einasto haloes, plus wave
//!   (soliton + envelope) haloes with one or two particle species
//! - A bounded Levenberg-Marquardt optimizer with parameter bounds, fixed and
//!   derived parameters
//! - Per-galaxy fit statistics (χ², reduced χ², BIC) and parameter errors
//! - Batch fitting over a SPARC-style catalog, optionally in parallel
//! - Population comparison: ΔBIC distributions and summed χ² curves
//!
//! ## Basic Usage
//!
//! ```
//! use halofit_rs::{fit_batch, FitConfiguration, ModelSpec};
//! use halofit_rs::aggregate::{delta_bic, Alignment};
//! use halofit_rs::galaxy::{observe, Baryons};
//! use halofit_rs::halo::{CdmHalo, CdmProfile, HaloModel};
//! use ndarray::Array1;
//! use rand::rngs::StdRng;
//!
//! let galaxies: Vec<_> = [6.0, 9.0, 12.0]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, &c200)| {
//!         let halo = HaloModel::Cdm(CdmHalo::new(CdmProfile::Nfw, c200, 110.0));
//!         let radius = Array1::linspace(0.5, 20.0, 16);
//!         observe::<StdRng>(&format!("SYN{i:04}"), radius, &halo, &Baryons::default(), 0.05, None).unwrap()
//!     })
//!     .collect();
//!
//! let nfw = FitConfiguration::builder(ModelSpec::Nfw).build().unwrap();
//! let burkert = FitConfiguration::builder(ModelSpec::Burkert).build().unwrap();
//!
//! let nfw_table = fit_batch(&nfw, &galaxies).unwrap().table;
//! let burkert_table = fit_batch(&burkert, &galaxies).unwrap().table;
//!
//! let delta = delta_bic(&burkert_table, &nfw_table, Alignment::Strict).unwrap();
//! assert_eq!(delta.len() + delta.excluded.len(), 3);
//! ```

pub mod aggregate;
pub mod constants;
pub mod error;
pub mod fit;
pub mod galaxy;
pub mod halo;
pub mod lm;
pub mod orchestrator;
pub mod parameters;
pub mod problem;
pub mod uncertainty;
pub mod utils;

// Re-exports for convenience
pub use error::{HaloFitError, Result};
pub use fit::{
    fit_galaxy, FitConfiguration, FitResult, FitRoutine, GalaxyFitter, MassMode, ResultTable,
    ScanTable, Statistic, WaveOptions,
};
pub use galaxy::{GalaxyCatalog, GalaxyObservation};
pub use halo::{HaloModel, ModelSpec};
pub use lm::{LevenbergMarquardt, LmConfig, LmResult};
pub use orchestrator::{fit_batch, BatchFitter, BatchOutcome};
pub use parameters::{Parameter, Parameters};
pub use problem::Problem;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
