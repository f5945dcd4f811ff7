//! Fitting halo models to single galaxies.
//!
//! A [`FitConfiguration`] names the model and how it is fitted; the
//! [`GalaxyFitter`] builds the parameter table for a galaxy, minimises the
//! weighted velocity residuals (plus prior residuals) with the bounded
//! Levenberg-Marquardt optimizer and reports a [`FitResult`].
//!
//! # Example
//!
//! ```
//! use halofit_rs::fit::{fit_galaxy, FitConfiguration};
//! use halofit_rs::galaxy::{observe, Baryons};
//! use halofit_rs::halo::{CdmHalo, CdmProfile, HaloModel, ModelSpec};
//! use ndarray::Array1;
//! use rand::rngs::StdRng;
//!
//! let halo = HaloModel::Cdm(CdmHalo::new(CdmProfile::Nfw, 8.0, 120.0));
//! let radius = Array1::linspace(0.5, 20.0, 20);
//! let galaxy = observe::<StdRng>("SYN0001", radius, &halo, &Baryons::default(), 0.05, None).unwrap();
//!
//! let config = FitConfiguration::builder(ModelSpec::Nfw).build().unwrap();
//! let result = fit_galaxy(&galaxy, &config).unwrap();
//! assert!(result.success);
//! assert!((result.value("c200") - 8.0).abs() < 0.05);
//! ```

pub mod config;
pub mod fitter;
pub mod priors;
pub mod problem;
pub mod result;
pub mod schema;

pub use config::{
    matched_scan_grid, summed_scan_grid, CombineMode, FitConfiguration, FitConfigurationBuilder,
    FitRoutine, MassMode, RestartPolicy, WaveOptions, DEFAULT_JUNCTION, DEFAULT_M22, DEFAULT_M22_2,
};
pub use fitter::{fit_galaxy, predict, predict_halo, FitStatistics, GalaxyFitter};
pub use priors::Prior;
pub use problem::{ExternalView, RotationCurveProblem};
pub use result::{FitResult, ParameterKind, ParameterRow, ResultTable, ScanEntry, ScanTable, Statistic};
pub use schema::{ParameterDefaults, Range};
