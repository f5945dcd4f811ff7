//! Galaxy data: observations, the SPARC catalog loader, sample cuts and
//! synthetic catalogs.

pub mod catalog;
pub mod observation;
pub mod synthetic;

pub use catalog::{CutReason, GalaxyCatalog, SampleCuts, SparcFormat};
pub use observation::{CatalogEntry, GalaxyObservation, MassToLight, RotationCurve};
pub use synthetic::{observe, Baryons, SyntheticCatalog};
