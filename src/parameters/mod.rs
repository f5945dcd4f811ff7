//! # Parameter System
//!
//! Named, ordered parameter tables for halo fits.
//!
//! ## Core Components
//!
//! - [`Parameter`]: a single parameter that is free, fixed, or derived
//! - [`Parameters`]: an ordered table that refreshes derived values on update
//! - [`Bounds`] and [`BoundsTransform`]: box constraints and the Minuit
//!   transform used while optimizing
//! - [`Derivation`]: the rules for derived parameters (stellar mass, DC14
//!   velocity limits, bulge mass-to-light, matched Einasto shape)
//!
//! ## Example Usage
//!
//! ```rust
//! use halofit_rs::parameters::Parameters;
//!
//! let mut params = Parameters::new();
//! params.add_bounded("c200", 3.0, 1.0, 100.0).unwrap();
//! params.add_bounded("v200", 100.0, 1.0, 1000.0).unwrap();
//! params.add_fixed("luminosity", 12.5).unwrap();
//!
//! let internal = params.to_internal().unwrap();
//! assert_eq!(internal.len(), 2);
//! params.set_varying_from_internal(&internal).unwrap();
//! ```

pub mod bounds;
pub mod derivation;
pub mod names;
pub mod parameter;
pub mod parameters;

// Re-export key types
pub use bounds::{Bounds, BoundsError, BoundsTransform};
pub use derivation::Derivation;
pub use parameter::{Parameter, ParameterError};
pub use parameters::Parameters;
