//! Halo model library.
//!
//! Enclosed mass and circular velocity for the CDM profiles and for wave
//! dark matter (soliton core plus CDM envelope, one or two flavours).

pub mod cdm;
pub mod relations;
pub mod soliton;

pub use cdm::{CdmHalo, CdmProfile};
pub use soliton::Soliton;

use crate::constants::{KM_TO_GEV, KPC_TO_GEV, MSUN, PLANCK_MASS, S_TO_GEV};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The halo models that can be fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelSpec {
    Burkert,
    Dc14,
    Einasto,
    Nfw,
    /// One soliton + CDM envelope.
    WaveSingle,
    /// Two soliton + CDM envelope components.
    WaveMulti,
}

impl ModelSpec {
    pub const ALL: [ModelSpec; 6] = [
        ModelSpec::Burkert,
        ModelSpec::Dc14,
        ModelSpec::Einasto,
        ModelSpec::Nfw,
        ModelSpec::WaveSingle,
        ModelSpec::WaveMulti,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ModelSpec::Burkert => "Burkert",
            ModelSpec::Dc14 => "DC14",
            ModelSpec::Einasto => "Einasto",
            ModelSpec::Nfw => "NFW",
            ModelSpec::WaveSingle => "psi_single",
            ModelSpec::WaveMulti => "psi_multi",
        }
    }

    pub fn is_wave(&self) -> bool {
        matches!(self, ModelSpec::WaveSingle | ModelSpec::WaveMulti)
    }

    /// The CDM profile of a CDM model; `None` for wave models.
    pub fn cdm_profile(&self) -> Option<CdmProfile> {
        match self {
            ModelSpec::Burkert => Some(CdmProfile::Burkert),
            ModelSpec::Dc14 => Some(CdmProfile::Dc14),
            ModelSpec::Einasto => Some(CdmProfile::Einasto),
            ModelSpec::Nfw => Some(CdmProfile::Nfw),
            ModelSpec::WaveSingle | ModelSpec::WaveMulti => None,
        }
    }

    /// Number of soliton components.
    pub fn soliton_count(&self) -> usize {
        match self {
            ModelSpec::WaveSingle => 1,
            ModelSpec::WaveMulti => 2,
            _ => 0,
        }
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Circular velocity [km/s] at radius `r` [kpc] around an enclosed mass [M☉].
pub fn circular_velocity(mass: f64, r: f64) -> f64 {
    (mass * MSUN / (PLANCK_MASS * PLANCK_MASS * r * KPC_TO_GEV)).sqrt() * S_TO_GEV / KM_TO_GEV
}

/// A soliton with its CDM envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveComponent {
    pub soliton: Soliton,
    pub envelope: CdmHalo,
}

impl WaveComponent {
    /// Enclosed mass [M☉]. With a junction x_j the soliton saturates at
    /// x = r/r_c = x_j and the envelope contributes only from x ≥ x_j.
    pub fn enclosed_mass(&self, r: f64, junction: Option<f64>) -> f64 {
        match junction {
            None => self.soliton.enclosed_mass(r) + self.envelope.enclosed_mass(r),
            Some(xj) => {
                let x = self.soliton.scaled_radius(r);
                if x.is_nan() {
                    return f64::NAN;
                }
                if x < xj {
                    self.soliton.mass_at(x)
                } else {
                    self.soliton.mass_at(xj) + self.envelope.enclosed_mass(r)
                }
            }
        }
    }

    /// Mass of the envelope outside the junction [M☉].
    pub fn halo_mass(&self, junction: Option<f64>) -> f64 {
        let inner = junction
            .map(|xj| self.envelope.enclosed_mass(xj * self.soliton.core_radius()))
            .unwrap_or(0.0);
        self.envelope.virial_mass() - inner
    }
}

/// A fully parameterised halo.
#[derive(Debug, Clone, PartialEq)]
pub enum HaloModel {
    Cdm(CdmHalo),
    Wave {
        components: Vec<WaveComponent>,
        junction: Option<f64>,
    },
}

impl HaloModel {
    /// Enclosed dark matter mass [M☉] at radius `r` [kpc].
    pub fn enclosed_mass(&self, r: f64) -> f64 {
        match self {
            HaloModel::Cdm(halo) => halo.enclosed_mass(r),
            HaloModel::Wave {
                components,
                junction,
            } => components.iter().map(|c| c.enclosed_mass(r, *junction)).sum(),
        }
    }

    /// Halo circular velocity [km/s] at each radius.
    pub fn velocities(&self, radius: &Array1<f64>) -> Array1<f64> {
        radius.mapv(|r| circular_velocity(self.enclosed_mass(r), r))
    }

    /// Total dark matter mass [M☉]: M200 for CDM, solitons plus envelopes
    /// for wave models.
    pub fn virial_mass(&self) -> f64 {
        match self {
            HaloModel::Cdm(halo) => halo.virial_mass(),
            HaloModel::Wave {
                components,
                junction,
            } => components
                .iter()
                .map(|c| c.soliton.msol + c.halo_mass(*junction))
                .sum(),
        }
    }

    /// Envelope mass of a wave halo [M☉]; `None` for CDM.
    pub fn halo_mass(&self) -> Option<f64> {
        match self {
            HaloModel::Cdm(_) => None,
            HaloModel::Wave {
                components,
                junction,
            } => Some(components.iter().map(|c| c.halo_mass(*junction)).sum()),
        }
    }
}
