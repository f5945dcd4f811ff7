//! Parameter schemas of the halo models.
//!
//! The schema of a fit is the ordered parameter table produced from the
//! model, the routine and the galaxy; the halo and mass-to-light ratios are
//! read back from that table at every evaluation.

use crate::error::Result;
use crate::fit::config::{FitConfiguration, FitRoutine};
use crate::galaxy::{GalaxyObservation, MassToLight};
use crate::halo::{CdmHalo, CdmProfile, HaloModel, ModelSpec, Soliton, WaveComponent};
use crate::parameters::{names, Bounds, Derivation, Parameters};
use std::f64::{INFINITY, NEG_INFINITY};

/// `[init, min, max]` of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub init: f64,
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(init: f64, min: f64, max: f64) -> Self {
        Self { init, min, max }
    }

    pub fn bounds(&self) -> Result<Bounds> {
        Ok(Bounds::new(self.min, self.max)?)
    }

    fn relaxed(self) -> Self {
        Self::new(self.init, 0.0, INFINITY)
    }
}

/// Initial values and bounds of a routine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterDefaults {
    pub c200: Range,
    pub v200: Range,
    pub v200_factor: Range,
    pub mld: Range,
    pub mlb: Range,
    pub alpha: Range,
    pub msol: Range,
    pub m22: Range,
}

impl Default for ParameterDefaults {
    fn default() -> Self {
        Self {
            c200: Range::new(3.0, 1.0, 100.0),
            v200: Range::new(100.0, 1.0, 1000.0),
            v200_factor: Range::new(1.5, 1.0, INFINITY),
            mld: Range::new(0.5, 0.01, 5.0),
            mlb: Range::new(0.7, 0.01, 5.0),
            alpha: Range::new(0.16, NEG_INFINITY, INFINITY),
            msol: Range::new(1e9, 10f64.powf(4.5), 1e12),
            m22: Range::new(1.0, 1e-3, 1e3),
        }
    }
}

impl ParameterDefaults {
    pub fn for_routine(routine: FitRoutine) -> Self {
        let mut d = Self::default();
        match routine {
            FitRoutine::UniformPriors => {}
            FitRoutine::C200Priors => d.c200 = d.c200.relaxed(),
            FitRoutine::V200Priors => d.v200 = d.v200.relaxed(),
            FitRoutine::MldPriors => d.mld = d.mld.relaxed(),
            FitRoutine::MlbPriors => d.mlb = d.mlb.relaxed(),
            FitRoutine::CdmCheck => {
                d.c200 = Range::new(3.0, 0.1, 1e3);
                d.v200 = Range::new(100.0, 10.0, 500.0);
            }
            FitRoutine::Dc14Check => {
                d.c200 = Range::new(5f64.log10(), 0.0, 2.0);
                d.v200 = Range::new(2.0, 1.0, 500f64.log10());
                d.v200_factor = Range::new(2.0, 1.0, INFINITY);
                d.mld = Range::new(0.5f64.log10(), 0.3f64.log10(), 0.8f64.log10());
            }
            FitRoutine::EinastoCheck => {
                d.v200 = Range::new(100.0, 1.0, 500.0);
                d.alpha = Range::new(0.16, 1e-3, 10.0);
            }
        }
        d
    }
}

fn add_range(params: &mut Parameters, name: &str, range: Range) -> Result<()> {
    params.add_bounded(name, range.init, range.min, range.max)?;
    Ok(())
}

/// Envelope profile of the configured model.
fn envelope_profile(config: &FitConfiguration) -> Option<CdmProfile> {
    config
        .model()
        .cdm_profile()
        .or_else(|| config.wave().map(|w| w.cdm_halo))
}

/// Build the parameter table of a fit.
///
/// Order: c200, MLd, luminosity, [MLb], mstar, the v200 block, then alpha
/// for CDM Einasto or the soliton block for wave models.
///
/// # Errors
///
/// `ConfigurationError` for an unresolved scan or best-fit mass.
pub fn build_parameters(config: &FitConfiguration, galaxy: &GalaxyObservation) -> Result<Parameters> {
    let routine = config.routine();
    let d = ParameterDefaults::for_routine(routine);
    let log_scaled = routine.log_scaled();
    let bulge = galaxy.has_bulge() && !log_scaled;
    let profile = envelope_profile(config);

    let mut params = Parameters::new();
    add_range(&mut params, names::C200, d.c200)?;
    add_range(&mut params, names::MLD, d.mld)?;
    params.add_fixed(names::LUMINOSITY, galaxy.catalog().luminosity)?;
    if bulge {
        if routine == FitRoutine::EinastoCheck {
            params.add_derived(names::MLB, Derivation::BulgeFromDisk { ratio: 1.4 }, d.mlb.bounds()?)?;
        } else {
            add_range(&mut params, names::MLB, d.mlb)?;
        }
    }
    params.add_derived(
        names::MSTAR,
        Derivation::StellarMass {
            log_ml: log_scaled,
            bulge,
        },
        Bounds::unbounded(),
    )?;

    if log_scaled {
        params.add_fixed(names::MGAS, galaxy.catalog().gas_mass)?;
        add_range(&mut params, names::V200_FACTOR, d.v200_factor)?;
        params.add_derived(names::V200, Derivation::V200FromBaryons, d.v200.bounds()?)?;
    } else if profile == Some(CdmProfile::Dc14) {
        add_range(&mut params, names::V200_FACTOR, d.v200_factor)?;
        params.add_derived(names::V200, Derivation::V200FromStellarMass, d.v200.bounds()?)?;
    } else {
        add_range(&mut params, names::V200, d.v200)?;
    }

    let wave = match config.wave() {
        Some(wave) => wave,
        None => {
            if profile == Some(CdmProfile::Einasto) {
                add_range(&mut params, names::ALPHA, d.alpha)?;
            }
            return Ok(params);
        }
    };

    let multi = config.model() == ModelSpec::WaveMulti;
    if multi {
        add_range(&mut params, names::C200_2, d.c200)?;
        add_range(&mut params, names::V200_2, d.v200)?;
    }

    match config.fixed_masses()? {
        Some((m22, m22_2)) => {
            params.add_fixed(names::M22, m22)?;
            if multi {
                params.add_fixed(names::M22_2, m22_2)?;
            }
        }
        None => {
            add_range(&mut params, names::M22, d.m22)?;
            if multi {
                add_range(&mut params, names::M22_2, d.m22)?;
            }
        }
    }
    add_range(&mut params, names::MSOL, d.msol)?;
    if multi {
        add_range(&mut params, names::MSOL_2, d.msol)?;
    }

    if wave.cdm_halo == CdmProfile::Einasto {
        if wave.matches_alpha() {
            params.add_derived(names::ALPHA, Derivation::alpha_matched_primary(), d.alpha.bounds()?)?;
            if multi {
                params.add_derived(
                    names::ALPHA_2,
                    Derivation::alpha_matched_secondary(),
                    d.alpha.bounds()?,
                )?;
            }
        } else {
            add_range(&mut params, names::ALPHA, d.alpha)?;
            if multi {
                add_range(&mut params, names::ALPHA_2, Range { init: 1.0, ..d.alpha })?;
            }
        }
    }

    Ok(params)
}

/// Names of the soliton masses of a model, reset by restarts.
pub fn soliton_masses(model: ModelSpec) -> &'static [&'static str] {
    match model {
        ModelSpec::WaveSingle => &[names::MSOL],
        ModelSpec::WaveMulti => &[names::MSOL, names::MSOL_2],
        _ => &[],
    }
}

/// Physical value of a parameter that may be stored as log10.
fn physical(params: &Parameters, name: &str, log_scaled: bool) -> Result<f64> {
    let value = params.value(name)?;
    Ok(if log_scaled { 10f64.powf(value) } else { value })
}

/// The halo described by a parameter table.
pub fn halo_model(config: &FitConfiguration, params: &Parameters) -> Result<HaloModel> {
    let log_scaled = config.routine().log_scaled();
    let mstar = params.value(names::MSTAR)?;
    let envelope = |profile: CdmProfile, c200: &str, v200: &str, alpha: &str| -> Result<CdmHalo> {
        let mut halo = CdmHalo::new(
            profile,
            physical(params, c200, log_scaled)?,
            physical(params, v200, log_scaled)?,
        )
        .with_stellar_mass(mstar);
        if let Some(alpha) = params.value_opt(alpha) {
            halo = halo.with_alpha(alpha);
        }
        Ok(halo)
    };

    let wave = match config.wave() {
        Some(wave) => wave,
        None => {
            let profile = envelope_profile(config).unwrap_or(CdmProfile::Nfw);
            return Ok(HaloModel::Cdm(envelope(profile, names::C200, names::V200, names::ALPHA)?));
        }
    };

    let mut components = vec![WaveComponent {
        soliton: Soliton::new(params.value(names::M22)?, params.value(names::MSOL)?),
        envelope: envelope(wave.cdm_halo, names::C200, names::V200, names::ALPHA)?,
    }];
    if config.model() == ModelSpec::WaveMulti {
        components.push(WaveComponent {
            soliton: Soliton::new(params.value(names::M22_2)?, params.value(names::MSOL_2)?),
            envelope: envelope(wave.cdm_halo, names::C200_2, names::V200_2, names::ALPHA_2)?,
        });
    }

    Ok(HaloModel::Wave {
        components,
        junction: wave.effective_junction(),
    })
}

/// Mass-to-light ratios of a parameter table. Log-scaled fits apply
/// 10^MLd to disk and bulge alike.
pub fn mass_to_light(config: &FitConfiguration, params: &Parameters) -> Result<MassToLight> {
    if config.routine().log_scaled() {
        let ml = 10f64.powf(params.value(names::MLD)?);
        return Ok(MassToLight { disk: ml, bulge: ml });
    }
    Ok(MassToLight {
        disk: params.value(names::MLD)?,
        bulge: params.value_opt(names::MLB).unwrap_or(0.0),
    })
}
