//! Configuration of a fit: model, routine, wave options, restarts,
//! optimizer and sample selection.
//!
//! A [`FitConfiguration`] is only obtained through
//! [`FitConfigurationBuilder::build`] (directly or by deserialising), so an
//! inconsistent combination of options is rejected before any galaxy is
//! fitted.

use crate::error::{HaloFitError, Result};
use crate::galaxy::SampleCuts;
use crate::halo::{CdmProfile, ModelSpec};
use crate::lm::LmConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default particle mass of the first soliton component [1e-22 eV].
pub const DEFAULT_M22: f64 = 31.622776601683793;

/// Default particle mass of the second soliton component [1e-22 eV].
pub const DEFAULT_M22_2: f64 = 1.0;

/// Default junction x = r/r_c between soliton and envelope.
pub const DEFAULT_JUNCTION: f64 = 3.0;

/// Prior and check regime of a fit.
///
/// Each routine selects a table of initial values and bounds and a set of
/// prior penalties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FitRoutine {
    /// Flat priors inside the default bounds
    #[default]
    UniformPriors,
    /// Log-normal prior on c200 around the concentration-mass relation
    C200Priors,
    /// Log-normal prior linking v200 to the stellar mass by abundance matching
    V200Priors,
    /// Log-normal prior on the disk mass-to-light ratio
    MldPriors,
    /// Log-normal prior on the bulge mass-to-light ratio
    MlbPriors,
    /// Wider halo bounds used for CDM cross checks
    CdmCheck,
    /// DC14 cross check with log-scaled parameters and v200 tied to the baryons
    Dc14Check,
    /// Einasto cross check with MLb = 1.4 MLd and a Gaussian MLd prior
    EinastoCheck,
}

impl FitRoutine {
    pub const ALL: [FitRoutine; 8] = [
        FitRoutine::UniformPriors,
        FitRoutine::C200Priors,
        FitRoutine::V200Priors,
        FitRoutine::MldPriors,
        FitRoutine::MlbPriors,
        FitRoutine::CdmCheck,
        FitRoutine::Dc14Check,
        FitRoutine::EinastoCheck,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FitRoutine::UniformPriors => "uniform_priors",
            FitRoutine::C200Priors => "c200_priors",
            FitRoutine::V200Priors => "v200_priors",
            FitRoutine::MldPriors => "mld_priors",
            FitRoutine::MlbPriors => "mlb_priors",
            FitRoutine::CdmCheck => "cdm_check",
            FitRoutine::Dc14Check => "dc14_check",
            FitRoutine::EinastoCheck => "einasto_check",
        }
    }

    /// Check routines only apply to CDM models.
    pub fn is_check(&self) -> bool {
        matches!(
            self,
            FitRoutine::CdmCheck | FitRoutine::Dc14Check | FitRoutine::EinastoCheck
        )
    }

    /// Whether c200, v200 and MLd are fitted as log10 values.
    pub fn log_scaled(&self) -> bool {
        matches!(self, FitRoutine::Dc14Check)
    }
}

impl fmt::Display for FitRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the particle mass of a wave model is chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MassMode {
    /// m22 (and m22_2) are fitted.
    Free,
    /// Both particle masses are held fixed.
    Fixed { m22: f64, m22_2: f64 },
    /// One fit per mass. The scanned mass is m22 for single models and
    /// m22_2 for double models; the other is held at `held`, or at its
    /// default when `held` is `None`.
    Scan {
        masses: Vec<f64>,
        #[serde(default)]
        held: Option<f64>,
    },
    /// A per-galaxy mass supplied to the orchestrator.
    BestFit,
}

impl Default for MassMode {
    fn default() -> Self {
        MassMode::Fixed {
            m22: DEFAULT_M22,
            m22_2: DEFAULT_M22_2,
        }
    }
}

/// How a soliton and its envelope are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombineMode {
    /// Soliton and envelope masses add at full strength.
    Summed,
    /// The soliton saturates at the junction and the envelope takes over.
    #[default]
    Matched,
}

/// Options of the wave models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveOptions {
    /// Envelope profile of each soliton component
    pub cdm_halo: CdmProfile,
    pub mass: MassMode,
    pub combine: CombineMode,
    /// Junction x = r/r_c for matched halos; `None` lets soliton and envelope
    /// overlap everywhere.
    pub junction: Option<f64>,
}

impl Default for WaveOptions {
    fn default() -> Self {
        Self {
            cdm_halo: CdmProfile::Einasto,
            mass: MassMode::default(),
            combine: CombineMode::default(),
            junction: Some(DEFAULT_JUNCTION),
        }
    }
}

impl WaveOptions {
    pub fn with_cdm_halo(mut self, profile: CdmProfile) -> Self {
        self.cdm_halo = profile;
        self
    }

    pub fn with_mass(mut self, mass: MassMode) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_combine(mut self, combine: CombineMode) -> Self {
        self.combine = combine;
        self
    }

    pub fn with_junction(mut self, junction: Option<f64>) -> Self {
        self.junction = junction;
        self
    }

    /// Junction used by the halo: none when summed.
    pub fn effective_junction(&self) -> Option<f64> {
        match self.combine {
            CombineMode::Summed => None,
            CombineMode::Matched => self.junction,
        }
    }

    /// Whether the Einasto shape is tied to the soliton instead of fitted.
    pub fn matches_alpha(&self) -> bool {
        self.cdm_halo == CdmProfile::Einasto && self.effective_junction().is_some()
    }

    /// Default scan grid for this combine mode.
    pub fn default_scan_grid(&self) -> Vec<f64> {
        match self.combine {
            CombineMode::Summed => summed_scan_grid(),
            CombineMode::Matched => matched_scan_grid(),
        }
    }
}

/// Particle masses 10^0, 10^0.15, …, 10^1.95.
pub fn matched_scan_grid() -> Vec<f64> {
    (0..14).map(|i| 10f64.powf(0.15 * i as f64)).collect()
}

/// Particle masses 10^-3, 10^-2.5, …, 10^3.5.
pub fn summed_scan_grid() -> Vec<f64> {
    (0..14).map(|i| 10f64.powf(-3.0 + 0.5 * i as f64)).collect()
}

/// Refits of wave models with a poor first fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartPolicy {
    pub enabled: bool,
    /// A fit is accepted when its reduced χ² is finite and at most this.
    pub redchi_threshold: f64,
    /// Soliton masses [M☉] tried in turn.
    pub soliton_seeds: Vec<f64>,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            redchi_threshold: 10.0,
            soliton_seeds: vec![1e5, 1e6, 1e7, 1e8, 1e10, 1e11],
        }
    }
}

impl RestartPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Whether a fit with this reduced χ² is acceptable.
    pub fn accepts(&self, redchi: f64) -> bool {
        !redchi.is_nan() && redchi <= self.redchi_threshold
    }
}

/// A validated fit configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FitConfigurationBuilder")]
pub struct FitConfiguration {
    model: ModelSpec,
    routine: FitRoutine,
    wave: Option<WaveOptions>,
    galaxies: Option<Vec<String>>,
    restart: RestartPolicy,
    optimizer: LmConfig,
    selection: SampleCuts,
}

impl FitConfiguration {
    /// Start a configuration for `model`.
    ///
    /// # Examples
    ///
    /// ```
    /// use halofit_rs::fit::{FitConfiguration, FitRoutine};
    /// use halofit_rs::halo::ModelSpec;
    ///
    /// let config = FitConfiguration::builder(ModelSpec::Einasto)
    ///     .routine(FitRoutine::EinastoCheck)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.model(), ModelSpec::Einasto);
    ///
    /// // check routines are CDM only
    /// assert!(FitConfiguration::builder(ModelSpec::WaveSingle)
    ///     .routine(FitRoutine::Dc14Check)
    ///     .build()
    ///     .is_err());
    /// ```
    pub fn builder(model: ModelSpec) -> FitConfigurationBuilder {
        FitConfigurationBuilder::new(model)
    }

    pub fn model(&self) -> ModelSpec {
        self.model
    }

    pub fn routine(&self) -> FitRoutine {
        self.routine
    }

    /// Wave options; always present for wave models, never for CDM models.
    pub fn wave(&self) -> Option<&WaveOptions> {
        self.wave.as_ref()
    }

    pub fn galaxies(&self) -> Option<&[String]> {
        self.galaxies.as_deref()
    }

    pub fn restart(&self) -> &RestartPolicy {
        &self.restart
    }

    pub fn optimizer(&self) -> &LmConfig {
        &self.optimizer
    }

    pub fn selection(&self) -> &SampleCuts {
        &self.selection
    }

    /// Whether `name` is part of the configured subset.
    pub fn includes(&self, name: &str) -> bool {
        self.galaxies
            .as_ref()
            .map_or(true, |subset| subset.iter().any(|g| g == name))
    }

    /// Masses of a scan configuration.
    pub fn scan_masses(&self) -> Option<&[f64]> {
        match self.wave.as_ref().map(|w| &w.mass) {
            Some(MassMode::Scan { masses, .. }) => Some(masses),
            _ => None,
        }
    }

    pub fn is_best_fit(&self) -> bool {
        matches!(self.wave.as_ref().map(|w| &w.mass), Some(MassMode::BestFit))
    }

    /// The same configuration with the scanned particle mass fixed at
    /// `mass`: m22 for single models, m22_2 for double models.
    pub fn at_mass(&self, mass: f64) -> Result<FitConfiguration> {
        let wave = self.wave.as_ref().ok_or_else(|| {
            HaloFitError::ConfigurationError(format!(
                "model {} has no particle mass",
                self.model
            ))
        })?;
        check_mass("particle mass", mass)?;

        let held = match &wave.mass {
            MassMode::Scan { held, .. } => *held,
            _ => None,
        };
        let fixed = match self.model {
            ModelSpec::WaveMulti => MassMode::Fixed {
                m22: held.unwrap_or(DEFAULT_M22),
                m22_2: mass,
            },
            _ => MassMode::Fixed {
                m22: mass,
                m22_2: held.unwrap_or(DEFAULT_M22_2),
            },
        };
        let mut resolved = self.clone();
        resolved.wave = Some(wave.clone().with_mass(fixed));
        Ok(resolved)
    }

    /// Fixed particle masses, `None` when they are fitted.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` for scan and best-fit modes, which must be
    /// resolved with [`FitConfiguration::at_mass`] first.
    pub fn fixed_masses(&self) -> Result<Option<(f64, f64)>> {
        match self.wave.as_ref().map(|w| &w.mass) {
            None | Some(MassMode::Free) => Ok(None),
            Some(MassMode::Fixed { m22, m22_2 }) => Ok(Some((*m22, *m22_2))),
            Some(MassMode::Scan { .. }) | Some(MassMode::BestFit) => {
                Err(HaloFitError::ConfigurationError(
                    "particle mass must be resolved for each scan point".to_string(),
                ))
            }
        }
    }
}

/// Builder for [`FitConfiguration`], following the `LmConfig` defaults
/// pattern. Deserialising a configuration goes through this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfigurationBuilder {
    model: ModelSpec,
    #[serde(default)]
    routine: FitRoutine,
    #[serde(default)]
    wave: Option<WaveOptions>,
    #[serde(default)]
    galaxies: Option<Vec<String>>,
    #[serde(default)]
    restart: RestartPolicy,
    #[serde(default)]
    optimizer: LmConfig,
    #[serde(default)]
    selection: SampleCuts,
}

impl FitConfigurationBuilder {
    pub fn new(model: ModelSpec) -> Self {
        Self {
            model,
            routine: FitRoutine::default(),
            wave: None,
            galaxies: None,
            restart: RestartPolicy::default(),
            optimizer: LmConfig::default(),
            selection: SampleCuts::default(),
        }
    }

    pub fn routine(mut self, routine: FitRoutine) -> Self {
        self.routine = routine;
        self
    }

    pub fn wave(mut self, wave: WaveOptions) -> Self {
        self.wave = Some(wave);
        self
    }

    pub fn galaxies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.galaxies = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn restart(mut self, restart: RestartPolicy) -> Self {
        self.restart = restart;
        self
    }

    pub fn optimizer(mut self, optimizer: LmConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn selection(mut self, selection: SampleCuts) -> Self {
        self.selection = selection;
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` for wave options on a CDM model, a check routine
    /// on a wave model, invalid particle masses or junction, an empty galaxy
    /// subset, an invalid restart policy, or an iteration cap of zero.
    pub fn build(self) -> Result<FitConfiguration> {
        let fail = |message: String| Err(HaloFitError::ConfigurationError(message));

        let wave = if self.model.is_wave() {
            if self.routine.is_check() {
                return fail(format!(
                    "routine {} only applies to CDM models, not {}",
                    self.routine, self.model
                ));
            }
            Some(self.wave.unwrap_or_default())
        } else {
            if self.wave.is_some() {
                return fail(format!("wave options given for CDM model {}", self.model));
            }
            None
        };

        if let Some(wave) = &wave {
            match &wave.mass {
                MassMode::Free | MassMode::BestFit => {}
                MassMode::Fixed { m22, m22_2 } => {
                    check_mass("m22", *m22)?;
                    check_mass("m22_2", *m22_2)?;
                }
                MassMode::Scan { masses, held } => {
                    if masses.is_empty() {
                        return fail("scan grid is empty".to_string());
                    }
                    for mass in masses {
                        check_mass("scan mass", *mass)?;
                    }
                    if let Some(held) = held {
                        check_mass("held mass", *held)?;
                    }
                }
            }
            if let Some(xj) = wave.junction {
                if !(xj.is_finite() && xj > 0.0) {
                    return fail(format!("junction must be positive, got {}", xj));
                }
            }
        }

        if let Some(subset) = &self.galaxies {
            if subset.is_empty() {
                return fail("galaxy subset is empty".to_string());
            }
        }

        if !(self.restart.redchi_threshold > 0.0) {
            return fail(format!(
                "restart threshold must be positive, got {}",
                self.restart.redchi_threshold
            ));
        }
        if self.restart.soliton_seeds.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return fail("soliton seeds must be positive".to_string());
        }

        if self.optimizer.max_iterations == 0 {
            return fail("optimizer iteration cap must be at least 1".to_string());
        }

        Ok(FitConfiguration {
            model: self.model,
            routine: self.routine,
            wave,
            galaxies: self.galaxies,
            restart: self.restart,
            optimizer: self.optimizer,
            selection: self.selection,
        })
    }
}

impl TryFrom<FitConfigurationBuilder> for FitConfiguration {
    type Error = HaloFitError;

    fn try_from(builder: FitConfigurationBuilder) -> Result<Self> {
        builder.build()
    }
}

fn check_mass(what: &str, mass: f64) -> Result<()> {
    if mass.is_finite() && mass > 0.0 {
        Ok(())
    } else {
        Err(HaloFitError::ConfigurationError(format!(
            "{} must be positive and finite, got {}",
            what, mass
        )))
    }
}
