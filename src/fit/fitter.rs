//! Per-galaxy fitter.
//!
//! Runs the bounded Levenberg-Marquardt optimizer on a
//! [`RotationCurveProblem`], restarts poor wave-model fits from other
//! soliton masses, and turns the best attempt into a [`FitResult`].

use crate::error::Result;
use crate::fit::config::FitConfiguration;
use crate::fit::problem::RotationCurveProblem;
use crate::fit::result::{FitResult, ParameterKind, ParameterRow};
use crate::fit::schema;
use crate::galaxy::GalaxyObservation;
use crate::halo::CdmProfile;
use crate::lm::{LevenbergMarquardt, LmResult};
use crate::parameters::Parameters;
use crate::uncertainty;
use crate::utils::finite_difference;
use ndarray::Array1;
use tracing::{debug, warn};

/// Goodness of fit of one optimizer run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitStatistics {
    pub chisqr: f64,
    pub penalty: f64,
    pub ndata: usize,
    pub nvarys: usize,
    pub dof: i64,
    pub redchi: f64,
    pub bic: f64,
}

impl FitStatistics {
    /// Statistics for χ² of the data plus a prior penalty.
    ///
    /// The objective χ² + penalty enters the reduced χ² and the BIC;
    /// reduced χ² is NaN when there are no degrees of freedom.
    pub fn new(chisqr: f64, penalty: f64, ndata: usize, nvarys: usize) -> Self {
        let dof = ndata as i64 - nvarys as i64;
        let objective = chisqr + penalty;
        let redchi = if dof > 0 { objective / dof as f64 } else { f64::NAN };
        let bic = objective + nvarys as f64 * (ndata as f64).ln();
        Self {
            chisqr,
            penalty,
            ndata,
            nvarys,
            dof,
            redchi,
            bic,
        }
    }

    /// Statistics of a failed fit: every number NaN.
    pub fn failed(ndata: usize, nvarys: usize) -> Self {
        Self {
            chisqr: f64::NAN,
            penalty: f64::NAN,
            ndata,
            nvarys,
            dof: ndata as i64 - nvarys as i64,
            redchi: f64::NAN,
            bic: f64::NAN,
        }
    }
}

/// One optimizer run from one starting point.
#[derive(Debug, Clone)]
struct Attempt {
    params: Parameters,
    lm: LmResult,
    stats: FitStatistics,
}

/// Fits halo models to single galaxies.
#[derive(Debug, Clone)]
pub struct GalaxyFitter<'c> {
    config: &'c FitConfiguration,
    optimizer: LevenbergMarquardt,
}

impl<'c> GalaxyFitter<'c> {
    pub fn new(config: &'c FitConfiguration) -> Self {
        Self {
            config,
            optimizer: LevenbergMarquardt::with_config(config.optimizer().clone()),
        }
    }

    pub fn config(&self) -> &FitConfiguration {
        self.config
    }

    /// Whether poor fits of this configuration are restarted.
    pub fn restarts_enabled(&self) -> bool {
        self.config.restart().enabled
            && self
                .config
                .wave()
                .map_or(false, |w| w.cdm_halo != CdmProfile::Einasto)
    }

    /// Fit the configured model to `galaxy`.
    ///
    /// Non-convergence is reported in the result (`success = false`, NaN
    /// statistics), not as an error.
    ///
    /// # Errors
    ///
    /// Errors from building the parameter table (an unresolved particle
    /// mass) or from evaluating the model.
    pub fn fit(&self, galaxy: &GalaxyObservation) -> Result<FitResult> {
        let params = schema::build_parameters(self.config, galaxy)?;
        let problem = RotationCurveProblem::new(galaxy, self.config, params);

        let mut best = self.attempt(&problem, problem.parameters().clone())?;
        let mut restarts = 0;

        if self.restarts_enabled() && !self.config.restart().accepts(best.stats.redchi) {
            for seed in &self.config.restart().soliton_seeds {
                let mut start = problem.parameters().clone();
                for name in schema::soliton_masses(self.config.model()) {
                    if let Some(param) = start.get_mut(name) {
                        param.set_value_clamped(*seed);
                    }
                }
                start.update_derived()?;

                let attempt = self.attempt(&problem, start)?;
                restarts += 1;
                debug!(
                    galaxy = %galaxy.name(),
                    seed = *seed,
                    redchi = attempt.stats.redchi,
                    "restarted fit"
                );

                if self.config.restart().accepts(attempt.stats.redchi) {
                    best = attempt;
                    break;
                }
                if is_better(&attempt.stats, &best.stats) {
                    best = attempt;
                }
            }
        }

        self.finish(&problem, best, restarts)
    }

    fn attempt(&self, problem: &RotationCurveProblem<'_>, start: Parameters) -> Result<Attempt> {
        let x0 = start.to_internal()?;
        let lm = self.optimizer.minimize(problem, x0)?;
        let params = problem.parameters_at(&lm.params)?;

        let ndata = problem.data_count();
        let nvarys = params.varying_count();
        let stats = if lm.success {
            let (chisqr, penalty) = problem.split_cost(&lm.residuals);
            FitStatistics::new(chisqr, penalty, ndata, nvarys)
        } else {
            FitStatistics::failed(ndata, nvarys)
        };

        Ok(Attempt { params, lm, stats })
    }

    fn finish(
        &self,
        problem: &RotationCurveProblem<'_>,
        attempt: Attempt,
        restarts: usize,
    ) -> Result<FitResult> {
        let Attempt { params, lm, stats } = attempt;
        let galaxy = problem.galaxy();

        let errors = if lm.success && stats.dof > 0 {
            let values = params.varying_values();
            finite_difference::jacobian_central(&problem.external(), &values, None)
                .and_then(|jacobian| uncertainty::uncertainty_analysis(&jacobian, &params, stats.redchi))
                .map_err(|err| {
                    debug!(galaxy = %galaxy.name(), error = %err, "no parameter errors");
                })
                .ok()
        } else {
            None
        };

        let rows = params
            .iter()
            .map(|p| {
                let kind = if p.is_derived() {
                    ParameterKind::Derived
                } else if p.vary() {
                    ParameterKind::Free
                } else {
                    ParameterKind::Fixed
                };
                let stderr = match kind {
                    ParameterKind::Fixed => 0.0,
                    _ => uncertainty::sanitize_stderr(
                        p.value(),
                        errors
                            .as_ref()
                            .and_then(|e| e.standard_errors.get(p.name()).copied()),
                    ),
                };
                ParameterRow {
                    name: p.name().to_string(),
                    value: p.value(),
                    stderr,
                    kind,
                }
            })
            .collect();

        let halo = schema::halo_model(self.config, &params)?;

        if lm.success {
            debug!(
                galaxy = %galaxy.name(),
                model = %self.config.model(),
                chisqr = stats.chisqr,
                redchi = stats.redchi,
                nfev = lm.func_evals,
                "fit complete"
            );
        } else {
            warn!(
                galaxy = %galaxy.name(),
                model = %self.config.model(),
                status = %lm.message,
                "fit did not converge"
            );
        }

        Ok(FitResult {
            galaxy: galaxy.name().to_string(),
            model: self.config.model(),
            parameters: rows,
            chisqr: stats.chisqr,
            penalty: stats.penalty,
            ndata: stats.ndata,
            nvarys: stats.nvarys,
            dof: stats.dof,
            redchi: stats.redchi,
            bic: stats.bic,
            success: lm.success,
            message: lm.message,
            nfev: lm.func_evals,
            restarts,
            virial_mass: halo.virial_mass(),
            halo_mass: halo.halo_mass(),
            has_bulge: galaxy.has_bulge(),
        })
    }
}

/// Lower reduced χ² wins; NaN never does.
fn is_better(candidate: &FitStatistics, current: &FitStatistics) -> bool {
    !candidate.redchi.is_nan() && (current.redchi.is_nan() || candidate.redchi < current.redchi)
}

/// Fit one galaxy with one configuration.
pub fn fit_galaxy(galaxy: &GalaxyObservation, config: &FitConfiguration) -> Result<FitResult> {
    GalaxyFitter::new(config).fit(galaxy)
}

/// Parameter table of a fitted result.
fn fitted_parameters(
    galaxy: &GalaxyObservation,
    config: &FitConfiguration,
    result: &FitResult,
) -> Result<Parameters> {
    let mut params = schema::build_parameters(config, galaxy)?;
    let values: Array1<f64> = params
        .varying_names()
        .iter()
        .map(|name| result.value(name))
        .collect();
    params.set_varying_values(&values)?;
    Ok(params)
}

/// Total model rotation velocity [km/s] of a fitted result at the
/// galaxy's radii.
pub fn predict(galaxy: &GalaxyObservation, config: &FitConfiguration, result: &FitResult) -> Result<Array1<f64>> {
    let params = fitted_parameters(galaxy, config, result)?;
    RotationCurveProblem::new(galaxy, config, params.clone()).model_velocity(&params)
}

/// Halo circular velocity [km/s] of a fitted result at arbitrary radii [kpc].
pub fn predict_halo(
    galaxy: &GalaxyObservation,
    config: &FitConfiguration,
    result: &FitResult,
    radius: &Array1<f64>,
) -> Result<Array1<f64>> {
    let params = fitted_parameters(galaxy, config, result)?;
    Ok(schema::halo_model(config, &params)?.velocities(radius))
}
