//! The least-squares problem of one rotation-curve fit.

use crate::error::Result;
use crate::fit::config::FitConfiguration;
use crate::fit::priors::Prior;
use crate::fit::schema;
use crate::galaxy::GalaxyObservation;
use crate::parameters::Parameters;
use crate::problem::Problem;
use ndarray::{s, Array1};

/// Weighted velocity residuals of a galaxy followed by the prior residuals.
///
/// The optimizer works on the internal (bounds-transformed) values of the
/// varying parameters; [`ExternalView`] exposes the same residuals as a
/// function of the external values for error estimation.
pub struct RotationCurveProblem<'a> {
    galaxy: &'a GalaxyObservation,
    config: &'a FitConfiguration,
    params: Parameters,
    priors: Vec<Prior>,
}

impl<'a> RotationCurveProblem<'a> {
    pub fn new(galaxy: &'a GalaxyObservation, config: &'a FitConfiguration, params: Parameters) -> Self {
        let priors = Prior::for_routine(config.routine(), &params);
        Self {
            galaxy,
            config,
            params,
            priors,
        }
    }

    /// The parameter table the problem starts from.
    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn galaxy(&self) -> &GalaxyObservation {
        self.galaxy
    }

    pub fn data_count(&self) -> usize {
        self.galaxy.len()
    }

    pub fn prior_count(&self) -> usize {
        self.priors.len()
    }

    /// The table with varying parameters set from internal values.
    pub fn parameters_at(&self, internal: &Array1<f64>) -> Result<Parameters> {
        let mut params = self.params.clone();
        params.set_varying_from_internal(internal)?;
        Ok(params)
    }

    /// Model rotation velocity [km/s] at the galaxy's radii.
    pub fn model_velocity(&self, params: &Parameters) -> Result<Array1<f64>> {
        let halo = schema::halo_model(self.config, params)?;
        let ml = schema::mass_to_light(self.config, params)?;
        Ok(self
            .galaxy
            .model_velocity(&halo.velocities(self.galaxy.radius()), ml))
    }

    /// All residuals for a parameter table: data first, priors after.
    pub fn residuals(&self, params: &Parameters) -> Result<Array1<f64>> {
        let v_model = self.model_velocity(params)?;
        let mut residuals = Array1::zeros(self.data_count() + self.prior_count());
        {
            let mut data = residuals.slice_mut(s![..self.data_count()]);
            data.assign(&((self.galaxy.v_obs() - &v_model) / self.galaxy.v_err()));
        }
        for (i, prior) in self.priors.iter().enumerate() {
            residuals[self.data_count() + i] = prior.residual(params)?;
        }
        Ok(residuals)
    }

    /// χ² of the data and the prior penalty.
    pub fn split_cost(&self, residuals: &Array1<f64>) -> (f64, f64) {
        let n = self.data_count();
        let chisqr = residuals.slice(s![..n]).iter().map(|r| r * r).sum();
        let penalty = residuals.slice(s![n..]).iter().map(|r| r * r).sum();
        (chisqr, penalty)
    }

    /// The same residuals as a function of the external values.
    pub fn external(&self) -> ExternalView<'_, 'a> {
        ExternalView { problem: self }
    }
}

impl Problem for RotationCurveProblem<'_> {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        let table = self.parameters_at(params)?;
        self.residuals(&table)
    }

    fn parameter_count(&self) -> usize {
        self.params.varying_count()
    }

    fn residual_count(&self) -> usize {
        self.data_count() + self.prior_count()
    }
}

/// Residuals over the external values of the varying parameters, without a
/// bounds transform.
pub struct ExternalView<'p, 'a> {
    problem: &'p RotationCurveProblem<'a>,
}

impl Problem for ExternalView<'_, '_> {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        let mut table = self.problem.params.clone();
        table.set_varying_values(params)?;
        self.problem.residuals(&table)
    }

    fn parameter_count(&self) -> usize {
        self.problem.parameter_count()
    }

    fn residual_count(&self) -> usize {
        self.problem.residual_count()
    }
}
