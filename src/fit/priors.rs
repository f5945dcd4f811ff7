//! Prior penalties, appended to the data residuals.
//!
//! A prior contributes one residual r; its share of the objective is r².
//! Uniform priors contribute nothing.

use crate::error::Result;
use crate::fit::config::FitRoutine;
use crate::halo::relations;
use crate::parameters::{names, Parameters};

/// An informative prior on the parameters of the first halo component.
#[derive(Debug, Clone, PartialEq)]
pub enum Prior {
    /// log10 c200 around the concentration-mass relation at M200(v200).
    Concentration,
    /// log10 of the fitted stellar mass around the abundance-matching mass
    /// of a halo of M200(v200).
    AbundanceMatching,
    /// log10 of a parameter around log10 `center`.
    LogNormal {
        parameter: &'static str,
        center: f64,
        sigma_dex: f64,
    },
    /// A parameter around `mean`.
    Gaussian {
        parameter: &'static str,
        mean: f64,
        sigma: f64,
    },
}

impl Prior {
    /// Priors of a routine for a parameter table.
    pub fn for_routine(routine: FitRoutine, params: &Parameters) -> Vec<Prior> {
        match routine {
            FitRoutine::C200Priors => vec![Prior::Concentration],
            FitRoutine::V200Priors => vec![Prior::AbundanceMatching],
            FitRoutine::MldPriors => vec![Prior::LogNormal {
                parameter: names::MLD,
                center: 0.5,
                sigma_dex: 0.1,
            }],
            FitRoutine::MlbPriors if params.contains(names::MLB) => vec![Prior::LogNormal {
                parameter: names::MLB,
                center: 0.7,
                sigma_dex: 0.1,
            }],
            FitRoutine::EinastoCheck => vec![Prior::Gaussian {
                parameter: names::MLD,
                mean: 0.5,
                sigma: 0.125,
            }],
            _ => Vec::new(),
        }
    }

    /// Residual at the current parameter values. Non-positive inputs to a
    /// logarithm give a non-finite residual.
    pub fn residual(&self, params: &Parameters) -> Result<f64> {
        let r = match self {
            Prior::Concentration => {
                let m200 = relations::virial_mass(params.value(names::V200)?);
                (params.value(names::C200)?.log10() - relations::dutton_log_concentration(m200))
                    / relations::CONCENTRATION_SCATTER_DEX
            }
            Prior::AbundanceMatching => {
                let m200 = relations::virial_mass(params.value(names::V200)?);
                let mstar = params.value(names::MSTAR)? * 1e9;
                (mstar.log10() - relations::abundance_matching_stellar_mass(m200).log10())
                    / relations::ABUNDANCE_SCATTER_DEX
            }
            Prior::LogNormal {
                parameter,
                center,
                sigma_dex,
            } => (params.value(parameter)?.log10() - center.log10()) / sigma_dex,
            Prior::Gaussian {
                parameter,
                mean,
                sigma,
            } => (params.value(parameter)? - mean) / sigma,
        };
        Ok(r)
    }
}
