//! Derived parameters.
//!
//! A derived parameter is never varied; its value follows from other
//! parameters of the same table every time the table is updated. Each rule
//! names its inputs, and a table only accepts a derived parameter whose
//! inputs were added before it, so evaluating in insertion order is always
//! well defined.

use crate::halo::relations;
use crate::parameters::names;
use crate::parameters::parameter::ParameterError;
use serde::{Deserialize, Serialize};

/// Rule computing a derived parameter from others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Derivation {
    /// `mstar = Υ L`. With `log_ml` the disk ratio is stored as log10 Υ and
    /// `mstar = 10^MLd L`; otherwise `Υ = MLd` (+ `MLb` with a bulge).
    StellarMass { log_ml: bool, bulge: bool },

    /// `v200 = v200_factor · v200min(mstar)`, the DC14 lower velocity limit.
    V200FromStellarMass,

    /// `log10 v200` from the total baryonic mass `mstar + mgas`.
    V200FromBaryons,

    /// `MLb = ratio · MLd`.
    BulgeFromDisk { ratio: f64 },

    /// Einasto shape parameter that joins a CDM envelope to a soliton core.
    AlphaMatched {
        m22: String,
        msol: String,
        c200: String,
        v200: String,
    },
}

impl Derivation {
    /// Matched alpha for the first soliton component.
    pub fn alpha_matched_primary() -> Self {
        Derivation::AlphaMatched {
            m22: names::M22.to_string(),
            msol: names::MSOL.to_string(),
            c200: names::C200.to_string(),
            v200: names::V200.to_string(),
        }
    }

    /// Matched alpha for the second soliton component.
    pub fn alpha_matched_secondary() -> Self {
        Derivation::AlphaMatched {
            m22: names::M22_2.to_string(),
            msol: names::MSOL_2.to_string(),
            c200: names::C200_2.to_string(),
            v200: names::V200_2.to_string(),
        }
    }

    /// Names of the parameters this rule reads.
    pub fn inputs(&self) -> Vec<&str> {
        match self {
            Derivation::StellarMass { log_ml, bulge } => {
                if *bulge && !*log_ml {
                    vec![names::MLD, names::MLB, names::LUMINOSITY]
                } else {
                    vec![names::MLD, names::LUMINOSITY]
                }
            }
            Derivation::V200FromStellarMass => vec![names::V200_FACTOR, names::MSTAR],
            Derivation::V200FromBaryons => vec![names::V200_FACTOR, names::MSTAR, names::MGAS],
            Derivation::BulgeFromDisk { .. } => vec![names::MLD],
            Derivation::AlphaMatched {
                m22,
                msol,
                c200,
                v200,
            } => vec![m22.as_str(), msol.as_str(), c200.as_str(), v200.as_str()],
        }
    }

    /// Evaluate the rule. `value` looks up the current value of an input.
    pub fn evaluate<F>(&self, name: &str, value: F) -> Result<f64, ParameterError>
    where
        F: Fn(&str) -> Option<f64>,
    {
        let get = |input: &str| {
            value(input).ok_or_else(|| ParameterError::DerivationFailed {
                name: name.to_string(),
                message: format!("input '{}' is not defined", input),
            })
        };

        let result = match self {
            Derivation::StellarMass { log_ml, bulge } => {
                let luminosity = get(names::LUMINOSITY)?;
                let mld = get(names::MLD)?;
                if *log_ml {
                    10f64.powf(mld) * luminosity
                } else if *bulge {
                    (mld + get(names::MLB)?) * luminosity
                } else {
                    mld * luminosity
                }
            }
            Derivation::V200FromStellarMass => {
                get(names::V200_FACTOR)? * relations::v200_min_dc14(get(names::MSTAR)?)
            }
            Derivation::V200FromBaryons => relations::log_v200_from_baryons(
                get(names::MSTAR)?,
                get(names::MGAS)?,
                get(names::V200_FACTOR)?,
            ),
            Derivation::BulgeFromDisk { ratio } => ratio * get(names::MLD)?,
            Derivation::AlphaMatched {
                m22,
                msol,
                c200,
                v200,
            } => relations::alpha_matched(get(m22)?, get(msol)?, get(c200)?, get(v200)?),
        };

        Ok(result)
    }
}
