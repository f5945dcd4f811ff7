//! Cold dark matter halo profiles.
//!
//! Every profile is parameterised by its concentration `c200` and circular
//! velocity `v200` [km/s] at r200. Einasto adds a shape parameter `alpha`,
//! DC14 reads the stellar mass of the host to set its inner slope.

use crate::constants::{
    velocity_to_natural, virial_factor, KPC_TO_GEV, MSUN, OVERDENSITY, PLANCK_MASS, RHO_CRIT,
};
use crate::halo::relations;
use crate::utils::special::simpson;
use serde::{Deserialize, Serialize};
use statrs::function::gamma::{checked_gamma_lr, ln_gamma};
use std::f64::consts::PI;
use std::fmt;

/// CDM density profile family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CdmProfile {
    Burkert,
    Dc14,
    Einasto,
    Nfw,
}

impl CdmProfile {
    pub fn name(&self) -> &'static str {
        match self {
            CdmProfile::Burkert => "Burkert",
            CdmProfile::Dc14 => "DC14",
            CdmProfile::Einasto => "Einasto",
            CdmProfile::Nfw => "NFW",
        }
    }
}

impl fmt::Display for CdmProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A CDM halo with physical (not log10) parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CdmHalo {
    pub profile: CdmProfile,
    pub c200: f64,
    pub v200: f64,
    /// Einasto shape; unused by the other profiles.
    pub alpha: f64,
    /// Stellar mass of the host [1e9 M☉]; read by DC14 only.
    pub mstar: f64,
}

impl CdmHalo {
    pub fn new(profile: CdmProfile, c200: f64, v200: f64) -> Self {
        Self {
            profile,
            c200,
            v200,
            alpha: f64::NAN,
            mstar: f64::NAN,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_stellar_mass(mut self, mstar: f64) -> Self {
        self.mstar = mstar;
        self
    }

    /// Virial mass M200 [M☉].
    pub fn virial_mass(&self) -> f64 {
        relations::virial_mass(self.v200)
    }

    /// X = log10(M* / M200), the DC14 stellar-to-halo mass ratio.
    pub fn stellar_fraction(&self) -> f64 {
        (self.mstar / (self.virial_mass() / 1e9)).log10()
    }

    /// DC14 (α, β, γ) double power-law exponents for this halo.
    pub fn dc14_exponents(&self) -> (f64, f64, f64) {
        dc14_exponents(self.stellar_fraction())
    }

    /// Concentration of the scale radius. For DC14 this is the NFW-equivalent
    /// c200 corrected by the stellar fraction.
    pub fn concentration(&self) -> f64 {
        match self.profile {
            CdmProfile::Dc14 => {
                let x = self.stellar_fraction();
                self.c200 * (1.0 + 0.00003 * (3.4 * (x + 4.5)).exp())
            }
            _ => self.c200,
        }
    }

    /// Scale radius r_s = r200 / c [kpc].
    pub fn scale_radius(&self) -> f64 {
        PLANCK_MASS * virial_factor() * velocity_to_natural(self.v200)
            / (20.0 * self.concentration())
            / KPC_TO_GEV
    }

    /// Characteristic density ρ_s [M☉ / kpc³].
    pub fn central_density(&self) -> f64 {
        let c = self.concentration();
        OVERDENSITY * c.powi(3) * RHO_CRIT / (3.0 * ((1.0 + c).ln() - c / (1.0 + c))) / MSUN
            * KPC_TO_GEV.powi(3)
    }

    /// Enclosed mass M(<r) [M☉] at radius `r` [kpc].
    pub fn enclosed_mass(&self, r: f64) -> f64 {
        let rs = self.scale_radius();
        let norm = 4.0 * PI * self.central_density() * rs.powi(3);
        let x = r / rs;
        let shape = match self.profile {
            CdmProfile::Burkert => {
                0.25 * (-2.0 * x.atan() + ((1.0 + x).powi(2) * (1.0 + x * x)).ln())
            }
            CdmProfile::Nfw => (1.0 + x).ln() - x / (1.0 + x),
            CdmProfile::Einasto => einasto_shape(x, self.alpha),
            CdmProfile::Dc14 => {
                let (a, b, g) = self.dc14_exponents();
                dc14_shape(x, a, b, g)
            }
        };
        norm * shape
    }
}

/// DC14 exponents from the stellar-to-halo mass ratio X (Di Cintio et al. 2014).
pub fn dc14_exponents(x: f64) -> (f64, f64, f64) {
    let ea = 10f64.powf(x + 2.33);
    let eg = 10f64.powf(x + 2.56);
    let a = 2.94 - (ea.powf(-1.08) + ea.powf(2.99)).log10();
    let b = 4.23 + 1.34 * x + 0.26 * x * x;
    let g = -0.06 - (eg.powf(-0.68) + eg).log10();
    (a, b, g)
}

/// ∫₀ˣ s^(2−γ) (1 + s^α)^(−(β−γ)/α) ds, the dimensionless DC14 mass.
///
/// Simpson quadrature in ln s above x·1e-6; the innermost part is taken
/// analytically, where the integrand is a pure power law. NaN for γ ≥ 3.
pub fn dc14_shape(x: f64, a: f64, b: f64, g: f64) -> f64 {
    if x.is_nan() || !(a.is_finite() && b.is_finite() && g.is_finite()) || g >= 3.0 {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 0.0;
    }
    let inner = x * 1e-6;
    let tail = inner.powf(3.0 - g) / (3.0 - g);
    let outer_slope = (b - g) / a;
    let integrand = |u: f64| {
        let s = u.exp();
        s.powf(3.0 - g) * (1.0 + s.powf(a)).powf(-outer_slope)
    };
    tail + simpson(integrand, inner.ln(), x.ln(), 512)
}

/// Dimensionless Einasto mass
/// (1/α) e^(2/α) (2/α)^(−3/α) Γ(3/α) P(3/α, (2/α) x^α).
///
/// Evaluated in log space; NaN for α ≤ 0.
pub fn einasto_shape(x: f64, alpha: f64) -> f64 {
    if !(alpha > 0.0) || x.is_nan() {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 0.0;
    }
    let s = 3.0 / alpha;
    let t = 2.0 / alpha * x.powf(alpha);
    let p = match checked_gamma_lr(s, t) {
        Ok(p) if p > 0.0 => p,
        Ok(_) => return 0.0,
        Err(_) => return f64::NAN,
    };
    let ln_prefactor = -alpha.ln() + 2.0 / alpha - s * (2.0 / alpha).ln() + ln_gamma(s);
    (ln_prefactor + p.ln()).exp()
}
