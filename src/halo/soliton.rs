//! Soliton cores of wave (fuzzy) dark matter.
//!
//! The core radius and density follow from the soliton mass `msol` [M☉] and
//! the particle mass `m22` [1e-22 eV]; the enclosed mass uses a rational fit
//! to the numerical ground state.

use std::f64::consts::PI;

/// A soliton core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Soliton {
    pub m22: f64,
    pub msol: f64,
}

impl Soliton {
    pub fn new(m22: f64, msol: f64) -> Self {
        Self { m22, msol }
    }

    /// Core radius r_c [kpc].
    pub fn core_radius(&self) -> f64 {
        2.28e8 * self.m22.powi(-2) / self.msol
    }

    /// Central density ρ_c [M☉ / kpc³].
    pub fn central_density(&self) -> f64 {
        7.00283e-27 * self.m22.powi(6) * self.msol.powi(4)
    }

    /// x = r / r_c
    pub fn scaled_radius(&self, r: f64) -> f64 {
        r / self.core_radius()
    }

    /// Enclosed mass [M☉] at scaled radius `x`.
    pub fn mass_at(&self, x: f64) -> f64 {
        4.0 * PI * self.central_density() * self.core_radius().powi(3) * soliton_shape(x)
    }

    /// Enclosed mass [M☉] at radius `r` [kpc].
    pub fn enclosed_mass(&self, r: f64) -> f64 {
        self.mass_at(self.scaled_radius(r))
    }
}

/// Dimensionless soliton mass profile.
pub fn soliton_shape(x: f64) -> f64 {
    let x2 = x * x;
    let odd = x
        * (-3.42652e6
            + x2 * (4.37168e6
                + x2 * (56036.0
                    + x2 * (75545.6 + x2 * (4433.16 + x2 * (142.55 + x2 * 1.94581))))));
    let even = 1.13588e7
        + x2 * (7.23555e6
            + x2 * (1.97531e6
                + x2 * (299588.0
                    + x2 * (27262.5 + x2 * (1488.53 + x2 * (45.1522 + x2 * 0.586978))))));
    (odd + even * (0.301662 * x).atan()) / (10.989 + x2).powi(7)
}
