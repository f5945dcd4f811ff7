//! Scaling relations between halo parameters.
//!
//! Virial mass, the DC14 velocity limits, the matched Einasto shape, and the
//! empirical concentration-mass and stellar-to-halo mass relations used as
//! priors.

use crate::constants::{velocity_to_natural, virial_factor, KM_TO_GEV, MSUN, PLANCK_MASS, S_TO_GEV};
use crate::utils::special::lambert_w0;

/// sqrt(3/(2π ρcrit)) MP³ / 20 / (1e9 M☉): M200 in 1e9 M☉ per (natural) V200³.
fn virial_mass_constant() -> f64 {
    virial_factor() * PLANCK_MASS.powi(3) / 20.0 / (1e9 * MSUN)
}

/// Virial mass M200 [M☉] of a halo with circular velocity `v200` [km/s].
pub fn virial_mass(v200: f64) -> f64 {
    virial_factor() * PLANCK_MASS.powi(3) * velocity_to_natural(v200).powi(3) / 20.0 / MSUN
}

/// Lowest v200 [km/s] allowed for a DC14 halo hosting `mstar` [1e9 M☉].
///
/// Keeps log10(M*/M200) below −1.3, where the DC14 shape is calibrated.
pub fn v200_min_dc14(mstar: f64) -> f64 {
    (10f64.powf(1.3) * mstar / virial_mass_constant()).cbrt() / KM_TO_GEV * S_TO_GEV
}

/// log10 v200 for the DC14 check fits: `v200_factor` times the velocity of a
/// halo five times as massive as the baryons (`mstar + mgas`, 1e9 M☉).
pub fn log_v200_from_baryons(mstar: f64, mgas: f64, v200_factor: f64) -> f64 {
    let v200_min = ((mstar + mgas) / (0.2 * virial_mass_constant())).cbrt();
    (v200_factor * v200_min / KM_TO_GEV * S_TO_GEV).log10()
}

/// Einasto shape parameter for which the envelope density joins a soliton
/// core of mass `msol` [M☉] and particle mass `m22` [1e-22 eV].
///
/// Closed form through the principal branch of Lambert W. NaN when the
/// branch has no real value.
pub fn alpha_matched(m22: f64, msol: f64, c200: f64, v200: f64) -> f64 {
    let v = velocity_to_natural(v200);
    let nfw_norm = -1.0 + 1.0 / (1.0 + c200) + (1.0 + c200).ln();
    let core = m22.powi(6) * msol.powi(4) * nfw_norm;

    let p0 = (1.70907e32 * c200.powi(3) / core).ln();
    let p1 = (c200 / (m22 * m22 * msol * v)).ln();
    let p2 = (1.42593e30 * c200.powi(3) / core).ln();

    let p00 = -5.62816 - 2.0 * p1;
    let p11 = (p00 / (4.7863 + p2)).exp() * p00 / p0;

    -2.0 / p0 - lambert_w0(p11) / (2.81408 + p1)
}

/// log10 c200 from the Dutton & Macciò (2014) concentration-mass relation,
/// for `m200` in M☉.
pub fn dutton_log_concentration(m200: f64) -> f64 {
    0.905 - 0.101 * (0.6777 * m200 / 1e12).log10()
}

/// Scatter of the concentration-mass relation [dex].
pub const CONCENTRATION_SCATTER_DEX: f64 = 0.11;

/// Stellar mass [M☉] of a halo of mass `m200` [M☉] from the
/// stellar-to-halo abundance matching relation of Moster et al.
pub fn abundance_matching_stellar_mass(m200: f64) -> f64 {
    let n = 0.0351;
    let beta = 1.376;
    let gamma = 0.608;
    let m1 = 10f64.powf(11.59);
    let ratio = m200 / m1;
    2.0 * m200 * n / (ratio.powf(-beta) + ratio.powf(gamma))
}

/// Scatter of the abundance matching relation [dex].
pub const ABUNDANCE_SCATTER_DEX: f64 = 0.3;
