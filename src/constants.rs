//! Physical constants and unit conversions.
//!
//! Masses, lengths and velocities inside the halo formulas are converted to
//! natural units (GeV) and back.

/// km → GeV⁻¹
pub const KM_TO_GEV: f64 = 5.076142131979695e18;

/// s → GeV⁻¹
pub const S_TO_GEV: f64 = 1.5197568389057748e24;

/// kpc → GeV⁻¹
pub const KPC_TO_GEV: f64 = 1.5663334542856025e35;

/// Solar mass in GeV.
pub const MSUN: f64 = 1.115747188908623e57;

/// Planck mass in GeV.
pub const PLANCK_MASS: f64 = 1.22e19;

/// Critical density of the universe in GeV⁴.
pub const RHO_CRIT: f64 = 4.3052429461571337e-47;

/// Overdensity defining the virial radius r200.
pub const OVERDENSITY: f64 = 200.0;

/// Dimensionless velocity v200 [km/s] in natural units.
pub fn velocity_to_natural(v200: f64) -> f64 {
    v200 * KM_TO_GEV / S_TO_GEV
}

/// sqrt(3 / (2π ρcrit)), the factor shared by the virial mass and radius.
pub fn virial_factor() -> f64 {
    (3.0 / (2.0 * std::f64::consts::PI * RHO_CRIT)).sqrt()
}
