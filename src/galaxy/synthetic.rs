//! Synthetic rotation curves drawn from known halos.
//!
//! Used to check parameter recovery and to benchmark the fitter without the
//! SPARC tables.

use crate::error::Result;
use crate::galaxy::observation::{CatalogEntry, GalaxyObservation, MassToLight, RotationCurve};
use crate::halo::{CdmHalo, CdmProfile, HaloModel};
use ndarray::Array1;
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

/// Baryonic content of a synthetic galaxy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baryons {
    /// Peak disk velocity at Υ = 1 [km/s]
    pub disk_peak: f64,
    /// Disk scale length [kpc]
    pub disk_scale: f64,
    /// Peak gas velocity [km/s]
    pub gas_peak: f64,
    /// Peak bulge velocity at Υ = 1 [km/s]; zero for no bulge
    pub bulge_peak: f64,
    pub mass_to_light: MassToLight,
    pub catalog: CatalogEntry,
}

impl Default for Baryons {
    fn default() -> Self {
        Self {
            disk_peak: 60.0,
            disk_scale: 2.0,
            gas_peak: 20.0,
            bulge_peak: 0.0,
            mass_to_light: MassToLight {
                disk: 0.5,
                bulge: 0.7,
            },
            catalog: CatalogEntry {
                luminosity: 10.0,
                gas_mass: 1.0,
                v_flat: 120.0,
                inclination: 60.0,
                quality: 1,
            },
        }
    }
}

/// Exponential-disk-like rotation curve with its peak at about 2.2 scale lengths.
fn disk_curve(radius: &Array1<f64>, peak: f64, scale: f64) -> Array1<f64> {
    let x0: f64 = 2.2;
    let shape = |x: f64| x / (1.0 + x * x / (x0 * x0)).powf(0.75);
    let norm = shape(x0);
    radius.mapv(|r| peak * shape(r / scale) / norm)
}

/// Build a galaxy whose observed velocities are the model curve of `halo`.
///
/// Reported uncertainties are `fraction · V`, floored at 1 km/s. With an
/// `rng` each velocity is perturbed by a Gaussian of that width; without
/// one the curve is exact.
pub fn observe<R: Rng + ?Sized>(
    name: &str,
    radius: Array1<f64>,
    halo: &HaloModel,
    baryons: &Baryons,
    fraction: f64,
    rng: Option<&mut R>,
) -> Result<GalaxyObservation> {
    let v_disk = disk_curve(&radius, baryons.disk_peak, baryons.disk_scale);
    let v_gas = disk_curve(&radius, baryons.gas_peak, 2.0 * baryons.disk_scale);
    let v_bulge = if baryons.bulge_peak > 0.0 {
        disk_curve(&radius, baryons.bulge_peak, 0.2 * baryons.disk_scale)
    } else {
        Array1::zeros(radius.len())
    };
    let template = GalaxyObservation::new(
        name,
        RotationCurve {
            radius: radius.clone(),
            v_obs: Array1::zeros(radius.len()),
            v_err: Array1::ones(radius.len()),
            v_gas: v_gas.clone(),
            v_disk: v_disk.clone(),
            v_bulge: v_bulge.clone(),
        },
        baryons.catalog,
    )?;
    let v_model = template.model_velocity(&halo.velocities(&radius), baryons.mass_to_light);
    let v_err = v_model.mapv(|v| (fraction * v).max(1.0));

    let v_obs = match rng {
        Some(rng) => {
            let mut noisy = v_model.clone();
            for (v, sigma) in noisy.iter_mut().zip(v_err.iter()) {
                // sigma is at least 1, so the distribution is always valid
                if let Ok(normal) = Normal::new(0.0, *sigma) {
                    *v += normal.sample(rng);
                }
            }
            noisy
        }
        None => v_model,
    };

    GalaxyObservation::new(
        name,
        RotationCurve {
            radius,
            v_obs,
            v_err,
            v_gas,
            v_disk,
            v_bulge,
        },
        baryons.catalog,
    )
}

/// Settings for a random synthetic catalog.
#[derive(Debug, Clone)]
pub struct SyntheticCatalog {
    pub galaxies: usize,
    pub samples: usize,
    pub profile: CdmProfile,
    pub noise_fraction: f64,
}

impl Default for SyntheticCatalog {
    fn default() -> Self {
        Self {
            galaxies: 20,
            samples: 25,
            profile: CdmProfile::Nfw,
            noise_fraction: 0.05,
        }
    }
}

impl SyntheticCatalog {
    /// Draw a catalog. Halo parameters are uniform in c200 ∈ [5, 15],
    /// v200 ∈ [60, 200] km/s, with Einasto α = 0.17.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<GalaxyObservation>> {
        let c200 = Uniform::new(5.0, 15.0);
        let v200 = Uniform::new(60.0, 200.0);
        let extent = Uniform::new(8.0, 30.0);

        let mut galaxies = Vec::with_capacity(self.galaxies);
        for i in 0..self.galaxies {
            let halo = HaloModel::Cdm(
                CdmHalo::new(self.profile, c200.sample(rng), v200.sample(rng))
                    .with_alpha(0.17)
                    .with_stellar_mass(5.0),
            );
            let r_max = extent.sample(rng);
            let radius = Array1::linspace(r_max / self.samples as f64, r_max, self.samples);
            let name = format!("SYN{:04}", i);
            galaxies.push(observe(
                &name,
                radius,
                &halo,
                &Baryons::default(),
                self.noise_fraction,
                Some(&mut *rng),
            )?);
        }
        Ok(galaxies)
    }
}
