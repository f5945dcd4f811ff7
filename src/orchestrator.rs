//! Batch fitting over a galaxy sample.
//!
//! Galaxies are selected (subset and sample cuts), fitted independently,
//! and merged into an ordered [`ResultTable`]. With the `parallel` feature
//! the fits run on the rayon pool; the merge is by galaxy name, so the
//! table does not depend on scheduling.

use crate::error::{HaloFitError, Result};
use crate::fit::{FitConfiguration, FitResult, GalaxyFitter, ResultTable, ScanTable};
use crate::galaxy::{CutReason, GalaxyObservation};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Outcome of one batch: the table plus what was left out and why.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub table: ResultTable,
    /// Galaxies whose fit returned an error
    pub failures: BTreeMap<String, HaloFitError>,
    /// Galaxies removed by the sample cuts
    pub cut: BTreeMap<String, CutReason>,
    /// Galaxies skipped because the stop flag was raised
    pub skipped: Vec<String>,
}

impl BatchOutcome {
    pub fn stopped(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// A batch failure at one scan point.
#[derive(Debug)]
pub struct ScanFailure {
    pub m22: f64,
    pub galaxy: String,
    pub error: HaloFitError,
}

/// Outcome of a particle-mass scan.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub table: ScanTable,
    pub failures: Vec<ScanFailure>,
    pub cut: BTreeMap<String, CutReason>,
}

/// Runs one configuration over many galaxies.
#[derive(Debug, Clone)]
pub struct BatchFitter<'c> {
    config: &'c FitConfiguration,
    best_fit_masses: BTreeMap<String, f64>,
    stop: Option<Arc<AtomicBool>>,
    parallel: bool,
}

impl<'c> BatchFitter<'c> {
    pub fn new(config: &'c FitConfiguration) -> Self {
        Self {
            config,
            best_fit_masses: BTreeMap::new(),
            stop: None,
            parallel: cfg!(feature = "parallel"),
        }
    }

    /// Per-galaxy particle masses for a best-fit configuration.
    pub fn with_best_fit_masses(mut self, masses: BTreeMap<String, f64>) -> Self {
        self.best_fit_masses = masses;
        self
    }

    /// A flag checked before each galaxy; once set, remaining galaxies are
    /// skipped.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Fit galaxies one after the other even when built with `parallel`.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Fit every selected galaxy.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` for a scan configuration (use
    /// [`BatchFitter::run_scan`]). Per-galaxy errors never abort the batch;
    /// they are collected in [`BatchOutcome::failures`].
    pub fn run<'g, I>(&self, galaxies: I) -> Result<BatchOutcome>
    where
        I: IntoIterator<Item = &'g GalaxyObservation>,
    {
        if self.config.scan_masses().is_some() {
            return Err(HaloFitError::ConfigurationError(
                "scan configurations run with run_scan".to_string(),
            ));
        }
        let (selected, cut) = self.select(galaxies);
        let mut outcome = self.run_selected(self.config, &selected);
        outcome.cut = cut;
        Ok(outcome)
    }

    /// One batch per scan mass, collected into a [`ScanTable`].
    ///
    /// # Errors
    ///
    /// `ConfigurationError` when the configuration is not a scan.
    pub fn run_scan<'g, I>(&self, galaxies: I) -> Result<ScanOutcome>
    where
        I: IntoIterator<Item = &'g GalaxyObservation>,
    {
        let masses = self.config.scan_masses().ok_or_else(|| {
            HaloFitError::ConfigurationError("configuration has no scan grid".to_string())
        })?;
        let (selected, cut) = self.select(galaxies);

        let mut scan = ScanOutcome {
            cut,
            ..Default::default()
        };
        for &m22 in masses {
            let point = self.config.at_mass(m22)?;
            let outcome = self.run_selected(&point, &selected);
            scan.failures.extend(outcome.failures.into_iter().map(|(galaxy, error)| ScanFailure {
                m22,
                galaxy,
                error,
            }));
            scan.table.insert(m22, outcome.table);
            if !outcome.skipped.is_empty() {
                break;
            }
        }
        Ok(scan)
    }

    /// Subset, de-duplication and sample cuts, in input order.
    fn select<'g, I>(&self, galaxies: I) -> (Vec<&'g GalaxyObservation>, BTreeMap<String, CutReason>)
    where
        I: IntoIterator<Item = &'g GalaxyObservation>,
    {
        let wave = self.config.model().is_wave();
        let mut seen = std::collections::BTreeSet::new();
        let mut selected = Vec::new();
        let mut cut = BTreeMap::new();

        for galaxy in galaxies {
            if !self.config.includes(galaxy.name()) || !seen.insert(galaxy.name().to_string()) {
                continue;
            }
            match self.config.selection().check(galaxy, wave) {
                Some(reason) => {
                    debug!(galaxy = %galaxy.name(), reason = %reason, "galaxy cut");
                    cut.insert(galaxy.name().to_string(), reason);
                }
                None => selected.push(galaxy),
            }
        }
        (selected, cut)
    }

    fn stop_requested(&self) -> bool {
        self.stop.as_ref().map_or(false, |s| s.load(Ordering::SeqCst))
    }

    fn fit_one(&self, config: &FitConfiguration, galaxy: &GalaxyObservation) -> Option<Result<FitResult>> {
        if self.stop_requested() {
            return None;
        }
        let result = if config.is_best_fit() {
            match self.best_fit_masses.get(galaxy.name()) {
                Some(&m22) => config
                    .at_mass(m22)
                    .and_then(|resolved| GalaxyFitter::new(&resolved).fit(galaxy)),
                None => Err(HaloFitError::data(galaxy.name(), "no best-fit particle mass supplied")),
            }
        } else {
            GalaxyFitter::new(config).fit(galaxy)
        };
        Some(result)
    }

    fn fit_all(
        &self,
        config: &FitConfiguration,
        galaxies: &[&GalaxyObservation],
    ) -> Vec<(String, Option<Result<FitResult>>)> {
        let task = |galaxy: &&GalaxyObservation| (galaxy.name().to_string(), self.fit_one(config, galaxy));

        #[cfg(feature = "parallel")]
        {
            if self.parallel {
                return galaxies.par_iter().map(task).collect();
            }
        }
        galaxies.iter().map(task).collect()
    }

    fn run_selected(&self, config: &FitConfiguration, galaxies: &[&GalaxyObservation]) -> BatchOutcome {
        info!(
            model = %config.model(),
            routine = %config.routine(),
            galaxies = galaxies.len(),
            "batch started"
        );

        let mut outcome = BatchOutcome::default();
        for (name, result) in self.fit_all(config, galaxies) {
            match result {
                Some(Ok(fit)) => {
                    outcome.table.insert(fit);
                }
                Some(Err(error)) => {
                    warn!(galaxy = %name, error = %error, "galaxy failed");
                    outcome.failures.insert(name, error);
                }
                None => outcome.skipped.push(name),
            }
        }
        outcome.skipped.sort();

        info!(
            model = %config.model(),
            fitted = outcome.table.len(),
            unconverged = outcome.table.failed_count(),
            failures = outcome.failures.len(),
            skipped = outcome.skipped.len(),
            "batch finished"
        );
        outcome
    }
}

/// Fit a configuration over galaxies with default batch settings.
pub fn fit_batch<'g, I>(config: &FitConfiguration, galaxies: I) -> Result<BatchOutcome>
where
    I: IntoIterator<Item = &'g GalaxyObservation>,
{
    BatchFitter::new(config).run(galaxies)
}
