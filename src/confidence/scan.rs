//! Outer omega scan producing the maximum-likelihood point estimate.
//!
//! Purpose
//! -------
//! The simplex only searches (free rate, npop) at a fixed omega, so the
//! point estimate comes from scanning omega itself: refine the seed at its
//! own omega, then walk a log-spaced omega grid outward in both directions,
//! one independent simplex search per grid point, and keep the best
//! attained likelihood.
//!
//! Key behaviors
//! -------------
//! - Grid trials run concurrently on the bounded worker pool; the per-omega
//!   searches are independent of each other.
//! - An optional likelihood floor enables early stopping: once a direction
//!   crosses below the floor, its remaining trials are cancelled.
//! - An oracle failure mid-scan aborts the scan but never discards results
//!   already produced: the best-so-far survives, with the abort recorded on
//!   the outcome.

use crate::confidence::errors::{CiError, CiResult};
use crate::confidence::{log_spaced, parallel_walk, GridOptions};
use crate::optimization::simplex::{optimize, FixedParameter};
use crate::params::ParameterSet;
use crate::simulation::oracle::LikelihoodOracle;

use std::cmp::Ordering;

/// Result of an omega scan: the best parameter set found, and whether the
/// scan was cut short by an oracle failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    /// Highest-likelihood parameter set over all completed trials.
    pub best: ParameterSet,
    /// The failure that aborted the scan, when one occurred after at least
    /// one trial had completed.
    pub aborted: Option<CiError>,
}

/// The outer parameter scan over omega.
pub struct OmegaScan<'a, O: LikelihoodOracle> {
    oracle: &'a O,
    nu: u32,
    floor: Option<f64>,
    opts: GridOptions,
}

impl<'a, O: LikelihoodOracle> OmegaScan<'a, O> {
    pub fn new(oracle: &'a O, nu: u32, opts: GridOptions) -> Self {
        Self { oracle, nu, floor: None, opts }
    }

    /// Enable early stopping: trials past the first grid point whose
    /// attained likelihood falls below `floor` are cancelled.
    ///
    /// # Errors
    /// [`CiError::InvalidThreshold`] for a non-finite or non-positive
    /// floor.
    pub fn with_floor(mut self, floor: f64) -> CiResult<Self> {
        if !floor.is_finite() || floor <= 0.0 {
            return Err(CiError::InvalidThreshold {
                value: floor,
                reason: "Threshold must be finite and positive.",
            });
        }
        self.floor = Some(floor);
        Ok(self)
    }

    /// Scan omega around `seed` and return the best refined parameters.
    ///
    /// # Errors
    /// - [`CiError::InvalidRange`] if the seed omega lies outside the grid
    ///   range.
    /// - [`CiError::Optimization`] if the very first refinement fails; a
    ///   failure after that aborts the scan with the best-so-far kept on
    ///   the outcome.
    pub fn run(&self, seed: &ParameterSet) -> CiResult<ScanOutcome> {
        let center = seed.omega();
        let (low, high) = self.opts.range;
        if !(low..=high).contains(&center) {
            return Err(CiError::InvalidRange {
                low,
                high,
                reason: "The seed omega must lie within the scan range.",
            });
        }
        let axis = FixedParameter::Omega(center);
        let refined = optimize(self.oracle, axis, seed, self.nu, &self.opts.simplex)?;
        let mut best = refined.params;
        // Without a floor no trial can cross it, so nothing is cancelled.
        let threshold = self.floor.unwrap_or(f64::NEG_INFINITY);

        for limit in [low, high] {
            let trials = log_spaced(center, limit, self.opts.increments);
            let results = parallel_walk(
                self.oracle,
                axis,
                seed,
                self.nu,
                threshold,
                &trials,
                self.opts.workers,
                &self.opts.simplex,
            )?;
            for slot in results {
                match slot {
                    None => break,
                    Some(Err(err)) => {
                        return Ok(ScanOutcome { best, aborted: Some(err.into()) });
                    }
                    Some(Ok(outcome)) => {
                        if outcome.params.cmp_likelihood(&best) == Ordering::Greater {
                            best = outcome.params;
                        }
                    }
                }
            }
        }
        Ok(ScanOutcome { best, aborted: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::simplex::SimplexOptions;
    use crate::simulation::errors::{SimResult, SimulationError};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The scan locating the likelihood peak along omega.
    // - Early stopping under a floor leaving the peak intact.
    // - Abort-with-best-so-far on oracle failure.
    // -------------------------------------------------------------------------

    /// Likelihood peaking at omega = 2, indifferent to the free parameters.
    struct OmegaPeak;

    impl LikelihoodOracle for OmegaPeak {
        fn evaluate(&self, params: &ParameterSet) -> SimResult<Option<ParameterSet>> {
            let off = params.omega().ln() - 2f64.ln();
            Ok(Some(params.with_likelihood((-off * off).exp())))
        }
    }

    fn grid() -> GridOptions {
        GridOptions::new((0.01, 100.0), 20, 2, SimplexOptions::default()).unwrap()
    }

    #[test]
    fn scan_finds_the_omega_peak() {
        let oracle = OmegaPeak;
        let seed = ParameterSet::new(0.5, 1.0, 4, 0.0);
        let outcome = OmegaScan::new(&oracle, 30, grid()).run(&seed).unwrap();
        assert!(outcome.aborted.is_none());
        assert!(
            outcome.best.omega() > 1.4 && outcome.best.omega() < 2.8,
            "peak missed: {}",
            outcome.best
        );
        assert!(outcome.best.likelihood() > 0.95);
    }

    #[test]
    fn floor_stops_the_walk_without_losing_the_peak() {
        let oracle = OmegaPeak;
        let seed = ParameterSet::new(2.0, 1.0, 4, 0.0);
        let outcome = OmegaScan::new(&oracle, 30, grid())
            .with_floor(0.5)
            .unwrap()
            .run(&seed)
            .unwrap();
        assert!(outcome.aborted.is_none());
        assert!(outcome.best.likelihood() > 0.95);
        assert!((outcome.best.omega() - 2.0).abs() < 0.5);
    }

    /// Fails for omega beyond 10, fine below.
    struct PartialOutage;

    impl LikelihoodOracle for PartialOutage {
        fn evaluate(&self, params: &ParameterSet) -> SimResult<Option<ParameterSet>> {
            if params.omega() > 10.0 {
                return Err(SimulationError::MissingReply);
            }
            Ok(Some(params.with_likelihood(0.4)))
        }
    }

    #[test]
    fn oracle_failure_keeps_the_best_so_far() {
        let oracle = PartialOutage;
        let seed = ParameterSet::new(0.5, 1.0, 4, 0.0);
        let outcome = OmegaScan::new(&oracle, 30, grid()).run(&seed).unwrap();
        assert!(outcome.aborted.is_some());
        assert_eq!(outcome.best.likelihood(), 0.4);
    }

    #[test]
    fn seed_outside_the_range_is_rejected() {
        let oracle = OmegaPeak;
        let seed = ParameterSet::new(500.0, 1.0, 4, 0.0);
        assert!(matches!(
            OmegaScan::new(&oracle, 30, grid()).run(&seed),
            Err(CiError::InvalidRange { .. })
        ));
    }
}
