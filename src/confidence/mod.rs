//! Profile-likelihood confidence intervals.
//!
//! Purpose
//! -------
//! Bracket the point estimate: fix one rate (omega, or later sigma), walk it
//! outward over a log-spaced grid while re-optimizing the remaining free
//! parameters at every trial value, and report the last trial whose best
//! attainable likelihood still clears a caller-supplied threshold. Lower and
//! upper searches are independent; a search that exhausts its range reports
//! an open bound rather than a numeric failure.
//!
//! Key behaviors
//! -------------
//! - Every grid trial is one full simplex optimization against the
//!   stochastic oracle; trials are independent and evaluated concurrently
//!   on a worker pool bounded by the configured worker count.
//! - Cancellation: once any worker observes a crossing at grid index `i`,
//!   workers holding indices beyond `i` skip their evaluation. Results
//!   already produced are never discarded.
//! - [`likelihood_floor`] turns a confidence level into an absolute
//!   likelihood threshold through the chi-squared quantile of the
//!   likelihood-ratio statistic with one degree of freedom.
//!
//! Invariants & assumptions
//! ------------------------
//! - The point estimate's fixed-axis value must lie inside the configured
//!   search range.
//! - The likelihood surface is noisy; the crossing test uses each trial's
//!   attained (best-effort) likelihood as reported, converged or not.
//! - An oracle transport failure aborts the enclosing search; bounds
//!   produced before the failure survive with the caller.

pub mod errors;
pub mod scan;

pub use errors::{CiError, CiResult};
pub use scan::{OmegaScan, ScanOutcome};

use crate::optimization::errors::OptResult;
use crate::optimization::simplex::{optimize, FixedParameter, SimplexOptions, SimplexOutcome};
use crate::params::ParameterSet;
use crate::simulation::oracle::LikelihoodOracle;

use rayon::prelude::*;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Configuration shared by the grid-driven searches (confidence intervals
/// and the outer omega scan).
#[derive(Debug, Clone, PartialEq)]
pub struct GridOptions {
    /// Admissible range of the walked parameter.
    pub range: (f64, f64),
    /// Grid points per walk direction.
    pub increments: usize,
    /// Worker pool size for concurrent trials.
    pub workers: usize,
    /// Per-trial simplex configuration.
    pub simplex: SimplexOptions,
}

impl GridOptions {
    /// Construct validated grid options.
    ///
    /// # Errors
    /// - [`CiError::InvalidRange`] unless `0 < low < high` and both are
    ///   finite.
    /// - [`CiError::InvalidIncrements`] for a zero increment count.
    /// - [`CiError::InvalidWorkers`] for a zero worker count.
    pub fn new(
        range: (f64, f64),
        increments: usize,
        workers: usize,
        simplex: SimplexOptions,
    ) -> CiResult<Self> {
        let (low, high) = range;
        if !low.is_finite() || !high.is_finite() || low <= 0.0 || high <= low {
            return Err(CiError::InvalidRange {
                low,
                high,
                reason: "Bounds must be finite, positive and ordered.",
            });
        }
        if increments == 0 {
            return Err(CiError::InvalidIncrements {
                increments,
                reason: "At least one increment is required.",
            });
        }
        if workers == 0 {
            return Err(CiError::InvalidWorkers {
                workers,
                reason: "At least one worker is required.",
            });
        }
        Ok(Self { range, increments, workers, simplex })
    }
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            range: (1e-6, 100.0),
            increments: 20,
            workers: 4,
            simplex: SimplexOptions::default(),
        }
    }
}

/// One side of a confidence interval.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// The threshold was crossed inside the range; `value` is the last
    /// in-bounds trial and `likelihood` what the profile attained there.
    Closed { value: f64, likelihood: f64 },
    /// The walk exhausted its range without crossing the threshold.
    Open { limit: f64 },
}

impl Bound {
    /// The bound's numeric value, if the search closed it.
    pub fn value(&self) -> Option<f64> {
        match self {
            Bound::Closed { value, .. } => Some(*value),
            Bound::Open { .. } => None,
        }
    }

    /// Whether the range was exhausted without a crossing.
    pub fn is_open(&self) -> bool {
        matches!(self, Bound::Open { .. })
    }
}

/// Lower and upper profile-likelihood bounds for one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceInterval {
    pub lower: Bound,
    pub upper: Bound,
}

impl fmt::Display for ConfidenceInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |bound: &Bound, open_prefix: char| match bound {
            Bound::Closed { value, .. } => format!("{value:.4}"),
            Bound::Open { limit } => format!("{open_prefix}{limit:.4}"),
        };
        let likelihood = |bound: &Bound| match bound {
            Bound::Closed { likelihood, .. } => format!("{likelihood:.4}"),
            Bound::Open { .. } => "-".to_string(),
        };
        write!(
            f,
            "{} to {} ({}, {})",
            side(&self.lower, '<'),
            side(&self.upper, '>'),
            likelihood(&self.lower),
            likelihood(&self.upper)
        )
    }
}

/// Absolute likelihood threshold for a profile-likelihood interval.
///
/// `best / exp(q / 2)` where `q` is the chi-squared(1) quantile at
/// `confidence`; at 95% this recovers the conventional 6.83 ratio.
///
/// # Errors
/// - [`CiError::InvalidConfidence`] unless `0 < confidence < 1`.
/// - [`CiError::Distribution`] if the distribution cannot be built.
pub fn likelihood_floor(best_likelihood: f64, confidence: f64) -> CiResult<f64> {
    if !confidence.is_finite() || confidence <= 0.0 || confidence >= 1.0 {
        return Err(CiError::InvalidConfidence {
            value: confidence,
            reason: "Confidence must lie strictly between zero and one.",
        });
    }
    let chi2 = ChiSquared::new(1.0)
        .map_err(|e| CiError::Distribution { message: e.to_string() })?;
    let quantile = chi2.inverse_cdf(confidence);
    Ok(best_likelihood / (quantile / 2.0).exp())
}

/// Which way a walk leaves the point estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Direction {
    Lower,
    Upper,
}

/// Log-spaced trial values from `from` (exclusive) to `to` (inclusive).
fn log_spaced(from: f64, to: f64, count: usize) -> Vec<f64> {
    let step = (to.ln() - from.ln()) / count as f64;
    (1..=count).map(|i| (from.ln() + step * i as f64).exp()).collect()
}

/// Evaluate `trials` concurrently on a bounded pool, skipping indices past
/// the first observed threshold crossing.
///
/// Entry `i` of the result is `None` when trial `i` was cancelled, otherwise
/// the per-trial optimization result in trial order.
pub(crate) fn parallel_walk<O: LikelihoodOracle>(
    oracle: &O,
    axis: FixedParameter,
    seed: &ParameterSet,
    nu: u32,
    threshold: f64,
    trials: &[f64],
    workers: usize,
    simplex: &SimplexOptions,
) -> CiResult<Vec<Option<OptResult<SimplexOutcome>>>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| CiError::WorkerPool { message: e.to_string() })?;
    let cutoff = AtomicUsize::new(usize::MAX);
    Ok(pool.install(|| {
        trials
            .par_iter()
            .enumerate()
            .map(|(index, &value)| {
                if index > cutoff.load(Ordering::Relaxed) {
                    return None;
                }
                let outcome = optimize(oracle, axis.with_value(value), seed, nu, simplex);
                if let Ok(out) = &outcome {
                    if out.params.likelihood() < threshold {
                        cutoff.fetch_min(index, Ordering::Relaxed);
                    }
                }
                Some(outcome)
            })
            .collect()
    }))
}

/// Drives the lower and upper profile-likelihood searches for one
/// parameter around a point estimate.
pub struct ConfidenceIntervalSearch<'a, O: LikelihoodOracle> {
    oracle: &'a O,
    estimate: ParameterSet,
    nu: u32,
    threshold: f64,
    opts: GridOptions,
}

impl<'a, O: LikelihoodOracle> ConfidenceIntervalSearch<'a, O> {
    /// Set up a search around `estimate` with an absolute likelihood
    /// `threshold` (see [`likelihood_floor`]).
    ///
    /// # Errors
    /// [`CiError::InvalidThreshold`] for a non-finite or non-positive
    /// threshold.
    pub fn new(
        oracle: &'a O,
        estimate: ParameterSet,
        nu: u32,
        threshold: f64,
        opts: GridOptions,
    ) -> CiResult<Self> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(CiError::InvalidThreshold {
                value: threshold,
                reason: "Threshold must be finite and positive.",
            });
        }
        Ok(Self { oracle, estimate, nu, threshold, opts })
    }

    /// Confidence interval for omega; sigma and npop are re-optimized at
    /// every trial omega.
    pub fn omega_interval(&self) -> CiResult<ConfidenceInterval> {
        self.interval(FixedParameter::Omega(self.estimate.omega()))
    }

    /// Confidence interval for sigma; omega and npop are re-optimized at
    /// every trial sigma.
    pub fn sigma_interval(&self) -> CiResult<ConfidenceInterval> {
        self.interval(FixedParameter::Sigma(self.estimate.sigma()))
    }

    fn interval(&self, axis: FixedParameter) -> CiResult<ConfidenceInterval> {
        Ok(ConfidenceInterval {
            lower: self.search(axis, Direction::Lower)?,
            upper: self.search(axis, Direction::Upper)?,
        })
    }

    fn search(&self, axis: FixedParameter, direction: Direction) -> CiResult<Bound> {
        let center = axis.value();
        let (low, high) = self.opts.range;
        if !(low..=high).contains(&center) {
            return Err(CiError::InvalidRange {
                low,
                high,
                reason: "The point estimate must lie within the search range.",
            });
        }
        let limit = match direction {
            Direction::Lower => low,
            Direction::Upper => high,
        };
        let trials = log_spaced(center, limit, self.opts.increments);
        let results = parallel_walk(
            self.oracle,
            axis,
            &self.estimate,
            self.nu,
            self.threshold,
            &trials,
            self.opts.workers,
            &self.opts.simplex,
        )?;

        // The estimate itself is the innermost in-bounds value.
        let mut bound = Bound::Closed {
            value: center,
            likelihood: self.estimate.likelihood(),
        };
        for (index, slot) in results.into_iter().enumerate() {
            match slot {
                // Cancelled trials only occur past a crossing, so the walk
                // is over by the time one is reached.
                None => break,
                Some(Err(err)) => return Err(err.into()),
                Some(Ok(outcome)) => {
                    let likelihood = outcome.params.likelihood();
                    if likelihood < self.threshold {
                        return Ok(bound);
                    }
                    bound = Bound::Closed { value: trials[index], likelihood };
                }
            }
        }
        Ok(Bound::Open { limit })
    }
}
