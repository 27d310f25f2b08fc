//! Public configuration and outcome types of the simplex optimizer.
//!
//! Purpose
//! -------
//! Define the surface callers interact with: which parameter is held fixed
//! ([`FixedParameter`]), how a run is configured ([`SimplexOptions`]), and
//! what a run returns ([`SimplexOutcome`]).
//!
//! Conventions
//! -----------
//! - The optimizer always *minimizes* the cost `-likelihood`; outcomes are
//!   expressed in likelihood terms (higher is better).
//! - A run that hits its iteration cap is a soft failure: the best vertex
//!   found is returned with `converged: false` rather than an error.

use crate::optimization::errors::{OptError, OptResult};
use crate::optimization::simplex::adapter::{clamped_npop, clamped_rate};
use crate::optimization::simplex::types::{FnEvalMap, Theta, FREE_RATE_FLOOR};
use crate::optimization::simplex::validation::{validate_best, verify_sd_tolerance, verify_steps};
use crate::params::ParameterSet;

use argmin::core::{TerminationReason, TerminationStatus};
use ndarray::array;

/// Which model rate a profile search holds fixed.
///
/// The remaining rate and npop are the two free dimensions the simplex
/// explores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixedParameter {
    /// Hold omega; the free dimensions are `[ln(sigma), npop]`.
    Omega(f64),
    /// Hold sigma; the free dimensions are `[ln(omega), npop]`.
    Sigma(f64),
}

impl FixedParameter {
    /// The fixed rate's value.
    pub fn value(&self) -> f64 {
        match self {
            FixedParameter::Omega(value) | FixedParameter::Sigma(value) => *value,
        }
    }

    /// The same axis at a different value (used by grid walks).
    pub fn with_value(&self, value: f64) -> Self {
        match self {
            FixedParameter::Omega(_) => FixedParameter::Omega(value),
            FixedParameter::Sigma(_) => FixedParameter::Sigma(value),
        }
    }

    /// Assemble a full parameter set from the free coordinates.
    pub fn params(&self, free_rate: f64, npop: i64) -> ParameterSet {
        match self {
            FixedParameter::Omega(omega) => ParameterSet::new(*omega, free_rate, npop, 0.0),
            FixedParameter::Sigma(sigma) => ParameterSet::new(free_rate, *sigma, npop, 0.0),
        }
    }

    /// Start vector for a search seeded from `seed`.
    ///
    /// The free rate enters in log space, floored at the admissible minimum
    /// so the logarithm stays finite.
    pub fn theta_from(&self, seed: &ParameterSet) -> Theta {
        let free_rate = match self {
            FixedParameter::Omega(_) => seed.sigma(),
            FixedParameter::Sigma(_) => seed.omega(),
        };
        array![free_rate.max(FREE_RATE_FLOOR).ln(), seed.npop() as f64]
    }
}

/// Configuration of one simplex run.
///
/// Fields:
/// - `steps`: per-dimension offsets building the initial simplex around the
///   start vector (log-rate step, npop step).
/// - `sd_tolerance`: stop when the standard deviation of the vertex costs
///   falls below this.
/// - `max_iters`: hard cap on solver iterations; reaching it flags the
///   outcome as non-converged instead of failing.
/// - `verbose`: attach a progress observer (behind the `obs_slog` feature).
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexOptions {
    pub steps: [f64; 2],
    pub sd_tolerance: f64,
    pub max_iters: u64,
    pub verbose: bool,
}

impl SimplexOptions {
    /// Construct validated options.
    ///
    /// # Errors
    /// - [`OptError::InvalidStep`] for non-finite or zero steps.
    /// - [`OptError::InvalidSdTolerance`] for a non-finite or non-positive
    ///   tolerance.
    /// - [`OptError::InvalidMaxIters`] for a zero iteration cap.
    pub fn new(steps: [f64; 2], sd_tolerance: f64, max_iters: u64, verbose: bool) -> OptResult<Self> {
        verify_steps(&steps)?;
        verify_sd_tolerance(sd_tolerance)?;
        if max_iters == 0 {
            return Err(OptError::InvalidMaxIters {
                max_iters,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { steps, sd_tolerance, max_iters, verbose })
    }
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            steps: [0.5, 2.0],
            sd_tolerance: 1e-4,
            max_iters: 200,
            verbose: false,
        }
    }
}

/// Canonical result of one simplex run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexOutcome {
    /// Best parameter set found, with its likelihood.
    pub params: ParameterSet,
    /// Whether the solver met its stopping tolerance.
    pub converged: bool,
    /// Human-readable termination status.
    pub status: String,
    /// Iterations performed.
    pub iterations: usize,
    /// Function-evaluation counters reported by the solver.
    pub fn_evals: FnEvalMap,
}

impl SimplexOutcome {
    /// Build a validated outcome from raw solver state.
    ///
    /// The best vertex is validated (present, finite), mapped through the
    /// same clamps the adapter applies before evaluations, and paired with
    /// `-best_cost` as its likelihood. An iteration-cap termination is a
    /// non-converged outcome, not an error.
    ///
    /// # Errors
    /// Propagates best-vertex validation errors.
    pub fn new(
        best: Option<Theta>,
        best_cost: f64,
        fixed: FixedParameter,
        nu: u32,
        termination: TerminationStatus,
        iterations: u64,
        fn_evals: FnEvalMap,
    ) -> OptResult<Self> {
        let theta = validate_best(best)?;
        let rate = clamped_rate(theta[0]);
        let npop = clamped_npop(theta[1], nu);
        let params = fixed.params(rate, npop).with_likelihood(-best_cost);
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(reason) => {
                let converged = !matches!(reason, TerminationReason::MaxItersReached);
                (converged, format!("{reason:?}"))
            }
        };
        Ok(Self {
            params,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
        })
    }
}
