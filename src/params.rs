//! Parameter sets for the ecotype speciation model.
//!
//! Purpose
//! -------
//! Provide the immutable value object passed between the estimation stages:
//! the initial estimate, the simplex optimizer, the outer omega scan, and the
//! confidence-interval searches all consume and produce [`ParameterSet`]
//! instances.
//!
//! Key behaviors
//! -------------
//! - Carry the three model parameters (omega, sigma, npop) together with the
//!   likelihood attained for them.
//! - Order parameter sets by likelihood so "best so far" reductions are a
//!   single comparison.
//!
//! Invariants & assumptions
//! ------------------------
//! - A `ParameterSet` is never mutated after construction; every stage that
//!   improves on a result builds a new instance.
//! - `omega` and `sigma` are rates and expected to be strictly positive in
//!   the admissible domain; `npop` is a whole ecotype count. Construction
//!   does not enforce these bounds because oracle replies are allowed to
//!   report out-of-domain values (which callers treat as unusable).
//!
//! Testing notes
//! -------------
//! - Unit tests cover the likelihood ordering and the accessors; domain
//!   checks are exercised where the values are produced (estimator, adapter,
//!   oracle reply handling).

use std::cmp::Ordering;
use std::fmt;

/// One point in parameter space together with its attained likelihood.
///
/// Produced by the initial estimator (likelihood 0), by every simplex
/// optimization, and by the confidence-interval searches. Higher likelihood
/// is better.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    omega: f64,
    sigma: f64,
    npop: i64,
    likelihood: f64,
}

impl ParameterSet {
    /// Bundle parameter values with the likelihood attained for them.
    pub fn new(omega: f64, sigma: f64, npop: i64, likelihood: f64) -> Self {
        Self { omega, sigma, npop, likelihood }
    }

    /// Rate of ecotype formation.
    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Rate of periodic selection.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Number of ecotypes.
    pub fn npop(&self) -> i64 {
        self.npop
    }

    /// Likelihood attained for this parameter set.
    pub fn likelihood(&self) -> f64 {
        self.likelihood
    }

    /// A copy of this parameter set with a different likelihood attached.
    pub fn with_likelihood(&self, likelihood: f64) -> Self {
        Self { likelihood, ..self.clone() }
    }

    /// Compare two parameter sets by likelihood.
    ///
    /// NaN likelihoods sort below every finite value, so a usable result
    /// always wins a `max_by` reduction against a failed one.
    pub fn cmp_likelihood(&self, other: &Self) -> Ordering {
        self.likelihood.total_cmp(&other.likelihood)
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "omega: {:.5}, sigma: {:.5}, npop: {}, likelihood: {:.5}",
            self.omega, self.sigma, self.npop, self.likelihood
        )
    }
}
