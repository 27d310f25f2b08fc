//! Derivative-free profile optimization of the speciation parameters.
//!
//! Purpose
//! -------
//! Refine (sigma or omega, and npop) at one fixed value of the other rate
//! by Nelder–Mead search against the stochastic likelihood oracle. This is
//! the workhorse the outer omega scan and both confidence-interval searches
//! drive repeatedly.
//!
//! Key behaviors
//! -------------
//! - The two free dimensions are the logarithm of the free rate and npop
//!   (kept real inside the simplex, rounded and clamped to `[1, nu]` before
//!   every evaluation; the rate is floored at 1e-7).
//! - Cost is the negated oracle likelihood, so minimization is maximum
//!   likelihood. Every evaluation launches one full stochastic simulation;
//!   the simplex tolerates non-monotonic values between nominally equal
//!   vertices and assumes no reproducibility.
//! - Each iteration reflects the worst vertex through the centroid of the
//!   rest and chooses among reflection, expansion, contraction, or a full
//!   shrink toward the best vertex (the solver's standard coefficients).
//! - Convergence: standard deviation of the vertex costs below the stopping
//!   tolerance. The iteration cap is a soft failure returning the best
//!   vertex flagged non-converged.
//!
//! Downstream usage
//! ----------------
//! - [`optimize`] is the single entry point; it seeds the start vector from
//!   a [`ParameterSet`], builds the solver, and runs it.
//! - One optimization is inherently sequential; parallelism lives across
//!   independent invocations in the confidence module.

pub mod adapter;
pub mod builders;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

pub use adapter::OracleAdapter;
pub use builders::build_simplex;
pub use run::run_simplex;
pub use traits::{FixedParameter, SimplexOptions, SimplexOutcome};
pub use types::{Cost, FnEvalMap, Simplex, Theta, FREE_RATE_FLOOR};

use crate::optimization::errors::OptResult;
use crate::params::ParameterSet;
use crate::simulation::oracle::LikelihoodOracle;

/// Maximize the oracle likelihood over the free dimensions at `fixed`.
///
/// The search starts from `seed` (its free rate entering in log space) and
/// returns the refined parameters with their attained likelihood.
///
/// # Errors
/// - Option and start validation errors.
/// - [`OptError::Simulation`](crate::optimization::errors::OptError::Simulation)
///   if the oracle becomes unavailable mid-run.
pub fn optimize<O: LikelihoodOracle>(
    oracle: &O,
    fixed: FixedParameter,
    seed: &ParameterSet,
    nu: u32,
    opts: &SimplexOptions,
) -> OptResult<SimplexOutcome> {
    let theta0 = fixed.theta_from(seed);
    let problem = OracleAdapter::new(oracle, fixed, nu)?;
    let solver = build_simplex(&theta0, opts)?;
    run_simplex(problem, solver, opts)
}
