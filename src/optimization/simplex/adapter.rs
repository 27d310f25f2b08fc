//! Adapter exposing the likelihood oracle as an argmin problem.
//!
//! The oracle reports a success rate to *maximize*; argmin minimizes. The
//! adapter defines the cost as the negated likelihood and applies the
//! domain clamps before every evaluation: the free rate is reconstructed
//! from log space and floored at [`FREE_RATE_FLOOR`], npop is rounded to a
//! whole count and clamped to `[1, nu]`. An oracle reply without a usable
//! result costs 0.0 (zero likelihood); only transport failures become
//! errors.

use crate::optimization::errors::{OptError, OptResult};
use crate::optimization::simplex::traits::FixedParameter;
use crate::optimization::simplex::types::{Cost, Theta, FREE_RATE_FLOOR};
use crate::params::ParameterSet;
use crate::simulation::oracle::LikelihoodOracle;

use argmin::core::{CostFunction, Error};

/// Free rate from its log-space coordinate, floored at the admissible
/// minimum.
pub(crate) fn clamped_rate(log_rate: f64) -> f64 {
    log_rate.exp().max(FREE_RATE_FLOOR)
}

/// Whole npop from its real-valued coordinate, clamped to `[1, nu]`.
pub(crate) fn clamped_npop(value: f64, nu: u32) -> i64 {
    let rounded = value.round();
    if !rounded.is_finite() {
        return 1;
    }
    (rounded as i64).clamp(1, i64::from(nu))
}

/// Bridges a [`LikelihoodOracle`] to argmin's [`CostFunction`].
#[derive(Debug, Clone)]
pub struct OracleAdapter<'a, O: LikelihoodOracle> {
    oracle: &'a O,
    fixed: FixedParameter,
    nu: u32,
}

impl<'a, O: LikelihoodOracle> OracleAdapter<'a, O> {
    /// Construct an adapter for one profile search.
    ///
    /// # Errors
    /// [`OptError::InvalidNu`] if `nu` is zero; npop could not be clamped
    /// into an empty range.
    pub fn new(oracle: &'a O, fixed: FixedParameter, nu: u32) -> OptResult<Self> {
        if nu == 0 {
            return Err(OptError::InvalidNu {
                nu,
                reason: "The sample size must be at least one.",
            });
        }
        Ok(Self { oracle, fixed, nu })
    }

    /// Which axis this adapter holds fixed.
    pub fn fixed(&self) -> FixedParameter {
        self.fixed
    }

    /// Upper npop clamp.
    pub fn nu(&self) -> u32 {
        self.nu
    }

    /// Map a free-parameter vector into the clamped parameter set the
    /// oracle is asked to evaluate.
    pub fn params_from(&self, theta: &Theta) -> ParameterSet {
        self.fixed.params(clamped_rate(theta[0]), clamped_npop(theta[1], self.nu))
    }
}

impl<O: LikelihoodOracle> CostFunction for OracleAdapter<'_, O> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate the cost `-likelihood` at `theta`.
    ///
    /// The oracle is stochastic: repeated evaluations at one vertex may
    /// disagree, and the simplex is expected to tolerate that.
    ///
    /// # Errors
    /// Oracle transport failures propagate as boxed [`OptError`] values and
    /// abort the enclosing run.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let params = self.params_from(theta);
        match self.oracle.evaluate(&params) {
            Ok(Some(result)) => {
                let likelihood = result.likelihood();
                if !likelihood.is_finite() {
                    return Err((OptError::NonFiniteCost { value: likelihood }).into());
                }
                Ok(-likelihood)
            }
            Ok(None) => Ok(0.0),
            Err(err) => Err(OptError::from(err).into()),
        }
    }
}
