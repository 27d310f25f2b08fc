//! The likelihood oracle seam.
//!
//! Purpose
//! -------
//! Define the capability the optimizer consumes: `evaluate(parameters) ->
//! likelihood`. The production implementation drives an external coalescent
//! simulator through the textual file protocol; tests substitute
//! deterministic stand-ins.
//!
//! Key behaviors
//! -------------
//! - [`LikelihoodOracle`] is the injected abstraction: one stochastic,
//!   expensive evaluation per call, independent and side-effect-free with
//!   respect to other calls. Implementations must be `Sync` so concurrent
//!   grid searches can share one oracle.
//! - [`ExternalOracle`] renders a [`SimulationRequest`] to the input file,
//!   hands the invocation to an injected [`OracleProcess`], then parses the
//!   output file. Process lifecycle beyond a single spawn is the
//!   collaborator's problem, not this crate's.
//! - [`SeedSequence`] supplies the per-request random seeds (odd, below
//!   nine digits) from explicit state instead of ambient global randomness.
//!
//! Invariants & assumptions
//! ------------------------
//! - The oracle is stochastic: equal inputs may yield different
//!   likelihoods. Consumers must not assume reproducibility.
//! - An unusable reply (non-positive npop or likelihood) is `Ok(None)`;
//!   only transport and protocol failures are errors.
//! - Every evaluation is bounded by the configured replicate count; no call
//!   blocks indefinitely once the external program honors its contract.

use crate::binning::Binning;
use crate::params::ParameterSet;
use crate::simulation::errors::{SimResult, SimulationError};
use crate::simulation::protocol::{SimulationReply, SimulationRequest};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

/// Upper bound (exclusive) for oracle seeds: nine digits.
const SEED_LIMIT: u64 = 100_000_000;

/// A black-box evaluator of parameter sets.
///
/// `Ok(Some(result))` carries the achieved likelihood for (a possibly
/// adjusted copy of) the parameters; `Ok(None)` means the oracle ran but
/// produced no usable result; `Err` means the oracle was unavailable.
pub trait LikelihoodOracle: Sync {
    fn evaluate(&self, params: &ParameterSet) -> SimResult<Option<ParameterSet>>;
}

/// Explicit source of oracle seeds.
///
/// Seeds are odd integers below nine digits, the convention the simulator's
/// random number generator requires. The sequence is deliberately explicit
/// state: construct it once, pass it down the call chain.
#[derive(Debug)]
pub struct SeedSequence {
    rng: StdRng,
}

impl SeedSequence {
    /// A sequence seeded from operating-system entropy.
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// A reproducible sequence.
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Next oracle seed: odd, below nine digits.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.gen_range(0..SEED_LIMIT) | 1
    }
}

/// Launches one oracle run over the protocol files.
///
/// The sole boundary to the external program: everything beyond a single
/// spawn-and-wait (scheduling, retries, cleanup) belongs to the caller's
/// environment.
pub trait OracleProcess: Sync {
    fn run(&self, input: &Path, output: &Path) -> SimResult<()>;
}

/// Production [`OracleProcess`]: spawns the configured simulator binary with
/// the input and output paths as arguments and waits for it.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: PathBuf,
}

impl CommandRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }
}

impl OracleProcess for CommandRunner {
    fn run(&self, input: &Path, output: &Path) -> SimResult<()> {
        let status = Command::new(&self.program)
            .arg(input)
            .arg(output)
            .status()
            .map_err(|e| SimulationError::io("spawning the oracle", e))?;
        if !status.success() {
            return Err(SimulationError::ProcessFailed { status: status.to_string() });
        }
        Ok(())
    }
}

/// Fixed, per-analysis oracle configuration.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Population sample size.
    pub nu: u32,
    /// Replicates per evaluation.
    pub nrep: u32,
    /// Sequence length after gap removal.
    pub length: u32,
    /// Which success-rate statistic the oracle reports.
    pub criterion: u32,
    /// Request file path.
    pub input: PathBuf,
    /// Response file path.
    pub output: PathBuf,
}

/// The production oracle: textual protocol over an [`OracleProcess`].
pub struct ExternalOracle<R: OracleProcess> {
    runner: R,
    config: OracleConfig,
    binning: Binning,
    seeds: Mutex<SeedSequence>,
}

impl<R: OracleProcess> ExternalOracle<R> {
    pub fn new(runner: R, config: OracleConfig, binning: Binning, seeds: SeedSequence) -> Self {
        Self { runner, config, binning, seeds: Mutex::new(seeds) }
    }

    fn next_seed(&self) -> u64 {
        match self.seeds.lock() {
            Ok(mut seeds) => seeds.next_seed(),
            // A poisoned lock only means another evaluation panicked; the
            // sequence itself is still valid.
            Err(poisoned) => poisoned.into_inner().next_seed(),
        }
    }
}

impl<R: OracleProcess> LikelihoodOracle for ExternalOracle<R> {
    fn evaluate(&self, params: &ParameterSet) -> SimResult<Option<ParameterSet>> {
        let request = SimulationRequest {
            binning: &self.binning,
            omega: params.omega(),
            sigma: params.sigma(),
            npop: params.npop(),
            nu: self.config.nu,
            nrep: self.config.nrep,
            seed: self.next_seed(),
            length: self.config.length,
            criterion: self.config.criterion,
        };
        std::fs::write(&self.config.input, request.render())
            .map_err(|e| SimulationError::io("writing the request file", e))?;
        self.runner.run(&self.config.input, &self.config.output)?;
        let response = std::fs::read_to_string(&self.config.output)
            .map_err(|e| SimulationError::io("reading the response file", e))?;
        Ok(SimulationReply::parse(&response)?.into_result())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::BinLevel;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Seed conventions (odd, below nine digits, reproducible sequences).
    // - The full request/run/response round trip via an in-memory runner.
    // - Error propagation from a failing runner.
    // -------------------------------------------------------------------------

    #[test]
    fn seeds_are_odd_and_bounded() {
        let mut seeds = SeedSequence::from_seed(7);
        for _ in 0..100 {
            let seed = seeds.next_seed();
            assert_eq!(seed % 2, 1);
            assert!(seed < SEED_LIMIT);
        }
    }

    #[test]
    fn seed_sequences_are_reproducible() {
        let mut a = SeedSequence::from_seed(42);
        let mut b = SeedSequence::from_seed(42);
        let first: Vec<u64> = (0..10).map(|_| a.next_seed()).collect();
        let second: Vec<u64> = (0..10).map(|_| b.next_seed()).collect();
        assert_eq!(first, second);
    }

    /// Runner that copies a canned response to the output path after
    /// checking the request arrived.
    struct CannedRunner {
        response: &'static str,
    }

    impl OracleProcess for CannedRunner {
        fn run(&self, input: &Path, output: &Path) -> SimResult<()> {
            let request = std::fs::read_to_string(input)
                .map_err(|e| SimulationError::io("reading the request file", e))?;
            assert!(request.contains("numcrit"));
            assert!(request.contains("whichavg"));
            std::fs::write(output, self.response)
                .map_err(|e| SimulationError::io("writing the response file", e))?;
            Ok(())
        }
    }

    fn test_oracle(response: &'static str) -> ExternalOracle<CannedRunner> {
        let dir = std::env::temp_dir();
        let unique = format!("{:?}-{response:p}", std::thread::current().id());
        let config = OracleConfig {
            nu: 30,
            nrep: 100,
            length: 1000,
            criterion: 1,
            input: dir.join(format!("ecosimIn-{unique}.dat")),
            output: dir.join(format!("ecosimOut-{unique}.dat")),
        };
        let binning = Binning::new(vec![
            BinLevel::new(1.0, 8).unwrap(),
            BinLevel::new(0.9, 3).unwrap(),
        ])
        .unwrap();
        ExternalOracle::new(CannedRunner { response }, config, binning, SeedSequence::from_seed(3))
    }

    #[test]
    fn round_trips_a_usable_reply() {
        let oracle = test_oracle("0.5 1.25 4 0.82\n");
        let params = ParameterSet::new(0.5, 1.25, 4, 0.0);
        let result = oracle.evaluate(&params).unwrap().unwrap();
        assert_eq!(result.npop(), 4);
        assert_eq!(result.likelihood(), 0.82);
    }

    #[test]
    fn unusable_reply_is_none() {
        let oracle = test_oracle("0.5 1.25 -1 0.82\n");
        let params = ParameterSet::new(0.5, 1.25, 4, 0.0);
        assert_eq!(oracle.evaluate(&params).unwrap(), None);
    }

    /// Runner that always fails.
    struct FailingRunner;

    impl OracleProcess for FailingRunner {
        fn run(&self, _input: &Path, _output: &Path) -> SimResult<()> {
            Err(SimulationError::ProcessFailed { status: "exit code: 1".to_string() })
        }
    }

    #[test]
    fn runner_failure_propagates() {
        let dir = std::env::temp_dir();
        let config = OracleConfig {
            nu: 30,
            nrep: 100,
            length: 1000,
            criterion: 1,
            input: dir.join("ecosimIn-failing.dat"),
            output: dir.join("ecosimOut-failing.dat"),
        };
        let binning = Binning::new(vec![BinLevel::new(1.0, 8).unwrap()]).unwrap();
        let oracle =
            ExternalOracle::new(FailingRunner, config, binning, SeedSequence::from_seed(3));
        let params = ParameterSet::new(0.5, 1.25, 4, 0.0);
        assert!(matches!(
            oracle.evaluate(&params),
            Err(SimulationError::ProcessFailed { .. })
        ));
    }
}
