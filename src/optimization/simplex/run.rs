//! Execution helper running an argmin solver and normalizing its result.

use crate::optimization::errors::OptResult;
use crate::optimization::simplex::adapter::OracleAdapter;
use crate::optimization::simplex::traits::{SimplexOptions, SimplexOutcome};
use crate::optimization::simplex::types::Theta;
use crate::simulation::oracle::LikelihoodOracle;

use argmin::core::{Executor, IterState, State};

/// Run a solver over an adapted oracle problem.
///
/// Wires the executor (iteration cap, optional observer), runs the solver,
/// and converts the final state into a [`SimplexOutcome`]. Hitting the
/// iteration cap yields a non-converged outcome, not an error; oracle
/// transport failures abort the run.
///
/// # Errors
/// - Propagates solver and cost-function errors through the crate's
///   `From<argmin::core::Error>` conversion.
/// - Propagates best-vertex validation errors from
///   [`SimplexOutcome::new`].
pub fn run_simplex<'a, O, S>(
    problem: OracleAdapter<'a, O>,
    solver: S,
    opts: &SimplexOptions,
) -> OptResult<SimplexOutcome>
where
    O: LikelihoodOracle,
    S: argmin::core::Solver<OracleAdapter<'a, O>, IterState<Theta, (), (), (), (), f64>>
        + Send
        + 'static,
{
    let fixed = problem.fixed();
    let nu = problem.nu();
    let mut executor = Executor::new(problem, solver);
    executor = executor.configure(|state| state.max_iters(opts.max_iters));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        executor = executor.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    #[cfg(not(feature = "obs_slog"))]
    let _ = opts.verbose;

    let mut result = executor.run()?.state().clone();
    let iterations = result.get_iter();
    let fn_evals = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    SimplexOutcome::new(
        result.take_best_param(),
        result.get_best_cost(),
        fixed,
        nu,
        termination,
        iterations,
        fn_evals,
    )
}
