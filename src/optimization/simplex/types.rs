//! Shared numeric aliases and solver wiring for the simplex optimizer.
//!
//! Centralizing these keeps the rest of the optimization code agnostic to
//! `ndarray` and argmin generics: parameter vectors are [`Theta`], scalar
//! objective values are [`Cost`], and the concrete solver is [`Simplex`].

use argmin::solver::neldermead::NelderMead;
use ndarray::Array1;
use std::collections::HashMap;

/// Free-parameter vector: `[ln(free rate), npop]`.
///
/// The rate dimension is searched in log space; npop is carried as a real
/// and clamped to a whole count before every oracle evaluation.
pub type Theta = Array1<f64>;

/// Scalar objective value: the negative oracle likelihood.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
pub type FnEvalMap = HashMap<String, u64>;

/// Nelder–Mead solver specialized to this crate's numeric types.
pub type Simplex = NelderMead<Theta, Cost>;

/// Number of free dimensions of one profile search.
pub const FREE_DIMENSIONS: usize = 2;

/// Lower clamp for the free rate before an oracle evaluation, keeping it in
/// the simulator's admissible domain.
pub const FREE_RATE_FLOOR: f64 = 1e-7;
