//! Solver construction for the simplex optimizer.
//!
//! Hides argmin's Nelder–Mead wiring: the initial simplex is built from the
//! start vector plus one per-dimension step vertex, and the crate-level
//! stopping tolerance is applied. Initial parameters and iteration caps are
//! runtime concerns left to the runner.

use crate::optimization::errors::{OptError, OptResult};
use crate::optimization::simplex::traits::SimplexOptions;
use crate::optimization::simplex::types::{Simplex, Theta, FREE_DIMENSIONS};
use crate::optimization::simplex::validation::validate_start;

use argmin::solver::neldermead::NelderMead;

/// Build a Nelder–Mead solver around `theta0`.
///
/// The simplex has `n + 1` vertices: the start vector itself and one copy
/// per dimension offset by that dimension's step. Reflection, expansion,
/// contraction and shrink use the solver's standard coefficients.
///
/// # Errors
/// - Start-vector validation errors ([`OptError::DimensionMismatch`],
///   [`OptError::InvalidStart`]).
/// - [`OptError::InvalidSdTolerance`] if the solver rejects the tolerance.
pub fn build_simplex(theta0: &Theta, opts: &SimplexOptions) -> OptResult<Simplex> {
    validate_start(theta0, FREE_DIMENSIONS)?;
    let mut vertices = Vec::with_capacity(FREE_DIMENSIONS + 1);
    vertices.push(theta0.clone());
    for (dim, &step) in opts.steps.iter().enumerate() {
        let mut vertex = theta0.clone();
        vertex[dim] += step;
        vertices.push(vertex);
    }
    NelderMead::new(vertices)
        .with_sd_tolerance(opts.sd_tolerance)
        .map_err(OptError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn builds_a_solver_for_a_valid_start() {
        let opts = SimplexOptions::default();
        assert!(build_simplex(&array![0.0, 4.0], &opts).is_ok());
    }

    #[test]
    fn rejects_a_wrongly_shaped_start() {
        let opts = SimplexOptions::default();
        assert!(matches!(
            build_simplex(&array![0.0, 4.0, 1.0], &opts),
            Err(OptError::DimensionMismatch { expected: 2, found: 3 })
        ));
    }

    #[test]
    fn rejects_a_non_finite_start() {
        let opts = SimplexOptions::default();
        assert!(matches!(
            build_simplex(&array![f64::NAN, 4.0], &opts),
            Err(OptError::InvalidStart { index: 0, .. })
        ));
    }
}
