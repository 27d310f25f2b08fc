//! Validation helpers for the simplex optimizer.
//!
//! These centralize the consistency checks shared across the optimizer
//! surface: option validation on construction and best-vertex validation
//! when an outcome is assembled. They standardize error reporting through
//! domain-specific [`OptError`] variants.

use crate::optimization::errors::{OptError, OptResult};
use crate::optimization::simplex::types::Theta;

/// Validate the standard-deviation stopping tolerance.
///
/// # Errors
/// [`OptError::InvalidSdTolerance`] if the value is non-finite or not
/// strictly positive.
pub fn verify_sd_tolerance(tol: f64) -> OptResult<()> {
    if !tol.is_finite() {
        return Err(OptError::InvalidSdTolerance { tol, reason: "Tolerance must be finite." });
    }
    if tol <= 0.0 {
        return Err(OptError::InvalidSdTolerance { tol, reason: "Tolerance must be positive." });
    }
    Ok(())
}

/// Validate the per-dimension initial simplex steps.
///
/// Zero steps would collapse the initial simplex onto a line, so each step
/// must be finite and non-zero.
///
/// # Errors
/// [`OptError::InvalidStep`] with the index and value of the first
/// offending step.
pub fn verify_steps(steps: &[f64]) -> OptResult<()> {
    for (index, &value) in steps.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidStep {
                index,
                value,
                reason: "Steps must be finite.",
            });
        }
        if value == 0.0 {
            return Err(OptError::InvalidStep {
                index,
                value,
                reason: "Steps must be non-zero.",
            });
        }
    }
    Ok(())
}

/// Validate a start vector against dimension and finiteness.
///
/// # Errors
/// - [`OptError::DimensionMismatch`] if the length differs from `dim`.
/// - [`OptError::InvalidStart`] on the first non-finite element.
pub fn validate_start(theta0: &Theta, dim: usize) -> OptResult<()> {
    if theta0.len() != dim {
        return Err(OptError::DimensionMismatch { expected: dim, found: theta0.len() });
    }
    for (index, &value) in theta0.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidStart {
                index,
                value,
                reason: "Start vector elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate and unwrap the solver's best vertex.
///
/// # Errors
/// - [`OptError::MissingBestParam`] if no vertex was reported.
/// - [`OptError::InvalidBestParam`] on the first non-finite element.
pub fn validate_best(best: Option<Theta>) -> OptResult<Theta> {
    match best {
        Some(theta) => {
            for (index, &value) in theta.iter().enumerate() {
                if !value.is_finite() {
                    return Err(OptError::InvalidBestParam {
                        index,
                        value,
                        reason: "Best vertex elements must be finite.",
                    });
                }
            }
            Ok(theta)
        }
        None => Err(OptError::MissingBestParam),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn sd_tolerance_must_be_positive_and_finite() {
        assert!(verify_sd_tolerance(1e-6).is_ok());
        assert!(matches!(
            verify_sd_tolerance(0.0),
            Err(OptError::InvalidSdTolerance { .. })
        ));
        assert!(matches!(
            verify_sd_tolerance(f64::INFINITY),
            Err(OptError::InvalidSdTolerance { .. })
        ));
    }

    #[test]
    fn steps_must_be_finite_and_non_zero() {
        assert!(verify_steps(&[0.5, 2.0]).is_ok());
        assert!(matches!(
            verify_steps(&[0.5, 0.0]),
            Err(OptError::InvalidStep { index: 1, .. })
        ));
        assert!(matches!(
            verify_steps(&[f64::NAN, 1.0]),
            Err(OptError::InvalidStep { index: 0, .. })
        ));
    }

    #[test]
    fn start_vector_is_checked_for_shape_and_finiteness() {
        assert!(validate_start(&array![0.0, 4.0], 2).is_ok());
        assert!(matches!(
            validate_start(&array![0.0], 2),
            Err(OptError::DimensionMismatch { expected: 2, found: 1 })
        ));
        assert!(matches!(
            validate_start(&array![0.0, f64::NAN], 2),
            Err(OptError::InvalidStart { index: 1, .. })
        ));
    }

    #[test]
    fn best_vertex_must_exist_and_be_finite() {
        assert!(validate_best(Some(array![0.1, 3.0])).is_ok());
        assert_eq!(validate_best(None), Err(OptError::MissingBestParam));
        assert!(matches!(
            validate_best(Some(array![f64::INFINITY, 3.0])),
            Err(OptError::InvalidBestParam { index: 0, .. })
        ));
    }
}
