use crate::optimization::errors::OptError;

use std::fmt;

/// Result alias for confidence-interval and scan operations.
pub type CiResult<T> = Result<T, CiError>;

#[derive(Debug, Clone, PartialEq)]
pub enum CiError {
    // ---- GridOptions ----
    /// Search range bounds must be finite, positive and ordered.
    InvalidRange {
        low: f64,
        high: f64,
        reason: &'static str,
    },
    /// At least one grid increment is required.
    InvalidIncrements {
        increments: usize,
        reason: &'static str,
    },
    /// The worker pool needs at least one worker.
    InvalidWorkers {
        workers: usize,
        reason: &'static str,
    },

    // ---- Thresholds ----
    /// Confidence levels live strictly between zero and one.
    InvalidConfidence {
        value: f64,
        reason: &'static str,
    },
    /// The likelihood threshold must be finite and positive.
    InvalidThreshold {
        value: f64,
        reason: &'static str,
    },

    // ---- Infrastructure ----
    /// Building the bounded worker pool failed.
    WorkerPool {
        message: String,
    },
    /// The chi-squared distribution could not be constructed.
    Distribution {
        message: String,
    },

    // ---- Inner optimization ----
    /// A per-trial simplex run failed.
    Optimization(OptError),
}

impl std::error::Error for CiError {}

impl fmt::Display for CiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CiError::InvalidRange { low, high, reason } => {
                write!(f, "Invalid search range [{low}, {high}]: {reason}")
            }
            CiError::InvalidIncrements { increments, reason } => {
                write!(f, "Invalid increment count {increments}: {reason}")
            }
            CiError::InvalidWorkers { workers, reason } => {
                write!(f, "Invalid worker count {workers}: {reason}")
            }
            CiError::InvalidConfidence { value, reason } => {
                write!(f, "Invalid confidence level {value}: {reason}")
            }
            CiError::InvalidThreshold { value, reason } => {
                write!(f, "Invalid likelihood threshold {value}: {reason}")
            }
            CiError::WorkerPool { message } => {
                write!(f, "Worker pool construction failed: {message}")
            }
            CiError::Distribution { message } => {
                write!(f, "Distribution construction failed: {message}")
            }
            CiError::Optimization(err) => {
                write!(f, "Profile optimization failed: {err}")
            }
        }
    }
}

impl From<OptError> for CiError {
    fn from(err: OptError) -> Self {
        CiError::Optimization(err)
    }
}
