use argmin::core::{ArgminError, Error};

use crate::simulation::errors::SimulationError;

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- SimplexOptions ----
    /// Standard-deviation stopping tolerance needs to be positive and finite.
    InvalidSdTolerance {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIters {
        max_iters: u64,
        reason: &'static str,
    },
    /// Initial simplex steps need to be finite and non-zero.
    InvalidStep {
        index: usize,
        value: f64,
        reason: &'static str,
    },
    /// Start vector and step count must agree.
    DimensionMismatch {
        expected: usize,
        found: usize,
    },
    /// Start vector elements need to be finite.
    InvalidStart {
        index: usize,
        value: f64,
        reason: &'static str,
    },
    /// Population sample size bounds npop and must be at least one.
    InvalidNu {
        nu: u32,
        reason: &'static str,
    },

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    // ---- Optimizer outcome ----
    /// Best vertex elements must be finite.
    InvalidBestParam {
        index: usize,
        value: f64,
        reason: &'static str,
    },
    /// The solver reported no best vertex.
    MissingBestParam,

    // ---- Oracle ----
    /// The likelihood oracle was unavailable.
    Simulation(SimulationError),

    // ---- Argmin ----
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- SimplexOptions ----
            OptError::InvalidSdTolerance { tol, reason } => {
                write!(f, "Invalid standard-deviation tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIters { max_iters, reason } => {
                write!(f, "Invalid maximum iterations {max_iters}: {reason}")
            }
            OptError::InvalidStep { index, value, reason } => {
                write!(f, "Invalid simplex step at index {index}: {value}: {reason}")
            }
            OptError::DimensionMismatch { expected, found } => {
                write!(f, "Start vector dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidStart { index, value, reason } => {
                write!(f, "Invalid start vector element at index {index}: {value}: {reason}")
            }
            OptError::InvalidNu { nu, reason } => {
                write!(f, "Invalid population sample size {nu}: {reason}")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidBestParam { index, value, reason } => {
                write!(f, "Invalid best vertex element at index {index}: {value}: {reason}")
            }
            OptError::MissingBestParam => {
                write!(f, "Missing best vertex")
            }

            // ---- Oracle ----
            OptError::Simulation(err) => {
                write!(f, "Likelihood oracle unavailable: {err}")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        // Errors raised inside the cost function travel through argmin as
        // opaque boxes; recover them before matching argmin's own kinds.
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        let original_err = match original_err.downcast::<SimulationError>() {
            Ok(sim_err) => return OptError::Simulation(sim_err),
            Err(err) => err,
        };
        match original_err.downcast::<ArgminError>() {
            Ok(argmin_err) => match argmin_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

impl From<SimulationError> for OptError {
    fn from(err: SimulationError) -> Self {
        OptError::Simulation(err)
    }
}
