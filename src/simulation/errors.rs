use std::fmt;
use std::io;

/// Result alias for oracle transport and protocol operations.
pub type SimResult<T> = Result<T, SimulationError>;

/// Failures of the external likelihood oracle: transport problems and
/// malformed responses. All variants mean "oracle unavailable" to the
/// optimization layer; a usable-but-empty result is `Ok(None)` there, not an
/// error here.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Reading or writing a protocol file failed.
    Io { op: &'static str, message: String },
    /// The oracle process exited unsuccessfully.
    ProcessFailed { status: String },
    /// The response file held no parsable result line.
    MissingReply,
    /// A response line did not follow the four-field format.
    MalformedReply { line: String, reason: &'static str },
}

impl SimulationError {
    /// Wrap an I/O error with the operation it interrupted.
    pub fn io(op: &'static str, err: io::Error) -> Self {
        SimulationError::Io { op, message: err.to_string() }
    }
}

impl std::error::Error for SimulationError {}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Io { op, message } => {
                write!(f, "Oracle I/O failure while {op}: {message}")
            }
            SimulationError::ProcessFailed { status } => {
                write!(f, "Oracle process failed: {status}")
            }
            SimulationError::MissingReply => {
                write!(f, "Oracle produced no response line")
            }
            SimulationError::MalformedReply { line, reason } => {
                write!(f, "Malformed oracle response '{line}': {reason}")
            }
        }
    }
}
