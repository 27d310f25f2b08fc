use std::fmt;

/// Result alias for initial parameter estimation.
pub type EstimateResult<T> = Result<T, EstimateError>;

#[derive(Debug, Clone, PartialEq)]
pub enum EstimateError {
    /// A segment fit needs at least two points past its start index.
    NotEnoughPoints { start: usize, found: usize },
    /// All points of a segment share one x value; no slope exists.
    VerticalSegment { x: f64 },
    /// The sigma and omega segments have equal slopes; their intersection
    /// is undefined.
    ParallelSegments { slope: f64 },
}

impl std::error::Error for EstimateError {}

impl fmt::Display for EstimateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimateError::NotEnoughPoints { start, found } => {
                write!(
                    f,
                    "Not enough binning points to fit a segment at index {start}: {found} available"
                )
            }
            EstimateError::VerticalSegment { x } => {
                write!(f, "Degenerate segment: every point lies at x = {x}")
            }
            EstimateError::ParallelSegments { slope } => {
                write!(
                    f,
                    "Sigma and omega segments are parallel (slope {slope}); no intersection exists"
                )
            }
        }
    }
}
