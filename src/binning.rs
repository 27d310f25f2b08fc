//! Binning curve input container.
//!
//! Purpose
//! -------
//! Hold the output of the external sequence binning step: the mapping from a
//! sequence-similarity criterion to the number of clusters ("bins") observed
//! at that criterion. The curve is consumed by the initial estimator and
//! serialized into every simulation request; it is produced elsewhere and
//! never recomputed here.
//!
//! Key behaviors
//! -------------
//! - Validate each [`BinLevel`] on construction (criterion in `0..=1`,
//!   cluster count at least 1).
//! - Keep the curve ordered by decreasing criterion regardless of input
//!   order, so downstream consumers can rely on the natural ordering.
//!
//! Invariants & assumptions
//! ------------------------
//! - A [`Binning`] is non-empty and sorted by strictly workable criteria;
//!   duplicate criteria are allowed (the estimator collapses duplicate
//!   levels, not duplicate criteria).
//! - The container is immutable after construction.

use std::fmt;

/// Result alias for binning curve construction.
pub type BinningResult<T> = Result<T, BinningError>;

#[derive(Debug, Clone, PartialEq)]
pub enum BinningError {
    /// Criterion must lie in the closed unit interval.
    InvalidCriterion { value: f64 },
    /// Cluster counts start at one.
    InvalidLevel { value: u32 },
    /// A binning curve needs at least one level.
    Empty,
}

impl std::error::Error for BinningError {}

impl fmt::Display for BinningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinningError::InvalidCriterion { value } => {
                write!(f, "Invalid similarity criterion {value}: must be within [0, 1]")
            }
            BinningError::InvalidLevel { value } => {
                write!(f, "Invalid cluster count {value}: must be at least 1")
            }
            BinningError::Empty => {
                write!(f, "Empty binning curve")
            }
        }
    }
}

/// One level of the binning curve: a similarity criterion and the number of
/// clusters observed at that criterion.
#[derive(Debug, Clone, PartialEq)]
pub struct BinLevel {
    crit: f64,
    level: u32,
}

impl BinLevel {
    /// Construct a validated bin level.
    ///
    /// # Errors
    /// - [`BinningError::InvalidCriterion`] if `crit` is non-finite or
    ///   outside `[0, 1]`.
    /// - [`BinningError::InvalidLevel`] if `level` is zero.
    pub fn new(crit: f64, level: u32) -> BinningResult<Self> {
        if !crit.is_finite() || !(0.0..=1.0).contains(&crit) {
            return Err(BinningError::InvalidCriterion { value: crit });
        }
        if level == 0 {
            return Err(BinningError::InvalidLevel { value: level });
        }
        Ok(Self { crit, level })
    }

    /// Sequence similarity criterion, in `[0, 1]`.
    pub fn crit(&self) -> f64 {
        self.crit
    }

    /// Number of clusters at this criterion.
    pub fn level(&self) -> u32 {
        self.level
    }
}

/// The full binning curve, ordered by decreasing criterion.
#[derive(Debug, Clone, PartialEq)]
pub struct Binning {
    bins: Vec<BinLevel>,
}

impl Binning {
    /// Construct a binning curve from levels in any order.
    ///
    /// The levels are sorted by decreasing criterion; ties keep their input
    /// order.
    ///
    /// # Errors
    /// [`BinningError::Empty`] if no levels are supplied.
    pub fn new(mut bins: Vec<BinLevel>) -> BinningResult<Self> {
        if bins.is_empty() {
            return Err(BinningError::Empty);
        }
        bins.sort_by(|a, b| b.crit.total_cmp(&a.crit));
        Ok(Self { bins })
    }

    /// The levels of the curve, highest criterion first.
    pub fn bins(&self) -> &[BinLevel] {
        &self.bins
    }

    /// Number of levels in the curve.
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// Whether the curve holds no levels. Construction forbids this, so the
    /// method exists for API completeness only.
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_level_rejects_out_of_range_criterion() {
        assert_eq!(
            BinLevel::new(1.2, 3),
            Err(BinningError::InvalidCriterion { value: 1.2 })
        );
        assert!(matches!(
            BinLevel::new(f64::NAN, 3),
            Err(BinningError::InvalidCriterion { .. })
        ));
    }

    #[test]
    fn bin_level_rejects_zero_level() {
        assert_eq!(BinLevel::new(0.9, 0), Err(BinningError::InvalidLevel { value: 0 }));
    }

    #[test]
    fn binning_sorts_by_decreasing_criterion() {
        let bins = vec![
            BinLevel::new(0.80, 9).unwrap(),
            BinLevel::new(1.00, 1).unwrap(),
            BinLevel::new(0.95, 4).unwrap(),
        ];
        let binning = Binning::new(bins).unwrap();
        let crits: Vec<f64> = binning.bins().iter().map(BinLevel::crit).collect();
        assert_eq!(crits, vec![1.00, 0.95, 0.80]);
    }

    #[test]
    fn binning_rejects_empty_curve() {
        assert_eq!(Binning::new(Vec::new()), Err(BinningError::Empty));
    }
}
