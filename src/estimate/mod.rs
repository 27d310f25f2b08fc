//! Closed-form initial estimate from the binning curve.
//!
//! Purpose
//! -------
//! Seed the simplex search with a cheap, deterministic estimate of (omega,
//! sigma, npop). The binning curve is transformed into a point cloud and two
//! best-fit line segments are grown greedily over it: the first segment's
//! slope estimates the periodic-selection rate, the second's the
//! ecotype-formation rate, and their intersection the ecotype count.
//!
//! Key behaviors
//! -------------
//! - Point construction: bin levels equal to 1 are dropped (a single cluster
//!   carries no slope information), consecutive duplicate levels collapse,
//!   `x = (1 - crit) * length` counts implied substitutions, `y =
//!   log2(level)`, and points come out ordered by ascending x.
//! - Segment growth: a line is fit by ordinary least squares over the first
//!   two window points, then the window extends one point at a time while
//!   the squared perpendicular distance of the new point to that line stays
//!   within [`MAX_SEGMENT_ERROR`]. The first failing point starts the second
//!   segment. Each segment's reported line is re-fit over its full window.
//! - Parameter extraction: `sigma = -m1`, `omega = -m2`, `npop =
//!   round(2^y*)` with `y* = m2 (b1 - b2) / (m2 - m1) + b2`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Equal segment slopes are a domain error
//!   ([`EstimateError::ParallelSegments`]); the division is never performed
//!   blindly.
//! - The produced [`ParameterSet`] carries likelihood 0; only the oracle
//!   assigns likelihoods.

pub mod errors;

pub use errors::{EstimateError, EstimateResult};

use crate::binning::Binning;
use crate::params::ParameterSet;

/// Squared perpendicular distance above which a point no longer belongs to
/// the segment being grown.
pub const MAX_SEGMENT_ERROR: f64 = 0.1;

/// An XY point of the transformed binning curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Number of substitutions implied by the similarity criterion.
    pub x: f64,
    /// Log2 of the cluster count at that criterion.
    pub y: f64,
}

/// A line `y = m x + b` fit by ordinary least squares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub m: f64,
    pub b: f64,
}

impl Line {
    /// Ordinary least squares over `points`.
    ///
    /// # Errors
    /// - [`EstimateError::NotEnoughPoints`] for fewer than two points.
    /// - [`EstimateError::VerticalSegment`] when every x coincides.
    pub fn fit(points: &[Point]) -> EstimateResult<Self> {
        if points.len() < 2 {
            return Err(EstimateError::NotEnoughPoints { start: 0, found: points.len() });
        }
        let n = points.len() as f64;
        let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
        for point in points {
            sum_x += point.x;
            sum_y += point.y;
            sum_xy += point.x * point.y;
            sum_x2 += point.x * point.x;
        }
        let denom = n * sum_x2 - sum_x * sum_x;
        if denom.abs() < f64::EPSILON {
            return Err(EstimateError::VerticalSegment { x: points[0].x });
        }
        Ok(Self {
            m: (n * sum_xy - sum_x * sum_y) / denom,
            b: (sum_y * sum_x2 - sum_x * sum_xy) / denom,
        })
    }

    /// Squared perpendicular distance from `point` to this line.
    pub fn squared_error(&self, point: &Point) -> f64 {
        let error = (-self.m * point.x + point.y - self.b).abs() / (self.m * self.m + 1.0).sqrt();
        error * error
    }
}

/// The closed-form seed estimate together with its fitted segments.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterEstimate {
    estimate: ParameterSet,
    sigma_line: Line,
    omega_line: Line,
}

impl ParameterEstimate {
    /// Estimate (omega, sigma, npop) from a binning curve.
    ///
    /// `length` is the sequence length after gap removal, used to turn
    /// similarity criteria into substitution counts.
    ///
    /// # Errors
    /// - [`EstimateError::NotEnoughPoints`] if either segment cannot cover
    ///   two points.
    /// - [`EstimateError::ParallelSegments`] if the fitted segments never
    ///   intersect.
    pub fn new(length: u32, binning: &Binning) -> EstimateResult<Self> {
        Self::from_points(points(length, binning))
    }

    fn from_points(points: Vec<Point>) -> EstimateResult<Self> {
        let (sigma_end, sigma_line) = fit_segment(&points, 0)?;
        let (_, omega_line) = fit_segment(&points, sigma_end)?;

        let omega_estimate = -omega_line.m;
        let sigma_estimate = -sigma_line.m;
        let slope_gap = omega_line.m - sigma_line.m;
        if slope_gap.abs() < 1e-12 {
            return Err(EstimateError::ParallelSegments { slope: sigma_line.m });
        }
        let intersection_y =
            omega_line.m * (sigma_line.b - omega_line.b) / slope_gap + omega_line.b;
        let npop_estimate = 2f64.powf(intersection_y).round() as i64;

        Ok(Self {
            estimate: ParameterSet::new(omega_estimate, sigma_estimate, npop_estimate, 0.0),
            sigma_line,
            omega_line,
        })
    }

    /// The seed parameter set (likelihood 0).
    pub fn estimate(&self) -> &ParameterSet {
        &self.estimate
    }

    /// The line fit to the first (periodic selection) segment.
    pub fn sigma_line(&self) -> &Line {
        &self.sigma_line
    }

    /// The line fit to the second (ecotype formation) segment.
    pub fn omega_line(&self) -> &Line {
        &self.omega_line
    }
}

/// Transform the binning curve into the point cloud the segments are fit to.
pub fn points(length: u32, binning: &Binning) -> Vec<Point> {
    let mut out = Vec::new();
    // Tracks the last emitted level, so a level reappearing after a dropped
    // singleton still counts as a duplicate.
    let mut previous = 0u32;
    for bin in binning.bins() {
        let level = bin.level();
        if level == 1 || level == previous {
            continue;
        }
        out.push(Point {
            x: (1.0 - bin.crit()) * f64::from(length),
            y: f64::from(level).log2(),
        });
        previous = level;
    }
    out
}

/// Grow one segment greedily from `start` and fit its line.
///
/// Returns the exclusive end index of the segment (the first point whose
/// squared perpendicular error against the initial two-point line exceeds
/// [`MAX_SEGMENT_ERROR`], or the end of the points) and the least-squares
/// line over the whole segment.
fn fit_segment(points: &[Point], start: usize) -> EstimateResult<(usize, Line)> {
    if points.len() < start + 2 {
        return Err(EstimateError::NotEnoughPoints {
            start,
            found: points.len().saturating_sub(start),
        });
    }
    let line = Line::fit(&points[start..start + 2])?;
    let mut end = start + 2;
    while end < points.len() && line.squared_error(&points[end]) <= MAX_SEGMENT_ERROR {
        end += 1;
    }
    Ok((end, Line::fit(&points[start..end])?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::{BinLevel, Binning};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Point construction (drop level 1, collapse duplicates, transforms).
    // - Slope recovery on a synthetic two-segment dataset.
    // - The parallel-segments domain error.
    // - A binning-curve example producing finite estimates end to end.
    // -------------------------------------------------------------------------

    fn curve(levels: &[(f64, u32)]) -> Binning {
        let bins = levels
            .iter()
            .map(|&(crit, level)| BinLevel::new(crit, level).unwrap())
            .collect();
        Binning::new(bins).unwrap()
    }

    #[test]
    fn points_drop_singletons_and_duplicates() {
        let binning = curve(&[(1.0, 1), (0.98, 4), (0.95, 4), (0.90, 9), (0.80, 9)]);
        let points = points(1000, &binning);
        assert_eq!(points.len(), 2);
        assert!((points[0].x - 20.0).abs() < 1e-9);
        assert!((points[0].y - 2.0).abs() < 1e-9);
        assert!((points[1].x - 100.0).abs() < 1e-9);
        assert!((points[1].y - 9f64.log2()).abs() < 1e-9);
    }

    #[test]
    fn points_come_out_in_ascending_x() {
        let binning = curve(&[(0.80, 16), (0.98, 2), (0.90, 7)]);
        let points = points(500, &binning);
        assert!(points.windows(2).all(|w| w[0].x < w[1].x));
    }

    #[test]
    fn recovers_known_slopes_and_intersection() {
        // First segment on y = 4 - 0.1 x, second on slope -0.002. The first
        // off-segment point sits ~0.9 below the sigma line, well past the
        // segment error threshold.
        let points = vec![
            Point { x: 0.0, y: 4.0 },
            Point { x: 10.0, y: 3.0 },
            Point { x: 20.0, y: 2.0 },
            Point { x: 30.0, y: 1.9 },
            Point { x: 40.0, y: 1.88 },
            Point { x: 50.0, y: 1.86 },
        ];
        let fit = ParameterEstimate::from_points(points).unwrap();
        assert!((fit.estimate().sigma() - 0.1).abs() < 1e-9);
        assert!((fit.estimate().omega() - 0.002).abs() < 1e-9);

        // Analytic intersection of the two fitted lines.
        let (sigma, omega) = (fit.sigma_line(), fit.omega_line());
        let x_star = (sigma.b - omega.b) / (omega.m - sigma.m);
        let y_star = omega.m * x_star + omega.b;
        assert_eq!(fit.estimate().npop(), 2f64.powf(y_star).round() as i64);
        assert_eq!(fit.estimate().npop(), 4);
    }

    #[test]
    fn parallel_segments_are_a_domain_error() {
        // Same slope on both sides of a vertical jump.
        let points = vec![
            Point { x: 0.0, y: 4.0 },
            Point { x: 10.0, y: 3.0 },
            Point { x: 20.0, y: 2.0 },
            Point { x: 30.0, y: 0.0 },
            Point { x: 40.0, y: -1.0 },
            Point { x: 50.0, y: -2.0 },
        ];
        assert!(matches!(
            ParameterEstimate::from_points(points),
            Err(EstimateError::ParallelSegments { .. })
        ));
    }

    #[test]
    fn segment_needs_two_points() {
        let points = vec![Point { x: 0.0, y: 4.0 }, Point { x: 10.0, y: 3.0 }];
        // The first segment consumes everything; the second has nothing left.
        assert_eq!(
            ParameterEstimate::from_points(points),
            Err(EstimateError::NotEnoughPoints { start: 2, found: 0 })
        );
    }

    #[test]
    fn example_curve_yields_finite_estimate() {
        let binning = curve(&[
            (1.00, 1),
            (0.98, 4),
            (0.95, 4),
            (0.90, 9),
            (0.85, 11),
            (0.80, 13),
        ]);
        let fit = ParameterEstimate::new(1000, &binning).unwrap();
        assert!(fit.estimate().omega().is_finite());
        assert!(fit.estimate().sigma().is_finite());
        assert!(fit.estimate().npop() > 0);
    }
}
