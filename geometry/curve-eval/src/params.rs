//! Tunable parameters for the numerical routines.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for adaptive Gauss–Kronrod integration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QuadratureParams {
    /// Absolute error tolerance between the Gauss and Kronrod estimates
    /// below which an interval is accepted. Default: 1e-6
    pub tolerance: f64,

    /// Maximum bisection depth. Intervals at this depth are accepted
    /// regardless of error. Default: 10
    pub max_depth: usize,
}

impl Default for QuadratureParams {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_depth: 10,
        }
    }
}

impl QuadratureParams {
    /// Set the absolute tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the maximum recursion depth.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Parameters for the safeguarded Newton solver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RootParams {
    /// Residual magnitude accepted as converged. Default: 1e-10
    pub tolerance: f64,

    /// Maximum number of Newton/bisection steps. Default: 10
    pub max_iterations: usize,
}

impl Default for RootParams {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 10,
        }
    }
}

impl RootParams {
    /// Set the residual tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the iteration cap.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Parameters for building an arc-length reparameterization.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArcLengthParams {
    /// Lower bound on the number of table segments. Default: 10
    pub min_segments: usize,

    /// Upper bound on the number of table segments. Default: 50
    pub max_segments: usize,

    /// Segments requested per unit of total arc length, before clamping
    /// to `[min_segments, max_segments]`. Default: 1.0
    pub segments_per_unit_length: f64,

    /// Integration parameters for the table and for refinement.
    pub quadrature: QuadratureParams,

    /// Root finder parameters for inversion.
    pub root: RootParams,
}

impl Default for ArcLengthParams {
    fn default() -> Self {
        Self {
            min_segments: 10,
            max_segments: 50,
            segments_per_unit_length: 1.0,
            quadrature: QuadratureParams::default(),
            root: RootParams::default(),
        }
    }
}

impl ArcLengthParams {
    /// Set the segment count bounds.
    ///
    /// `max` is raised to `min` if given smaller, and `min` is at least 1.
    #[must_use]
    pub fn with_segment_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_segments = min.max(1);
        self.max_segments = max.max(self.min_segments);
        self
    }

    /// Set the segment density.
    #[must_use]
    pub const fn with_segments_per_unit_length(mut self, density: f64) -> Self {
        self.segments_per_unit_length = density;
        self
    }

    /// Set the integration parameters.
    #[must_use]
    pub const fn with_quadrature(mut self, quadrature: QuadratureParams) -> Self {
        self.quadrature = quadrature;
        self
    }

    /// Set the root finder parameters.
    #[must_use]
    pub const fn with_root(mut self, root: RootParams) -> Self {
        self.root = root;
        self
    }

    /// Number of table segments for a curve of the given total length.
    #[must_use]
    pub fn segment_count(&self, total_length: f64) -> usize {
        let requested = (total_length.abs() * self.segments_per_unit_length).ceil();
        let requested = if requested.is_finite() && requested > 0.0 {
            requested as usize
        } else {
            0
        };
        // Fields are public, so min may exceed max; min wins
        requested.min(self.max_segments).max(self.min_segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let q = QuadratureParams::default();
        assert!((q.tolerance - 1e-6).abs() < 1e-12);
        assert_eq!(q.max_depth, 10);

        let r = RootParams::default();
        assert_eq!(r.max_iterations, 10);

        let a = ArcLengthParams::default();
        assert_eq!(a.min_segments, 10);
        assert_eq!(a.max_segments, 50);
    }

    #[test]
    fn test_builders() {
        let q = QuadratureParams::default().with_max_depth(16).with_tolerance(1e-9);
        assert_eq!(q.max_depth, 16);
        assert!((q.tolerance - 1e-9).abs() < 1e-15);

        let r = RootParams::default().with_max_iterations(25);
        assert_eq!(r.max_iterations, 25);
    }

    #[test]
    fn test_segment_count_clamping() {
        let a = ArcLengthParams::default();
        assert_eq!(a.segment_count(0.0), 10);
        assert_eq!(a.segment_count(3.2), 10);
        assert_eq!(a.segment_count(22.5), 23);
        assert_eq!(a.segment_count(1e6), 50);
        assert_eq!(a.segment_count(f64::NAN), 10);
    }

    #[test]
    fn test_segment_bounds_ordering() {
        let a = ArcLengthParams::default().with_segment_bounds(20, 5);
        assert_eq!(a.min_segments, 20);
        assert_eq!(a.max_segments, 20);
    }

    #[test]
    fn test_segment_count_inverted_fields() {
        let a = ArcLengthParams {
            min_segments: 20,
            max_segments: 5,
            ..ArcLengthParams::default()
        };
        assert_eq!(a.segment_count(0.0), 20);
        assert_eq!(a.segment_count(12.0), 20);
        assert_eq!(a.segment_count(1e6), 20);
    }
}
