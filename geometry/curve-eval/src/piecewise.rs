//! Curves joined end to end.

use std::fmt;
use std::sync::OnceLock;

use crate::{CurveError, CurveEvaluator, Point, Result};

/// A boxed sub-curve that can be shared across threads.
pub type BoxedCurve = Box<dyn CurveEvaluator + Send + Sync>;

/// A sequence of sub-curves evaluated as one curve over `[0, N]`.
///
/// Parameter `u` selects sub-curve `floor(u)` (clamped to the valid range)
/// and maps the fractional part linearly onto that sub-curve's own domain.
/// Sub-curves are not required to meet; continuity is up to the caller.
///
/// Whole sub-curve lengths are computed once, on the first arc-length query.
///
/// # Example
///
/// ```
/// use curve_eval::{BSplineCurve, CurveEvaluator, PiecewiseCurve, point};
///
/// let a = BSplineCurve::new(vec![point(&[0.0, 0.0]), point(&[1.0, 0.0])], vec![0.0, 0.0, 1.0, 1.0]).unwrap();
/// let b = BSplineCurve::new(vec![point(&[1.0, 0.0]), point(&[1.0, 2.0])], vec![0.0, 0.0, 1.0, 1.0]).unwrap();
///
/// let path = PiecewiseCurve::new(vec![Box::new(a), Box::new(b)]).unwrap();
/// assert_eq!(path.end_points(), (0.0, 2.0));
/// assert!((path.evaluate(1.5)[1] - 1.0).abs() < 1e-12);
/// assert!((path.total_length() - 3.0).abs() < 1e-9);
/// ```
pub struct PiecewiseCurve {
    curves: Vec<BoxedCurve>,
    /// `lengths[i]` is the total length of sub-curves `0..i`.
    lengths: OnceLock<Vec<f64>>,
}

impl PiecewiseCurve {
    /// Join `curves` in order.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidConfiguration`] if `curves` is empty.
    pub fn new(curves: Vec<BoxedCurve>) -> Result<Self> {
        if curves.is_empty() {
            return Err(CurveError::invalid_configuration(
                "piecewise curve needs at least one sub-curve",
            ));
        }
        Ok(Self {
            curves,
            lengths: OnceLock::new(),
        })
    }

    /// Append a sub-curve, extending the domain by one.
    pub fn push(&mut self, curve: BoxedCurve) {
        self.curves.push(curve);
        self.lengths = OnceLock::new();
    }

    /// Number of sub-curves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Always false for a constructed curve.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// The sub-curve at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&BoxedCurve> {
        self.curves.get(index)
    }

    /// Sub-curve index, its local parameter, and its domain width.
    fn locate(&self, u: f64) -> (usize, f64, f64) {
        let last = self.curves.len() - 1;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = (u.floor().max(0.0) as usize).min(last);
        let frac = u - index as f64;
        let (start, end) = self.curves[index].end_points();
        let width = end - start;
        (index, start + frac * width, width)
    }

    fn running_lengths(&self) -> &[f64] {
        self.lengths.get_or_init(|| {
            let mut total = 0.0;
            let mut lengths = Vec::with_capacity(self.curves.len() + 1);
            lengths.push(total);
            for curve in &self.curves {
                total += curve.total_length();
                lengths.push(total);
            }
            lengths
        })
    }
}

impl CurveEvaluator for PiecewiseCurve {
    fn evaluate(&self, u: f64) -> Point {
        let (index, t, _) = self.locate(u);
        self.curves[index].evaluate(t)
    }

    fn end_points(&self) -> (f64, f64) {
        (0.0, self.curves.len() as f64)
    }

    fn velocity(&self, u: f64) -> Point {
        let (index, t, width) = self.locate(u);
        self.curves[index].velocity(t) * width
    }

    fn accel(&self, u: f64) -> Point {
        let (index, t, width) = self.locate(u);
        self.curves[index].accel(t) * (width * width)
    }

    fn jerk(&self, u: f64) -> Point {
        let (index, t, width) = self.locate(u);
        self.curves[index].jerk(t) * (width * width * width)
    }

    fn arc_length(&self, u: f64) -> f64 {
        let (index, t, _) = self.locate(u);
        self.running_lengths()[index] + self.curves[index].arc_length(t)
    }

    fn total_length(&self) -> f64 {
        self.running_lengths()[self.curves.len()]
    }
}

impl fmt::Debug for PiecewiseCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PiecewiseCurve")
            .field("curves", &self.curves.len())
            .field("lengths", &self.lengths.get())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::BSplineCurve;
    use crate::point::point;
    use approx::assert_relative_eq;

    fn line(from: [f64; 2], to: [f64; 2], knots: [f64; 2]) -> BoxedCurve {
        Box::new(
            BSplineCurve::new(
                vec![point(&from), point(&to)],
                vec![knots[0], knots[0], knots[1], knots[1]],
            )
            .unwrap(),
        )
    }

    fn elbow() -> PiecewiseCurve {
        PiecewiseCurve::new(vec![
            line([0.0, 0.0], [2.0, 0.0], [0.0, 1.0]),
            // Domain [0, 4] exercises the width scaling
            line([2.0, 0.0], [2.0, 3.0], [0.0, 4.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_rejected() {
        let err = PiecewiseCurve::new(Vec::new()).unwrap_err();
        assert!(err.is_invalid_configuration());
    }

    #[test]
    fn test_dispatch() {
        let path = elbow();
        assert_eq!(path.len(), 2);
        assert_eq!(path.end_points(), (0.0, 2.0));
        assert_relative_eq!(path.evaluate(0.0), point(&[0.0, 0.0]));
        assert_relative_eq!(path.evaluate(0.5), point(&[1.0, 0.0]), epsilon = 1e-12);
        assert_relative_eq!(path.evaluate(1.0), point(&[2.0, 0.0]), epsilon = 1e-12);
        assert_relative_eq!(path.evaluate(1.5), point(&[2.0, 1.5]), epsilon = 1e-12);
        assert_relative_eq!(path.evaluate(2.0), point(&[2.0, 3.0]), epsilon = 1e-12);
        // Outside the domain clamps to the end sub-curves
        assert_relative_eq!(path.evaluate(7.0), point(&[2.0, 3.0]), epsilon = 1e-12);
        assert_relative_eq!(path.evaluate(-1.0), point(&[0.0, 0.0]), epsilon = 1e-12);
    }

    #[test]
    fn test_derivatives_scale_with_width() {
        let path = elbow();
        assert_relative_eq!(path.velocity(0.5), point(&[2.0, 0.0]), epsilon = 1e-12);
        assert_relative_eq!(path.velocity(1.5), point(&[0.0, 3.0]), epsilon = 1e-12);
        assert_relative_eq!(path.accel(1.5), point(&[0.0, 0.0]), epsilon = 1e-12);

        let h = 1e-6;
        let fd = (path.evaluate(1.5 + h) - path.evaluate(1.5 - h)) / (2.0 * h);
        assert_relative_eq!(path.velocity(1.5), fd, epsilon = 1e-6);
    }

    #[test]
    fn test_arc_length() {
        let path = elbow();
        assert_relative_eq!(path.arc_length(0.0), 0.0);
        assert_relative_eq!(path.arc_length(0.5), 1.0, epsilon = 1e-9);
        assert_relative_eq!(path.arc_length(1.0), 2.0, epsilon = 1e-9);
        assert_relative_eq!(path.arc_length(1.5), 3.5, epsilon = 1e-9);
        assert_relative_eq!(path.total_length(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_push_resets_lengths() {
        let mut path = elbow();
        assert_relative_eq!(path.total_length(), 5.0, epsilon = 1e-9);
        path.push(line([2.0, 3.0], [0.0, 3.0], [0.0, 1.0]));
        assert_eq!(path.end_points(), (0.0, 3.0));
        assert_relative_eq!(path.total_length(), 7.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reparameterized_by_length() {
        let path = elbow();
        let g = path.to_arc_length_param();
        assert_relative_eq!(g.total_length(), 5.0, epsilon = 1e-9);
        assert_relative_eq!(g.evaluate(3.0), point(&[2.0, 1.0]), epsilon = 1e-6);
    }
}
