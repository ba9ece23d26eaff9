//! Domain remapping views.

use crate::{CurveEvaluator, Point};

/// A curve whose domain is linearly remapped onto `[start, end]`.
///
/// The source curve is not copied. Derivatives are scaled by the chain
/// rule and arc length is measured from the new domain start. Giving
/// `end < start` gives a decreasing parameter, so derivatives change sign.
///
/// # Example
///
/// ```
/// use curve_eval::{BSplineCurve, CurveEvaluator, point};
///
/// let curve = BSplineCurve::new(
///     vec![point(&[0.0, 0.0]), point(&[4.0, 0.0])],
///     vec![0.0, 0.0, 1.0, 1.0],
/// )
/// .unwrap();
///
/// let fitted = curve.fit_range(10.0, 20.0);
/// assert_eq!(fitted.end_points(), (10.0, 20.0));
/// assert!((fitted.evaluate(15.0)[0] - 2.0).abs() < 1e-12);
/// assert!((fitted.velocity(15.0)[0] - 0.4).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FitRange<C> {
    inner: C,
    start: f64,
    end: f64,
}

impl<C: CurveEvaluator> FitRange<C> {
    /// Remap `curve` onto `[start, end]`.
    ///
    /// A zero-width range maps every parameter to the source's start.
    pub fn new(curve: C, start: f64, end: f64) -> Self {
        Self {
            inner: curve,
            start,
            end,
        }
    }

    /// The source curve.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// `d(source parameter) / d(parameter)`.
    fn scale(&self) -> f64 {
        let (a, b) = self.inner.end_points();
        let width = self.end - self.start;
        if width == 0.0 { 0.0 } else { (b - a) / width }
    }

    fn to_inner(&self, t: f64) -> f64 {
        let (a, _) = self.inner.end_points();
        a + (t - self.start) * self.scale()
    }
}

impl<C: CurveEvaluator> CurveEvaluator for FitRange<C> {
    fn evaluate(&self, t: f64) -> Point {
        self.inner.evaluate(self.to_inner(t))
    }

    fn end_points(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    fn velocity(&self, t: f64) -> Point {
        self.inner.velocity(self.to_inner(t)) * self.scale()
    }

    fn accel(&self, t: f64) -> Point {
        let k = self.scale();
        self.inner.accel(self.to_inner(t)) * (k * k)
    }

    fn jerk(&self, t: f64) -> Point {
        let k = self.scale();
        self.inner.jerk(self.to_inner(t)) * (k * k * k)
    }

    fn tangent(&self, t: f64) -> Point {
        let tangent = self.inner.tangent(self.to_inner(t));
        if self.scale() < 0.0 { -tangent } else { tangent }
    }

    fn normal(&self, t: f64) -> Point {
        self.inner.normal(self.to_inner(t))
    }

    fn curvature(&self, t: f64) -> f64 {
        self.inner.curvature(self.to_inner(t))
    }

    fn arc_length(&self, t: f64) -> f64 {
        // The new start maps to the source start
        self.inner.arc_length(self.to_inner(t))
    }

    fn total_length(&self) -> f64 {
        self.inner.total_length()
    }
}
