//! Arc-length reparameterization.
//!
//! A curve's native parameter rarely moves at constant speed. The
//! reparameterized view maps a distance `s` along the curve back to the
//! native parameter, so evaluating at evenly spaced `s` gives evenly spaced
//! points.
//!
//! Inversion uses a table of segments built once at construction. A lookup
//! binary-searches the table for the segment containing `s`, then refines
//! with a safeguarded Newton iteration seeded by linear interpolation.

use tracing::debug;

use crate::{ArcLengthParams, CurveEvaluator, Point, Quadrature, RootFinder};

/// One entry of the arc-length table.
///
/// Arc lengths are measured from the start of the source curve's domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSegment {
    /// Arc length at `param_start`.
    pub arc_start: f64,
    /// Arc length at `param_end`.
    pub arc_end: f64,
    /// Native parameter at the segment start.
    pub param_start: f64,
    /// Native parameter at the segment end.
    pub param_end: f64,
}

/// A curve parameterized by arc length over `[0, total_length]`.
///
/// # Example
///
/// ```
/// use curve_eval::{BSplineCurve, CurveEvaluator, point};
///
/// let curve = BSplineCurve::new(
///     vec![point(&[0.0, 0.0]), point(&[1.0, 2.0]), point(&[2.0, 0.0])],
///     vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
/// )
/// .unwrap();
///
/// let by_length = curve.to_arc_length_param();
/// let (_, total) = by_length.end_points();
/// assert!((total - curve.total_length()).abs() < 1e-6);
///
/// // Moving along by distance gives unit speed
/// assert!((by_length.velocity(0.3 * total).norm() - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct ArcLengthReparam<C> {
    inner: C,
    params: ArcLengthParams,
    segments: Vec<ArcSegment>,
    total_length: f64,
}

impl<C: CurveEvaluator> ArcLengthReparam<C> {
    /// Build the reparameterization with default parameters.
    pub fn new(inner: C) -> Self {
        Self::with_params(inner, ArcLengthParams::default())
    }

    /// Build the reparameterization with custom parameters.
    pub fn with_params(inner: C, params: ArcLengthParams) -> Self {
        let quad = Quadrature::new(params.quadrature);
        let (start, end) = inner.end_points();
        let sign = direction(start, end);
        let speed = |t: f64| inner.speed(t);

        // Lengths are positive whichever way the domain runs
        let estimate = sign * quad.integrate(speed, start, end);
        let count = params.segment_count(estimate).max(1);
        let step = (end - start) / count as f64;

        let mut segments = Vec::with_capacity(count);
        let mut arc = 0.0;
        for i in 0..count {
            let param_start = start + step * i as f64;
            let param_end = if i + 1 == count { end } else { start + step * (i + 1) as f64 };
            let length = sign * quad.integrate(speed, param_start, param_end);
            segments.push(ArcSegment {
                arc_start: arc,
                arc_end: arc + length,
                param_start,
                param_end,
            });
            arc += length;
        }

        debug!(
            segments = count,
            total_length = arc,
            "Built arc-length table"
        );

        Self {
            inner,
            params,
            segments,
            total_length: arc,
        }
    }

    /// The source curve.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Consume the view and return the source curve.
    pub fn into_inner(self) -> C {
        self.inner
    }

    /// The arc-length table, in order of travel from the domain start.
    pub fn segments(&self) -> &[ArcSegment] {
        &self.segments
    }

    /// The parameters used to build and invert the table.
    pub fn params(&self) -> &ArcLengthParams {
        &self.params
    }

    /// Native parameter of the source curve at arc length `s`.
    ///
    /// Values of `s` slightly outside `[0, total_length]` extrapolate past
    /// the domain ends instead of failing. Domains with `end < start` are
    /// walked from `start` as well.
    pub fn get_coordinate(&self, s: f64) -> f64 {
        let (start, end) = self.inner.end_points();
        let sign = direction(start, end);
        if self.total_length <= 0.0 || s.is_nan() {
            return if s.is_nan() { s } else { start };
        }

        let last = self.segments.len() - 1;
        let index = self
            .segments
            .partition_point(|seg| seg.arc_end < s)
            .min(last);
        let seg = self.segments[index];

        // The solver works on x = sign * t, along which arc length never decreases
        let (lower, upper) = if s < 0.0 {
            (None, Some(sign * start))
        } else if s > self.total_length {
            (Some(sign * end), None)
        } else {
            (Some(sign * seg.param_start), Some(sign * seg.param_end))
        };

        let span = seg.arc_end - seg.arc_start;
        let frac = if span > 0.0 { (s - seg.arc_start) / span } else { 0.0 };
        let guess = seg.param_start + frac * (seg.param_end - seg.param_start);

        let quad = Quadrature::new(self.params.quadrature);
        let root = RootFinder::new(self.params.root);
        let x = root.solve(
            |x| {
                seg.arc_start
                    + sign * quad.integrate(|t| self.inner.speed(t), seg.param_start, sign * x)
            },
            |x| self.inner.speed(sign * x),
            s,
            sign * guess,
            lower,
            upper,
        );
        sign * x
    }
}

/// `-1` when the domain runs backwards, `1` otherwise.
fn direction(start: f64, end: f64) -> f64 {
    if end < start { -1.0 } else { 1.0 }
}

impl<C: CurveEvaluator> CurveEvaluator for ArcLengthReparam<C> {
    fn evaluate(&self, s: f64) -> Point {
        self.inner.evaluate(self.get_coordinate(s))
    }

    fn end_points(&self) -> (f64, f64) {
        (0.0, self.total_length)
    }

    /// Unit tangent of the source curve, since `dt/ds = 1 / speed`.
    fn velocity(&self, s: f64) -> Point {
        self.inner.tangent(self.get_coordinate(s))
    }

    fn accel(&self, s: f64) -> Point {
        let t = self.get_coordinate(s);
        let v = self.inner.velocity(t);
        let speed_sq = v.norm_squared();
        if speed_sq == 0.0 {
            return Point::zeros(v.len());
        }
        let a = self.inner.accel(t);
        // d²C/ds² = a / |v|² - v (v·a) / |v|⁴
        &a / speed_sq - &v * (v.dot(&a) / (speed_sq * speed_sq))
    }

    fn speed(&self, _s: f64) -> f64 {
        1.0
    }

    fn arc_length(&self, s: f64) -> f64 {
        s
    }

    fn total_length(&self) -> f64 {
        self.total_length
    }
}
