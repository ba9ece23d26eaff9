//! Knot insertion and curve splitting.
//!
//! Inserting a knot refines the control polygon without changing the curve.
//! Raising the multiplicity of `t` to the degree makes the curve pass through
//! a single control point there, after which the control polygon and knot
//! vector partition into two independent curves.

use tracing::debug;

use crate::{BSplineCurve, CurveError, CurveEvaluator, KnotVector, Point, Result};

impl BSplineCurve {
    /// Split the curve at `t` into the parts before and after it.
    ///
    /// Returns `(None, Some(self))` when `t` is at or before the domain
    /// start and `(Some(self), None)` when it is at or after the end.
    /// Otherwise both halves are clamped at `t`: the left one covers
    /// `[start, t]`, the right one `[t, end]`, and they meet exactly.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidSplitParameter`] if `t` is NaN or the
    /// knot span around `t` is degenerate.
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
    /// let (left, right) = curve.split(0.5).unwrap();
    /// let (left, right) = (left.unwrap(), right.unwrap());
    /// assert_eq!(left.end_points(), (0.0, 0.5));
    /// assert!((left.evaluate(0.5) - right.evaluate(0.5)).norm() < 1e-12);
    /// ```
    pub fn split(&self, t: f64) -> Result<(Option<Self>, Option<Self>)> {
        if t.is_nan() {
            return Err(CurveError::invalid_split(t, "parameter is NaN"));
        }

        let (start, end) = self.end_points();
        if t <= start {
            return Ok((None, Some(self.clone())));
        }
        if t >= end {
            return Ok((Some(self.clone()), None));
        }

        let p = self.degree();
        let knots = self.knots();
        let span = knots.find_span(t);
        let s = knots.multiplicity(t);
        let r = p.saturating_sub(s);

        let (new_knots, points) = insert(knots, self.control_points(), t, span, s, r)?;

        // The run of t in the refined vector starts where it did before insertion
        let first = span + 1 - s;
        let last = first + p.max(s);
        let clamp = std::iter::repeat(t).take(p + 1);

        let left_knots: Vec<f64> = new_knots[..first].iter().copied().chain(clamp.clone()).collect();
        let right_knots: Vec<f64> = clamp.chain(new_knots[last..].iter().copied()).collect();
        let right_count = new_knots.len() - last;

        let left = self.with_parts(points[..first].to_vec(), left_knots, t)?;
        let right = self.with_parts(points[points.len() - right_count..].to_vec(), right_knots, t)?;

        debug!(
            t,
            inserted = r,
            left_points = left.control_points().len(),
            right_points = right.control_points().len(),
            "Split curve"
        );

        Ok((Some(left), Some(right)))
    }

    /// Insert `t` into the knot vector once, leaving the shape unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidSplitParameter`] if `t` is not strictly
    /// inside the domain, or already has multiplicity equal to the degree.
    pub fn insert_knot(&self, t: f64) -> Result<Self> {
        let (start, end) = self.end_points();
        if !(t > start && t < end) {
            return Err(CurveError::invalid_split(
                t,
                format!("outside domain [{start}, {end}]"),
            ));
        }

        let p = self.degree();
        let knots = self.knots();
        let s = knots.multiplicity(t);
        if s >= p {
            return Err(CurveError::invalid_split(
                t,
                format!("knot already has multiplicity {s} for degree {p}"),
            ));
        }

        let (new_knots, points) = insert(knots, self.control_points(), t, knots.find_span(t), s, 1)?;
        self.with_parts(points, new_knots, t)
    }

    fn with_parts(&self, points: Vec<Point>, knots: Vec<f64>, t: f64) -> Result<Self> {
        let knots = KnotVector::new(knots, self.degree())
            .map_err(|e| CurveError::invalid_split(t, e.to_string()))?;
        Ok(Self::from_parts(points, knots, self.is_rational(), self.divides()))
    }
}

/// Insert `u` (multiplicity `s`, in span `k`) `r` times.
///
/// Requires `r + s <= p` or `r == 0`. Returns the refined knots and control
/// points.
fn insert(
    knots: &KnotVector,
    points: &[Point],
    u: f64,
    k: usize,
    s: usize,
    r: usize,
) -> Result<(Vec<f64>, Vec<Point>)> {
    let uk = knots.as_slice();
    if r == 0 {
        return Ok((uk.to_vec(), points.to_vec()));
    }

    let p = knots.degree();
    let n = points.len();

    let mut new_knots = Vec::with_capacity(uk.len() + r);
    new_knots.extend_from_slice(&uk[..=k]);
    new_knots.extend(std::iter::repeat(u).take(r));
    new_knots.extend_from_slice(&uk[k + 1..]);

    // Unaffected points keep their values, shifted by r past the window
    let dim = points[0].len();
    let mut q = vec![Point::zeros(dim); n + r];
    q[..=k - p].clone_from_slice(&points[..=k - p]);
    q[k - s + r..].clone_from_slice(&points[k - s..]);

    // Blending reads the previous pass while writing the next, so it works
    // on a copy of the affected window instead of `q` itself
    let mut rw: Vec<Point> = points[k - p..=k - s].to_vec();

    let mut l = k - p;
    for j in 1..=r {
        l = k - p + j;
        for i in 0..=p - j - s {
            let denom = uk[i + k + 1] - uk[l + i];
            if denom == 0.0 {
                return Err(CurveError::invalid_split(u, "degenerate knot span"));
            }
            let alpha = (u - uk[l + i]) / denom;
            rw[i] = &rw[i + 1] * alpha + &rw[i] * (1.0 - alpha);
        }
        q[l] = rw[0].clone();
        q[k + r - j - s] = rw[p - j - s].clone();
    }

    for i in l + 1..k - s {
        q[i] = rw[i - l].clone();
    }

    Ok((new_knots, q))
}
