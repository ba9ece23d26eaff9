//! Non-uniform rational B-spline (NURBS) constructors.
//!
//! NURBS extend B-splines by adding weights to control points, which allows
//! exact representation of conic sections. A NURBS curve is defined as:
//!
//! ```text
//! C(u) = Σ N_i,p(u) * w_i * P_i / Σ N_i,p(u) * w_i
//! ```
//!
//! [`BSplineCurve`] stores the weighted points `(w·P_i, w_i)` directly;
//! these constructors build that homogeneous form from Cartesian input.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::{BSplineCurve, CurveError, Point, Result};

impl BSplineCurve {
    /// Create a NURBS curve from Cartesian control points and weights.
    ///
    /// - Weight = 1.0: Standard B-spline behavior
    /// - Weight > 1.0: Curve is pulled toward the control point
    /// - Weight < 1.0: Curve is pushed away from the control point
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidConfiguration`] if the counts differ or
    /// any weight is not positive and finite, plus everything
    /// [`BSplineCurve::rational`] rejects.
    ///
    /// # Example
    ///
    /// ```
    /// use curve_eval::{BSplineCurve, CurveEvaluator, point};
    ///
    /// let points = vec![point(&[0.0, 0.0]), point(&[1.0, 2.0]), point(&[2.0, 0.0])];
    /// let plain = BSplineCurve::new(points.clone(), vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
    /// let heavy = BSplineCurve::from_weighted(points, vec![1.0, 4.0, 1.0], vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
    ///
    /// // A heavier middle weight pulls the curve toward (1, 2)
    /// assert!(heavy.evaluate(0.5)[1] > plain.evaluate(0.5)[1]);
    /// ```
    pub fn from_weighted(points: Vec<Point>, weights: Vec<f64>, knots: Vec<f64>) -> Result<Self> {
        if weights.len() != points.len() {
            return Err(CurveError::invalid_configuration(format!(
                "control points ({}) and weights ({}) must have same length",
                points.len(),
                weights.len()
            )));
        }

        if let Some(i) = weights.iter().position(|w| !(w.is_finite() && *w > 0.0)) {
            return Err(CurveError::invalid_configuration(format!(
                "weight {} at index {i} must be positive",
                weights[i]
            )));
        }

        let homogeneous = points
            .iter()
            .zip(&weights)
            .map(|(p, &w)| (p * w).push(w))
            .collect();

        Self::rational(homogeneous, knots)
    }

    /// Create an exact 2D circular arc centered at the origin.
    ///
    /// The arc runs from `start_angle` to `end_angle` (radians, positive is
    /// counter-clockwise) over the domain `[0, 1]`. It is split into
    /// quadratic pieces of at most 90° each. A sweep of `±2π` gives the full
    /// circle.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidConfiguration`] if the radius is not
    /// positive, the angles are equal, or the sweep exceeds a full turn.
    ///
    /// # Example
    ///
    /// ```
    /// use curve_eval::{BSplineCurve, CurveEvaluator};
    /// use std::f64::consts::PI;
    ///
    /// let arc = BSplineCurve::circular_arc(1.0, 0.0, PI).unwrap();
    ///
    /// // Points on the arc are exactly on the circle
    /// let mid = arc.evaluate(0.5);
    /// assert!(mid[0].abs() < 1e-10);
    /// assert!((mid[1] - 1.0).abs() < 1e-10);
    /// ```
    pub fn circular_arc(radius: f64, start_angle: f64, end_angle: f64) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(CurveError::invalid_configuration(format!(
                "radius must be positive, got {radius}"
            )));
        }

        let sweep = end_angle - start_angle;
        if !sweep.is_finite() || sweep.abs() < 1e-10 {
            return Err(CurveError::invalid_configuration(
                "start and end angles are equal",
            ));
        }
        if sweep.abs() > TAU + 1e-12 {
            return Err(CurveError::invalid_configuration(format!(
                "sweep {sweep} exceeds a full turn"
            )));
        }

        // At most 90° per piece keeps the middle weight well above zero
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let num_arcs = ((sweep.abs() / FRAC_PI_2 - 1e-9).ceil() as usize).max(1);
        let arc_angle = sweep / num_arcs as f64;

        // Weight for the middle control points
        let w1 = (arc_angle / 2.0).cos();
        let on_circle = |angle: f64, r: f64| Point::from_column_slice(&[angle.cos() * r, angle.sin() * r]);

        let mut points = Vec::with_capacity(2 * num_arcs + 1);
        let mut weights = Vec::with_capacity(2 * num_arcs + 1);
        points.push(on_circle(start_angle, radius));
        weights.push(1.0);

        for i in 0..num_arcs {
            let a0 = start_angle + arc_angle * i as f64;
            // Middle control point (intersection of tangent lines)
            points.push(on_circle(a0 + arc_angle / 2.0, radius / w1));
            weights.push(w1);
            points.push(on_circle(a0 + arc_angle, radius));
            weights.push(1.0);
        }

        // Clamped quadratic, interior knots doubled at each piece boundary
        let mut knots = vec![0.0; 3];
        for i in 1..num_arcs {
            let u = i as f64 / num_arcs as f64;
            knots.push(u);
            knots.push(u);
        }
        knots.extend([1.0; 3]);

        Self::from_weighted(points, weights, knots)
    }
}
