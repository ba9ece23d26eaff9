//! B-spline curves.
//!
//! B-splines provide local control through a knot vector. Changes to a
//! control point only affect a local portion of the curve. Rational curves
//! store homogeneous control points and divide by the weight after
//! blending, which lets them represent conics exactly.

use crate::basis::BasisEvaluator;
use crate::bezier::{self, MAX_FAST_DEGREE};
use crate::point::{homogeneous_divide, rational_derivative, rational_second_derivative};
use crate::traits::differentiate;
use crate::{CurveError, CurveEvaluator, KnotVector, Point, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A B-spline or NURBS curve of arbitrary degree and dimension.
///
/// B-splines are defined by:
/// - **Control points**: Define the shape of the curve
/// - **Knot vector**: Defines the parameterization and local influence of control points
/// - **Degree**: Derived as `knots.len() - control_points.len() - 1`
///
/// The curve generally does not pass through the control points (except at
/// endpoints of a clamped knot vector). Its domain is
/// `[knots[degree], knots[len - 1 - degree]]`; parameters outside it are
/// clamped.
///
/// # Rational curves
///
/// A rational curve's control points are homogeneous: the first `N - 1`
/// components are pre-multiplied by the last (the weight). When division is
/// enabled (the default for [`BSplineCurve::rational`]) results are
/// perspective-divided and have `N - 1` components.
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
/// let mid = curve.evaluate(0.5);
/// assert!((mid[0] - 1.0).abs() < 1e-12);
/// assert!((mid[1] - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "BSplineCurveDef")
)]
pub struct BSplineCurve {
    /// Control points (homogeneous when rational).
    control_points: Vec<Point>,
    /// Validated knot vector.
    knots: KnotVector,
    /// Control points carry a trailing weight component.
    rational: bool,
    /// Perspective-divide results of a rational curve.
    divide: bool,
}

impl BSplineCurve {
    /// Create a polynomial B-spline from control points and knots.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidConfiguration`] if there are fewer than
    /// two control points, the points have inconsistent or zero dimension,
    /// or the derived degree is outside `1..=control_points.len() - 1`.
    /// Returns [`CurveError::MalformedKnotVector`] if the knots are invalid.
    pub fn new(control_points: Vec<Point>, knots: Vec<f64>) -> Result<Self> {
        Self::build(control_points, knots, false)
    }

    /// Create a rational B-spline from homogeneous control points.
    ///
    /// Each point is `(w·x, w·y, ..., w)`. Results are divided by the
    /// weight.
    ///
    /// # Errors
    ///
    /// As [`Self::new`], and also if the points have fewer than two
    /// components.
    pub fn rational(control_points: Vec<Point>, knots: Vec<f64>) -> Result<Self> {
        Self::build(control_points, knots, true)
    }

    /// Create a clamped B-spline with uniform interior knots on `[0, 1]`.
    ///
    /// Clamped B-splines pass through their first and last control points.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidConfiguration`] if there are not more
    /// control points than `degree`, or `degree == 0`.
    pub fn clamped(control_points: Vec<Point>, degree: usize) -> Result<Self> {
        let knots = KnotVector::clamped(control_points.len(), degree)?;
        Self::new(control_points, knots.as_slice().to_vec())
    }

    /// Create a B-spline with a uniform knot vector.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidConfiguration`] if there are not more
    /// control points than `degree`, or `degree == 0`.
    pub fn uniform(control_points: Vec<Point>, degree: usize) -> Result<Self> {
        let knots = KnotVector::uniform(control_points.len(), degree)?;
        Self::new(control_points, knots.as_slice().to_vec())
    }

    fn build(control_points: Vec<Point>, knots: Vec<f64>, rational: bool) -> Result<Self> {
        let n = control_points.len();
        check_points(&control_points, rational)?;
        let degree = derive_degree(n, knots.len())?;
        let knots = KnotVector::new(knots, degree)?;
        Ok(Self {
            control_points,
            knots,
            rational,
            divide: rational,
        })
    }

    /// Assemble a curve from parts already known to be consistent.
    pub(crate) fn from_parts(
        control_points: Vec<Point>,
        knots: KnotVector,
        rational: bool,
        divide: bool,
    ) -> Self {
        Self {
            control_points,
            knots,
            rational,
            divide,
        }
    }

    /// Enable or disable the homogeneous divide.
    ///
    /// Has no effect on polynomial curves. With division disabled a rational
    /// curve evaluates to its homogeneous form.
    #[must_use]
    pub fn with_divide(mut self, divide: bool) -> Self {
        self.divide = divide && self.rational;
        self
    }

    /// Get the control points.
    #[must_use]
    pub fn control_points(&self) -> &[Point] {
        &self.control_points
    }

    /// Get the knot vector.
    #[must_use]
    pub fn knots(&self) -> &KnotVector {
        &self.knots
    }

    /// Get the degree.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.knots.degree()
    }

    /// Whether control points are homogeneous.
    #[must_use]
    pub fn is_rational(&self) -> bool {
        self.rational
    }

    /// Whether results are perspective-divided.
    #[must_use]
    pub fn divides(&self) -> bool {
        self.divide
    }

    /// Number of components in evaluated points.
    #[must_use]
    pub fn dimension(&self) -> usize {
        let dim = self.control_points[0].len();
        if self.divide { dim - 1 } else { dim }
    }

    /// Weights of a rational curve, or all ones for a polynomial one.
    #[must_use]
    pub fn weights(&self) -> Vec<f64> {
        if self.rational {
            self.control_points.iter().map(|p| p[p.len() - 1]).collect()
        } else {
            vec![1.0; self.control_points.len()]
        }
    }

    /// Undivided `order`-th derivative of the blended control points.
    fn blend(&self, t: f64, order: usize) -> Point {
        let p = self.degree();
        if p <= MAX_FAST_DEGREE && self.knots.is_bezier() {
            if let Some(weights) = bezier::bernstein(p, order, t.clamp(0.0, 1.0)) {
                let mut acc = Point::zeros(self.control_points[0].len());
                for (w, cp) in weights.iter().zip(&self.control_points) {
                    acc.axpy(*w, cp, 1.0);
                }
                return acc;
            }
        }

        let mut basis = BasisEvaluator::new();
        basis
            .derivative_clamped(&self.knots, t, order)
            .combine(&self.control_points)
    }
}

impl CurveEvaluator for BSplineCurve {
    fn evaluate(&self, t: f64) -> Point {
        let h = self.blend(t, 0);
        if self.divide {
            homogeneous_divide(&h)
        } else {
            h
        }
    }

    fn end_points(&self) -> (f64, f64) {
        self.knots.domain()
    }

    fn velocity(&self, t: f64) -> Point {
        let dh = self.blend(t, 1);
        if self.divide {
            rational_derivative(&self.blend(t, 0), &dh)
        } else {
            dh
        }
    }

    fn accel(&self, t: f64) -> Point {
        let ddh = self.blend(t, 2);
        if self.divide {
            rational_second_derivative(&self.blend(t, 0), &self.blend(t, 1), &ddh)
        } else {
            ddh
        }
    }

    fn jerk(&self, t: f64) -> Point {
        if self.divide {
            differentiate(|s| self.accel(s), t, self.end_points())
        } else {
            self.blend(t, 3)
        }
    }
}

fn check_points(points: &[Point], rational: bool) -> Result<()> {
    if points.len() < 2 {
        return Err(CurveError::invalid_configuration(format!(
            "need at least 2 control points, got {}",
            points.len()
        )));
    }
    let dim = points[0].len();
    let min_dim = if rational { 2 } else { 1 };
    if dim < min_dim {
        return Err(CurveError::invalid_configuration(format!(
            "control points need at least {min_dim} components, got {dim}"
        )));
    }
    if let Some(i) = points.iter().position(|p| p.len() != dim) {
        return Err(CurveError::invalid_configuration(format!(
            "control point {i} has {} components, expected {dim}",
            points[i].len()
        )));
    }
    Ok(())
}

/// Serialized form of [`BSplineCurve`], validated on the way in.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct BSplineCurveDef {
    control_points: Vec<Point>,
    knots: KnotVector,
    rational: bool,
    divide: bool,
}

#[cfg(feature = "serde")]
impl TryFrom<BSplineCurveDef> for BSplineCurve {
    type Error = CurveError;

    fn try_from(def: BSplineCurveDef) -> Result<Self> {
        check_points(&def.control_points, def.rational)?;
        let degree = derive_degree(def.control_points.len(), def.knots.len())?;
        if degree != def.knots.degree() {
            return Err(CurveError::invalid_configuration(format!(
                "knot vector has degree {}, points and knots give {degree}",
                def.knots.degree()
            )));
        }
        Ok(Self {
            control_points: def.control_points,
            knots: def.knots,
            rational: def.rational,
            divide: def.divide && def.rational,
        })
    }
}

/// Degree implied by point and knot counts, `knots - points - 1`.
pub(crate) fn derive_degree(points: usize, knots: usize) -> Result<usize> {
    if knots < points + 2 {
        return Err(CurveError::invalid_configuration(format!(
            "{knots} knots for {points} control points gives degree below 1"
        )));
    }
    let degree = knots - points - 1;
    if degree > points - 1 {
        return Err(CurveError::invalid_configuration(format!(
            "degree {degree} needs at least {} control points, got {points}",
            degree + 1
        )));
    }
    Ok(degree)
}
