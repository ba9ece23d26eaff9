//! Core evaluator traits.
//!
//! [`CurveEvaluator`] and [`SurfaceEvaluator`] require only position and
//! domain. Every other query has a default built from numerical
//! differentiation or adaptive quadrature; implementors override the ones
//! they can compute in closed form.

use crate::point::{arbitrary_perpendicular, to_vector3};
use crate::{ArcLengthReparam, FitRange, Point, Quadrature};

/// Relative step for numerical differentiation.
const DIFF_STEP: f64 = 1e-6;

/// A parametric curve over its own domain `[start, end]`.
///
/// # Implementors
///
/// - [`BSplineCurve`](crate::BSplineCurve) - B-spline and NURBS curves
/// - [`ArcLengthReparam`] - any curve parameterized by distance
/// - [`PiecewiseCurve`](crate::PiecewiseCurve) - curves joined end to end
/// - [`FitRange`] - any curve with a remapped domain
pub trait CurveEvaluator {
    /// Position at parameter `t`.
    fn evaluate(&self, t: f64) -> Point;

    /// The parameter domain `(start, end)`.
    fn end_points(&self) -> (f64, f64);

    /// First derivative with respect to the parameter.
    fn velocity(&self, t: f64) -> Point {
        differentiate(|s| self.evaluate(s), t, self.end_points())
    }

    /// Second derivative with respect to the parameter.
    fn accel(&self, t: f64) -> Point {
        differentiate(|s| self.velocity(s), t, self.end_points())
    }

    /// Third derivative with respect to the parameter.
    fn jerk(&self, t: f64) -> Point {
        differentiate(|s| self.accel(s), t, self.end_points())
    }

    /// Magnitude of the velocity.
    fn speed(&self, t: f64) -> f64 {
        self.velocity(t).norm()
    }

    /// Unit tangent. Zero where the speed vanishes.
    fn tangent(&self, t: f64) -> Point {
        let v = self.velocity(t);
        let norm = v.norm();
        if norm > 0.0 { v / norm } else { v }
    }

    /// Unit principal normal.
    ///
    /// The acceleration with its tangential component removed, pointing
    /// toward the center of curvature. For straight segments a consistent
    /// arbitrary perpendicular is chosen.
    fn normal(&self, t: f64) -> Point {
        let tangent = self.tangent(t);
        let a = self.accel(t);

        // Project out the tangent component
        let normal = &a - &tangent * tangent.dot(&a);
        let norm = normal.norm();

        if norm > 1e-10 {
            normal / norm
        } else {
            arbitrary_perpendicular(&tangent)
        }
    }

    /// Curvature `|a⊥| / |v|²`, valid in any dimension.
    fn curvature(&self, t: f64) -> f64 {
        let v = self.velocity(t);
        let speed_sq = v.norm_squared();
        if speed_sq <= 1e-20 {
            return 0.0;
        }
        let a = self.accel(t);
        let perp = &a - &v * (v.dot(&a) / speed_sq);
        perp.norm() / speed_sq
    }

    /// Signed arc length from the domain start to `t`.
    ///
    /// Negative for `t` before the start, zero at the start.
    fn arc_length(&self, t: f64) -> f64 {
        let (start, _) = self.end_points();
        Quadrature::default().integrate(|s| self.speed(s), start, t)
    }

    /// Arc length over the whole domain.
    fn total_length(&self) -> f64 {
        self.arc_length(self.end_points().1)
    }

    /// Sample `n` positions at uniform parameter spacing (at least 2).
    fn sample_uniform(&self, n: usize) -> Vec<Point> {
        let n = n.max(2);
        let (start, end) = self.end_points();
        (0..n)
            .map(|i| {
                let t = start + (end - start) * i as f64 / (n - 1) as f64;
                self.evaluate(t)
            })
            .collect()
    }

    /// View of this curve with its domain remapped linearly onto `[start, end]`.
    fn fit_range(&self, start: f64, end: f64) -> FitRange<&Self>
    where
        Self: Sized,
    {
        FitRange::new(self, start, end)
    }

    /// View of this curve parameterized by arc length over `[0, total_length]`.
    fn to_arc_length_param(&self) -> ArcLengthReparam<&Self>
    where
        Self: Sized,
    {
        ArcLengthReparam::new(self)
    }
}

/// A parametric surface over `[u_start, u_end] × [v_start, v_end]`.
pub trait SurfaceEvaluator {
    /// Position at `(u, v)`.
    fn evaluate(&self, u: f64, v: f64) -> Point;

    /// The domain `(u_start, u_end, v_start, v_end)`.
    fn end_points(&self) -> (f64, f64, f64, f64);

    /// Partial derivative with respect to `u`.
    fn tangent(&self, u: f64, v: f64) -> Point {
        let (u0, u1, _, _) = self.end_points();
        differentiate(|s| self.evaluate(s, v), u, (u0, u1))
    }

    /// Partial derivative with respect to `v`.
    fn bitangent(&self, u: f64, v: f64) -> Point {
        let (_, _, v0, v1) = self.end_points();
        differentiate(|s| self.evaluate(u, s), v, (v0, v1))
    }

    /// Unnormalized normal `tangent × bitangent` (3 components).
    ///
    /// Surfaces in fewer than 3 dimensions are zero-padded; extra
    /// dimensions are ignored.
    fn gradient(&self, u: f64, v: f64) -> Point {
        let cross = to_vector3(&self.tangent(u, v)).cross(&to_vector3(&self.bitangent(u, v)));
        Point::from_column_slice(cross.as_slice())
    }

    /// Unit normal. Zero at degenerate points.
    fn normal(&self, u: f64, v: f64) -> Point {
        let g = self.gradient(u, v);
        let norm = g.norm();
        if norm > 0.0 { g / norm } else { g }
    }
}

/// Second-order finite difference, one-sided at the domain ends.
pub(crate) fn differentiate<F>(f: F, t: f64, (start, end): (f64, f64)) -> Point
where
    F: Fn(f64) -> Point,
{
    let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
    let h = DIFF_STEP * (hi - lo).max(f64::MIN_POSITIVE);

    if t - h < lo {
        // Forward: (-3 f0 + 4 f1 - f2) / 2h
        let f0 = f(t);
        let f1 = f(t + h);
        let f2 = f(t + 2.0 * h);
        (f1 * 4.0 - f0 * 3.0 - f2) / (2.0 * h)
    } else if t + h > hi {
        let f0 = f(t);
        let f1 = f(t - h);
        let f2 = f(t - 2.0 * h);
        (f0 * 3.0 - f1 * 4.0 + f2) / (2.0 * h)
    } else {
        (f(t + h) - f(t - h)) / (2.0 * h)
    }
}

macro_rules! forward_curve_evaluator {
    ($($wrapper:ty),*) => {$(
        impl<C: CurveEvaluator + ?Sized> CurveEvaluator for $wrapper {
            fn evaluate(&self, t: f64) -> Point {
                (**self).evaluate(t)
            }
            fn end_points(&self) -> (f64, f64) {
                (**self).end_points()
            }
            fn velocity(&self, t: f64) -> Point {
                (**self).velocity(t)
            }
            fn accel(&self, t: f64) -> Point {
                (**self).accel(t)
            }
            fn jerk(&self, t: f64) -> Point {
                (**self).jerk(t)
            }
            fn speed(&self, t: f64) -> f64 {
                (**self).speed(t)
            }
            fn tangent(&self, t: f64) -> Point {
                (**self).tangent(t)
            }
            fn normal(&self, t: f64) -> Point {
                (**self).normal(t)
            }
            fn curvature(&self, t: f64) -> f64 {
                (**self).curvature(t)
            }
            fn arc_length(&self, t: f64) -> f64 {
                (**self).arc_length(t)
            }
            fn total_length(&self) -> f64 {
                (**self).total_length()
            }
        }
    )*};
}

forward_curve_evaluator!(&C, Box<C>);

impl<S: SurfaceEvaluator + ?Sized> SurfaceEvaluator for &S {
    fn evaluate(&self, u: f64, v: f64) -> Point {
        (**self).evaluate(u, v)
    }
    fn end_points(&self) -> (f64, f64, f64, f64) {
        (**self).end_points()
    }
    fn tangent(&self, u: f64, v: f64) -> Point {
        (**self).tangent(u, v)
    }
    fn bitangent(&self, u: f64, v: f64) -> Point {
        (**self).bitangent(u, v)
    }
    fn gradient(&self, u: f64, v: f64) -> Point {
        (**self).gradient(u, v)
    }
    fn normal(&self, u: f64, v: f64) -> Point {
        (**self).normal(u, v)
    }
}
