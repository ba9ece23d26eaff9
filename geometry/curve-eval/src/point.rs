//! Dynamically sized points and the small amount of vector math the
//! evaluators need.

use nalgebra::{DVector, Vector3};

/// A control point, evaluated position, or derivative vector.
///
/// Dimensionality is fixed per curve or surface but not at compile time:
/// a planar spline uses 2 components, a rational planar spline 3 (the last
/// being the weight).
pub type Point = DVector<f64>;

/// Build a [`Point`] from a slice of components.
#[must_use]
pub fn point(components: &[f64]) -> Point {
    DVector::from_column_slice(components)
}

/// Perspective-divide a homogeneous point, dropping the weight component.
///
/// A zero weight yields non-finite components; these propagate to the caller.
#[must_use]
pub fn homogeneous_divide(h: &Point) -> Point {
    let n = h.len() - 1;
    let w = h[n];
    h.rows(0, n) / w
}

/// Derivative of the divided curve from homogeneous position and derivative.
///
/// With `A` the weighted numerator and `w` the weight, `C = A / w` and
/// `C' = (A' - w' C) / w`.
#[must_use]
pub fn rational_derivative(h: &Point, dh: &Point) -> Point {
    let n = h.len() - 1;
    let w = h[n];
    let dw = dh[n];
    let c = h.rows(0, n) / w;
    (dh.rows(0, n) - c * dw) / w
}

/// Second derivative of the divided curve.
///
/// `C'' = (A'' - 2 w' C' - w'' C) / w`.
#[must_use]
pub fn rational_second_derivative(h: &Point, dh: &Point, ddh: &Point) -> Point {
    let n = h.len() - 1;
    let w = h[n];
    let c = h.rows(0, n) / w;
    let dc = (dh.rows(0, n) - &c * dh[n]) / w;
    (ddh.rows(0, n) - dc * (2.0 * dh[n]) - c * ddh[n]) / w
}

/// First three components as a 3D vector, zero-padded for lower dimensions.
#[must_use]
pub fn to_vector3(v: &Point) -> Vector3<f64> {
    let at = |i: usize| v.get(i).copied().unwrap_or(0.0);
    Vector3::new(at(0), at(1), at(2))
}

/// Choose a unit vector perpendicular to `v`.
///
/// Uses the coordinate axis least aligned with `v`, then removes the `v`
/// component. Returns the zero vector for one-dimensional or zero input.
#[must_use]
pub fn arbitrary_perpendicular(v: &Point) -> Point {
    let n = v.len();
    let norm = v.norm();
    if n < 2 || norm <= 1e-300 {
        return Point::zeros(n);
    }
    let unit = v / norm;

    // Choose the axis most perpendicular to v
    let axis = unit
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
        .map_or(0, |(i, _)| i);

    let mut perp = Point::zeros(n);
    perp[axis] = 1.0;
    perp -= &unit * unit[axis];
    perp.normalize()
}
