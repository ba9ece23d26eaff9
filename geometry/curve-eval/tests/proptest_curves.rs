//! Property-based tests for curve evaluation.
//!
//! These tests use proptest to generate random control polygons and knot
//! vectors and verify invariants.
//!
//! Run with: cargo test -p curve-eval -- proptest

#![allow(clippy::unwrap_used)]

use curve_eval::{BSplineCurve, BasisEvaluator, CurveEvaluator, KnotVector, Point, point};
use proptest::prelude::*;

// =============================================================================
// Strategies for generating random curves
// =============================================================================

/// Generate a random 3D control point in a bounded range.
fn arb_point() -> impl Strategy<Value = Point> {
    prop::array::uniform3(-10.0..10.0f64).prop_map(|xyz| point(&xyz))
}

/// Generate a clamped knot vector with random interior knots.
///
/// Interior knots are kept at least `1e-3` apart so no span is degenerate.
fn arb_knots(count: usize, degree: usize) -> impl Strategy<Value = Vec<f64>> {
    let interior = count - degree - 1;
    prop::collection::vec(1.0..100.0f64, interior + 1).prop_map(move |gaps| {
        let total: f64 = gaps.iter().sum();
        let mut knots = vec![0.0; degree + 1];
        let mut acc = 0.0;
        for gap in &gaps[..interior] {
            acc += gap / total;
            knots.push(acc);
        }
        knots.extend(std::iter::repeat(1.0).take(degree + 1));
        knots
    })
}

/// Generate a polynomial B-spline of degree 1 to 4.
fn arb_curve() -> impl Strategy<Value = BSplineCurve> {
    (1usize..=4).prop_flat_map(|degree| {
        (degree + 1..=degree + 6).prop_flat_map(move |count| {
            (prop::collection::vec(arb_point(), count), arb_knots(count, degree))
                .prop_map(|(points, knots)| BSplineCurve::new(points, knots).unwrap())
        })
    })
}

/// Generate a curve together with a parameter fraction in `(0, 1)`.
fn arb_curve_and_fraction() -> impl Strategy<Value = (BSplineCurve, f64)> {
    (arb_curve(), 0.01..0.99f64)
}

fn lerp((start, end): (f64, f64), f: f64) -> f64 {
    start + (end - start) * f
}

// =============================================================================
// Property Tests: Basis functions
// =============================================================================

proptest! {
    /// Basis values sum to one everywhere in the domain.
    #[test]
    fn basis_partition_of_unity(curve in arb_curve(), f in 0.0..=1.0f64) {
        let knots = curve.knots();
        let t = lerp(knots.domain(), f);
        let mut basis = BasisEvaluator::new();
        let span = basis.evaluate(knots, t).unwrap();
        let sum: f64 = span.values.iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-9, "sum {} at t = {}", sum, t);
        prop_assert!(span.values.iter().all(|&v| v >= -1e-12));
    }

    /// Derivative coefficients sum to zero (the derivative of a constant).
    #[test]
    fn derivative_coefficients_sum_to_zero(curve in arb_curve(), f in 0.0..=1.0f64) {
        let knots = curve.knots();
        let t = lerp(knots.domain(), f);
        let mut basis = BasisEvaluator::new();
        let span = basis.derivative_clamped(knots, t, 1);
        let sum: f64 = span.values.iter().sum();
        prop_assert!(sum.abs() < 1e-6, "sum {} at t = {}", sum, t);
    }

    /// Generated knot vectors always validate.
    #[test]
    fn generated_knots_validate(degree in 1usize..6, extra in 1usize..10) {
        let count = degree + extra;
        prop_assert!(KnotVector::clamped(count, degree).is_ok());
        prop_assert!(KnotVector::uniform(count, degree).is_ok());
    }
}

// =============================================================================
// Property Tests: Evaluation
// =============================================================================

proptest! {
    /// Clamped curves interpolate their first and last control points.
    #[test]
    fn clamped_ends_interpolate(curve in arb_curve()) {
        let (start, end) = curve.end_points();
        let points = curve.control_points();
        prop_assert!((curve.evaluate(start) - &points[0]).norm() < 1e-9);
        prop_assert!((curve.evaluate(end) - &points[points.len() - 1]).norm() < 1e-9);
    }

    /// Curve points lie in the bounding box of the control polygon.
    #[test]
    fn convex_hull(curve in arb_curve(), f in 0.0..=1.0f64) {
        let p = curve.evaluate(lerp(curve.end_points(), f));
        for axis in 0..3 {
            let values = curve.control_points().iter().map(|c| c[axis]);
            let lo = values.clone().fold(f64::INFINITY, f64::min);
            let hi = values.fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(p[axis] >= lo - 1e-9 && p[axis] <= hi + 1e-9);
        }
    }

    /// Closed-form velocity agrees with a central difference.
    #[test]
    fn velocity_matches_finite_difference((curve, f) in arb_curve_and_fraction()) {
        let t = lerp(curve.end_points(), f);
        // Skip parameters near interior knots, where degree-1 curves kink
        let near_knot = curve.knots().as_slice().iter().any(|&k| (k - t).abs() < 1e-4);
        prop_assume!(!near_knot);

        let h = 1e-7;
        let fd = (curve.evaluate(t + h) - curve.evaluate(t - h)) / (2.0 * h);
        let v = curve.velocity(t);
        prop_assert!((&v - &fd).norm() < 1e-4 * (1.0 + v.norm()), "v = {}, fd = {}", v, fd);
    }
}

// =============================================================================
// Property Tests: Splitting and arc length
// =============================================================================

proptest! {
    /// Both halves of a split meet at the original curve point.
    #[test]
    fn split_halves_meet((curve, f) in arb_curve_and_fraction()) {
        let t = lerp(curve.end_points(), f);
        let (left, right) = curve.split(t).unwrap();
        let (left, right) = (left.unwrap(), right.unwrap());
        let at = curve.evaluate(t);

        prop_assert!((left.evaluate(t) - &at).norm() < 1e-9);
        prop_assert!((right.evaluate(t) - &at).norm() < 1e-9);
        prop_assert_eq!(left.degree(), curve.degree());
    }

    /// Split halves reproduce the original on their own domains.
    #[test]
    fn split_preserves_shape((curve, f) in arb_curve_and_fraction(), g in 0.0..=1.0f64) {
        let t = lerp(curve.end_points(), f);
        let (left, right) = curve.split(t).unwrap();
        let (left, right) = (left.unwrap(), right.unwrap());

        let lt = lerp(left.end_points(), g);
        let rt = lerp(right.end_points(), g);
        prop_assert!((left.evaluate(lt) - curve.evaluate(lt)).norm() < 1e-9);
        prop_assert!((right.evaluate(rt) - curve.evaluate(rt)).norm() < 1e-9);
    }

    /// Arc length never decreases along the parameter.
    #[test]
    fn arc_length_monotonic(curve in arb_curve(), a in 0.0..=1.0f64, b in 0.0..=1.0f64) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let domain = curve.end_points();
        let l1 = curve.arc_length(lerp(domain, lo));
        let l2 = curve.arc_length(lerp(domain, hi));
        // Quadrature noise is bounded by its tolerance
        prop_assert!(l2 >= l1 - 1e-5, "{} < {}", l2, l1);
    }

    /// Arc length is at least the chord between the end points.
    #[test]
    fn arc_length_exceeds_chord(curve in arb_curve()) {
        let (start, end) = curve.end_points();
        let chord = (curve.evaluate(end) - curve.evaluate(start)).norm();
        prop_assert!(curve.total_length() >= chord - 1e-6);
    }
}
