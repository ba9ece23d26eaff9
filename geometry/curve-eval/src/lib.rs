//! B-spline and NURBS evaluation for CAD and geometric modeling.
//!
//! This crate evaluates parametric curves and surfaces of arbitrary degree
//! and dimension, and provides the numerical machinery built on top of them:
//!
//! - [`KnotVector`] - Validated knot vectors, with uniform and clamped generators
//! - [`BasisEvaluator`] - Localized basis functions and derivative coefficients
//! - [`BSplineCurve`] - B-spline and NURBS curves, with knot insertion and splitting
//! - [`BSplineSurface`] - Tensor-product B-spline and NURBS surfaces
//! - [`Quadrature`] - Adaptive Gauss–Kronrod integration
//! - [`RootFinder`] - Safeguarded Newton iteration
//! - [`ArcLengthReparam`] - Any curve parameterized by distance
//! - [`PiecewiseCurve`] - Curves joined end to end
//! - [`FitRange`] - Any curve with a remapped domain
//!
//! # Core Traits
//!
//! Curves implement [`CurveEvaluator`] and surfaces implement
//! [`SurfaceEvaluator`]. Only position and domain are required:
//!
//! - **Derivatives**: velocity, acceleration, and jerk fall back to finite
//!   differences when no closed form is supplied
//! - **Arc length**: signed length from the domain start by adaptive quadrature
//! - **Framing**: unit tangent, principal normal, and curvature
//!
//! # Example
//!
//! ```
//! use curve_eval::{BSplineCurve, CurveEvaluator, point};
//!
//! // Quadratic arch on a clamped knot vector
//! let curve = BSplineCurve::new(
//!     vec![point(&[0.0, 0.0]), point(&[1.0, 2.0]), point(&[2.0, 0.0])],
//!     vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
//! )
//! .unwrap();
//!
//! // Evaluate at midpoint
//! let mid = curve.evaluate(0.5);
//! assert!((mid[0] - 1.0).abs() < 1e-12 && (mid[1] - 1.0).abs() < 1e-12);
//!
//! // Walk by distance instead of parameter
//! let by_length = curve.to_arc_length_param();
//! let halfway = by_length.evaluate(0.5 * by_length.total_length());
//! assert!((halfway[0] - 1.0).abs() < 1e-6);
//! ```
//!
//! # Points
//!
//! Points and vectors are [`Point`], a dynamically sized `nalgebra` column
//! vector, so one curve type covers 1D through N-dimensional data. Rational
//! curves carry the weight as the last component.
//!
//! # Errors
//!
//! Malformed definitions fail when the curve is built, with [`CurveError`].
//! Evaluation never fails: parameters outside the domain are clamped, and
//! the numerical routines return their best estimate.
//!
//! # Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for curves, surfaces,
//!   knot vectors, and parameter structs

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::suboptimal_flops,
    clippy::missing_const_for_fn,
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::needless_pass_by_value,
    clippy::option_if_let_else,
    clippy::uninlined_format_args,
    clippy::needless_range_loop,
    clippy::float_cmp,
    clippy::return_self_not_must_use
)]

mod arc_length;
mod basis;
mod bezier;
mod bspline;
mod error;
mod knots;
mod nurbs;
mod ops;
mod params;
mod piecewise;
mod point;
mod quadrature;
mod root;
mod split;
mod surface;
mod traits;

// Re-export core types
pub use arc_length::{ArcLengthReparam, ArcSegment};
pub use basis::{BasisEvaluator, BasisSpan};
pub use bspline::BSplineCurve;
pub use error::CurveError;
pub use knots::{KnotEnd, KnotVector};
pub use ops::FitRange;
pub use params::{ArcLengthParams, QuadratureParams, RootParams};
pub use piecewise::{BoxedCurve, PiecewiseCurve};
pub use point::{
    Point, arbitrary_perpendicular, homogeneous_divide, point, rational_derivative,
    rational_second_derivative, to_vector3,
};
pub use quadrature::Quadrature;
pub use root::RootFinder;
pub use surface::BSplineSurface;
pub use traits::{CurveEvaluator, SurfaceEvaluator};

// Re-export nalgebra types for convenience
pub use nalgebra::{DVector, Vector3};

/// Result type for curve operations.
pub type Result<T> = std::result::Result<T, CurveError>;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use approx::assert_relative_eq;

    fn verify_curve_basics<C: CurveEvaluator>(curve: &C) {
        let (start, end) = curve.end_points();
        assert!(start < end);

        // Tangent is unit vector
        let mid = 0.5 * (start + end);
        assert_relative_eq!(curve.tangent(mid).norm(), 1.0, epsilon = 1e-10);

        // Arc length starts at zero and grows
        assert_relative_eq!(curve.arc_length(start), 0.0);
        assert!(curve.arc_length(mid) > 0.0);
        assert!(curve.total_length() > curve.arc_length(mid));

        // Sample points
        let samples = curve.sample_uniform(10);
        assert_eq!(samples.len(), 10);
        assert_relative_eq!(samples[0], curve.evaluate(start));
    }

    /// Test that all curve types implement the trait consistently.
    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_curve_trait_consistency() {
        let spline = BSplineCurve::clamped(
            vec![
                point(&[0.0, 0.0, 0.0]),
                point(&[1.0, 1.0, 0.0]),
                point(&[2.0, 1.0, 1.0]),
                point(&[3.0, 0.0, 0.0]),
                point(&[4.0, 0.5, 0.0]),
            ],
            3,
        )
        .unwrap();
        verify_curve_basics(&spline);

        let arc = BSplineCurve::circular_arc(1.0, 0.0, std::f64::consts::PI).unwrap();
        verify_curve_basics(&arc);
        verify_curve_basics(&arc.to_arc_length_param());
        verify_curve_basics(&spline.fit_range(2.0, 3.0));

        let path = PiecewiseCurve::new(vec![
            Box::new(spline.clone()),
            Box::new(FitRange::new(spline.clone(), -1.0, 1.0)),
        ])
        .unwrap();
        verify_curve_basics(&path);

        let boxed: Box<dyn CurveEvaluator> = Box::new(spline);
        verify_curve_basics(&boxed);
    }

    /// Split halves reparameterize to the same total length.
    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_split_then_measure() {
        let curve = BSplineCurve::uniform(
            (0..8)
                .map(|i| point(&[f64::from(i), f64::from(i * i % 5)]))
                .collect(),
            3,
        )
        .unwrap();
        let (start, end) = curve.end_points();
        let t = start + 0.4 * (end - start);
        let (left, right) = curve.split(t).unwrap();
        let (left, right) = (left.unwrap(), right.unwrap());

        assert_relative_eq!(
            left.total_length() + right.total_length(),
            curve.total_length(),
            epsilon = 1e-6
        );
        assert_relative_eq!(left.total_length(), curve.arc_length(t), epsilon = 1e-6);
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BSplineCurve>();
        assert_send_sync::<BSplineSurface>();
        assert_send_sync::<PiecewiseCurve>();
        assert_send_sync::<ArcLengthReparam<BSplineCurve>>();
        assert_send_sync::<KnotVector>();
    }
}
