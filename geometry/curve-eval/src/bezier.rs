//! Closed-form Bernstein blending for low-degree Bézier spans.
//!
//! A B-spline whose knot vector is `degree + 1` zeros followed by
//! `degree + 1` ones is exactly a Bézier curve. For degree 1 to 3 its basis
//! functions and their derivatives are fixed polynomials, which are cheaper
//! and better conditioned than the general recurrence.

/// Highest degree with a closed-form fast path.
pub(crate) const MAX_FAST_DEGREE: usize = 3;

/// Bernstein weights (or their `order`-th derivatives) at `t`.
///
/// ```text
/// B(t) = (1-t)³P₀ + 3(1-t)²tP₁ + 3(1-t)t²P₂ + t³P₃
/// ```
///
/// Returns `None` for degrees outside `1..=3`. Only the first `degree + 1`
/// entries are meaningful.
pub(crate) fn bernstein(degree: usize, order: usize, t: f64) -> Option<[f64; 4]> {
    let s = 1.0 - t;
    let weights = match (degree, order) {
        (1, 0) => [s, t, 0.0, 0.0],
        (1, 1) => [-1.0, 1.0, 0.0, 0.0],
        (2, 0) => [s * s, 2.0 * s * t, t * t, 0.0],
        // B'(t) = 2(1-t)(P₁-P₀) + 2t(P₂-P₁)
        (2, 1) => [-2.0 * s, 2.0 - 4.0 * t, 2.0 * t, 0.0],
        (2, 2) => [2.0, -4.0, 2.0, 0.0],
        (3, 0) => [s * s * s, 3.0 * s * s * t, 3.0 * s * t * t, t * t * t],
        (3, 1) => [
            -3.0 * s * s,
            3.0 * s * (1.0 - 3.0 * t),
            3.0 * t * (2.0 - 3.0 * t),
            3.0 * t * t,
        ],
        (3, 2) => [6.0 * s, 18.0 * t - 12.0, 6.0 - 18.0 * t, 6.0 * t],
        (3, 3) => [-6.0, 18.0, -18.0, 6.0],
        (1..=MAX_FAST_DEGREE, _) => [0.0; 4],
        _ => return None,
    };
    Some(weights)
}
