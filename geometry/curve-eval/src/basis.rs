//! B-spline basis functions and their derivatives.
//!
//! Values come from the triangular (de Boor) recurrence localized to the
//! knot span containing the parameter: only the `p + 1` functions that can
//! be non-zero there are computed, in `O(p²)` regardless of the number of
//! control points. Repeated knots of any multiplicity are handled by
//! treating `0 / 0` terms as zero.

use crate::{CurveError, KnotEnd, KnotVector, Result};
use smallvec::{SmallVec, smallvec};

type Scratch = SmallVec<[f64; 8]>;

/// Relative slack allowed outside the knot range by [`BasisEvaluator::evaluate`].
const DOMAIN_EPSILON: f64 = 1e-9;

/// Non-zero basis values (or derivative coefficients) on one knot span.
///
/// `values[i]` multiplies control point `first + i`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasisSpan<'a> {
    /// Index of the first control point with a non-zero weight.
    pub first: usize,
    /// Weights for control points `first..first + values.len()`.
    pub values: &'a [f64],
}

impl BasisSpan<'_> {
    /// Expand into a dense vector of `count` weights, one per control point.
    #[must_use]
    pub fn dense(&self, count: usize) -> Vec<f64> {
        let mut all = vec![0.0; count];
        for (i, &v) in self.values.iter().enumerate() {
            if let Some(slot) = all.get_mut(self.first + i) {
                *slot = v;
            }
        }
        all
    }

    /// Weighted sum `Σ values[i] * points[first + i]`.
    #[must_use]
    pub fn combine(&self, points: &[crate::Point]) -> crate::Point {
        let dim = points.first().map_or(0, |p| p.len());
        let mut acc = crate::Point::zeros(dim);
        for (i, &w) in self.values.iter().enumerate() {
            if w != 0.0 {
                acc.axpy(w, &points[self.first + i], 1.0);
            }
        }
        acc
    }
}

/// Evaluates basis functions with reusable scratch space.
///
/// Scratch lives inline (no heap) for up to 8 weights. An evaluator is cheap to
/// create; curves make one per call so they can be shared across threads.
///
/// # Example
///
/// ```
/// use curve_eval::{BasisEvaluator, KnotVector};
///
/// let knots = KnotVector::clamped(4, 3).unwrap();
/// let mut basis = BasisEvaluator::new();
/// let span = basis.evaluate(&knots, 0.5).unwrap();
/// let sum: f64 = span.values.iter().sum();
/// assert!((sum - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BasisEvaluator {
    values: Scratch,
    left: Scratch,
    right: Scratch,
    work: Scratch,
}

impl BasisEvaluator {
    /// Create an evaluator with empty scratch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Basis values at `t`, failing if `t` is outside the knot range.
    ///
    /// Parameters inside the knot range but outside the domain use the
    /// nearest non-empty span.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidParameter`] if `t` lies outside
    /// `[knots[0], knots[last]]` by more than a small relative epsilon, or
    /// is NaN.
    pub fn evaluate(&mut self, knots: &KnotVector, t: f64) -> Result<BasisSpan<'_>> {
        check_parameter(knots, t)?;
        Ok(self.derivative_at_span(knots, knots.find_span(t), t, 0))
    }

    /// Basis values at `t` after clamping `t` to the curve domain.
    pub fn evaluate_clamped(&mut self, knots: &KnotVector, t: f64) -> BasisSpan<'_> {
        let u = clamp_to_domain(knots, t);
        self.derivative_at_span(knots, knots.find_span(u), u, 0)
    }

    /// Coefficients of the `order`-th derivative at `t` (clamped to the domain).
    ///
    /// For order 1 these are
    /// `d·N[j,d-1]/(u[j+d]-u[j]) - d·N[j+1,d-1]/(u[j+d+1]-u[j+1])`, with any
    /// term over a zero-length knot interval dropped. Orders above the degree
    /// are identically zero.
    pub fn derivative_clamped(&mut self, knots: &KnotVector, t: f64, order: usize) -> BasisSpan<'_> {
        let u = clamp_to_domain(knots, t);
        self.derivative_at_span(knots, knots.find_span(u), u, order)
    }

    fn derivative_at_span(
        &mut self,
        knots: &KnotVector,
        span: usize,
        u: f64,
        order: usize,
    ) -> BasisSpan<'_> {
        let p = knots.degree();
        let first = span - p;

        if order > p {
            self.values = smallvec![0.0; p + 1];
            return BasisSpan {
                first,
                values: &self.values,
            };
        }

        if order == 0 {
            if let Some(end) = clamped_endpoint(knots, u) {
                self.values = smallvec![0.0; p + 1];
                match end {
                    KnotEnd::Start => self.values[0] = 1.0,
                    KnotEnd::End => self.values[p] = 1.0,
                }
                return BasisSpan {
                    first,
                    values: &self.values,
                };
            }
        }

        // Lower-degree values N[span-q..=span, q], then raise to degree p
        let q = p - order;
        self.triangle(knots.as_slice(), span, u, q);

        let k = knots.as_slice();
        for level in (q + 1)..=p {
            // self.values holds level - 1 functions starting at span - (level - 1)
            let lower = std::mem::take(&mut self.values);
            self.work.clear();
            let offset = span - level;
            let factor = level as f64;
            for j in offset..=span {
                // N[j, level-1] lives at lower[j - (offset + 1)] when in range
                let a = if j > offset { lower[j - offset - 1] } else { 0.0 };
                let b = if j < span { lower[j - offset] } else { 0.0 };
                let da = k[j + level] - k[j];
                let db = k[j + level + 1] - k[j + 1];
                let ta = if da > 0.0 { a / da } else { 0.0 };
                let tb = if db > 0.0 { b / db } else { 0.0 };
                self.work.push(factor * (ta - tb));
            }
            self.values = lower;
            std::mem::swap(&mut self.values, &mut self.work);
        }

        BasisSpan {
            first,
            values: &self.values,
        }
    }

    /// Fill `values[0..=q]` with `N[span-q+i, q](u)`.
    fn triangle(&mut self, k: &[f64], span: usize, u: f64, q: usize) {
        self.values.clear();
        self.values.resize(q + 1, 0.0);
        self.left.clear();
        self.left.resize(q + 1, 0.0);
        self.right.clear();
        self.right.resize(q + 1, 0.0);

        self.values[0] = 1.0;

        for j in 1..=q {
            self.left[j] = u - k[span + 1 - j];
            self.right[j] = k[span + j] - u;

            let mut saved = 0.0;
            for r in 0..j {
                let denom = self.right[r + 1] + self.left[j - r];
                // 0/0 from repeated knots is zero; NaN falls through and propagates
                if denom.abs() <= 1e-15 {
                    self.values[r] = saved;
                    saved = 0.0;
                } else {
                    let temp = self.values[r] / denom;
                    self.values[r] = saved + self.right[r + 1] * temp;
                    saved = self.left[j - r] * temp;
                }
            }
            self.values[j] = saved;
        }
    }
}

fn check_parameter(knots: &KnotVector, t: f64) -> Result<()> {
    let k = knots.as_slice();
    let (min, max) = (k[0], k[k.len() - 1]);
    let slack = DOMAIN_EPSILON * (max - min).max(1.0);
    if t.is_nan() || t < min - slack || t > max + slack {
        return Err(CurveError::InvalidParameter { t, min, max });
    }
    Ok(())
}

/// NaN passes through and yields NaN weights.
fn clamp_to_domain(knots: &KnotVector, t: f64) -> f64 {
    let (start, end) = knots.domain();
    t.clamp(start, end)
}

/// Which clamped end `u` sits on, if any.
fn clamped_endpoint(knots: &KnotVector, u: f64) -> Option<KnotEnd> {
    let (start, end) = knots.domain();
    if u <= start && knots.is_clamped_at(KnotEnd::Start) {
        Some(KnotEnd::Start)
    } else if u >= end && knots.is_clamped_at(KnotEnd::End) {
        Some(KnotEnd::End)
    } else {
        None
    }
}
