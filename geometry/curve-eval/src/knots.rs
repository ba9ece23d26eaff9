//! Knot vectors: validation, queries, and generators.
//!
//! A knot vector of length `n + p + 1` partitions the parameter line into
//! spans for `n` control points at degree `p`. The valid evaluation domain
//! is `[knots[p], knots[n]]`.

use crate::{CurveError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which end of a knot vector to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnotEnd {
    /// The first `degree + 1` knots.
    Start,
    /// The last `degree + 1` knots.
    End,
}

/// A validated, non-decreasing knot vector with its degree.
///
/// # Example
///
/// ```
/// use curve_eval::{KnotEnd, KnotVector};
///
/// let knots = KnotVector::clamped(5, 3).unwrap();
/// assert_eq!(knots.as_slice(), &[0.0, 0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0, 1.0]);
/// assert!(knots.is_clamped_at(KnotEnd::Start));
/// assert_eq!(knots.domain(), (0.0, 1.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "KnotVectorDef")
)]
pub struct KnotVector {
    knots: Vec<f64>,
    degree: usize,
}

/// Serialized form of [`KnotVector`], validated on the way in.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct KnotVectorDef {
    knots: Vec<f64>,
    degree: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<KnotVectorDef> for KnotVector {
    type Error = CurveError;

    fn try_from(def: KnotVectorDef) -> Result<Self> {
        Self::new(def.knots, def.degree)
    }
}

impl KnotVector {
    /// Validate and wrap a knot vector.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::MalformedKnotVector`] if [`Self::validate`] fails.
    pub fn new(knots: Vec<f64>, degree: usize) -> Result<Self> {
        Self::validate(&knots, degree)?;
        Ok(Self { knots, degree })
    }

    /// Check the knot vector invariants for the given degree.
    ///
    /// Rejects vectors that are too short, non-finite, decreasing, have equal
    /// first and last knots, have degenerate end spans, or repeat any value
    /// more than `degree + 1` times.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::MalformedKnotVector`] describing the first
    /// violated invariant.
    pub fn validate(knots: &[f64], degree: usize) -> Result<()> {
        let len = knots.len();
        if degree + 1 >= len {
            return Err(CurveError::malformed_knots(format!(
                "{len} knots are too few for degree {degree}"
            )));
        }

        if let Some(i) = knots.iter().position(|k| !k.is_finite()) {
            return Err(CurveError::malformed_knots(format!(
                "knot at index {i} is not finite"
            )));
        }

        for i in 1..len {
            if knots[i] < knots[i - 1] {
                return Err(CurveError::malformed_knots(format!(
                    "knot vector is not non-decreasing at index {} ({} < {})",
                    i,
                    knots[i],
                    knots[i - 1]
                )));
            }
        }

        if knots[0] == knots[len - 1] {
            return Err(CurveError::malformed_knots(
                "first and last knots are equal",
            ));
        }

        if knots[0] >= knots[degree + 1] || knots[len - 2 - degree] >= knots[len - 1] {
            return Err(CurveError::malformed_knots(format!(
                "degenerate end span for degree {degree}"
            )));
        }

        let mut run = 1;
        for i in 1..len {
            if knots[i] == knots[i - 1] {
                run += 1;
                if run > degree + 1 {
                    return Err(CurveError::malformed_knots(format!(
                        "knot {} repeats more than {} times",
                        knots[i],
                        degree + 1
                    )));
                }
            } else {
                run = 1;
            }
        }

        Ok(())
    }

    /// Uniform knot vector `i / (len - 1)` for `count` control points.
    ///
    /// The resulting curve generally does not pass through its end points.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidConfiguration`] if `degree == 0` or
    /// `count <= degree`.
    pub fn uniform(count: usize, degree: usize) -> Result<Self> {
        check_count(count, degree)?;
        let len = count + degree + 1;
        let knots = (0..len).map(|i| i as f64 / (len - 1) as f64).collect();
        Self::new(knots, degree)
    }

    /// Clamped knot vector on `[0, 1]` with uniform interior knots.
    ///
    /// The first and last knots are repeated `degree + 1` times so the curve
    /// interpolates its first and last control points.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidConfiguration`] if `degree == 0` or
    /// `count <= degree`.
    pub fn clamped(count: usize, degree: usize) -> Result<Self> {
        check_count(count, degree)?;
        let mut knots = Vec::with_capacity(count + degree + 1);

        // Repeat first knot (degree + 1) times
        knots.extend(std::iter::repeat(0.0).take(degree + 1));

        // Interior knots (uniform)
        let num_interior = count - degree - 1;
        for i in 1..=num_interior {
            knots.push(i as f64 / (num_interior + 1) as f64);
        }

        // Repeat last knot (degree + 1) times
        knots.extend(std::iter::repeat(1.0).take(degree + 1));

        Self::new(knots, degree)
    }

    /// The raw knot values.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.knots
    }

    /// Number of knots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.knots.len()
    }

    /// Always false for a validated vector.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    /// The degree this vector was validated for.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of control points this vector supports.
    #[must_use]
    pub fn control_point_count(&self) -> usize {
        self.knots.len() - self.degree - 1
    }

    /// Valid parameter domain `(knots[p], knots[len - 1 - p])`.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        let p = self.degree;
        (self.knots[p], self.knots[self.knots.len() - 1 - p])
    }

    /// True if the first (or last) `degree + 1` knots are all equal.
    #[must_use]
    pub fn is_clamped_at(&self, end: KnotEnd) -> bool {
        let run = self.degree + 1;
        let slice = match end {
            KnotEnd::Start => &self.knots[..run],
            KnotEnd::End => &self.knots[self.knots.len() - run..],
        };
        slice.iter().all(|&k| k == slice[0])
    }

    /// True for the plain Bézier vector: `degree + 1` zeros then `degree + 1` ones.
    #[must_use]
    pub fn is_bezier(&self) -> bool {
        let run = self.degree + 1;
        self.knots.len() == 2 * run
            && self.knots[..run].iter().all(|&k| k == 0.0)
            && self.knots[run..].iter().all(|&k| k == 1.0)
    }

    /// Number of knots exactly equal to `u`.
    #[must_use]
    pub fn multiplicity(&self, u: f64) -> usize {
        self.knots.iter().filter(|&&k| k == u).count()
    }

    /// Find the knot span index for parameter `u`.
    ///
    /// Returns `k` with `knots[k] <= u < knots[k + 1]` and
    /// `degree <= k < control_point_count()`. Parameters outside the domain
    /// snap to the first or last non-empty span.
    #[must_use]
    pub fn find_span(&self, u: f64) -> usize {
        let n = self.control_point_count();
        let p = self.degree;

        // Special case: u at or beyond the end
        if u >= self.knots[n] {
            let mut k = n - 1;
            while k > p && self.knots[k] == self.knots[k + 1] {
                k -= 1;
            }
            return k;
        }

        let u = u.max(self.knots[p]);

        // Binary search
        let mut low = p;
        let mut high = n;
        while low < high {
            let mid = (low + high) / 2;
            if self.knots[mid] > u {
                high = mid;
            } else {
                low = mid + 1;
            }
        }

        low - 1
    }
}

fn check_count(count: usize, degree: usize) -> Result<()> {
    if degree == 0 {
        return Err(CurveError::invalid_configuration("degree must be at least 1"));
    }
    if count <= degree {
        return Err(CurveError::invalid_configuration(format!(
            "need at least {} control points for degree {degree}, got {count}",
            degree + 1
        )));
    }
    Ok(())
}
