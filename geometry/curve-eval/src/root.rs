//! Safeguarded Newton iteration for inverting monotonic functions.

use crate::RootParams;
use tracing::trace;

/// Solves `f(t) = target` for non-decreasing `f` with known derivative.
///
/// Each step is a Newton step `t - (f(t) - target) / f'(t)`. Every evaluated
/// point tightens a bracket (points with `f(t) < target` become the lower
/// bound, others the upper bound), and steps that would leave the bracket
/// fall back to bisection. Bounds may be one-sided or absent.
///
/// The solver never fails. It stops when the residual is within tolerance
/// and the estimate is inside the bracket, when a step makes no progress,
/// when the derivative vanishes with no bracket to bisect, or after
/// `max_iterations` steps, and returns its best estimate.
///
/// # Example
///
/// ```
/// use curve_eval::RootFinder;
///
/// let solver = RootFinder::default();
/// let t = solver.solve(|x| x * x * x, |x| 3.0 * x * x, 8.0, 1.0, Some(0.0), Some(5.0));
/// assert!((t - 2.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RootFinder {
    params: RootParams,
}

impl RootFinder {
    /// Create a solver with the given parameters.
    #[must_use]
    pub const fn new(params: RootParams) -> Self {
        Self { params }
    }

    /// The parameters in use.
    #[must_use]
    pub const fn params(&self) -> &RootParams {
        &self.params
    }

    /// Find `t` with `f(t) ≈ target`, starting from `guess`.
    pub fn solve<F, D>(
        &self,
        mut f: F,
        mut df: D,
        target: f64,
        guess: f64,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> f64
    where
        F: FnMut(f64) -> f64,
        D: FnMut(f64) -> f64,
    {
        let mut lo = lower;
        let mut hi = upper;
        let mut ret = guess;

        if let (Some(l), Some(h)) = (lo, hi) {
            if !(ret >= l && ret <= h) {
                ret = 0.5 * (l + h);
            }
        }

        let mut residual = f64::NAN;
        for _ in 0..self.params.max_iterations {
            residual = f(ret) - target;
            let inside = lo.is_none_or(|l| ret >= l) && hi.is_none_or(|h| ret <= h);
            if residual.abs() < self.params.tolerance && inside {
                return ret;
            }

            // f is non-decreasing: the root lies above points that undershoot
            if residual < 0.0 {
                lo = Some(lo.map_or(ret, |l| l.max(ret)));
            } else {
                hi = Some(hi.map_or(ret, |h| h.min(ret)));
            }

            let slope = df(ret);
            let next = if slope != 0.0 && slope.is_finite() {
                let newton = ret - residual / slope;
                match (lo, hi) {
                    (Some(l), Some(h)) if !(newton > l && newton < h) => 0.5 * (l + h),
                    (Some(l), None) if newton < l => 0.5 * (l + ret),
                    (None, Some(h)) if newton > h => 0.5 * (h + ret),
                    _ => newton,
                }
            } else if let (Some(l), Some(h)) = (lo, hi) {
                0.5 * (l + h)
            } else {
                trace!(t = ret, "root finder stopped at zero derivative");
                return ret;
            };

            if next == ret || !next.is_finite() {
                break;
            }
            ret = next;
        }

        trace!(t = ret, residual, "root finder returned without converging");
        ret
    }
}
