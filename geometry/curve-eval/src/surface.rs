//! Tensor-product B-spline surfaces.

use crate::basis::BasisEvaluator;
use crate::bspline::derive_degree;
use crate::point::{homogeneous_divide, rational_derivative};
use crate::{CurveError, KnotVector, Point, Result, SurfaceEvaluator};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A B-spline or NURBS surface over a rectangular control grid.
///
/// The grid is stored row-major: `control_points[v][u]`, with one row per
/// control point along `v` and one column per control point along `u`.
/// Each direction has its own knot vector and degree.
///
/// # Example
///
/// ```
/// use curve_eval::{BSplineSurface, SurfaceEvaluator, point};
///
/// // Bilinear patch
/// let surface = BSplineSurface::new(
///     vec![
///         vec![point(&[0.0, 0.0, 0.0]), point(&[1.0, 0.0, 0.0])],
///         vec![point(&[0.0, 1.0, 0.0]), point(&[1.0, 1.0, 1.0])],
///     ],
///     vec![0.0, 0.0, 1.0, 1.0],
///     vec![0.0, 0.0, 1.0, 1.0],
/// )
/// .unwrap();
///
/// let p = surface.evaluate(0.5, 0.5);
/// assert!((p[2] - 0.25).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "BSplineSurfaceDef")
)]
pub struct BSplineSurface {
    control_points: Vec<Vec<Point>>,
    u_knots: KnotVector,
    v_knots: KnotVector,
    rational: bool,
    divide: bool,
}

impl BSplineSurface {
    /// Create a polynomial surface; degrees are derived from the knot counts.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidConfiguration`] if the grid has fewer
    /// than two rows or columns, ragged rows, inconsistent point dimensions,
    /// or a derived degree outside the valid range. Returns
    /// [`CurveError::MalformedKnotVector`] if either knot vector is invalid.
    pub fn new(control_points: Vec<Vec<Point>>, u_knots: Vec<f64>, v_knots: Vec<f64>) -> Result<Self> {
        Self::build(control_points, u_knots, v_knots, false)
    }

    /// Create a rational surface from homogeneous control points.
    ///
    /// # Errors
    ///
    /// As [`Self::new`], and also if the points have fewer than two
    /// components.
    pub fn rational(
        control_points: Vec<Vec<Point>>,
        u_knots: Vec<f64>,
        v_knots: Vec<f64>,
    ) -> Result<Self> {
        Self::build(control_points, u_knots, v_knots, true)
    }

    /// Create a polynomial surface with clamped knot vectors along both axes.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidConfiguration`] if the grid is too small
    /// for the requested degrees or is malformed.
    pub fn clamped(control_points: Vec<Vec<Point>>, u_degree: usize, v_degree: usize) -> Result<Self> {
        let columns = control_points.first().map_or(0, Vec::len);
        let u_knots = KnotVector::clamped(columns, u_degree)?;
        let v_knots = KnotVector::clamped(control_points.len(), v_degree)?;
        Self::new(
            control_points,
            u_knots.as_slice().to_vec(),
            v_knots.as_slice().to_vec(),
        )
    }

    fn build(
        control_points: Vec<Vec<Point>>,
        u_knots: Vec<f64>,
        v_knots: Vec<f64>,
        rational: bool,
    ) -> Result<Self> {
        let (rows, columns) = check_grid(&control_points, rational)?;
        let u_degree = derive_degree(columns, u_knots.len())?;
        let v_degree = derive_degree(rows, v_knots.len())?;

        Ok(Self {
            control_points,
            u_knots: KnotVector::new(u_knots, u_degree)?,
            v_knots: KnotVector::new(v_knots, v_degree)?,
            rational,
            divide: rational,
        })
    }

    /// Enable or disable the homogeneous divide of a rational surface.
    #[must_use]
    pub fn with_divide(mut self, divide: bool) -> Self {
        self.divide = divide && self.rational;
        self
    }

    /// Degree along `u`.
    #[must_use]
    pub fn u_degree(&self) -> usize {
        self.u_knots.degree()
    }

    /// Degree along `v`.
    #[must_use]
    pub fn v_degree(&self) -> usize {
        self.v_knots.degree()
    }

    /// Knot vector along `u`.
    #[must_use]
    pub fn u_knots(&self) -> &KnotVector {
        &self.u_knots
    }

    /// Knot vector along `v`.
    #[must_use]
    pub fn v_knots(&self) -> &KnotVector {
        &self.v_knots
    }

    /// The control grid, `control_points[v][u]`.
    #[must_use]
    pub fn control_points(&self) -> &[Vec<Point>] {
        &self.control_points
    }

    /// Whether control points are homogeneous.
    #[must_use]
    pub fn is_rational(&self) -> bool {
        self.rational
    }

    /// Undivided mixed partial `∂^(du+dv) / ∂u^du ∂v^dv`.
    fn blend(&self, u: f64, v: f64, du: usize, dv: usize) -> Point {
        let mut u_basis = BasisEvaluator::new();
        let mut v_basis = BasisEvaluator::new();
        let bu = u_basis.derivative_clamped(&self.u_knots, u, du);
        let bv = v_basis.derivative_clamped(&self.v_knots, v, dv);

        let mut acc = Point::zeros(self.control_points[0][0].len());
        for (j, &wv) in bv.values.iter().enumerate() {
            let row = &self.control_points[bv.first + j];
            for (i, &wu) in bu.values.iter().enumerate() {
                let w = wu * wv;
                if w != 0.0 {
                    acc.axpy(w, &row[bu.first + i], 1.0);
                }
            }
        }
        acc
    }

    fn partial(&self, u: f64, v: f64, du: usize, dv: usize) -> Point {
        let d = self.blend(u, v, du, dv);
        if self.divide {
            rational_derivative(&self.blend(u, v, 0, 0), &d)
        } else {
            d
        }
    }
}

impl SurfaceEvaluator for BSplineSurface {
    fn evaluate(&self, u: f64, v: f64) -> Point {
        let h = self.blend(u, v, 0, 0);
        if self.divide {
            homogeneous_divide(&h)
        } else {
            h
        }
    }

    fn end_points(&self) -> (f64, f64, f64, f64) {
        let (u0, u1) = self.u_knots.domain();
        let (v0, v1) = self.v_knots.domain();
        (u0, u1, v0, v1)
    }

    fn tangent(&self, u: f64, v: f64) -> Point {
        self.partial(u, v, 1, 0)
    }

    fn bitangent(&self, u: f64, v: f64) -> Point {
        self.partial(u, v, 0, 1)
    }
}

/// Check grid shape and point dimensions, returning `(rows, columns)`.
fn check_grid(control_points: &[Vec<Point>], rational: bool) -> Result<(usize, usize)> {
    let rows = control_points.len();
    let columns = control_points.first().map_or(0, Vec::len);
    if rows < 2 || columns < 2 {
        return Err(CurveError::invalid_configuration(format!(
            "control grid must be at least 2x2, got {rows}x{columns}"
        )));
    }
    if let Some(row) = control_points.iter().position(|r| r.len() != columns) {
        return Err(CurveError::invalid_configuration(format!(
            "row {row} has {} points, expected {columns}",
            control_points[row].len()
        )));
    }

    let dim = control_points[0][0].len();
    let min_dim = if rational { 2 } else { 1 };
    if dim < min_dim {
        return Err(CurveError::invalid_configuration(format!(
            "control points need at least {min_dim} components, got {dim}"
        )));
    }
    if control_points.iter().flatten().any(|p| p.len() != dim) {
        return Err(CurveError::invalid_configuration(format!(
            "control points must all have {dim} components"
        )));
    }
    Ok((rows, columns))
}

/// Serialized form of [`BSplineSurface`], validated on the way in.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct BSplineSurfaceDef {
    control_points: Vec<Vec<Point>>,
    u_knots: KnotVector,
    v_knots: KnotVector,
    rational: bool,
    divide: bool,
}

#[cfg(feature = "serde")]
impl TryFrom<BSplineSurfaceDef> for BSplineSurface {
    type Error = CurveError;

    fn try_from(def: BSplineSurfaceDef) -> Result<Self> {
        let (rows, columns) = check_grid(&def.control_points, def.rational)?;
        for (name, count, knots) in [("u", columns, &def.u_knots), ("v", rows, &def.v_knots)] {
            let degree = derive_degree(count, knots.len())?;
            if degree != knots.degree() {
                return Err(CurveError::invalid_configuration(format!(
                    "{name} knot vector has degree {}, grid and knots give {degree}",
                    knots.degree()
                )));
            }
        }
        Ok(Self {
            control_points: def.control_points,
            u_knots: def.u_knots,
            v_knots: def.v_knots,
            rational: def.rational,
            divide: def.divide && def.rational,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::point::point;
    use approx::assert_relative_eq;

    fn saddle() -> BSplineSurface {
        // z = (2u - 1)(2v - 1) sampled on a biquadratic grid
        let grid = (0..3)
            .map(|j| {
                (0..3)
                    .map(|i| {
                        let (x, y) = (f64::from(i) / 2.0, f64::from(j) / 2.0);
                        point(&[x, y, (2.0 * x - 1.0) * (2.0 * y - 1.0)])
                    })
                    .collect()
            })
            .collect();
        BSplineSurface::clamped(grid, 2, 2).unwrap()
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_validates_grid() {
        let surface = saddle();
        let json = serde_json::to_string(&surface);
        assert!(json.is_ok());
        let parsed: std::result::Result<BSplineSurface, _> =
            serde_json::from_str(&json.unwrap_or_default());
        assert_eq!(parsed.ok(), Some(surface));

        let mut ragged = serde_json::to_value(saddle()).unwrap();
        ragged["control_points"][1].as_array_mut().unwrap().pop();
        assert!(serde_json::from_value::<BSplineSurface>(ragged).is_err());

        // Three rows need a quadratic v vector
        let mut mismatched = serde_json::to_value(saddle()).unwrap();
        mismatched["v_knots"] =
            serde_json::to_value(KnotVector::new(vec![0.0, 0.0, 0.5, 0.5, 1.0, 1.0], 1).unwrap())
                .unwrap();
        assert!(serde_json::from_value::<BSplineSurface>(mismatched).is_err());
    }

    #[test]
    fn test_corners_interpolate() {
        let s = saddle();
        assert_eq!(s.end_points(), (0.0, 1.0, 0.0, 1.0));
        assert_relative_eq!(s.evaluate(0.0, 0.0), point(&[0.0, 0.0, 1.0]), epsilon = 1e-12);
        assert_relative_eq!(s.evaluate(1.0, 0.0), point(&[1.0, 0.0, -1.0]), epsilon = 1e-12);
        assert_relative_eq!(s.evaluate(1.0, 1.0), point(&[1.0, 1.0, 1.0]), epsilon = 1e-12);
    }

    #[test]
    fn test_bilinear_reproduction() {
        // Bilinear data is reproduced exactly by a biquadratic grid
        let s = saddle();
        for &(u, v) in &[(0.2, 0.7), (0.5, 0.5), (0.9, 0.1)] {
            let p = s.evaluate(u, v);
            assert_relative_eq!(p, point(&[u, v, (2.0 * u - 1.0) * (2.0 * v - 1.0)]), epsilon = 1e-12);
            assert_relative_eq!(s.tangent(u, v), point(&[1.0, 0.0, 2.0 * (2.0 * v - 1.0)]), epsilon = 1e-10);
            assert_relative_eq!(s.bitangent(u, v), point(&[0.0, 1.0, 2.0 * (2.0 * u - 1.0)]), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_normal_is_unit_and_perpendicular() {
        let s = saddle();
        let (u, v) = (0.3, 0.6);
        let n = s.normal(u, v);
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(n.dot(&s.tangent(u, v)), 0.0, epsilon = 1e-10);
        assert_relative_eq!(n.dot(&s.bitangent(u, v)), 0.0, epsilon = 1e-10);

        // Flat center: normal points up
        assert_relative_eq!(s.normal(0.5, 0.5), point(&[0.0, 0.0, 1.0]), epsilon = 1e-10);
    }

    #[test]
    fn test_rational_cylinder_patch() {
        // Quarter circle in x/z extruded along y
        let w = std::f64::consts::FRAC_1_SQRT_2;
        let arc = [[1.0, 0.0, 1.0], [w, w, w], [0.0, 1.0, 1.0]];
        let grid = (0..2)
            .map(|j| {
                let y = f64::from(j);
                arc.iter()
                    .map(|&[x, z, wt]| point(&[x, y * wt, z, wt]))
                    .collect()
            })
            .collect();
        let s = BSplineSurface::rational(grid, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0], vec![0.0, 0.0, 1.0, 1.0]).unwrap();

        for &(u, v) in &[(0.1, 0.2), (0.5, 0.5), (0.8, 0.9)] {
            let p = s.evaluate(u, v);
            assert_eq!(p.len(), 3);
            assert_relative_eq!(p[0] * p[0] + p[2] * p[2], 1.0, epsilon = 1e-12);
            assert_relative_eq!(p[1], v, epsilon = 1e-12);

            let h = 1e-6;
            let fd = (s.evaluate(u + h, v) - s.evaluate(u - h, v)) / (2.0 * h);
            assert_relative_eq!(s.tangent(u, v), fd, epsilon = 1e-6);
            assert_relative_eq!(s.bitangent(u, v), point(&[0.0, 1.0, 0.0]), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_two_dimensional_gradient_is_padded() {
        let s = BSplineSurface::new(
            vec![
                vec![point(&[0.0, 0.0]), point(&[2.0, 0.0])],
                vec![point(&[0.0, 3.0]), point(&[2.0, 3.0])],
            ],
            vec![0.0, 0.0, 1.0, 1.0],
            vec![0.0, 0.0, 1.0, 1.0],
        )
        .unwrap();
        assert_relative_eq!(s.gradient(0.5, 0.5), point(&[0.0, 0.0, 6.0]), epsilon = 1e-12);
    }

    #[test]
    fn test_configuration_errors() {
        let ragged = vec![
            vec![point(&[0.0]), point(&[1.0])],
            vec![point(&[0.0])],
        ];
        let err = BSplineSurface::new(ragged, vec![0.0, 0.0, 1.0, 1.0], vec![0.0, 0.0, 1.0, 1.0]).unwrap_err();
        assert!(err.is_invalid_configuration());

        let single_row = vec![vec![point(&[0.0]), point(&[1.0])]];
        let err = BSplineSurface::new(single_row, vec![0.0, 0.0, 1.0, 1.0], vec![0.0, 1.0]).unwrap_err();
        assert!(err.is_invalid_configuration());

        let grid = vec![
            vec![point(&[0.0]), point(&[1.0])],
            vec![point(&[0.0]), point(&[1.0])],
        ];
        let err = BSplineSurface::new(grid, vec![0.0, 1.0, 0.0, 1.0], vec![0.0, 0.0, 1.0, 1.0]).unwrap_err();
        assert!(err.is_malformed_knots());
    }
}
