//! Rational tensor-product (NURBS) surface evaluation.

use serde::{Deserialize, Serialize};

use loft_core::{LoftError, Result, Validate};
use loft_math::{Aabb3, Point3, Vector3};

use super::Surface;
use crate::nurbs::{
    basis, basis_first_derivative, generate_knots, nudge_inside, ControlPoint, SplineType,
    WEIGHT_EPSILON,
};

/// A rational tensor-product surface over a row-major control grid.
///
/// Each axis carries its own spline type; looping an axis duplicates the
/// first `order` columns (x) or rows (y) of the grid, reusing the curve's
/// wrap strategy so the basis recursion stays topology-oblivious. Both
/// axes may loop at once, wrapping the already-wrapped grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NurbsSurface {
    order: usize,
    x_type: SplineType,
    y_type: SplineType,
    /// Capping mode: first and last rows collapsed to their centroids.
    capped: bool,
    /// Extended grid width (loop duplicates included).
    width: usize,
    /// Extended grid height (loop duplicates included).
    height: usize,
    /// Row-major control net, `width * height` entries.
    points: Vec<ControlPoint>,
    knots_x: Vec<f64>,
    knots_y: Vec<f64>,
}

impl NurbsSurface {
    /// Build a surface from a row-major `lx` x `ly` grid of weighted
    /// control points (`grid[iy * lx + ix]`).
    pub fn new(
        grid: Vec<ControlPoint>,
        order: usize,
        lx: usize,
        ly: usize,
        x_type: SplineType,
        y_type: SplineType,
    ) -> Result<Self> {
        Self::with_caps(grid, order, lx, ly, x_type, y_type, false)
    }

    /// As [`NurbsSurface::new`], optionally collapsing the first and last
    /// rows to their centroids to cap the surface.
    ///
    /// Capped surfaces ignore `set_control_point` entirely; see the
    /// mutation notes there.
    pub fn with_caps(
        grid: Vec<ControlPoint>,
        order: usize,
        lx: usize,
        ly: usize,
        x_type: SplineType,
        y_type: SplineType,
        capped: bool,
    ) -> Result<Self> {
        if grid.is_empty() {
            return Err(LoftError::EmptyControlNet("surface".into()));
        }
        if lx * ly != grid.len() {
            return Err(LoftError::GridDimensionMismatch {
                len: grid.len(),
                width: lx,
                height: ly,
            });
        }
        if lx <= order {
            return Err(LoftError::NotEnoughControlPoints { order, count: lx });
        }
        if ly <= order {
            return Err(LoftError::NotEnoughControlPoints { order, count: ly });
        }

        let mut points = grid;
        if capped {
            collapse_row(&mut points, lx, 0);
            collapse_row(&mut points, lx, ly - 1);
        }

        let mut width = lx;
        let mut height = ly;
        if x_type.is_loop() {
            let mut extended = Vec::with_capacity((lx + order) * ly);
            for row in points.chunks(lx) {
                extended.extend_from_slice(row);
                extended.extend_from_slice(&row[..order]);
            }
            points = extended;
            width += order;
        }
        if y_type.is_loop() {
            let head_rows = points[..order * width].to_vec();
            points.extend(head_rows);
            height += order;
        }

        let knots_x = generate_knots(order, width, x_type.knot_type());
        let knots_y = generate_knots(order, height, y_type.knot_type());

        Ok(Self {
            order,
            x_type,
            y_type,
            capped,
            width,
            height,
            points,
            knots_x,
            knots_y,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn x_type(&self) -> SplineType {
        self.x_type
    }

    pub fn y_type(&self) -> SplineType {
        self.y_type
    }

    pub fn is_capped(&self) -> bool {
        self.capped
    }

    /// Extended grid dimensions, loop duplicates included.
    pub fn grid_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Logical grid dimensions (loop duplicates excluded).
    pub fn num_control_points(&self) -> (usize, usize) {
        let lx = if self.x_type.is_loop() {
            self.width - self.order
        } else {
            self.width
        };
        let ly = if self.y_type.is_loop() {
            self.height - self.order
        } else {
            self.height
        };
        (lx, ly)
    }

    /// The internal control net, row-major over the extended grid.
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn control_point(&self, ix: usize, iy: usize) -> ControlPoint {
        self.points[iy * self.width + ix]
    }

    pub fn knots_x(&self) -> &[f64] {
        &self.knots_x
    }

    pub fn knots_y(&self) -> &[f64] {
        &self.knots_y
    }

    /// Overwrite the control point at logical grid index `(ix, iy)`.
    ///
    /// Mirrors the curve's wrap duplication per axis: up to four grid
    /// cells are written when both axes loop and the index falls in the
    /// wrapped region. Capped surfaces ignore the call; the cap rows were
    /// collapsed at construction and stay frozen.
    pub fn set_control_point(&mut self, ix: usize, iy: usize, cp: ControlPoint) {
        if self.capped {
            return;
        }
        let (lx, ly) = self.num_control_points();
        debug_assert!(
            ix < lx && iy < ly,
            "control point index ({}, {}) out of range",
            ix,
            iy
        );

        let mut xs = vec![ix];
        if self.x_type.is_loop() && ix < self.order {
            xs.push(self.width - self.order + ix);
        }
        let mut ys = vec![iy];
        if self.y_type.is_loop() && iy < self.order {
            ys.push(self.height - self.order + iy);
        }
        for &y in &ys {
            for &x in &xs {
                self.points[y * self.width + x] = cp;
            }
        }
    }

    /// Evaluate at normalized parameters, conventionally in `[0, 1]`.
    ///
    /// Both parameters are remapped affinely onto their knot-space axis
    /// domains. The flag reports whether both remapped parameters fell
    /// inside their domains; out-of-domain evaluation still produces a
    /// point.
    pub fn evaluate(&self, norm_u: f64, norm_v: f64) -> (Point3, bool) {
        let (x_min, x_max) = self.domain_x();
        let (y_min, y_max) = self.domain_y();
        let tx = x_min + (x_max - x_min) * norm_u;
        let ty = y_min + (y_max - y_min) * norm_v;
        let in_domain = tx >= x_min && tx <= x_max && ty >= y_min && ty <= y_max;
        (self.point_on(tx, ty), in_domain)
    }

    /// Unit surface normal at normalized parameters.
    pub fn normal(&self, norm_u: f64, norm_v: f64) -> Vector3 {
        let (x_min, x_max) = self.domain_x();
        let (y_min, y_max) = self.domain_y();
        self.normal_on(
            x_min + (x_max - x_min) * norm_u,
            y_min + (y_max - y_min) * norm_v,
        )
    }

    /// Bounding box of the control net (conservative bound on the surface
    /// by the convex hull property).
    pub fn control_box(&self) -> Aabb3 {
        self.points[1..]
            .iter()
            .fold(Aabb3::from_point(self.points[0].position), |acc, cp| {
                acc.grown_to(cp.position)
            })
    }

    fn domain_x(&self) -> (f64, f64) {
        (self.knots_x[self.order], self.knots_x[self.width])
    }

    fn domain_y(&self) -> (f64, f64) {
        (self.knots_y[self.order], self.knots_y[self.height])
    }

    /// Rational double sum over the whole grid. The denominator is
    /// pre-seeded with the epsilon, which removes the explicit zero branch
    /// the curve needs.
    fn point_on(&self, tx: f64, ty: f64) -> Point3 {
        let tx = nudge_inside(tx, self.domain_x().1);
        let ty = nudge_inside(ty, self.domain_y().1);

        let bx: Vec<f64> = (0..self.width)
            .map(|x| basis(x, self.order, tx, &self.knots_x))
            .collect();

        let mut f = Point3::ZERO;
        let mut d = WEIGHT_EPSILON;
        for y in 0..self.height {
            let by = basis(y, self.order, ty, &self.knots_y);
            for x in 0..self.width {
                let cp = self.points[y * self.width + x];
                let bw = bx[x] * by * cp.weight;
                f += bw * cp.position;
                d += bw;
            }
        }
        f / d
    }

    /// Rational partial derivatives via the quotient rule on the
    /// homogeneous sums.
    fn partials(&self, tx: f64, ty: f64) -> (Vector3, Vector3) {
        let tx = nudge_inside(tx, self.domain_x().1);
        let ty = nudge_inside(ty, self.domain_y().1);

        let bx: Vec<f64> = (0..self.width)
            .map(|x| basis(x, self.order, tx, &self.knots_x))
            .collect();
        let dbx: Vec<f64> = (0..self.width)
            .map(|x| basis_first_derivative(x, self.order, tx, &self.knots_x))
            .collect();

        let mut a = Point3::ZERO;
        let mut da_u = Point3::ZERO;
        let mut da_v = Point3::ZERO;
        let mut w = 0.0;
        let mut dw_u = 0.0;
        let mut dw_v = 0.0;

        for y in 0..self.height {
            let by = basis(y, self.order, ty, &self.knots_y);
            let dby = basis_first_derivative(y, self.order, ty, &self.knots_y);
            for x in 0..self.width {
                let cp = self.points[y * self.width + x];
                let buv = bx[x] * by * cp.weight;
                let dbu = dbx[x] * by * cp.weight;
                let dbv = bx[x] * dby * cp.weight;

                a += buv * cp.position;
                da_u += dbu * cp.position;
                da_v += dbv * cp.position;
                w += buv;
                dw_u += dbu;
                dw_v += dbv;
            }
        }

        if w.abs() < WEIGHT_EPSILON {
            return (da_u, da_v);
        }
        let c = a / w;
        ((da_u - dw_u * c) / w, (da_v - dw_v * c) / w)
    }

    fn normal_on(&self, tx: f64, ty: f64) -> Vector3 {
        let (du, dv) = self.partials(tx, ty);
        let n = du.cross(dv);
        let len = n.length();
        if len < 1e-15 {
            Vector3::Z
        } else {
            n / len
        }
    }
}

/// Collapse one grid row to the centroid of its positions (weights are
/// left untouched).
fn collapse_row(points: &mut [ControlPoint], lx: usize, row: usize) {
    let slice = &mut points[row * lx..(row + 1) * lx];
    let centroid = slice
        .iter()
        .fold(Point3::ZERO, |acc, cp| acc + cp.position)
        / lx as f64;
    for cp in slice {
        cp.position = centroid;
    }
}

impl Surface for NurbsSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.point_on(u, v)
    }

    fn normal_at(&self, u: f64, v: f64) -> Vector3 {
        self.normal_on(u, v)
    }

    fn domain_u(&self) -> (f64, f64) {
        self.domain_x()
    }

    fn domain_v(&self) -> (f64, f64) {
        self.domain_y()
    }
}

impl Validate for NurbsSurface {
    fn validate(&self) -> Result<()> {
        if self.points.len() != self.width * self.height {
            return Err(LoftError::GridDimensionMismatch {
                len: self.points.len(),
                width: self.width,
                height: self.height,
            });
        }
        for (knots, count, axis) in [
            (&self.knots_x, self.width, "x"),
            (&self.knots_y, self.height, "y"),
        ] {
            if knots.len() != count + self.order + 1 {
                return Err(LoftError::InvalidKnots(format!(
                    "{} axis: expected {} knots, got {}",
                    axis,
                    count + self.order + 1,
                    knots.len()
                )));
            }
            if knots.windows(2).any(|w| w[1] < w[0]) {
                return Err(LoftError::InvalidKnots(format!(
                    "{} axis: knot vector is not non-decreasing",
                    axis
                )));
            }
        }
        let (lx, ly) = self.num_control_points();
        if self.x_type.is_loop() {
            for y in 0..self.height {
                for i in 0..self.order {
                    if self.control_point(lx + i, y) != self.control_point(i, y) {
                        return Err(LoftError::InvalidControlNet(format!(
                            "x wrap out of sync at column {} row {}",
                            lx + i,
                            y
                        )));
                    }
                }
            }
        }
        if self.y_type.is_loop() {
            for i in 0..self.order {
                for x in 0..self.width {
                    if self.control_point(x, ly + i) != self.control_point(x, i) {
                        return Err(LoftError::InvalidControlNet(format!(
                            "y wrap out of sync at row {} column {}",
                            ly + i,
                            x
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
