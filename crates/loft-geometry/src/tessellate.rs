//! Tessellation utilities for converting curves and surfaces to discrete
//! representations.

use loft_math::{Point3, Vector3};

use crate::curve::Curve;
use crate::surface::Surface;

/// Sample a curve uniformly in parameter space.
///
/// Returns `segments + 1` points covering the full domain, endpoints
/// included.
pub fn sample_curve(curve: &dyn Curve, segments: usize) -> Vec<Point3> {
    let (t_min, t_max) = curve.domain();
    (0..=segments)
        .map(|i| {
            let t = t_min + (t_max - t_min) * i as f64 / segments as f64;
            curve.point_at(t)
        })
        .collect()
}

/// Convert a curve to a polyline using adaptive subdivision.
///
/// Segments where the midpoint deviates from the chord by more than
/// `tolerance` are split recursively, up to a fixed depth cap.
pub fn curve_to_polyline(curve: &dyn Curve, tolerance: f64) -> Vec<Point3> {
    let (t_min, t_max) = curve.domain();
    let mut points = Vec::new();
    points.push(curve.point_at(t_min));
    subdivide_curve(curve, t_min, t_max, tolerance, &mut points, 0);
    points
}

/// Maximum recursion depth for adaptive subdivision.
const MAX_DEPTH: u32 = 12;

fn subdivide_curve(
    curve: &dyn Curve,
    t0: f64,
    t1: f64,
    tolerance: f64,
    points: &mut Vec<Point3>,
    depth: u32,
) {
    if depth >= MAX_DEPTH {
        points.push(curve.point_at(t1));
        return;
    }

    let t_mid = (t0 + t1) * 0.5;
    let p0 = curve.point_at(t0);
    let p1 = curve.point_at(t1);
    let p_mid = curve.point_at(t_mid);

    // Chord midpoint
    let chord_mid = (p0 + p1) * 0.5;
    let deviation = (p_mid - chord_mid).length();

    if deviation > tolerance {
        subdivide_curve(curve, t0, t_mid, tolerance, points, depth + 1);
        subdivide_curve(curve, t_mid, t1, tolerance, points, depth + 1);
    } else {
        points.push(curve.point_at(t1));
    }
}

/// A triangle mesh produced by surface tessellation.
#[derive(Debug, Clone, Default)]
pub struct SurfaceMesh {
    pub positions: Vec<Point3>,
    pub normals: Vec<Vector3>,
    /// Vertex index triples, counter-clockwise.
    pub triangles: Vec<[u32; 3]>,
}

/// Convert a surface to a triangle mesh using uniform parameter
/// subdivision, with per-vertex normals evaluated from the surface.
pub fn surface_to_mesh(surface: &dyn Surface, u_divs: usize, v_divs: usize) -> SurfaceMesh {
    let (u_min, u_max) = surface.domain_u();
    let (v_min, v_max) = surface.domain_v();

    let u_count = u_divs + 1;
    let v_count = v_divs + 1;

    let mut positions = Vec::with_capacity(u_count * v_count);
    let mut normals = Vec::with_capacity(u_count * v_count);
    for i in 0..u_count {
        let u = u_min + (u_max - u_min) * i as f64 / u_divs as f64;
        for j in 0..v_count {
            let v = v_min + (v_max - v_min) * j as f64 / v_divs as f64;
            positions.push(surface.point_at(u, v));
            normals.push(surface.normal_at(u, v));
        }
    }

    // Two triangles per quad
    let mut triangles = Vec::with_capacity(u_divs * v_divs * 2);
    for i in 0..u_divs {
        for j in 0..v_divs {
            let idx = |ii: usize, jj: usize| -> u32 { (ii * v_count + jj) as u32 };

            triangles.push([idx(i, j), idx(i + 1, j), idx(i + 1, j + 1)]);
            triangles.push([idx(i, j), idx(i + 1, j + 1), idx(i, j + 1)]);
        }
    }

    SurfaceMesh {
        positions,
        normals,
        triangles,
    }
}
