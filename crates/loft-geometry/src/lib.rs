//! Loft geometry kernel: rational B-spline (NURBS) evaluation.
//!
//! Control points plus a degree and a spline type go in; knot vectors are
//! derived at construction; evaluation at normalized parameters returns 3D
//! points for the surrounding viewer/renderer to consume.

pub mod curve;
pub mod nurbs;
pub mod surface;
pub mod tessellate;

pub use curve::{Curve, NurbsCurve};
pub use nurbs::{ControlPoint, KnotType, SplineType};
pub use surface::{NurbsSurface, Surface};
