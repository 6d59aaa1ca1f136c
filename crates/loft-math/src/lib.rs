//! Math primitives shared by the Loft geometry kernel.

pub mod aabb;

pub use aabb::Aabb3;
pub use glam::DVec3;

pub type Point3 = DVec3;
pub type Vector3 = DVec3;
