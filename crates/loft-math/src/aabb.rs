use serde::{Deserialize, Serialize};

use crate::{Point3, Vector3};

/// Axis-aligned bounding box in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb3 {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb3 {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Degenerate box containing a single point.
    pub fn from_point(p: Point3) -> Self {
        Self { min: p, max: p }
    }

    /// Smallest box containing all `points`, or `None` for an empty slice.
    pub fn from_points(points: impl IntoIterator<Item = Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::from_point(first), |acc, p| acc.grown_to(p)))
    }

    /// Extend the box so it also contains `p`.
    pub fn grown_to(self, p: Point3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    pub fn center(&self) -> Point3 {
        (self.min + self.max) * 0.5
    }

    pub fn extents(&self) -> Vector3 {
        self.max - self.min
    }

    pub fn contains_point(&self, p: Point3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow the box by `amount` on every side.
    pub fn expand(&self, amount: f64) -> Self {
        let offset = Vector3::splat(amount);
        Self {
            min: self.min - offset,
            max: self.max + offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::dvec3;

    #[test]
    fn test_from_points() {
        let pts = [
            dvec3(1.0, 2.0, 3.0),
            dvec3(-1.0, 5.0, 0.0),
            dvec3(3.0, -1.0, 2.0),
        ];
        let aabb = Aabb3::from_points(pts).unwrap();
        assert_eq!(aabb.min, dvec3(-1.0, -1.0, 0.0));
        assert_eq!(aabb.max, dvec3(3.0, 5.0, 3.0));
    }

    #[test]
    fn test_from_points_empty() {
        assert!(Aabb3::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_center_and_extents() {
        let aabb = Aabb3::new(dvec3(0.0, 0.0, 0.0), dvec3(2.0, 4.0, 6.0));
        assert_relative_eq!(aabb.center().y, 2.0);
        assert_relative_eq!(aabb.extents().z, 6.0);
    }

    #[test]
    fn test_contains_point() {
        let aabb = Aabb3::new(dvec3(0.0, 0.0, 0.0), dvec3(1.0, 1.0, 1.0));
        assert!(aabb.contains_point(dvec3(0.5, 0.5, 0.5)));
        assert!(aabb.contains_point(dvec3(1.0, 1.0, 1.0)));
        assert!(!aabb.contains_point(dvec3(1.5, 0.5, 0.5)));
    }

    #[test]
    fn test_union_and_expand() {
        let a = Aabb3::new(dvec3(0.0, 0.0, 0.0), dvec3(1.0, 1.0, 1.0));
        let b = Aabb3::new(dvec3(2.0, -1.0, 0.0), dvec3(3.0, 0.5, 2.0));
        let u = a.union(&b);
        assert_eq!(u.min, dvec3(0.0, -1.0, 0.0));
        assert_eq!(u.max, dvec3(3.0, 1.0, 2.0));

        let e = a.expand(0.5);
        assert_eq!(e.min, dvec3(-0.5, -0.5, -0.5));
        assert_eq!(e.max, dvec3(1.5, 1.5, 1.5));
    }
}
