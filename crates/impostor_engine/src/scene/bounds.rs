//! Bounding volumes for scene geometry
//!
//! Axis-aligned boxes are the stored representation on geometry nodes; the
//! cache derives bounding spheres from merged world-space boxes when framing
//! a capture.

use crate::foundation::math::{Mat4, Point3, Vec3};

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check whether the box encloses any volume at all
    ///
    /// A box whose max is not strictly above min on every axis still counts
    /// as valid if it is a point or a flat slab; only an inverted box (min
    /// above max) or a non-finite corner is invalid.
    pub fn is_valid(&self) -> bool {
        let finite = self.min.iter().all(|c| c.is_finite()) && self.max.iter().all(|c| c.is_finite());
        finite && self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Merge this box with another, producing the enclosing box
    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Transform the box by a matrix and return the enclosing axis-aligned box
    ///
    /// Transforms all eight corners; the result is conservative for rotated
    /// boxes.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut min = Vec3::repeat(f32::INFINITY);
        let mut max = Vec3::repeat(f32::NEG_INFINITY);
        for corner in corners {
            let moved = matrix.transform_point(&Point3::from(corner));
            min = min.inf(&moved.coords);
            max = max.sup(&moved.coords);
        }

        AABB { min, max }
    }

    /// Derive the bounding sphere enclosing this box
    ///
    /// Center is the box center, radius the half-diagonal, so the sphere
    /// encloses the corners exactly.
    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere {
            center: self.center(),
            radius: self.extents().magnitude(),
        }
    }
}

/// A bounding sphere enclosing a volume of geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Whether the sphere is usable for camera framing
    pub fn is_degenerate(&self) -> bool {
        !(self.radius.is_finite() && self.radius > 0.0) || !self.center.iter().all(|c| c.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_union_encloses_both() {
        let a = AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let b = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(3.0, 2.0, 1.0));

        let merged = a.union(&b);
        assert_eq!(merged.min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(merged.max, Vec3::new(3.0, 2.0, 1.0));
    }

    #[test]
    fn test_transformed_translates_corners() {
        let aabb = AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let moved = aabb.transformed(&Mat4::new_translation(&Vec3::new(5.0, 0.0, 0.0)));

        assert_relative_eq!(moved.center(), Vec3::new(5.0, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(moved.extents(), Vec3::new(1.0, 1.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_bounding_sphere_encloses_corners() {
        let aabb = AABB::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
        let sphere = aabb.bounding_sphere();

        assert_relative_eq!(sphere.center, Vec3::zeros(), epsilon = 1e-6);
        assert_relative_eq!(sphere.radius, (1.0f32 + 4.0 + 9.0).sqrt(), epsilon = 1e-6);
        assert!(!sphere.is_degenerate());
    }

    #[test]
    fn test_point_box_sphere_is_degenerate() {
        let aabb = AABB::new(Vec3::zeros(), Vec3::zeros());
        assert!(aabb.is_valid());
        assert!(aabb.bounding_sphere().is_degenerate());
    }
}
