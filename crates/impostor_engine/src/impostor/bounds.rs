//! Target bounds tracking
//!
//! Computes the world-space bounding sphere a capture frames against, and the
//! offset between that sphere's center and the target's nominal position. The
//! offset is what keeps the stand-in glued to the geometry's visual center
//! while the target itself may be anchored elsewhere.

use crate::foundation::math::Vec3;
use crate::scene::{BoundingSphere, NodeId, NodeKind, Scene};

/// Bounding sphere of a target subtree plus its center offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetBounds {
    /// World-space bounding sphere of the subtree's geometry
    pub sphere: BoundingSphere,
    /// Sphere center minus the target's nominal world position
    pub offset: Vec3,
}

/// Compute the bounds of the geometry under `target`
///
/// Merges the world-space boxes of every geometry node in the subtree
/// (hidden nodes included, matching what a capture would make visible) and
/// derives the enclosing sphere. Returns `None` when the subtree holds no
/// geometry or the result is degenerate; the caller treats that as "skip
/// this refresh", never as an error.
pub fn subtree_bounds(scene: &Scene, target: NodeId) -> Option<TargetBounds> {
    if !scene.contains(target) {
        return None;
    }

    let mut merged: Option<crate::scene::AABB> = None;
    for id in scene.descendants(target) {
        let Some(node) = scene.node(id) else { continue };
        if let NodeKind::Geometry { bounds, .. } = &node.kind {
            let world_box = bounds.transformed(&scene.world_matrix(id));
            if !world_box.is_valid() {
                continue;
            }
            merged = Some(match merged {
                Some(accumulated) => accumulated.union(&world_box),
                None => world_box,
            });
        }
    }

    let sphere = merged?.bounding_sphere();
    if sphere.is_degenerate() {
        return None;
    }

    let offset = sphere.center - scene.world_position(target);
    Some(TargetBounds { sphere, offset })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{SceneNode, AABB};
    use approx::assert_relative_eq;

    #[test]
    fn test_bounds_merge_children_in_world_space() {
        let mut scene = Scene::new();
        let target = scene.spawn_at_root(SceneNode::group().at(Vec3::new(10.0, 0.0, 0.0)));
        let unit = AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(1.0));
        scene.spawn(SceneNode::geometry(unit).at(Vec3::new(-2.0, 0.0, 0.0)), target);
        scene.spawn(SceneNode::geometry(unit).at(Vec3::new(2.0, 0.0, 0.0)), target);

        let bounds = subtree_bounds(&scene, target).unwrap();
        assert_relative_eq!(bounds.sphere.center, Vec3::new(10.0, 0.0, 0.0), epsilon = 1e-5);
        // Half-diagonal of a 6x2x2 world box.
        assert_relative_eq!(bounds.sphere.radius, (9.0f32 + 1.0 + 1.0).sqrt(), epsilon = 1e-5);
        assert_relative_eq!(bounds.offset, Vec3::zeros(), epsilon = 1e-5);
    }

    #[test]
    fn test_offset_tracks_off_center_geometry() {
        let mut scene = Scene::new();
        let target = scene.spawn_at_root(SceneNode::group());
        let unit = AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(1.0));
        scene.spawn(SceneNode::geometry(unit).at(Vec3::new(0.0, 5.0, 0.0)), target);

        let bounds = subtree_bounds(&scene, target).unwrap();
        assert_relative_eq!(bounds.offset, Vec3::new(0.0, 5.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_empty_subtree_has_no_bounds() {
        let mut scene = Scene::new();
        let target = scene.spawn_at_root(SceneNode::group());
        scene.spawn(SceneNode::light(crate::scene::Light::point(1.0)), target);

        assert!(subtree_bounds(&scene, target).is_none());
    }

    #[test]
    fn test_point_geometry_is_degenerate() {
        let mut scene = Scene::new();
        let target = scene.spawn_at_root(SceneNode::geometry(AABB::new(Vec3::zeros(), Vec3::zeros())));
        assert!(subtree_bounds(&scene, target).is_none());
    }
}
