//! Per-frame view metrics
//!
//! Distance is measured from the camera to the target's *nominal* position (a
//! cheap proximity check), while capture framing elsewhere uses the bounding
//! sphere center (a precise fit). The view direction is expressed in the
//! target's local frame so that a rotating target invalidates its own cache
//! exactly when the relative viewing angle changes, not whenever the viewer
//! moves in absolute terms.

use crate::foundation::math::{Point3, Vec3};
use crate::render::Camera;
use crate::scene::{NodeId, Scene};

/// Below this the camera effectively coincides with the target and direction
/// normalization is meaningless.
const MIN_DIRECTION_NORM: f32 = 1e-6;

/// One frame's camera/target geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSample {
    /// Straight-line distance from the camera to the target's nominal world
    /// position
    pub distance: f32,
    /// Unit view direction in the target's local frame; `None` when the
    /// camera coincides with the target or the target's world matrix cannot
    /// be inverted
    pub local_direction: Option<Vec3>,
}

/// Measure the camera relative to the target
///
/// Returns `None` only when the target is no longer in the scene. A
/// degenerate direction still yields a sample; distance remains meaningful
/// for the forge decision even when the angle comparison is impossible.
pub fn view_sample(scene: &Scene, target: NodeId, camera: &Camera) -> Option<ViewSample> {
    if !scene.contains(target) {
        return None;
    }

    let target_position = scene.world_position(target);
    let distance = (camera.position - target_position).magnitude();

    let local_direction = scene
        .world_matrix(target)
        .try_inverse()
        .and_then(|inverse| {
            let local = inverse.transform_point(&Point3::from(camera.position));
            local.coords.try_normalize(MIN_DIRECTION_NORM)
        });

    Some(ViewSample {
        distance,
        local_direction,
    })
}

/// Angle in radians between a current local direction and a captured one
pub fn angle_between(current: Vec3, captured: Vec3) -> f32 {
    current.angle(&captured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use crate::scene::SceneNode;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance_uses_nominal_position() {
        let mut scene = Scene::new();
        let target = scene.spawn_at_root(SceneNode::group().at(Vec3::new(0.0, 0.0, -50.0)));

        let mut camera = Camera::default();
        camera.set_position(Vec3::zeros());

        let sample = view_sample(&scene, target, &camera).unwrap();
        assert_relative_eq!(sample.distance, 50.0, epsilon = 1e-5);
    }

    #[test]
    fn test_local_direction_counter_rotates_with_target() {
        let mut scene = Scene::new();
        let target = scene.spawn_at_root(SceneNode::group());

        let mut camera = Camera::default();
        camera.set_position(Vec3::new(0.0, 0.0, 10.0));

        let before = view_sample(&scene, target, &camera)
            .unwrap()
            .local_direction
            .unwrap();
        assert_relative_eq!(before, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);

        // Yaw the target 90 degrees; the same world-space camera now sits on
        // the target's local -X side.
        scene.node_mut(target).unwrap().transform.rotation =
            Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2);

        let after = view_sample(&scene, target, &camera)
            .unwrap()
            .local_direction
            .unwrap();
        assert_relative_eq!(after, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(angle_between(after, before), std::f32::consts::FRAC_PI_2, epsilon = 1e-5);
    }

    #[test]
    fn test_coincident_camera_has_no_direction() {
        let mut scene = Scene::new();
        let target = scene.spawn_at_root(SceneNode::group().at(Vec3::new(1.0, 2.0, 3.0)));

        let mut camera = Camera::default();
        camera.set_position(Vec3::new(1.0, 2.0, 3.0));

        let sample = view_sample(&scene, target, &camera).unwrap();
        assert_relative_eq!(sample.distance, 0.0, epsilon = 1e-6);
        assert!(sample.local_direction.is_none());
    }

    #[test]
    fn test_missing_target_yields_no_sample() {
        let mut scene = Scene::new();
        let target = scene.spawn_at_root(SceneNode::group());
        scene.remove(target);

        assert!(view_sample(&scene, target, &Camera::default()).is_none());
    }
}
