//! Temporary light binding for isolated captures
//!
//! A capture that draws only the target would otherwise lose the lights that
//! normally illuminate it. For the duration of one pass the designated lights
//! are reparented under the target (keeping their world placement), then put
//! back exactly where they were.

use crate::scene::{NodeId, Scene};

/// Record of lights moved under a target for one capture
///
/// Holds each light's prior parent so detachment restores the scene graph
/// precisely, rather than rescanning the target's children and guessing.
#[derive(Debug)]
pub struct BoundLights {
    moved: Vec<(NodeId, Option<NodeId>)>,
}

impl BoundLights {
    /// The lights that were successfully attached
    pub fn light_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.moved.iter().map(|(light, _)| *light)
    }
}

/// Reparent `lights` under `target`, recording their prior parents
///
/// Lights that no longer resolve, already live under the target, or cannot
/// be attached are skipped.
pub fn attach_lights(scene: &mut Scene, target: NodeId, lights: &[NodeId]) -> BoundLights {
    let mut moved = Vec::with_capacity(lights.len());
    for &light in lights {
        let Some(node) = scene.node(light) else {
            log::debug!("light binder: light node is gone, skipping");
            continue;
        };
        if !node.is_light() || node.parent() == Some(target) {
            continue;
        }
        let prior = node.parent();
        if scene.attach(light, target) {
            moved.push((light, prior));
        }
    }
    BoundLights { moved }
}

/// Return every bound light to its recorded prior parent
///
/// A light whose prior parent disappeared during the pass goes to the scene
/// root instead.
pub fn detach_lights(scene: &mut Scene, bound: BoundLights) {
    for (light, prior) in bound.moved {
        let destination = match prior {
            Some(parent) if scene.contains(parent) => parent,
            _ => scene.root(),
        };
        if !scene.attach(light, destination) {
            log::warn!("light binder: failed to restore a light to its prior parent");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::scene::{Light, SceneNode};
    use approx::assert_relative_eq;

    #[test]
    fn test_attach_detach_round_trip() {
        let mut scene = Scene::new();
        let rig = scene.spawn_at_root(SceneNode::group().at(Vec3::new(0.0, 10.0, 0.0)));
        let light = scene.spawn(SceneNode::light(Light::point(2.0)).at(Vec3::new(1.0, 0.0, 0.0)), rig);
        let target = scene.spawn_at_root(SceneNode::group().at(Vec3::new(5.0, 0.0, 0.0)));

        let world_before = scene.world_position(light);

        let bound = attach_lights(&mut scene, target, &[light]);
        assert_eq!(bound.light_ids().count(), 1);
        assert_eq!(scene.node(light).unwrap().parent(), Some(target));
        assert_relative_eq!(scene.world_position(light), world_before, epsilon = 1e-5);

        detach_lights(&mut scene, bound);
        assert_eq!(scene.node(light).unwrap().parent(), Some(rig));
        assert_relative_eq!(scene.world_position(light), world_before, epsilon = 1e-5);
    }

    #[test]
    fn test_orphaned_prior_parent_falls_back_to_root() {
        let mut scene = Scene::new();
        let rig = scene.spawn_at_root(SceneNode::group());
        let light = scene.spawn(SceneNode::light(Light::point(1.0)), rig);
        let target = scene.spawn_at_root(SceneNode::group());

        let bound = attach_lights(&mut scene, target, &[light]);
        // The rig disappears while the capture is in flight.
        scene.remove(rig);

        detach_lights(&mut scene, bound);
        assert_eq!(scene.node(light).unwrap().parent(), Some(scene.root()));
    }

    #[test]
    fn test_non_lights_are_not_bound() {
        let mut scene = Scene::new();
        let decoy = scene.spawn_at_root(SceneNode::group());
        let target = scene.spawn_at_root(SceneNode::group());

        let bound = attach_lights(&mut scene, target, &[decoy]);
        assert_eq!(bound.light_ids().count(), 0);
        assert_eq!(scene.node(decoy).unwrap().parent(), Some(scene.root()));
    }
}
