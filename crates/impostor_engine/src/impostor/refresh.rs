//! The isolated capture pass
//!
//! Re-renders a target into its cache texture without leaving a trace: every
//! piece of shared render state the pass touches (camera orientation, fov,
//! aspect, layer mask, scene fog and background, light parenting, capture
//! layer bits) is captured into an explicit [`RenderStateSnapshot`] value
//! up front and written back before the pass returns, on the failure path
//! included. The only intended outputs are the texture contents, the refresh
//! metadata, and the stand-in's fit (scale, position, facing).

use thiserror::Error;

use crate::foundation::math::{Quat, Vec3};
use crate::impostor::bounds::{subtree_bounds, TargetBounds};
use crate::impostor::config::{CaptureStrategy, ImpostorConfig};
use crate::impostor::lights::{attach_lights, detach_lights};
use crate::impostor::metrics;
use crate::render::{Camera, OffscreenRenderer, RenderError, RenderSource, RenderTarget};
use crate::scene::{Fog, NodeId, RenderLayers, Scene, StandInVariant};

/// Matches the normalization guard in [`crate::impostor::metrics`].
const MIN_FRAMING_DISTANCE: f32 = 1e-6;

/// Why a refresh did not happen
///
/// Skips are visual degradations, not faults: the entry keeps showing
/// whatever it showed before and tries again when next due.
#[derive(Error, Debug)]
pub enum RefreshSkip {
    /// The target subtree has no computable, non-degenerate bounds
    #[error("target has no renderable bounds")]
    DegenerateGeometry,

    /// The camera coincides with the target, so no view direction exists
    #[error("camera coincides with the target")]
    ZeroDistance,

    /// The backend failed to draw the capture
    #[error("offscreen render failed: {0}")]
    RenderFailed(#[from] RenderError),
}

/// Metadata a completed refresh produces, committed atomically by the entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshMetadata {
    /// View direction in target-local space at capture time
    pub view_angle: Vec3,
    /// The bounds the capture framed against
    pub bounds: TargetBounds,
}

/// Everything a pass needs to know about the entry it refreshes
#[derive(Debug)]
pub struct RefreshRequest<'a> {
    /// The cached object
    pub target: NodeId,
    /// The entry's stand-in node
    pub stand_in: NodeId,
    /// Lights to bind to the target for the capture
    pub lights: &'a [NodeId],
    /// The entry's configuration
    pub config: &'a ImpostorConfig,
    /// Whether the stand-in is the visible representation right now; decides
    /// which visibility the pass leaves behind
    pub is_forging: bool,
}

/// Copy of every piece of shared render state a capture pass may touch
///
/// Captured before the pass mutates anything and written back verbatim
/// afterwards, so restoration is a plain value copy rather than a sequence
/// of inverse operations.
#[derive(Debug, Clone)]
pub struct RenderStateSnapshot {
    camera_target: Vec3,
    camera_up: Vec3,
    camera_fov: f32,
    camera_aspect: f32,
    camera_layers: RenderLayers,
    fog: Option<Fog>,
    background: Option<Vec3>,
}

impl RenderStateSnapshot {
    /// Capture the current shared state
    pub fn capture(scene: &Scene, camera: &Camera) -> Self {
        Self {
            camera_target: camera.target,
            camera_up: camera.up,
            camera_fov: camera.fov,
            camera_aspect: camera.aspect,
            camera_layers: camera.layers,
            fog: scene.fog,
            background: scene.background,
        }
    }

    /// Write the captured state back
    pub fn restore(self, scene: &mut Scene, camera: &mut Camera) {
        camera.target = self.camera_target;
        camera.up = self.camera_up;
        camera.fov = self.camera_fov;
        camera.aspect = self.camera_aspect;
        camera.layers = self.camera_layers;
        scene.fog = self.fog;
        scene.background = self.background;
    }
}

/// Run one isolated capture pass
///
/// Preconditions are checked before any shared state is touched, so a skip
/// leaves the frame exactly as it found it. After a successful draw the pass
/// restores all shared state, recomputes the view direction from the
/// *restored* camera (the direction future comparisons need is the real
/// viewing direction, not the framing one), and fits the stand-in to the new
/// capture in the same frame.
pub fn execute(
    scene: &mut Scene,
    camera: &mut Camera,
    renderer: &mut dyn OffscreenRenderer,
    texture: &mut RenderTarget,
    request: &RefreshRequest<'_>,
) -> Result<RefreshMetadata, RefreshSkip> {
    let bounds = subtree_bounds(scene, request.target).ok_or(RefreshSkip::DegenerateGeometry)?;

    let distance_to_center = (camera.position - bounds.sphere.center).magnitude();
    if distance_to_center <= MIN_FRAMING_DISTANCE {
        return Err(RefreshSkip::ZeroDistance);
    }
    // The nominal-position direction must exist as well; it becomes the
    // comparison baseline for future frames.
    metrics::view_sample(scene, request.target, camera)
        .and_then(|sample| sample.local_direction)
        .ok_or(RefreshSkip::ZeroDistance)?;

    let snapshot = RenderStateSnapshot::capture(scene, camera);

    // Real geometry must be on screen to capture it.
    set_visible(scene, request.target, true);
    set_visible(scene, request.stand_in, false);

    // The texture must hold only the object's appearance: fog would bake a
    // distance cue into it and a background would be composited twice.
    scene.fog = None;
    scene.background = None;

    // Frame the bounding sphere tightly into a square capture.
    camera.look_at(bounds.sphere.center);
    camera.fov = 2.0 * (bounds.sphere.radius / distance_to_center).atan();
    camera.aspect = 1.0;

    let bound_lights = attach_lights(scene, request.target, request.lights);

    let draw_result = match request.config.capture {
        CaptureStrategy::Subtree => {
            renderer.render_to_target(scene, camera, RenderSource::Subtree(request.target), texture)
        }
        CaptureStrategy::MaskedScene => {
            let mut marked = scene.descendants(request.target);
            marked.extend(bound_lights.light_ids());
            for &id in &marked {
                if let Some(node) = scene.node_mut(id) {
                    node.layers |= RenderLayers::CAPTURE;
                }
            }
            camera.layers = RenderLayers::CAPTURE;

            let result =
                renderer.render_to_target(scene, camera, RenderSource::FullScene, texture);

            for &id in &marked {
                if let Some(node) = scene.node_mut(id) {
                    node.layers -= RenderLayers::CAPTURE;
                }
            }
            result
        }
    };

    // Undo everything whether or not the draw succeeded.
    detach_lights(scene, bound_lights);
    snapshot.restore(scene, camera);
    set_visible(scene, request.target, !request.is_forging);
    set_visible(scene, request.stand_in, request.is_forging);

    draw_result?;

    // Metadata from the restored camera, not the framing one.
    let view_angle = metrics::view_sample(scene, request.target, camera)
        .and_then(|sample| sample.local_direction)
        .ok_or(RefreshSkip::ZeroDistance)?;

    fit_stand_in(scene, camera, request, &bounds);

    log::debug!(
        "impostor refresh: radius {:.3}, fov {:.3} rad, capture {:?}",
        bounds.sphere.radius,
        2.0 * (bounds.sphere.radius / distance_to_center).atan(),
        request.config.capture
    );

    Ok(RefreshMetadata { view_angle, bounds })
}

/// Fit the stand-in quad to the fresh capture: sphere-diameter scale, sphere
/// center position, and, for the plane variant, a same-frame turn toward
/// the restored camera. Billboard stand-ins are camera-facing by
/// construction, so only scale and position apply.
fn fit_stand_in(
    scene: &mut Scene,
    camera: &Camera,
    request: &RefreshRequest<'_>,
    bounds: &TargetBounds,
) {
    let camera_position = camera.position;
    let diameter = bounds.sphere.radius * 2.0;
    let center = bounds.sphere.center;

    let Some(node) = scene.node_mut(request.stand_in) else {
        return;
    };
    node.transform.scale = Vec3::new(diameter, diameter, 1.0);
    // The stand-in lives directly under the root, so world placement is its
    // local position.
    node.transform.position = center;

    if request.config.variant == StandInVariant::Plane {
        if let Some(direction) = (camera_position - center).try_normalize(MIN_FRAMING_DISTANCE) {
            // The quad faces along its local +Z; avoid the degenerate up.
            let up = if direction.cross(&Vec3::y()).magnitude() > 1e-4 {
                Vec3::y()
            } else {
                Vec3::z()
            };
            node.transform.rotation = Quat::face_towards(&direction, &up);
        }
    }
}

fn set_visible(scene: &mut Scene, id: NodeId, visible: bool) {
    if let Some(node) = scene.node_mut(id) {
        node.visible = visible;
    }
}
