//! One cached object: the impostor entry
//!
//! Owns the offscreen texture and the stand-in node for a single target and
//! runs the whole cache cycle once per frame: measure, decide, optionally
//! refresh, then glue the stand-in to the target. The target itself is only
//! ever touched through its visibility flag: the entry holds a key, not the
//! node, and survives the target disappearing.

use std::time::Duration;

use crate::config::{Config, ConfigError};
use crate::foundation::math::Vec3;
use crate::impostor::config::ImpostorConfig;
use crate::impostor::metrics;
use crate::impostor::policy::{self, Decision, ForgeState, PolicySample};
use crate::impostor::refresh::{self, RefreshRequest, RefreshSkip};
use crate::render::{Camera, OffscreenRenderer, RenderTarget};
use crate::scene::{NodeId, Scene, SceneNode};

/// What one `update` call did
#[derive(Debug)]
pub struct UpdateReport {
    /// State after the frame
    pub state: ForgeState,
    /// Whether a refresh completed this frame
    pub refreshed: bool,
    /// Why a due refresh was skipped, if it was
    pub skip: Option<RefreshSkip>,
}

/// Cache entry substituting a 2D stand-in for one scene object
#[derive(Debug)]
pub struct ImpostorEntry {
    target: NodeId,
    stand_in: NodeId,
    texture: RenderTarget,
    config: ImpostorConfig,
    lights: Vec<NodeId>,
    state: ForgeState,
    last_view_angle: Option<Vec3>,
    last_refresh: Option<Duration>,
    bounds_offset: Vec3,
    refresh_requested: bool,
}

impl ImpostorEntry {
    /// Create an entry for `target`, spawning its hidden stand-in node under
    /// the scene root
    pub fn new(
        scene: &mut Scene,
        target: NodeId,
        config: ImpostorConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let stand_in = scene.spawn_at_root(SceneNode::stand_in(config.variant));
        log::info!(
            "impostor bound: threshold {}, max angle {} rad, texture {}px",
            config.distance_threshold,
            config.max_angle,
            config.texture_size
        );
        Ok(Self {
            target,
            stand_in,
            texture: RenderTarget::square(config.texture_size),
            config,
            lights: Vec::new(),
            state: ForgeState::Active,
            last_view_angle: None,
            last_refresh: None,
            bounds_offset: Vec3::zeros(),
            refresh_requested: false,
        })
    }

    /// Run one frame of the cache cycle
    ///
    /// `now` is the frame-clock timestamp; it must not decrease between
    /// calls. All computation, including any refresh, happens synchronously
    /// inside this call.
    pub fn update(
        &mut self,
        scene: &mut Scene,
        camera: &mut Camera,
        renderer: &mut dyn OffscreenRenderer,
        now: Duration,
    ) -> UpdateReport {
        let mut report = UpdateReport {
            state: self.state,
            refreshed: false,
            skip: None,
        };

        let Some(sample) = metrics::view_sample(scene, self.target, camera) else {
            log::trace!("impostor update: target is gone, nothing to do");
            return report;
        };

        let angle_delta = match (sample.local_direction, self.last_view_angle) {
            (Some(current), Some(captured)) => Some(metrics::angle_between(current, captured)),
            _ => None,
        };
        let decision = policy::evaluate(
            &self.config,
            &PolicySample {
                distance: sample.distance,
                angle_delta,
                since_refresh: self.last_refresh.map(|at| now.saturating_sub(at)),
            },
        );

        let mut refresh_due = decision.refresh_due;
        refresh_due |= self.apply_transition(scene, &decision);
        refresh_due |= std::mem::take(&mut self.refresh_requested);

        if refresh_due {
            let request = RefreshRequest {
                target: self.target,
                stand_in: self.stand_in,
                lights: &self.lights,
                config: &self.config,
                is_forging: self.state.is_forging(),
            };
            match refresh::execute(scene, camera, renderer, &mut self.texture, &request) {
                Ok(metadata) => {
                    // The three pieces of refresh metadata move together; a
                    // failed pass above leaves all of them untouched.
                    self.last_view_angle = Some(metadata.view_angle);
                    self.last_refresh = Some(now);
                    self.bounds_offset = metadata.bounds.offset;
                    report.refreshed = true;
                }
                Err(skip) => {
                    log::debug!("impostor refresh skipped: {skip}");
                    report.skip = Some(skip);
                }
            }
        }

        // Keep the stand-in glued to the target every frame, whatever the
        // refresh did.
        let anchored = scene.world_position(self.target) + self.bounds_offset;
        if let Some(node) = scene.node_mut(self.stand_in) {
            node.transform.position = anchored;
        }

        report.state = self.state;
        report
    }

    /// Force a refresh on the next `update`, regardless of policy
    pub fn refresh_now(&mut self) {
        self.refresh_requested = true;
    }

    /// Apply the ACTIVE/FORGED transition for this frame; returns whether the
    /// transition itself demands a refresh
    fn apply_transition(&mut self, scene: &mut Scene, decision: &Decision) -> bool {
        match (self.state, decision.should_forge) {
            (ForgeState::Active, true) => {
                self.set_imposture(scene);
                // Engaging the stand-in always recaptures: whatever angle was
                // recorded before disengaging is stale by now, and on the
                // very first engagement there is nothing recorded at all.
                true
            }
            (ForgeState::Forged, false) => {
                self.unset_imposture(scene);
                false
            }
            _ => false,
        }
    }

    fn set_imposture(&mut self, scene: &mut Scene) {
        if let Some(node) = scene.node_mut(self.target) {
            node.visible = false;
        }
        if let Some(node) = scene.node_mut(self.stand_in) {
            node.visible = true;
        }
        self.state = ForgeState::Forged;
        log::debug!("impostor engaged");
    }

    fn unset_imposture(&mut self, scene: &mut Scene) {
        if let Some(node) = scene.node_mut(self.target) {
            node.visible = true;
        }
        if let Some(node) = scene.node_mut(self.stand_in) {
            node.visible = false;
        }
        self.state = ForgeState::Active;
        log::debug!("impostor disengaged");
    }

    /// Tear the entry down: remove the stand-in and restore the target
    pub fn release(self, scene: &mut Scene) {
        scene.remove(self.stand_in);
        if let Some(node) = scene.node_mut(self.target) {
            node.visible = true;
        }
        log::info!("impostor unbound");
    }

    /// The cached target node
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The stand-in node owned by this entry
    pub fn stand_in(&self) -> NodeId {
        self.stand_in
    }

    /// Read-only access to the cached texture for diagnostics and
    /// visualization tooling
    pub fn texture(&self) -> &RenderTarget {
        &self.texture
    }

    /// Current configuration
    pub fn config(&self) -> &ImpostorConfig {
        &self.config
    }

    /// Current state
    pub fn state(&self) -> ForgeState {
        self.state
    }

    /// Whether the stand-in is the visible representation
    pub fn is_forging(&self) -> bool {
        self.state.is_forging()
    }

    /// Timestamp of the most recent completed refresh
    pub fn last_refresh(&self) -> Option<Duration> {
        self.last_refresh
    }

    /// View direction captured by the most recent refresh, in target-local
    /// space
    pub fn last_view_angle(&self) -> Option<Vec3> {
        self.last_view_angle
    }

    /// Offset from the target's nominal position to its bounding-sphere
    /// center, as of the last refresh
    pub fn bounds_offset(&self) -> Vec3 {
        self.bounds_offset
    }

    /// Designate a light to follow the target during captures
    pub fn bind_light(&mut self, light: NodeId) {
        if !self.lights.contains(&light) {
            self.lights.push(light);
        }
    }

    /// Stop a light from following the target during captures
    pub fn unbind_light(&mut self, light: NodeId) {
        self.lights.retain(|&l| l != light);
    }

    /// The lights bound to this entry
    pub fn lights(&self) -> &[NodeId] {
        &self.lights
    }

    /// Update the forge distance threshold; rejects non-positive values
    pub fn set_distance_threshold(&mut self, threshold: f32) -> Result<(), ConfigError> {
        let updated = self.config.clone().with_distance_threshold(threshold);
        updated.validate()?;
        self.config = updated;
        Ok(())
    }

    /// Update the staleness angle; rejects negative values
    pub fn set_max_angle(&mut self, radians: f32) -> Result<(), ConfigError> {
        let updated = self.config.clone().with_max_angle(radians);
        updated.validate()?;
        self.config = updated;
        Ok(())
    }

    /// Update or disable the interval refresh
    pub fn set_refresh_interval(&mut self, interval: Option<Duration>) -> Result<(), ConfigError> {
        let updated = self.config.clone().with_refresh_interval(interval);
        updated.validate()?;
        self.config = updated;
        Ok(())
    }

    /// Recreate the texture at a new size, the only operation that
    /// reallocates it
    pub fn resize_texture(&mut self, size: u32) -> Result<(), ConfigError> {
        if size == 0 {
            return Err(ConfigError::Invalid("texture_size must be non-zero".to_string()));
        }
        self.config.texture_size = size;
        self.texture.resize(size, size);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderResult, RenderSource};
    use crate::scene::{StandInVariant, AABB};
    use approx::assert_relative_eq;

    struct CountingRenderer {
        renders: usize,
    }

    impl OffscreenRenderer for CountingRenderer {
        fn render_to_target(
            &mut self,
            _scene: &Scene,
            _camera: &Camera,
            _source: RenderSource,
            target: &mut RenderTarget,
        ) -> RenderResult<()> {
            self.renders += 1;
            target.clear([255, 255, 255, 255]);
            Ok(())
        }
    }

    fn fixture(target_z: f32) -> (Scene, Camera, CountingRenderer, ImpostorEntry) {
        let mut scene = Scene::new();
        let target = scene.spawn_at_root(
            SceneNode::geometry(AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(1.0)))
                .at(Vec3::new(0.0, 0.0, target_z)),
        );
        let entry = ImpostorEntry::new(
            &mut scene,
            target,
            ImpostorConfig::default().with_distance_threshold(70.0),
        )
        .unwrap();

        let mut camera = Camera::perspective(Vec3::zeros(), 60.0, 16.0 / 9.0, 0.1, 1000.0);
        camera.look_at(Vec3::new(0.0, 0.0, -1.0));

        (scene, camera, CountingRenderer { renders: 0 }, entry)
    }

    #[test]
    fn test_near_target_stays_active() {
        let (mut scene, mut camera, mut renderer, mut entry) = fixture(-50.0);

        let report = entry.update(&mut scene, &mut camera, &mut renderer, Duration::ZERO);

        assert_eq!(report.state, ForgeState::Active);
        assert!(!report.refreshed);
        assert_eq!(renderer.renders, 0);
        assert!(scene.node(entry.target()).unwrap().visible);
        assert!(!scene.node(entry.stand_in()).unwrap().visible);
    }

    #[test]
    fn test_crossing_threshold_forges_and_refreshes_once() {
        let (mut scene, mut camera, mut renderer, mut entry) = fixture(-100.0);

        let report = entry.update(&mut scene, &mut camera, &mut renderer, Duration::ZERO);

        assert_eq!(report.state, ForgeState::Forged);
        assert!(report.refreshed);
        assert_eq!(renderer.renders, 1);
        assert!(!scene.node(entry.target()).unwrap().visible);
        assert!(scene.node(entry.stand_in()).unwrap().visible);
        assert!(entry.last_refresh().is_some());

        // Identical second frame: still forged, no second refresh.
        let report = entry.update(&mut scene, &mut camera, &mut renderer, Duration::from_millis(16));
        assert_eq!(report.state, ForgeState::Forged);
        assert!(!report.refreshed);
        assert_eq!(renderer.renders, 1);
    }

    #[test]
    fn test_returning_near_disengages_without_refresh() {
        let (mut scene, mut camera, mut renderer, mut entry) = fixture(-100.0);
        entry.update(&mut scene, &mut camera, &mut renderer, Duration::ZERO);
        assert_eq!(renderer.renders, 1);

        // Walk the camera toward the target.
        camera.set_position(Vec3::new(0.0, 0.0, -60.0));
        let report = entry.update(&mut scene, &mut camera, &mut renderer, Duration::from_millis(16));

        assert_eq!(report.state, ForgeState::Active);
        assert!(!report.refreshed);
        assert_eq!(renderer.renders, 1);
        assert!(scene.node(entry.target()).unwrap().visible);
    }

    #[test]
    fn test_angle_drift_refreshes_while_forged() {
        let (mut scene, mut camera, mut renderer, mut entry) = fixture(-100.0);
        entry.update(&mut scene, &mut camera, &mut renderer, Duration::ZERO);

        // Orbit roughly 37 degrees (0.64 rad) around the target at the same
        // distance: past the 0.5 rad default.
        camera.set_position(Vec3::new(60.0, 0.0, -20.0));
        let report = entry.update(&mut scene, &mut camera, &mut renderer, Duration::from_millis(16));

        assert_eq!(report.state, ForgeState::Forged);
        assert!(report.refreshed);
        assert_eq!(renderer.renders, 2);
    }

    #[test]
    fn test_small_drift_does_not_refresh() {
        let (mut scene, mut camera, mut renderer, mut entry) = fixture(-100.0);
        entry.update(&mut scene, &mut camera, &mut renderer, Duration::ZERO);

        // Roughly 17 degrees (0.30 rad): inside the 0.5 rad default.
        camera.set_position(Vec3::new(30.0, 0.0, -5.0));
        let report = entry.update(&mut scene, &mut camera, &mut renderer, Duration::from_millis(16));

        assert!(!report.refreshed);
        assert_eq!(renderer.renders, 1);
    }

    #[test]
    fn test_tracking_law_holds_every_frame() {
        let (mut scene, mut camera, mut renderer, mut entry) = fixture(-100.0);
        entry.update(&mut scene, &mut camera, &mut renderer, Duration::ZERO);

        // Move the target; no refresh is due, the stand-in must follow
        // anyway.
        scene.node_mut(entry.target()).unwrap().transform.position = Vec3::new(5.0, 1.0, -110.0);
        entry.update(&mut scene, &mut camera, &mut renderer, Duration::from_millis(16));

        let expected = scene.world_position(entry.target()) + entry.bounds_offset();
        let actual = scene.node(entry.stand_in()).unwrap().transform.position;
        assert_relative_eq!(actual, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_interval_refreshes_on_schedule_while_active() {
        let (mut scene, mut camera, mut renderer, mut entry) = fixture(-50.0);
        entry
            .set_refresh_interval(Some(Duration::from_secs(1)))
            .unwrap();

        // Never refreshed: the interval rule fires immediately, even while
        // the real object is shown.
        let report = entry.update(&mut scene, &mut camera, &mut renderer, Duration::ZERO);
        assert_eq!(report.state, ForgeState::Active);
        assert!(report.refreshed);
        assert!(scene.node(entry.target()).unwrap().visible);

        // Then at T, 2T, 3T under a stationary camera.
        let mut renders = renderer.renders;
        for seconds in [1u64, 2, 3] {
            let report = entry.update(
                &mut scene,
                &mut camera,
                &mut renderer,
                Duration::from_secs(seconds),
            );
            assert!(report.refreshed, "expected a refresh at {seconds}s");
            renders += 1;
            assert_eq!(renderer.renders, renders);

            // Half a period later nothing is due.
            let report = entry.update(
                &mut scene,
                &mut camera,
                &mut renderer,
                Duration::from_millis(seconds * 1000 + 500),
            );
            assert!(!report.refreshed);
        }
    }

    #[test]
    fn test_refresh_now_forces_a_single_refresh() {
        let (mut scene, mut camera, mut renderer, mut entry) = fixture(-50.0);
        entry.update(&mut scene, &mut camera, &mut renderer, Duration::ZERO);
        assert_eq!(renderer.renders, 0);

        entry.refresh_now();
        let report = entry.update(&mut scene, &mut camera, &mut renderer, Duration::from_millis(16));
        assert!(report.refreshed);
        assert_eq!(renderer.renders, 1);

        let report = entry.update(&mut scene, &mut camera, &mut renderer, Duration::from_millis(32));
        assert!(!report.refreshed);
        assert_eq!(renderer.renders, 1);
    }

    #[test]
    fn test_degenerate_target_leaves_metadata_untouched() {
        let mut scene = Scene::new();
        let target = scene.spawn_at_root(SceneNode::group().at(Vec3::new(0.0, 0.0, -100.0)));
        let mut entry = ImpostorEntry::new(&mut scene, target, ImpostorConfig::default()).unwrap();
        let mut camera = Camera::perspective(Vec3::zeros(), 60.0, 16.0 / 9.0, 0.1, 1000.0);
        let mut renderer = CountingRenderer { renders: 0 };

        let report = entry.update(&mut scene, &mut camera, &mut renderer, Duration::ZERO);

        // Forging engages on distance alone, but the refresh is skipped and
        // nothing was recorded.
        assert_eq!(report.state, ForgeState::Forged);
        assert!(!report.refreshed);
        assert!(matches!(report.skip, Some(RefreshSkip::DegenerateGeometry)));
        assert_eq!(renderer.renders, 0);
        assert!(entry.last_refresh().is_none());
    }

    #[test]
    fn test_release_restores_target() {
        let (mut scene, mut camera, mut renderer, mut entry) = fixture(-100.0);
        entry.update(&mut scene, &mut camera, &mut renderer, Duration::ZERO);
        assert!(!scene.node(entry.target()).unwrap().visible);

        let target = entry.target();
        let stand_in = entry.stand_in();
        entry.release(&mut scene);

        assert!(scene.node(target).unwrap().visible);
        assert!(!scene.contains(stand_in));
    }

    #[test]
    fn test_stand_in_variant_matches_config() {
        let mut scene = Scene::new();
        let target = scene.spawn_at_root(SceneNode::geometry(AABB::from_center_extents(
            Vec3::zeros(),
            Vec3::repeat(1.0),
        )));
        let entry = ImpostorEntry::new(
            &mut scene,
            target,
            ImpostorConfig::default().with_variant(StandInVariant::Billboard),
        )
        .unwrap();

        match scene.node(entry.stand_in()).unwrap().kind {
            crate::scene::NodeKind::StandIn { variant } => {
                assert_eq!(variant, StandInVariant::Billboard);
            }
            _ => panic!("stand-in node has the wrong kind"),
        }
    }
}
