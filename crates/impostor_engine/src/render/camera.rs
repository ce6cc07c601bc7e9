//! # 3D Camera
//!
//! Perspective camera with position/target/up orientation and on-demand
//! matrix generation.
//!
//! ## Design Principles
//! - **Library-agnostic**: no graphics-API dependencies in camera math
//! - **On-demand matrices**: nothing is cached, so captures can freely adjust
//!   fov and aspect and restore them without invalidation bookkeeping

use crate::foundation::math::{utils, Mat4, Point3, Vec3};
use crate::scene::RenderLayers;

/// 3D camera for perspective projection
///
/// Uses a standard right-handed Y-up coordinate system. Orientation is the
/// (target, up) pair rather than a quaternion, which makes the save/restore
/// around offscreen captures a plain value copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Field of view angle in radians
    pub fov: f32,

    /// Aspect ratio (width / height) for projection calculations
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,

    /// Layer mask limiting which nodes this camera sees
    pub layers: RenderLayers,
}

impl Camera {
    /// Create a new perspective camera with standard Y-up orientation
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Field of view angle in degrees (stored in radians)
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: utils::deg_to_rad(fov_degrees),
            aspect,
            near,
            far,
            layers: RenderLayers::default(),
        }
    }

    /// Update camera position in world space
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Configure camera to look at a specific point, keeping the current up
    /// vector
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
        log::trace!("Camera look_at updated - target: {:?}", target);
    }

    /// Update camera aspect ratio for viewport changes
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Normalized view direction from the camera toward its target
    ///
    /// Returns `None` when position and target coincide.
    pub fn view_direction(&self) -> Option<Vec3> {
        (self.target - self.position).try_normalize(1e-8)
    }

    /// Generate view matrix for world-to-camera space transformation
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(
            &Point3::from(self.position),
            &Point3::from(self.target),
            &self.up,
        )
    }

    /// Generate perspective projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Generate combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    /// A reasonable starting camera: above and behind the origin, looking at
    /// the scene center, 45 degree fov, widescreen aspect
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 3.0, 3.0),
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::FRAC_PI_4,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            layers: RenderLayers::default(),
        }
    }
}
