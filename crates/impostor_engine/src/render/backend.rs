//! Backend abstraction for offscreen rendering
//!
//! The cache never talks to a graphics API. Everything below the
//! [`OffscreenRenderer`] trait (GPU resources, rasterization, readback) is
//! the embedding application's concern; the cache only decides *when* to
//! capture and hands the backend a scene, a framed camera, and a target.

use thiserror::Error;

use crate::render::camera::Camera;
use crate::render::target::RenderTarget;
use crate::scene::{NodeId, Scene};

/// What a capture draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderSource {
    /// Only the subtree rooted at the given node, ignoring the rest of the
    /// scene
    Subtree(NodeId),
    /// The whole scene, filtered by the camera's layer mask
    FullScene,
}

/// Renderer capable of drawing into an offscreen color target
pub trait OffscreenRenderer {
    /// Render the requested source into `target` from the camera's viewpoint
    ///
    /// Implementations must honor node visibility (including ancestors) and,
    /// for [`RenderSource::FullScene`], the camera layer mask. The scene's
    /// fog and background are already configured for the capture by the
    /// caller.
    fn render_to_target(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        source: RenderSource,
        target: &mut RenderTarget,
    ) -> RenderResult<()>;
}

/// High-level rendering error types
///
/// Abstracted from any specific graphics API so backends can map their own
/// failures onto a stable vocabulary.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A rendering operation failed during execution
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// Resource creation or management failed
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Backend-specific error occurred
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
