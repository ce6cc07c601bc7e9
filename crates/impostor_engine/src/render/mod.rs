//! # Rendering abstractions
//!
//! The camera, the offscreen target type, and the backend trait the impostor
//! cache drives. There is deliberately no renderer implementation here: the
//! crate ends at the [`OffscreenRenderer`] seam and applications plug in
//! whatever backend they render the rest of the frame with.

pub mod backend;
pub mod camera;
pub mod target;

pub use backend::{OffscreenRenderer, RenderError, RenderResult, RenderSource};
pub use camera::Camera;
pub use target::{RenderTarget, Texel, DEFAULT_TEXTURE_SIZE};
