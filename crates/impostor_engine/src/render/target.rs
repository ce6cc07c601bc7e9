//! Offscreen render targets
//!
//! A [`RenderTarget`] owns the RGBA texel storage an impostor texture lives
//! in. It is created once per cache entry and only ever reallocated by an
//! explicit [`RenderTarget::resize`]; captures overwrite the texels in place.

use crate::render::backend::{RenderError, RenderResult};

/// Default edge length for impostor textures
pub const DEFAULT_TEXTURE_SIZE: u32 = 512;

/// An RGBA texel
pub type Texel = [u8; 4];

/// Owned offscreen color target
#[derive(Debug, Clone)]
pub struct RenderTarget {
    width: u32,
    height: u32,
    texels: Vec<Texel>,
}

impl RenderTarget {
    /// Create a target with the given dimensions, cleared to transparent
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            texels: vec![[0, 0, 0, 0]; (width * height) as usize],
        }
    }

    /// Create a square target, the shape impostor captures use
    pub fn square(size: u32) -> Self {
        Self::new(size, size)
    }

    /// Target width in texels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Target height in texels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reallocate the texel storage for new dimensions
    ///
    /// This is the only operation that reallocates; contents are cleared to
    /// transparent.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.texels = vec![[0, 0, 0, 0]; (width * height) as usize];
        log::info!("render target resized to {}x{}", width, height);
    }

    /// Fill every texel with one value
    pub fn clear(&mut self, texel: Texel) {
        self.texels.fill(texel);
    }

    /// Read a texel; `None` outside the target
    pub fn texel(&self, x: u32, y: u32) -> Option<Texel> {
        if x < self.width && y < self.height {
            Some(self.texels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Write a texel; out-of-bounds writes are dropped
    pub fn put_texel(&mut self, x: u32, y: u32, texel: Texel) {
        if x < self.width && y < self.height {
            self.texels[(y * self.width + x) as usize] = texel;
        }
    }

    /// Texel storage viewed as raw RGBA bytes
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    /// Mutable texel storage for backends that rasterize directly
    pub fn texels_mut(&mut self) -> &mut [Texel] {
        &mut self.texels
    }

    /// Export the target contents as a PNG for diagnostics
    pub fn save_png(&self, path: &std::path::Path) -> RenderResult<()> {
        image::save_buffer(
            path,
            self.as_bytes(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
        )
        .map_err(|e| RenderError::ResourceCreationFailed(format!("PNG export failed: {e}")))
    }
}
