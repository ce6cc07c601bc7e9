//! Render layer system for visibility filtering
//!
//! Cameras carry a layer mask and nodes carry layer membership; a node is
//! drawn only when the two intersect. The cache's masked capture strategy
//! borrows a dedicated layer bit for the duration of a single pass.

use bitflags::bitflags;

bitflags! {
    /// Render layer membership / visibility mask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderLayers: u32 {
        /// Default layer every node and camera starts on
        const DEFAULT = 1 << 0;

        /// Reserved for isolated offscreen captures; never left set between
        /// frames
        const CAPTURE = 1 << 31;
    }
}

impl RenderLayers {
    /// Whether a node on these layers is visible to a camera with `mask`
    pub fn visible_to(self, mask: RenderLayers) -> bool {
        self.intersects(mask)
    }
}

impl Default for RenderLayers {
    fn default() -> Self {
        RenderLayers::DEFAULT
    }
}
