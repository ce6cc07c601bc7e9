//! # Impostor Engine
//!
//! An impostor cache for 3D scenes: render a complex object once into an
//! offscreen texture and show that cached 2D stand-in instead of the real
//! geometry while the viewer is far away, re-rendering only when the viewing
//! angle drifts past a threshold or a refresh interval elapses.
//!
//! ## Features
//!
//! - **Distance-based substitution**: one threshold flips between the real
//!   object and its stand-in, with no hysteresis surprises
//! - **Angle-aware invalidation**: staleness is measured in the target's
//!   local frame, so rotating targets refresh exactly when the *relative*
//!   view changes
//! - **Side-effect-free captures**: every piece of shared render state a
//!   capture touches is restored bit-for-bit before the frame continues
//! - **Backend-agnostic**: the crate ends at the [`OffscreenRenderer`] trait;
//!   plug in whatever renders the rest of your frame
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use impostor_engine::prelude::*;
//!
//! # struct MyRenderer;
//! # impl OffscreenRenderer for MyRenderer {
//! #     fn render_to_target(
//! #         &mut self,
//! #         _scene: &Scene,
//! #         _camera: &Camera,
//! #         _source: RenderSource,
//! #         _target: &mut RenderTarget,
//! #     ) -> RenderResult<()> { Ok(()) }
//! # }
//! let mut scene = Scene::new();
//! let statue = scene.spawn_at_root(SceneNode::geometry(AABB::from_center_extents(
//!     Vec3::zeros(),
//!     Vec3::new(2.0, 5.0, 2.0),
//! )));
//!
//! let mut camera = Camera::perspective(Vec3::new(0.0, 2.0, 120.0), 60.0, 16.0 / 9.0, 0.1, 2000.0);
//! let mut renderer = MyRenderer;
//! let mut registry = ImpostorRegistry::new();
//! registry.bind(&mut scene, statue, ImpostorConfig::default())?;
//!
//! let mut clock = FrameClock::new();
//! for _frame in 0..3 {
//!     let now = clock.tick();
//!     registry.update_all(&mut scene, &mut camera, &mut renderer, now);
//!     // ... render the frame as usual ...
//! }
//! # Ok::<(), impostor_engine::impostor::BindError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod impostor;
pub mod render;
pub mod scene;

pub use impostor::{ImpostorConfig, ImpostorEntry, ImpostorRegistry};

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        foundation::{
            math::{Mat4, Quat, Transform, Vec3},
            time::FrameClock,
        },
        impostor::{
            BindError, CaptureStrategy, ForgeState, ImpostorConfig, ImpostorEntry,
            ImpostorRegistry, UpdateReport,
        },
        render::{
            Camera, OffscreenRenderer, RenderError, RenderResult, RenderSource, RenderTarget,
        },
        scene::{Fog, Light, NodeId, RenderLayers, Scene, SceneNode, StandInVariant, AABB},
    };
}
