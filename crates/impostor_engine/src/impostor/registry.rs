//! Target-to-entry registry
//!
//! Associates targets with their cache entries in an external map instead of
//! stashing a back-reference on the target node, so targets and entries never
//! own each other. One entry per target; binding is explicit and unbinding
//! restores the target.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;
use crate::impostor::config::ImpostorConfig;
use crate::impostor::entry::{ImpostorEntry, UpdateReport};
use crate::render::{Camera, OffscreenRenderer};
use crate::scene::{NodeId, Scene};

/// Why a target could not be bound
#[derive(Error, Debug)]
pub enum BindError {
    /// The target node is not in the scene
    #[error("target node is not in the scene")]
    MissingTarget,

    /// The target already has a cache entry
    #[error("target is already bound to an impostor")]
    AlreadyBound,

    /// The entry configuration failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Registry of all impostor entries for one scene
#[derive(Debug, Default)]
pub struct ImpostorRegistry {
    entries: HashMap<NodeId, ImpostorEntry>,
}

impl ImpostorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache entry for `target`
    pub fn bind(
        &mut self,
        scene: &mut Scene,
        target: NodeId,
        config: ImpostorConfig,
    ) -> Result<&mut ImpostorEntry, BindError> {
        if !scene.contains(target) {
            return Err(BindError::MissingTarget);
        }
        if self.entries.contains_key(&target) {
            return Err(BindError::AlreadyBound);
        }

        let entry = ImpostorEntry::new(scene, target, config)?;
        Ok(self.entries.entry(target).or_insert(entry))
    }

    /// Tear down the entry for `target`, restoring the target to visible
    ///
    /// Returns `false` when the target was not bound.
    pub fn unbind(&mut self, scene: &mut Scene, target: NodeId) -> bool {
        match self.entries.remove(&target) {
            Some(entry) => {
                entry.release(scene);
                true
            }
            None => false,
        }
    }

    /// The entry for `target`, if bound
    pub fn entry(&self, target: NodeId) -> Option<&ImpostorEntry> {
        self.entries.get(&target)
    }

    /// Mutable entry for `target`, if bound
    pub fn entry_mut(&mut self, target: NodeId) -> Option<&mut ImpostorEntry> {
        self.entries.get_mut(&target)
    }

    /// Number of bound targets
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no targets are bound
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every entry's frame update
    ///
    /// Each entry refreshes independently; there is no batching across
    /// entries. Returns the per-target reports for callers that want the
    /// diagnostics.
    pub fn update_all(
        &mut self,
        scene: &mut Scene,
        camera: &mut Camera,
        renderer: &mut dyn OffscreenRenderer,
        now: Duration,
    ) -> Vec<(NodeId, UpdateReport)> {
        let mut reports = Vec::with_capacity(self.entries.len());
        for (&target, entry) in &mut self.entries {
            reports.push((target, entry.update(scene, camera, renderer, now)));
        }
        reports
    }
}
