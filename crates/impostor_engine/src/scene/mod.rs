//! Retained scene graph
//!
//! A minimal scene representation sufficient to host cache targets, their 2D
//! stand-ins, and light sources: a slot-map node arena with parent/child
//! links, local transforms with on-demand world matrices, per-node visibility
//! and render layers, and the scene-wide fog and background state that
//! offscreen captures must save and restore.

pub mod bounds;
pub mod layers;
pub mod node;

pub use bounds::{BoundingSphere, AABB};
pub use layers::RenderLayers;
pub use node::{Light, LightKind, MeshHandle, NodeId, NodeKind, SceneNode, StandInVariant};

use slotmap::SlotMap;

use crate::foundation::math::{Mat4, Point3, Vec3};

/// Distance-based fog applied when compositing the live scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    /// Fog color
    pub color: Vec3,
    /// Distance at which fog starts
    pub near: f32,
    /// Distance at which fog fully obscures
    pub far: f32,
}

/// Scene graph: node arena plus the scene-wide render state
#[derive(Debug)]
pub struct Scene {
    nodes: SlotMap<NodeId, SceneNode>,
    root: NodeId,
    /// Scene fog; disabled while rendering isolated captures
    pub fog: Option<Fog>,
    /// Background clear color; `None` clears to transparent
    pub background: Option<Vec3>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene containing only the root group node
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::group());
        Self {
            nodes,
            root,
            fog: None,
            background: None,
        }
    }

    /// The root node of the scene
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the scene, including the root
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the scene still contains the node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Insert a node as a child of `parent` and return its id
    ///
    /// Falls back to the root when the parent id no longer resolves.
    pub fn spawn(&mut self, node: SceneNode, parent: NodeId) -> NodeId {
        let parent = if self.nodes.contains_key(parent) {
            parent
        } else {
            log::warn!("spawn: parent node is gone, attaching to root");
            self.root
        };

        let mut node = node;
        node.parent = Some(parent);
        node.children.clear();
        let id = self.nodes.insert(node);
        self.nodes[parent].children.push(id);
        id
    }

    /// Insert a node directly under the root
    pub fn spawn_at_root(&mut self, node: SceneNode) -> NodeId {
        let root = self.root;
        self.spawn(node, root)
    }

    /// Remove a node and its entire subtree
    ///
    /// Returns `false` if the id does not resolve or names the root.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.nodes.contains_key(id) {
            return false;
        }

        if let Some(parent) = self.nodes[id].parent {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|&child| child != id);
            }
        }

        for node in self.descendants(id) {
            self.nodes.remove(node);
        }
        true
    }

    /// Borrow a node
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    /// Mutably borrow a node
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    /// Iterate over all node ids
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys()
    }

    /// Collect a node and all its descendants, preorder
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(current) {
                out.push(current);
                stack.extend(node.children.iter().copied());
            }
        }
        out
    }

    /// World matrix of a node, composed from the root down
    ///
    /// Computed on demand; a missing node yields identity.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        match self.nodes.get(id) {
            None => Mat4::identity(),
            Some(node) => {
                let local = node.transform.to_matrix();
                match node.parent {
                    Some(parent) => self.world_matrix(parent) * local,
                    None => local,
                }
            }
        }
    }

    /// World-space position of a node's origin
    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id)
            .transform_point(&Point3::origin())
            .coords
    }

    /// Whether a node and all its ancestors are visible
    pub fn effectively_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.nodes.get(node_id) {
                None => return false,
                Some(node) => {
                    if !node.visible {
                        return false;
                    }
                    current = node.parent;
                }
            }
        }
        true
    }

    /// Reparent `child` under `new_parent`, preserving its world transform
    ///
    /// Mirrors the attach semantics of retained scene graphs: the child's
    /// local transform is rewritten so its world placement does not change.
    /// Returns `false` when either id is gone, the ids are equal, the new
    /// parent lies inside the child's subtree, or the parent's world matrix
    /// is singular.
    pub fn attach(&mut self, child: NodeId, new_parent: NodeId) -> bool {
        if child == new_parent
            || child == self.root
            || !self.nodes.contains_key(child)
            || !self.nodes.contains_key(new_parent)
        {
            return false;
        }
        if self.descendants(child).contains(&new_parent) {
            return false;
        }

        let child_world = self.world_matrix(child);
        let parent_world = self.world_matrix(new_parent);
        let Some(parent_inverse) = parent_world.try_inverse() else {
            log::warn!("attach: new parent has a singular world matrix, refusing to reparent");
            return false;
        };

        if let Some(old_parent) = self.nodes[child].parent {
            if let Some(old_parent_node) = self.nodes.get_mut(old_parent) {
                old_parent_node.children.retain(|&c| c != child);
            }
        }

        let node = &mut self.nodes[child];
        node.parent = Some(new_parent);
        node.transform = crate::foundation::math::Transform::from_matrix(parent_inverse * child_world);
        self.nodes[new_parent].children.push(child);
        true
    }
}
