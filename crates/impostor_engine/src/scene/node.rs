//! Scene node types
//!
//! Nodes are stored in a slot map arena owned by [`crate::scene::Scene`];
//! [`NodeId`] keys stay stable across insertions and removals, and a key held
//! after its node was removed simply resolves to nothing. That gives cache
//! entries weak-reference semantics over their targets for free.

use slotmap::new_key_type;

use crate::foundation::math::{Transform, Vec3};
use crate::scene::bounds::AABB;
use crate::scene::layers::RenderLayers;

new_key_type! {
    /// Stable handle to a node in a [`crate::scene::Scene`]
    pub struct NodeId;
}

/// Handle to mesh data owned by a rendering backend
///
/// The scene stores bounds, not vertices; backends resolve this handle to
/// whatever GPU resources they manage for the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Types of lights a scene node can carry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Directional light (like sunlight) with parallel rays along the node's
    /// local -Z axis
    Directional,
    /// Point light radiating in all directions from the node position
    Point,
    /// Spot light cone along the node's local -Z axis
    Spot {
        /// Inner cone angle in radians
        inner_cone: f32,
        /// Outer cone angle in radians
        outer_cone: f32,
    },
}

/// Light parameters; placement comes from the owning node's transform
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// The type of light
    pub kind: LightKind,
    /// RGB color values for the light (0.0 to 1.0 range)
    pub color: Vec3,
    /// Light intensity multiplier
    pub intensity: f32,
}

impl Light {
    /// Create a white point light with the given intensity
    pub fn point(intensity: f32) -> Self {
        Self {
            kind: LightKind::Point,
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity,
        }
    }

    /// Create a white directional light with the given intensity
    pub fn directional(intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional,
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity,
        }
    }
}

/// How a stand-in quad gets its camera-facing orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StandInVariant {
    /// A plane in world space, explicitly reoriented toward the camera after
    /// each refresh
    Plane,
    /// A billboard primitive the backend always draws camera-facing; no
    /// reorientation needed
    Billboard,
}

/// What a scene node represents
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Pure grouping node with no renderable content
    Group,
    /// Renderable geometry with local-space bounds
    Geometry {
        /// Bounds of the node's mesh in local space
        bounds: AABB,
        /// Backend mesh resource, if one has been registered
        mesh: Option<MeshHandle>,
    },
    /// A light source
    Light(Light),
    /// A cached 2D stand-in quad owned by an impostor entry
    StandIn {
        /// Orientation strategy for the quad
        variant: StandInVariant,
    },
}

/// A node in the scene graph
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Local transform relative to the parent node
    pub transform: Transform,
    /// Per-node visibility flag; an invisible node hides its whole subtree
    pub visible: bool,
    /// Render layer membership
    pub layers: RenderLayers,
    /// What the node represents
    pub kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl SceneNode {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            transform: Transform::identity(),
            visible: true,
            layers: RenderLayers::default(),
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Create a grouping node
    pub fn group() -> Self {
        Self::with_kind(NodeKind::Group)
    }

    /// Create a geometry node with local-space bounds
    pub fn geometry(bounds: AABB) -> Self {
        Self::with_kind(NodeKind::Geometry { bounds, mesh: None })
    }

    /// Create a light node
    pub fn light(light: Light) -> Self {
        Self::with_kind(NodeKind::Light(light))
    }

    /// Create a stand-in node; starts hidden
    pub fn stand_in(variant: StandInVariant) -> Self {
        let mut node = Self::with_kind(NodeKind::StandIn { variant });
        node.visible = false;
        node
    }

    /// Set the local transform (builder style)
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the local position (builder style)
    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Associate a backend mesh resource with a geometry node (builder style)
    pub fn with_mesh(mut self, handle: MeshHandle) -> Self {
        if let NodeKind::Geometry { mesh, .. } = &mut self.kind {
            *mesh = Some(handle);
        }
        self
    }

    /// The parent node, if any
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The direct children of this node
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether this node is a light source
    pub fn is_light(&self) -> bool {
        matches!(self.kind, NodeKind::Light(_))
    }
}
