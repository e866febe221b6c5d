//! Output contract of `state_at`: the full resolved scene at one instant.
//!
//! Hosts draw from `world`; `local` is what the commands produced before
//! group composition.

use serde::{Deserialize, Serialize};

use crate::camera::CameraState;
use crate::ids::NodeId;
use crate::node::NodeState;
use crate::shape::{Geometry, ShapeKind};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: ShapeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Geometry as sampled; differs from the node's own while it morphs.
    pub geometry: Geometry,
    pub local: NodeState,
    /// Transform composed parent-to-child; opacity and reveal multiplied
    /// down the chain, visibility AND-ed.
    pub world: NodeState,
}

impl NodeSnapshot {
    /// Drawn at all: visible and not fully transparent.
    pub fn is_drawn(&self) -> bool {
        self.world.visible && self.world.opacity > 0.0
    }
}

/// Scene state at `time`, nodes indexed by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub time: f32,
    pub nodes: Vec<NodeSnapshot>,
    pub camera: CameraState,
}

impl SceneSnapshot {
    pub fn node(&self, id: NodeId) -> Option<&NodeSnapshot> {
        self.nodes.get(id.index()).filter(|n| n.id == id)
    }

    pub fn find(&self, name: &str) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|n| n.name.as_deref() == Some(name))
    }

    /// Nodes currently drawn, in creation order.
    pub fn drawn(&self) -> impl Iterator<Item = &NodeSnapshot> {
        self.nodes.iter().filter(|n| n.is_drawn())
    }
}
