use std::collections::HashMap;

use cgmath::Matrix4;
use inlinable_string::InlinableString;

use crate::rules::UpdateRule;
use crate::spatial::{GraphNode, LinkedEntity, NodeId};
use crate::utils::Timestamp;

/// A graph mutation encoded with exactly the fields needed to replay it
/// on a remote peer. Serializes as `{"op": ..., "data": {...}}`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "op", content = "data")]
pub enum Event {
    AddObject {
        id: NodeId,
        local: Option<Matrix4<f32>>,
        coordinate_adapter: bool,
    },
    AddFrame {
        object: NodeId,
        id: NodeId,
        local: Option<Matrix4<f32>>,
        entity: Option<LinkedEntity>,
    },
    AddNode {
        object: NodeId,
        frame: NodeId,
        id: NodeId,
        local: Option<Matrix4<f32>>,
        entity: Option<LinkedEntity>,
    },
    RemoveElement {
        id: NodeId,
    },
    UpdatePosition {
        object: NodeId,
        frame: Option<NodeId>,
        node: Option<NodeId>,
        local: Matrix4<f32>,
        x: Option<f32>,
        y: Option<f32>,
        scale: Option<f32>,
    },
    UpdateWorldId {
        object: NodeId,
        world: NodeId,
    },
    DeactivateElement {
        id: NodeId,
    },
    ActivateElement {
        id: NodeId,
    },
    FullUpdate {
        graph: SerializedGraph,
    },
}

/// One outbound network message: a batch of events stamped with the wall
/// clock and the local sender's address.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReplicationMessage {
    pub timestamp: Timestamp,
    pub sender: InlinableString,
    pub events: Vec<Event>,
}

/// Inbound envelope; events stay opaque at this stage so one unknown or
/// corrupt kind does not poison the rest of the batch.
#[derive(Deserialize, Debug)]
pub(crate) struct RawMessage {
    #[allow(dead_code)]
    pub timestamp: Timestamp,
    pub sender: InlinableString,
    pub events: Vec<serde_json::Value>,
}

/// Serializable projection of a node. The dirty and rerender flags are
/// deliberately excluded; the linked-entity reference is replaced by its
/// compact by-value form.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SerializedNode {
    pub id: NodeId,
    pub local: Matrix4<f32>,
    pub world: Matrix4<f32>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub deactivated: bool,
    pub coordinate_adapter: bool,
    pub entity: Option<LinkedEntity>,
    pub rules: Vec<UpdateRule>,
}

/// A full serialized graph, keyed by node id.
pub type SerializedGraph = HashMap<NodeId, SerializedNode>;

impl<'a> From<&'a GraphNode> for SerializedNode {
    fn from(node: &'a GraphNode) -> Self {
        SerializedNode {
            id: node.id.clone(),
            local: node.local,
            world: node.world,
            parent: node.parent.clone(),
            children: node.children.iter().cloned().collect(),
            deactivated: node.deactivated,
            coordinate_adapter: node.is_adapter,
            entity: node.linked.clone(),
            rules: node.rules.iter().cloned().collect(),
        }
    }
}
