use cgmath::prelude::*;
use cgmath::{Matrix4, Point3};
use inlinable_string::InlinableString;
use smallvec::SmallVec;

use crate::math;
use crate::rules::{RuleKind, UpdateRule, DEFAULT_SENSITIVITY};
use crate::utils::Timestamp;

use super::entity::LinkedEntity;

/// Stable identifier of a node, unique within its graph; doubles as the
/// wire-protocol address of the element.
pub type NodeId = InlinableString;

/// Reserved id of the scene origin.
pub const ROOT_ID: &str = "ROOT";

/// A single addressable point in the hierarchy.
///
/// Ownership is arena-style: the graph owns every node in its flat index,
/// and `parent`, `children` and `adapter` are plain ids resolved through
/// it. Removing a node from its parent's children does not destroy it.
pub struct GraphNode {
    pub(crate) id: NodeId,
    pub(crate) local: Matrix4<f32>,
    pub(crate) world: Matrix4<f32>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: SmallVec<[NodeId; 4]>,
    pub(crate) linked: Option<LinkedEntity>,
    /// Synthetic coordinate-adapter child; when present, child insertions
    /// under this node are silently retargeted to it.
    pub(crate) adapter: Option<NodeId>,
    pub(crate) is_adapter: bool,
    pub(crate) deactivated: bool,
    /// This node's world matrix is stale.
    pub(crate) dirty: bool,
    /// Some descendant's world matrix is stale.
    pub(crate) subtree_dirty: bool,
    pub(crate) needs_rerender: bool,
    pub(crate) subtree_needs_rerender: bool,
    pub(crate) rules: SmallVec<[UpdateRule; 2]>,
    /// World pose snapshotted when the last realtime update was emitted.
    pub(crate) last_update: Matrix4<f32>,
    /// World pose snapshotted when the last durable broadcast was emitted.
    pub(crate) last_broadcast: Matrix4<f32>,
    pub(crate) last_broadcast_at: Timestamp,
}

impl GraphNode {
    pub(crate) fn new(id: NodeId) -> Self {
        GraphNode {
            id,
            local: Matrix4::identity(),
            world: Matrix4::identity(),
            parent: None,
            children: SmallVec::new(),
            linked: None,
            adapter: None,
            is_adapter: false,
            deactivated: false,
            dirty: true,
            subtree_dirty: false,
            needs_rerender: false,
            subtree_needs_rerender: false,
            rules: SmallVec::new(),
            last_update: Matrix4::identity(),
            last_broadcast: Matrix4::identity(),
            last_broadcast_at: Timestamp::now(),
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        self.id.as_ref()
    }

    #[inline]
    pub fn local_matrix(&self) -> &Matrix4<f32> {
        &self.local
    }

    #[inline]
    pub fn world_matrix(&self) -> &Matrix4<f32> {
        &self.world
    }

    /// Extracts the normalized translation `(x/w, y/w, z/w)` of the world
    /// matrix. Only meaningful after a recompute.
    #[inline]
    pub fn world_position(&self) -> Point3<f32> {
        Point3::from_vec(math::translation(&self.world))
    }

    #[inline]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_ref().map(|v| v.as_ref())
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    pub fn linked_entity(&self) -> Option<&LinkedEntity> {
        self.linked.as_ref()
    }

    #[inline]
    pub fn is_coordinate_adapter(&self) -> bool {
        self.is_adapter
    }

    #[inline]
    pub fn is_deactivated(&self) -> bool {
        self.deactivated
    }

    #[inline]
    pub fn needs_recompute(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn subtree_needs_recompute(&self) -> bool {
        self.subtree_dirty
    }

    #[inline]
    pub fn needs_rerender(&self) -> bool {
        self.needs_rerender
    }

    #[inline]
    pub fn subtree_needs_rerender(&self) -> bool {
        self.subtree_needs_rerender
    }

    #[inline]
    pub fn rules(&self) -> &[UpdateRule] {
        &self.rules
    }

    /// Attaches a significance rule; adding a rule of an existing kind
    /// replaces it.
    pub fn attach_rule(&mut self, rule: UpdateRule) {
        if let Some(slot) = self.rules.iter_mut().find(|v| v.kind() == rule.kind()) {
            *slot = rule;
        } else {
            self.rules.push(rule);
        }
    }

    /// The sensitivity threshold gating durable broadcasts for this node.
    pub(crate) fn sensitivity(&self) -> f32 {
        self.rules
            .iter()
            .find_map(|v| match *v {
                UpdateRule::Sensitivity { threshold } => Some(threshold),
                _ => None,
            })
            .unwrap_or(DEFAULT_SENSITIVITY)
    }
}
