use std::collections::HashMap;
use std::iter;

use cgmath::prelude::*;
use cgmath::{Matrix4, Point3};

use crate::errors::Result;
use crate::math;
use crate::replication::events::{Event, SerializedGraph, SerializedNode};
use crate::rules::{Drift, UpdateRule};
use crate::utils::Timestamp;

use super::entity::LinkedEntity;
use super::node::{GraphNode, NodeId, ROOT_ID};

/// A hierarchical transform store keeping the authoritative pose of every
/// tracked element. The graph owns a root node and a flat id index; world
/// matrices are recomputed lazily, gated by a two-level dirty-flag scheme
/// so a query over a large, mostly-unchanged graph costs O(changed nodes
/// and their ancestors) rather than O(graph size).
///
/// Mutations that remote observers care about return the [`Event`] that
/// replays them; the owning service decides whether to record it.
pub struct SceneGraph {
    nodes: HashMap<NodeId, GraphNode>,
}

/// An external position change, as delivered by frame controllers, pose
/// fusion or inbound network handlers. Resolution picks the most specific
/// element that exists: node, then frame, then object.
#[derive(Debug, Clone, Copy)]
pub struct PositionUpdate<'a> {
    pub object: &'a str,
    pub frame: Option<&'a str>,
    pub node: Option<&'a str>,
    pub local: Matrix4<f32>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub scale: Option<f32>,
}

/// What became of a [`PositionUpdate`].
pub enum PositionOutcome {
    /// None of the addressed elements is in the graph.
    Unknown,
    /// Nothing differed from current state; no dirtying, no event.
    Unchanged,
    /// The element moved. `broadcast` carries the replication event when
    /// the node's sensitivity rule judged the drift significant.
    Updated {
        object: NodeId,
        broadcast: Option<Event>,
    },
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(NodeId::from(ROOT_ID), GraphNode::new(NodeId::from(ROOT_ID)));
        SceneGraph { nodes }
    }

    /// The number of nodes in the flat index, the root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(&NodeId::from(id))
    }

    #[inline]
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(&NodeId::from(id))
    }

    #[inline]
    pub fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.get_mut(&NodeId::from(id))
    }

    /// Gets the parent of a node.
    #[inline]
    pub fn parent(&self, id: &str) -> Option<NodeId> {
        self.node(id).and_then(|v| v.parent.clone())
    }

    /// Returns true if this is the root of a hierarchy, aka. has no parent.
    #[inline]
    pub fn is_root(&self, id: &str) -> bool {
        self.node(id).map(|v| v.parent.is_none()).unwrap_or(false)
    }

    /// Returns true if this is the leaf of a hierarchy, aka. has no child.
    #[inline]
    pub fn is_leaf(&self, id: &str) -> bool {
        self.node(id).map(|v| v.children.is_empty()).unwrap_or(false)
    }

    /// Returns an iterator over the ids of a node's ancestors.
    #[inline]
    pub fn ancestors(&self, id: &str) -> Ancestors {
        Ancestors {
            graph: self,
            cursor: self.parent(id),
        }
    }

    /// Return true if `rhs` is one of the ancestors of `lhs`.
    #[inline]
    pub fn is_ancestor(&self, lhs: &str, rhs: &str) -> bool {
        let key = NodeId::from(rhs);
        self.ancestors(lhs).any(|v| v == key)
    }

    /// The ids of a node's direct children, in insertion order.
    #[inline]
    pub fn children(&self, id: &str) -> &[NodeId] {
        self.node(id).map(|v| v.children.as_slice()).unwrap_or(&[])
    }

    /// Returns an iterator over a node's descendants in tree order.
    pub fn descendants(&self, id: &str) -> Descendants {
        Descendants {
            graph: self,
            stack: self
                .node(id)
                .map(|v| v.children.iter().rev().cloned().collect())
                .unwrap_or_default(),
        }
    }
}

impl SceneGraph {
    fn upsert(&mut self, id: &str) -> NodeId {
        let key = NodeId::from(id);
        if !self.nodes.contains_key(&key) {
            self.nodes.insert(key.clone(), GraphNode::new(key.clone()));
        }
        key
    }

    /// Detaches a node from its parent's children list. The node itself
    /// and its children are untouched.
    fn detach(&mut self, child: &NodeId) {
        let parent = self.nodes.get_mut(child).and_then(|v| v.parent.take());
        if let Some(parent) = parent {
            if let Some(node) = self.nodes.get_mut(&parent) {
                node.children.retain(|v| *v != *child);
            }
        }
    }

    /// Best-effort attachment used by the upsert operations: a missing or
    /// cyclic parent leaves the child unattached with a warning, since
    /// network-origin events may arrive out of order.
    fn attach(&mut self, child: &NodeId, parent: &NodeId) {
        if child == parent {
            warn!("{} can not become its own parent.", child);
            return;
        }

        if !self.nodes.contains_key(parent) {
            warn!("{} is not in the graph, {} left unattached.", parent, child);
            return;
        }

        if self.is_ancestor(parent.as_ref(), child.as_ref()) {
            warn!(
                "Attaching {} under {} would close a cycle, left unattached.",
                child, parent
            );
            return;
        }

        if self.nodes.get(child).and_then(|v| v.parent.as_ref()) == Some(parent) {
            return;
        }

        self.detach(child);

        self.nodes
            .get_mut(parent)
            .unwrap()
            .children
            .push(child.clone());

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent.clone());
        }

        self.flag_for_recompute(child);
    }

    /// Attaches `child` to a new parent, detaching it from the current one
    /// first. Rejects self-parenting and any attachment that would close
    /// an indirect cycle, in O(depth) over the new parent's ancestors.
    pub fn set_parent(&mut self, child: &str, parent: &str) -> Result<()> {
        if child == parent {
            bail!("Node can not set itself as parent.");
        }

        if !self.contains(child) {
            bail!("{} is not in the graph.", child);
        }

        if !self.contains(parent) {
            bail!("{} is not in the graph.", parent);
        }

        if self.is_ancestor(parent, child) {
            bail!(
                "{} is a descendant of {}; attaching would close a cycle.",
                parent,
                child
            );
        }

        self.attach(&NodeId::from(child), &NodeId::from(parent));
        Ok(())
    }

    /// Upserts a root-anchored object. Re-insertion of an existing id is
    /// idempotent and reuses the node, e.g. on reconnect. When
    /// `needs_adapter` is set, a synthetic child carrying the fixed
    /// ground-plane rotation is created and subsequent child insertions
    /// under the object are silently retargeted to it.
    pub fn add_object(
        &mut self,
        id: &str,
        local: Option<Matrix4<f32>>,
        needs_adapter: bool,
    ) -> Option<Event> {
        if id == ROOT_ID {
            warn!("{} is reserved for the scene origin.", ROOT_ID);
            return None;
        }

        let key = self.upsert(id);

        if let Some(local) = local {
            self.set_local_matrix(id, local);
        }

        if self.nodes.get(&key).map(|v| v.parent.is_none()).unwrap_or(false) {
            self.attach(&key, &NodeId::from(ROOT_ID));
        }

        if needs_adapter && self.nodes.get(&key).map(|v| v.adapter.is_none()).unwrap_or(false) {
            let adapter_key = self.upsert(&format!("{}.adapter", id));
            if let Some(adapter) = self.nodes.get_mut(&adapter_key) {
                adapter.is_adapter = true;
                adapter.local = math::adapter_rotation();
            }
            self.attach(&adapter_key, &key);
            if let Some(node) = self.nodes.get_mut(&key) {
                node.adapter = Some(adapter_key);
            }
        }

        Some(Event::AddObject {
            id: key,
            local,
            coordinate_adapter: needs_adapter,
        })
    }

    /// Upserts a content frame under an object. A missing object id leaves
    /// the frame unattached rather than failing the call.
    pub fn add_frame(
        &mut self,
        object_id: &str,
        id: &str,
        linked: Option<LinkedEntity>,
        local: Option<Matrix4<f32>>,
    ) -> Option<Event> {
        let key = self.upsert(id);
        self.configure(&key, &linked, local);

        match self.child_anchor(object_id) {
            Some(parent) => self.attach(&key, &parent),
            None => warn!(
                "Object {} is not in the graph, frame {} left unattached.",
                object_id, id
            ),
        }

        Some(Event::AddFrame {
            object: NodeId::from(object_id),
            id: key,
            local,
            entity: linked,
        })
    }

    /// Upserts a data element under a frame.
    pub fn add_node(
        &mut self,
        object_id: &str,
        frame_id: &str,
        id: &str,
        linked: Option<LinkedEntity>,
        local: Option<Matrix4<f32>>,
    ) -> Option<Event> {
        let key = self.upsert(id);
        self.configure(&key, &linked, local);

        if self.contains(frame_id) {
            let parent = NodeId::from(frame_id);
            self.attach(&key, &parent);
        } else {
            warn!(
                "Frame {} is not in the graph, node {} left unattached.",
                frame_id, id
            );
        }

        Some(Event::AddNode {
            object: NodeId::from(object_id),
            frame: NodeId::from(frame_id),
            id: key,
            local,
            entity: linked,
        })
    }

    fn configure(&mut self, key: &NodeId, linked: &Option<LinkedEntity>, local: Option<Matrix4<f32>>) {
        if let Some(linked) = linked {
            if let Some(node) = self.nodes.get_mut(key) {
                node.linked = Some(linked.clone());
            }
            self.flag_for_recompute(key);
        }

        if let Some(local) = local {
            self.set_local_matrix(key.as_ref(), local);
        }
    }

    /// The node new children of this object should actually be placed
    /// under: the coordinate adapter when one exists, the object itself
    /// otherwise.
    fn child_anchor(&self, object_id: &str) -> Option<NodeId> {
        self.node(object_id)
            .map(|v| v.adapter.clone().unwrap_or_else(|| v.id.clone()))
    }

    /// Detaches a node and deletes it and transitively all descendants
    /// from the flat index. No orphan stays reachable once this returns.
    pub fn remove_subtree(&mut self, id: &str) -> Option<Event> {
        if id == ROOT_ID {
            warn!("The scene root can not be removed.");
            return None;
        }

        let key = NodeId::from(id);
        if !self.nodes.contains_key(&key) {
            warn!("{} is not in the graph.", id);
            return None;
        }

        let removes: Vec<NodeId> = iter::once(key.clone()).chain(self.descendants(id)).collect();
        self.detach(&key);
        for v in &removes {
            self.nodes.remove(v);
        }

        Some(Event::RemoveElement { id: key })
    }

    /// Moves an object under a different world anchor, upserting the
    /// anchor under the root when it is not known yet. Refuses to parent
    /// a node to itself.
    pub fn reparent_to_world(&mut self, object_id: &str, world_id: &str) -> Option<Event> {
        if object_id == world_id {
            warn!("{} can not become its own world anchor.", object_id);
            return None;
        }

        if !self.contains(object_id) {
            warn!("{} is not in the graph.", object_id);
            return None;
        }

        let world = self.upsert(world_id);
        if self.nodes.get(&world).map(|v| v.parent.is_none()).unwrap_or(false)
            && world_id != ROOT_ID
        {
            self.attach(&world, &NodeId::from(ROOT_ID));
        }

        let object = NodeId::from(object_id);
        self.attach(&object, &world);

        Some(Event::UpdateWorldId { object, world })
    }

    /// Soft-disables a node; it stays in the graph but callers are
    /// expected to exclude it from externally meaningful computations.
    pub fn deactivate(&mut self, id: &str) -> Option<Event> {
        match self.node_mut(id) {
            Some(node) => {
                node.deactivated = true;
                Some(Event::DeactivateElement {
                    id: node.id.clone(),
                })
            }
            None => {
                warn!("{} is not in the graph.", id);
                None
            }
        }
    }

    pub fn activate(&mut self, id: &str) -> Option<Event> {
        match self.node_mut(id) {
            Some(node) => {
                node.deactivated = false;
                Some(Event::ActivateElement {
                    id: node.id.clone(),
                })
            }
            None => {
                warn!("{} is not in the graph.", id);
                None
            }
        }
    }

    /// Attaches a significance rule to a node; a same-kind rule replaces
    /// the existing one.
    pub fn attach_rule(&mut self, id: &str, rule: UpdateRule) {
        match self.node_mut(id) {
            Some(node) => node.attach_rule(rule),
            None => warn!("{} is not in the graph.", id),
        }
    }
}

impl SceneGraph {
    /// Copies a new local matrix into a node and flags it, its subtree and
    /// its ancestor chain for recomputation.
    pub fn set_local_matrix(&mut self, id: &str, local: Matrix4<f32>) {
        let key = NodeId::from(id);
        match self.nodes.get_mut(&key) {
            Some(node) => node.local = local,
            None => {
                warn!("{} is not in the graph.", id);
                return;
            }
        }
        self.flag_for_recompute(&key);
    }

    /// Marks the node and every descendant stale, then walks the ancestor
    /// chain raising the subtree flag, short-circuiting at the first
    /// ancestor that already carries it.
    fn flag_for_recompute(&mut self, id: &NodeId) {
        let mut stack = vec![id.clone()];
        while let Some(cur) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(&cur) {
                node.dirty = true;
                if !node.children.is_empty() {
                    node.subtree_dirty = true;
                }
                stack.extend(node.children.iter().cloned());
            }
        }

        let mut cursor = self.nodes.get(id).and_then(|v| v.parent.clone());
        while let Some(cur) = cursor {
            match self.nodes.get_mut(&cur) {
                Some(node) => {
                    if node.subtree_dirty {
                        break;
                    }
                    node.subtree_dirty = true;
                    cursor = node.parent.clone();
                }
                None => break,
            }
        }
    }

    fn flag_for_rerender(&mut self, id: &NodeId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.needs_rerender = true;
        }

        let mut cursor = self.nodes.get(id).and_then(|v| v.parent.clone());
        while let Some(cur) = cursor {
            match self.nodes.get_mut(&cur) {
                Some(node) => {
                    if node.subtree_needs_rerender {
                        break;
                    }
                    node.subtree_needs_rerender = true;
                    cursor = node.parent.clone();
                }
                None => break,
            }
        }
    }

    /// Clears the rerender flags once the consuming layer has drawn.
    pub fn clear_rerender_flags(&mut self) {
        for node in self.nodes.values_mut() {
            node.needs_rerender = false;
            node.subtree_needs_rerender = false;
        }
    }

    /// Recomputes stale world matrices top-down from the root. Pull-based
    /// by design: many mutations coalesce into one recomputation pass per
    /// query cycle.
    pub fn recompute(&mut self) {
        self.update_world(&NodeId::from(ROOT_ID), None, 1.0);
    }

    fn update_world(
        &mut self,
        id: &NodeId,
        parent_world: Option<&Matrix4<f32>>,
        ancestor_linked_scale: f32,
    ) {
        let (dirty, subtree_dirty) = match self.nodes.get(id) {
            Some(v) => (v.dirty, v.subtree_dirty),
            None => return,
        };

        if !dirty && !subtree_dirty {
            return;
        }

        if dirty {
            let fresh = {
                let node = &self.nodes[id];
                let mut m = match parent_world {
                    Some(parent) => parent * node.local,
                    None => node.local,
                };
                if let Some(ref linked) = node.linked {
                    let (x, y, scale) = linked.placement();
                    m = m * math::placement(x, y, scale / ancestor_linked_scale);
                }
                m
            };

            let changed = {
                let node = self.nodes.get_mut(id).unwrap();
                node.dirty = false;
                if node.world != fresh {
                    node.world = fresh;
                    true
                } else {
                    false
                }
            };

            if changed {
                self.flag_for_rerender(id);
            }
        }

        let (world, linked_scale, children) = {
            let node = &self.nodes[id];
            let mut scale = ancestor_linked_scale;
            if let Some(ref linked) = node.linked {
                scale *= linked.placement().2;
            }
            (node.world, scale, node.children.clone())
        };

        for child in &children {
            self.update_world(child, Some(&world), linked_scale);
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.subtree_dirty = false;
        }
    }
}

impl SceneGraph {
    /// World-space position of a node, recomputing first. Unknown ids
    /// yield `None`.
    pub fn world_position(&mut self, id: &str) -> Option<Point3<f32>> {
        self.recompute();
        match self.node(id) {
            Some(node) => Some(node.world_position()),
            None => {
                warn!("{} is not in the graph.", id);
                None
            }
        }
    }

    /// Euclidean distance between the world positions of two nodes,
    /// recomputing first.
    pub fn distance_between(&mut self, lhs: &str, rhs: &str) -> Option<f32> {
        self.recompute();
        match (self.node(lhs), self.node(rhs)) {
            (Some(a), Some(b)) => Some(math::translation_distance(&a.world, &b.world)),
            _ => {
                warn!("Either {} or {} is not in the graph.", lhs, rhs);
                None
            }
        }
    }

    /// Euclidean distance between a node's world position and a fixed
    /// point, recomputing first.
    pub fn distance_to_point<T>(&mut self, id: &str, point: T) -> Option<f32>
    where
        T: Into<Point3<f32>>,
    {
        self.recompute();
        match self.node(id) {
            Some(node) => Some((node.world_position() - point.into()).magnitude()),
            None => {
                warn!("{} is not in the graph.", id);
                None
            }
        }
    }

    /// The pose of `lhs` expressed in `rhs`'s frame. Does not recompute:
    /// callers trade staleness risk for predictable cost.
    pub fn matrix_relative_to(&self, lhs: &str, rhs: &str) -> Option<Matrix4<f32>> {
        let a = self.node(lhs)?;
        let b = self.node(rhs)?;
        Some(math::invert_or_identity(&b.world) * a.world)
    }

    /// The inverse problem: the local matrix that would realize the given
    /// world pose under the node's current parent.
    pub fn local_matrix_for_world(
        &self,
        id: &str,
        world: &Matrix4<f32>,
    ) -> Option<Matrix4<f32>> {
        let node = self.node(id)?;
        match node.parent {
            Some(ref parent) => self
                .nodes
                .get(parent)
                .map(|v| math::invert_or_identity(&v.world) * world),
            None => Some(*world),
        }
    }

    /// Places a node so its world pose equals `other`'s composed with
    /// `relative`.
    pub fn set_position_relative_to(&mut self, id: &str, other: &str, relative: &Matrix4<f32>) {
        let target = match self.node(other) {
            Some(node) => node.world * relative,
            None => {
                warn!("{} is not in the graph.", other);
                return;
            }
        };

        if let Some(local) = self.local_matrix_for_world(id, &target) {
            self.set_local_matrix(id, local);
        }
    }

    /// Applies an external position change; see [`PositionUpdate`].
    pub fn update_position(&mut self, update: &PositionUpdate) -> PositionOutcome {
        let key = match self.resolve_target(update) {
            Some(v) => v,
            None => {
                warn!("No element of {} is in the graph.", update.object);
                return PositionOutcome::Unknown;
            }
        };

        {
            let node = &self.nodes[&key];
            let same_matrix = node.local == update.local;
            let same_placement = match node.linked {
                Some(ref linked) => {
                    update.x.map(|v| linked.x == Some(v)).unwrap_or(true)
                        && update.y.map(|v| linked.y == Some(v)).unwrap_or(true)
                        && update.scale.map(|v| linked.scale == Some(v)).unwrap_or(true)
                }
                None => true,
            };

            if same_matrix && same_placement {
                return PositionOutcome::Unchanged;
            }
        }

        if let Some(node) = self.nodes.get_mut(&key) {
            if let Some(ref mut linked) = node.linked {
                if update.x.is_some() {
                    linked.x = update.x;
                }
                if update.y.is_some() {
                    linked.y = update.y;
                }
                if update.scale.is_some() {
                    linked.scale = update.scale;
                }
            }
        }

        self.set_local_matrix(key.as_ref(), update.local);
        self.recompute();

        let broadcast = {
            let node = self.nodes.get_mut(&key).unwrap();
            node.last_update = node.world;

            let drift = Drift {
                distance: math::translation_distance(&node.world, &node.last_broadcast),
                elapsed: Timestamp::now() - node.last_broadcast_at,
            };

            let gate = UpdateRule::Sensitivity {
                threshold: node.sensitivity(),
            };

            if gate.is_satisfied(&drift) {
                node.last_broadcast = node.world;
                node.last_broadcast_at = Timestamp::now();
                Some(Event::UpdatePosition {
                    object: NodeId::from(update.object),
                    frame: update.frame.map(|v| NodeId::from(v)),
                    node: update.node.map(|v| NodeId::from(v)),
                    local: update.local,
                    x: update.x,
                    y: update.y,
                    scale: update.scale,
                })
            } else {
                None
            }
        };

        PositionOutcome::Updated {
            object: NodeId::from(update.object),
            broadcast,
        }
    }

    fn resolve_target(&self, update: &PositionUpdate) -> Option<NodeId> {
        update
            .node
            .and_then(|v| self.node(v).map(|n| n.id.clone()))
            .or_else(|| update.frame.and_then(|v| self.node(v).map(|n| n.id.clone())))
            .or_else(|| self.node(update.object).map(|n| n.id.clone()))
    }
}

impl SceneGraph {
    /// Projects the whole graph into its serializable form, recomputing
    /// first so snapshots always carry current world matrices.
    pub fn serialize(&mut self) -> SerializedGraph {
        self.recompute();
        self.nodes
            .values()
            .map(|v| (v.id.clone(), SerializedNode::from(v)))
            .collect()
    }

    /// Merges a full serialized graph: ids absent locally (or present,
    /// when `overwrite` is set) are replaced wholesale from the snapshot
    /// and re-linked from its parent references; everything else is left
    /// untouched. Last writer wins at snapshot granularity, not per field.
    pub fn apply_snapshot(&mut self, snapshot: &SerializedGraph, overwrite: bool) {
        let mut touched = Vec::new();

        for (id, projected) in snapshot {
            if self.nodes.contains_key(id) && !overwrite {
                continue;
            }

            let node = self
                .nodes
                .entry(id.clone())
                .or_insert_with(|| GraphNode::new(id.clone()));
            node.local = projected.local;
            node.world = projected.world;
            node.linked = projected.entity.clone();
            node.deactivated = projected.deactivated;
            node.is_adapter = projected.coordinate_adapter;
            node.rules = projected.rules.iter().cloned().collect();
            touched.push(id.clone());
        }

        for id in &touched {
            let projected = &snapshot[id];
            let adapter = projected
                .children
                .iter()
                .find(|v| {
                    snapshot
                        .get(*v)
                        .map(|c| c.coordinate_adapter)
                        .unwrap_or(false)
                })
                .cloned();

            if let Some(node) = self.nodes.get_mut(id) {
                node.parent = projected.parent.clone();
                node.children = projected.children.iter().cloned().collect();
                node.adapter = adapter;
            }

            // A parent that was not merged keeps its own children list;
            // it still has to reference the merged child, or the child
            // drops out of the root traversal entirely.
            if let Some(ref parent) = projected.parent {
                if let Some(parent_node) = self.nodes.get_mut(parent) {
                    if !parent_node.children.contains(id) {
                        parent_node.children.push(id.clone());
                    }
                }
            }
        }

        for id in &touched {
            self.flag_for_recompute(id);
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        SceneGraph::new()
    }
}

/// An iterator over the ids of a node's ancestors.
pub struct Ancestors<'a> {
    graph: &'a SceneGraph,
    cursor: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.cursor.take()?;
        self.cursor = self.graph.nodes.get(&cur).and_then(|v| v.parent.clone());
        Some(cur)
    }
}

/// An iterator over the ids of a node's descendants, in tree order.
pub struct Descendants<'a> {
    graph: &'a SceneGraph,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.stack.pop()?;
        if let Some(node) = self.graph.nodes.get(&cur) {
            self.stack.extend(node.children.iter().rev().cloned());
        }
        Some(cur)
    }
}
