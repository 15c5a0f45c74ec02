//! The owning service that external subsystems talk to. It holds the
//! transform graph, the replication channel, and the injected
//! collaborators together with one explicit lifecycle; there is no
//! ambient global state, instances are passed to whoever needs graph
//! access.

use std::time::Duration;

use cgmath::{Matrix4, Point3};

use crate::replication::{
    apply_incoming, Event, LocalAddress, Replicator, ReplicatorConfig, Transport,
};
use crate::rules::UpdateRule;
use crate::spatial::{LinkedEntity, PositionOutcome, PositionUpdate, SceneGraph};
use crate::utils::Timestamp;

/// Called on every successful position update so an external lifetime
/// tracker can keep the owning object alive and fresh.
pub trait ActivityObserver {
    fn notify_active(&mut self, object_id: &str);
}

#[derive(Debug, Clone, Copy)]
pub struct SpaceConfig {
    pub flush_interval: Duration,
    pub snapshot_interval: Duration,
    /// Whether an inbound full snapshot overwrites entries that already
    /// exist locally (last writer wins) or leaves them untouched.
    pub overwrite_conflicts: bool,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        SpaceConfig {
            flush_interval: Duration::from_secs(3),
            snapshot_interval: Duration::from_secs(60),
            overwrite_conflicts: true,
        }
    }
}

/// A shared 3d coordinate space: the transform graph plus everything that
/// keeps remote observers consistent with it.
///
/// All entry points run to completion on the caller's thread; a host with
/// genuine concurrency owns the whole value behind one exclusive lock or
/// one task, and drives [`Space::tick`] from its loop.
pub struct Space {
    graph: SceneGraph,
    replicator: Option<Replicator>,
    activity: Option<Box<dyn ActivityObserver>>,
    config: SpaceConfig,
}

impl Space {
    /// Creates a standalone space with replication disabled.
    pub fn new() -> Self {
        Space {
            graph: SceneGraph::new(),
            replicator: None,
            activity: None,
            config: SpaceConfig::default(),
        }
    }

    /// Creates a space that replicates its mutations through the given
    /// transport, stamped with the given local address.
    pub fn with_replication(
        transport: Box<dyn Transport>,
        address: Box<dyn LocalAddress>,
        config: SpaceConfig,
    ) -> Self {
        let replicator = Replicator::new(
            transport,
            address,
            ReplicatorConfig {
                flush_interval: config.flush_interval,
                snapshot_interval: config.snapshot_interval,
            },
        );

        Space {
            graph: SceneGraph::new(),
            replicator: Some(replicator),
            activity: None,
            config,
        }
    }

    /// Installs the activity callback consulted by object lifecycle
    /// management.
    pub fn observe_activity(&mut self, observer: Box<dyn ActivityObserver>) {
        self.activity = Some(observer);
    }

    #[inline]
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    #[inline]
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// The number of events queued and not yet flushed.
    #[inline]
    pub fn pending_events(&self) -> usize {
        self.replicator.as_ref().map(|v| v.pending()).unwrap_or(0)
    }

    fn record(&mut self, event: Option<Event>) {
        if let (Some(replicator), Some(event)) = (self.replicator.as_mut(), event) {
            replicator.record(event);
        }
    }
}

impl Space {
    pub fn add_object(&mut self, id: &str, local: Option<Matrix4<f32>>, needs_adapter: bool) {
        let event = self.graph.add_object(id, local, needs_adapter);
        self.record(event);
    }

    pub fn add_frame(
        &mut self,
        object_id: &str,
        id: &str,
        linked: Option<LinkedEntity>,
        local: Option<Matrix4<f32>>,
    ) {
        let event = self.graph.add_frame(object_id, id, linked, local);
        self.record(event);
    }

    pub fn add_node(
        &mut self,
        object_id: &str,
        frame_id: &str,
        id: &str,
        linked: Option<LinkedEntity>,
        local: Option<Matrix4<f32>>,
    ) {
        let event = self.graph.add_node(object_id, frame_id, id, linked, local);
        self.record(event);
    }

    pub fn remove_subtree(&mut self, id: &str) {
        let event = self.graph.remove_subtree(id);
        self.record(event);
    }

    pub fn reparent_to_world(&mut self, object_id: &str, world_id: &str) {
        let event = self.graph.reparent_to_world(object_id, world_id);
        self.record(event);
    }

    pub fn deactivate(&mut self, id: &str) {
        let event = self.graph.deactivate(id);
        self.record(event);
    }

    pub fn activate(&mut self, id: &str) {
        let event = self.graph.activate(id);
        self.record(event);
    }

    /// Applies an external position change, notifies the activity
    /// observer when the element actually moved, and queues a broadcast
    /// when the node's sensitivity rule judged the drift significant.
    pub fn update_position(&mut self, update: &PositionUpdate) {
        match self.graph.update_position(update) {
            PositionOutcome::Updated { object, broadcast } => {
                if let Some(observer) = self.activity.as_mut() {
                    observer.notify_active(object.as_ref());
                }
                self.record(broadcast);
            }
            PositionOutcome::Unchanged | PositionOutcome::Unknown => {}
        }
    }

    pub fn attach_rule(&mut self, id: &str, rule: UpdateRule) {
        self.graph.attach_rule(id, rule);
    }
}

impl Space {
    #[inline]
    pub fn recompute(&mut self) {
        self.graph.recompute();
    }

    #[inline]
    pub fn world_position(&mut self, id: &str) -> Option<Point3<f32>> {
        self.graph.world_position(id)
    }

    #[inline]
    pub fn distance_between(&mut self, lhs: &str, rhs: &str) -> Option<f32> {
        self.graph.distance_between(lhs, rhs)
    }

    #[inline]
    pub fn distance_to_point<T>(&mut self, id: &str, point: T) -> Option<f32>
    where
        T: Into<Point3<f32>>,
    {
        self.graph.distance_to_point(id, point)
    }

    /// Applies one inbound peer message; see
    /// [`apply_incoming`](crate::replication::apply_incoming).
    pub fn apply_incoming(&mut self, payload: &str) {
        apply_incoming(&mut self.graph, payload, self.config.overwrite_conflicts);
    }

    /// Runs the flush and snapshot timers against the given clock. Hosts
    /// embed this in their update loop.
    pub fn tick(&mut self, now: Timestamp) {
        if let Some(replicator) = self.replicator.as_mut() {
            replicator.tick(&mut self.graph, now);
        }
    }

    /// Flushes anything still queued and stops both timers.
    pub fn shutdown(&mut self) {
        if let Some(mut replicator) = self.replicator.take() {
            replicator.flush(Timestamp::now());
        }
    }
}

impl Default for Space {
    fn default() -> Self {
        Space::new()
    }
}
