use std::time::Duration;

use inlinable_string::InlinableString;

use crate::errors::Result;
use crate::spatial::{PositionUpdate, SceneGraph};
use crate::utils::Timestamp;

use super::events::{Event, RawMessage, ReplicationMessage};

/// Fire-and-forget outbound channel. The crate never opens sockets
/// itself; a dropped payload is repaired by the next full snapshot.
pub trait Transport {
    fn send(&mut self, payload: String) -> Result<()>;
}

/// Source of the address stamped into every outbound message.
pub trait LocalAddress {
    fn address(&self) -> InlinableString;
}

impl LocalAddress for InlinableString {
    fn address(&self) -> InlinableString {
        self.clone()
    }
}

impl LocalAddress for String {
    fn address(&self) -> InlinableString {
        InlinableString::from(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReplicatorConfig {
    /// Cadence of the batched event flush.
    pub flush_interval: Duration,
    /// Cadence of the full-graph recovery snapshot.
    pub snapshot_interval: Duration,
}

impl Default for ReplicatorConfig {
    fn default() -> Self {
        ReplicatorConfig {
            flush_interval: Duration::from_secs(3),
            snapshot_interval: Duration::from_secs(60),
        }
    }
}

/// Batches graph mutation events into periodic network messages and ships
/// full recomputed snapshots on a longer interval for crash recovery.
pub struct Replicator {
    queue: Vec<Event>,
    transport: Box<dyn Transport>,
    address: Box<dyn LocalAddress>,
    config: ReplicatorConfig,
    last_flush: Timestamp,
    last_snapshot: Timestamp,
}

impl Replicator {
    pub fn new(
        transport: Box<dyn Transport>,
        address: Box<dyn LocalAddress>,
        config: ReplicatorConfig,
    ) -> Self {
        let now = Timestamp::now();
        Replicator {
            queue: Vec::new(),
            transport,
            address,
            config,
            last_flush: now,
            last_snapshot: now,
        }
    }

    /// Appends an event to the in-memory FIFO queue; never blocks.
    #[inline]
    pub fn record(&mut self, event: Event) {
        self.queue.push(event);
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drains the queue into one outbound message. A burst of mutations
    /// between flushes batches into a single message by queue semantics.
    pub fn flush(&mut self, now: Timestamp) {
        self.last_flush = now;

        if self.queue.is_empty() {
            debug!("Nothing queued, skipping flush.");
            return;
        }

        let message = ReplicationMessage {
            timestamp: now,
            sender: self.address.address(),
            events: self.queue.drain(..).collect(),
        };

        self.dispatch(&message);
    }

    /// Wraps the entire recomputed graph into one `FullUpdate` and sends
    /// it immediately, bypassing the batched queue.
    pub fn send_snapshot(&mut self, graph: &mut SceneGraph, now: Timestamp) {
        self.last_snapshot = now;

        let message = ReplicationMessage {
            timestamp: now,
            sender: self.address.address(),
            events: vec![Event::FullUpdate {
                graph: graph.serialize(),
            }],
        };

        self.dispatch(&message);
    }

    /// Runs whichever of the two timers has come due against the given
    /// clock.
    pub fn tick(&mut self, graph: &mut SceneGraph, now: Timestamp) {
        if now - self.last_flush >= self.config.flush_interval {
            self.flush(now);
        }

        if now - self.last_snapshot >= self.config.snapshot_interval {
            self.send_snapshot(graph, now);
        }
    }

    fn dispatch(&mut self, message: &ReplicationMessage) {
        match serde_json::to_string(message) {
            Ok(payload) => {
                if let Err(err) = self.transport.send(payload) {
                    warn!("Failed to send a replication message: {}", err);
                }
            }
            Err(err) => error!("Failed to encode a replication message: {}", err),
        }
    }
}

/// Applies one inbound peer message to the graph. Events are decoded one
/// by one so an unknown or corrupt kind is logged and skipped while the
/// rest of the batch still applies.
pub fn apply_incoming(graph: &mut SceneGraph, payload: &str, overwrite_conflicts: bool) {
    let message: RawMessage = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(err) => {
            error!("Discarding a malformed replication message: {}", err);
            return;
        }
    };

    debug!(
        "Applying {} replicated events from {}.",
        message.events.len(),
        message.sender
    );

    for value in message.events {
        match serde_json::from_value::<Event>(value) {
            Ok(event) => apply_event(graph, event, overwrite_conflicts),
            Err(err) => error!("Skipping an unknown replication event: {}", err),
        }
    }
}

/// Dispatches a replicated event to the matching graph mutation. The
/// events those mutations hand back are dropped, so remote changes do not
/// echo back out to peers.
fn apply_event(graph: &mut SceneGraph, event: Event, overwrite_conflicts: bool) {
    match event {
        Event::AddObject {
            id,
            local,
            coordinate_adapter,
        } => {
            graph.add_object(id.as_ref(), local, coordinate_adapter);
        }
        Event::AddFrame {
            object,
            id,
            local,
            entity,
        } => {
            graph.add_frame(object.as_ref(), id.as_ref(), entity, local);
        }
        Event::AddNode {
            object,
            frame,
            id,
            local,
            entity,
        } => {
            graph.add_node(object.as_ref(), frame.as_ref(), id.as_ref(), entity, local);
        }
        Event::RemoveElement { id } => {
            graph.remove_subtree(id.as_ref());
        }
        Event::UpdatePosition {
            object,
            frame,
            node,
            local,
            x,
            y,
            scale,
        } => {
            graph.update_position(&PositionUpdate {
                object: object.as_ref(),
                frame: frame.as_ref().map(|v| v.as_ref()),
                node: node.as_ref().map(|v| v.as_ref()),
                local,
                x,
                y,
                scale,
            });
        }
        Event::UpdateWorldId { object, world } => {
            graph.reparent_to_world(object.as_ref(), world.as_ref());
        }
        Event::DeactivateElement { id } => {
            graph.deactivate(id.as_ref());
        }
        Event::ActivateElement { id } => {
            graph.activate(id.as_ref());
        }
        Event::FullUpdate { graph: snapshot } => {
            graph.apply_snapshot(&snapshot, overwrite_conflicts);
        }
    }
}
