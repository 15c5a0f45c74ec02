//! Event-sourced replication of graph mutations to remote observers:
//! typed events batched into periodic network messages, plus full-graph
//! snapshots on a longer interval as the recovery mechanism for anything
//! lost in between. At-most-once, eventually consistent; there are no
//! acknowledgements, no retries, and no ordering guarantee beyond FIFO
//! emission order.

pub mod events;
pub mod manager;

pub mod prelude {
    pub use super::events::{Event, ReplicationMessage, SerializedGraph, SerializedNode};
    pub use super::manager::{
        apply_incoming, LocalAddress, Replicator, ReplicatorConfig, Transport,
    };
}

pub use self::events::{Event, ReplicationMessage, SerializedGraph, SerializedNode};
pub use self::manager::{apply_incoming, LocalAddress, Replicator, ReplicatorConfig, Transport};
