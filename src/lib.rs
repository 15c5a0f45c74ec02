//! Anchorage keeps the authoritative pose of every tracked element in a
//! shared 3d coordinate space: a hierarchical transform graph with lazy,
//! dirty-gated recomputation, plus an event-sourced replication channel
//! that keeps remote peers consistent under configurable broadcast
//! throttling and periodic full-state snapshots.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

extern crate cgmath;
extern crate inlinable_string;
extern crate serde_json;
extern crate smallvec;

pub mod errors;
pub mod math;
pub mod replication;
pub mod rules;
pub mod space;
pub mod spatial;
pub mod utils;

pub mod prelude {
    pub use crate::replication::prelude::*;
    pub use crate::rules::{all_satisfied, Drift, RuleKind, UpdateRule};
    pub use crate::space::{ActivityObserver, Space, SpaceConfig};
    pub use crate::spatial::prelude::*;
    pub use crate::utils::Timestamp;
}
