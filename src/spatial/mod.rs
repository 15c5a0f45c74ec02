//! Hierarchical transform store with lazy, dirty-gated recomputation.

pub mod entity;
pub mod graph;
pub mod node;

pub mod prelude {
    pub use super::entity::{EntityInfo, LinkedEntity};
    pub use super::graph::{PositionOutcome, PositionUpdate, SceneGraph};
    pub use super::node::{GraphNode, NodeId, ROOT_ID};
}

pub use self::entity::{EntityInfo, LinkedEntity};
pub use self::graph::{Ancestors, Descendants, PositionOutcome, PositionUpdate, SceneGraph};
pub use self::node::{GraphNode, NodeId, ROOT_ID};
