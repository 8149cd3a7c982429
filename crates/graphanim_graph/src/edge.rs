// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge definitions for the graph model.

use crate::node::{fresh_id, NodeId};
use serde::{Deserialize, Serialize};

/// Unique identifier for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub i64);

impl EdgeId {
    /// Create a fresh, session-unique edge ID
    pub fn fresh() -> Self {
        Self(fresh_id())
    }
}

/// An edge between two nodes.
///
/// Endpoints are referenced by id, never by direct handle; callers re-resolve
/// them through the owning [`Graph`](crate::Graph) on each access.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Unique instance ID
    pub id: EdgeId,
    /// Source node ID
    pub source: NodeId,
    /// Target node ID
    pub target: NodeId,
    /// Weight. Always stored; meaningful only while the graph is weighted.
    pub weight: f32,
    /// Stroke color as `"#RRGGBB"`
    pub color: String,
}

impl Edge {
    /// Create a new edge
    pub fn new(
        id: EdgeId,
        source: NodeId,
        target: NodeId,
        weight: f32,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id,
            source,
            target,
            weight,
            color: color.into(),
        }
    }

    /// Generate a black edge with a fresh ID and a weight of 1
    pub fn generate(source: NodeId, target: NodeId) -> Self {
        Self::new(EdgeId::fresh(), source, target, 1.0, "#000000")
    }

    /// Generate a black edge with a fresh ID and the given weight
    pub fn generate_weighted(source: NodeId, target: NodeId, weight: f32) -> Self {
        Self::new(EdgeId::fresh(), source, target, weight, "#000000")
    }

    /// Check if this edge touches a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.source == node_id || self.target == node_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_involves_node() {
        let edge = Edge::new(EdgeId(10), NodeId(1), NodeId(2), 1.0, "#000000");
        assert!(edge.involves_node(NodeId(1)));
        assert!(edge.involves_node(NodeId(2)));
        assert!(!edge.involves_node(NodeId(3)));
    }

    #[test]
    fn test_generated_edges_get_distinct_ids() {
        let a = Edge::generate(NodeId(1), NodeId(2));
        let b = Edge::generate_weighted(NodeId(1), NodeId(2), 2.5);
        assert_ne!(a.id, b.id);
        assert_eq!(b.weight, 2.5);
    }
}
