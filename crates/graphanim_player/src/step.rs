// SPDX-License-Identifier: MIT OR Apache-2.0
//! Diff model: the description of one algorithm step.
//!
//! A step is three ordered change lists. The replay engine applies them
//! structural-first using the `new*` values, and undoes them in exact
//! reverse using the `old*` values; both directions share this one schema.

use graphanim_graph::{EdgeId, EdgeRecord, NodeId, NodeRecord};
use serde::{Deserialize, Serialize};

/// The effect of one algorithm execution step on the graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModificationStep {
    /// Structural insertions and removals, applied first
    pub graph_changes: Vec<StructuralChange>,
    /// Node attribute deltas, applied second
    pub node_changes: Vec<NodeChange>,
    /// Edge attribute deltas, applied last
    pub edge_changes: Vec<EdgeChange>,
}

impl ModificationStep {
    /// Whether this step changes nothing
    pub fn is_empty(&self) -> bool {
        self.graph_changes.is_empty() && self.node_changes.is_empty() && self.edge_changes.is_empty()
    }
}

/// Insertion or removal of a node or edge.
///
/// Exactly one payload is expected; when both are present the node payload
/// wins and the edge payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuralChange {
    /// Node payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeRecord>,
    /// Edge payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge: Option<EdgeRecord>,
    /// Edges removed as a side effect of removing the node; recorded solely
    /// so the removal can be undone
    #[serde(rename = "removedEdge", skip_serializing_if = "Vec::is_empty")]
    pub removed_edges: Vec<EdgeRecord>,
    /// `true` removes the entity, `false` inserts it
    pub delete: bool,
}

impl StructuralChange {
    /// Insertion of a node
    pub fn add_node(node: NodeRecord) -> Self {
        Self {
            node: Some(node),
            ..Self::default()
        }
    }

    /// Removal of a node, carrying its cascade-removed edges for undo
    pub fn remove_node(node: NodeRecord, removed_edges: Vec<EdgeRecord>) -> Self {
        Self {
            node: Some(node),
            removed_edges,
            delete: true,
            ..Self::default()
        }
    }

    /// Insertion of an edge
    pub fn add_edge(edge: EdgeRecord) -> Self {
        Self {
            edge: Some(edge),
            ..Self::default()
        }
    }

    /// Removal of an edge
    pub fn remove_edge(edge: EdgeRecord) -> Self {
        Self {
            edge: Some(edge),
            delete: true,
            ..Self::default()
        }
    }
}

/// Ordered attribute deltas for one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeChange {
    /// The node the deltas apply to
    pub node_id: NodeId,
    /// Deltas in application order
    pub changes: Vec<NodeAttributeChange>,
}

/// One node attribute delta.
///
/// Only attributes actually altered are present, each as a `new`/`old` pair:
/// forward application writes the `new*` values, undo writes the `old*`
/// values, and absent fields leave the attribute untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeAttributeChange {
    /// Label after the step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_label: Option<String>,
    /// Label before the step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_label: Option<String>,
    /// Position after the step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_coordinates: Option<[f32; 2]>,
    /// Position before the step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_coordinates: Option<[f32; 2]>,
    /// Color after the step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_color: Option<String>,
    /// Color before the step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_color: Option<String>,
}

impl NodeAttributeChange {
    /// A label delta
    pub fn label(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            new_label: Some(new.into()),
            old_label: Some(old.into()),
            ..Self::default()
        }
    }

    /// A color delta
    pub fn color(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            new_color: Some(new.into()),
            old_color: Some(old.into()),
            ..Self::default()
        }
    }

    /// A position delta
    pub fn coordinates(old: [f32; 2], new: [f32; 2]) -> Self {
        Self {
            new_coordinates: Some(new),
            old_coordinates: Some(old),
            ..Self::default()
        }
    }
}

/// Ordered attribute deltas for one edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeChange {
    /// The edge the deltas apply to
    pub edge_id: EdgeId,
    /// Deltas in application order
    pub changes: Vec<EdgeAttributeChange>,
}

/// One edge attribute delta (edges only animate their color)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgeAttributeChange {
    /// Color after the step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_color: Option<String>,
    /// Color before the step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_color: Option<String>,
}

impl EdgeAttributeChange {
    /// A color delta
    pub fn color(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            new_color: Some(new.into()),
            old_color: Some(old.into()),
        }
    }
}
