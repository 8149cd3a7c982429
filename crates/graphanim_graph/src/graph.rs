// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and edges.

use crate::edge::{Edge, EdgeId};
use crate::node::{Node, NodeId};
use indexmap::IndexMap;

/// A mutable graph: nodes, edges and the weighted/directed display flags.
///
/// This is the single shared object of an animation session. During playback
/// the replay engine is its only legitimate mutator; every other component
/// reads it and refers to its entities by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    /// Nodes in insertion order
    nodes: IndexMap<NodeId, Node>,
    /// Edges in insertion order
    edges: IndexMap<EdgeId, Edge>,
    /// Whether edge weights are displayed
    weighted: bool,
    /// Whether edge direction is displayed
    directed: bool,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(weighted: bool, directed: bool) -> Self {
        Self {
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            weighted,
            directed,
        }
    }

    /// Append a node to the graph.
    ///
    /// Fails if the id is already present; ids are never reused within a
    /// session, so callers are expected to use fresh ones.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNodeId(node.id));
        }
        let id = node.id;
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Append an edge to the graph.
    ///
    /// The edge is stored only when both endpoints resolve to existing nodes
    /// and its id is unused; otherwise it is discarded and `false` is
    /// returned. A dangling endpoint reference is never stored.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if self.edges.contains_key(&edge.id) {
            tracing::debug!("discarding edge {:?}: id already present", edge.id);
            return false;
        }
        if !self.nodes.contains_key(&edge.source) || !self.nodes.contains_key(&edge.target) {
            tracing::debug!("discarding edge {:?}: missing endpoint", edge.id);
            return false;
        }
        self.edges.insert(edge.id, edge);
        true
    }

    /// Connect two nodes with a generated default edge.
    ///
    /// Returns the new edge id, or `None` when either node is missing.
    pub fn add_edge_between(&mut self, source: NodeId, target: NodeId) -> Option<EdgeId> {
        if !self.nodes.contains_key(&source) || !self.nodes.contains_key(&target) {
            return None;
        }
        let edge = Edge::generate(source, target);
        let id = edge.id;
        self.edges.insert(id, edge);
        Some(id)
    }

    /// Remove a node and, atomically, every edge touching it.
    ///
    /// Returns the node together with the cascade-removed edges so callers
    /// can record them for undo.
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<(Node, Vec<Edge>)> {
        // shift_remove keeps insertion order stable for rendering
        let node = self.nodes.shift_remove(&node_id)?;
        let mut removed = Vec::new();
        self.edges.retain(|_, edge| {
            if edge.involves_node(node_id) {
                removed.push(edge.clone());
                false
            } else {
                true
            }
        });
        Some((node, removed))
    }

    /// Remove a single edge
    pub fn remove_edge(&mut self, edge_id: EdgeId) -> Option<Edge> {
        self.edges.shift_remove(&edge_id)
    }

    /// Remove every edge connecting two nodes, in either orientation.
    ///
    /// Returns the number of edges removed.
    pub fn remove_edge_between(&mut self, first: NodeId, second: NodeId) -> usize {
        let before = self.edges.len();
        self.edges.retain(|_, edge| {
            !((edge.source == first && edge.target == second)
                || (edge.source == second && edge.target == first))
        });
        before - self.edges.len()
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get an edge by ID
    pub fn edge(&self, edge_id: EdgeId) -> Option<&Edge> {
        self.edges.get(&edge_id)
    }

    /// Get a mutable edge by ID
    pub fn edge_mut(&mut self, edge_id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(&edge_id)
    }

    /// All nodes, in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All edges, in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// All node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Nodes flagged as starting node
    pub fn starting_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|node| node.starting_node)
    }

    /// Edges touching a node
    pub fn edges_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |edge| edge.involves_node(node_id))
    }

    /// Whether edge weights are displayed
    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    /// Toggle weight display. Stored weights are untouched, so toggling back
    /// restores the prior display.
    pub fn set_weighted(&mut self, weighted: bool) {
        self.weighted = weighted;
    }

    /// Whether edge direction is displayed
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Toggle direction display. Stored endpoints are untouched.
    pub fn set_directed(&mut self, directed: bool) {
        self.directed = directed;
    }
}

/// Error when mutating a graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Node id already present
    #[error("node id already present: {0:?}")]
    DuplicateNodeId(NodeId),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, label: &str) -> Node {
        Node::new(NodeId(id), [0.25, 0.5], label, false, "#000000")
    }

    fn edge(id: i64, source: i64, target: i64) -> Edge {
        Edge::new(EdgeId(id), NodeId(source), NodeId(target), 1.0, "#000000")
    }

    #[test]
    fn test_add_nodes_then_edge() {
        let mut graph = Graph::new(true, false);
        graph.add_node(node(1, "a")).unwrap();
        graph.add_node(node(2, "b")).unwrap();
        assert!(graph.add_edge(edge(10, 1, 2)));

        assert!(graph.node(NodeId(1)).is_some());
        assert!(graph.node(NodeId(2)).is_some());
        let stored = graph.edge(EdgeId(10)).unwrap();
        assert_eq!(stored.source, NodeId(1));
        assert_eq!(stored.target, NodeId(2));
    }

    #[test]
    fn test_add_node_rejects_duplicate_id() {
        let mut graph = Graph::new(false, false);
        graph.add_node(node(1, "first")).unwrap();
        let err = graph.add_node(node(1, "second")).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateNodeId(NodeId(1))));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node(NodeId(1)).unwrap().label, "first");
    }

    #[test]
    fn test_add_edge_discards_missing_endpoints() {
        let mut graph = Graph::new(false, false);
        graph.add_node(node(1, "a")).unwrap();
        assert!(!graph.add_edge(edge(10, 1, 2)));
        assert!(!graph.add_edge(edge(11, 3, 1)));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_add_edge_discards_duplicate_id() {
        let mut graph = Graph::new(false, false);
        graph.add_node(node(1, "a")).unwrap();
        graph.add_node(node(2, "b")).unwrap();
        assert!(graph.add_edge(edge(10, 1, 2)));
        assert!(!graph.add_edge(edge(10, 2, 1)));
        assert_eq!(graph.edge(EdgeId(10)).unwrap().source, NodeId(1));
    }

    #[test]
    fn test_remove_node_cascades_touching_edges() {
        let mut graph = Graph::new(false, false);
        graph.add_node(node(1, "a")).unwrap();
        graph.add_node(node(2, "b")).unwrap();
        assert!(graph.add_edge(edge(10, 1, 2)));

        let (removed, cascade) = graph.remove_node(NodeId(1)).unwrap();
        assert_eq!(removed.id, NodeId(1));
        assert_eq!(cascade.len(), 1);
        assert_eq!(cascade[0].id, EdgeId(10));

        assert!(graph.node(NodeId(1)).is_none());
        assert!(graph.edge(EdgeId(10)).is_none());
        assert!(graph.node(NodeId(2)).is_some());
        assert_eq!(graph.edges_for_node(NodeId(1)).count(), 0);
    }

    #[test]
    fn test_remove_missing_node_is_none() {
        let mut graph = Graph::new(false, false);
        assert!(graph.remove_node(NodeId(42)).is_none());
    }

    #[test]
    fn test_remove_edge_between_either_orientation() {
        let mut graph = Graph::new(false, false);
        graph.add_node(node(1, "a")).unwrap();
        graph.add_node(node(2, "b")).unwrap();
        graph.add_node(node(3, "c")).unwrap();
        assert!(graph.add_edge(edge(10, 1, 2)));
        assert!(graph.add_edge(edge(11, 2, 1)));
        assert!(graph.add_edge(edge(12, 2, 3)));

        assert_eq!(graph.remove_edge_between(NodeId(1), NodeId(2)), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edge(EdgeId(12)).is_some());
    }

    #[test]
    fn test_add_edge_between_requires_both_nodes() {
        let mut graph = Graph::new(false, false);
        graph.add_node(node(1, "a")).unwrap();
        assert!(graph.add_edge_between(NodeId(1), NodeId(2)).is_none());

        graph.add_node(node(2, "b")).unwrap();
        let id = graph.add_edge_between(NodeId(1), NodeId(2)).unwrap();
        assert_eq!(graph.edge(id).unwrap().weight, 1.0);
    }

    #[test]
    fn test_flag_toggles_preserve_stored_values() {
        let mut graph = Graph::new(true, true);
        graph.add_node(node(1, "a")).unwrap();
        graph.add_node(node(2, "b")).unwrap();
        let mut weighted_edge = edge(10, 1, 2);
        weighted_edge.weight = 2.5;
        assert!(graph.add_edge(weighted_edge));

        graph.set_weighted(false);
        graph.set_directed(false);
        assert!(!graph.is_weighted());
        assert!(!graph.is_directed());
        assert_eq!(graph.edge(EdgeId(10)).unwrap().weight, 2.5);

        graph.set_weighted(true);
        assert_eq!(graph.edge(EdgeId(10)).unwrap().weight, 2.5);
    }

    #[test]
    fn test_starting_nodes() {
        let mut graph = Graph::new(false, false);
        let mut start = node(1, "start");
        start.starting_node = true;
        graph.add_node(start).unwrap();
        graph.add_node(node(2, "other")).unwrap();

        let starting: Vec<NodeId> = graph.starting_nodes().map(|n| n.id).collect();
        assert_eq!(starting, vec![NodeId(1)]);
    }
}
