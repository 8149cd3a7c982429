// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wire records for graphs crossing the session boundary.
//!
//! When a graph is sent to or received from the step source, nodes and edges
//! are flattened to plain records that reference each other by id; an edge
//! record carries `sourceId`/`targetId` rather than embedded node data. On
//! receipt the linked in-memory form is rebuilt by resolving those ids
//! against the node collection.

use crate::edge::{Edge, EdgeId};
use crate::graph::Graph;
use crate::node::{Node, NodeId};
use serde::{Deserialize, Serialize};

/// A node as it appears in API payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Node ID
    pub id: NodeId,
    /// Normalized position
    pub coordinates: [f32; 2],
    /// Display label
    pub label: String,
    /// Whether the algorithm starts at this node
    pub starting_node: bool,
    /// Fill color as `"#RRGGBB"`
    pub color_hexadecimal: String,
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id,
            coordinates: node.coordinates,
            label: node.label.clone(),
            starting_node: node.starting_node,
            color_hexadecimal: node.color.clone(),
        }
    }
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        Self {
            id: record.id,
            coordinates: record.coordinates,
            label: record.label,
            starting_node: record.starting_node,
            color: record.color_hexadecimal,
        }
    }
}

/// An edge as it appears in API payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    /// Edge ID
    pub id: EdgeId,
    /// Source node ID
    pub source_id: NodeId,
    /// Target node ID
    pub target_id: NodeId,
    /// Weight
    pub weight: f32,
    /// Stroke color as `"#RRGGBB"`
    pub color_hexadecimal: String,
}

impl From<&Edge> for EdgeRecord {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id,
            source_id: edge.source,
            target_id: edge.target,
            weight: edge.weight,
            color_hexadecimal: edge.color.clone(),
        }
    }
}

impl From<EdgeRecord> for Edge {
    fn from(record: EdgeRecord) -> Self {
        Self {
            id: record.id,
            source: record.source_id,
            target: record.target_id,
            weight: record.weight,
            color: record.color_hexadecimal,
        }
    }
}

/// A whole graph as it appears in API payloads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    /// Flattened nodes
    pub nodes: Vec<NodeRecord>,
    /// Flattened edges
    pub edges: Vec<EdgeRecord>,
    /// Whether edge weights are displayed
    pub weighted: bool,
    /// Whether edge direction is displayed
    pub directed: bool,
}

impl GraphRecord {
    /// Rebuild the in-memory graph from flattened records.
    ///
    /// Edge endpoints are resolved against the node collection; edges whose
    /// `sourceId` or `targetId` does not resolve are silently dropped, as
    /// are nodes repeating an already-seen id.
    pub fn into_graph(self) -> Graph {
        let mut graph = Graph::new(self.weighted, self.directed);
        for record in self.nodes {
            if let Err(error) = graph.add_node(record.into()) {
                tracing::debug!("dropping node from payload: {error}");
            }
        }
        for record in self.edges {
            // add_edge performs the endpoint-existence check
            graph.add_edge(record.into());
        }
        graph
    }
}

impl Graph {
    /// Flatten this graph for transmission across the session boundary
    pub fn to_record(&self) -> GraphRecord {
        GraphRecord {
            nodes: self.nodes().map(NodeRecord::from).collect(),
            edges: self.edges().map(EdgeRecord::from).collect(),
            weighted: self.is_weighted(),
            directed: self.is_directed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_record(id: i64, label: &str) -> NodeRecord {
        NodeRecord {
            id: NodeId(id),
            coordinates: [0.25, 0.75],
            label: label.to_string(),
            starting_node: false,
            color_hexadecimal: "#000000".to_string(),
        }
    }

    fn edge_record(id: i64, source: i64, target: i64) -> EdgeRecord {
        EdgeRecord {
            id: EdgeId(id),
            source_id: NodeId(source),
            target_id: NodeId(target),
            weight: 1.0,
            color_hexadecimal: "#000000".to_string(),
        }
    }

    #[test]
    fn test_wire_field_names_match_server_protocol() {
        let json = serde_json::to_value(edge_record(10, 1, 2)).unwrap();
        assert_eq!(json["sourceId"], 1);
        assert_eq!(json["targetId"], 2);
        assert_eq!(json["colorHexadecimal"], "#000000");

        let json = serde_json::to_value(node_record(1, "A")).unwrap();
        assert_eq!(json["startingNode"], false);
        assert_eq!(json["colorHexadecimal"], "#000000");
        assert_eq!(json["coordinates"], serde_json::json!([0.25, 0.75]));
    }

    #[test]
    fn test_parses_server_graph_payload() {
        let payload = r##"{
            "nodes": [
                {"id": 1, "coordinates": [0.1, 0.2], "label": "A", "startingNode": true, "colorHexadecimal": "#ffffff"},
                {"id": 2, "coordinates": [0.9, 0.4], "label": "B", "startingNode": false, "colorHexadecimal": "#000000"}
            ],
            "edges": [
                {"id": 10, "sourceId": 1, "targetId": 2, "weight": 3.5, "colorHexadecimal": "#ff0000"}
            ],
            "weighted": true,
            "directed": false
        }"##;
        let record: GraphRecord = serde_json::from_str(payload).unwrap();
        let graph = record.into_graph();

        assert!(graph.is_weighted());
        assert!(!graph.is_directed());
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge(EdgeId(10)).unwrap().weight, 3.5);
        assert!(graph.node(NodeId(1)).unwrap().starting_node);
    }

    #[test]
    fn test_round_trip_through_records() {
        let graph = GraphRecord {
            nodes: vec![node_record(1, "a"), node_record(2, "b")],
            edges: vec![edge_record(10, 1, 2)],
            weighted: true,
            directed: true,
        }
        .into_graph();

        let rebuilt = graph.to_record().into_graph();
        assert_eq!(graph, rebuilt);
    }

    #[test]
    fn test_into_graph_drops_dangling_edges() {
        let record = GraphRecord {
            nodes: vec![node_record(1, "a")],
            edges: vec![edge_record(10, 1, 99)],
            weighted: false,
            directed: false,
        };
        let graph = record.into_graph();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }
}
