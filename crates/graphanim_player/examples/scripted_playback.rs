// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scripted playback demo: replays a small breadth-first traversal.
//!
//! A `ScriptedSource` stands in for the network backend, serving a
//! four-node graph and a precomputed step list. The controller auto-plays
//! the animation to the end, then rewinds it step by step.

use graphanim_graph::{EdgeId, EdgeRecord, GraphRecord, NodeId, NodeRecord};
use graphanim_player::{
    EdgeAttributeChange, EdgeChange, ModificationStep, NodeAttributeChange, NodeChange,
    PlaybackController, ReplayEngine, ScriptedSource, SessionId,
};
use std::sync::Arc;

const UNVISITED: &str = "#000000";
const VISITED: &str = "#2e7d32";

fn node(id: i64, label: &str, x: f32, y: f32, starting: bool) -> NodeRecord {
    NodeRecord {
        id: NodeId(id),
        coordinates: [x, y],
        label: label.to_string(),
        starting_node: starting,
        color_hexadecimal: UNVISITED.to_string(),
    }
}

fn edge(id: i64, source: i64, target: i64) -> EdgeRecord {
    EdgeRecord {
        id: EdgeId(id),
        source_id: NodeId(source),
        target_id: NodeId(target),
        weight: 1.0,
        color_hexadecimal: UNVISITED.to_string(),
    }
}

/// Visit one node and color the edge that discovered it
fn visit(node_id: i64, via_edge: Option<i64>) -> ModificationStep {
    ModificationStep {
        node_changes: vec![NodeChange {
            node_id: NodeId(node_id),
            changes: vec![NodeAttributeChange::color(UNVISITED, VISITED)],
        }],
        edge_changes: via_edge
            .map(|edge_id| EdgeChange {
                edge_id: EdgeId(edge_id),
                changes: vec![EdgeAttributeChange::color(UNVISITED, VISITED)],
            })
            .into_iter()
            .collect(),
        ..ModificationStep::default()
    }
}

fn print_graph(graph: &graphanim_graph::Graph) {
    for node in graph.nodes() {
        println!(
            "  node {:>2} [{}] {}",
            node.id.0,
            node.color,
            if node.starting_node { "(start)" } else { "" }
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // diamond graph: 1 -> {2, 3} -> 4, traversed breadth-first from node 1
    let pristine = GraphRecord {
        nodes: vec![
            node(1, "A", 0.5, 0.1, true),
            node(2, "B", 0.2, 0.5, false),
            node(3, "C", 0.8, 0.5, false),
            node(4, "D", 0.5, 0.9, false),
        ],
        edges: vec![edge(10, 1, 2), edge(11, 1, 3), edge(12, 2, 4), edge(13, 3, 4)],
        weighted: false,
        directed: true,
    };
    let steps = vec![
        visit(1, None),
        visit(2, Some(10)),
        visit(3, Some(11)),
        visit(4, Some(12)),
    ];

    let source = Arc::new(ScriptedSource::new(pristine.clone(), steps));
    let engine = ReplayEngine::new(Arc::clone(&source), SessionId(1), pristine.into_graph());
    let graph = engine.graph_handle();
    let mut controller = PlaybackController::new(engine);
    controller.start().await?;

    println!("pristine graph:");
    print_graph(&graph.read());

    let mut status = controller.subscribe();
    controller.set_speed(8.0);
    status.wait_for(|status| status.state.is_finished()).await?;

    println!("after auto-play:");
    print_graph(&graph.read());

    controller.back().await?;
    controller.back().await?;
    println!("after rewinding two steps:");
    print_graph(&graph.read());

    Ok(())
}
