// SPDX-License-Identifier: MIT OR Apache-2.0
//! Step replay engine: forward application and exact undo of diffs.
//!
//! The engine owns the shared graph and is its only legitimate mutator
//! during playback. Forward application and undo are two mirrored
//! three-phase walks over one diff schema, so their symmetry is directly
//! testable: applying a diff and then reverting it restores the graph
//! bit for bit.

use crate::source::{SessionId, SourceResult, StepSource};
use crate::step::{EdgeChange, ModificationStep, NodeChange, StructuralChange};
use graphanim_graph::Graph;
use parking_lot::RwLock;
use std::sync::Arc;

/// Replay lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayState {
    /// No execution session has been started
    #[default]
    Idle,
    /// Execution started; no step outcome known yet
    Executing,
    /// The last operation left a further step available
    StepAvailable,
    /// The last applied step reported no further step
    Exhausted,
}

impl ReplayState {
    /// Check if execution has not started
    pub fn is_idle(&self) -> bool {
        matches!(self, ReplayState::Idle)
    }

    /// Check if no further forward step exists
    pub fn is_exhausted(&self) -> bool {
        matches!(self, ReplayState::Exhausted)
    }
}

/// Applies diffs from a step source to the shared graph, forward or inverse.
///
/// Every method takes `&mut self`, so a single engine can never have two
/// replay operations in flight; cross-task use goes through an async mutex
/// (see the playback controller).
pub struct ReplayEngine<S> {
    source: Arc<S>,
    session: SessionId,
    graph: Arc<RwLock<Graph>>,
    state: ReplayState,
    steps_applied: usize,
    has_next: bool,
}

impl<S: StepSource> ReplayEngine<S> {
    /// Create an engine over the given source, session and starting graph
    pub fn new(source: Arc<S>, session: SessionId, graph: Graph) -> Self {
        Self {
            source,
            session,
            graph: Arc::new(RwLock::new(graph)),
            state: ReplayState::Idle,
            steps_applied: 0,
            has_next: true,
        }
    }

    /// Shared handle to the graph for read-side observers (the renderer).
    ///
    /// Observers must re-resolve entities by id on each access and never
    /// hold the lock or a cached reference across a suspension point.
    pub fn graph_handle(&self) -> Arc<RwLock<Graph>> {
        Arc::clone(&self.graph)
    }

    /// Shared handle to the step source, for callers that poll execution
    /// status without going through the engine
    pub fn source_handle(&self) -> Arc<S> {
        Arc::clone(&self.source)
    }

    /// Current lifecycle state
    pub fn state(&self) -> ReplayState {
        self.state
    }

    /// Last known answer to "is a further step available?"
    pub fn has_next(&self) -> bool {
        self.has_next
    }

    /// Number of steps currently applied (the playback position)
    pub fn steps_applied(&self) -> usize {
        self.steps_applied
    }

    /// The session this engine is bound to
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Signal the step source that the session is ready to produce steps.
    /// Does not mutate the graph.
    pub async fn start_execution(&mut self) -> SourceResult<()> {
        self.source.start_execution(self.session).await?;
        self.state = ReplayState::Executing;
        self.has_next = true;
        tracing::info!("execution started for session {:?}", self.session);
        Ok(())
    }

    /// Fetch the next diff, apply it forward and report whether a further
    /// step exists.
    ///
    /// Returns `false` without contacting the source when the animation is
    /// already exhausted, so a step can never be dispatched past the end.
    pub async fn execute_step(&mut self) -> SourceResult<bool> {
        if !self.has_next {
            return Ok(false);
        }
        let step = self.source.next_step(self.session).await?;
        {
            let mut graph = self.graph.write();
            apply_step(&mut graph, &step);
        }
        self.steps_applied += 1;
        let has_next = self.source.has_next(self.session).await?;
        self.has_next = has_next;
        self.state = if has_next {
            ReplayState::StepAvailable
        } else {
            ReplayState::Exhausted
        };
        tracing::debug!(
            "applied step {} (further step available: {has_next})",
            self.steps_applied
        );
        Ok(has_next)
    }

    /// Fetch the diff that produced the current position and apply its exact
    /// inverse.
    ///
    /// No-op when no step has been applied: the engine never rewinds past
    /// the initial graph.
    pub async fn step_back(&mut self) -> SourceResult<()> {
        if self.steps_applied == 0 {
            return Ok(());
        }
        let step = self.source.last_step(self.session).await?;
        {
            let mut graph = self.graph.write();
            revert_step(&mut graph, &step);
        }
        self.steps_applied -= 1;
        // the step just undone is available again
        self.has_next = true;
        self.state = ReplayState::StepAvailable;
        tracing::debug!("reverted to step {}", self.steps_applied);
        Ok(())
    }

    /// Re-query the source for step availability.
    ///
    /// Used before auto-play starts; the flag may be stale after manual
    /// interaction.
    pub async fn refresh_has_next(&mut self) -> SourceResult<bool> {
        self.has_next = self.source.has_next(self.session).await?;
        Ok(self.has_next)
    }

    /// Discard all applied diffs by fetching the pristine graph and
    /// replacing the store's content wholesale.
    pub async fn reset(&mut self) -> SourceResult<()> {
        let record = self.source.pristine_graph(self.session).await?;
        *self.graph.write() = record.into_graph();
        self.steps_applied = 0;
        self.has_next = true;
        self.state = ReplayState::Executing;
        tracing::info!("animation reset to pristine graph");
        Ok(())
    }
}

/// Forward application: structural changes first (so attribute changes can
/// assume referenced entities exist), then node attribute changes, then edge
/// attribute changes, each list in order.
fn apply_step(graph: &mut Graph, step: &ModificationStep) {
    for change in &step.graph_changes {
        apply_structural(graph, change);
    }
    for change in &step.node_changes {
        apply_node_change(graph, change);
    }
    for change in &step.edge_changes {
        apply_edge_change(graph, change);
    }
}

/// Exact inverse of [`apply_step`]: phases in reverse order, each list
/// walked in reverse, `old*` values written.
fn revert_step(graph: &mut Graph, step: &ModificationStep) {
    for change in step.edge_changes.iter().rev() {
        revert_edge_change(graph, change);
    }
    for change in step.node_changes.iter().rev() {
        revert_node_change(graph, change);
    }
    for change in step.graph_changes.iter().rev() {
        revert_structural(graph, change);
    }
}

fn apply_structural(graph: &mut Graph, change: &StructuralChange) {
    if let Some(node) = &change.node {
        if change.delete {
            // the cascade list rides along for undo only; node removal
            // already cascades to touching edges
            if graph.remove_node(node.id).is_none() {
                tracing::debug!("node {:?} already absent, skipping removal", node.id);
            }
        } else if graph.add_node(node.clone().into()).is_err() {
            tracing::debug!("node {:?} already present, skipping insertion", node.id);
        }
    } else if let Some(edge) = &change.edge {
        if change.delete {
            if graph.remove_edge(edge.id).is_none() {
                tracing::debug!("edge {:?} already absent, skipping removal", edge.id);
            }
        } else if !graph.add_edge(edge.clone().into()) {
            tracing::debug!("edge {:?} discarded, skipping insertion", edge.id);
        }
    }
}

fn revert_structural(graph: &mut Graph, change: &StructuralChange) {
    if let Some(node) = &change.node {
        if change.delete {
            // node was deleted, so add it again together with its cascade
            if graph.add_node(node.clone().into()).is_err() {
                tracing::debug!("node {:?} already present, skipping re-insertion", node.id);
            }
            for edge in &change.removed_edges {
                graph.add_edge(edge.clone().into());
            }
        } else {
            // node was added, so remove it again
            graph.remove_node(node.id);
        }
    } else if let Some(edge) = &change.edge {
        if change.delete {
            // edge was deleted, so add it again
            graph.add_edge(edge.clone().into());
        } else {
            // edge was added, so remove it again
            graph.remove_edge(edge.id);
        }
    }
}

fn apply_node_change(graph: &mut Graph, change: &NodeChange) {
    let Some(node) = graph.node_mut(change.node_id) else {
        tracing::debug!("node {:?} not found, skipping attribute changes", change.node_id);
        return;
    };
    for delta in &change.changes {
        if let Some(label) = &delta.new_label {
            node.label = label.clone();
        }
        if let Some(color) = &delta.new_color {
            node.color = color.clone();
        }
        if let Some(coordinates) = delta.new_coordinates {
            node.coordinates = coordinates;
        }
    }
}

fn revert_node_change(graph: &mut Graph, change: &NodeChange) {
    let Some(node) = graph.node_mut(change.node_id) else {
        tracing::debug!("node {:?} not found, skipping attribute undo", change.node_id);
        return;
    };
    for delta in change.changes.iter().rev() {
        if let Some(label) = &delta.old_label {
            node.label = label.clone();
        }
        if let Some(color) = &delta.old_color {
            node.color = color.clone();
        }
        if let Some(coordinates) = delta.old_coordinates {
            node.coordinates = coordinates;
        }
    }
}

fn apply_edge_change(graph: &mut Graph, change: &EdgeChange) {
    let Some(edge) = graph.edge_mut(change.edge_id) else {
        tracing::debug!("edge {:?} not found, skipping attribute changes", change.edge_id);
        return;
    };
    for delta in &change.changes {
        if let Some(color) = &delta.new_color {
            edge.color = color.clone();
        }
    }
}

fn revert_edge_change(graph: &mut Graph, change: &EdgeChange) {
    let Some(edge) = graph.edge_mut(change.edge_id) else {
        tracing::debug!("edge {:?} not found, skipping attribute undo", change.edge_id);
        return;
    };
    for delta in change.changes.iter().rev() {
        if let Some(color) = &delta.old_color {
            edge.color = color.clone();
        }
    }
}
