// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ambient edit-mode value for the graph editing UI.

/// The tool currently selected in the graph editor.
///
/// This is opaque UI state owned by the editing surface: nothing in the
/// store, the diff model or the replay engine reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphEditMode {
    /// Select and drag existing entities
    #[default]
    Select,
    /// Clicks create nodes
    AddNode,
    /// Clicks remove nodes
    RemoveNode,
    /// Clicks on two nodes create an edge
    AddEdge,
    /// Clicks remove edges
    RemoveEdge,
}
