// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data model for GraphAnim.
//!
//! This crate provides the in-memory graph an animation session mutates:
//! - Nodes and edges with session-unique integer ids
//! - A keyed store with dangling-reference protection and cascading removal
//! - Flattened wire records for the session boundary
//!
//! ## Architecture
//!
//! The [`Graph`] owns every [`Node`] and [`Edge`] record. All other layers
//! refer to entities by id and re-resolve them through the graph on each
//! access; an edge likewise names its endpoints by [`NodeId`], never by a
//! direct handle.

pub mod edge;
pub mod edit_mode;
pub mod external;
pub mod graph;
pub mod node;

pub use edge::{Edge, EdgeId};
pub use edit_mode::GraphEditMode;
pub use external::{EdgeRecord, GraphRecord, NodeRecord};
pub use graph::{Graph, GraphError};
pub use node::{fresh_id, Node, NodeId};
