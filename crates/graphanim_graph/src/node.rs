// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph model.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl NodeId {
    /// Create a fresh, session-unique node ID
    pub fn fresh() -> Self {
        Self(fresh_id())
    }
}

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Generate a session-unique integer ID.
///
/// Ids start from the current millisecond timestamp and are bumped past the
/// previously issued value, so they stay strictly increasing even for calls
/// landing in the same millisecond. Ids are never reused within a session.
pub fn fresh_id() -> i64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64;
    let prev = LAST_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(if now > last { now } else { last + 1 })
        })
        .unwrap_or(now);
    if now > prev {
        now
    } else {
        prev + 1
    }
}

/// A node in the graph
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Position relative to the viewport, both components normalized to `[0, 1]`
    pub coordinates: [f32; 2],
    /// Display label
    pub label: String,
    /// Whether the algorithm starts at this node. At most one node should
    /// carry the flag; callers clear the previous one before setting a new one.
    pub starting_node: bool,
    /// Fill color as `"#RRGGBB"`
    pub color: String,
}

impl Node {
    /// Create a new node
    pub fn new(
        id: NodeId,
        coordinates: [f32; 2],
        label: impl Into<String>,
        starting_node: bool,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id,
            coordinates,
            label: label.into(),
            starting_node,
            color: color.into(),
        }
    }

    /// Generate an unlabeled black node with a fresh ID at the given position
    pub fn generate(coordinates: [f32; 2]) -> Self {
        Self::new(NodeId::fresh(), coordinates, "", false, "#000000")
    }
}
