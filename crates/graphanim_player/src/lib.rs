// SPDX-License-Identifier: MIT OR Apache-2.0
//! Step replay for GraphAnim.
//!
//! This crate keeps a client-side graph synchronized with a server-driven
//! animation timeline:
//! - The diff model describes one algorithm step as three ordered change
//!   lists carrying paired new/old values
//! - The replay engine applies a diff forward and can apply its exact
//!   inverse to rewind, one operation in flight at a time
//! - The playback controller orchestrates stepping, auto-play and rewind
//!   against an abstract, network-backed step source
//!
//! ## Architecture
//!
//! The engine owns the shared graph; everything else observes it through a
//! read handle or the status watch channel. Diffs are fetched on demand and
//! kept only long enough to apply once, so the source's cursor is the only
//! step history.

pub mod playback;
pub mod replay;
pub mod source;
pub mod step;

pub use playback::{PlaybackController, PlaybackState, PlaybackStatus};
pub use replay::{ReplayEngine, ReplayState};
pub use source::{ScriptedSource, SessionId, SourceError, SourceResult, StepSource};
pub use step::{
    EdgeAttributeChange, EdgeChange, ModificationStep, NodeAttributeChange, NodeChange,
    StructuralChange,
};
