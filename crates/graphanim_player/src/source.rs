// SPDX-License-Identifier: MIT OR Apache-2.0
//! Step source abstraction: where animation diffs come from.
//!
//! The production source is a network backend owned by excluded
//! collaborators; this module defines the narrow interface the replay engine
//! consumes, plus an in-memory scripted implementation for tests and demos.

use crate::step::ModificationStep;
use graphanim_graph::GraphRecord;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Opaque handle of the server-side execution session a client is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub i64);

/// Errors surfaced by a step source.
///
/// These always indicate a communication failure, never a tolerated
/// staleness condition; the replay engine propagates them unchanged.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network failure before a response was received
    #[error("transport failure: {0}")]
    Transport(String),
    /// The server answered with a non-accepted status
    #[error("server rejected request ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Server-provided message
        message: String,
    },
    /// No step is available at the requested position
    #[error("no step available at the requested position")]
    StepUnavailable,
}

/// Result type for step source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// A server-driven producer of animation steps.
///
/// All operations are asynchronous and fallible. Callers issue at most one
/// request per session at a time; the source is not expected to tolerate
/// interleaved cursor movement. No operation is retried automatically.
pub trait StepSource: Send + Sync {
    /// Signal the server to start executing the algorithm for this session
    fn start_execution(&self, session: SessionId)
        -> impl Future<Output = SourceResult<()>> + Send;

    /// Fetch the diff for the next step, advancing the server-side cursor
    fn next_step(
        &self,
        session: SessionId,
    ) -> impl Future<Output = SourceResult<ModificationStep>> + Send;

    /// Fetch the diff that produced the current position, rewinding the
    /// server-side cursor
    fn last_step(
        &self,
        session: SessionId,
    ) -> impl Future<Output = SourceResult<ModificationStep>> + Send;

    /// Whether a further step is available
    fn has_next(&self, session: SessionId) -> impl Future<Output = SourceResult<bool>> + Send;

    /// Whether the server has fully executed the algorithm
    fn is_executed(&self, session: SessionId) -> impl Future<Output = SourceResult<bool>> + Send;

    /// Fetch the pristine (unmodified) graph, resetting the server-side
    /// cursor to the start
    fn pristine_graph(
        &self,
        session: SessionId,
    ) -> impl Future<Output = SourceResult<GraphRecord>> + Send;
}

/// In-memory step source: a pristine graph plus a precomputed step list.
///
/// Stands in for the network backend in tests and demos. The cursor mimics
/// the server-side session position: [`StepSource::next_step`] advances it,
/// [`StepSource::last_step`] rewinds it and [`StepSource::pristine_graph`]
/// resets it. A transport failure can be injected to exercise error paths.
pub struct ScriptedSource {
    pristine: GraphRecord,
    steps: Vec<ModificationStep>,
    cursor: Mutex<usize>,
    executed: AtomicBool,
    failing: AtomicBool,
}

impl ScriptedSource {
    /// Create a scripted source from a pristine graph and its step list
    pub fn new(pristine: GraphRecord, steps: Vec<ModificationStep>) -> Self {
        Self {
            pristine,
            steps,
            cursor: Mutex::new(0),
            executed: AtomicBool::new(true),
            failing: AtomicBool::new(false),
        }
    }

    /// Simulate a server still computing steps (`is_executed` reports `false`)
    pub fn set_executed(&self, executed: bool) {
        self.executed.store(executed, Ordering::SeqCst);
    }

    /// Make every subsequent request fail with a transport error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Current cursor position (number of steps served)
    pub fn position(&self) -> usize {
        *self.cursor.lock()
    }

    fn check_transport(&self) -> SourceResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::Transport("injected transport failure".to_string()));
        }
        Ok(())
    }
}

impl StepSource for ScriptedSource {
    async fn start_execution(&self, _session: SessionId) -> SourceResult<()> {
        self.check_transport()
    }

    async fn next_step(&self, _session: SessionId) -> SourceResult<ModificationStep> {
        self.check_transport()?;
        let mut cursor = self.cursor.lock();
        match self.steps.get(*cursor) {
            Some(step) => {
                *cursor += 1;
                Ok(step.clone())
            }
            None => Err(SourceError::StepUnavailable),
        }
    }

    async fn last_step(&self, _session: SessionId) -> SourceResult<ModificationStep> {
        self.check_transport()?;
        let mut cursor = self.cursor.lock();
        if *cursor == 0 {
            return Err(SourceError::StepUnavailable);
        }
        *cursor -= 1;
        self.steps.get(*cursor).cloned().ok_or(SourceError::StepUnavailable)
    }

    async fn has_next(&self, _session: SessionId) -> SourceResult<bool> {
        self.check_transport()?;
        Ok(*self.cursor.lock() < self.steps.len())
    }

    async fn is_executed(&self, _session: SessionId) -> SourceResult<bool> {
        self.check_transport()?;
        Ok(self.executed.load(Ordering::SeqCst))
    }

    async fn pristine_graph(&self, _session: SessionId) -> SourceResult<GraphRecord> {
        self.check_transport()?;
        *self.cursor.lock() = 0;
        Ok(self.pristine.clone())
    }
}
