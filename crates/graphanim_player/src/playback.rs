// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback controller: single step, auto-play and rewind.
//!
//! Auto-play is a spawned interval task. The controller guarantees the
//! single-flight discipline the engine relies on: the engine sits behind an
//! async mutex, manual operations gate on the last known flags, and any
//! pending timer is aborted before a speed change, a reset or teardown, so a
//! stale tick can never mutate a graph that has since been replaced.

use crate::replay::ReplayEngine;
use crate::source::{SessionId, SourceError, SourceResult, StepSource};
use graphanim_graph::Graph;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No timer scheduled
    #[default]
    Paused,
    /// Auto-play timer running
    Playing,
    /// Fully executed with no further step
    Finished,
}

impl PlaybackState {
    /// Check if no timer is scheduled
    pub fn is_paused(&self) -> bool {
        matches!(self, PlaybackState::Paused)
    }

    /// Check if the auto-play timer is running
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }

    /// Check if the animation ran to its end
    pub fn is_finished(&self) -> bool {
        matches!(self, PlaybackState::Finished)
    }
}

/// Snapshot of playback published to observers.
///
/// This is the narrow interface an external UI watches for the finished
/// flag and for user-visible transport errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackStatus {
    /// Current playback state
    pub state: PlaybackState,
    /// Last known answer to "is a further step available?"
    pub has_next: bool,
    /// Message of the last transport failure, cleared by the next success
    pub error: Option<String>,
}

/// Drives the replay engine in three modes: user-triggered single steps,
/// timer-driven continuous auto-play and single-step rewind.
pub struct PlaybackController<S> {
    engine: Arc<Mutex<ReplayEngine<S>>>,
    source: Arc<S>,
    session: SessionId,
    graph: Arc<RwLock<Graph>>,
    speed: f32,
    timer: Option<JoinHandle<()>>,
    status: Arc<watch::Sender<PlaybackStatus>>,
}

impl<S: StepSource + 'static> PlaybackController<S> {
    /// Wrap a replay engine for playback
    pub fn new(engine: ReplayEngine<S>) -> Self {
        let session = engine.session();
        let source = engine.source_handle();
        let graph = engine.graph_handle();
        let (status, _) = watch::channel(PlaybackStatus {
            state: PlaybackState::Paused,
            has_next: engine.has_next(),
            error: None,
        });
        Self {
            engine: Arc::new(Mutex::new(engine)),
            source,
            session,
            graph,
            speed: 0.0,
            timer: None,
            status: Arc::new(status),
        }
    }

    /// Shared handle to the graph for read-side observers (the renderer)
    pub fn graph_handle(&self) -> Arc<RwLock<Graph>> {
        Arc::clone(&self.graph)
    }

    /// Watch playback status changes
    pub fn subscribe(&self) -> watch::Receiver<PlaybackStatus> {
        self.status.subscribe()
    }

    /// Last requested auto-play speed, in steps per second
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Ready the session for stepping. Call once before playback.
    pub async fn start(&self) -> SourceResult<()> {
        self.engine.lock().await.start_execution().await
    }

    /// Apply one forward step.
    ///
    /// Gated on the last known has-next flag, so a request is never
    /// dispatched past the end of the animation.
    pub async fn step(&self) -> SourceResult<()> {
        let mut engine = self.engine.lock().await;
        if !engine.has_next() {
            return Ok(());
        }
        let result = engine.execute_step().await;
        drop(engine);
        match &result {
            Ok(has_next) => {
                let has_next = *has_next;
                self.status.send_modify(|status| {
                    status.has_next = has_next;
                    status.error = None;
                });
            }
            Err(error) => self.publish_error(error),
        }
        result.map(|_| ())
    }

    /// Manual step-or-restart: at the end of a fully executed run a skip
    /// restarts the animation instead of stepping.
    pub async fn skip(&mut self) -> SourceResult<()> {
        let executed = self.source.is_executed(self.session).await?;
        let has_next = self.engine.lock().await.has_next();
        if executed && !has_next {
            return self.reset().await;
        }
        self.step().await
    }

    /// Rewind exactly one step. No-op when no step has been applied.
    pub async fn back(&self) -> SourceResult<()> {
        let mut engine = self.engine.lock().await;
        let result = engine.step_back().await;
        let has_next = engine.has_next();
        drop(engine);
        match &result {
            Ok(()) => {
                self.status.send_modify(|status| {
                    status.has_next = has_next;
                    status.error = None;
                });
            }
            Err(error) => self.publish_error(error),
        }
        result
    }

    /// Reset to the pristine graph.
    ///
    /// Cancels any pending timer before anything else runs and pauses
    /// playback.
    pub async fn reset(&mut self) -> SourceResult<()> {
        self.cancel_timer();
        self.speed = 0.0;
        let result = self.engine.lock().await.reset().await;
        match &result {
            Ok(()) => {
                self.status.send_modify(|status| {
                    status.state = PlaybackState::Paused;
                    status.has_next = true;
                    status.error = None;
                });
            }
            Err(error) => self.publish_error(error),
        }
        result
    }

    /// Change the auto-play speed, in steps per second.
    ///
    /// The pending timer is cancelled before anything else runs. A speed of
    /// zero (or less) pauses playback: no timer is scheduled until the next
    /// change. A positive speed schedules a fresh timer; if the animation had
    /// finished, the new timer restarts it from the pristine graph first.
    pub fn set_speed(&mut self, steps_per_second: f32) {
        self.cancel_timer();
        self.speed = steps_per_second;
        if steps_per_second <= 0.0 {
            self.status.send_modify(|status| {
                if status.state.is_playing() {
                    status.state = PlaybackState::Paused;
                }
            });
            tracing::info!("auto-play paused");
            return;
        }

        let period = Duration::from_secs_f32(1.0 / steps_per_second);
        let restart = self.status.borrow().state.is_finished();
        self.status
            .send_modify(|status| status.state = PlaybackState::Playing);
        tracing::info!("auto-play running at {steps_per_second} steps/s");
        self.timer = Some(tokio::spawn(auto_play(
            Arc::clone(&self.engine),
            Arc::clone(&self.source),
            self.session,
            Arc::clone(&self.status),
            period,
            restart,
        )));
    }

    fn publish_error(&self, error: &SourceError) {
        let message = error.to_string();
        self.status
            .send_modify(|status| status.error = Some(message));
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            // aborting at an await point discards an outstanding fetch
            // without mutating the graph
            timer.abort();
        }
    }
}

impl<S> Drop for PlaybackController<S> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Timer-driven auto-play loop.
///
/// Each tick polls the server execution status; "fully executed" together
/// with "no next step" stops the timer and marks the animation finished,
/// anything else applies one step. A transport failure halts auto-play and
/// surfaces the message.
async fn auto_play<S: StepSource + 'static>(
    engine: Arc<Mutex<ReplayEngine<S>>>,
    source: Arc<S>,
    session: SessionId,
    status: Arc<watch::Sender<PlaybackStatus>>,
    period: Duration,
    restart: bool,
) {
    // a finished animation restarts from the pristine graph
    if restart {
        let mut engine = engine.lock().await;
        if let Err(error) = engine.reset().await {
            halt(&status, &error);
            return;
        }
        status.send_modify(|status| {
            status.state = PlaybackState::Playing;
            status.has_next = true;
            status.error = None;
        });
    }

    // the has-next flag may be stale after manual interaction
    {
        let mut engine = engine.lock().await;
        match engine.refresh_has_next().await {
            Ok(has_next) => {
                status.send_modify(|status| status.has_next = has_next);
            }
            Err(error) => {
                halt(&status, &error);
                return;
            }
        }
    }

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first interval tick fires immediately; consume it so the first
    // step lands one period after the speed change
    interval.tick().await;

    loop {
        interval.tick().await;

        let executed = match source.is_executed(session).await {
            Ok(executed) => executed,
            Err(error) => {
                halt(&status, &error);
                return;
            }
        };

        let mut engine = engine.lock().await;
        if executed && !engine.has_next() {
            status.send_modify(|status| {
                status.state = PlaybackState::Finished;
                status.has_next = false;
            });
            tracing::info!("animation finished");
            return;
        }
        match engine.execute_step().await {
            Ok(has_next) => {
                status.send_modify(|status| {
                    status.has_next = has_next;
                    status.error = None;
                });
            }
            Err(error) => {
                drop(engine);
                halt(&status, &error);
                return;
            }
        }
    }
}

fn halt(status: &watch::Sender<PlaybackStatus>, error: &SourceError) {
    tracing::warn!("auto-play halted: {error}");
    let message = error.to_string();
    status.send_modify(|status| {
        status.state = PlaybackState::Paused;
        status.error = Some(message);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ScriptedSource;
    use crate::step::{ModificationStep, NodeAttributeChange, NodeChange};
    use graphanim_graph::{GraphRecord, NodeId, NodeRecord};

    const SESSION: SessionId = SessionId(3);

    /// One node labeled "0"
    fn pristine() -> GraphRecord {
        GraphRecord {
            nodes: vec![NodeRecord {
                id: NodeId(1),
                coordinates: [0.5, 0.5],
                label: "0".to_string(),
                starting_node: true,
                color_hexadecimal: "#000000".to_string(),
            }],
            edges: Vec::new(),
            weighted: false,
            directed: false,
        }
    }

    /// Steps that relabel node 1 from "i-1" to "i", acting as a step counter
    fn counter_steps(count: usize) -> Vec<ModificationStep> {
        (1..=count)
            .map(|i| ModificationStep {
                node_changes: vec![NodeChange {
                    node_id: NodeId(1),
                    changes: vec![NodeAttributeChange::label(
                        (i - 1).to_string(),
                        i.to_string(),
                    )],
                }],
                ..ModificationStep::default()
            })
            .collect()
    }

    async fn controller_with(
        steps: Vec<ModificationStep>,
    ) -> (PlaybackController<ScriptedSource>, Arc<ScriptedSource>) {
        let source = Arc::new(ScriptedSource::new(pristine(), steps));
        let engine = ReplayEngine::new(Arc::clone(&source), SESSION, pristine().into_graph());
        let controller = PlaybackController::new(engine);
        controller.start().await.unwrap();
        (controller, source)
    }

    fn label(controller: &PlaybackController<ScriptedSource>) -> String {
        controller
            .graph_handle()
            .read()
            .node(NodeId(1))
            .unwrap()
            .label
            .clone()
    }

    #[tokio::test]
    async fn test_manual_step_and_back() {
        let (controller, _) = controller_with(counter_steps(2)).await;

        controller.step().await.unwrap();
        assert_eq!(label(&controller), "1");

        controller.back().await.unwrap();
        assert_eq!(label(&controller), "0");
        assert!(controller.subscribe().borrow().has_next);
    }

    #[tokio::test]
    async fn test_back_at_start_is_a_no_op() {
        let (controller, _) = controller_with(counter_steps(1)).await;
        controller.back().await.unwrap();
        assert_eq!(label(&controller), "0");
    }

    #[tokio::test]
    async fn test_manual_step_past_end_is_gated() {
        let (controller, source) = controller_with(counter_steps(1)).await;
        controller.step().await.unwrap();
        assert_eq!(source.position(), 1);

        controller.step().await.unwrap();
        assert_eq!(source.position(), 1);
        assert_eq!(label(&controller), "1");
    }

    #[tokio::test]
    async fn test_skip_at_end_resets_instead_of_stepping() {
        let (mut controller, _) = controller_with(counter_steps(1)).await;
        controller.step().await.unwrap();
        assert!(!controller.subscribe().borrow().has_next);

        controller.skip().await.unwrap();
        assert_eq!(label(&controller), "0");
        let status = controller.subscribe().borrow().clone();
        assert!(status.has_next);
        assert!(status.state.is_paused());
    }

    #[tokio::test]
    async fn test_skip_before_end_steps() {
        let (mut controller, _) = controller_with(counter_steps(2)).await;
        controller.skip().await.unwrap();
        assert_eq!(label(&controller), "1");
    }

    #[tokio::test]
    async fn test_skip_does_not_reset_while_server_still_executing() {
        let (mut controller, source) = controller_with(counter_steps(1)).await;
        controller.step().await.unwrap();
        source.set_executed(false);

        // not a reset: the run is still producing steps server-side
        controller.skip().await.unwrap();
        assert_eq!(label(&controller), "1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_play_runs_to_finish() {
        let (mut controller, _) = controller_with(counter_steps(3)).await;
        let mut status = controller.subscribe();

        controller.set_speed(4.0);
        status
            .wait_for(|status| status.state.is_finished())
            .await
            .unwrap();
        assert_eq!(label(&controller), "3");
        assert!(!status.borrow().has_next);

        // the timer is gone: nothing moves anymore
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(label(&controller), "3");
        assert!(status.borrow().state.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_speed_zero_cancels_pending_timer() {
        let (mut controller, _) = controller_with(counter_steps(50)).await;

        controller.set_speed(4.0);
        tokio::time::sleep(Duration::from_secs(1)).await;
        controller.set_speed(0.0);

        let at_pause = label(&controller);
        assert_ne!(at_pause, "0");

        // no timer is scheduled: the graph stays put indefinitely
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(label(&controller), at_pause);
        assert!(controller.subscribe().borrow().state.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn test_speed_change_reschedules_timer() {
        let (mut controller, _) = controller_with(counter_steps(50)).await;

        controller.set_speed(1.0);
        tokio::time::sleep(Duration::from_secs(2)).await;
        let slow = label(&controller).parse::<usize>().unwrap();

        controller.set_speed(10.0);
        tokio::time::sleep(Duration::from_secs(2)).await;
        let fast = label(&controller).parse::<usize>().unwrap();
        assert!(fast - slow > 2, "expected faster stepping, got {slow} -> {fast}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_speed_after_finish_restarts() {
        let (mut controller, _) = controller_with(counter_steps(2)).await;
        let mut status = controller.subscribe();

        controller.set_speed(10.0);
        status
            .wait_for(|status| status.state.is_finished())
            .await
            .unwrap();

        controller.set_speed(10.0);
        // only a reset makes a further step available again
        status
            .wait_for(|status| status.state.is_playing() && status.has_next)
            .await
            .unwrap();
        status
            .wait_for(|status| status.state.is_finished())
            .await
            .unwrap();
        assert_eq!(label(&controller), "2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_halts_auto_play() {
        let (mut controller, source) = controller_with(counter_steps(10)).await;
        let mut status = controller.subscribe();

        controller.set_speed(4.0);
        tokio::time::sleep(Duration::from_secs(1)).await;
        source.set_failing(true);

        let failed = status
            .wait_for(|status| status.error.is_some())
            .await
            .unwrap()
            .clone();
        assert!(failed.state.is_paused());
        assert!(failed.error.unwrap().contains("transport"));

        // auto-play halted: no further steps even after the source recovers
        source.set_failing(false);
        let at_halt = label(&controller);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(label(&controller), at_halt);
    }
}
