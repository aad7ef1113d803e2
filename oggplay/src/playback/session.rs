//! Playback session lifecycle
//!
//! A [`PlaybackSession`] owns a built pipeline and its event subscription.
//! It steps the graph up to Playing, runs the event loop, and always returns
//! the graph to Null before releasing it, whether the session ends normally,
//! with an error, or by being dropped.

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::playback::builder::{GraphBuilder, PlaybackPipeline};
use crate::playback::bus_loop::{self, DrainOutcome};
use crate::playback::events::SessionEvent;
use crate::playback::linker::Discovery;
use crate::playback::state::LifecycleState;
use crate::runtime::{Graph, MediaRuntime};
use futures::{FutureExt, StreamExt};
use std::future::Future;
use std::path::Path;
use tracing::{debug, info, warn};

type Events<R> = <<R as MediaRuntime>::Graph as Graph>::Events;

/// One playback run over a built pipeline
pub struct PlaybackSession<R: MediaRuntime> {
    // Declared before `pipeline`: the subscription is released first
    events: Option<Events<R>>,
    pipeline: PlaybackPipeline<R>,
    state: LifecycleState,
    /// A transition was requested since the graph was last confirmed in
    /// Null; a failed transition can leave stages above Null
    dirty: bool,
}

impl<R: MediaRuntime> PlaybackSession<R> {
    /// Take ownership of `pipeline` and subscribe to its events
    pub fn new(pipeline: PlaybackPipeline<R>) -> Result<Self> {
        let events = pipeline.graph().subscribe()?;
        Ok(Self {
            events: Some(events),
            pipeline,
            state: LifecycleState::Null,
            dirty: false,
        })
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn pipeline(&self) -> &PlaybackPipeline<R> {
        &self.pipeline
    }

    /// Step the graph through every intermediate state up to Playing.
    ///
    /// On failure the graph is returned to Null and the reason is taken from
    /// the error event the runtime posted, when there is one.
    pub fn start(&mut self) -> Result<()> {
        for step in self.state.path_to(LifecycleState::Playing) {
            self.dirty = true;
            if let Err(e) = self.pipeline.graph().set_state(step) {
                let reason = self.pending_error().unwrap_or_else(|| e.to_string());
                debug!("Unable to set the pipeline to the {} state: {}", step, reason);
                if let Err(stop_err) = self.stop() {
                    warn!("Failed to return pipeline to null: {}", stop_err);
                }
                return Err(Error::StartupFailure {
                    state: step,
                    reason,
                });
            }
            self.state = step;
        }
        Ok(())
    }

    /// First error message already queued on the subscription
    fn pending_error(&mut self) -> Option<String> {
        let events = self.events.as_mut()?;
        while let Some(Some(event)) = events.next().now_or_never() {
            if let SessionEvent::Error { source, message, .. } = event {
                return Some(match source {
                    Some(stage) => format!("{} ({})", message, stage),
                    None => message,
                });
            }
        }
        None
    }

    /// Run the event loop until end-of-stream, an error, or `shutdown`
    pub async fn run<F>(&mut self, shutdown: F) -> Result<DrainOutcome>
    where
        F: Future<Output = ()>,
    {
        if self.state != LifecycleState::Playing {
            return Err(Error::InvalidState(format!(
                "cannot run a session in the {} state",
                self.state
            )));
        }
        let events = self
            .events
            .as_mut()
            .ok_or_else(|| Error::InvalidState("event subscription already released".to_string()))?;

        info!("Running...");
        Ok(bus_loop::drain(events, shutdown).await)
    }

    /// Return the graph to Null.
    ///
    /// A no-op only when no transition was requested since the graph was
    /// last in Null, including one that failed part way.
    pub fn stop(&mut self) -> Result<()> {
        if self.state == LifecycleState::Null && !self.dirty {
            return Ok(());
        }
        self.pipeline.graph().set_state(LifecycleState::Null)?;
        self.state = LifecycleState::Null;
        self.dirty = false;
        Ok(())
    }

    /// Stop, then release the subscription and the graph
    pub fn teardown(mut self) -> Result<()> {
        info!("Returned, stopping playback");
        let result = self.stop();
        info!("Deleting pipeline");
        self.events.take();
        result
    }
}

impl<R: MediaRuntime> Drop for PlaybackSession<R> {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to stop pipeline while dropping session: {}", e);
        }
        self.events.take();
    }
}

/// Summary of a completed playback
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    /// `EndOfStream` or `Interrupted`; failures are returned as errors
    pub outcome: DrainOutcome,
    pub discoveries: Vec<Discovery>,
    /// Branches whose decoder never received a stream
    pub unlinked_branches: Vec<String>,
}

/// Build, start, run and tear down one playback of `location`.
///
/// A fatal runtime error is returned as [`Error::Runtime`] after the graph
/// has been stopped and released.
pub async fn play<R, F>(
    runtime: &R,
    config: &PipelineConfig,
    location: &Path,
    shutdown: F,
) -> Result<SessionReport>
where
    R: MediaRuntime,
    F: Future<Output = ()>,
{
    let pipeline = GraphBuilder::new(runtime, config).build(location)?;
    let mut session = PlaybackSession::new(pipeline)?;

    info!("Now playing: {}", location.display());
    session.start()?;

    let outcome = session.run(shutdown).await;
    let discoveries = session.pipeline().linker().discoveries();
    let unlinked_branches = session.pipeline().linker().unlinked_branches();
    for branch in &unlinked_branches {
        warn!("The {} branch never received a stream", branch);
    }

    let teardown = session.teardown();
    let outcome = outcome?;
    teardown?;

    match outcome {
        DrainOutcome::Failed { source, message } => Err(Error::Runtime {
            source_stage: source,
            message,
        }),
        outcome => Ok(SessionReport {
            outcome,
            discoveries,
            unlinked_branches,
        }),
    }
}
