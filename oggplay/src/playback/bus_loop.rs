//! Session event loop
//!
//! Consumes the session events of a running graph until one of them ends the
//! session or the caller's shutdown future completes.

use crate::playback::events::SessionEvent;
use futures::{Stream, StreamExt};
use std::future::Future;
use std::ops::ControlFlow;
use tracing::{debug, info, trace, warn};

/// Why the event loop returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every branch finished its stream
    EndOfStream,
    /// A stage reported a fatal error
    Failed {
        source: Option<String>,
        message: String,
    },
    /// The shutdown future completed first
    Interrupted,
}

/// Decide what a single event means for the session
pub fn dispatch(event: &SessionEvent) -> ControlFlow<DrainOutcome> {
    match event {
        SessionEvent::EndOfStream => {
            info!("End of stream");
            ControlFlow::Break(DrainOutcome::EndOfStream)
        }
        SessionEvent::Error {
            source,
            message,
            debug,
        } => {
            // Reported once by the caller from the returned outcome
            debug!("{}", event);
            if let Some(details) = debug {
                debug!("Debugging information: {}", details);
            }
            ControlFlow::Break(DrainOutcome::Failed {
                source: source.clone(),
                message: message.clone(),
            })
        }
        SessionEvent::Warning { .. } => {
            warn!("{}", event);
            ControlFlow::Continue(())
        }
        SessionEvent::StateChanged { .. } => {
            debug!("{}", event);
            ControlFlow::Continue(())
        }
        SessionEvent::Other(kind) => {
            trace!("Ignoring {} event", kind);
            ControlFlow::Continue(())
        }
    }
}

/// Consume `events` until end-of-stream, an error, or `shutdown`.
///
/// Events already queued win over a shutdown that becomes ready at the same
/// time. A stream that ends without a terminal event counts as a failure.
pub async fn drain<E, F>(events: &mut E, shutdown: F) -> DrainOutcome
where
    E: Stream<Item = SessionEvent> + Unpin,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            event = events.next() => match event {
                Some(event) => {
                    if let ControlFlow::Break(outcome) = dispatch(&event) {
                        return outcome;
                    }
                }
                None => {
                    debug!("Session event channel closed before end of stream");
                    return DrainOutcome::Failed {
                        source: None,
                        message: "event channel closed".to_string(),
                    };
                }
            },
            _ = &mut shutdown => {
                info!("Interrupted, leaving the event loop");
                return DrainOutcome::Interrupted;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::state::LifecycleState;
    use futures::stream;

    fn error_event(source: &str, message: &str) -> SessionEvent {
        SessionEvent::Error {
            source: Some(source.to_string()),
            message: message.to_string(),
            debug: Some("details".to_string()),
        }
    }

    #[test]
    fn test_dispatch_decisions() {
        assert_eq!(
            dispatch(&SessionEvent::EndOfStream),
            ControlFlow::Break(DrainOutcome::EndOfStream)
        );
        assert_eq!(
            dispatch(&error_event("ogg-demuxer", "Internal data stream error.")),
            ControlFlow::Break(DrainOutcome::Failed {
                source: Some("ogg-demuxer".to_string()),
                message: "Internal data stream error.".to_string(),
            })
        );
        assert_eq!(
            dispatch(&SessionEvent::Warning {
                source: None,
                message: "late buffer".to_string()
            }),
            ControlFlow::Continue(())
        );
        assert_eq!(
            dispatch(&SessionEvent::StateChanged {
                from: LifecycleState::Paused,
                to: LifecycleState::Playing
            }),
            ControlFlow::Continue(())
        );
        assert_eq!(
            dispatch(&SessionEvent::Other("Tag".to_string())),
            ControlFlow::Continue(())
        );
    }

    #[tokio::test]
    async fn test_first_terminal_event_wins() {
        let mut events = stream::iter(vec![
            SessionEvent::Other("StreamStart".to_string()),
            SessionEvent::Warning {
                source: None,
                message: "w".to_string(),
            },
            error_event("vorbis-decoder", "decode failed"),
            SessionEvent::EndOfStream,
        ]);

        let outcome = drain(&mut events, std::future::pending()).await;
        assert_eq!(
            outcome,
            DrainOutcome::Failed {
                source: Some("vorbis-decoder".to_string()),
                message: "decode failed".to_string(),
            }
        );
        // The event after the terminal one is left in the stream
        assert_eq!(events.next().await, Some(SessionEvent::EndOfStream));
    }

    #[tokio::test]
    async fn test_closed_stream_is_a_failure() {
        let mut events = stream::iter(vec![SessionEvent::Other("Tag".to_string())]);
        let outcome = drain(&mut events, std::future::pending()).await;
        assert!(matches!(outcome, DrainOutcome::Failed { source: None, .. }));
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_pending_stream() {
        let mut events = stream::pending::<SessionEvent>();
        let outcome = drain(&mut events, async {}).await;
        assert_eq!(outcome, DrainOutcome::Interrupted);
    }

    #[tokio::test]
    async fn test_queued_end_of_stream_beats_shutdown() {
        let mut events = stream::iter(vec![SessionEvent::EndOfStream]);
        let outcome = drain(&mut events, async {}).await;
        assert_eq!(outcome, DrainOutcome::EndOfStream);
    }
}
