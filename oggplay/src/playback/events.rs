//! Session events emitted by the running graph
//!
//! The media runtime translates its own bus messages into [`SessionEvent`]
//! values; the bus loop consumes each one exactly once.

use super::state::LifecycleState;

/// Asynchronous notification from the running graph
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Every sink has consumed its last buffer
    EndOfStream,

    /// Fatal error raised by a stage
    Error {
        /// Name of the stage that posted the error (if known)
        source: Option<String>,
        message: String,
        /// Additional debug detail from the runtime
        debug: Option<String>,
    },

    /// Non-fatal problem, e.g. a discovered stream that could not be linked
    Warning {
        source: Option<String>,
        message: String,
    },

    /// Graph-level lifecycle transition completed
    StateChanged {
        from: LifecycleState,
        to: LifecycleState,
    },

    /// Any other runtime message, by type name
    Other(String),
}

impl SessionEvent {
    /// Whether this event ends the session
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionEvent::EndOfStream | SessionEvent::Error { .. })
    }
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::EndOfStream => write!(f, "End of stream"),
            SessionEvent::Error { source, message, .. } => match source {
                Some(stage) => write!(f, "Error from {}: {}", stage, message),
                None => write!(f, "Error: {}", message),
            },
            SessionEvent::Warning { source, message } => match source {
                Some(stage) => write!(f, "Warning from {}: {}", stage, message),
                None => write!(f, "Warning: {}", message),
            },
            SessionEvent::StateChanged { from, to } => {
                write!(f, "State changed: {} -> {}", from, to)
            }
            SessionEvent::Other(kind) => write!(f, "{}", kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_eos_and_error_are_terminal() {
        assert!(SessionEvent::EndOfStream.is_terminal());
        assert!(SessionEvent::Error {
            source: None,
            message: "x".into(),
            debug: None,
        }
        .is_terminal());
        assert!(!SessionEvent::Warning {
            source: None,
            message: "x".into(),
        }
        .is_terminal());
        assert!(!SessionEvent::Other("tag".into()).is_terminal());
    }

    #[test]
    fn test_display() {
        let event = SessionEvent::Warning {
            source: Some("ogg-demuxer".into()),
            message: "stream not linked".into(),
        };
        assert_eq!(event.to_string(), "Warning from ogg-demuxer: stream not linked");
        assert_eq!(SessionEvent::EndOfStream.to_string(), "End of stream");
    }
}
