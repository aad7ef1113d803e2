//! Error types for oggplay
//!
//! Construction-time errors (unknown stage types, incompatible static links,
//! startup failures) abort the session. Runtime errors reported by the running
//! graph end it through the normal stop path.

use crate::playback::state::LifecycleState;
use thiserror::Error;

/// One stage that could not be created during graph assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    /// Role of the stage in the pipeline ("demuxer", "video decoder", ...)
    pub role: String,
    pub kind: String,
    pub name: String,
    pub reason: String,
}

impl std::fmt::Display for StageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}' ({}): {}", self.role, self.name, self.kind, self.reason)
    }
}

/// Main error type for oggplay
#[derive(Error, Debug)]
pub enum Error {
    /// The runtime has no stage type with this identifier
    #[error("Unknown stage type '{kind}' requested for '{name}'")]
    UnknownStageType { kind: String, name: String },

    /// One or more stages could not be created; nothing was linked
    #[error("{} stage(s) could not be created: {}", .failures.len(), join_failures(.failures))]
    StageCreation { failures: Vec<StageFailure> },

    /// A stage name was issued twice within one graph
    #[error("Duplicate stage name '{0}'")]
    DuplicateStageName(String),

    /// Two stages (or ports) could not be linked
    #[error("Cannot link '{upstream}' to '{downstream}': {reason}")]
    LinkIncompatible {
        upstream: String,
        downstream: String,
        reason: String,
    },

    /// A stage property could not be set
    #[error("Cannot set property '{property}' on '{stage}': {reason}")]
    Property {
        stage: String,
        property: String,
        reason: String,
    },

    /// The runtime refused a lifecycle transition
    #[error("State change to {state} failed: {reason}")]
    StateChange { state: LifecycleState, reason: String },

    /// The graph could not be brought to Playing
    #[error("Unable to set the pipeline to the playing state (failed at {state}): {reason}")]
    StartupFailure { state: LifecycleState, reason: String },

    /// Error reported by the running graph through the event channel
    #[error("{}", runtime_message(.source_stage, .message))]
    Runtime {
        source_stage: Option<String>,
        message: String,
    },

    /// Wrong command-line invocation; carries the rendered usage text
    #[error("{0}")]
    BadInvocation(String),

    /// Operation not valid in the current lifecycle state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Media runtime failure outside the categories above
    #[error("Media runtime error: {0}")]
    Backend(String),

    /// Configuration loading or validation errors
    #[error(transparent)]
    Config(#[from] oggplay_common::Error),
}

fn join_failures(failures: &[StageFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn runtime_message(source_stage: &Option<String>, message: &str) -> String {
    match source_stage {
        Some(stage) => format!("Error from {}: {}", stage, message),
        None => format!("Error: {}", message),
    }
}

impl Error {
    /// Process exit code for this error.
    ///
    /// Construction failures use 255 (a C-style `-1`); failures after the
    /// graph was built use 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::UnknownStageType { .. }
            | Error::StageCreation { .. }
            | Error::DuplicateStageName(_)
            | Error::BadInvocation(_)
            | Error::Config(_) => 255,
            _ => 1,
        }
    }
}

/// Convenience Result type using oggplay Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_creation_message_lists_every_failure() {
        let err = Error::StageCreation {
            failures: vec![
                StageFailure {
                    role: "video decoder".into(),
                    kind: "theoradec".into(),
                    name: "theora-decoder".into(),
                    reason: "unknown stage type".into(),
                },
                StageFailure {
                    role: "audio decoder".into(),
                    kind: "vorbisdec".into(),
                    name: "vorbis-decoder".into(),
                    reason: "unknown stage type".into(),
                },
            ],
        };

        let message = err.to_string();
        assert!(message.starts_with("2 stage(s) could not be created"));
        assert!(message.contains("theora-decoder"));
        assert!(message.contains("vorbis-decoder"));
        assert_eq!(err.exit_code(), 255);
    }

    #[test]
    fn test_runtime_error_message() {
        let err = Error::Runtime {
            source_stage: Some("ogg-demuxer".into()),
            message: "Could not demultiplex stream.".into(),
        };
        assert_eq!(err.to_string(), "Error from ogg-demuxer: Could not demultiplex stream.");
        assert_eq!(err.exit_code(), 1);

        let err = Error::Runtime {
            source_stage: None,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "Error: boom");
    }
}
