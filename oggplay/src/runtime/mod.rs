//! Media runtime seam
//!
//! The playback core only orchestrates stages; decoding and rendering happen
//! inside a media runtime. A runtime provides:
//! - a stage factory keyed by type identifier strings
//! - ports with capability-typed linking
//! - an asynchronous session event stream per graph
//! - lifecycle state transitions with synchronous failure reporting
//!
//! Two implementations exist: `gst_runtime` (GStreamer, behind the `gstreamer`
//! feature) and `sim`, an in-process runtime with scripted media built only
//! for tests or with the `sim` feature.

#[cfg(feature = "gstreamer")]
pub mod gst_runtime;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

use crate::error::Result;
use crate::playback::events::SessionEvent;
use crate::playback::state::LifecycleState;
use futures::Stream;
use std::sync::{Mutex, MutexGuard};

/// Lock `mutex`, recovering the data if a panicking holder poisoned it
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Stage property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Str(String),
    Double(f64),
    Int(i64),
    Bool(bool),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Double(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Str(v) => write!(f, "\"{}\"", v),
            PropertyValue::Double(v) => write!(f, "{}", v),
            PropertyValue::Int(v) => write!(f, "{}", v),
            PropertyValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Result of linking one output port to one input port
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Linked,
    /// The two ports share no media type
    CapabilityMismatch,
    /// The input port already has a peer
    AlreadyLinked,
    /// Any other refusal from the runtime
    Refused(String),
}

impl LinkOutcome {
    pub fn is_linked(&self) -> bool {
        matches!(self, LinkOutcome::Linked)
    }
}

impl std::fmt::Display for LinkOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkOutcome::Linked => write!(f, "linked"),
            LinkOutcome::CapabilityMismatch => write!(f, "capability mismatch"),
            LinkOutcome::AlreadyLinked => write!(f, "already linked"),
            LinkOutcome::Refused(reason) => write!(f, "refused: {}", reason),
        }
    }
}

/// Callback invoked with the stage and its newly discovered output port
pub type DiscoveryHandler<S> = Box<dyn Fn(&S, &<S as Stage>::Port) + Send + Sync + 'static>;

/// Factory for stages and graphs
pub trait MediaRuntime {
    type Stage: Stage;
    type Graph: Graph<Stage = Self::Stage>;

    /// Create a stage of type `kind`; fails with `UnknownStageType` when the
    /// runtime has no such type.
    fn create_stage(&self, kind: &str, name: &str) -> Result<Self::Stage>;

    fn create_graph(&self, name: &str) -> Result<Self::Graph>;
}

/// Handle to one processing stage; clones refer to the same stage
pub trait Stage: Clone + Send + Sync + 'static {
    type Port: Port;

    fn name(&self) -> String;

    fn kind(&self) -> String;

    fn set_property(&self, key: &str, value: &PropertyValue) -> Result<()>;

    /// Link the first compatible free output of `self` to the first
    /// compatible free input of `downstream`.
    fn link(&self, downstream: &Self) -> Result<()>;

    /// Look up an always-present input port by name
    fn static_input(&self, name: &str) -> Option<Self::Port>;

    /// Subscribe to output ports appearing at runtime
    fn connect_output_discovered(&self, handler: DiscoveryHandler<Self>);

    /// Post a warning-level session event on the graph's event channel
    fn post_warning(&self, message: &str);
}

/// A typed connection point on a stage
pub trait Port: Send + Sync + 'static {
    fn name(&self) -> String;

    /// Media type of the port's negotiated or template capabilities
    fn media_type(&self) -> Option<String>;

    fn is_linked(&self) -> bool;

    /// Link this output port to `input`
    fn link(&self, input: &Self) -> LinkOutcome;
}

/// Container owning stages and their links
pub trait Graph: Send + 'static {
    type Stage: Stage;
    type Events: Stream<Item = SessionEvent> + Unpin + Send + 'static;

    fn name(&self) -> String;

    fn add(&self, stage: &Self::Stage) -> Result<()>;

    /// Request a single lifecycle transition
    fn set_state(&self, state: LifecycleState) -> Result<()>;

    /// Subscribe to the graph's session events; released when dropped
    fn subscribe(&self) -> Result<Self::Events>;
}
