//! GStreamer media runtime
//!
//! Stage kinds are element factory names, ports are pads, graphs are
//! pipelines, and session events are translated bus messages.

use super::{DiscoveryHandler, Graph, LinkOutcome, MediaRuntime, Port, PropertyValue, Stage};
use crate::error::{Error, Result};
use crate::playback::events::SessionEvent;
use crate::playback::state::LifecycleState;
use futures::{Stream, StreamExt};
use gst::glib;
use gst::prelude::*;
use gstreamer as gst;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::{debug, info, warn};

/// Handle proving GStreamer was initialized
#[derive(Debug)]
pub struct GstRuntime {
    _initialized: (),
}

impl GstRuntime {
    pub fn init() -> Result<Self> {
        gst::init().map_err(|e| Error::Backend(format!("Failed to initialize GStreamer: {}", e)))?;
        info!("Initialized {}", gst::version_string());
        Ok(Self { _initialized: () })
    }
}

impl MediaRuntime for GstRuntime {
    type Stage = GstStage;
    type Graph = GstGraph;

    fn create_stage(&self, kind: &str, name: &str) -> Result<GstStage> {
        gst::ElementFactory::make(kind)
            .name(name)
            .build()
            .map(GstStage)
            .map_err(|e| {
                debug!("ElementFactory::make({}) failed: {}", kind, e);
                Error::UnknownStageType {
                    kind: kind.to_string(),
                    name: name.to_string(),
                }
            })
    }

    fn create_graph(&self, name: &str) -> Result<GstGraph> {
        Ok(GstGraph {
            pipeline: gst::Pipeline::with_name(name),
        })
    }
}

fn to_gst_state(state: LifecycleState) -> gst::State {
    match state {
        LifecycleState::Null => gst::State::Null,
        LifecycleState::Ready => gst::State::Ready,
        LifecycleState::Paused => gst::State::Paused,
        LifecycleState::Playing => gst::State::Playing,
    }
}

fn from_gst_state(state: gst::State) -> LifecycleState {
    match state {
        gst::State::Ready => LifecycleState::Ready,
        gst::State::Paused => LifecycleState::Paused,
        gst::State::Playing => LifecycleState::Playing,
        _ => LifecycleState::Null,
    }
}

/// GStreamer element
#[derive(Debug, Clone)]
pub struct GstStage(gst::Element);

impl GstStage {
    pub fn element(&self) -> &gst::Element {
        &self.0
    }

    fn convert_value(&self, key: &str, pspec: &glib::ParamSpec, value: &PropertyValue) -> Result<glib::Value> {
        let mismatch = || Error::Property {
            stage: self.name(),
            property: key.to_string(),
            reason: format!("value {} does not fit type {}", value, pspec.value_type()),
        };
        let target = pspec.value_type();

        let converted = match value {
            PropertyValue::Str(v) if target == glib::Type::STRING => v.to_value(),
            PropertyValue::Bool(v) if target == glib::Type::BOOL => v.to_value(),
            PropertyValue::Double(v) if target == glib::Type::F64 => {
                if let Some(range) = pspec.downcast_ref::<glib::ParamSpecDouble>() {
                    if *v < range.minimum() || *v > range.maximum() {
                        return Err(Error::Property {
                            stage: self.name(),
                            property: key.to_string(),
                            reason: format!(
                                "value {} out of range {}..={}",
                                v,
                                range.minimum(),
                                range.maximum()
                            ),
                        });
                    }
                }
                v.to_value()
            }
            PropertyValue::Double(v) if target == glib::Type::F32 => (*v as f32).to_value(),
            PropertyValue::Int(v) if target == glib::Type::I64 => v.to_value(),
            PropertyValue::Int(v) if target == glib::Type::I32 => {
                i32::try_from(*v).map_err(|_| mismatch())?.to_value()
            }
            PropertyValue::Int(v) if target == glib::Type::U32 => {
                u32::try_from(*v).map_err(|_| mismatch())?.to_value()
            }
            PropertyValue::Int(v) if target == glib::Type::U64 => {
                u64::try_from(*v).map_err(|_| mismatch())?.to_value()
            }
            _ => return Err(mismatch()),
        };
        Ok(converted)
    }
}

impl Stage for GstStage {
    type Port = GstPort;

    fn name(&self) -> String {
        self.0.name().to_string()
    }

    fn kind(&self) -> String {
        self.0
            .factory()
            .map(|factory| factory.name().to_string())
            .unwrap_or_default()
    }

    fn set_property(&self, key: &str, value: &PropertyValue) -> Result<()> {
        let pspec = self.0.find_property(key).ok_or_else(|| Error::Property {
            stage: self.name(),
            property: key.to_string(),
            reason: format!("{} has no such property", self.kind()),
        })?;

        if !pspec.flags().contains(glib::ParamFlags::WRITABLE) {
            return Err(Error::Property {
                stage: self.name(),
                property: key.to_string(),
                reason: "property is not writable".to_string(),
            });
        }

        let value = self.convert_value(key, &pspec, value)?;
        self.0.set_property_from_value(key, &value);
        Ok(())
    }

    fn link(&self, downstream: &GstStage) -> Result<()> {
        self.0.link(&downstream.0).map_err(|e| Error::LinkIncompatible {
            upstream: self.name(),
            downstream: downstream.name(),
            reason: e.to_string(),
        })
    }

    fn static_input(&self, name: &str) -> Option<GstPort> {
        self.0
            .static_pad(name)
            .filter(|pad| pad.direction() == gst::PadDirection::Sink)
            .map(GstPort)
    }

    fn connect_output_discovered(&self, handler: DiscoveryHandler<GstStage>) {
        let _handler_id = self.0.connect_pad_added(move |element, pad| {
            if pad.direction() != gst::PadDirection::Src {
                return;
            }
            handler(&GstStage(element.clone()), &GstPort(pad.clone()));
        });
    }

    fn post_warning(&self, message: &str) {
        let warning = gst::message::Warning::builder(gst::CoreError::Negotiation, message)
            .src(&self.0)
            .build();
        if self.0.post_message(warning).is_err() {
            warn!("{} has no bus, dropping warning: {}", self.name(), message);
        }
    }
}

/// GStreamer pad
#[derive(Debug, Clone)]
pub struct GstPort(gst::Pad);

impl Port for GstPort {
    fn name(&self) -> String {
        self.0.name().to_string()
    }

    fn media_type(&self) -> Option<String> {
        let caps = self.0.current_caps().unwrap_or_else(|| self.0.query_caps(None));
        caps.structure(0).map(|s| s.name().to_string())
    }

    fn is_linked(&self) -> bool {
        self.0.is_linked()
    }

    fn link(&self, input: &GstPort) -> LinkOutcome {
        match self.0.link(&input.0) {
            Ok(_) => LinkOutcome::Linked,
            Err(gst::PadLinkError::WasLinked) => LinkOutcome::AlreadyLinked,
            Err(gst::PadLinkError::Noformat) => LinkOutcome::CapabilityMismatch,
            Err(other) => LinkOutcome::Refused(other.to_string()),
        }
    }
}

/// GStreamer pipeline
#[derive(Debug)]
pub struct GstGraph {
    pipeline: gst::Pipeline,
}

impl Graph for GstGraph {
    type Stage = GstStage;
    type Events = GstEvents;

    fn name(&self) -> String {
        self.pipeline.name().to_string()
    }

    fn add(&self, stage: &GstStage) -> Result<()> {
        self.pipeline.add(&stage.0).map_err(|e| {
            Error::Backend(format!("Failed to add '{}' to '{}': {}", stage.name(), self.name(), e))
        })
    }

    fn set_state(&self, state: LifecycleState) -> Result<()> {
        let success = self
            .pipeline
            .set_state(to_gst_state(state))
            .map_err(|e| Error::StateChange {
                state,
                reason: e.to_string(),
            })?;
        debug!("{}: set_state({}) -> {:?}", self.name(), state, success);
        Ok(())
    }

    fn subscribe(&self) -> Result<GstEvents> {
        let bus = self
            .pipeline
            .bus()
            .ok_or_else(|| Error::Backend(format!("{} has no bus", self.name())))?;

        Ok(GstEvents {
            stream: bus.stream(),
            graph_name: self.name(),
        })
    }
}

/// Bus subscription; dropping it removes the bus sync handler
#[derive(Debug)]
pub struct GstEvents {
    stream: gst::bus::BusStream,
    graph_name: String,
}

impl Stream for GstEvents {
    type Item = SessionEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<SessionEvent>> {
        let this = &mut *self;
        this.stream
            .poll_next_unpin(cx)
            .map(|message| message.map(|message| translate(&message, &this.graph_name)))
    }
}

fn translate(message: &gst::Message, graph_name: &str) -> SessionEvent {
    use gst::MessageView;

    let source = message.src().map(|src| src.name().to_string());
    match message.view() {
        MessageView::Eos(..) => SessionEvent::EndOfStream,
        MessageView::Error(err) => SessionEvent::Error {
            source,
            message: err.error().to_string(),
            debug: err.debug().map(|d| d.to_string()),
        },
        MessageView::Warning(warning) => SessionEvent::Warning {
            source,
            message: warning.error().to_string(),
        },
        MessageView::StateChanged(change) if source.as_deref() == Some(graph_name) => {
            SessionEvent::StateChanged {
                from: from_gst_state(change.old()),
                to: from_gst_state(change.current()),
            }
        }
        _ => SessionEvent::Other(format!("{:?}", message.type_())),
    }
}
