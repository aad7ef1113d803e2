//! In-process media runtime with scripted media
//!
//! `SimRuntime` implements the same contract as the GStreamer backend without
//! touching any media: stage types come from a catalog of templates, ports
//! carry media-type capabilities, and each file location maps to a
//! [`MediaScript`] that decides which elementary streams the demultiplexer
//! discovers and how the session ends.
//!
//! Live stages and event subscriptions are counted so callers can verify
//! that teardown released everything.

use super::{lock, DiscoveryHandler, Graph, LinkOutcome, MediaRuntime, Port, PropertyValue, Stage};
use crate::error::{Error, Result};
use crate::playback::events::SessionEvent;
use crate::playback::state::LifecycleState;
use futures::Stream;
use std::collections::{HashMap, HashSet};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::task::{Context, Poll};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, trace, warn};

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

/// Media-type capability of a port
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caps {
    Any,
    Types(Vec<String>),
}

impl Caps {
    pub fn of(media_type: &str) -> Self {
        Caps::Types(vec![media_type.to_string()])
    }

    pub fn intersects(&self, other: &Caps) -> bool {
        match (self, other) {
            (Caps::Any, _) | (_, Caps::Any) => true,
            (Caps::Types(a), Caps::Types(b)) => a.iter().any(|t| b.contains(t)),
        }
    }

    pub fn media_type(&self) -> Option<String> {
        match self {
            Caps::Any => None,
            Caps::Types(types) => types.first().cloned(),
        }
    }
}

/// Accepted value type of a stage property
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyKind {
    Str,
    Double { min: f64, max: f64 },
    Int,
    Bool,
}

impl PropertyKind {
    fn check(&self, value: &PropertyValue) -> std::result::Result<(), String> {
        match (self, value) {
            (PropertyKind::Str, PropertyValue::Str(_))
            | (PropertyKind::Int, PropertyValue::Int(_))
            | (PropertyKind::Bool, PropertyValue::Bool(_)) => Ok(()),
            (PropertyKind::Double { min, max }, PropertyValue::Double(v)) => {
                if v < min || v > max {
                    Err(format!("value {} out of range {}..={}", v, min, max))
                } else {
                    Ok(())
                }
            }
            (kind, value) => Err(format!("value {} does not match property type {:?}", value, kind)),
        }
    }
}

/// Port and property layout of one stage type
#[derive(Debug, Clone, Default)]
pub struct StageTemplate {
    inputs: Vec<(String, Caps)>,
    outputs: Vec<(String, Caps)>,
    dynamic_outputs: bool,
    properties: Vec<(String, PropertyKind)>,
}

impl StageTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, name: &str, caps: Caps) -> Self {
        self.inputs.push((name.to_string(), caps));
        self
    }

    pub fn output(mut self, name: &str, caps: Caps) -> Self {
        self.outputs.push((name.to_string(), caps));
        self
    }

    /// Outputs appear only once the stage inspects its input
    pub fn dynamic_outputs(mut self) -> Self {
        self.dynamic_outputs = true;
        self
    }

    pub fn property(mut self, name: &str, kind: PropertyKind) -> Self {
        self.properties.push((name.to_string(), kind));
        self
    }

    fn is_sink(&self) -> bool {
        !self.inputs.is_empty() && self.outputs.is_empty() && !self.dynamic_outputs
    }

    fn is_source(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// How a scripted file ends once the graph reaches Playing
#[derive(Debug, Clone, PartialEq)]
pub enum Ending {
    /// End-of-stream, provided every sink is fed
    EndOfStream,
    /// The demultiplexer reports an error, followed by end-of-stream
    Error(String),
    /// No terminal event at all
    Never,
}

/// Content of one simulated media file
#[derive(Debug, Clone, PartialEq)]
pub struct MediaScript {
    streams: Vec<String>,
    ending: Ending,
}

impl MediaScript {
    /// File whose demultiplexer discovers one stream per media type, in order
    pub fn new<I, S>(streams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            streams: streams.into_iter().map(Into::into).collect(),
            ending: Ending::EndOfStream,
        }
    }

    /// Ogg file with one Theora video and one Vorbis audio stream
    pub fn theora_vorbis() -> Self {
        Self::new(["video/x-theora", "audio/x-vorbis"])
    }

    pub fn ending(mut self, ending: Ending) -> Self {
        self.ending = ending;
        self
    }

    pub fn streams(&self) -> &[String] {
        &self.streams
    }
}

#[derive(Debug, Default)]
struct Counters {
    live_stages: AtomicUsize,
    active_subscriptions: AtomicUsize,
}

/// Decrements its counter when dropped
#[derive(Debug)]
struct ResourceToken {
    counters: Arc<Counters>,
    subscription: bool,
}

impl ResourceToken {
    fn stage(counters: &Arc<Counters>) -> Self {
        counters.live_stages.fetch_add(1, Ordering::SeqCst);
        Self {
            counters: counters.clone(),
            subscription: false,
        }
    }

    fn subscription(counters: &Arc<Counters>) -> Self {
        counters.active_subscriptions.fetch_add(1, Ordering::SeqCst);
        Self {
            counters: counters.clone(),
            subscription: true,
        }
    }
}

impl Drop for ResourceToken {
    fn drop(&mut self) {
        let counter = if self.subscription {
            &self.counters.active_subscriptions
        } else {
            &self.counters.live_stages
        };
        counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Simulated media runtime
pub struct SimRuntime {
    catalog: HashMap<String, StageTemplate>,
    media: HashMap<String, MediaScript>,
    failing_state: Option<LifecycleState>,
    counters: Arc<Counters>,
}

impl SimRuntime {
    /// Runtime whose catalog holds the stage types of an Ogg Theora/Vorbis player
    pub fn new() -> Self {
        let raw_video = || Caps::of("video/x-raw");
        let raw_audio = || Caps::of("audio/x-raw");
        let unit_range = PropertyKind::Double { min: -1.0, max: 1.0 };
        let gain_range = PropertyKind::Double { min: 0.0, max: 2.0 };

        let videobalance = StageTemplate::new()
            .input("sink", raw_video())
            .output("src", raw_video())
            .property("saturation", gain_range)
            .property("contrast", gain_range)
            .property("brightness", unit_range)
            .property("hue", unit_range);

        Self::empty()
            .register(
                "filesrc",
                StageTemplate::new()
                    .output("src", Caps::Any)
                    .property("location", PropertyKind::Str),
            )
            .register(
                "oggdemux",
                StageTemplate::new()
                    .input("sink", Caps::of("application/ogg"))
                    .dynamic_outputs(),
            )
            .register(
                "theoradec",
                StageTemplate::new()
                    .input("sink", Caps::of("video/x-theora"))
                    .output("src", raw_video()),
            )
            .register(
                "vorbisdec",
                StageTemplate::new()
                    .input("sink", Caps::of("audio/x-vorbis"))
                    .output("src", raw_audio()),
            )
            .register(
                "queue",
                StageTemplate::new()
                    .input("sink", Caps::Any)
                    .output("src", Caps::Any)
                    .property("max-size-buffers", PropertyKind::Int),
            )
            .register("videobalance", videobalance)
            .register(
                "videoconvert",
                StageTemplate::new()
                    .input("sink", raw_video())
                    .output("src", raw_video()),
            )
            .register(
                "audioconvert",
                StageTemplate::new()
                    .input("sink", raw_audio())
                    .output("src", raw_audio()),
            )
            .register(
                "autovideosink",
                StageTemplate::new()
                    .input("sink", raw_video())
                    .property("sync", PropertyKind::Bool),
            )
            .register(
                "autoaudiosink",
                StageTemplate::new()
                    .input("sink", raw_audio())
                    .property("sync", PropertyKind::Bool),
            )
    }

    /// Runtime with an empty catalog
    pub fn empty() -> Self {
        Self {
            catalog: HashMap::new(),
            media: HashMap::new(),
            failing_state: None,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn register(mut self, kind: &str, template: StageTemplate) -> Self {
        self.catalog.insert(kind.to_string(), template);
        self
    }

    /// Remove a stage type, as if its plugin were not installed
    pub fn without(mut self, kind: &str) -> Self {
        self.catalog.remove(kind);
        self
    }

    pub fn with_media(mut self, location: &str, script: MediaScript) -> Self {
        self.media.insert(location.to_string(), script);
        self
    }

    /// Make every graph refuse transitions to `state`
    pub fn fail_transition_to(mut self, state: LifecycleState) -> Self {
        self.failing_state = Some(state);
        self
    }

    /// Stages created by this runtime and not yet released
    pub fn live_stages(&self) -> usize {
        self.counters.live_stages.load(Ordering::SeqCst)
    }

    /// Event subscriptions not yet released
    pub fn active_subscriptions(&self) -> usize {
        self.counters.active_subscriptions.load(Ordering::SeqCst)
    }
}

impl Default for SimRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaRuntime for SimRuntime {
    type Stage = SimStage;
    type Graph = SimGraph;

    fn create_stage(&self, kind: &str, name: &str) -> Result<SimStage> {
        let template = self
            .catalog
            .get(kind)
            .cloned()
            .ok_or_else(|| Error::UnknownStageType {
                kind: kind.to_string(),
                name: name.to_string(),
            })?;

        trace!("Creating simulated stage {} ({})", name, kind);
        Ok(SimStage::new(kind, name, template, &self.counters))
    }

    fn create_graph(&self, name: &str) -> Result<SimGraph> {
        let (bus, receiver) = unbounded_channel();
        Ok(SimGraph {
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::SeqCst),
            name: name.to_string(),
            inner: Mutex::new(GraphInner {
                stages: Vec::new(),
                state: LifecycleState::Null,
                discovered: false,
                finished: false,
            }),
            bus,
            receiver: Mutex::new(Some(receiver)),
            media: self.media.clone(),
            failing_state: self.failing_state,
            counters: self.counters.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Input,
    Output,
}

struct PortInner {
    name: String,
    direction: Direction,
    caps: Caps,
    owner: Weak<StageInner>,
    peer: Mutex<Option<Weak<PortInner>>>,
}

/// Port of a simulated stage
#[derive(Clone)]
pub struct SimPort {
    inner: Arc<PortInner>,
}

impl SimPort {
    fn new(name: &str, direction: Direction, caps: Caps, owner: Weak<StageInner>) -> Self {
        Self {
            inner: Arc::new(PortInner {
                name: name.to_string(),
                direction,
                caps,
                owner,
                peer: Mutex::new(None),
            }),
        }
    }

    pub fn caps(&self) -> &Caps {
        &self.inner.caps
    }

    /// The port on the other end of this port's link
    pub fn peer(&self) -> Option<SimPort> {
        lock(&self.inner.peer)
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| SimPort { inner })
    }

    /// Name of the stage owning this port
    pub fn owner_name(&self) -> Option<String> {
        self.inner.owner.upgrade().map(|stage| stage.name.clone())
    }

    fn owner_graph(&self) -> Option<u64> {
        self.inner
            .owner
            .upgrade()
            .and_then(|stage| lock(&stage.membership).as_ref().map(|m| m.graph_id))
    }
}

impl std::fmt::Debug for SimPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimPort")
            .field("owner", &self.owner_name())
            .field("name", &self.inner.name)
            .field("caps", &self.inner.caps)
            .finish()
    }
}

impl Port for SimPort {
    fn name(&self) -> String {
        self.inner.name.clone()
    }

    fn media_type(&self) -> Option<String> {
        self.inner.caps.media_type()
    }

    fn is_linked(&self) -> bool {
        self.peer().is_some()
    }

    fn link(&self, input: &SimPort) -> LinkOutcome {
        if self.inner.direction != Direction::Output || input.inner.direction != Direction::Input {
            return LinkOutcome::Refused("wrong port direction".to_string());
        }
        if self.is_linked() || input.is_linked() {
            return LinkOutcome::AlreadyLinked;
        }
        if !self.inner.caps.intersects(&input.inner.caps) {
            return LinkOutcome::CapabilityMismatch;
        }
        match (self.owner_graph(), input.owner_graph()) {
            (Some(a), Some(b)) if a == b => {}
            _ => return LinkOutcome::Refused("ports are not in the same graph".to_string()),
        }

        *lock(&self.inner.peer) = Some(Arc::downgrade(&input.inner));
        *lock(&input.inner.peer) = Some(Arc::downgrade(&self.inner));
        LinkOutcome::Linked
    }
}

struct Membership {
    graph_id: u64,
    bus: UnboundedSender<SessionEvent>,
}

struct StageInner {
    kind: String,
    name: String,
    template: StageTemplate,
    properties: Mutex<HashMap<String, PropertyValue>>,
    inputs: Vec<SimPort>,
    outputs: Mutex<Vec<SimPort>>,
    handlers: Mutex<Vec<Arc<DiscoveryHandler<SimStage>>>>,
    membership: Mutex<Option<Membership>>,
    _token: ResourceToken,
}

/// Stage of the simulated runtime; clones share the same stage
#[derive(Clone)]
pub struct SimStage {
    inner: Arc<StageInner>,
}

impl SimStage {
    fn new(kind: &str, name: &str, template: StageTemplate, counters: &Arc<Counters>) -> Self {
        let inner = Arc::new_cyclic(|owner: &Weak<StageInner>| {
            let inputs = template
                .inputs
                .iter()
                .map(|(port, caps)| SimPort::new(port, Direction::Input, caps.clone(), owner.clone()))
                .collect();
            let outputs = template
                .outputs
                .iter()
                .map(|(port, caps)| SimPort::new(port, Direction::Output, caps.clone(), owner.clone()))
                .collect();

            StageInner {
                kind: kind.to_string(),
                name: name.to_string(),
                template,
                properties: Mutex::new(HashMap::new()),
                inputs,
                outputs: Mutex::new(outputs),
                handlers: Mutex::new(Vec::new()),
                membership: Mutex::new(None),
                _token: ResourceToken::stage(counters),
            }
        });
        Self { inner }
    }

    pub fn property(&self, key: &str) -> Option<PropertyValue> {
        lock(&self.inner.properties).get(key).cloned()
    }

    pub fn output_ports(&self) -> Vec<SimPort> {
        lock(&self.inner.outputs).clone()
    }

    pub fn input_ports(&self) -> Vec<SimPort> {
        self.inner.inputs.clone()
    }

    /// Name of the stage linked to this stage's input `port`, if any
    pub fn upstream_of(&self, port: &str) -> Option<String> {
        self.static_input(port)
            .and_then(|p| p.peer())
            .and_then(|peer| peer.owner_name())
    }

    fn is_same(&self, other: &SimStage) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn post(&self, event: SessionEvent) -> bool {
        match lock(&self.inner.membership).as_ref() {
            Some(membership) => membership.bus.send(event).is_ok(),
            None => false,
        }
    }

    /// Create a runtime output port and notify discovery handlers, the way
    /// a demultiplexer does when it finds an elementary stream
    pub fn discover_output(&self, caps: Caps) -> SimPort {
        let port = {
            let mut outputs = lock(&self.inner.outputs);
            let port = SimPort::new(
                &format!("src_{:08x}", outputs.len()),
                Direction::Output,
                caps,
                Arc::downgrade(&self.inner),
            );
            outputs.push(port.clone());
            port
        };

        let handlers = lock(&self.inner.handlers).clone();
        debug!(
            "{} discovered output {} ({} handler(s))",
            self.inner.name,
            port.inner.name,
            handlers.len()
        );
        for handler in handlers {
            handler(self, &port);
        }
        port
    }
}

impl std::fmt::Debug for SimStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimStage")
            .field("kind", &self.inner.kind)
            .field("name", &self.inner.name)
            .finish()
    }
}

impl Stage for SimStage {
    type Port = SimPort;

    fn name(&self) -> String {
        self.inner.name.clone()
    }

    fn kind(&self) -> String {
        self.inner.kind.clone()
    }

    fn set_property(&self, key: &str, value: &PropertyValue) -> Result<()> {
        let kind = self
            .inner
            .template
            .properties
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| Error::Property {
                stage: self.name(),
                property: key.to_string(),
                reason: format!("{} has no such property", self.inner.kind),
            })?;

        kind.check(value).map_err(|reason| Error::Property {
            stage: self.name(),
            property: key.to_string(),
            reason,
        })?;

        lock(&self.inner.properties).insert(key.to_string(), value.clone());
        Ok(())
    }

    fn link(&self, downstream: &SimStage) -> Result<()> {
        let outputs = self.output_ports();
        let mut last = LinkOutcome::Refused("no free compatible ports".to_string());

        for output in outputs.iter().filter(|p| !p.is_linked()) {
            for input in downstream.inner.inputs.iter().filter(|p| !p.is_linked()) {
                match output.link(input) {
                    LinkOutcome::Linked => return Ok(()),
                    outcome => last = outcome,
                }
            }
        }

        Err(Error::LinkIncompatible {
            upstream: self.name(),
            downstream: downstream.name(),
            reason: last.to_string(),
        })
    }

    fn static_input(&self, name: &str) -> Option<SimPort> {
        self.inner.inputs.iter().find(|p| p.inner.name == name).cloned()
    }

    fn connect_output_discovered(&self, handler: DiscoveryHandler<SimStage>) {
        lock(&self.inner.handlers).push(Arc::new(handler));
    }

    fn post_warning(&self, message: &str) {
        let posted = self.post(SessionEvent::Warning {
            source: Some(self.name()),
            message: message.to_string(),
        });
        if !posted {
            warn!("{} is not in a graph, dropping warning: {}", self.inner.name, message);
        }
    }
}

struct GraphInner {
    stages: Vec<SimStage>,
    state: LifecycleState,
    discovered: bool,
    finished: bool,
}

/// Graph of the simulated runtime
pub struct SimGraph {
    id: u64,
    name: String,
    inner: Mutex<GraphInner>,
    bus: UnboundedSender<SessionEvent>,
    receiver: Mutex<Option<UnboundedReceiver<SessionEvent>>>,
    media: HashMap<String, MediaScript>,
    failing_state: Option<LifecycleState>,
    counters: Arc<Counters>,
}

impl SimGraph {
    pub fn state(&self) -> LifecycleState {
        lock(&self.inner).state
    }

    pub fn stage_names(&self) -> Vec<String> {
        lock(&self.inner).stages.iter().map(Stage::name).collect()
    }

    pub fn stage(&self, name: &str) -> Option<SimStage> {
        lock(&self.inner).stages.iter().find(|s| s.inner.name == name).cloned()
    }

    fn emit(&self, event: SessionEvent) {
        if self.bus.send(event).is_err() {
            trace!("{}: event dropped, no subscriber", self.name);
        }
    }

    /// Source stage and the script registered for its location
    fn script(
        stages: &[SimStage],
        media: &HashMap<String, MediaScript>,
    ) -> std::result::Result<MediaScript, (Option<String>, String)> {
        let source = stages
            .iter()
            .find(|s| s.inner.template.is_source())
            .ok_or((None, "graph has no source stage".to_string()))?;

        match source.property("location") {
            Some(PropertyValue::Str(location)) => media
                .get(&location)
                .cloned()
                .ok_or((Some(source.name()), format!("Resource not found: {}", location))),
            _ => Err((Some(source.name()), "No file name specified for reading.".to_string())),
        }
    }

    /// Whether every sink is reachable from a source through links
    fn all_sinks_fed(stages: &[SimStage]) -> bool {
        let mut visited: HashSet<String> = HashSet::new();
        let mut pending: Vec<SimStage> = stages
            .iter()
            .filter(|s| s.inner.template.is_source())
            .cloned()
            .collect();

        while let Some(stage) = pending.pop() {
            if !visited.insert(stage.name()) {
                continue;
            }
            for output in stage.output_ports() {
                if let Some(owner) = output.peer().and_then(|peer| peer.inner.owner.upgrade()) {
                    pending.push(SimStage { inner: owner });
                }
            }
        }

        stages
            .iter()
            .filter(|s| s.inner.template.is_sink())
            .all(|s| visited.contains(&s.inner.name))
    }
}

impl Graph for SimGraph {
    type Stage = SimStage;
    type Events = SimEvents;

    fn name(&self) -> String {
        self.name.clone()
    }

    fn add(&self, stage: &SimStage) -> Result<()> {
        let mut inner = lock(&self.inner);
        if inner.stages.iter().any(|s| s.is_same(stage)) || lock(&stage.inner.membership).is_some() {
            return Err(Error::Backend(format!(
                "stage '{}' already belongs to a graph",
                stage.name()
            )));
        }
        if inner.stages.iter().any(|s| s.inner.name == stage.inner.name) {
            return Err(Error::DuplicateStageName(stage.name()));
        }

        *lock(&stage.inner.membership) = Some(Membership {
            graph_id: self.id,
            bus: self.bus.clone(),
        });
        inner.stages.push(stage.clone());
        Ok(())
    }

    fn set_state(&self, target: LifecycleState) -> Result<()> {
        let (from, stages, script) = {
            let mut inner = lock(&self.inner);
            let from = inner.state;

            if self.failing_state == Some(target) {
                self.emit(SessionEvent::Error {
                    source: Some(self.name.clone()),
                    message: format!("Simulated failure entering {}", target),
                    debug: None,
                });
                return Err(Error::StateChange {
                    state: target,
                    reason: "simulated state change failure".to_string(),
                });
            }

            let script = if target > LifecycleState::Null {
                match Self::script(&inner.stages, &self.media) {
                    Ok(script) => Some(script),
                    Err((source, message)) => {
                        self.emit(SessionEvent::Error {
                            source,
                            message: message.clone(),
                            debug: None,
                        });
                        return Err(Error::StateChange {
                            state: target,
                            reason: message,
                        });
                    }
                }
            } else {
                None
            };

            inner.state = target;
            (from, inner.stages.clone(), script)
        };

        if from != target {
            self.emit(SessionEvent::StateChanged { from, to: target });
        }

        let Some(script) = script else {
            return Ok(());
        };

        // Discovery happens while prerolling, outside the graph lock so
        // handlers can link and post freely.
        let discover = target >= LifecycleState::Paused && !std::mem::replace(&mut lock(&self.inner).discovered, true);
        if discover {
            for demuxer in stages.iter().filter(|s| s.inner.template.dynamic_outputs) {
                for media_type in script.streams() {
                    demuxer.discover_output(Caps::of(media_type));
                }
            }
        }

        let finish = target == LifecycleState::Playing && !std::mem::replace(&mut lock(&self.inner).finished, true);
        if finish {
            let demuxer = stages
                .iter()
                .find(|s| s.inner.template.dynamic_outputs)
                .map(Stage::name);
            match &script.ending {
                Ending::EndOfStream if Self::all_sinks_fed(&stages) => self.emit(SessionEvent::EndOfStream),
                Ending::EndOfStream => debug!("{}: not every sink is linked, stream stalls", self.name),
                Ending::Error(message) => {
                    self.emit(SessionEvent::Error {
                        source: demuxer,
                        message: message.clone(),
                        debug: Some("simulated media error".to_string()),
                    });
                    self.emit(SessionEvent::EndOfStream);
                }
                Ending::Never => {}
            }
        }

        Ok(())
    }

    fn subscribe(&self) -> Result<SimEvents> {
        let receiver = lock(&self.receiver)
            .take()
            .ok_or_else(|| Error::Backend(format!("{}: event channel already subscribed", self.name)))?;

        Ok(SimEvents {
            stream: UnboundedReceiverStream::new(receiver),
            _token: ResourceToken::subscription(&self.counters),
        })
    }
}

/// Session event subscription of a [`SimGraph`]
pub struct SimEvents {
    stream: UnboundedReceiverStream<SessionEvent>,
    _token: ResourceToken,
}

impl Stream for SimEvents {
    type Item = SessionEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<SessionEvent>> {
        Pin::new(&mut self.stream).poll_next(cx)
    }
}
