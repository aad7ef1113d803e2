//! Dynamic linking of demultiplexer outputs
//!
//! The demultiplexer only knows its elementary streams once it has read the
//! container, so its output ports appear while the graph prerolls. The
//! [`DynamicLinker`] observes those discoveries and links each new port to the
//! input of the first registered decoder that accepts it.
//!
//! A port that no decoder accepts is reported as a warning session event:
//! the branch waiting for it would otherwise stall without ever producing
//! end-of-stream or an error.

use crate::runtime::{lock, LinkOutcome, Port, Stage};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Name of the decoder input port discovered outputs are linked to
pub const DECODER_INPUT: &str = "sink";

/// What happened to one discovered output port
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    /// Linked to the decoder of `branch`
    Linked {
        branch: String,
        port: String,
        media_type: Option<String>,
    },
    /// No registered decoder accepted the port
    Unlinked {
        port: String,
        media_type: Option<String>,
        /// Outcome per branch, in registration order
        attempts: Vec<(String, LinkOutcome)>,
    },
}

impl Discovery {
    pub fn branch(&self) -> Option<&str> {
        match self {
            Discovery::Linked { branch, .. } => Some(branch),
            Discovery::Unlinked { .. } => None,
        }
    }
}

#[derive(Clone)]
struct LinkTarget<S> {
    branch: String,
    decoder: S,
}

struct LinkerState<S> {
    targets: Mutex<Vec<LinkTarget<S>>>,
    discoveries: Mutex<Vec<Discovery>>,
}

impl<S: Stage> LinkerState<S> {
    fn on_output_discovered(&self, demuxer: &S, port: &S::Port) -> Discovery {
        let media_type = port.media_type();
        info!(
            "Dynamic pad created, linking demuxer/decoder: {}:{} ({})",
            demuxer.name(),
            port.name(),
            media_type.as_deref().unwrap_or("unknown type")
        );

        let targets = lock(&self.targets).clone();
        let mut attempts = Vec::with_capacity(targets.len());

        for target in targets {
            let outcome = match target.decoder.static_input(DECODER_INPUT) {
                Some(input) => port.link(&input),
                None => LinkOutcome::Refused(format!(
                    "{} has no '{}' port",
                    target.decoder.name(),
                    DECODER_INPUT
                )),
            };

            if outcome.is_linked() {
                info!(
                    "Linked {}:{} to {} ({} branch)",
                    demuxer.name(),
                    port.name(),
                    target.decoder.name(),
                    target.branch
                );
                let discovery = Discovery::Linked {
                    branch: target.branch,
                    port: port.name(),
                    media_type,
                };
                lock(&self.discoveries).push(discovery.clone());
                return discovery;
            }

            debug!(
                "{}:{} not linked to {}: {}",
                demuxer.name(),
                port.name(),
                target.decoder.name(),
                outcome
            );
            attempts.push((target.branch, outcome));
        }

        let summary = attempts
            .iter()
            .map(|(branch, outcome)| format!("{}: {}", branch, outcome))
            .collect::<Vec<_>>()
            .join(", ");
        let message = format!(
            "Stream {} ({}) was not linked to any decoder [{}]",
            port.name(),
            media_type.as_deref().unwrap_or("unknown type"),
            summary
        );
        warn!("{}", message);
        demuxer.post_warning(&message);

        let discovery = Discovery::Unlinked {
            port: port.name(),
            media_type,
            attempts,
        };
        lock(&self.discoveries).push(discovery.clone());
        discovery
    }
}

/// Observer linking discovered demultiplexer outputs to waiting decoders
pub struct DynamicLinker<S: Stage> {
    demuxer: String,
    state: Arc<LinkerState<S>>,
}

impl<S: Stage> DynamicLinker<S> {
    /// Subscribe to output discovery on `demuxer`
    pub fn attach(demuxer: &S) -> Self {
        let state = Arc::new(LinkerState {
            targets: Mutex::new(Vec::new()),
            discoveries: Mutex::new(Vec::new()),
        });

        let observer = state.clone();
        demuxer.connect_output_discovered(Box::new(move |demuxer: &S, port: &S::Port| {
            observer.on_output_discovered(demuxer, port);
        }));

        Self {
            demuxer: demuxer.name(),
            state,
        }
    }

    /// Add `decoder` as a candidate for discovered outputs.
    ///
    /// Candidates are tried in registration order.
    pub fn register(&self, branch: &str, decoder: &S) {
        debug!(
            "{}: {} branch waits on {}",
            self.demuxer,
            branch,
            decoder.name()
        );
        lock(&self.state.targets).push(LinkTarget {
            branch: branch.to_string(),
            decoder: decoder.clone(),
        });
    }

    pub fn discoveries(&self) -> Vec<Discovery> {
        lock(&self.state.discoveries).clone()
    }

    /// Registered branches that received a stream, in registration order
    pub fn linked_branches(&self) -> Vec<String> {
        let discoveries = lock(&self.state.discoveries);
        lock(&self.state.targets)
            .iter()
            .filter(|t| discoveries.iter().any(|d| d.branch() == Some(t.branch.as_str())))
            .map(|t| t.branch.clone())
            .collect()
    }

    /// Registered branches that never received a stream
    pub fn unlinked_branches(&self) -> Vec<String> {
        let linked = self.linked_branches();
        lock(&self.state.targets)
            .iter()
            .filter(|t| !linked.contains(&t.branch))
            .map(|t| t.branch.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::events::SessionEvent;
    use crate::runtime::sim::{Caps, SimRuntime, SimStage};
    use crate::runtime::{Graph, MediaRuntime};
    use futures::StreamExt;

    struct Fixture {
        _graph: crate::runtime::sim::SimGraph,
        demuxer: SimStage,
        video: SimStage,
        audio: SimStage,
        linker: DynamicLinker<SimStage>,
    }

    fn fixture(runtime: &SimRuntime) -> Fixture {
        let graph = runtime.create_graph("test").unwrap();
        let demuxer = runtime.create_stage("oggdemux", "ogg-demuxer").unwrap();
        let video = runtime.create_stage("theoradec", "theora-decoder").unwrap();
        let audio = runtime.create_stage("vorbisdec", "vorbis-decoder").unwrap();
        for stage in [&demuxer, &video, &audio] {
            graph.add(stage).unwrap();
        }

        let linker = DynamicLinker::attach(&demuxer);
        linker.register("video", &video);
        linker.register("audio", &audio);

        Fixture {
            _graph: graph,
            demuxer,
            video,
            audio,
            linker,
        }
    }

    #[test]
    fn test_each_stream_links_to_its_own_decoder() {
        let runtime = SimRuntime::new();
        let f = fixture(&runtime);

        // Audio first, so registration order alone cannot explain the result
        f.demuxer.discover_output(Caps::of("audio/x-vorbis"));
        f.demuxer.discover_output(Caps::of("video/x-theora"));

        assert_eq!(f.audio.upstream_of("sink").as_deref(), Some("ogg-demuxer"));
        assert_eq!(f.video.upstream_of("sink").as_deref(), Some("ogg-demuxer"));

        let ports = f.demuxer.output_ports();
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0].peer().and_then(|p| p.owner_name()).as_deref(), Some("vorbis-decoder"));
        assert_eq!(ports[1].peer().and_then(|p| p.owner_name()).as_deref(), Some("theora-decoder"));

        let branches: Vec<_> = f
            .linker
            .discoveries()
            .iter()
            .filter_map(|d| d.branch().map(str::to_string))
            .collect();
        assert_eq!(branches, vec!["audio", "video"]);
        assert_eq!(f.linker.linked_branches(), vec!["video", "audio"]);
        assert!(f.linker.unlinked_branches().is_empty());
    }

    #[tokio::test]
    async fn test_unaccepted_stream_posts_warning() {
        let runtime = SimRuntime::new();
        let graph = runtime.create_graph("test").unwrap();
        let mut events = graph.subscribe().unwrap();
        let demuxer = runtime.create_stage("oggdemux", "ogg-demuxer").unwrap();
        let video = runtime.create_stage("theoradec", "theora-decoder").unwrap();
        graph.add(&demuxer).unwrap();
        graph.add(&video).unwrap();

        let linker = DynamicLinker::attach(&demuxer);
        linker.register("video", &video);

        demuxer.discover_output(Caps::of("audio/x-vorbis"));

        match linker.discoveries().as_slice() {
            [Discovery::Unlinked { attempts, media_type, .. }] => {
                assert_eq!(media_type.as_deref(), Some("audio/x-vorbis"));
                assert_eq!(attempts, &vec![("video".to_string(), LinkOutcome::CapabilityMismatch)]);
            }
            other => panic!("Expected one unlinked discovery, got {:?}", other),
        }
        assert_eq!(linker.unlinked_branches(), vec!["video"]);

        match events.next().await {
            Some(SessionEvent::Warning { source, message }) => {
                assert_eq!(source.as_deref(), Some("ogg-demuxer"));
                assert!(message.contains("audio/x-vorbis"));
            }
            other => panic!("Expected warning event, got {:?}", other),
        }
    }

    #[test]
    fn test_second_stream_of_same_type_reports_already_linked() {
        let runtime = SimRuntime::new();
        let f = fixture(&runtime);

        f.demuxer.discover_output(Caps::of("video/x-theora"));
        f.demuxer.discover_output(Caps::of("video/x-theora"));

        let discoveries = f.linker.discoveries();
        assert_eq!(discoveries.len(), 2);
        assert_eq!(discoveries[0].branch(), Some("video"));
        match &discoveries[1] {
            Discovery::Unlinked { attempts, .. } => {
                assert_eq!(attempts[0], ("video".to_string(), LinkOutcome::AlreadyLinked));
                assert_eq!(attempts[1], ("audio".to_string(), LinkOutcome::CapabilityMismatch));
            }
            other => panic!("Expected Unlinked, got {:?}", other),
        }
        assert_eq!(f.linker.unlinked_branches(), vec!["audio"]);
    }
}
