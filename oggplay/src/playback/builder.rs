//! Playback graph construction
//!
//! Builds the Ogg playback topology:
//!
//! ```text
//! source -> demuxer -?-> video decoder -> queue -> effect -> convert -> video sink
//!                   \-?-> audio decoder -> queue -> convert -> audio sink
//! ```
//!
//! The `-?->` edges do not exist at build time. The demuxer creates its
//! output ports once it has read the container, and the [`DynamicLinker`]
//! attached here links them to the decoders.

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::playback::linker::DynamicLinker;
use crate::playback::registry::StageRegistry;
use crate::runtime::{Graph, MediaRuntime, PropertyValue, Stage};
use std::path::Path;
use tracing::{debug, info};

/// Property of the source stage holding the file path
pub const LOCATION_PROPERTY: &str = "location";

/// Property of the video effect stage holding the color saturation
pub const SATURATION_PROPERTY: &str = "saturation";

/// Stages of the video branch, in data-flow order
#[derive(Debug, Clone)]
pub struct VideoBranch<S> {
    pub decoder: S,
    pub queue: S,
    pub effect: S,
    pub convert: S,
    pub sink: S,
}

impl<S> VideoBranch<S> {
    pub fn chain(&self) -> [&S; 5] {
        [&self.decoder, &self.queue, &self.effect, &self.convert, &self.sink]
    }
}

/// Stages of the audio branch, in data-flow order
#[derive(Debug, Clone)]
pub struct AudioBranch<S> {
    pub decoder: S,
    pub queue: S,
    pub convert: S,
    pub sink: S,
}

impl<S> AudioBranch<S> {
    pub fn chain(&self) -> [&S; 4] {
        [&self.decoder, &self.queue, &self.convert, &self.sink]
    }
}

/// Every stage of the playback graph, by role
#[derive(Debug, Clone)]
pub struct StageSet<S> {
    pub source: S,
    pub demuxer: S,
    pub video: VideoBranch<S>,
    pub audio: AudioBranch<S>,
}

impl<S> StageSet<S> {
    /// Arrange stages created in `StageLayout::roles()` order
    fn from_roles(stages: Vec<S>) -> Result<Self> {
        let count = stages.len();
        let [source, demuxer, video_decoder, video_convert, video_effect, video_sink, audio_decoder, audio_convert, audio_sink, video_queue, audio_queue]: [S; 11] =
            stages.try_into().map_err(|_| {
                Error::Backend(format!("expected 11 stages, registry returned {}", count))
            })?;

        Ok(Self {
            source,
            demuxer,
            video: VideoBranch {
                decoder: video_decoder,
                queue: video_queue,
                effect: video_effect,
                convert: video_convert,
                sink: video_sink,
            },
            audio: AudioBranch {
                decoder: audio_decoder,
                queue: audio_queue,
                convert: audio_convert,
                sink: audio_sink,
            },
        })
    }

    pub fn all(&self) -> Vec<&S> {
        let mut all = vec![&self.source, &self.demuxer];
        all.extend(self.video.chain());
        all.extend(self.audio.chain());
        all
    }
}

/// A fully built playback graph.
///
/// Holds the graph, its stages and the linker waiting for demuxer outputs.
/// The graph is still in the Null state; `PlaybackSession` drives it.
pub struct PlaybackPipeline<R: MediaRuntime> {
    linker: DynamicLinker<R::Stage>,
    stages: StageSet<R::Stage>,
    graph: R::Graph,
}

impl<R: MediaRuntime> PlaybackPipeline<R> {
    pub fn graph(&self) -> &R::Graph {
        &self.graph
    }

    pub fn stages(&self) -> &StageSet<R::Stage> {
        &self.stages
    }

    pub fn linker(&self) -> &DynamicLinker<R::Stage> {
        &self.linker
    }
}

/// Builds a [`PlaybackPipeline`] from a [`PipelineConfig`]
pub struct GraphBuilder<'a, R: MediaRuntime> {
    runtime: &'a R,
    config: &'a PipelineConfig,
}

impl<'a, R: MediaRuntime> GraphBuilder<'a, R> {
    pub fn new(runtime: &'a R, config: &'a PipelineConfig) -> Self {
        Self { runtime, config }
    }

    /// Build the playback graph for the file at `location`.
    ///
    /// Every stage is created before anything is linked; if any creation
    /// fails the error lists all failures and nothing is left allocated.
    pub fn build(&self, location: &Path) -> Result<PlaybackPipeline<R>> {
        let layout = &self.config.stages;
        info!("Creating pipeline for: {}", location.display());

        let mut registry = StageRegistry::new(self.runtime);
        let stages = StageSet::from_roles(registry.create_all(&layout.roles())?)?;

        let path = location.to_str().ok_or_else(|| Error::Property {
            stage: stages.source.name(),
            property: LOCATION_PROPERTY.to_string(),
            reason: format!("path is not valid UTF-8: {}", location.display()),
        })?;
        stages
            .source
            .set_property(LOCATION_PROPERTY, &PropertyValue::from(path))?;
        stages.video.effect.set_property(
            SATURATION_PROPERTY,
            &PropertyValue::from(self.config.effect.saturation),
        )?;
        debug!(
            "{} = {}, {} = {}",
            LOCATION_PROPERTY, path, SATURATION_PROPERTY, self.config.effect.saturation
        );

        let graph = self.runtime.create_graph(&self.config.graph_name)?;
        for stage in stages.all() {
            graph.add(stage)?;
        }

        link_chain(&[&stages.source, &stages.demuxer])?;
        link_chain(&stages.video.chain())?;
        link_chain(&stages.audio.chain())?;

        let linker = DynamicLinker::attach(&stages.demuxer);
        linker.register("video", &stages.video.decoder);
        linker.register("audio", &stages.audio.decoder);

        info!(
            "Pipeline '{}' built with {} stages",
            graph.name(),
            stages.all().len()
        );

        Ok(PlaybackPipeline {
            linker,
            stages,
            graph,
        })
    }
}

fn link_chain<S: Stage>(chain: &[&S]) -> Result<()> {
    for pair in chain.windows(2) {
        pair[0].link(pair[1])?;
        debug!("Linked {} -> {}", pair[0].name(), pair[1].name());
    }
    Ok(())
}
