//! Configuration for the oggplay player
//!
//! Loaded from an optional TOML file (see `oggplay_common::config` for the
//! resolution order). Every field has a built-in default, so an empty or
//! missing file yields the stock Theora/Vorbis pipeline with a grayscale
//! video effect.
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [pipeline]
//! graph_name = "audio-player"
//!
//! [pipeline.effect]
//! saturation = 0.0
//!
//! [pipeline.stages.video_sink]
//! kind = "ximagesink"
//! name = "video-output"
//! ```

use crate::error::Result;
use oggplay_common::{ConfigResolver, LoggingConfig};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Application name used for config file lookup
pub const APP_NAME: &str = "oggplay";

/// Valid range of the video effect's saturation
pub const SATURATION_RANGE: std::ops::RangeInclusive<f64> = 0.0..=2.0;

/// Top-level configuration file layout
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    pub logging: LoggingConfig,
    pub pipeline: PipelineConfig,
}

impl PlayerConfig {
    /// Resolve, load and validate the configuration
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let config: PlayerConfig = ConfigResolver::new(APP_NAME).load_or_default(cli_path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()
    }
}

/// Parameters of the playback graph
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Name of the graph (pipeline) holding every stage
    pub graph_name: String,
    pub stages: StageLayout,
    pub effect: EffectConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            graph_name: "audio-player".to_string(),
            stages: StageLayout::default(),
            effect: EffectConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.graph_name.trim().is_empty() {
            return Err(invalid("pipeline.graph_name must not be empty"));
        }

        let mut names = HashSet::new();
        for (role, spec) in self.stages.roles() {
            if spec.kind.trim().is_empty() {
                return Err(invalid(&format!("stage kind for {} must not be empty", role)));
            }
            if spec.name.trim().is_empty() {
                return Err(invalid(&format!("stage name for {} must not be empty", role)));
            }
            if !names.insert(spec.name.as_str()) {
                return Err(invalid(&format!("stage name '{}' is used more than once", spec.name)));
            }
        }

        self.effect.validate()
    }
}

fn invalid(message: &str) -> crate::Error {
    oggplay_common::Error::Config(message.to_string()).into()
}

/// Stage type and instance name for one role in the graph
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StageSpec {
    /// Type identifier understood by the media runtime
    pub kind: String,
    /// Instance name, unique within the graph
    pub name: String,
}

impl StageSpec {
    pub fn new(kind: &str, name: &str) -> Self {
        Self {
            kind: kind.to_string(),
            name: name.to_string(),
        }
    }
}

/// One stage spec per role of the Ogg playback graph
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StageLayout {
    pub source: StageSpec,
    pub demuxer: StageSpec,
    pub video_decoder: StageSpec,
    pub video_queue: StageSpec,
    pub video_effect: StageSpec,
    pub video_convert: StageSpec,
    pub video_sink: StageSpec,
    pub audio_decoder: StageSpec,
    pub audio_queue: StageSpec,
    pub audio_convert: StageSpec,
    pub audio_sink: StageSpec,
}

impl Default for StageLayout {
    fn default() -> Self {
        Self {
            source: StageSpec::new("filesrc", "file-source"),
            demuxer: StageSpec::new("oggdemux", "ogg-demuxer"),
            video_decoder: StageSpec::new("theoradec", "theora-decoder"),
            video_queue: StageSpec::new("queue", "queue-video"),
            video_effect: StageSpec::new("videobalance", "video-effect"),
            video_convert: StageSpec::new("videoconvert", "vconverter"),
            video_sink: StageSpec::new("autovideosink", "video-output"),
            audio_decoder: StageSpec::new("vorbisdec", "vorbis-decoder"),
            audio_queue: StageSpec::new("queue", "queue-audio"),
            audio_convert: StageSpec::new("audioconvert", "aconverter"),
            audio_sink: StageSpec::new("autoaudiosink", "audio-output"),
        }
    }
}

impl StageLayout {
    /// Every (role, spec) pair in creation order
    pub fn roles(&self) -> [(&'static str, &StageSpec); 11] {
        [
            ("source", &self.source),
            ("demuxer", &self.demuxer),
            ("video decoder", &self.video_decoder),
            ("video convert", &self.video_convert),
            ("video effect", &self.video_effect),
            ("video sink", &self.video_sink),
            ("audio decoder", &self.audio_decoder),
            ("audio convert", &self.audio_convert),
            ("audio sink", &self.audio_sink),
            ("video queue", &self.video_queue),
            ("audio queue", &self.audio_queue),
        ]
    }
}

/// Settings of the video effect stage
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct EffectConfig {
    /// Color saturation applied to every video frame.
    ///
    /// 0.0 renders grayscale, 1.0 leaves colors unchanged, 2.0 doubles them.
    /// Default: 0.0
    pub saturation: f64,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self { saturation: 0.0 }
    }
}

impl EffectConfig {
    pub fn validate(&self) -> Result<()> {
        if !SATURATION_RANGE.contains(&self.saturation) {
            return Err(invalid(&format!(
                "effect saturation {} outside {:?}",
                self.saturation, SATURATION_RANGE
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_describe_theora_vorbis_pipeline() {
        let config = PlayerConfig::default();
        assert_eq!(config.pipeline.graph_name, "audio-player");
        assert_eq!(config.pipeline.stages.demuxer.kind, "oggdemux");
        assert_eq!(config.pipeline.stages.video_effect.kind, "videobalance");
        assert_eq!(config.pipeline.effect.saturation, 0.0);
        assert_eq!(config.logging.level, "info");
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: PlayerConfig = toml::from_str(
            r#"
            [pipeline.effect]
            saturation = 0.5

            [pipeline.stages.video_sink]
            kind = "fakesink"
            name = "video-output"
            "#,
        )
        .unwrap();

        assert_eq!(config.pipeline.effect.saturation, 0.5);
        assert_eq!(config.pipeline.stages.video_sink.kind, "fakesink");
        assert_eq!(config.pipeline.stages.audio_sink.kind, "autoaudiosink");
        config.validate().unwrap();
    }

    #[test]
    fn test_saturation_out_of_range_rejected() {
        let mut config = PipelineConfig::default();
        config.effect.saturation = 2.5;
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));

        config.effect.saturation = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_stage_names_rejected() {
        let mut config = PipelineConfig::default();
        config.stages.audio_queue.name = config.stages.video_queue.name.clone();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("queue-video"));
    }

    #[test]
    fn test_empty_kind_rejected() {
        let mut config = PipelineConfig::default();
        config.stages.source.kind = String::new();
        assert!(config.validate().is_err());
    }
}
