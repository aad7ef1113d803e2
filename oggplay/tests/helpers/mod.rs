//! Test helpers for oggplay integration tests
//!
//! Provides a simulated runtime preloaded with scripted media files and
//! assertions on the resources it tracks.

#![allow(dead_code)]

pub mod logging;
pub mod media;

pub use logging::ErrorCount;
pub use media::{
    assert_released, runtime, AUDIO_ONLY, CLIP, CORRUPT, ENDLESS, EXTRA_STREAM, MISSING,
};
