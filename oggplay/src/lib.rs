//! # oggplay
//!
//! Plays an Ogg file holding Theora video and Vorbis audio through a media
//! graph: file source, Ogg demultiplexer, one decoder branch per stream, a
//! color saturation effect on the video branch, and platform sinks.
//!
//! **Architecture:** stages are created through a [`runtime::MediaRuntime`];
//! the GStreamer backend (feature `gstreamer`) drives real media, the
//! simulated backend (feature `sim`) drives scripted media for tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod playback;
pub mod runtime;
pub mod shutdown;

pub use error::{Error, Result};
