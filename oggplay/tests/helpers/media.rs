//! Scripted media files for the simulated runtime

use oggplay::runtime::sim::{Ending, MediaScript, SimRuntime};

/// One Theora and one Vorbis stream, ends normally
pub const CLIP: &str = "/media/test/clip.ogg";

/// Demultiplexing fails once playback starts
pub const CORRUPT: &str = "/media/test/corrupt.ogg";

/// Vorbis only; the video branch never receives data
pub const AUDIO_ONLY: &str = "/media/test/audio-only.ogg";

/// Theora, Vorbis and a Kate subtitle stream no decoder accepts
pub const EXTRA_STREAM: &str = "/media/test/subtitled.ogg";

/// Never ends on its own
pub const ENDLESS: &str = "/media/test/endless.ogg";

/// Not known to the runtime at all
pub const MISSING: &str = "/media/test/missing.ogg";

pub const CORRUPT_MESSAGE: &str = "Could not demultiplex stream.";

/// Simulated runtime knowing every file above except [`MISSING`]
pub fn runtime() -> SimRuntime {
    SimRuntime::new()
        .with_media(CLIP, MediaScript::theora_vorbis())
        .with_media(
            CORRUPT,
            MediaScript::theora_vorbis().ending(Ending::Error(CORRUPT_MESSAGE.to_string())),
        )
        .with_media(AUDIO_ONLY, MediaScript::new(["audio/x-vorbis"]))
        .with_media(
            EXTRA_STREAM,
            MediaScript::new(["video/x-theora", "audio/x-vorbis", "application/x-kate"]),
        )
        .with_media(ENDLESS, MediaScript::theora_vorbis().ending(Ending::Never))
}

/// No stage and no event subscription is left alive
pub fn assert_released(runtime: &SimRuntime) {
    assert_eq!(runtime.live_stages(), 0, "stages still alive");
    assert_eq!(runtime.active_subscriptions(), 0, "event subscription still active");
}
