//! End-to-end playback sessions over the simulated runtime
//!
//! Every test checks that no stage or event subscription survives the
//! session, whichever way it ended.

mod helpers;

use helpers::{assert_released, runtime, AUDIO_ONLY, CLIP, CORRUPT, ENDLESS, EXTRA_STREAM, MISSING};
use oggplay::cli::parse_args;
use oggplay::config::PipelineConfig;
use oggplay::playback::{
    play, Discovery, DrainOutcome, GraphBuilder, LifecycleState, PlaybackSession,
};
use oggplay::runtime::LinkOutcome;
use oggplay::Error;
use std::future::pending;
use std::path::Path;
use std::time::Duration;

#[test]
fn test_zero_arguments_builds_nothing() {
    let runtime = runtime();
    let result = parse_args(["oggplay"]);

    match result {
        Err(err @ Error::BadInvocation(_)) => {
            assert!(err.to_string().contains("Usage"));
            assert_eq!(err.exit_code(), 255);
        }
        other => panic!("Expected BadInvocation, got {:?}", other),
    }
    assert_released(&runtime);
}

#[tokio::test]
async fn test_clip_plays_to_end_of_stream() {
    let runtime = runtime();
    let config = PipelineConfig::default();

    let report = play(&runtime, &config, Path::new(CLIP), pending())
        .await
        .expect("Playback failed");

    assert_eq!(report.outcome, DrainOutcome::EndOfStream);
    assert!(report.unlinked_branches.is_empty());
    let branches: Vec<_> = report.discoveries.iter().filter_map(Discovery::branch).collect();
    assert_eq!(branches, vec!["video", "audio"]);
    assert_released(&runtime);
}

#[tokio::test]
async fn test_session_returns_to_null_after_end_of_stream() {
    let runtime = runtime();
    let config = PipelineConfig::default();
    let pipeline = GraphBuilder::new(&runtime, &config)
        .build(Path::new(CLIP))
        .unwrap();
    let mut session = PlaybackSession::new(pipeline).unwrap();

    session.start().unwrap();
    assert_eq!(session.state(), LifecycleState::Playing);

    let outcome = session.run(pending()).await.unwrap();
    assert_eq!(outcome, DrainOutcome::EndOfStream);

    session.stop().unwrap();
    assert_eq!(session.state(), LifecycleState::Null);
    assert_eq!(session.pipeline().graph().state(), LifecycleState::Null);

    session.teardown().unwrap();
    assert_released(&runtime);
}

#[tokio::test]
async fn test_corrupt_file_reports_runtime_error() {
    let runtime = runtime();
    let config = PipelineConfig::default();

    let result = play(&runtime, &config, Path::new(CORRUPT), pending()).await;

    match result {
        Err(err @ Error::Runtime { .. }) => {
            assert_eq!(
                err.to_string(),
                format!("Error from ogg-demuxer: {}", helpers::media::CORRUPT_MESSAGE)
            );
            assert_eq!(err.exit_code(), 1);
        }
        other => panic!("Expected Runtime error, got {:?}", other),
    }
    assert_released(&runtime);
}

#[tokio::test]
async fn test_unknown_file_fails_at_startup() {
    let runtime = runtime();
    let config = PipelineConfig::default();

    let result = play(&runtime, &config, Path::new(MISSING), pending()).await;

    match result {
        Err(Error::StartupFailure { state, reason }) => {
            assert_eq!(state, LifecycleState::Ready);
            assert!(reason.contains("Resource not found"), "reason: {}", reason);
        }
        other => panic!("Expected StartupFailure, got {:?}", other),
    }
    assert_released(&runtime);
}

#[tokio::test]
async fn test_refused_playing_transition_is_startup_failure() {
    let runtime = runtime().fail_transition_to(LifecycleState::Playing);
    let config = PipelineConfig::default();

    let result = play(&runtime, &config, Path::new(CLIP), pending()).await;

    match result {
        Err(err @ Error::StartupFailure { .. }) => {
            assert!(matches!(
                err,
                Error::StartupFailure {
                    state: LifecycleState::Playing,
                    ..
                }
            ));
            assert_eq!(err.exit_code(), 1);
        }
        other => panic!("Expected StartupFailure, got {:?}", other),
    }
    assert_released(&runtime);
}

#[tokio::test]
async fn test_missing_stage_type_aborts_before_graph() {
    let runtime = runtime().without("videobalance");
    let config = PipelineConfig::default();

    let result = play(&runtime, &config, Path::new(CLIP), pending()).await;

    match result {
        Err(err @ Error::StageCreation { .. }) => assert_eq!(err.exit_code(), 255),
        other => panic!("Expected StageCreation, got {:?}", other),
    }
    assert_released(&runtime);
}

#[tokio::test]
async fn test_unfed_branch_stalls_until_interrupted() {
    let runtime = runtime();
    let config = PipelineConfig::default();

    let report = play(
        &runtime,
        &config,
        Path::new(AUDIO_ONLY),
        tokio::time::sleep(Duration::from_millis(50)),
    )
    .await
    .expect("Interrupted playback is not an error");

    assert_eq!(report.outcome, DrainOutcome::Interrupted);
    assert_eq!(report.unlinked_branches, vec!["video"]);
    assert_released(&runtime);
}

#[tokio::test]
async fn test_interrupt_stops_endless_playback() {
    let runtime = runtime();
    let config = PipelineConfig::default();

    let report = play(&runtime, &config, Path::new(ENDLESS), async {})
        .await
        .unwrap();

    assert_eq!(report.outcome, DrainOutcome::Interrupted);
    assert!(report.unlinked_branches.is_empty());
    assert_released(&runtime);
}

#[tokio::test]
async fn test_unaccepted_stream_is_reported_not_fatal() {
    let runtime = runtime();
    let config = PipelineConfig::default();

    let report = play(&runtime, &config, Path::new(EXTRA_STREAM), pending())
        .await
        .unwrap();

    assert_eq!(report.outcome, DrainOutcome::EndOfStream);
    assert!(report.unlinked_branches.is_empty());
    match report.discoveries.last() {
        Some(Discovery::Unlinked {
            media_type,
            attempts,
            ..
        }) => {
            assert_eq!(media_type.as_deref(), Some("application/x-kate"));
            assert!(attempts
                .iter()
                .all(|(_, outcome)| *outcome != LinkOutcome::Linked));
        }
        other => panic!("Expected an unlinked discovery, got {:?}", other),
    }
    assert_released(&runtime);
}
