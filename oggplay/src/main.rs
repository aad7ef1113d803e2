//! oggplay - plays an Ogg Theora/Vorbis file through GStreamer
//!
//! The video branch passes through a color saturation effect (grayscale by
//! default). Exit codes: 0 after end-of-stream, 130 when interrupted, 255 for
//! construction failures, 1 for failures after the graph was built.

use std::process::ExitCode;

use anyhow::Context;
use oggplay::cli::{self, Args, Invocation};
use oggplay::config::PlayerConfig;
use oggplay::playback::{self, DrainOutcome};
use oggplay::runtime::gst_runtime::GstRuntime;
use oggplay::shutdown::ShutdownSignal;
use tracing::{error, info};

/// Exit code after Ctrl+C / SIGTERM (128 + SIGINT)
const EXIT_INTERRUPTED: u8 = 130;

/// Exit code when the configuration cannot be used
const EXIT_CONFIG: u8 = 255;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match cli::parse_args(std::env::args_os()) {
        Ok(Invocation::Play(args)) => args,
        Ok(Invocation::Info(text)) => {
            print!("{}", text);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprint!("{}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    // Before any construction work, so an early Ctrl+C is not lost
    let shutdown = match ShutdownSignal::install() {
        Ok(shutdown) => shutdown,
        Err(e) => {
            eprintln!("Error: failed to install signal handlers: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    init_tracing(&config.logging.level);

    // Build identification first, before GStreamer initialization
    info!(
        "Starting oggplay v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let runtime = match GstRuntime::init() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    match playback::play(&runtime, &config.pipeline, &args.file, shutdown.recv()).await {
        Ok(report) if report.outcome == DrainOutcome::Interrupted => ExitCode::from(EXIT_INTERRUPTED),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// Load the config file and apply command-line overrides
fn load_config(args: &Args) -> anyhow::Result<PlayerConfig> {
    let mut config =
        PlayerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    if let Some(saturation) = args.saturation {
        config.pipeline.effect.saturation = saturation;
        config.validate().context("Invalid --saturation")?;
    }

    Ok(config)
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("oggplay={level},oggplay_common={level}").into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
