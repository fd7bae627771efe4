pub mod playback;
pub mod presentation;
pub mod script;
pub mod settings;
pub mod terminal;

use anyhow::{Context, Result};
use log::info;

use playback::{PlaybackController, TokioClock};
use settings::CliArgs;
use std::sync::Arc;

pub fn run() -> Result<()> {
    let level = if settings::debug_enabled() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    // RUST_LOG still wins over the default level.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let cli = CliArgs::parse(std::env::args().skip(1))?;
    let settings = cli.resolve_settings()?;
    let script = settings.load_script()?;

    info!(
        "storyline starting: {} segments over {}ms, frame every {}ms",
        script.len(),
        script.total_duration_ms(),
        settings.frame_interval_ms
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(async move {
        let controller =
            PlaybackController::with_clock(script, Arc::new(TokioClock), settings.frame_interval());
        terminal::run_player(controller, &settings).await
    })
}
