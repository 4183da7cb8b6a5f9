//! # KESTREL Runner
//!
//! Builds the configured worlds and runs them on wall-clock time.
//!
//! ```bash
//! # Built-in defaults
//! ./kestrel
//!
//! # From a config file
//! ./kestrel kestrel.toml
//! ```

use std::process::ExitCode;
use std::time::Duration;

use kestrel::demo::{build_application, run_for, TextRenderSystem};
use kestrel::{telemetry, AppConfig, AppResult};
use tracing::info;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("kestrel: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> AppResult<()> {
    let config = match std::env::args_os().nth(1) {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    telemetry::init(config.log_level, None)?;

    info!(
        worlds = config.worlds.len(),
        fixed_time_step = config.fixed_time_step,
        run_seconds = config.run_seconds,
        "starting"
    );

    let run_duration = config.run_duration()?;
    let mut app = build_application(&config);
    let summary = run_for(
        &mut app,
        run_duration,
        Duration::from_millis(config.frame_sleep_ms),
    );

    for (index, world) in app.worlds().iter().enumerate() {
        let frames = world
            .get_system::<TextRenderSystem>()
            .map_or(0, |renderer| renderer.stats().frames);
        info!(
            world = index,
            entities = world.entity_count(),
            active_entities = world.active_entity_count(),
            rendered_frames = frames,
            "world summary"
        );
    }

    println!(
        "kestrel: {} ticks, {:.2}s simulated, {} of {} worlds still active",
        summary.ticks,
        summary.global_time,
        summary.active_worlds,
        app.worlds().len()
    );
    Ok(())
}
