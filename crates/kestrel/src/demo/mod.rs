//! # Demo Plug-ins
//!
//! A small simulation that exercises the runtime end to end:
//!
//! ```text
//! AppConfig ──> build_application ──> Application
//!                  │                    ├─ World 0: Movement, Lifetime?, TextRender?
//!                  │                    └─ World 1: ...
//!                  └─ populate_world (seeded)
//!
//! run_for: tick until quit (after run_seconds) or every world finished
//! ```

pub mod components;
pub mod spawn;
pub mod systems;

use std::thread;
use std::time::{Duration, Instant};

use kestrel_core::Application;
use tracing::{debug, info};

pub use components::{Lifetime, Position, Velocity};
pub use spawn::{populate_world, Population};
pub use systems::{LifetimeSystem, MovementSystem, RenderStats, TextRenderSystem};

use crate::config::AppConfig;

/// Builds an application with one populated world per configured entry.
#[must_use]
pub fn build_application(config: &AppConfig) -> Application {
    let mut app = Application::new(config.worlds.len());
    app.set_fixed_time_step(config.fixed_time_step);

    for (index, world_config) in config.worlds.iter().enumerate() {
        let capacity = world_config.entity_capacity.max(world_config.entity_total());
        let world = app.add_world_with_capacity(capacity);
        let population = populate_world(world, world_config);
        debug!(
            world = index,
            entities = population.len(),
            systems = world.system_count(),
            "world populated"
        );
    }

    app
}

/// Outcome of [`run_for`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Ticks executed, the final one included.
    pub ticks: u64,
    /// Simulated seconds at exit.
    pub global_time: f32,
    /// Worlds still active at exit.
    pub active_worlds: usize,
    /// `true` if the run ended by timeout rather than by worlds finishing.
    pub timed_out: bool,
}

/// Ticks on wall-clock time until `duration` has elapsed or every world has
/// finished, sleeping `sleep` between ticks.
///
/// On timeout the application is asked to quit; the tick in progress still
/// completes.
pub fn run_for(app: &mut Application, duration: Duration, sleep: Duration) -> RunSummary {
    let started = Instant::now();
    let mut summary = RunSummary::default();

    loop {
        let keep_going = app.run_once();
        summary.ticks += 1;
        if !keep_going {
            break;
        }
        if started.elapsed() >= duration {
            summary.timed_out = true;
            app.quit();
        }
        if !sleep.is_zero() {
            thread::sleep(sleep);
        }
    }

    summary.global_time = app.time_info().global_time;
    summary.active_worlds = (0..app.worlds().len())
        .filter(|&index| app.is_world_active(index))
        .count();

    info!(
        ticks = summary.ticks,
        global_time = summary.global_time,
        active_worlds = summary.active_worlds,
        timed_out = summary.timed_out,
        "run finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;

    #[test]
    fn test_build_application_one_world_per_entry() {
        let config = AppConfig {
            worlds: vec![WorldConfig::default(), WorldConfig::default()],
            ..AppConfig::default()
        };
        let app = build_application(&config);

        assert_eq!(app.worlds().len(), 2);
        assert!(app.is_world_active(1));
        assert_eq!(app.world(0).unwrap().entity_count(), 88);
    }

    #[test]
    fn test_run_for_zero_duration_quits_after_one_more_tick() {
        let mut app = build_application(&AppConfig::default());
        let summary = run_for(&mut app, Duration::ZERO, Duration::ZERO);

        assert!(summary.timed_out);
        assert_eq!(summary.ticks, 2);
        assert_eq!(summary.active_worlds, 1);
    }
}
