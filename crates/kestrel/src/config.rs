//! # Runner Configuration
//!
//! Loaded once at startup from a TOML file. Every field has a default, so an
//! empty file (or no file at all) yields a runnable setup.
//!
//! ```toml
//! fixed_time_step = 0.02
//! log_level = "info"
//! run_seconds = 2.0
//! frame_sleep_ms = 16
//!
//! [[worlds]]
//! entity_capacity = 256
//! moving_entities = 64
//! static_entities = 16
//! disabled_entities = 8
//! lifetime_seconds = 1.5
//! render_every = 30
//! seed = 42
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::telemetry::LogLevel;

/// Top-level runner configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Seconds per substep.
    pub fixed_time_step: f32,
    /// Minimum level of emitted log events.
    pub log_level: LogLevel,
    /// Wall-clock seconds before the runner quits.
    pub run_seconds: f32,
    /// Milliseconds to sleep between ticks.
    pub frame_sleep_ms: u64,
    /// One world per entry, updated in this order.
    pub worlds: Vec<WorldConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fixed_time_step: 0.02,
            log_level: LogLevel::default(),
            run_seconds: 2.0,
            frame_sleep_ms: 16,
            worlds: vec![WorldConfig::default()],
        }
    }
}

impl AppConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// [`AppError::Config`] on malformed TOML, [`AppError::InvalidConfig`]
    /// if [`AppConfig::validate`] rejects the values.
    pub fn from_toml_str(text: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// [`AppError::Io`] if the file cannot be read, otherwise as
    /// [`AppConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks the values the runtime cannot work with.
    ///
    /// # Errors
    ///
    /// [`AppError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> AppResult<()> {
        if !(self.fixed_time_step > 0.0 && self.fixed_time_step.is_finite()) {
            return Err(AppError::InvalidConfig(format!(
                "fixed_time_step must be positive, got {}",
                self.fixed_time_step
            )));
        }
        if !(self.run_seconds >= 0.0 && self.run_seconds.is_finite()) {
            return Err(AppError::InvalidConfig(format!(
                "run_seconds must be non-negative, got {}",
                self.run_seconds
            )));
        }
        self.run_duration()?;
        for (index, world) in self.worlds.iter().enumerate() {
            world
                .validate()
                .map_err(|reason| AppError::InvalidConfig(format!("worlds[{index}]: {reason}")))?;
        }
        Ok(())
    }

    /// `run_seconds` as a [`Duration`].
    ///
    /// # Errors
    ///
    /// [`AppError::InvalidConfig`] if the value does not fit a `Duration`.
    pub fn run_duration(&self) -> AppResult<Duration> {
        Duration::try_from_secs_f32(self.run_seconds).map_err(|err| {
            AppError::InvalidConfig(format!("run_seconds {}: {err}", self.run_seconds))
        })
    }
}

/// Population and plug-ins of one demo world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Entity slots reserved up front.
    pub entity_capacity: usize,
    /// Enabled entities with position and velocity.
    pub moving_entities: usize,
    /// Enabled entities with position only.
    pub static_entities: usize,
    /// Moving entities created disabled.
    pub disabled_entities: usize,
    /// Seconds before a moving entity expires; `None` = never.
    pub lifetime_seconds: Option<f32>,
    /// Log a render summary every N ticks; 0 = no render system.
    pub render_every: u64,
    /// Seed for the world's random population.
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            entity_capacity: 256,
            moving_entities: 64,
            static_entities: 16,
            disabled_entities: 8,
            lifetime_seconds: None,
            render_every: 30,
            seed: 42,
        }
    }
}

impl WorldConfig {
    /// Total entities this world will be populated with.
    #[must_use]
    pub const fn entity_total(&self) -> usize {
        self.moving_entities + self.static_entities + self.disabled_entities
    }

    fn validate(&self) -> Result<(), String> {
        match self.lifetime_seconds {
            Some(seconds) if !(seconds > 0.0 && seconds.is_finite()) => {
                Err(format!("lifetime_seconds must be positive, got {seconds}"))
            }
            _ => Ok(()),
        }
    }
}
