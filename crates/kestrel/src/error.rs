//! # Application Error Types
//!
//! Everything that can fail while configuring and starting the runner.

use kestrel_core::EcsError;
use thiserror::Error;

/// Errors raised by the embedding layer.
#[derive(Error, Debug)]
pub enum AppError {
    /// Reading a file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for [`crate::config::AppConfig`].
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration parsed but holds unusable values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A global subscriber could not be installed.
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// An ECS operation failed.
    #[error(transparent)]
    Ecs(#[from] EcsError),
}

/// Result type for the embedding layer.
pub type AppResult<T> = Result<T, AppError>;
