//! # KESTREL
//!
//! The embedding layer around [`kestrel_core`]: configuration, telemetry,
//! and a demo plug-in set driven by the `kestrel` binary.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           kestrel                            │
//! │                                                              │
//! │  config ─────> demo::build_application ─────> Application    │
//! │  (TOML)          │                            (kestrel_core) │
//! │                  └─ Movement / Lifetime / TextRender systems │
//! │                                                              │
//! │  telemetry: tracing events ──> stderr/stdout or LogSink      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: Runner and world settings, loaded from TOML
//! - `telemetry`: Level-gated log output
//! - `demo`: Components, systems and seeded population
//! - `error`: The embedding layer's error type

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod demo;
pub mod error;
pub mod telemetry;

// Re-export the runtime
pub use kestrel_core as core;

pub use config::{AppConfig, WorldConfig};
pub use error::{AppError, AppResult};
pub use telemetry::{LogLevel, LogSink};
