//! # Application Layer
//!
//! The fixed-timestep scheduler that owns worlds and drives them.
//!
//! ## Design Philosophy
//!
//! - One tick runs to completion before the next begins
//! - Wall-clock time is converted into whole fixed substeps
//! - Worlds and systems stop themselves; nothing restarts them

mod application;
mod clock;

pub use application::Application;
pub use clock::{FrameClock, FrameTime, DEFAULT_SUBSTEP_TIME};
