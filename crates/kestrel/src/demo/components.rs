//! # Demo Components
//!
//! Plain old data: `Copy`, `#[repr(C)]`, `Pod`. Nothing here owns heap
//! memory, so every component can be viewed as raw floats.

use bytemuck::{Pod, Zeroable};
use kestrel_core::Component;

/// Position in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Position {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
    /// Keeps the struct 16 bytes.
    pub _padding: f32,
}

impl Component for Position {}

impl Position {
    /// Creates a new position.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            _padding: 0.0,
        }
    }

    /// Moves by `velocity` over `seconds`.
    #[inline]
    pub fn integrate(&mut self, velocity: Velocity, seconds: f32) {
        self.x += velocity.x * seconds;
        self.y += velocity.y * seconds;
        self.z += velocity.z * seconds;
    }

    /// The four lanes as an array (padding included).
    #[inline]
    #[must_use]
    pub fn lanes(self) -> [f32; 4] {
        bytemuck::cast(self)
    }
}

/// Movement speed in world units per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Velocity {
    /// X velocity.
    pub x: f32,
    /// Y velocity.
    pub y: f32,
    /// Z velocity.
    pub z: f32,
    /// Keeps the struct 16 bytes.
    pub _padding: f32,
}

impl Component for Velocity {}

impl Velocity {
    /// Creates a new velocity.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            _padding: 0.0,
        }
    }
}

/// Seconds an entity has left before it is disabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Lifetime {
    /// Remaining seconds; expired at zero or below.
    pub remaining: f32,
}

impl Component for Lifetime {}

impl Lifetime {
    /// Creates a lifetime of `seconds`.
    #[inline]
    #[must_use]
    pub const fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    /// Counts `seconds` down; returns `true` once expired.
    #[inline]
    pub fn consume(&mut self, seconds: f32) -> bool {
        self.remaining -= seconds;
        self.is_expired()
    }

    /// Returns `true` once no time remains.
    #[inline]
    #[must_use]
    pub fn is_expired(self) -> bool {
        self.remaining <= 0.0
    }
}
