//! # Application
//!
//! Owns the worlds and drives them, one tick at a time:
//!
//! ```text
//! tick:
//!   1. measure delta since previous tick
//!   2. accumulate into fixed substeps         (FrameClock)
//!   3. for each active world, in order:
//!        World::update(frame)  -> false = world deactivated
//!   4. continue while running && any world active
//! ```
//!
//! Everything is cooperative: a tick that has started always finishes,
//! [`Application::quit`] only takes effect at the tick boundary.

use tracing::debug;

use super::clock::{FrameClock, FrameTime};
use crate::ecs::{CapabilitySet, KindRegistry, World};

/// The fixed-timestep scheduler.
///
/// # Example
///
/// ```rust
/// use kestrel_core::Application;
///
/// let mut app = Application::new(1);
/// app.set_fixed_time_step(0.02);
/// app.add_world();
///
/// // A world without systems deactivates on its first tick
/// assert!(!app.tick(0.05));
/// assert_eq!(app.time_info().substep_count, 2);
/// ```
pub struct Application {
    /// Identity table shared by every world.
    registry: KindRegistry,
    /// Worlds, updated in insertion order.
    worlds: Vec<World>,
    /// Bit *i* set = world *i* is still active.
    active_worlds: CapabilitySet,
    /// Tick timing.
    clock: FrameClock,
    /// Cleared by `quit`.
    running: bool,
}

impl Application {
    /// Creates an application with room for `world_count` worlds.
    #[must_use]
    pub fn new(world_count: usize) -> Self {
        Self::with_registry(KindRegistry::new(), world_count)
    }

    /// Creates an application whose worlds share `registry`.
    #[must_use]
    pub fn with_registry(registry: KindRegistry, world_count: usize) -> Self {
        Self {
            registry,
            worlds: Vec::with_capacity(world_count),
            active_worlds: CapabilitySet::new(),
            clock: FrameClock::new(),
            running: true,
        }
    }

    /// The registry shared by every world.
    #[inline]
    #[must_use]
    pub const fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    /// All worlds, active or not.
    #[inline]
    #[must_use]
    pub fn worlds(&self) -> &[World] {
        &self.worlds
    }

    /// All worlds, mutably.
    #[inline]
    pub fn worlds_mut(&mut self) -> &mut [World] {
        &mut self.worlds
    }

    /// Gets a world by index.
    #[must_use]
    pub fn world(&self, index: usize) -> Option<&World> {
        self.worlds.get(index)
    }

    /// Gets a mutable world by index.
    pub fn world_mut(&mut self, index: usize) -> Option<&mut World> {
        self.worlds.get_mut(index)
    }

    /// Returns `true` if world `index` exists and is still updated.
    #[must_use]
    pub fn is_world_active(&self, index: usize) -> bool {
        self.active_worlds.get(index)
    }

    /// Timing of the last tick.
    #[inline]
    #[must_use]
    pub const fn time_info(&self) -> &FrameTime {
        self.clock.frame()
    }

    /// Time carried into the next tick.
    #[inline]
    #[must_use]
    pub const fn remaining_time(&self) -> f32 {
        self.clock.remaining_time()
    }

    /// Sets the fixed substep duration in seconds.
    ///
    /// # Panics
    ///
    /// Panics if `fixed_time_step` is not strictly positive.
    pub fn set_fixed_time_step(&mut self, fixed_time_step: f32) {
        self.clock.set_substep_time(fixed_time_step);
    }

    /// Appends a world and marks it active.
    pub fn add_world(&mut self) -> &mut World {
        self.add_world_with_capacity(0)
    }

    /// Appends a world pre-sized for `entity_capacity` entities.
    pub fn add_world_with_capacity(&mut self, entity_capacity: usize) -> &mut World {
        let index = self.worlds.len();
        self.worlds
            .push(World::with_capacity(self.registry.clone(), entity_capacity));
        self.active_worlds.set(index, true);
        &mut self.worlds[index]
    }

    /// Returns `true` until [`Application::quit`] is called.
    #[inline]
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Requests a stop at the next tick boundary.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Runs one tick covering `delta_time` seconds.
    ///
    /// # Returns
    ///
    /// `true` if the loop should continue: not quit, and at least one world
    /// still active.
    pub fn tick(&mut self, delta_time: f32) -> bool {
        let frame = *self.clock.advance(delta_time);

        for (index, world) in self.worlds.iter_mut().enumerate() {
            if !self.active_worlds.get(index) {
                continue;
            }
            if !world.update(&frame) {
                self.active_worlds.set(index, false);
                debug!(world = index, "world deactivated");
            }
        }

        self.running && self.active_worlds.any()
    }

    /// Runs one tick over the wall-clock time since the previous one.
    pub fn run_once(&mut self) -> bool {
        let delta_time = self.clock.measure();
        self.tick(delta_time)
    }

    /// Ticks until [`Application::run_once`] returns `false`.
    pub fn run(&mut self) {
        debug!("running");
        while self.run_once() {}
        debug!("exiting");
    }

    /// Ticks until [`Application::run_once`] returns `false`, calling
    /// `callback` with the frame timing after every continuing tick.
    pub fn run_with<F>(&mut self, mut callback: F)
    where
        F: FnMut(&FrameTime),
    {
        debug!("running");
        while self.run_once() {
            callback(self.clock.frame());
        }
        debug!("exiting");
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new(1)
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("worlds", &self.worlds.len())
            .field("active_worlds", &self.active_worlds)
            .field("time", self.clock.frame())
            .field("running", &self.running)
            .finish()
    }
}
