//! # Demo Systems
//!
//! | System | Requires (any of) | Stops when |
//! |---|---|---|
//! | [`MovementSystem`] | `Position`, `Velocity` | no enabled member has both |
//! | [`LifetimeSystem`] | `Lifetime` | every member expired |
//! | [`TextRenderSystem`] | `Position` | never |
//!
//! Membership is by intersection, so each system re-checks the components it
//! actually reads and skips disabled members whose links are still pending
//! re-evaluation.

use kestrel_core::{EntityStorage, FrameTime, KindRegistry, Membership, System};
use tracing::{debug, info};

use super::components::{Lifetime, Position, Velocity};

/// Simulated seconds covered by a tick: whole substeps only.
fn step_seconds(frame: &FrameTime) -> f32 {
    frame.substep_time * frame.substep_count as f32
}

// ============================================================================
// MOVEMENT
// ============================================================================

/// Integrates velocity into position.
#[derive(Debug)]
pub struct MovementSystem {
    membership: Membership,
    moved_last: usize,
}

impl MovementSystem {
    /// Creates the system, registering its kinds in `registry`.
    #[must_use]
    pub fn new(registry: &KindRegistry) -> Self {
        Self {
            membership: Membership::new()
                .with_component::<Position>(registry)
                .with_component::<Velocity>(registry),
            moved_last: 0,
        }
    }

    /// Entities moved by the last update.
    #[must_use]
    pub const fn moved_last(&self) -> usize {
        self.moved_last
    }
}

impl System for MovementSystem {
    fn membership(&self) -> &Membership {
        &self.membership
    }

    fn membership_mut(&mut self) -> &mut Membership {
        &mut self.membership
    }

    fn update(&mut self, frame: &FrameTime, entities: &mut EntityStorage) -> bool {
        let seconds = step_seconds(frame);
        let mut moved = 0;

        for &handle in self.membership.members() {
            let Some(entity) = entities.get_mut(handle) else {
                continue;
            };
            if !entity.is_enabled() {
                continue;
            }
            let Ok(&velocity) = entity.get_component::<Velocity>() else {
                continue;
            };
            if let Ok(position) = entity.get_component_mut::<Position>() {
                position.integrate(velocity, seconds);
                moved += 1;
            }
        }

        self.moved_last = moved;
        moved > 0 || self.membership.is_empty()
    }
}

// ============================================================================
// LIFETIME
// ============================================================================

/// Counts lifetimes down and disables entities whose time ran out.
#[derive(Debug)]
pub struct LifetimeSystem {
    membership: Membership,
    expired: usize,
}

impl LifetimeSystem {
    /// Creates the system, registering its kinds in `registry`.
    #[must_use]
    pub fn new(registry: &KindRegistry) -> Self {
        Self {
            membership: Membership::new().with_component::<Lifetime>(registry),
            expired: 0,
        }
    }

    /// Entities disabled so far.
    #[must_use]
    pub const fn expired(&self) -> usize {
        self.expired
    }
}

impl System for LifetimeSystem {
    fn membership(&self) -> &Membership {
        &self.membership
    }

    fn membership_mut(&mut self) -> &mut Membership {
        &mut self.membership
    }

    fn update(&mut self, frame: &FrameTime, entities: &mut EntityStorage) -> bool {
        let seconds = step_seconds(frame);
        let mut alive = 0;

        for &handle in self.membership.members() {
            let Some(entity) = entities.get_mut(handle) else {
                continue;
            };
            if !entity.is_enabled() {
                continue;
            }
            let Ok(lifetime) = entity.get_component_mut::<Lifetime>() else {
                continue;
            };
            if lifetime.consume(seconds) {
                entity.disable();
                self.expired += 1;
                debug!(entity = %handle.id(), "lifetime expired");
            } else {
                alive += 1;
            }
        }

        alive > 0
    }
}

// ============================================================================
// TEXT RENDER
// ============================================================================

/// What the last rendered frame showed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderStats {
    /// Frames rendered so far.
    pub frames: u64,
    /// Enabled members with a position in the last frame.
    pub visible: usize,
    /// Mean position of the visible members.
    pub centroid: [f32; 3],
}

/// Logs a one-line scene summary every `every` updates.
#[derive(Debug)]
pub struct TextRenderSystem {
    membership: Membership,
    every: u64,
    updates: u64,
    stats: RenderStats,
}

impl TextRenderSystem {
    /// Creates a renderer drawing every `every` updates (at least 1).
    #[must_use]
    pub fn new(registry: &KindRegistry, every: u64) -> Self {
        Self {
            membership: Membership::new().with_component::<Position>(registry),
            every: every.max(1),
            updates: 0,
            stats: RenderStats::default(),
        }
    }

    /// The last rendered frame.
    #[must_use]
    pub const fn stats(&self) -> &RenderStats {
        &self.stats
    }

    fn render(&mut self, frame: &FrameTime, entities: &EntityStorage) {
        let mut sum = [0.0_f32; 4];
        let mut visible = 0_usize;

        for &handle in self.membership.members() {
            let Some(entity) = entities.get(handle).filter(|entity| entity.is_enabled()) else {
                continue;
            };
            let Ok(position) = entity.get_component::<Position>() else {
                continue;
            };
            for (total, lane) in sum.iter_mut().zip(position.lanes()) {
                *total += lane;
            }
            visible += 1;
        }

        let centroid = if visible == 0 {
            [0.0; 3]
        } else {
            let count = visible as f32;
            [sum[0] / count, sum[1] / count, sum[2] / count]
        };

        self.stats = RenderStats {
            frames: self.stats.frames + 1,
            visible,
            centroid,
        };
        info!(
            frame = self.stats.frames,
            time = frame.global_time,
            visible,
            centroid = ?centroid,
            "render"
        );
    }
}

impl System for TextRenderSystem {
    fn membership(&self) -> &Membership {
        &self.membership
    }

    fn membership_mut(&mut self) -> &mut Membership {
        &mut self.membership
    }

    fn update(&mut self, frame: &FrameTime, entities: &mut EntityStorage) -> bool {
        self.updates += 1;
        if self.updates % self.every == 0 {
            self.render(frame, entities);
        }
        true
    }

    fn destroy(&mut self) {
        debug!(frames = self.stats.frames, "renderer shut down");
    }
}
