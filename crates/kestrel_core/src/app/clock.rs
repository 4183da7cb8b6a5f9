//! # Frame Clock
//!
//! Converts variable wall-clock frame times into a whole number of fixed
//! substeps.
//!
//! ```text
//! substep = 0.02s
//! tick 1: delta 0.05  remaining 0.05 -> 2 substeps, carry 0.01
//! tick 2: delta 0.03  remaining 0.04 -> 2 substeps, carry 0.00
//! ```

use std::time::Instant;

/// Default substep duration: one 60 Hz frame.
pub const DEFAULT_SUBSTEP_TIME: f32 = 0.016_666;

/// Above this many substeps in one tick the count is computed in closed form.
const MAX_COUNTED_SUBSTEPS: f32 = 1024.0;

/// Timing shared by every world during one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTime {
    /// Seconds elapsed since the previous tick.
    pub delta_time: f32,
    /// Seconds accumulated over all ticks.
    pub global_time: f32,
    /// Whole substeps that elapsed during this tick.
    pub substep_count: u32,
    /// Duration of one substep in seconds.
    pub substep_time: f32,
}

impl Default for FrameTime {
    fn default() -> Self {
        Self {
            delta_time: 0.0,
            global_time: 0.0,
            substep_count: 0,
            substep_time: DEFAULT_SUBSTEP_TIME,
        }
    }
}

/// Accumulates frame deltas into fixed substeps.
#[derive(Clone, Debug)]
pub struct FrameClock {
    /// The record handed to worlds.
    frame: FrameTime,
    /// Time not yet consumed by a whole substep.
    remaining_time: f32,
    /// Start of the previous tick.
    last_frame_time: Instant,
}

impl FrameClock {
    /// Creates a clock with the default substep, starting now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frame: FrameTime::default(),
            remaining_time: 0.0,
            last_frame_time: Instant::now(),
        }
    }

    /// The record of the last tick.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> &FrameTime {
        &self.frame
    }

    /// Time carried into the next tick.
    #[inline]
    #[must_use]
    pub const fn remaining_time(&self) -> f32 {
        self.remaining_time
    }

    /// Sets the substep duration in seconds.
    ///
    /// # Panics
    ///
    /// Panics if `substep_time` is not strictly positive.
    pub fn set_substep_time(&mut self, substep_time: f32) {
        assert!(substep_time > 0.0, "fixed time step must be positive");
        self.frame.substep_time = substep_time;
    }

    /// Returns the wall-clock seconds since the previous call (or creation).
    pub fn measure(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        delta.as_secs_f32()
    }

    /// Accounts `delta_time` seconds and counts the whole substeps in it.
    ///
    /// Negative and non-finite deltas count as zero. A count beyond
    /// `u32::MAX` saturates.
    pub fn advance(&mut self, delta_time: f32) -> &FrameTime {
        let delta_time = if delta_time.is_finite() {
            delta_time.max(0.0)
        } else {
            0.0
        };
        self.frame.delta_time = delta_time;
        self.frame.global_time += delta_time;

        let substep_time = self.frame.substep_time;
        self.frame.substep_count = 0;
        self.remaining_time += delta_time;

        if self.remaining_time / substep_time < MAX_COUNTED_SUBSTEPS {
            while self.remaining_time >= substep_time {
                self.frame.substep_count += 1;
                self.remaining_time -= substep_time;
            }
        } else {
            // Repeated subtraction can round away to nothing here
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let whole = (self.remaining_time / substep_time).floor() as u32;
            self.frame.substep_count = whole;
            self.remaining_time %= substep_time;
        }

        &self.frame
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_substeps_and_carry() {
        let mut clock = FrameClock::new();
        clock.set_substep_time(0.02);

        let frame = *clock.advance(0.05);
        assert_eq!(frame.substep_count, 2);
        assert!((frame.delta_time - 0.05).abs() < EPSILON);
        assert!((clock.remaining_time() - 0.01).abs() < EPSILON);

        // Carry completes a substep on the next tick
        let frame = *clock.advance(0.01);
        assert_eq!(frame.substep_count, 1);
        assert!((frame.global_time - 0.06).abs() < EPSILON);
        assert!(clock.remaining_time().abs() < EPSILON);
    }

    #[test]
    fn test_short_frames_accumulate() {
        let mut clock = FrameClock::new();
        clock.set_substep_time(0.1);

        for _ in 0..3 {
            assert_eq!(clock.advance(0.03).substep_count, 0);
        }
        assert_eq!(clock.advance(0.03).substep_count, 1);
    }

    #[test]
    fn test_tiny_substep_counts_in_closed_form() {
        let mut clock = FrameClock::new();
        clock.set_substep_time(1e-9);

        let count = clock.advance(1.0).substep_count;
        assert!((990_000_000..=1_010_000_000).contains(&count));
        assert!((0.0..1e-9).contains(&clock.remaining_time()));
    }

    #[test]
    fn test_long_gap_counts_in_closed_form() {
        let mut clock = FrameClock::new();
        clock.set_substep_time(0.02);

        let count = clock.advance(1.0e7).substep_count;
        assert!((499_000_000..=501_000_000).contains(&count));
        assert!((0.0..0.02).contains(&clock.remaining_time()));

        // Back to counting by subtraction afterwards
        assert!((2..=3).contains(&clock.advance(0.05).substep_count));
    }

    #[test]
    fn test_non_finite_and_negative_deltas_count_as_zero() {
        let mut clock = FrameClock::new();
        clock.set_substep_time(0.02);
        clock.advance(0.01);

        for delta in [f32::INFINITY, f32::NAN, -1.0] {
            let frame = *clock.advance(delta);
            assert_eq!(frame.substep_count, 0);
            assert!(frame.delta_time.abs() < f32::EPSILON);
            assert!((frame.global_time - 0.01).abs() < EPSILON);
        }
        assert!((clock.remaining_time() - 0.01).abs() < EPSILON);
    }

    #[test]
    fn test_default_substep() {
        let clock = FrameClock::default();
        assert!((clock.frame().substep_time - DEFAULT_SUBSTEP_TIME).abs() < f32::EPSILON);
    }

    #[test]
    fn test_measure_is_non_negative() {
        let mut clock = FrameClock::new();
        assert!(clock.measure() >= 0.0);
    }
}
