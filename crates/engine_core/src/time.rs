//! Time management for the frame loop.
//!
//! Wall-clock frames feed an accumulator that is drained in fixed ticks, so the
//! per-tick flight constants behave the same at any display refresh rate.
//! Tests drive the clock with [`Time::advance`] instead of real frames.

use std::time::{Duration, Instant};

/// Upper bound on backlog kept in the accumulator, in ticks. A long stall
/// (window drag, breakpoint) drops the excess instead of replaying it.
pub const MAX_BACKLOG_TICKS: u32 = 8;

/// Manages frame timing and the fixed-tick accumulator.
#[derive(Debug)]
pub struct Time {
    /// Wall-clock instant of the last `update`.
    last_frame: Instant,
    /// Duration of the last frame, uncapped.
    delta: Duration,
    /// Fixed timestep (default 60 Hz, one display refresh).
    fixed_timestep: Duration,
    /// Accumulated time for fixed updates.
    accumulator: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            fixed_timestep: Duration::from_secs_f64(1.0 / 60.0),
            accumulator: Duration::ZERO,
        }
    }

    /// Update timing at the start of a new frame from the wall clock.
    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;
        self.advance(delta);
    }

    /// Feed a synthetic frame of `delta` into the clock.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.accumulator += delta;

        let cap = self.fixed_timestep * MAX_BACKLOG_TICKS;
        if self.accumulator > cap {
            log::debug!(
                "Frame stalled for {:?}, dropping {:?} of backlog",
                delta,
                self.accumulator - cap
            );
            self.accumulator = cap;
        }
    }

    /// Wall-clock length of the last frame in seconds. Not affected by the
    /// backlog cap.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get the fixed timestep as a Duration.
    pub fn fixed_timestep(&self) -> Duration {
        self.fixed_timestep
    }

    /// Check if a fixed update should run and consume the time.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.accumulator >= self.fixed_timestep {
            self.accumulator -= self.fixed_timestep;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(time: &mut Time) -> u32 {
        let mut ticks = 0;
        while time.should_fixed_update() {
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn one_refresh_yields_one_tick() {
        let mut time = Time::new();
        time.advance(time.fixed_timestep());
        assert_eq!(drain(&mut time), 1);
        assert_eq!(drain(&mut time), 0);
    }

    #[test]
    fn short_frames_accumulate_into_ticks() {
        let mut time = Time::new();
        let half = time.fixed_timestep() / 2;
        time.advance(half);
        assert_eq!(drain(&mut time), 0);
        time.advance(half);
        assert_eq!(drain(&mut time), 1);
    }

    #[test]
    fn long_stall_is_capped_but_delta_is_not() {
        let mut time = Time::new();
        time.advance(Duration::from_secs(3));
        assert_eq!(drain(&mut time), MAX_BACKLOG_TICKS);
        assert!((time.delta_seconds() - 3.0).abs() < 1e-6);
    }
}
