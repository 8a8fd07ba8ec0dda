use std::time::Instant;

use crate::config::{clamp_speed, SimConfig};

/// Base durations and the user speed multiplier.
///
/// All durations shrink as speed grows: `base / speed`.
#[derive(Clone, Debug, PartialEq)]
pub struct Pacing {
    speed: f32,
    base_wait: f32,
    base_jump: f32,
    cycle_wait: f32,
}

impl Pacing {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            speed: clamp_speed(config.speed),
            base_wait: config.base_wait,
            base_jump: config.base_jump,
            cycle_wait: config.cycle_wait,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Nudge the speed multiplier, clamped to its bounds; returns the new speed
    pub fn adjust(&mut self, delta: f32) -> f32 {
        self.speed = clamp_speed(self.speed + delta);
        self.speed
    }

    /// Rest time in a box before a ball advances
    pub fn wait(&self) -> f32 {
        self.base_wait / self.speed
    }

    /// Duration of one jump
    pub fn jump(&self) -> f32 {
        self.base_jump / self.speed
    }

    /// Pause between a finished cycle and the next one
    pub fn cycle_wait(&self) -> f32 {
        self.cycle_wait / self.speed
    }
}

/// Wall-clock frame delta source for the front-end
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Seconds since the previous call (or resync)
    pub fn delta(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt
    }

    /// Drop any elapsed time, e.g. after a pause
    pub fn resync(&mut self) {
        self.last = Instant::now();
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
