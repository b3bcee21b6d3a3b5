//! Release-velocity estimation for kinetic scrolling

use crate::consts::KINETIC_SMOOTHING;

/// Low-pass filtered horizontal velocity, sampled at a fixed rate while pressed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocitySampler {
    velocity: f64,
    last_time: f64,
    last_x: f64,
}

impl VelocitySampler {
    pub fn start(now: f64, x: f64) -> Self {
        Self {
            velocity: 0.0,
            last_time: now,
            last_x: x,
        }
    }

    /// Fold in the cursor position at `now`
    pub fn sample(&mut self, now: f64, x: f64) {
        let elapsed = now - self.last_time;
        self.last_time = now;
        let delta = x - self.last_x;
        self.last_x = x;

        let latest = delta / ((1.0 + elapsed) / 1000.0);
        self.velocity = KINETIC_SMOOTHING * latest + (1.0 - KINETIC_SMOOTHING) * self.velocity;
    }

    /// px/s
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn last_x(&self) -> f64 {
        self.last_x
    }
}
