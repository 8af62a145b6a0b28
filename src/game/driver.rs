//! Fixed-timestep driver.
//!
//! Real frame time is accumulated and drained in whole simulation steps.
//! Frame deltas are clamped so a stalled frame cannot queue an unbounded
//! number of steps.

/// Fixed-step accumulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStep {
    step: f32,
    max_frame_delta: f32,
    accumulator: f32,
    paused: bool,
}

impl FixedStep {
    /// Create a driver stepping `step` seconds at a time.
    #[must_use]
    pub const fn new(step: f32, max_frame_delta: f32) -> Self {
        Self {
            step,
            max_frame_delta,
            accumulator: 0.0,
            paused: false,
        }
    }

    /// Simulation step in seconds.
    #[must_use]
    pub const fn step(&self) -> f32 {
        self.step
    }

    /// True while paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop producing steps. Time passing while paused is discarded.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume producing steps.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Drop any accumulated time.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    /// Feed one frame of real time; returns the number of steps to run.
    pub fn advance(&mut self, frame_delta: f32) -> u32 {
        if self.paused || self.step <= 0.0 {
            return 0;
        }
        self.accumulator += frame_delta.clamp(0.0, self.max_frame_delta);

        let mut steps = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            steps += 1;
        }
        steps
    }
}
