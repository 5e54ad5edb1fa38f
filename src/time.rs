use std::time::{Duration, Instant};

/// Logical frame counter. Time-driven overlays key off the frame number, not the wall clock;
/// the wall-clock delta is kept only for diagnostics.
pub struct FrameClock {
    frame: u64,
    last: Instant,
    pub delta: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { frame: 0, last: Instant::now(), delta: Duration::ZERO }
    }

    /// Advances one frame and returns the new frame number.
    pub fn tick(&mut self) -> u64 {
        let now = Instant::now();
        self.delta = now - self.last;
        self.last = now;
        self.frame += 1;
        self.frame
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
