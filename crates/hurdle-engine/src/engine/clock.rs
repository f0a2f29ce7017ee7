use serde::{Deserialize, Serialize};

/// Lowest tick rate reachable through [`SimClock::adjust_fps`].
pub const MIN_FPS: f32 = 5.0;

/// Tick clock of a running world.
///
/// Each tick lasts `1 / fps` seconds of simulated time, so changing the tick
/// rate changes the duration of subsequent ticks only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    ticks: u64,
    elapsed: f64,
    fps: f32,
}

impl SimClock {
    #[must_use]
    pub const fn new(fps: f32) -> Self {
        Self {
            ticks: 0,
            elapsed: 0.0,
            fps,
        }
    }

    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated seconds since the clock was created or restarted.
    #[must_use]
    pub const fn now(&self) -> f64 {
        self.elapsed
    }

    #[must_use]
    pub const fn fps(&self) -> f32 {
        self.fps
    }

    pub fn advance(&mut self) {
        self.ticks += 1;
        self.elapsed += 1.0 / f64::from(self.fps);
    }

    /// Changes the tick rate by `delta`, never going below [`MIN_FPS`].
    pub fn adjust_fps(&mut self, delta: f32) {
        self.fps = (self.fps + delta).max(MIN_FPS);
    }

    /// Rewinds to zero, keeping the current tick rate.
    pub fn restart(&mut self) {
        self.ticks = 0;
        self.elapsed = 0.0;
    }
}
