//! Frame pacing configuration.

/// Configuration for a driver pumping frames into a [`GameLoop`](crate::GameLoop).
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Target frames per second.
    pub frame_rate: f64,
    /// Maximum number of frames to run (0 = unlimited).
    pub max_frames: u64,
}

impl LoopConfig {
    /// Set the frame rate.
    #[must_use]
    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Stop after this many frames.
    #[must_use]
    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Milliseconds between frames at the configured rate.
    #[must_use]
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.frame_rate
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            max_frames: 0,
        }
    }
}
