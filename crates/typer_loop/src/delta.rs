//! Frame delta tracking.

/// Computes the time between consecutive host frame timestamps.
///
/// The first timestamp after construction or [`reset`](Self::reset) only
/// sets the origin and yields a delta of zero, so a fresh start or a resume
/// from pause never produces a simulation spike.
#[derive(Debug, Default, Clone)]
pub struct DeltaTracker {
    last_ms: Option<f64>,
}

impl DeltaTracker {
    /// Create a tracker with no origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame timestamp in milliseconds and return the delta in seconds.
    pub fn track(&mut self, now_ms: f64) -> f32 {
        let last = self.last_ms.unwrap_or(now_ms);
        // Host clocks can step backwards (tab restore, test fixtures).
        let delta_secs = ((now_ms - last).max(0.0) / 1000.0) as f32;
        self.last_ms = Some(now_ms);
        delta_secs
    }

    /// Forget the origin; the next frame reports zero.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_zero() {
        let mut tracker = DeltaTracker::new();
        assert_eq!(tracker.track(12_345.0), 0.0);
    }

    #[test]
    fn test_delta_in_seconds() {
        let mut tracker = DeltaTracker::new();
        tracker.track(1000.0);
        let dt = tracker.track(1016.0);
        assert!((dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_reset_forgets_origin() {
        let mut tracker = DeltaTracker::new();
        tracker.track(0.0);
        tracker.track(16.0);
        tracker.reset();
        assert_eq!(tracker.track(90_000.0), 0.0);
        assert!((tracker.track(90_010.0) - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_backwards_clock_clamps_to_zero() {
        let mut tracker = DeltaTracker::new();
        tracker.track(500.0);
        assert_eq!(tracker.track(400.0), 0.0);
    }
}
