//! Phase accumulator for oscillatory motion.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

/// Default phase advance per call, in radians.
pub const DEFAULT_STEP: f32 = 0.1;

/// A sine oscillator advanced explicitly once per update.
///
/// The phase starts at `seed`, grows by `step` on every [`next`](Self::next)
/// call and wraps back to zero once it passes a full turn. [`restart`](Self::restart)
/// returns the phase to the seed so the motion can be replayed exactly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PhaseAccumulator {
    seed: f32,
    phase: f32,
    step: f32,
}

impl PhaseAccumulator {
    /// Create an accumulator starting at `seed` radians with the default step.
    #[must_use]
    pub fn new(seed: f32) -> Self {
        Self::with_step(seed, DEFAULT_STEP)
    }

    /// Create an accumulator with a custom per-call step.
    #[must_use]
    pub fn with_step(seed: f32, step: f32) -> Self {
        Self {
            seed,
            phase: seed,
            step,
        }
    }

    /// The current phase in radians.
    #[must_use]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// The phase this accumulator restarts from.
    #[must_use]
    pub fn seed(&self) -> f32 {
        self.seed
    }

    /// Advance the phase by one step and return its sine.
    pub fn next(&mut self) -> f32 {
        self.phase += self.step;
        if self.phase > TAU {
            self.phase = 0.0;
        }
        self.phase.sin()
    }

    /// Reset the phase to the stored seed.
    pub fn restart(&mut self) {
        self.phase = self.seed;
    }
}

impl Default for PhaseAccumulator {
    fn default() -> Self {
        Self::new(0.0)
    }
}
