//! Health, score and keystroke bookkeeping.

use serde::Serialize;

/// Remaining hits before game over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Health {
    current: u32,
    max: u32,
}

impl Health {
    /// Full health out of `max`.
    #[must_use]
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Returns the remaining health.
    #[must_use]
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Returns the health a reset restores.
    #[must_use]
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Lose one point of health. Returns what is left.
    pub fn damage(&mut self) -> u32 {
        self.current = self.current.saturating_sub(1);
        self.current
    }

    /// Returns `true` once no health is left.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Restore full health.
    pub fn reset(&mut self) {
        self.current = self.max;
    }
}

/// Points earned by typing words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub points: u64,
    pub words: u32,
}

impl Score {
    /// Credit a typed word. Returns the points it earned.
    pub fn credit(&mut self, word: &str, points_per_char: u64) -> u64 {
        let earned = word.chars().count() as u64 * points_per_char;
        self.points += earned;
        self.words += 1;
        earned
    }
}

/// Correct and incorrect keystroke counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KeyStats {
    pub correct: u64,
    pub incorrect: u64,
}

impl KeyStats {
    /// Share of correct keystrokes, or 1 if nothing was typed.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.correct + self.incorrect;
        if total == 0 {
            1.0
        } else {
            self.correct as f64 / total as f64
        }
    }
}
