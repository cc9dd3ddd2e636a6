//! Simulated player feeding keystrokes to a headless session.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use typer_typing::TypingState;

/// Types at a steady rate and occasionally hits the wrong key.
#[derive(Debug, Clone)]
pub struct Typist {
    rng: Xoshiro256PlusPlus,
    accuracy: f64,
    keys_per_second: f64,
    /// Fractional keystrokes carried between frames.
    budget: f64,
}

impl Typist {
    /// Accuracy is clamped to `[0, 1]` and a negative rate means no keys.
    #[must_use]
    pub fn new(seed: u64, accuracy: f64, keys_per_second: f64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            accuracy: if accuracy.is_nan() { 1.0 } else { accuracy.clamp(0.0, 1.0) },
            keys_per_second: keys_per_second.max(0.0),
            budget: 0.0,
        }
    }

    /// Whole keystrokes owed after `elapsed_ms` more milliseconds.
    pub fn keys_due(&mut self, elapsed_ms: f64) -> usize {
        if elapsed_ms <= 0.0 {
            return 0;
        }
        self.budget += elapsed_ms * self.keys_per_second / 1000.0;
        let due = self.budget.floor();
        self.budget -= due;
        due as usize
    }

    /// The next key to press, or `None` when there is nothing to type.
    ///
    /// Aims for the expected character of the targeted word, or the first
    /// character of the oldest active word when nothing is targeted.
    pub fn next_key(&mut self, state: &TypingState) -> Option<String> {
        let intended = state
            .next_expected_character
            .or_else(|| state.active_words.first().and_then(|word| word.first_char()))?;
        if self.rng.gen_bool(self.accuracy) {
            return Some(intended.to_string());
        }
        Some(self.miss(intended).to_string())
    }

    /// A lowercase letter other than `intended`.
    fn miss(&mut self, intended: char) -> char {
        loop {
            let ch = char::from(self.rng.gen_range(b'a'..=b'z'));
            if ch != intended {
                return ch;
            }
        }
    }
}
