//! Typing engine configuration.

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 0x7970_6572;

/// Configuration for a [`TypingEngine`](crate::TypingEngine).
#[derive(Debug, Clone)]
pub struct TypingConfig {
    /// Seed for word selection, slot chances and procedural levels.
    pub seed: u64,
    /// Level number entered by `start`. Levels are numbered from 1.
    pub starting_level: u32,
    /// Candidates drawn per enemy slot before the slot is skipped.
    pub max_generation_attempts: usize,
    /// Key identifiers that never count as keystrokes.
    pub ignored_keys: Vec<String>,
}

impl TypingConfig {
    /// Seed for spawn chance rolls and word selection.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Level to open on, counting from 1.
    #[must_use]
    pub fn with_starting_level(mut self, level: u32) -> Self {
        self.starting_level = level;
        self
    }

    #[must_use]
    pub fn with_max_generation_attempts(mut self, attempts: usize) -> Self {
        self.max_generation_attempts = attempts;
        self
    }

    /// Returns `true` if this key identifier should be dropped.
    ///
    /// Named keys longer than one character are always dropped.
    #[must_use]
    pub fn ignores(&self, key: &str) -> bool {
        key.chars().count() != 1 || self.ignored_keys.iter().any(|ignored| ignored == key)
    }
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            starting_level: 1,
            max_generation_attempts: 32,
            ignored_keys: [
                "Shift", "Control", "Alt", "Meta", "CapsLock", "Tab", "Enter", "Backspace",
                "Escape", " ",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}
