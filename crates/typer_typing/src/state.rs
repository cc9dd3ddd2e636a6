//! Word objects and the engine state snapshot.

use serde::{Deserialize, Serialize};

/// A word the player can type, independent of any entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordObject {
    /// `"{level}-{wave}-{slot}"`.
    pub id: String,
    pub word: String,
    /// Index of the wave that spawned this word.
    pub wave: usize,
}

impl WordObject {
    /// The first character, used for targeting.
    #[must_use]
    pub fn first_char(&self) -> Option<char> {
        self.word.chars().next()
    }

    /// Length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.word.chars().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }
}

/// Snapshot of the typing engine.
///
/// `current_target` is `None` exactly when `current_typed_word` is empty, and
/// `next_expected_character` is the target's character at the typed length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingState {
    pub active: bool,
    pub paused: bool,
    pub current_level: u32,
    pub current_target: Option<String>,
    pub current_typed_word: String,
    pub next_expected_character: Option<char>,
    pub active_words: Vec<WordObject>,
}

impl TypingState {
    /// Look up an active word by id.
    #[must_use]
    pub fn word(&self, id: &str) -> Option<&WordObject> {
        self.active_words.iter().find(|word| word.id == id)
    }

    /// The targeted word, if any.
    #[must_use]
    pub fn target(&self) -> Option<&WordObject> {
        self.current_target.as_deref().and_then(|id| self.word(id))
    }

    /// Returns `true` if no word of this wave is still active.
    #[must_use]
    pub fn is_wave_cleared(&self, wave: usize) -> bool {
        !self.active_words.iter().any(|word| word.wave == wave)
    }

    pub(crate) fn clear_target(&mut self) {
        self.current_target = None;
        self.current_typed_word.clear();
        self.next_expected_character = None;
    }
}
