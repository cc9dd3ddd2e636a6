//! Word sources and first-character-unique drawing.

use std::collections::{BTreeMap, HashSet};

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use tracing::warn;

use crate::level::CharacterCount;

/// Keys drilled by [`PracticeKeys`].
pub const PRACTICE_KEYS: [char; 18] = [
    'a', 's', 'd', 'u', 'f', 'g', 'h', 'j', 'k', 'l', ';', 'q', 'w', 'e', 'r', 't', 'y', 'i',
];

const BUILTIN_WORDS: &[&str] = &[
    "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s",
    "t", "u", "v", "w", "x", "y", "z", //
    "at", "be", "by", "do", "go", "he", "if", "in", "is", "it", "me", "my", "no", "of", "on",
    "or", "so", "to", "up", "us", "we", //
    "arc", "bay", "cat", "dog", "elk", "fox", "gem", "hat", "ink", "jam", "kit", "log", "map",
    "nut", "owl", "pen", "rug", "sun", "tap", "urn", "van", "web", "yak", "zip", //
    "atom", "bolt", "cave", "dusk", "echo", "fern", "gale", "hive", "iris", "jolt", "kite",
    "lamp", "mint", "nova", "opal", "pine", "quiz", "reef", "sand", "tide", "unit", "vale",
    "wave", "yarn", "zinc", //
    "amber", "blaze", "cedar", "drift", "ember", "frost", "glyph", "haste", "ivory", "jewel",
    "knack", "lunar", "maple", "nexus", "orbit", "pixel", "quest", "raven", "solar", "tempo",
    "umbra", "vivid", "whirl", "xenon", "yield", "zesty", //
    "anchor", "beacon", "cobalt", "dynamo", "engine", "falcon", "galaxy", "harbor", "island",
    "jungle", "kernel", "legend", "magnet", "nebula", "oxygen", "planet", "quartz", "rocket",
    "signal", "tundra", "unison", "vector", "wander", "yonder", "zenith", //
    "antenna", "balloon", "captain", "diamond", "eclipse", "fortune", "glacier", "harvest",
    "iceberg", "journey", "kingdom", "lantern", "mission", "network", "orchard", "phantom",
    "quantum", "rainbow", "station", "thunder", "unicorn", "voyager", "whisper", "zealous",
];

/// Supplies candidate words for a character count.
///
/// Sources only propose; uniqueness of first characters is enforced by
/// [`draw_unique`].
pub trait WordSource {
    /// Propose one word whose length falls within `count` where possible.
    fn candidate(&self, count: CharacterCount, rng: &mut dyn RngCore) -> Option<String>;
}

/// Real words grouped into tiers by length.
#[derive(Debug, Clone)]
pub struct WordBank {
    tiers: BTreeMap<usize, Vec<String>>,
}

impl WordBank {
    /// Group `words` by character count. Empty strings are dropped.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tiers: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for word in words {
            let word = word.into();
            let len = word.chars().count();
            if len > 0 {
                tiers.entry(len).or_default().push(word);
            }
        }
        Self { tiers }
    }

    /// The tier closest to `len`, preferring the shorter one on ties.
    fn nearest_tier(&self, len: usize) -> Option<&[String]> {
        self.tiers
            .iter()
            .min_by_key(|(tier, _)| tier.abs_diff(len))
            .map(|(_, words)| words.as_slice())
    }

    /// Number of words across all tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiers.values().map(Vec::len).sum()
    }

    /// Returns `true` if the bank has no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

impl Default for WordBank {
    fn default() -> Self {
        Self::new(BUILTIN_WORDS.iter().copied())
    }
}

impl WordSource for WordBank {
    fn candidate(&self, count: CharacterCount, rng: &mut dyn RngCore) -> Option<String> {
        let len = count.sample(rng);
        self.nearest_tier(len)?.choose(rng).cloned()
    }
}

/// Random strings over a fixed key set, for drilling individual keys.
#[derive(Debug, Clone)]
pub struct PracticeKeys {
    keys: Vec<char>,
}

impl PracticeKeys {
    /// Drill only these keys.
    #[must_use]
    pub fn new(keys: Vec<char>) -> Self {
        Self { keys }
    }
}

impl Default for PracticeKeys {
    fn default() -> Self {
        Self::new(PRACTICE_KEYS.to_vec())
    }
}

impl WordSource for PracticeKeys {
    fn candidate(&self, count: CharacterCount, rng: &mut dyn RngCore) -> Option<String> {
        if self.keys.is_empty() {
            return None;
        }
        let len = count.sample(rng).max(1);
        Some(
            (0..len)
                .map(|_| self.keys[rng.gen_range(0..self.keys.len())])
                .collect(),
        )
    }
}

/// Draw a word whose first character is not in `taken`, then mark it taken.
///
/// Gives up after `max_attempts` candidates and returns `None`.
pub fn draw_unique(
    source: &dyn WordSource,
    count: CharacterCount,
    taken: &mut HashSet<char>,
    max_attempts: usize,
    rng: &mut dyn RngCore,
) -> Option<String> {
    for _ in 0..max_attempts {
        let Some(word) = source.candidate(count, rng) else {
            break;
        };
        let Some(first) = word.chars().next() else {
            continue;
        };
        if taken.insert(first) {
            return Some(word);
        }
    }
    warn!(
        ?count,
        taken = taken.len(),
        max_attempts,
        "no candidate with an unused first character"
    );
    None
}
