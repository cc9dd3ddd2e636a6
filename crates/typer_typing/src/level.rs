//! Level and wave definitions.
//!
//! Levels are declarative data read by the engine. The JSON shape is:
//!
//! ```json
//! {
//!   "characterCount": [3, 5],
//!   "waves": [
//!     {
//!       "trigger": { "type": "first" },
//!       "enemies": [{ "type": "enemy1" }, { "type": "enemy1", "chance": 0.5 }, null, null, null, null]
//!     },
//!     {
//!       "trigger": { "type": "time", "time": 3000 },
//!       "characterCount": 4,
//!       "enemies": [{ "type": "enemy1" }, null, null, null, null, null]
//!     }
//!   ]
//! }
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of enemy slots in every wave.
pub const SLOTS_PER_WAVE: usize = 6;

/// Number of levels produced by [`LevelCatalog::generate`].
pub const GENERATED_LEVELS: u32 = 200;

/// Number of waves per generated level.
pub const GENERATED_WAVES: usize = 5;

/// When a wave starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Trigger {
    /// Immediately. Only valid for wave 0.
    First,
    /// A fixed delay in milliseconds after the previous wave started.
    Time { time: u64 },
    /// Once every word of the previous wave has been removed.
    PrevWaveCleared,
}

/// Word length in characters, fixed or an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacterCount {
    Exact(usize),
    Range([usize; 2]),
}

impl CharacterCount {
    /// Inclusive `(min, max)`, normalised so `min <= max`.
    #[must_use]
    pub fn bounds(self) -> (usize, usize) {
        match self {
            CharacterCount::Exact(n) => (n, n),
            CharacterCount::Range([a, b]) => (a.min(b), a.max(b)),
        }
    }

    /// Draw a length from the range.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> usize {
        let (min, max) = self.bounds();
        rng.gen_range(min..=max)
    }
}

impl Default for CharacterCount {
    fn default() -> Self {
        CharacterCount::Exact(4)
    }
}

/// Enemy variants a slot can spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyType {
    #[default]
    #[serde(rename = "enemy1")]
    Enemy1,
}

/// One occupied enemy slot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnemyConfig {
    #[serde(rename = "type")]
    pub kind: EnemyType,
    /// Probability in `[0, 1]` that the slot spawns. Always spawns when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chance: Option<f64>,
}

impl EnemyConfig {
    /// Roll the slot's spawn chance.
    pub fn rolls<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        match self.chance {
            Some(chance) => rng.gen_bool(chance.max(0.0).min(1.0)),
            None => true,
        }
    }
}

/// A batch of enemies released under one trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wave {
    pub trigger: Trigger,
    /// Overrides the level's character count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_count: Option<CharacterCount>,
    pub enemies: [Option<EnemyConfig>; SLOTS_PER_WAVE],
}

impl Wave {
    /// A wave with `count` default enemies in the leading slots.
    #[must_use]
    pub fn with_enemies(trigger: Trigger, count: usize) -> Self {
        let mut enemies = [None; SLOTS_PER_WAVE];
        for slot in enemies.iter_mut().take(count) {
            *slot = Some(EnemyConfig::default());
        }
        Self {
            trigger,
            character_count: None,
            enemies,
        }
    }

    /// Override the level word length for this wave.
    #[must_use]
    pub fn with_character_count(mut self, count: CharacterCount) -> Self {
        self.character_count = Some(count);
        self
    }

    /// Occupied slots with their indices.
    pub fn occupied_slots(&self) -> impl Iterator<Item = (usize, &EnemyConfig)> {
        self.enemies
            .iter()
            .enumerate()
            .filter_map(|(slot, enemy)| enemy.as_ref().map(|enemy| (slot, enemy)))
    }
}

/// An ordered sequence of waves sharing a difficulty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub character_count: CharacterCount,
    pub waves: Vec<Wave>,
}

impl Level {
    /// The character count a wave uses: its own override or the level's.
    #[must_use]
    pub fn character_count_for(&self, wave: usize) -> CharacterCount {
        self.waves
            .get(wave)
            .and_then(|wave| wave.character_count)
            .unwrap_or(self.character_count)
    }
}

/// All levels of a session, numbered from 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl LevelCatalog {
    /// Wrap levels in play order; the first becomes level 1.
    #[must_use]
    pub fn from_levels(levels: Vec<Level>) -> Self {
        Self { levels }
    }

    /// Parse a JSON array of levels.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the document does not match the
    /// level shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The definition of level `number`, where the first level is 1.
    #[must_use]
    pub fn get(&self, number: u32) -> Option<&Level> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.levels.get(index)
    }

    /// Returns the number of levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Returns `true` if the catalogue has no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Build the procedural catalogue.
    ///
    /// Difficulty bands are keyed on the zero-based level index: word length
    /// and wave delay tighten as the index grows, and the share of waves
    /// with the larger enemy counts rises until every wave is full.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let levels = (0..GENERATED_LEVELS)
            .map(|index| generate_level(index, rng))
            .collect();
        Self { levels }
    }
}

fn wave_delay_ms(index: u32) -> u64 {
    match index {
        0..20 => 3000,
        20..30 => 2700,
        30..40 => 2500,
        _ => 2100,
    }
}

fn word_length(index: u32) -> CharacterCount {
    match index {
        0..3 => CharacterCount::Range([1, 2]),
        3..6 => CharacterCount::Range([2, 3]),
        6..12 => CharacterCount::Range([3, 4]),
        12..20 => CharacterCount::Range([3, 5]),
        20..30 => CharacterCount::Range([4, 6]),
        30..40 => CharacterCount::Range([5, 7]),
        _ => CharacterCount::Exact(7),
    }
}

/// Waves whose progress ratio is below this get the smaller enemy counts.
fn small_wave_threshold(index: u32) -> f64 {
    match index {
        0..5 => 3.0 / 5.0,
        5..15 => 2.0 / 5.0,
        15..25 => 1.0 / 5.0,
        _ => -1.0,
    }
}

fn trigger_for(wave: usize, waves: usize, delay_ms: u64) -> Trigger {
    if wave == 0 {
        return Trigger::First;
    }
    let ratio = (wave + 1) as f64 / waves as f64;
    if ratio < 3.0 / 5.0 {
        Trigger::PrevWaveCleared
    } else {
        Trigger::Time { time: delay_ms }
    }
}

fn enemy_count<R: Rng + ?Sized>(index: u32, wave: usize, waves: usize, rng: &mut R) -> usize {
    if index > 20 {
        return SLOTS_PER_WAVE;
    }
    let ratio = (wave + 1) as f64 / waves as f64;
    if ratio < small_wave_threshold(index) {
        rng.gen_range(2..=5)
    } else {
        rng.gen_range(4..=6)
    }
}

fn generate_level<R: Rng + ?Sized>(index: u32, rng: &mut R) -> Level {
    let length = word_length(index);
    let delay = wave_delay_ms(index);
    let waves = (0..GENERATED_WAVES)
        .map(|wave| {
            let count = enemy_count(index, wave, GENERATED_WAVES, rng);
            Wave::with_enemies(trigger_for(wave, GENERATED_WAVES, delay), count)
                .with_character_count(length)
        })
        .collect();
    Level {
        character_count: length,
        waves,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    use super::*;

    #[test]
    fn test_trigger_json_shape() {
        let time: Trigger = serde_json::from_str(r#"{"type":"time","time":3000}"#).unwrap();
        assert_eq!(time, Trigger::Time { time: 3000 });
        let cleared: Trigger = serde_json::from_str(r#"{"type":"prevWaveCleared"}"#).unwrap();
        assert_eq!(cleared, Trigger::PrevWaveCleared);
        assert_eq!(
            serde_json::to_string(&Trigger::First).unwrap(),
            r#"{"type":"first"}"#
        );
    }

    #[test]
    fn test_parse_level_list() {
        let json = r#"[{
            "characterCount": [3, 5],
            "waves": [
                {"trigger": {"type": "first"},
                 "enemies": [{"type": "enemy1"}, {"type": "enemy1", "chance": 0.5}, null, null, null, null]},
                {"trigger": {"type": "time", "time": 3000}, "characterCount": 4,
                 "enemies": [{"type": "enemy1"}, null, null, null, null, null]}
            ]
        }]"#;
        let catalog = LevelCatalog::from_json(json).unwrap();
        let level = catalog.get(1).unwrap();
        assert_eq!(level.waves.len(), 2);
        assert_eq!(level.waves[0].occupied_slots().count(), 2);
        assert_eq!(level.waves[0].enemies[1].unwrap().chance, Some(0.5));
        assert_eq!(level.character_count_for(0), CharacterCount::Range([3, 5]));
        assert_eq!(level.character_count_for(1), CharacterCount::Exact(4));
        assert!(catalog.get(0).is_none());
        assert!(catalog.get(2).is_none());
    }

    #[test]
    fn test_wrong_slot_count_is_rejected() {
        let json = r#"[{"characterCount": 3, "waves": [
            {"trigger": {"type": "first"}, "enemies": [null, null]}
        ]}]"#;
        assert!(LevelCatalog::from_json(json).is_err());
    }

    #[test]
    fn test_character_count_sampling_stays_in_range() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        for _ in 0..100 {
            let n = CharacterCount::Range([5, 3]).sample(&mut rng);
            assert!((3..=5).contains(&n));
        }
        assert_eq!(CharacterCount::Exact(7).sample(&mut rng), 7);
    }

    #[test]
    fn test_generated_catalog_shape() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let catalog = LevelCatalog::generate(&mut rng);
        assert_eq!(catalog.len(), GENERATED_LEVELS as usize);

        let first = catalog.get(1).unwrap();
        let triggers: Vec<_> = first.waves.iter().map(|w| w.trigger).collect();
        assert_eq!(
            triggers,
            vec![
                Trigger::First,
                Trigger::PrevWaveCleared,
                Trigger::Time { time: 3000 },
                Trigger::Time { time: 3000 },
                Trigger::Time { time: 3000 },
            ]
        );
        assert_eq!(first.character_count, CharacterCount::Range([1, 2]));

        let late = catalog.get(45).unwrap();
        assert_eq!(late.character_count, CharacterCount::Exact(7));
        assert_eq!(late.waves[4].trigger, Trigger::Time { time: 2100 });
        assert!(late.waves.iter().all(|w| w.occupied_slots().count() == SLOTS_PER_WAVE));

        for level in [catalog.get(1).unwrap(), catalog.get(10).unwrap()] {
            for wave in &level.waves {
                let count = wave.occupied_slots().count();
                assert!((2..=SLOTS_PER_WAVE).contains(&count));
            }
        }
    }

    #[test]
    fn test_chance_roll() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let never = EnemyConfig {
            chance: Some(0.0),
            ..EnemyConfig::default()
        };
        let always = EnemyConfig::default();
        assert!(!never.rolls(&mut rng));
        assert!(always.rolls(&mut rng));
    }
}
