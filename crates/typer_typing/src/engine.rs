//! The typing engine state machine.
//!
//! Per level the engine moves through
//! `LevelInit -> WaveActive -> (AwaitingTrigger -> WaveActive)* -> LevelComplete`
//! and then initialises the next level. Waiting is never blocking: a pending
//! trigger is stored as a [`Suspension`] and resolved either by
//! [`TypingEngine::advance`] (timers) or by a word removal (cleared
//! conditions). [`TypingEngine::end`] flushes whatever is pending.

use std::collections::{HashMap, HashSet};
use std::fmt;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{debug, error, info, warn};

use crate::config::TypingConfig;
use crate::error::TypingError;
use crate::event::{EventBus, EventKind, Listener, RemovalCause, TypingEvent};
use crate::level::{Level, LevelCatalog, Trigger};
use crate::state::{TypingState, WordObject};
use crate::words::{WordSource, draw_unique};

/// A wave transition the engine is waiting on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Suspension {
    /// Start wave `wave` once `remaining_ms` of engine time has passed.
    Timer { wave: usize, remaining_ms: f64 },
    /// Start the wave after `wave` once every word of `wave` is removed.
    WaveCleared { wave: usize },
    /// Complete the level once no word is active.
    LevelCleared,
}

/// What a keystroke did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Control key, or the engine is not accepting input.
    Ignored,
    /// A word was targeted by its first character.
    Targeted { id: String },
    /// The targeted word gained a character.
    Progressed { id: String },
    /// The targeted word was finished and removed.
    Completed { id: String },
    /// The key did not match. State is unchanged.
    Incorrect,
    /// The key matched but the target had vanished; the target was dropped.
    TargetLost,
}

/// Level/wave orchestration and keystroke matching.
pub struct TypingEngine {
    config: TypingConfig,
    catalog: LevelCatalog,
    source: Box<dyn WordSource>,
    rng: Xoshiro256PlusPlus,
    state: TypingState,
    /// The definition of the current level.
    level: Option<Level>,
    /// First character of every active word to its id.
    first_chars: HashMap<char, String>,
    pending: Option<Suspension>,
    /// Engine time in milliseconds since `start`, excluding pauses.
    clock_ms: f64,
    bus: EventBus,
}

impl TypingEngine {
    /// Create an inactive engine.
    #[must_use]
    pub fn new(config: TypingConfig, catalog: LevelCatalog, source: Box<dyn WordSource>) -> Self {
        let rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
        Self {
            config,
            catalog,
            source,
            rng,
            state: TypingState::default(),
            level: None,
            first_chars: HashMap::new(),
            pending: None,
            clock_ms: 0.0,
            bus: EventBus::new(),
        }
    }

    /// Subscribe to one kind of event.
    pub fn subscribe(&mut self, kind: EventKind, listener: Listener) {
        self.bus.on(kind, listener);
    }

    /// Subscribe to every event.
    pub fn subscribe_all(&mut self, listener: Listener) {
        self.bus.on_any(listener);
    }

    /// A copy of the current state.
    #[must_use]
    pub fn get_state(&self) -> TypingState {
        self.state.clone()
    }

    /// Returns `true` between [`start`](Self::start) and [`end`](Self::end).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Returns `true` while keys and timers are suspended.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    /// The transition currently being waited on.
    #[must_use]
    pub fn pending(&self) -> Option<Suspension> {
        self.pending
    }

    /// Engine time in milliseconds since `start`, excluding pauses.
    #[must_use]
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Activate the engine and enter the starting level.
    ///
    /// # Errors
    ///
    /// Propagates level initialisation errors.
    pub fn start(&mut self) -> Result<(), TypingError> {
        if self.state.active {
            debug!("typing engine already started");
            return Ok(());
        }
        info!(level = self.config.starting_level, "typing engine started");
        self.state.active = true;
        self.state.paused = false;
        self.clock_ms = 0.0;
        self.initialize_level(self.config.starting_level)
    }

    /// Deactivate the engine.
    ///
    /// Any pending suspension is resolved on the spot without starting further
    /// waves, all words are dropped and every subscription is cleared after a
    /// final [`TypingEvent::SessionEnded`].
    pub fn end(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(?pending, "flushed pending suspension");
        }
        info!(
            level = self.state.current_level,
            words = self.state.active_words.len(),
            "typing engine ended"
        );
        self.state.active = false;
        self.state.paused = false;
        self.state.clear_target();
        self.state.active_words.clear();
        self.first_chars.clear();
        self.level = None;
        self.bus.emit(&TypingEvent::SessionEnded);
        self.bus.clear();
    }

    /// Flip the pause flag. Returns `true` if now paused.
    ///
    /// # Errors
    ///
    /// Returns [`TypingError::NotActive`] if the engine was never started.
    pub fn toggle_paused(&mut self) -> Result<bool, TypingError> {
        if !self.state.active {
            return Err(TypingError::NotActive);
        }
        self.state.paused = !self.state.paused;
        Ok(self.state.paused)
    }

    /// Advance engine time, resolving elapsed timers.
    ///
    /// Overshoot past one timer is applied to the next, so a long frame can
    /// start several timed waves at once. Does nothing while inactive or
    /// paused.
    ///
    /// # Errors
    ///
    /// Propagates errors from starting the next wave.
    pub fn advance(&mut self, elapsed_ms: f64) -> Result<(), TypingError> {
        if !self.state.active || self.state.paused || elapsed_ms <= 0.0 {
            return Ok(());
        }
        self.clock_ms += elapsed_ms;
        // Time past an elapsed timer counts toward the timer that follows it.
        let mut carry_ms = elapsed_ms;
        loop {
            let Some(Suspension::Timer { wave, remaining_ms }) = self.pending else {
                return Ok(());
            };
            let remaining_ms = remaining_ms - carry_ms;
            if remaining_ms > 0.0 {
                self.pending = Some(Suspension::Timer { wave, remaining_ms });
                return Ok(());
            }
            carry_ms = -remaining_ms;
            self.pending = None;
            debug!(wave, clock_ms = self.clock_ms, overshoot_ms = carry_ms, "wave timer elapsed");
            self.process_waves(wave)?;
        }
    }

    /// Enter level `number`.
    ///
    /// # Errors
    ///
    /// Returns [`TypingError::OutOfLevels`] if there is no such level, or
    /// propagates wave processing errors.
    pub fn initialize_level(&mut self, number: u32) -> Result<(), TypingError> {
        self.state.current_level = number;
        let level = self
            .catalog
            .get(number)
            .cloned()
            .ok_or(TypingError::OutOfLevels(number))?;
        info!(level = number, waves = level.waves.len(), "level initialised");
        self.level = Some(level);
        self.bus.emit(&TypingEvent::InitializeLevel {
            level: number,
            state: self.state.clone(),
        });
        self.process_waves(0)
    }

    /// Start wave `index` of the current level and schedule what follows.
    ///
    /// Consecutive `prevWaveCleared` waves whose predecessor is already clear
    /// start immediately.
    ///
    /// # Errors
    ///
    /// Returns [`TypingError::IllegalFirstTrigger`] if a later wave uses the
    /// `first` trigger, or propagates errors from entering the next level.
    pub fn process_waves(&mut self, index: usize) -> Result<(), TypingError> {
        let mut index = index;
        loop {
            self.spawn_wave(index);
            let next = self
                .level
                .as_ref()
                .and_then(|level| level.waves.get(index + 1))
                .map(|wave| wave.trigger);
            let level = self.state.current_level;
            match next {
                None => break,
                Some(Trigger::First) => {
                    return Err(TypingError::IllegalFirstTrigger {
                        level,
                        wave: index + 1,
                    });
                }
                Some(Trigger::Time { time }) => {
                    debug!(level, wave = index + 1, delay_ms = time, "awaiting timer");
                    self.pending = Some(Suspension::Timer {
                        wave: index + 1,
                        remaining_ms: time as f64,
                    });
                    return Ok(());
                }
                Some(Trigger::PrevWaveCleared) => {
                    if !self.state.is_wave_cleared(index) {
                        debug!(level, wave = index + 1, "awaiting wave clear");
                        self.pending = Some(Suspension::WaveCleared { wave: index });
                        return Ok(());
                    }
                    index += 1;
                }
            }
        }

        if self.state.active_words.is_empty() {
            self.complete_level()
        } else {
            debug!(level = self.state.current_level, "awaiting level clear");
            self.pending = Some(Suspension::LevelCleared);
            Ok(())
        }
    }

    /// Handle one key press.
    ///
    /// # Errors
    ///
    /// Returns [`TypingError::MissingTarget`] if a first character maps to a
    /// word that is no longer active, or propagates errors from the wave and
    /// level transitions a completed word can cause.
    pub fn on_key_down(&mut self, key: &str) -> Result<KeyOutcome, TypingError> {
        if !self.state.active || self.state.paused || self.config.ignores(key) {
            return Ok(KeyOutcome::Ignored);
        }
        let Some(ch) = key.chars().next() else {
            return Ok(KeyOutcome::Ignored);
        };

        if self.state.current_target.is_none() {
            let Some(id) = self.first_chars.get(&ch).cloned() else {
                return Ok(self.incorrect_key(key));
            };
            let word = self
                .state
                .word(&id)
                .cloned()
                .ok_or_else(|| TypingError::MissingTarget(id.clone()))?;
            debug!(id = %word.id, "word targeted");
            self.state.current_target = Some(word.id.clone());
            let progressed = self.update_typed(&word, ch.to_string())?;
            return Ok(if progressed {
                KeyOutcome::Targeted { id: word.id }
            } else {
                KeyOutcome::Completed { id: word.id }
            });
        }

        if self.state.next_expected_character != Some(ch) {
            return Ok(self.incorrect_key(key));
        }
        let Some(word) = self.state.target().cloned() else {
            error!(
                id = ?self.state.current_target,
                "targeted word is not active; dropping target"
            );
            self.reset_word();
            return Ok(KeyOutcome::TargetLost);
        };
        let mut typed = self.state.current_typed_word.clone();
        typed.push(ch);
        let progressed = self.update_typed(&word, typed)?;
        Ok(if progressed {
            KeyOutcome::Progressed { id: word.id }
        } else {
            KeyOutcome::Completed { id: word.id }
        })
    }

    /// Force a word out of play, e.g. because its enemy reached the boundary.
    ///
    /// Returns `false` if the word is not active.
    ///
    /// # Errors
    ///
    /// Propagates errors from the wave and level transitions the removal can
    /// cause.
    pub fn remove_word(&mut self, id: &str) -> Result<bool, TypingError> {
        if self.state.word(id).is_none() {
            debug!(id, "word already removed");
            return Ok(false);
        }
        self.handle_removal(id, RemovalCause::Forced)?;
        Ok(true)
    }

    /// Drop the current target and typed progress.
    pub fn reset_word(&mut self) {
        self.state.clear_target();
        self.bus.emit(&TypingEvent::ResetWordState {
            state: self.state.clone(),
        });
    }

    fn incorrect_key(&mut self, key: &str) -> KeyOutcome {
        debug!(key, expected = ?self.state.next_expected_character, "incorrect key");
        self.bus.emit(&TypingEvent::IncorrectKey {
            key: key.to_string(),
            expected: self.state.next_expected_character,
        });
        KeyOutcome::Incorrect
    }

    /// Record `typed` against `word`. Returns `false` if it completed the word.
    fn update_typed(&mut self, word: &WordObject, typed: String) -> Result<bool, TypingError> {
        let typed_len = typed.chars().count();
        if typed_len >= word.len() {
            self.handle_removal(&word.id, RemovalCause::Typed)?;
            return Ok(false);
        }
        self.state.next_expected_character = word.word.chars().nth(typed_len);
        self.state.current_typed_word = typed;
        self.bus.emit(&TypingEvent::UpdateCurrentlyTypedWord {
            state: self.state.clone(),
        });
        Ok(true)
    }

    fn handle_removal(&mut self, id: &str, cause: RemovalCause) -> Result<(), TypingError> {
        let Some(position) = self.state.active_words.iter().position(|w| w.id == id) else {
            return Ok(());
        };
        let removed = self.state.active_words.remove(position);
        if let Some(first) = removed.first_char() {
            if self.first_chars.get(&first).is_some_and(|owner| *owner == removed.id) {
                self.first_chars.remove(&first);
            }
        }
        debug!(id, ?cause, remaining = self.state.active_words.len(), "word removed");

        if cause == RemovalCause::Typed {
            self.bus.emit(&TypingEvent::TypedFullWord {
                id: removed.id.clone(),
                word: removed.word.clone(),
            });
        }
        self.bus.emit(&TypingEvent::WordRemoved {
            id: removed.id.clone(),
            word: removed.word.clone(),
            cause,
        });
        if self.state.current_target.as_deref() == Some(id) {
            self.reset_word();
        }

        let level = self.state.current_level;
        if self.state.is_wave_cleared(removed.wave) {
            info!(level, wave = removed.wave, "wave ended");
            self.bus.emit(&TypingEvent::WaveEnded {
                level,
                wave: removed.wave,
            });
            if self.pending == Some(Suspension::WaveCleared { wave: removed.wave }) {
                self.pending = None;
                return self.process_waves(removed.wave + 1);
            }
        }

        if self.state.active_words.is_empty() && self.pending == Some(Suspension::LevelCleared) {
            self.pending = None;
            return self.complete_level();
        }
        Ok(())
    }

    fn complete_level(&mut self) -> Result<(), TypingError> {
        let level = self.state.current_level;
        info!(level, "level complete");
        self.bus.emit(&TypingEvent::LevelComplete { level });
        self.initialize_level(level + 1)
    }

    fn spawn_wave(&mut self, index: usize) {
        let Some(level) = self.level.as_ref() else {
            return;
        };
        let Some(wave) = level.waves.get(index).cloned() else {
            return;
        };
        let count = level.character_count_for(index);
        let number = self.state.current_level;

        let mut taken: HashSet<char> = self.first_chars.keys().copied().collect();
        let mut words = Vec::new();
        for (slot, enemy) in wave.occupied_slots() {
            if !enemy.rolls(&mut self.rng) {
                debug!(level = number, wave = index, slot, "slot skipped by chance");
                continue;
            }
            let Some(word) = draw_unique(
                self.source.as_ref(),
                count,
                &mut taken,
                self.config.max_generation_attempts,
                &mut self.rng,
            ) else {
                warn!(level = number, wave = index, slot, "enemy slot left empty");
                continue;
            };
            words.push(WordObject {
                id: format!("{number}-{index}-{slot}"),
                word,
                wave: index,
            });
        }

        for word in &words {
            if let Some(first) = word.first_char() {
                self.first_chars.insert(first, word.id.clone());
            }
        }
        self.state.active_words.extend(words.iter().cloned());
        info!(level = number, wave = index, words = words.len(), "wave started");
        self.bus.emit(&TypingEvent::WaveStarted {
            level: number,
            wave: index,
            words,
        });
    }
}

impl fmt::Debug for TypingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypingEngine")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("pending", &self.pending)
            .field("clock_ms", &self.clock_ms)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use proptest::prelude::*;

    use super::*;
    use crate::level::{CharacterCount, Wave};
    use crate::words::WordBank;

    type Log = Rc<RefCell<Vec<TypingEvent>>>;

    fn engine_with(levels: Vec<Level>, words: &[&str]) -> (TypingEngine, Log) {
        let mut engine = TypingEngine::new(
            TypingConfig::default().with_seed(11),
            LevelCatalog::from_levels(levels),
            Box::new(WordBank::new(words.iter().copied())),
        );
        let log: Log = Rc::default();
        let sink = Rc::clone(&log);
        engine.subscribe_all(Box::new(move |event| sink.borrow_mut().push(event.clone())));
        (engine, log)
    }

    fn level(waves: Vec<Wave>) -> Level {
        Level {
            character_count: CharacterCount::Exact(3),
            waves,
        }
    }

    fn kinds(log: &Log) -> Vec<EventKind> {
        log.borrow().iter().map(TypingEvent::kind).collect()
    }

    fn type_word(engine: &mut TypingEngine, word: &str) -> KeyOutcome {
        let mut last = KeyOutcome::Ignored;
        for ch in word.chars() {
            last = engine.on_key_down(&ch.to_string()).unwrap();
        }
        last
    }

    fn cat_dog_engine() -> (TypingEngine, Log) {
        let (mut engine, log) = engine_with(
            vec![level(vec![Wave::with_enemies(Trigger::First, 2)])],
            &["cat", "dog"],
        );
        engine.start().unwrap();
        (engine, log)
    }

    #[test]
    fn test_start_emits_initialize_before_wave() {
        let (engine, log) = cat_dog_engine();
        assert_eq!(kinds(&log), vec![EventKind::InitializeLevel, EventKind::WaveStarted]);
        let state = engine.get_state();
        assert!(state.active);
        assert_eq!(state.current_level, 1);
        assert_eq!(state.active_words.len(), 2);
        assert_eq!(engine.pending(), Some(Suspension::LevelCleared));
    }

    #[test]
    fn test_typing_cat_leaves_dog() {
        let (mut engine, log) = cat_dog_engine();
        let cat_id = engine
            .get_state()
            .active_words
            .iter()
            .find(|w| w.word == "cat")
            .map(|w| w.id.clone())
            .unwrap();

        assert_eq!(
            engine.on_key_down("c").unwrap(),
            KeyOutcome::Targeted { id: cat_id.clone() }
        );
        assert_eq!(engine.get_state().next_expected_character, Some('a'));
        assert_eq!(type_word(&mut engine, "at"), KeyOutcome::Completed { id: cat_id.clone() });

        let typed: Vec<_> = log
            .borrow()
            .iter()
            .filter_map(|e| match e {
                TypingEvent::TypedFullWord { id, .. } => Some(id.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(typed, vec![cat_id]);

        let state = engine.get_state();
        assert_eq!(state.active_words.len(), 1);
        assert_eq!(state.active_words[0].word, "dog");
        assert_eq!(state.current_target, None);
        assert!(state.current_typed_word.is_empty());
    }

    #[test]
    fn test_incorrect_keys_leave_state_unchanged() {
        let (mut engine, log) = cat_dog_engine();
        let before = engine.get_state();
        assert_eq!(engine.on_key_down("x").unwrap(), KeyOutcome::Incorrect);
        assert_eq!(engine.get_state(), before);

        engine.on_key_down("d").unwrap();
        let targeted = engine.get_state();
        assert_eq!(engine.on_key_down("g").unwrap(), KeyOutcome::Incorrect);
        assert_eq!(engine.get_state(), targeted);
        assert_eq!(
            log.borrow().last(),
            Some(&TypingEvent::IncorrectKey {
                key: "g".into(),
                expected: Some('o')
            })
        );
    }

    #[test]
    fn test_control_keys_are_ignored() {
        let (mut engine, log) = cat_dog_engine();
        let events = log.borrow().len();
        assert_eq!(engine.on_key_down("Shift").unwrap(), KeyOutcome::Ignored);
        assert_eq!(engine.on_key_down("ArrowUp").unwrap(), KeyOutcome::Ignored);
        assert_eq!(log.borrow().len(), events);
    }

    #[test]
    fn test_remove_word_twice_is_a_no_op() {
        let (mut engine, log) = cat_dog_engine();
        let id = engine.get_state().active_words[0].id.clone();
        assert!(engine.remove_word(&id).unwrap());
        let events = log.borrow().len();
        assert!(!engine.remove_word(&id).unwrap());
        assert_eq!(log.borrow().len(), events);
        assert!(!log
            .borrow()
            .iter()
            .any(|e| matches!(e, TypingEvent::TypedFullWord { .. })));
    }

    #[test]
    fn test_forced_removal_of_target_resets_it() {
        let (mut engine, _log) = cat_dog_engine();
        engine.on_key_down("c").unwrap();
        let target = engine.get_state().current_target.unwrap();
        assert!(engine.remove_word(&target).unwrap());
        let state = engine.get_state();
        assert_eq!(state.current_target, None);
        assert_eq!(state.next_expected_character, None);
    }

    #[test]
    fn test_forced_removal_keeps_other_target() {
        let (mut engine, _log) = cat_dog_engine();
        engine.on_key_down("c").unwrap();
        let state = engine.get_state();
        let other = state
            .active_words
            .iter()
            .find(|w| w.word == "dog")
            .map(|w| w.id.clone())
            .unwrap();
        engine.remove_word(&other).unwrap();
        assert_eq!(engine.get_state().current_typed_word, "c");
    }

    #[test]
    fn test_clearing_last_level_runs_out_of_levels() {
        let (mut engine, log) = cat_dog_engine();
        type_word(&mut engine, "cat");
        engine.on_key_down("d").unwrap();
        engine.on_key_down("o").unwrap();
        let err = engine.on_key_down("g").unwrap_err();
        assert!(matches!(err, TypingError::OutOfLevels(2)));
        let kinds = kinds(&log);
        assert!(kinds.contains(&EventKind::WaveEnded));
        assert!(kinds.contains(&EventKind::LevelComplete));
    }

    #[test]
    fn test_timer_wave_waits_for_engine_time() {
        let (mut engine, log) = engine_with(
            vec![level(vec![
                Wave::with_enemies(Trigger::First, 1),
                Wave::with_enemies(Trigger::Time { time: 3000 }, 1),
            ])],
            &["cat", "dog", "elk"],
        );
        engine.start().unwrap();
        let waves_started = |log: &Log| {
            log.borrow()
                .iter()
                .filter(|e| matches!(e, TypingEvent::WaveStarted { .. }))
                .count()
        };

        engine.advance(1000.0).unwrap();
        let first = engine.get_state().active_words[0].word.clone();
        type_word(&mut engine, &first);
        engine.advance(1999.0).unwrap();
        assert_eq!(waves_started(&log), 1);

        engine.toggle_paused().unwrap();
        engine.advance(10_000.0).unwrap();
        assert_eq!(waves_started(&log), 1);
        engine.toggle_paused().unwrap();

        engine.advance(1.0).unwrap();
        assert_eq!(waves_started(&log), 2);
        assert_eq!(engine.clock_ms(), 3000.0);
        assert_eq!(engine.pending(), Some(Suspension::LevelCleared));
    }

    #[test]
    fn test_prev_wave_cleared_waits_for_removal() {
        let (mut engine, log) = engine_with(
            vec![level(vec![
                Wave::with_enemies(Trigger::First, 1),
                Wave::with_enemies(Trigger::PrevWaveCleared, 1),
            ])],
            &["cat", "dog", "elk"],
        );
        engine.start().unwrap();
        assert_eq!(engine.pending(), Some(Suspension::WaveCleared { wave: 0 }));
        engine.advance(60_000.0).unwrap();
        assert_eq!(engine.get_state().active_words.len(), 1);

        let id = engine.get_state().active_words[0].id.clone();
        engine.remove_word(&id).unwrap();

        let state = engine.get_state();
        assert_eq!(state.active_words.len(), 1);
        assert_eq!(state.active_words[0].wave, 1);
        let kinds = kinds(&log);
        let ended = kinds.iter().position(|k| *k == EventKind::WaveEnded).unwrap();
        let started = kinds.iter().rposition(|k| *k == EventKind::WaveStarted).unwrap();
        assert!(ended < started);
    }

    #[test]
    fn test_first_trigger_after_wave_zero_is_fatal() {
        let (mut engine, _log) = engine_with(
            vec![level(vec![
                Wave::with_enemies(Trigger::First, 1),
                Wave::with_enemies(Trigger::First, 1),
            ])],
            &["cat", "dog"],
        );
        let err = engine.start().unwrap_err();
        assert!(matches!(
            err,
            TypingError::IllegalFirstTrigger { level: 1, wave: 1 }
        ));
    }

    #[test]
    fn test_empty_level_advances_immediately() {
        let (mut engine, log) = engine_with(
            vec![
                level(vec![Wave::with_enemies(Trigger::First, 0)]),
                level(vec![Wave::with_enemies(Trigger::First, 1)]),
            ],
            &["cat"],
        );
        engine.start().unwrap();
        assert_eq!(engine.get_state().current_level, 2);
        assert_eq!(
            kinds(&log),
            vec![
                EventKind::InitializeLevel,
                EventKind::WaveStarted,
                EventKind::LevelComplete,
                EventKind::InitializeLevel,
                EventKind::WaveStarted,
            ]
        );
    }

    #[test]
    fn test_end_flushes_and_clears_subscriptions() {
        let (mut engine, log) = engine_with(
            vec![level(vec![
                Wave::with_enemies(Trigger::First, 1),
                Wave::with_enemies(Trigger::Time { time: 3000 }, 1),
            ])],
            &["cat", "dog"],
        );
        engine.start().unwrap();
        engine.end();
        assert_eq!(engine.pending(), None);
        assert!(!engine.is_active());
        assert!(engine.get_state().active_words.is_empty());
        assert_eq!(kinds(&log).last(), Some(&EventKind::SessionEnded));

        let events = log.borrow().len();
        engine.advance(5000.0).unwrap();
        assert_eq!(engine.on_key_down("c").unwrap(), KeyOutcome::Ignored);
        assert_eq!(log.borrow().len(), events);
        assert!(matches!(engine.toggle_paused(), Err(TypingError::NotActive)));
    }

    #[test]
    fn test_timer_overshoot_carries_into_next_timer() {
        let (mut engine, log) = engine_with(
            vec![level(vec![
                Wave::with_enemies(Trigger::First, 1),
                Wave::with_enemies(Trigger::Time { time: 3000 }, 1),
                Wave::with_enemies(Trigger::Time { time: 3000 }, 1),
                Wave::with_enemies(Trigger::Time { time: 3000 }, 1),
            ])],
            &["cat", "dog", "elk", "fox"],
        );
        engine.start().unwrap();
        let waves_started = |log: &Log| {
            log.borrow()
                .iter()
                .filter(|e| matches!(e, TypingEvent::WaveStarted { .. }))
                .count()
        };

        engine.advance(4000.0).unwrap();
        assert_eq!(waves_started(&log), 2);
        assert_eq!(
            engine.pending(),
            Some(Suspension::Timer {
                wave: 2,
                remaining_ms: 2000.0
            })
        );

        engine.advance(2000.0).unwrap();
        assert_eq!(waves_started(&log), 3);

        // One long frame covers the whole last timer and then some.
        engine.advance(7000.0).unwrap();
        assert_eq!(waves_started(&log), 4);
        assert_eq!(engine.pending(), Some(Suspension::LevelCleared));
    }

    #[test]
    fn test_end_flushes_wave_cleared_waiter() {
        let (mut engine, log) = engine_with(
            vec![level(vec![
                Wave::with_enemies(Trigger::First, 1),
                Wave::with_enemies(Trigger::PrevWaveCleared, 1),
            ])],
            &["cat", "dog"],
        );
        engine.start().unwrap();
        assert_eq!(engine.pending(), Some(Suspension::WaveCleared { wave: 0 }));
        let id = engine.get_state().active_words[0].id.clone();

        engine.end();
        assert_eq!(engine.pending(), None);
        let events = log.borrow().len();

        assert!(!engine.remove_word(&id).unwrap());
        assert_eq!(engine.on_key_down("c").unwrap(), KeyOutcome::Ignored);
        engine.advance(10_000.0).unwrap();
        assert_eq!(log.borrow().len(), events);
        assert!(engine.get_state().active_words.is_empty());
    }

    #[test]
    fn test_end_flushes_level_cleared_waiter() {
        let (mut engine, log) = engine_with(
            vec![
                level(vec![Wave::with_enemies(Trigger::First, 2)]),
                level(vec![Wave::with_enemies(Trigger::First, 1)]),
            ],
            &["cat", "dog"],
        );
        engine.start().unwrap();
        assert_eq!(engine.pending(), Some(Suspension::LevelCleared));
        let ids: Vec<String> = engine
            .get_state()
            .active_words
            .iter()
            .map(|w| w.id.clone())
            .collect();

        engine.end();
        for id in &ids {
            assert!(!engine.remove_word(id).unwrap());
        }
        assert_eq!(engine.get_state().current_level, 1);
        assert!(!kinds(&log).contains(&EventKind::LevelComplete));
        assert_eq!(
            kinds(&log)
                .iter()
                .filter(|k| **k == EventKind::WaveStarted)
                .count(),
            1
        );
    }

    #[test]
    fn test_matching_key_for_vanished_target_drops_it() {
        let (mut engine, log) = cat_dog_engine();
        engine.on_key_down("c").unwrap();
        let target = engine.get_state().current_target.unwrap();
        // Lose the word without going through removal.
        engine.state.active_words.retain(|w| w.id != target);

        assert_eq!(engine.on_key_down("a").unwrap(), KeyOutcome::TargetLost);
        let state = engine.get_state();
        assert_eq!(state.current_target, None);
        assert!(state.current_typed_word.is_empty());
        assert_eq!(kinds(&log).last(), Some(&EventKind::ResetWordState));
    }

    #[test]
    fn test_first_char_pointing_at_missing_word_is_fatal() {
        let (mut engine, _log) = cat_dog_engine();
        engine.state.active_words.retain(|w| w.word != "dog");

        let err = engine.on_key_down("d").unwrap_err();
        assert!(matches!(err, TypingError::MissingTarget(_)));
        assert_eq!(engine.get_state().current_target, None);
    }

    #[test]
    fn test_reset_word_drops_progress() {
        let (mut engine, log) = cat_dog_engine();
        engine.on_key_down("c").unwrap();
        engine.reset_word();
        assert_eq!(engine.get_state().current_target, None);
        assert_eq!(kinds(&log).last(), Some(&EventKind::ResetWordState));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_active_words_have_unique_first_chars(seed in any::<u64>(), removals in 0usize..8) {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let mut engine = TypingEngine::new(
                TypingConfig::default().with_seed(seed).with_starting_level(30),
                LevelCatalog::generate(&mut rng),
                Box::new(WordBank::default()),
            );
            engine.start().unwrap();
            for _ in 0..removals {
                let Some(id) = engine.get_state().active_words.first().map(|w| w.id.clone()) else {
                    break;
                };
                engine.remove_word(&id).unwrap();
                engine.advance(3000.0).unwrap();
            }
            let state = engine.get_state();
            let firsts: HashSet<char> = state.active_words.iter().filter_map(WordObject::first_char).collect();
            prop_assert_eq!(firsts.len(), state.active_words.len());
        }
    }
}
