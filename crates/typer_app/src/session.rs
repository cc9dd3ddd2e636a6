//! Session glue between the typing engine and the entity registry.
//!
//! The engine decides which words exist; the session mirrors them as enemy
//! entities. Engine events arrive through an unbounded channel fed by a
//! catch-all subscription and are drained after every engine call, so
//! entity changes happen outside the engine's own call stack.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, warn};
use typer_entity::{EntityId, EntityInit, Facing, SpriteRef, TextRun, Visual};
use typer_loop::{DefaultUpdate, EntityRegistry};
use typer_math::{PhaseAccumulator, Size, Vec2};
use typer_typing::{KeyOutcome, TypingEngine, TypingError, TypingEvent, TypingState, WordObject};

use crate::audio::{AudioSink, Cue};
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::hud::{Health, KeyStats, Score};

/// Id of the strip enemies must not reach.
pub const BOUNDARY_ID: &str = "boundary";

/// Id of the player sprite.
pub const PLAYER_ID: &str = "player";

const SCORE_RGB: [u8; 3] = [245, 197, 66];

/// Upward drift of the score label, in world units per second.
const SCORE_RISE: f32 = 40.0;

/// The enemy entity mirroring word `word_id`.
#[must_use]
pub fn enemy_id(word_id: &str) -> EntityId {
    EntityId::new(format!("enemy-{word_id}"))
}

/// End-of-run summary printed by the binary.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub frames: u64,
    pub level: u32,
    pub score: Score,
    pub health: Health,
    pub keys: KeyStats,
    pub accuracy: f64,
    pub game_over: bool,
    pub cleared: bool,
}

/// One play-through: the typing engine plus everything the player sees.
pub struct Session {
    config: SessionConfig,
    engine: TypingEngine,
    events: UnboundedReceiver<TypingEvent>,
    audio: Box<dyn AudioSink>,
    rng: Xoshiro256PlusPlus,
    health: Health,
    score: Score,
    stats: KeyStats,
    /// Enemies waiting to be activated, oldest first.
    staged: VecDeque<EntityId>,
    stagger_elapsed_ms: f32,
    /// Enemy whose text is currently split into typed and remaining runs.
    highlighted: Option<EntityId>,
    game_over: bool,
    /// Every level in the catalogue was completed.
    cleared: bool,
}

impl Session {
    /// Build an idle session. Nothing is spawned until [`begin`](Self::begin).
    pub fn new(
        config: SessionConfig,
        engine: TypingEngine,
        audio: Box<dyn AudioSink>,
        seed: u64,
    ) -> Self {
        // Replaced by a live channel in `begin`.
        let (_, events) = mpsc::unbounded_channel();
        Self {
            health: Health::new(config.max_health),
            config,
            engine,
            events,
            audio,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            score: Score::default(),
            stats: KeyStats::default(),
            staged: VecDeque::new(),
            stagger_elapsed_ms: 0.0,
            highlighted: None,
            game_over: false,
            cleared: false,
        }
    }

    /// Returns the typing engine this session drives.
    #[must_use]
    pub fn engine(&self) -> &TypingEngine {
        &self.engine
    }

    /// `true` once health ran out or every level was cleared.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.game_over || self.cleared
    }

    /// Subscribe to the engine through a fresh channel.
    ///
    /// The engine drops every subscription when it ends, so this runs once
    /// per play-through.
    fn connect(&mut self) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.engine.subscribe_all(Box::new(move |event: &TypingEvent| {
            let _ = tx.send(event.clone());
        }));
        self.events = rx;
    }

    /// Set up the playfield and start the engine.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Registry`] if the playfield entities already
    /// exist, or [`SessionError::Typing`] if the starting level cannot be
    /// entered.
    pub fn begin(&mut self, registry: &mut EntityRegistry) -> Result<(), SessionError> {
        self.connect();
        self.health.reset();
        self.score = Score::default();
        self.stats = KeyStats::default();
        self.staged.clear();
        self.stagger_elapsed_ms = 0.0;
        self.highlighted = None;
        self.game_over = false;
        self.cleared = false;

        let config = &self.config;
        registry.create(
            EntityInit::boundary(
                Vec2::ZERO,
                Size::new(config.boundary_width, config.field_height),
            )
            .with_id(BOUNDARY_ID)
            .with_visual(Visual::new().with_fill("#3a3a3a")),
        )?;
        registry.create(
            EntityInit::plain(
                Vec2::new(
                    config.boundary_width,
                    (config.field_height - config.enemy_size) / 2.0,
                ),
                Size::square(config.enemy_size),
            )
            .with_id(PLAYER_ID)
            .with_visual(Visual::new().with_sprite(SpriteRef::new("player"))),
        )?;

        info!(
            max_health = self.health.max(),
            lanes = self.lane_count(),
            "session started"
        );
        // A missing starting level is a configuration error, not a cleared run.
        self.engine.start()?;
        self.apply_events(registry)
    }

    /// Per-frame update hook body.
    ///
    /// Releases staged enemies, runs the default traversal, turns boundary
    /// contact into forced word removal and advances engine time.
    ///
    /// # Errors
    ///
    /// Propagates fatal engine and registry errors.
    pub fn update(
        &mut self,
        registry: &mut EntityRegistry,
        dt: f32,
        default: DefaultUpdate,
    ) -> Result<(), SessionError> {
        self.release_staged(registry, dt);
        default(registry, dt);

        for id in registry.enemies_at_boundary() {
            let Some(word_id) = registry
                .enemy(id.as_str())
                .and_then(|entity| entity.enemy())
                .map(|enemy| enemy.word_id.clone())
            else {
                continue;
            };
            let removed = self.engine.remove_word(&word_id);
            match self.settle(removed)? {
                Some(true) => self.take_damage(),
                Some(false) => {
                    warn!(%id, word_id = %word_id, "enemy outlived its word");
                    registry.remove(id.as_str());
                }
                None => {}
            }
        }

        if !self.is_over() {
            let advanced = self.engine.advance(f64::from(dt) * 1000.0);
            self.settle(advanced)?;
        }
        self.apply_events(registry)
    }

    /// Key listener body.
    ///
    /// # Errors
    ///
    /// Propagates fatal engine and registry errors.
    pub fn key_down(&mut self, key: &str, registry: &mut EntityRegistry) -> Result<(), SessionError> {
        if self.is_over() {
            return Ok(());
        }
        let pressed = self.engine.on_key_down(key);
        match self.settle(pressed)? {
            Some(KeyOutcome::Ignored) => {}
            Some(KeyOutcome::Incorrect) => {
                self.stats.incorrect += 1;
                self.audio.play(Cue::IncorrectKey);
            }
            // A keystroke that completed the final level also lands here.
            Some(_) | None => self.stats.correct += 1,
        }
        self.apply_events(registry)
    }

    /// Flip the engine's pause flag. Returns `true` if now paused.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Typing`] if the engine is not running.
    pub fn toggle_paused(&mut self) -> Result<bool, SessionError> {
        Ok(self.engine.toggle_paused()?)
    }

    /// End the engine and discard anything it emitted on the way out.
    pub fn finish(&mut self) {
        self.engine.end();
        let mut dropped = 0usize;
        while self.events.try_recv().is_ok() {
            dropped += 1;
        }
        self.staged.clear();
        self.highlighted = None;
        debug!(dropped, "session finished");
    }

    /// Returns a snapshot of the session for `frames` frames played.
    #[must_use]
    pub fn report(&self, frames: u64) -> SessionReport {
        SessionReport {
            frames,
            level: self.engine.get_state().current_level,
            score: self.score,
            health: self.health,
            keys: self.stats,
            accuracy: self.stats.accuracy(),
            game_over: self.game_over,
            cleared: self.cleared,
        }
    }

    /// Running out of levels after a completed level means the player won;
    /// anything else is fatal.
    fn settle<T>(&mut self, result: Result<T, TypingError>) -> Result<Option<T>, SessionError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(TypingError::OutOfLevels(level)) => {
                info!(level, score = self.score.points, "every level cleared");
                self.cleared = true;
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn take_damage(&mut self) {
        if self.game_over {
            return;
        }
        let left = self.health.damage();
        self.audio.play(Cue::Damage);
        info!(health = left, "enemy reached the boundary");
        if self.health.is_depleted() {
            self.game_over = true;
            self.audio.play(Cue::GameOver);
            info!(
                score = self.score.points,
                words = self.score.words,
                "game over"
            );
        }
    }

    /// Drain and apply everything the engine emitted.
    fn apply_events(&mut self, registry: &mut EntityRegistry) -> Result<(), SessionError> {
        while let Ok(event) = self.events.try_recv() {
            self.apply(event, registry)?;
        }
        Ok(())
    }

    fn apply(&mut self, event: TypingEvent, registry: &mut EntityRegistry) -> Result<(), SessionError> {
        match event {
            TypingEvent::InitializeLevel { level, .. } => {
                info!(level, "level started");
                self.audio.play(Cue::LevelStarted);
            }
            TypingEvent::WaveStarted { level, wave, words } => {
                debug!(level, wave, words = words.len(), "spawning wave");
                self.spawn_wave(registry, &words)?;
                self.audio.play(Cue::WaveStarted);
            }
            TypingEvent::WaveEnded { level, wave } => debug!(level, wave, "wave ended"),
            TypingEvent::LevelComplete { level } => {
                info!(level, score = self.score.points, "level complete");
                self.audio.play(Cue::LevelComplete);
            }
            TypingEvent::UpdateCurrentlyTypedWord { state } => self.highlight(registry, &state),
            TypingEvent::ResetWordState { .. } => self.clear_highlight(registry),
            TypingEvent::TypedFullWord { id, word } => self.award(registry, &id, &word)?,
            TypingEvent::WordRemoved { id, cause, .. } => {
                let entity = enemy_id(&id);
                debug!(%entity, ?cause, "removing enemy");
                self.staged.retain(|staged| staged != &entity);
                if self.highlighted.as_ref() == Some(&entity) {
                    self.highlighted = None;
                }
                registry.remove(entity.as_str());
            }
            TypingEvent::IncorrectKey { key, expected } => debug!(key = %key, ?expected, "incorrect key"),
            TypingEvent::SessionEnded => debug!("typing engine ended"),
        }
        Ok(())
    }

    fn lane_count(&self) -> usize {
        let config = &self.config;
        let span = (config.field_height - config.lane_top - config.enemy_size).max(0.0);
        (span / config.lane_spacing.max(1.0)) as usize + 1
    }

    /// Create one inactive enemy per word and queue them for release.
    fn spawn_wave(
        &mut self,
        registry: &mut EntityRegistry,
        words: &[WordObject],
    ) -> Result<(), SessionError> {
        if self.staged.is_empty() {
            // First enemy goes out on the next frame.
            self.stagger_elapsed_ms = self.config.stagger_ms;
        }
        let lanes = self.lane_count();
        let low = self.config.min_speed.min(self.config.max_speed);
        let high = self.config.min_speed.max(self.config.max_speed);

        for (index, word) in words.iter().enumerate() {
            let lane = index % lanes;
            let position = Vec2::new(
                self.config.spawn_x,
                self.config.lane_top + lane as f32 * self.config.lane_spacing,
            );
            let speed = self.rng.gen_range(low..=high);
            let wobble = PhaseAccumulator::new(self.rng.gen_range(0.0..TAU));
            let visual = Visual::new()
                .with_sprite(SpriteRef::new("enemy1"))
                .with_text(TextRun::new(word.word.clone()));

            let init = EntityInit::enemy(
                word.id.clone(),
                word.word.clone(),
                EntityId::from(BOUNDARY_ID),
                position,
                Size::square(self.config.enemy_size),
            )
            .with_id(enemy_id(&word.id))
            .with_velocity(Vec2::new(-speed, 0.0))
            .with_facing(Facing::Left)
            .with_visual(visual)
            .with_wobble(wobble, self.config.wobble_amplitude)
            .inactive();

            let id = registry.create(init)?.id().clone();
            self.staged.push_back(id);
        }
        Ok(())
    }

    /// Activate staged enemies one per stagger interval.
    fn release_staged(&mut self, registry: &mut EntityRegistry, dt: f32) {
        if self.staged.is_empty() {
            return;
        }
        self.stagger_elapsed_ms += dt * 1000.0;
        while self.stagger_elapsed_ms >= self.config.stagger_ms {
            let Some(id) = self.staged.pop_front() else {
                break;
            };
            self.stagger_elapsed_ms -= self.config.stagger_ms;
            if let Some(entity) = registry.get_mut(id.as_str()) {
                entity.activate();
                debug!(%id, "enemy released");
            }
        }
    }

    /// Split the target's text into typed and remaining runs.
    fn highlight(&mut self, registry: &mut EntityRegistry, state: &TypingState) {
        let Some(target) = state.target() else {
            self.clear_highlight(registry);
            return;
        };
        let id = enemy_id(&target.id);
        if self.highlighted.as_ref() != Some(&id) {
            self.clear_highlight(registry);
        }

        let typed_len = state.current_typed_word.chars().count();
        let typed: String = target.word.chars().take(typed_len).collect();
        let rest: String = target.word.chars().skip(typed_len).collect();
        if let Some(entity) = registry.get_mut(id.as_str()) {
            entity.visual.text = vec![
                TextRun::new(typed).with_fill(self.config.typed_fill.clone()),
                TextRun::new(rest),
            ];
            self.highlighted = Some(id);
        }
    }

    /// Put the highlighted enemy's text back to a single run.
    fn clear_highlight(&mut self, registry: &mut EntityRegistry) {
        let Some(id) = self.highlighted.take() else {
            return;
        };
        if let Some(entity) = registry.get_mut(id.as_str()) {
            if let Some(word) = entity.enemy().map(|enemy| enemy.word.clone()) {
                entity.visual.text = vec![TextRun::new(word)];
            }
        }
    }

    /// Score a typed word and float a label where its enemy was.
    fn award(
        &mut self,
        registry: &mut EntityRegistry,
        word_id: &str,
        word: &str,
    ) -> Result<(), SessionError> {
        let earned = self.score.credit(word, self.config.points_per_char);
        self.audio.play(Cue::WordDestroyed);
        let position = registry
            .get(enemy_id(word_id).as_str())
            .map_or(Vec2::new(self.config.spawn_x, self.config.lane_top), |entity| {
                entity.bounds().center()
            });
        registry.create(
            EntityInit::fade_text(
                format!("+{earned}"),
                SCORE_RGB,
                self.config.score_label_ttl_ms,
                position,
            )
            .with_velocity(Vec2::new(0.0, -SCORE_RISE)),
        )?;
        info!(word, earned, total = self.score.points, "word typed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use typer_entity::KindTag;
    use typer_typing::{CharacterCount, Level, LevelCatalog, Trigger, TypingConfig, Wave, WordBank};

    use super::*;

    #[derive(Clone, Default)]
    struct RecordingAudio(Rc<RefCell<Vec<Cue>>>);

    impl AudioSink for RecordingAudio {
        fn play(&mut self, cue: Cue) {
            self.0.borrow_mut().push(cue);
        }
    }

    fn two_slot_level() -> Level {
        Level {
            character_count: CharacterCount::Exact(3),
            waves: vec![Wave::with_enemies(Trigger::First, 2)],
        }
    }

    fn default_update(registry: &mut EntityRegistry, dt: f32) {
        registry.update_all(dt);
    }

    fn session(config: SessionConfig) -> (Session, EntityRegistry, RecordingAudio) {
        let catalog = LevelCatalog::from_levels(vec![two_slot_level(), two_slot_level()]);
        let engine = TypingEngine::new(
            TypingConfig::default().with_seed(11),
            catalog,
            Box::new(WordBank::new(["cat", "dog"])),
        );
        let audio = RecordingAudio::default();
        let mut registry = EntityRegistry::new();
        let mut session = Session::new(config, engine, Box::new(audio.clone()), 5);
        session.begin(&mut registry).unwrap();
        (session, registry, audio)
    }

    fn press_all(session: &mut Session, registry: &mut EntityRegistry, keys: &str) {
        for key in keys.chars() {
            session.key_down(&key.to_string(), registry).unwrap();
        }
    }

    fn active_enemies(registry: &EntityRegistry) -> usize {
        registry.enemies().filter(|e| e.is_active()).count()
    }

    #[test]
    fn test_begin_creates_playfield_and_stages_wave() {
        let (session, registry, audio) = session(SessionConfig::default());
        assert!(registry.contains(BOUNDARY_ID));
        assert!(registry.contains(PLAYER_ID));
        assert_eq!(registry.enemy_count(), 2);
        assert_eq!(active_enemies(&registry), 0);
        assert!(registry.contains(enemy_id("1-0-0").as_str()));
        assert_eq!(session.staged.len(), 2);
        assert_eq!(
            *audio.0.borrow(),
            vec![Cue::LevelStarted, Cue::WaveStarted]
        );
    }

    #[test]
    fn test_staged_enemies_are_released_one_by_one() {
        let (mut session, mut registry, _) = session(SessionConfig {
            stagger_ms: 400.0,
            ..SessionConfig::default()
        });
        session.update(&mut registry, 0.0, default_update).unwrap();
        assert_eq!(active_enemies(&registry), 1);
        session.update(&mut registry, 0.2, default_update).unwrap();
        assert_eq!(active_enemies(&registry), 1);
        session.update(&mut registry, 0.25, default_update).unwrap();
        assert_eq!(active_enemies(&registry), 2);
        assert!(session.staged.is_empty());
    }

    #[test]
    fn test_enemies_walk_left() {
        let (mut session, mut registry, _) = session(SessionConfig {
            min_speed: 50.0,
            max_speed: 50.0,
            ..SessionConfig::default()
        });
        session.update(&mut registry, 0.0, default_update).unwrap();
        let id = registry.ids().into_iter().find(|id| {
            registry.get(id.as_str()).is_some_and(|e| e.is_enemy() && e.is_active())
        });
        let id = id.unwrap();
        session.update(&mut registry, 1.0, default_update).unwrap();
        let enemy = registry.get(id.as_str()).unwrap();
        assert!((enemy.position.x - 770.0).abs() < 1e-3);
        assert_eq!(enemy.facing, Facing::Left);
    }

    #[test]
    fn test_typing_word_scores_and_spawns_label() {
        let (mut session, mut registry, audio) = session(SessionConfig::default());
        press_all(&mut session, &mut registry, "cat");

        let report = session.report(0);
        assert_eq!(report.score.points, 30);
        assert_eq!(report.score.words, 1);
        assert_eq!(report.keys.correct, 3);
        assert_eq!(registry.enemy_count(), 1);
        assert!(session.engine().get_state().current_target.is_none());

        let label = registry
            .iter()
            .find(|e| e.tag() == KindTag::FadeText)
            .unwrap();
        assert_eq!(label.visual.text_value(), "+30");
        assert!(label.velocity.y < 0.0);
        assert!(audio.0.borrow().contains(&Cue::WordDestroyed));
    }

    #[test]
    fn test_typed_progress_is_highlighted() {
        let (mut session, mut registry, _) = session(SessionConfig::default());
        press_all(&mut session, &mut registry, "ca");

        let target = session.engine().get_state().current_target.unwrap();
        let enemy = registry.get(enemy_id(&target).as_str()).unwrap();
        assert_eq!(enemy.visual.text.len(), 2);
        assert_eq!(enemy.visual.text[0].value, "ca");
        assert_eq!(enemy.visual.text[0].fill.as_deref(), Some("#f5c542"));
        assert_eq!(enemy.visual.text[1].value, "t");

        session.engine.reset_word();
        session.apply_events(&mut registry).unwrap();
        let enemy = registry.get(enemy_id(&target).as_str()).unwrap();
        assert_eq!(enemy.visual.text.len(), 1);
        assert_eq!(enemy.visual.text_value(), "cat");
    }

    #[test]
    fn test_incorrect_key_is_counted() {
        let (mut session, mut registry, audio) = session(SessionConfig::default());
        press_all(&mut session, &mut registry, "cx");
        let report = session.report(0);
        assert_eq!(report.keys.correct, 1);
        assert_eq!(report.keys.incorrect, 1);
        assert!(audio.0.borrow().contains(&Cue::IncorrectKey));
    }

    fn push_to_boundary(registry: &mut EntityRegistry) {
        for id in registry.ids() {
            if let Some(entity) = registry.get_mut(id.as_str()) {
                if entity.is_enemy() {
                    entity.activate();
                    entity.position.x = 0.0;
                    entity.velocity = Vec2::ZERO;
                }
            }
        }
    }

    #[test]
    fn test_boundary_contact_costs_health() {
        let (mut session, mut registry, audio) = session(SessionConfig::default());
        push_to_boundary(&mut registry);
        session.update(&mut registry, 0.0, default_update).unwrap();

        let report = session.report(1);
        assert_eq!(report.health.current(), 2);
        assert!(!report.game_over);
        assert_eq!(report.score.points, 0);
        // Both words gone, so level 2 spawned its own wave.
        assert_eq!(report.level, 2);
        assert_eq!(registry.enemy_count(), 2);
        assert_eq!(
            audio.0.borrow().iter().filter(|c| **c == Cue::Damage).count(),
            2
        );
    }

    #[test]
    fn test_depleted_health_ends_the_game() {
        let (mut session, mut registry, audio) = session(SessionConfig::default().with_max_health(1));
        push_to_boundary(&mut registry);
        session.update(&mut registry, 0.0, default_update).unwrap();

        assert!(session.is_over());
        let report = session.report(1);
        assert!(report.game_over);
        assert_eq!(report.health.current(), 0);
        assert_eq!(
            audio.0.borrow().iter().filter(|c| **c == Cue::GameOver).count(),
            1
        );

        press_all(&mut session, &mut registry, "d");
        assert_eq!(session.report(1).keys.correct, 0);
    }

    #[test]
    fn test_clearing_every_level_is_not_an_error() {
        let (mut session, mut registry, _) = session(SessionConfig::default());
        press_all(&mut session, &mut registry, "catdog");
        assert_eq!(session.engine().get_state().current_level, 2);
        press_all(&mut session, &mut registry, "catdog");
        assert!(session.is_over());
        assert!(session.report(0).cleared);
        assert_eq!(session.report(0).score.points, 120);
    }

    #[test]
    fn test_missing_starting_level_fails_to_begin() {
        let engine = TypingEngine::new(
            TypingConfig::default().with_starting_level(5),
            LevelCatalog::from_levels(vec![two_slot_level()]),
            Box::new(WordBank::new(["cat", "dog"])),
        );
        let mut registry = EntityRegistry::new();
        let mut session = Session::new(
            SessionConfig::default(),
            engine,
            Box::new(RecordingAudio::default()),
            5,
        );
        let err = session.begin(&mut registry).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Typing(TypingError::OutOfLevels(5))
        ));
        assert!(!session.is_over());
        assert!(!session.report(0).cleared);
    }

    #[test]
    fn test_finish_drops_subscription() {
        let (mut session, mut registry, _) = session(SessionConfig::default());
        session.finish();
        assert!(!session.engine().is_active());
        assert!(session.staged.is_empty());
        session.apply_events(&mut registry).unwrap();
        assert_eq!(registry.enemy_count(), 2);
    }
}
