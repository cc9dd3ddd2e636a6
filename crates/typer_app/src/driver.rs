//! Headless frame driver.
//!
//! Plays the menu's role: starts and ends the loop and the engine in
//! matching pairs and maps `Escape` to a pause toggle on both. Frames are
//! paced by a tokio interval; the simulated typist presses whatever keys
//! fell due since the previous frame.

use std::time::Duration;

use anyhow::{Context, Result, ensure};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, info};
use typer_loop::{GameLoop, LoopConfig};
use typer_typing::{LevelCatalog, PracticeKeys, TypingConfig, TypingEngine, WordBank, WordSource};

use crate::audio::LogAudio;
use crate::cli::Args;
use crate::config::SessionConfig;
use crate::render::LogRenderer;
use crate::session::{Session, SessionReport};
use crate::typist::Typist;

/// Key that toggles pause.
pub const PAUSE_KEY: &str = "Escape";

/// Shortest frame period the driver will pace at.
const MIN_FRAME_PERIOD: Duration = Duration::from_millis(1);

/// Owns the loop, the session and the collaborators around them.
pub struct Driver {
    game: GameLoop<Session>,
    session: Session,
    renderer: LogRenderer,
    typist: Typist,
}

impl Driver {
    /// Build a driver from command line arguments.
    ///
    /// # Errors
    ///
    /// Fails if the frame rate is not positive, a level file cannot be read
    /// or parsed, or the starting level does not exist.
    pub fn new(args: &Args) -> Result<Self> {
        ensure!(
            args.frame_rate.is_finite() && args.frame_rate > 0.0,
            "frame rate must be positive, got {}",
            args.frame_rate
        );

        let catalog = match &args.levels {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading levels from {}", path.display()))?;
                LevelCatalog::from_json(&json)
                    .with_context(|| format!("parsing levels from {}", path.display()))?
            }
            None => LevelCatalog::generate(&mut Xoshiro256PlusPlus::seed_from_u64(args.seed)),
        };
        ensure!(!catalog.is_empty(), "level catalogue is empty");
        ensure!(
            catalog.get(args.level).is_some(),
            "starting level {} is not in the catalogue (levels 1 to {})",
            args.level,
            catalog.len()
        );
        info!(levels = catalog.len(), practice = args.practice, "levels loaded");

        let source: Box<dyn WordSource> = if args.practice {
            Box::new(PracticeKeys::default())
        } else {
            Box::new(WordBank::default())
        };
        let typing = TypingConfig::default()
            .with_seed(args.seed.wrapping_add(1))
            .with_starting_level(args.level);
        let engine = TypingEngine::new(typing, catalog, source);
        let session = Session::new(
            SessionConfig::default().with_max_health(args.health),
            engine,
            Box::new(LogAudio),
            args.seed.wrapping_add(2),
        );

        let mut game: GameLoop<Session> = GameLoop::new(
            LoopConfig::default()
                .with_frame_rate(args.frame_rate)
                .with_max_frames(args.frames),
        );
        game.set_update(Box::new(|registry, session, dt, default| {
            session.update(registry, dt, default)?;
            Ok(())
        }));
        game.on_key(Box::new(|event, registry, session| {
            session.key_down(&event.key, registry)?;
            Ok(())
        }));

        Ok(Self {
            game,
            session,
            renderer: LogRenderer::default(),
            typist: Typist::new(
                args.seed.wrapping_add(3),
                args.accuracy,
                args.keys_per_second,
            ),
        })
    }

    /// Deliver one key press, handling pause before gameplay sees it.
    ///
    /// # Errors
    ///
    /// Fails if the loop is not running or a key listener fails.
    pub fn press(&mut self, key: &str) -> Result<()> {
        if key == PAUSE_KEY {
            let paused = self.game.toggle_paused()?;
            self.session.toggle_paused()?;
            info!(paused, "pause toggled");
            return Ok(());
        }
        self.game.key_down(key, &mut self.session)?;
        Ok(())
    }

    /// Play one session to completion and tear it down.
    ///
    /// The loop and engine are ended whether or not the session failed.
    ///
    /// # Errors
    ///
    /// Returns the first fatal loop, registry or engine error.
    pub async fn run(&mut self) -> Result<SessionReport> {
        let result = self.pump().await;
        let report = self.session.report(self.game.frame_count());
        self.shutdown();
        result.map(|()| report)
    }

    async fn pump(&mut self) -> Result<()> {
        self.game.start();
        self.session
            .begin(self.game.registry_mut())
            .context("starting session")?;

        // Very high frame rates round to a zero period, which tokio rejects.
        let period = Duration::from_secs_f64(self.game.config().frame_interval_ms() / 1000.0)
            .max(MIN_FRAME_PERIOD);
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let started = Instant::now();
        let mut last = started;

        loop {
            ticker.tick().await;
            let now = Instant::now();
            let elapsed_ms = now.duration_since(last).as_secs_f64() * 1000.0;
            last = now;

            for _ in 0..self.typist.keys_due(elapsed_ms) {
                let state = self.session.engine().get_state();
                let Some(key) = self.typist.next_key(&state) else {
                    break;
                };
                self.press(&key)?;
            }

            let now_ms = now.duration_since(started).as_secs_f64() * 1000.0;
            self.game
                .frame(now_ms, &mut self.session, &mut self.renderer)
                .context("running frame")?;

            if self.session.is_over() {
                info!(frame = self.game.frame_count(), "session over");
                break;
            }
            if self.game.is_exhausted() {
                debug!(frame = self.game.frame_count(), "frame limit reached");
                break;
            }
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        self.game.end();
        self.session.finish();
        info!(
            frames = self.renderer.frames(),
            draws = self.renderer.total_draws(),
            "driver shut down"
        );
    }
}
