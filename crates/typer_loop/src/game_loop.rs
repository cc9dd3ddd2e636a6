//! Frame-driven game loop.
//!
//! The host scheduler (an animation-frame callback, a tokio interval, a test)
//! calls [`GameLoop::frame`] with a millisecond timestamp. The loop turns
//! consecutive timestamps into a delta and runs one update and one draw pass:
//!
//! 1. Inactive: nothing happens.
//! 2. Paused: the frame is acknowledged but hooks are skipped.
//! 3. Running: the update hook runs around the default update traversal,
//!    then the draw hook runs around the default draw traversal.
//!
//! Hooks receive a session context `C` owned by the caller, so game state
//! does not have to live in globals.

use std::fmt;

use tracing::{debug, info, trace};
use typer_entity::Renderer;

use crate::config::LoopConfig;
use crate::delta::DeltaTracker;
use crate::error::{HookError, LoopError};
use crate::registry::EntityRegistry;

/// The default update traversal, handed to update hooks.
pub type DefaultUpdate = fn(&mut EntityRegistry, f32);

/// The default draw traversal, handed to draw hooks.
pub type DefaultDraw = fn(&EntityRegistry, &mut dyn Renderer);

/// Runs once per running frame in place of the default update traversal.
///
/// Receives the registry, the session context, the frame delta in seconds and
/// the default traversal to call when it sees fit.
pub type UpdateHook<C> =
    Box<dyn FnMut(&mut EntityRegistry, &mut C, f32, DefaultUpdate) -> Result<(), HookError>>;

/// Runs once per running frame in place of the default draw traversal.
pub type DrawHook<C> = Box<dyn FnMut(&EntityRegistry, &C, &mut dyn Renderer, DefaultDraw)>;

/// Receives every key event, in registration order.
pub type KeyListener<C> =
    Box<dyn FnMut(&KeyEvent, &mut EntityRegistry, &mut C) -> Result<(), HookError>>;

/// A key press from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Key identifier (`"a"`, `"Shift"`, `"Escape"`, ...).
    pub key: String,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Lifecycle state of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Inactive,
    Running,
    Paused,
}

/// What a call to [`GameLoop::frame`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// The loop is not running.
    Stopped,
    /// The loop is paused; no hooks ran.
    Skipped,
    /// Update and draw ran with this delta in seconds.
    Ran { dt: f32 },
}

fn default_update(registry: &mut EntityRegistry, dt: f32) {
    registry.update_all(dt);
}

fn default_draw(registry: &EntityRegistry, renderer: &mut dyn Renderer) {
    registry.draw_all(renderer);
}

/// Owns the entity registry and drives it frame by frame.
pub struct GameLoop<C> {
    state: LoopState,
    config: LoopConfig,
    registry: EntityRegistry,
    delta: DeltaTracker,
    /// Frames run since the last start.
    frame_count: u64,
    update: Option<UpdateHook<C>>,
    draw: Option<DrawHook<C>>,
    listeners: Vec<KeyListener<C>>,
}

impl<C> GameLoop<C> {
    /// Create an inactive loop with an empty registry.
    #[must_use]
    pub fn new(config: LoopConfig) -> Self {
        Self {
            state: LoopState::Inactive,
            config,
            registry: EntityRegistry::new(),
            delta: DeltaTracker::new(),
            frame_count: 0,
            update: None,
            draw: None,
            listeners: Vec::new(),
        }
    }

    /// Returns the current loop state.
    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Returns `true` while started and not paused.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Returns `true` while paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state == LoopState::Paused
    }

    /// Returns the loop configuration.
    #[must_use]
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Frames run since the last [`start`](Self::start).
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns `true` once the configured frame limit has been reached.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.config.max_frames > 0 && self.frame_count >= self.config.max_frames
    }

    /// Returns the entity registry.
    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Returns the entity registry for spawning and despawning.
    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    /// Replace the update hook.
    pub fn set_update(&mut self, hook: UpdateHook<C>) {
        self.update = Some(hook);
    }

    /// Replace the draw hook.
    pub fn set_draw(&mut self, hook: DrawHook<C>) {
        self.draw = Some(hook);
    }

    /// Register a key listener. Listeners run in registration order.
    pub fn on_key(&mut self, listener: KeyListener<C>) {
        self.listeners.push(listener);
    }

    /// Mark the loop running. The next frame reports a delta of zero.
    pub fn start(&mut self) {
        if self.state != LoopState::Inactive {
            debug!(state = ?self.state, "game loop already started");
            return;
        }
        info!(frame_rate = self.config.frame_rate, "game loop started");
        self.state = LoopState::Running;
        self.frame_count = 0;
        self.delta.reset();
    }

    /// Stop the loop and drop every entity.
    pub fn end(&mut self) {
        info!(
            frames = self.frame_count,
            entities = self.registry.len(),
            "game loop ended"
        );
        self.state = LoopState::Inactive;
        self.registry.clear();
        self.delta.reset();
    }

    /// Flip between running and paused. Returns `true` if now paused.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::NotRunning`] if the loop was never started.
    pub fn toggle_paused(&mut self) -> Result<bool, LoopError> {
        self.state = match self.state {
            LoopState::Inactive => return Err(LoopError::NotRunning),
            LoopState::Running => LoopState::Paused,
            LoopState::Paused => LoopState::Running,
        };
        self.delta.reset();
        let paused = self.state == LoopState::Paused;
        info!(paused, "game loop pause toggled");
        Ok(paused)
    }

    /// Run one frame at host time `now_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::Hook`] if the update hook fails. The draw pass is
    /// skipped for that frame.
    pub fn frame(
        &mut self,
        now_ms: f64,
        ctx: &mut C,
        renderer: &mut dyn Renderer,
    ) -> Result<FrameOutcome, LoopError> {
        match self.state {
            LoopState::Inactive => return Ok(FrameOutcome::Stopped),
            LoopState::Paused => return Ok(FrameOutcome::Skipped),
            LoopState::Running => {}
        }

        let dt = self.delta.track(now_ms);
        trace!(frame = self.frame_count, dt, "frame");

        match self.update.as_mut() {
            Some(hook) => hook(&mut self.registry, ctx, dt, default_update).map_err(LoopError::Hook)?,
            None => default_update(&mut self.registry, dt),
        }

        renderer.begin_frame();
        match self.draw.as_mut() {
            Some(hook) => hook(&self.registry, ctx, renderer, default_draw),
            None => default_draw(&self.registry, renderer),
        }
        renderer.end_frame();

        self.frame_count += 1;
        Ok(FrameOutcome::Ran { dt })
    }

    /// Fan a key press out to every listener.
    ///
    /// Listeners run whatever the loop state is, so a paused game can still
    /// react to the key that resumes it.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::Hook`] from the first failing listener; later
    /// listeners do not see the event.
    pub fn key_down(&mut self, key: &str, ctx: &mut C) -> Result<(), LoopError> {
        let event = KeyEvent::new(key);
        debug!(key, listeners = self.listeners.len(), "key down");
        for listener in &mut self.listeners {
            listener(&event, &mut self.registry, ctx).map_err(LoopError::Hook)?;
        }
        Ok(())
    }
}

impl<C> fmt::Debug for GameLoop<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameLoop")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("frame_count", &self.frame_count)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
