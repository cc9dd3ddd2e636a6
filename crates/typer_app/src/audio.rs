//! Audio collaborator.
//!
//! Cues are fire-and-forget. Nothing in the session waits on playback.

use tracing::debug;

/// A discrete gameplay sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    LevelStarted,
    WaveStarted,
    WordDestroyed,
    IncorrectKey,
    Damage,
    LevelComplete,
    GameOver,
}

/// Plays cues.
pub trait AudioSink {
    fn play(&mut self, cue: Cue);
}

/// Logs every cue instead of playing it.
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, cue: Cue) {
        debug!(?cue, "audio cue");
    }
}
