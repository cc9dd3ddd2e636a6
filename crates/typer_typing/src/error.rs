//! Typing engine error types.

/// Errors raised by the typing engine.
///
/// All of these halt the current session; benign conditions such as an
/// incorrect keystroke are reported as events instead.
#[derive(Debug, thiserror::Error)]
pub enum TypingError {
    /// There is no level definition for this level number.
    #[error("no level definition for level {0}")]
    OutOfLevels(u32),

    /// A wave after the first one uses the `first` trigger.
    #[error("level {level} wave {wave} uses the `first` trigger, which only wave 0 may use")]
    IllegalFirstTrigger { level: u32, wave: usize },

    /// A first keystroke matched a word id that is no longer active.
    #[error("word {0} was matched by its first character but is not active")]
    MissingTarget(String),

    /// The operation needs a started engine.
    #[error("typing engine is not active")]
    NotActive,
}
