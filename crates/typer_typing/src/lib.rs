//! # typer_typing
//!
//! The typing half of the typing arcade. It knows nothing about entities or
//! rendering: it generates words, matches keystrokes against a single
//! targeted word and sequences levels and waves, reporting everything through
//! an event bus.
//!
//! This crate provides:
//!
//! - [`TypingEngine`]: the level/wave state machine and keystroke matcher.
//! - [`EventBus`] and [`TypingEvent`]: typed subscriptions keyed by
//!   [`EventKind`].
//! - [`Level`], [`Wave`] and [`Trigger`]: declarative level data, plus
//!   [`LevelCatalog`] with a procedural generator.
//! - [`WordSource`]: where candidate words come from ([`WordBank`],
//!   [`PracticeKeys`]).
//! - [`TypingConfig`]: seed, starting level and input filtering.

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod level;
pub mod state;
pub mod words;

pub use config::TypingConfig;
pub use engine::{KeyOutcome, Suspension, TypingEngine};
pub use error::TypingError;
pub use event::{EventBus, EventKind, Listener, RemovalCause, TypingEvent};
pub use level::{CharacterCount, EnemyConfig, EnemyType, Level, LevelCatalog, Trigger, Wave};
pub use state::{TypingState, WordObject};
pub use words::{PracticeKeys, WordBank, WordSource};
