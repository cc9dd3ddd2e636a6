//! Typed event bus.
//!
//! Listeners subscribe per [`EventKind`] or to every event. Subscription
//! lists only grow during a session and are dropped together on
//! [`EventBus::clear`]. Events are emitted after the state change they
//! describe has been applied.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::{TypingState, WordObject};

/// Why a word left the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCause {
    /// The player typed it.
    Typed,
    /// Removed through [`TypingEngine::remove_word`](crate::TypingEngine::remove_word).
    Forced,
}

/// Everything the typing engine tells its subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypingEvent {
    /// A level was entered. Always precedes the level's first `WaveStarted`.
    InitializeLevel { level: u32, state: TypingState },
    /// A wave's words were added to the active set.
    WaveStarted {
        level: u32,
        wave: usize,
        words: Vec<WordObject>,
    },
    /// The last word of a wave was removed.
    WaveEnded { level: u32, wave: usize },
    /// The last word of a level was removed after all its waves started.
    LevelComplete { level: u32 },
    /// The targeted word gained a typed character.
    UpdateCurrentlyTypedWord { state: TypingState },
    /// The player finished typing a word.
    TypedFullWord { id: String, word: String },
    /// A word left the active set.
    WordRemoved {
        id: String,
        word: String,
        cause: RemovalCause,
    },
    /// The target and typed progress were dropped.
    ResetWordState { state: TypingState },
    /// A keystroke did not match. Informational only.
    IncorrectKey { key: String, expected: Option<char> },
    /// The engine was ended.
    SessionEnded,
}

impl TypingEvent {
    /// Returns the discriminant used for kind subscriptions.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            TypingEvent::InitializeLevel { .. } => EventKind::InitializeLevel,
            TypingEvent::WaveStarted { .. } => EventKind::WaveStarted,
            TypingEvent::WaveEnded { .. } => EventKind::WaveEnded,
            TypingEvent::LevelComplete { .. } => EventKind::LevelComplete,
            TypingEvent::UpdateCurrentlyTypedWord { .. } => EventKind::UpdateCurrentlyTypedWord,
            TypingEvent::TypedFullWord { .. } => EventKind::TypedFullWord,
            TypingEvent::WordRemoved { .. } => EventKind::WordRemoved,
            TypingEvent::ResetWordState { .. } => EventKind::ResetWordState,
            TypingEvent::IncorrectKey { .. } => EventKind::IncorrectKey,
            TypingEvent::SessionEnded => EventKind::SessionEnded,
        }
    }
}

/// Data-free discriminant of [`TypingEvent`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    InitializeLevel,
    WaveStarted,
    WaveEnded,
    LevelComplete,
    UpdateCurrentlyTypedWord,
    TypedFullWord,
    WordRemoved,
    ResetWordState,
    IncorrectKey,
    SessionEnded,
}

/// A subscriber callback.
pub type Listener = Box<dyn FnMut(&TypingEvent)>;

/// Per-kind subscription lists plus catch-all listeners.
#[derive(Default)]
pub struct EventBus {
    by_kind: HashMap<EventKind, Vec<Listener>>,
    any: Vec<Listener>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one kind of event.
    pub fn on(&mut self, kind: EventKind, listener: Listener) {
        self.by_kind.entry(kind).or_default().push(listener);
    }

    /// Subscribe to every event.
    pub fn on_any(&mut self, listener: Listener) {
        self.any.push(listener);
    }

    /// Deliver an event: kind listeners first, then catch-all listeners, each
    /// in subscription order.
    pub fn emit(&mut self, event: &TypingEvent) {
        if let Some(listeners) = self.by_kind.get_mut(&event.kind()) {
            for listener in listeners {
                listener(event);
            }
        }
        for listener in &mut self.any {
            listener(event);
        }
    }

    /// Drop every subscription.
    pub fn clear(&mut self) {
        self.by_kind.clear();
        self.any.clear();
    }

    /// Total number of subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.any.len() + self.by_kind.values().map(Vec::len).sum::<usize>()
    }

    /// Returns `true` if nothing is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_kind_listeners_only_see_their_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let sink = Rc::clone(&seen);
        bus.on(
            EventKind::WaveEnded,
            Box::new(move |event| sink.borrow_mut().push(event.kind())),
        );

        bus.emit(&TypingEvent::SessionEnded);
        bus.emit(&TypingEvent::WaveEnded { level: 1, wave: 0 });

        assert_eq!(*seen.borrow(), vec![EventKind::WaveEnded]);
    }

    #[test]
    fn test_catch_all_runs_after_kind_listeners() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let any = Rc::clone(&order);
        bus.on_any(Box::new(move |_| any.borrow_mut().push("any")));
        let kind = Rc::clone(&order);
        bus.on(
            EventKind::SessionEnded,
            Box::new(move |_| kind.borrow_mut().push("kind")),
        );

        bus.emit(&TypingEvent::SessionEnded);

        assert_eq!(*order.borrow(), vec!["kind", "any"]);
    }

    #[test]
    fn test_clear_drops_subscriptions() {
        let mut bus = EventBus::new();
        bus.on_any(Box::new(|_| {}));
        bus.on(EventKind::TypedFullWord, Box::new(|_| {}));
        assert_eq!(bus.len(), 2);
        bus.clear();
        assert!(bus.is_empty());
    }
}
