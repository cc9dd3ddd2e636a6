//! Registry and loop error types.

use typer_entity::EntityId;

/// Error type returned by hooks and key listeners.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the entity registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// An entity with this id is already registered.
    #[error("entity id {0} is not unique")]
    DuplicateId(EntityId),
}

/// Errors raised by the game loop.
#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    /// The operation needs a started loop.
    #[error("game loop is not running")]
    NotRunning,

    /// An update hook, draw hook or key listener failed.
    #[error("hook failed: {0}")]
    Hook(HookError),
}
