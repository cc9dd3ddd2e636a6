//! Session error type.

use typer_loop::RegistryError;
use typer_typing::TypingError;

/// Errors that end a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Typing(#[from] TypingError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
