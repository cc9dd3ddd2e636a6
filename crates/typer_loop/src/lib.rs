//! # typer_loop
//!
//! The game loop half of the typing arcade: the authoritative entity
//! collection and the frame driver that simulates it.
//!
//! This crate provides:
//!
//! - [`EntityRegistry`]: id to entity map in insertion order, with a
//!   secondary enemy index and uniqueness guarantees.
//! - [`GameLoop`]: start/pause/end lifecycle, per-frame update and draw hooks
//!   wrapped around the default traversals, and keyboard fan-out.
//! - [`DeltaTracker`]: frame delta from host timestamps; reports zero on the
//!   first frame after (re)starting.
//! - [`LoopConfig`]: frame pacing for drivers.

pub mod config;
pub mod delta;
pub mod error;
pub mod game_loop;
pub mod registry;

pub use config::LoopConfig;
pub use delta::DeltaTracker;
pub use error::{HookError, LoopError, RegistryError};
pub use game_loop::{
    DefaultDraw, DefaultUpdate, DrawHook, FrameOutcome, GameLoop, KeyEvent, KeyListener,
    LoopState, UpdateHook,
};
pub use registry::EntityRegistry;
