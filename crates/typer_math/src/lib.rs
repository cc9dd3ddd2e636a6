//! # typer_math
//!
//! Math types for the typing arcade. Re-exports [`glam`] for vector algebra
//! and defines the 2D spatial helpers the simulation needs:
//!
//! - [`Size`] and [`Bounds`]: axis-aligned extents and the closed-interval
//!   overlap test used for collisions.
//! - [`PhaseAccumulator`]: restartable sine oscillator for wobbling motion.

pub mod bounds;
pub mod oscillator;

// Re-export glam types for convenience.
pub use glam::Vec2;

pub use bounds::{Bounds, Size};
pub use oscillator::PhaseAccumulator;
