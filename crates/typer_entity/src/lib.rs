//! # typer_entity
//!
//! The simulation unit of the typing arcade.
//!
//! This crate provides:
//!
//! - [`EntityId`]: immutable string identifiers, caller-supplied or generated.
//! - [`Entity`] / [`EntityInit`]: the flat entity record and its constructor
//!   arguments. Position and size are always required.
//! - [`EntityKind`]: the tag distinguishing plain entities, the boundary,
//!   enemies and fading text, with behaviour dispatched through a per-kind
//!   function table.
//! - [`Visual`]: fill/stroke colours, sprite reference and text runs consumed
//!   by the rendering collaborator.
//! - [`Renderer`]: the draw contract. Renderers only ever see an immutable
//!   [`DrawView`].

pub mod entity;
pub mod id;
pub mod kind;
pub mod render;
pub mod visual;

pub use entity::{Entity, EntityInit, Facing, UpdateOutcome};
pub use id::EntityId;
pub use kind::{EnemyState, EntityKind, FadeTextState, KindTag};
pub use render::{DrawView, Renderer};
pub use visual::{SheetRect, SpriteRef, TextRun, Visual};
