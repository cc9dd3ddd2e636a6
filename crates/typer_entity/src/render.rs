//! Draw contract between the simulation and the rendering collaborator.

use crate::entity::Facing;
use crate::id::EntityId;
use crate::kind::KindTag;
use crate::visual::Visual;
use typer_math::Bounds;

/// Read-only draw data for one entity in one frame.
#[derive(Debug, Clone, Copy)]
pub struct DrawView<'a> {
    pub id: &'a EntityId,
    pub tag: KindTag,
    pub bounds: Bounds,
    pub facing: Facing,
    pub visual: &'a Visual,
}

/// The rendering collaborator.
///
/// Called once per active entity per frame, in registry order. Renderers
/// receive borrowed views and cannot mutate entity state.
pub trait Renderer {
    /// Draw one entity.
    fn draw(&mut self, view: &DrawView<'_>);

    /// Called once before the first entity of a frame.
    fn begin_frame(&mut self) {}

    /// Called once after the last entity of a frame.
    fn end_frame(&mut self) {}
}
