//! Headless renderer that logs draw calls.

use tracing::{debug, trace};
use typer_entity::{DrawView, Renderer};

/// Counts and traces every draw call.
#[derive(Debug, Default)]
pub struct LogRenderer {
    frames: u64,
    draws_this_frame: usize,
    total_draws: u64,
}

impl LogRenderer {
    /// Returns the number of frames drawn.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Returns the number of draw calls across all frames.
    #[must_use]
    pub fn total_draws(&self) -> u64 {
        self.total_draws
    }
}

impl Renderer for LogRenderer {
    fn begin_frame(&mut self) {
        self.draws_this_frame = 0;
    }

    fn draw(&mut self, view: &DrawView<'_>) {
        self.draws_this_frame += 1;
        self.total_draws += 1;
        trace!(
            id = %view.id,
            kind = view.tag.name(),
            x = view.bounds.position.x,
            y = view.bounds.position.y,
            facing = view.facing.sign(),
            text = %view.visual.text_value(),
            "draw"
        );
    }

    fn end_frame(&mut self) {
        self.frames += 1;
        if self.frames % 60 == 0 {
            debug!(frame = self.frames, entities = self.draws_this_frame, "frame drawn");
        }
    }
}
