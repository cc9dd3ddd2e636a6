//! Axis-aligned bounds and the collision predicate.
//!
//! [`Bounds`] pairs a top-left position with a [`Size`]. Two bounds collide
//! when both axis projections overlap on closed intervals, so boxes that
//! merely share an edge are reported as colliding.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Width and height of an entity, in world units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Size {
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A square of the given side length.
    #[must_use]
    pub const fn square(side: f32) -> Self {
        Self::new(side, side)
    }

    /// The size as a vector `(width, height)`.
    #[must_use]
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// An axis-aligned box anchored at its top-left corner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    /// Top-left corner.
    pub position: Vec2,
    /// Extent from the corner.
    pub size: Size,
}

impl Bounds {
    /// Create bounds from a corner and a size.
    #[must_use]
    pub const fn new(position: Vec2, size: Size) -> Self {
        Self { position, size }
    }

    /// The x coordinate of the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.position.x + self.size.width
    }

    /// The y coordinate of the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.height
    }

    /// The centre point of the box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.size.to_vec2() * 0.5
    }

    /// Returns `true` if the two boxes overlap on both axes, edges included.
    ///
    /// The predicate is symmetric: `a.overlaps(&b) == b.overlaps(&a)`.
    #[must_use]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.position.x <= other.right()
            && self.right() >= other.position.x
            && self.position.y <= other.bottom()
            && self.bottom() >= other.position.y
    }
}
