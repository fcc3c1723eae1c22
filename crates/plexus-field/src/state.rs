//! The small amount of state shared between the input side of the field and the render side.
//!
//! There is exactly one writer, the [`crate::adapter::ViewportAdapter`]. Everything else gets a
//! shared reference for the duration of a tick.

use glam::Vec2;

/// The size of the drawing surface in surface pixels.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
#[expect(
    clippy::exhaustive_structs,
    reason = "It's very unlikely that this is going to have any more fields added to it"
)]
pub struct Dimensions {
    /// Width of the surface
    pub width: f32,
    /// Height of the surface
    pub height: f32,
}

impl Dimensions {
    /// Instantiate
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether anything could actually be drawn on a surface of this size.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Does the point lie inside `[0, width] × [0, height]`?
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

/// The current state of the viewport: how big it is and where the pointer is.
#[derive(Default, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct ViewportState {
    /// The size of the drawing surface.
    pub dimensions: Dimensions,
    /// The position of the pointer, or `None` when it's outside the interactive area.
    pub pointer: Option<Vec2>,
}
