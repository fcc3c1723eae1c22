//! The drawing surface that the field is rendered to.

use color_eyre::eyre::Result;
use glam::Vec2;

use crate::config::Colour;
use crate::state::Dimensions;

/// A rectangular area of the surface.
#[derive(Debug, Copy, Clone, PartialEq)]
#[non_exhaustive]
pub struct Region {
    /// Top-left corner
    pub origin: Vec2,
    /// Width and height
    pub size: Dimensions,
}

impl Region {
    /// The whole of a surface with the given dimensions.
    #[must_use]
    pub const fn whole(size: Dimensions) -> Self {
        Self {
            origin: Vec2::ZERO,
            size,
        }
    }
}

/// Anything that the field can be drawn on. All coordinates are in surface pixels, with the
/// origin in the top-left.
pub trait Canvas {
    /// Ask the host how big the viewport currently is. Called on every resize.
    fn viewport_size(&mut self) -> Result<Dimensions>;

    /// The current dimensions of the surface.
    fn dimensions(&self) -> Dimensions;

    /// Resize the surface.
    fn set_dimensions(&mut self, dimensions: Dimensions) -> Result<()>;

    /// Wipe everything in the region.
    fn clear(&mut self, region: Region) -> Result<()>;

    /// Draw a filled circle.
    fn draw_circle(&mut self, centre: Vec2, radius: f32, fill: Colour) -> Result<()>;

    /// Draw a straight line.
    fn draw_line(&mut self, from: Vec2, to: Vec2, stroke: Colour, width: f32) -> Result<()>;

    /// Show everything drawn since the last call. Surfaces that draw immediately don't need
    /// this.
    fn present(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A single call made on a [`Recorder`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DrawCommand {
    /// `Canvas::clear()`
    Clear(Region),
    /// `Canvas::draw_circle()`
    Circle {
        /// Centre of the circle
        centre: Vec2,
        /// Radius of the circle
        radius: f32,
        /// Fill colour
        fill: Colour,
    },
    /// `Canvas::draw_line()`
    Line {
        /// Start of the line
        from: Vec2,
        /// End of the line
        to: Vec2,
        /// Stroke colour
        stroke: Colour,
        /// Stroke width
        width: f32,
    },
}

/// A canvas that just remembers what was drawn on it. Useful for tests and for running the
/// field headless.
#[derive(Debug, Default, Clone)]
#[non_exhaustive]
pub struct Recorder {
    /// What the host reports as the viewport size. Change it and send a resize to simulate the
    /// host resizing.
    pub viewport: Dimensions,
    /// The surface's current dimensions.
    dimensions: Dimensions,
    /// Every command since the last `present()`.
    pub commands: Vec<DrawCommand>,
    /// The commands of the most recently presented frame.
    pub last_frame: Vec<DrawCommand>,
    /// How many frames have been presented.
    pub frames_presented: usize,
}

impl Recorder {
    /// Instantiate with a viewport of the given size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport: Dimensions::new(width, height),
            ..Self::default()
        }
    }

    /// All the circles in the most recent frame.
    #[must_use]
    pub fn circles(&self) -> Vec<&DrawCommand> {
        self.last_frame
            .iter()
            .filter(|command| matches!(command, DrawCommand::Circle { .. }))
            .collect()
    }

    /// All the lines in the most recent frame.
    #[must_use]
    pub fn lines(&self) -> Vec<&DrawCommand> {
        self.last_frame
            .iter()
            .filter(|command| matches!(command, DrawCommand::Line { .. }))
            .collect()
    }
}

impl Canvas for Recorder {
    fn viewport_size(&mut self) -> Result<Dimensions> {
        Ok(self.viewport)
    }

    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn set_dimensions(&mut self, dimensions: Dimensions) -> Result<()> {
        self.dimensions = dimensions;
        Ok(())
    }

    fn clear(&mut self, region: Region) -> Result<()> {
        self.commands.push(DrawCommand::Clear(region));
        Ok(())
    }

    fn draw_circle(&mut self, centre: Vec2, radius: f32, fill: Colour) -> Result<()> {
        self.commands.push(DrawCommand::Circle {
            centre,
            radius,
            fill,
        });
        Ok(())
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, stroke: Colour, width: f32) -> Result<()> {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            stroke,
            width,
        });
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.last_frame = std::mem::take(&mut self.commands);
        self.frames_presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn present_moves_commands_into_the_last_frame() {
        let mut recorder = Recorder::new(10.0, 10.0);
        recorder
            .clear(Region::whole(Dimensions::new(10.0, 10.0)))
            .unwrap();
        recorder
            .draw_circle(Vec2::new(1.0, 1.0), 2.0, Colour::new(1.0, 1.0, 1.0, 1.0))
            .unwrap();
        recorder.present().unwrap();

        assert!(recorder.commands.is_empty());
        assert_eq!(recorder.last_frame.len(), 2);
        assert_eq!(recorder.circles().len(), 1);
        assert!(recorder.lines().is_empty());
        assert_eq!(recorder.frames_presented, 1);
    }

    #[test]
    fn dimensions_only_change_when_set() {
        let mut recorder = Recorder::new(300.0, 200.0);
        assert_eq!(recorder.dimensions(), Dimensions::default());

        let viewport = recorder.viewport_size().unwrap();
        recorder.set_dimensions(viewport).unwrap();
        assert_eq!(recorder.dimensions(), Dimensions::new(300.0, 200.0));
    }
}
