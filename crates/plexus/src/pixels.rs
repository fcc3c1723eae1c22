//! A grid of true colour pixels, rendered to the terminal with half blocks.
//!
//! Every terminal cell holds two pixels, one above the other. The upper pixel is the cell's
//! foreground colour drawn with "▀", and the lower pixel is the cell's background colour.

use glam::Vec2;
use palette::Mix as _;
use termwiz::surface::Change as TermwizChange;
use termwiz::surface::Position as TermwizPosition;

use plexus_field::config::Colour;

/// A single opaque pixel, already blended.
pub type Pixel = palette::Srgb;

/// What translucent pixels are blended over when nothing has been drawn underneath them yet.
/// Most terminals use a dark theme, so let's say that's pure black.
pub const BLACK: Pixel = palette::Srgb::new(0.0, 0.0, 0.0);

/// Integer pixel coordinates. They can be negative, anything off the grid is ignored.
type Coord = (i64, i64);

/// `PixelBuffer`
#[derive(Debug, Clone, Default)]
pub struct PixelBuffer {
    /// Width in pixels, the same as the number of terminal columns
    pub width: usize,
    /// Height in pixels, twice the number of terminal rows
    pub height: usize,
    /// Row-major pixels. `None` is the terminal's own default background.
    pixels: Vec<Option<Pixel>>,
}

impl PixelBuffer {
    /// Instantiate an empty buffer.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![None; width.saturating_mul(height)],
        }
    }

    /// A buffer exactly covering the given terminal.
    #[must_use]
    pub fn for_terminal(columns: usize, rows: usize) -> Self {
        Self::new(columns, rows.saturating_mul(2))
    }

    /// The pixel at the given coordinates, if anything has been drawn there.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<Pixel> {
        if x >= self.width {
            return None;
        }
        let index = y.checked_mul(self.width)?.checked_add(x)?;
        self.pixels.get(index).copied().flatten()
    }

    /// Convert signed coordinates to an index, if they're on the grid.
    fn index(&self, (x, y): Coord) -> Option<usize> {
        let column = usize::try_from(x).ok()?;
        let row = usize::try_from(y).ok()?;
        if column >= self.width || row >= self.height {
            return None;
        }
        row.checked_mul(self.width)?.checked_add(column)
    }

    /// The pixel that a point in continuous pixel space falls in.
    #[expect(
        clippy::as_conversions,
        clippy::cast_possible_truncation,
        reason = "Saturating float to int conversion is what we want for off-screen points"
    )]
    fn coord_for(point: Vec2) -> Coord {
        (point.x.floor() as i64, point.y.floor() as i64)
    }

    /// Blank out every pixel in the rectangle between the two points.
    pub fn clear(&mut self, from: Vec2, to: Vec2) {
        let (left, top) = Self::coord_for(from.min(to));
        let (right, bottom) = Self::coord_for(from.max(to).ceil());
        for y in top..bottom {
            for x in left..right {
                if let Some(index) = self.index((x, y)) {
                    if let Some(pixel) = self.pixels.get_mut(index) {
                        *pixel = None;
                    }
                }
            }
        }
    }

    /// Blend a translucent colour over whatever is already at the given pixel.
    pub fn blend(&mut self, coord: Coord, colour: Colour) {
        let Some(index) = self.index(coord) else {
            return;
        };
        if let Some(pixel) = self.pixels.get_mut(index) {
            let base = pixel.unwrap_or(BLACK);
            *pixel = Some(base.mix(colour.color, colour.alpha.clamp(0.0, 1.0)));
        }
    }

    /// Fill every pixel whose centre is within the radius. Small circles always fill at least
    /// the pixel their centre is in.
    #[expect(
        clippy::as_conversions,
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        reason = "Circles are only ever a few pixels across"
    )]
    pub fn fill_circle(&mut self, centre: Vec2, radius: f32, colour: Colour) {
        let (left, top) = Self::coord_for(centre - radius);
        let (right, bottom) = Self::coord_for(centre + radius);

        let mut filled = 0_usize;
        for y in top..=bottom {
            for x in left..=right {
                let pixel_centre = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if pixel_centre.distance(centre) <= radius {
                    self.blend((x, y), colour);
                    filled += 1;
                }
            }
        }

        if filled == 0 {
            self.blend(Self::coord_for(centre), colour);
        }
    }

    /// Draw a one pixel wide line by stepping along its longest axis. Each pixel is only
    /// blended once, so translucent lines have an even opacity.
    #[expect(
        clippy::as_conversions,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        reason = "Lines are never longer than the terminal is wide"
    )]
    pub fn line(&mut self, from: Vec2, to: Vec2, colour: Colour) {
        let delta = to - from;
        let steps = delta.abs().max_element().ceil().max(1.0) as u32;

        let mut previous: Option<Coord> = None;
        for step in 0..=steps {
            let progress = step as f32 / steps as f32;
            let coord = Self::coord_for(from + delta * progress);
            if previous == Some(coord) {
                continue;
            }
            self.blend(coord, colour);
            previous = Some(coord);
        }
    }

    /// Make a Termwiz colour attribute
    #[must_use]
    pub const fn make_colour_attribute(pixel: Pixel) -> termwiz::color::ColorAttribute {
        termwiz::color::ColorAttribute::TrueColorWithDefaultFallback(termwiz::color::SrgbaTuple(
            pixel.red, pixel.green, pixel.blue, 1.0,
        ))
    }

    /// Render all the pixels into a Termwiz surface of the given size.
    ///
    /// A cell with only a lower pixel is drawn with "▄" instead, so that the empty upper half
    /// keeps the terminal's default background.
    #[must_use]
    pub fn to_surface(&self, columns: usize, rows: usize) -> termwiz::surface::Surface {
        let mut surface = termwiz::surface::Surface::new(columns, rows);

        for row in 0..rows {
            for column in 0..columns {
                let upper_y = row.saturating_mul(2);
                let upper = self.get(column, upper_y);
                let lower = self.get(column, upper_y.saturating_add(1));

                let (character, foreground, background) = match (upper, lower) {
                    (None, None) => continue,
                    (Some(top), maybe_bottom) => (
                        "▀",
                        Self::make_colour_attribute(top),
                        maybe_bottom.map_or(
                            termwiz::color::ColorAttribute::Default,
                            Self::make_colour_attribute,
                        ),
                    ),
                    (None, Some(bottom)) => (
                        "▄",
                        Self::make_colour_attribute(bottom),
                        termwiz::color::ColorAttribute::Default,
                    ),
                };

                surface.add_changes(vec![
                    TermwizChange::CursorPosition {
                        x: TermwizPosition::Absolute(column),
                        y: TermwizPosition::Absolute(row),
                    },
                    TermwizChange::Attribute(termwiz::cell::AttributeChange::Foreground(
                        foreground,
                    )),
                    TermwizChange::Attribute(termwiz::cell::AttributeChange::Background(
                        background,
                    )),
                ]);
                surface.add_change(character);
            }
        }

        surface
    }
}

#[cfg(test)]
#[expect(
    clippy::indexing_slicing,
    clippy::shadow_unrelated,
    reason = "Tests aren't so strict"
)]
mod test {
    use super::*;

    fn opaque(red: f32, green: f32, blue: f32) -> Colour {
        palette::Srgba::new(red, green, blue, 1.0)
    }

    fn white() -> Colour {
        opaque(1.0, 1.0, 1.0)
    }

    #[test]
    fn blending_over_nothing_is_blending_over_black() {
        let mut buffer = PixelBuffer::new(1, 1);
        buffer.blend((0, 0), palette::Srgba::new(1.0, 1.0, 1.0, 0.5));

        let pixel = buffer.get(0, 0).unwrap();
        assert!((pixel.red - 0.5).abs() < 1e-6);

        buffer.blend((0, 0), palette::Srgba::new(1.0, 1.0, 1.0, 0.5));
        let pixel = buffer.get(0, 0).unwrap();
        assert!((pixel.red - 0.75).abs() < 1e-6);
    }

    #[test]
    fn off_grid_pixels_are_ignored() {
        let mut buffer = PixelBuffer::new(2, 2);
        buffer.blend((-1, 0), white());
        buffer.blend((2, 0), white());
        buffer.blend((0, 5), white());
        assert!((0..2).all(|y| (0..2).all(|x| buffer.get(x, y).is_none())));
    }

    #[test]
    fn tiny_circles_fill_one_pixel() {
        let mut buffer = PixelBuffer::new(4, 4);
        buffer.fill_circle(Vec2::new(2.2, 1.9), 0.2, white());

        assert!(buffer.get(2, 1).is_some());
        let filled = (0..4)
            .flat_map(|y| (0..4).map(move |x| (x, y)))
            .filter(|&(x, y)| buffer.get(x, y).is_some())
            .count();
        assert_eq!(filled, 1);
    }

    #[test]
    fn bigger_circles_fill_pixels_by_their_centres() {
        let mut buffer = PixelBuffer::new(5, 5);
        buffer.fill_circle(Vec2::new(2.5, 2.5), 1.0, white());

        assert!(buffer.get(2, 2).is_some());
        assert!(buffer.get(1, 2).is_some());
        assert!(buffer.get(3, 2).is_some());
        assert!(buffer.get(2, 1).is_some());
        assert!(buffer.get(2, 3).is_some());
        assert!(buffer.get(1, 1).is_none());
    }

    #[test]
    fn lines_blend_each_pixel_once() {
        let mut buffer = PixelBuffer::new(10, 3);
        let half_white = palette::Srgba::new(1.0, 1.0, 1.0, 0.5);
        buffer.line(Vec2::new(0.5, 1.5), Vec2::new(9.5, 1.5), half_white);

        for x in 0..10 {
            let pixel = buffer.get(x, 1).unwrap();
            assert!((pixel.red - 0.5).abs() < 1e-6, "x: {x}");
        }
        assert!(buffer.get(0, 0).is_none());
    }

    #[test]
    fn clearing_a_region() {
        let mut buffer = PixelBuffer::new(4, 4);
        buffer.line(Vec2::new(0.0, 0.0), Vec2::new(3.0, 3.0), white());
        buffer.clear(Vec2::ZERO, Vec2::new(2.0, 2.0));

        assert!(buffer.get(0, 0).is_none());
        assert!(buffer.get(1, 1).is_none());
        assert!(buffer.get(2, 2).is_some());
    }

    #[test]
    fn upper_and_lower_pixels_share_a_cell() {
        let mut buffer = PixelBuffer::for_terminal(2, 1);
        let red = opaque(1.0, 0.0, 0.0);
        buffer.blend((0, 0), white());
        buffer.blend((0, 1), red);

        let mut surface = buffer.to_surface(2, 1);
        let cells = surface.screen_cells();
        let cell = &cells[0][0];
        assert_eq!(cell.str(), "▀");
        assert_eq!(
            cell.attrs().foreground(),
            PixelBuffer::make_colour_attribute(white().color)
        );
        assert_eq!(
            cell.attrs().background(),
            PixelBuffer::make_colour_attribute(red.color)
        );

        let cell = &cells[0][1];
        assert_eq!(cell.str(), " ");
        assert_eq!(
            cell.attrs().background(),
            termwiz::color::ColorAttribute::Default
        );
    }

    #[test]
    fn lower_pixel_on_its_own_keeps_the_default_background() {
        let mut buffer = PixelBuffer::for_terminal(1, 1);
        buffer.blend((0, 1), white());

        let mut surface = buffer.to_surface(1, 1);
        let cells = surface.screen_cells();
        let cell = &cells[0][0];
        assert_eq!(cell.str(), "▄");
        assert_eq!(
            cell.attrs().foreground(),
            PixelBuffer::make_colour_attribute(white().color)
        );
        assert_eq!(
            cell.attrs().background(),
            termwiz::color::ColorAttribute::Default
        );
    }
}
