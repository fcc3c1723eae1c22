//! Draw the particle field onto the user's actual terminal.

use std::sync::Arc;

use color_eyre::eyre::Result;
use glam::Vec2;
use termwiz::surface::Change as TermwizChange;
use termwiz::terminal::buffered::BufferedTerminal;
use termwiz::terminal::{SystemTerminal, Terminal as TermwizTerminal};

use plexus_field::canvas::{Canvas, Region};
use plexus_field::config::Colour;
use plexus_field::state::Dimensions;

use crate::pixels::PixelBuffer;
use crate::shared_state::SharedState;

/// The surface size, in surface pixels, of a terminal with the given number of cells.
#[expect(
    clippy::as_conversions,
    clippy::cast_precision_loss,
    reason = "Terminals are never big enough to lose precision"
)]
#[must_use]
pub fn surface_size(columns: usize, rows: usize, pixel_scale: f32) -> Dimensions {
    Dimensions::new(
        columns as f32 * pixel_scale,
        rows as f32 * 2.0 * pixel_scale,
    )
}

/// The number of terminal cells that cover a surface of the given size.
#[expect(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Surface sizes always come from a terminal size in the first place"
)]
#[must_use]
pub fn cells_for(dimensions: Dimensions, pixel_scale: f32) -> (usize, usize) {
    let columns = (dimensions.width / pixel_scale).round().max(0.0) as usize;
    let rows = (dimensions.height / (2.0 * pixel_scale)).round().max(0.0) as usize;
    (columns, rows)
}

/// `TerminalCanvas`
///
/// Surface pixels are scaled down into half block terminal pixels and only sent to the terminal
/// when a frame is presented.
pub struct TerminalCanvas<T: TermwizTerminal = SystemTerminal> {
    /// Shared app state
    state: Arc<SharedState>,
    /// The user's terminal, wrapped so that only changes are sent.
    terminal: BufferedTerminal<T>,
    /// Everything drawn since the last present.
    pixels: PixelBuffer,
    /// How many surface pixels make one terminal pixel.
    pixel_scale: f32,
    /// The size of the surface in surface pixels.
    dimensions: Dimensions,
    /// The terminal's width in cells
    columns: usize,
    /// The terminal's height in cells
    rows: usize,
    /// Whether the terminal has already been put back the way we found it.
    is_restored: bool,
}

impl TerminalCanvas<SystemTerminal> {
    /// Take over the user's terminal: raw mode, the alternate screen and a hidden cursor.
    pub fn open(state: Arc<SharedState>, pixel_scale: f32) -> Result<Self> {
        let capabilities = termwiz::caps::Capabilities::new_from_env()?;
        let terminal = SystemTerminal::new(capabilities)?;
        Self::with_terminal(state, terminal, pixel_scale)
    }

    /// Like `open()`, but when there's no usable terminal there's simply nothing to draw on.
    #[must_use]
    pub fn try_open(state: Arc<SharedState>, pixel_scale: f32) -> Option<Self> {
        match Self::open(state, pixel_scale) {
            Ok(canvas) => Some(canvas),
            Err(error) => {
                tracing::warn!("Couldn't open the terminal for drawing: {error:?}");
                None
            }
        }
    }
}

impl<T: TermwizTerminal> TerminalCanvas<T> {
    /// Wrap an already opened terminal.
    pub fn with_terminal(state: Arc<SharedState>, mut terminal: T, pixel_scale: f32) -> Result<Self> {
        tracing::debug!("Putting user's terminal into raw mode");
        terminal.set_raw_mode()?;
        terminal.enter_alternate_screen()?;

        let mut buffered = BufferedTerminal::new(terminal)?;
        buffered.add_change(TermwizChange::CursorVisibility(
            termwiz::surface::CursorVisibility::Hidden,
        ));
        buffered.flush()?;

        Ok(Self {
            state,
            terminal: buffered,
            pixels: PixelBuffer::default(),
            pixel_scale,
            dimensions: Dimensions::default(),
            columns: 0,
            rows: 0,
            is_restored: false,
        })
    }

    /// Convert a point in surface pixels to terminal pixels.
    fn scale(&self, point: Vec2) -> Vec2 {
        point / self.pixel_scale
    }

    /// Give the user their terminal back how it was.
    pub fn restore(&mut self) -> Result<()> {
        if self.is_restored {
            return Ok(());
        }
        self.is_restored = true;

        self.terminal.add_changes(vec![
            TermwizChange::ClearScreen(termwiz::color::ColorAttribute::Default),
            TermwizChange::CursorVisibility(termwiz::surface::CursorVisibility::Visible),
        ]);
        self.terminal.flush()?;

        tracing::debug!("Setting user's terminal to cooked mode");
        let terminal = self.terminal.terminal();
        terminal.exit_alternate_screen()?;
        terminal.set_cooked_mode()?;
        Ok(())
    }
}

impl<T: TermwizTerminal> Canvas for TerminalCanvas<T> {
    fn viewport_size(&mut self) -> Result<Dimensions> {
        let size = self.terminal.terminal().get_screen_size()?;
        self.state
            .set_tty_size(size.cols.try_into()?, size.rows.try_into()?)?;
        Ok(surface_size(size.cols, size.rows, self.pixel_scale))
    }

    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn set_dimensions(&mut self, dimensions: Dimensions) -> Result<()> {
        let (columns, rows) = cells_for(dimensions, self.pixel_scale);
        if self.terminal.check_for_resize()? {
            self.terminal.repaint()?;
        }

        self.columns = columns;
        self.rows = rows;
        self.pixels = PixelBuffer::for_terminal(columns, rows);
        self.dimensions = dimensions;
        tracing::debug!("Terminal canvas is now {columns}x{rows} cells");
        Ok(())
    }

    fn clear(&mut self, region: Region) -> Result<()> {
        let from = self.scale(region.origin);
        let to = self.scale(region.origin + Vec2::new(region.size.width, region.size.height));
        self.pixels.clear(from, to);
        Ok(())
    }

    fn draw_circle(&mut self, centre: Vec2, radius: f32, fill: Colour) -> Result<()> {
        let centre = self.scale(centre);
        self.pixels
            .fill_circle(centre, radius / self.pixel_scale, fill);
        Ok(())
    }

    // Terminal pixels are far wider than any sensible line width, so every line is one terminal
    // pixel wide.
    fn draw_line(&mut self, from: Vec2, to: Vec2, stroke: Colour, _width: f32) -> Result<()> {
        let (from, to) = (self.scale(from), self.scale(to));
        self.pixels.line(from, to, stroke);
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        let frame = self.pixels.to_surface(self.columns, self.rows);
        self.terminal.draw_from_screen(&frame, 0, 0);

        // This is where we actually render to the user's real terminal.
        self.terminal.flush()?;
        Ok(())
    }
}

impl<T: TermwizTerminal> Drop for TerminalCanvas<T> {
    fn drop(&mut self) {
        if let Err(error) = self.restore() {
            tracing::error!("Couldn't restore the user's terminal: {error:?}");
        }
    }
}
