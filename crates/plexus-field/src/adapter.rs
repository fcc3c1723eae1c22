//! React to the host's viewport: resizes and pointer movement.

use color_eyre::eyre::Result;
use glam::Vec2;

use crate::canvas::Canvas;
use crate::config::{Config, DensityPolicy, FieldConfig};
use crate::field::ParticleField;
use crate::state::ViewportState;

/// `ViewportAdapter`
///
/// The only thing that writes to the [`ViewportState`].
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ViewportAdapter {
    /// The current viewport.
    viewport: ViewportState,
    /// The user's tunables.
    config: Config,
    /// What the field runs with. Only changes on resize under the responsive density policy.
    field_config: FieldConfig,
}

impl ViewportAdapter {
    /// Instantiate. The density tier is picked here, from the width of the viewport at startup.
    #[must_use]
    pub fn new(config: Config, initial_viewport_width: f32) -> Self {
        let field_config = config.field_config(initial_viewport_width);
        tracing::debug!(
            "Viewport starts {initial_viewport_width} wide, using {} particles",
            field_config.particle_count
        );
        Self {
            viewport: ViewportState::default(),
            config,
            field_config,
        }
    }

    /// Re-query the size of the viewport, resize the surface to match and reseed the field.
    pub fn on_resize(&mut self, canvas: &mut impl Canvas, field: &mut ParticleField) -> Result<()> {
        let dimensions = canvas.viewport_size()?;
        if !dimensions.is_drawable() {
            tracing::warn!(
                "Viewport has no area ({}x{}), particles will all start in the corner",
                dimensions.width,
                dimensions.height
            );
        }
        canvas.set_dimensions(dimensions)?;
        self.viewport.dimensions = dimensions;

        if matches!(self.config.density_policy, DensityPolicy::Responsive) {
            self.field_config = self.config.field_config(dimensions.width);
        }

        tracing::debug!(
            "Viewport resized to {}x{}",
            dimensions.width,
            dimensions.height
        );
        field.reseed(dimensions, &self.field_config);
        Ok(())
    }

    /// The pointer has moved to somewhere in the viewport.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.viewport.pointer = Some(Vec2::new(x, y));
    }

    /// The pointer has left the viewport.
    pub fn on_pointer_leave(&mut self) {
        tracing::trace!("Pointer left the viewport");
        self.viewport.pointer = None;
    }

    /// The current state of the viewport.
    #[must_use]
    pub const fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    /// The config that the field is currently running with.
    #[must_use]
    pub const fn field_config(&self) -> &FieldConfig {
        &self.field_config
    }

    /// The user's tunables.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}
