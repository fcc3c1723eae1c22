//! A single point in the field and its per-tick update rule.

use color_eyre::eyre::Result;
use glam::Vec2;
use rand::Rng;

use crate::canvas::Canvas;
use crate::config::{Colour, FieldConfig};
use crate::state::Dimensions;

/// A single particle.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Particle {
    /// Position in surface pixels
    pub position: Vec2,
    /// Velocity in pixels per tick
    pub velocity: Vec2,
    /// Radius, fixed at creation
    pub size: f32,
}

impl Particle {
    /// Instantiate
    #[must_use]
    pub const fn new(position: Vec2, velocity: Vec2, size: f32) -> Self {
        Self {
            position,
            velocity,
            size,
        }
    }

    /// A particle somewhere random within the bounds, drifting in a random direction.
    pub fn random<R: Rng>(bounds: Dimensions, config: &FieldConfig, rng: &mut R) -> Self {
        let half_speed = config.speed / 2.0;
        Self {
            position: Vec2::new(
                sample(rng, 0.0, bounds.width),
                sample(rng, 0.0, bounds.height),
            ),
            velocity: Vec2::new(
                sample(rng, -half_speed, half_speed),
                sample(rng, -half_speed, half_speed),
            ),
            size: sample(rng, config.min_radius, config.max_radius),
        }
    }

    /// Advance the particle by one tick.
    pub fn update(&mut self, bounds: Dimensions, pointer: Option<Vec2>, config: &FieldConfig) {
        self.position += self.velocity;
        self.reflect(bounds);

        if let Some(pointer_position) = pointer {
            if let Some(displacement) = self.repulsion(
                pointer_position,
                config.interaction_radius,
                config.speed,
            ) {
                self.position -= displacement;
            }
        }
    }

    /// Bounce off the edges of the surface.
    ///
    /// There's no clamping, so a particle can sit slightly outside the bounds for a tick. A
    /// velocity component is only inverted while it's still heading outwards, so each boundary
    /// crossing causes exactly one flip.
    fn reflect(&mut self, bounds: Dimensions) {
        let is_beyond_left = self.position.x < 0.0 && self.velocity.x < 0.0;
        let is_beyond_right = self.position.x > bounds.width && self.velocity.x > 0.0;
        if is_beyond_left || is_beyond_right {
            self.velocity.x *= -1.0;
        }

        let is_beyond_top = self.position.y < 0.0 && self.velocity.y < 0.0;
        let is_beyond_bottom = self.position.y > bounds.height && self.velocity.y > 0.0;
        if is_beyond_top || is_beyond_bottom {
            self.velocity.y *= -1.0;
        }
    }

    /// The displacement the pointer causes this tick. It's subtracted from the position, so it
    /// points from the particle towards the pointer.
    ///
    /// The force scales linearly from 1 at the pointer to 0 at the edge of the interaction
    /// radius. A particle exactly on top of the pointer has no direction to be pushed in, so
    /// it's left alone.
    #[must_use]
    pub fn repulsion(&self, pointer: Vec2, radius: f32, speed: f32) -> Option<Vec2> {
        let delta = pointer - self.position;
        let distance = delta.length();
        if distance >= radius || distance == 0.0 {
            return None;
        }

        let direction = delta / distance;
        let force = (radius - distance) / radius;
        Some(direction * force * speed)
    }

    /// Draw the particle as a filled circle.
    pub fn draw(&self, canvas: &mut impl Canvas, colour: Colour) -> Result<()> {
        canvas.draw_circle(self.position, self.size, colour)
    }
}

/// Uniformly sample `[low, high)`, tolerating empty ranges.
fn sample<R: Rng>(rng: &mut R, low: f32, high: f32) -> f32 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}
