//! The collection of particles that make up the network.

use glam::Vec2;
use rand::Rng;

use crate::config::FieldConfig;
use crate::particle::Particle;
use crate::state::Dimensions;

/// `ParticleField`
#[derive(Debug, Default, Clone)]
#[non_exhaustive]
pub struct ParticleField {
    /// All the particles, in creation order.
    particles: Vec<Particle>,
}

impl ParticleField {
    /// Instantiate an empty field. Nothing exists until the first reseed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            particles: Vec::new(),
        }
    }

    /// Throw away every particle and create a fresh batch scattered over the bounds.
    pub fn reseed(&mut self, bounds: Dimensions, config: &FieldConfig) {
        self.reseed_with_rng(bounds, config, &mut rand::thread_rng());
    }

    /// Like `reseed()` but with a specific source of randomness.
    pub fn reseed_with_rng<R: Rng>(
        &mut self,
        bounds: Dimensions,
        config: &FieldConfig,
        rng: &mut R,
    ) {
        self.particles = (0..config.particle_count)
            .map(|_| Particle::random(bounds, config, rng))
            .collect();

        tracing::debug!(
            "Field reseeded with {} particles over {}x{}",
            self.particles.len(),
            bounds.width,
            bounds.height
        );
    }

    /// Advance every particle by one tick. Particles don't affect each other, so the order
    /// doesn't matter.
    pub fn advance(&mut self, bounds: Dimensions, pointer: Option<Vec2>, config: &FieldConfig) {
        for particle in &mut self.particles {
            particle.update(bounds, pointer, config);
        }
    }

    /// All the particles.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Replace all the particles. Mostly useful for setting up specific scenarios.
    pub fn set_particles(&mut self, particles: Vec<Particle>) {
        self.particles = particles;
    }

    /// The number of particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether there are no particles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
