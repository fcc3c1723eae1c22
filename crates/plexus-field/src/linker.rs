//! Join particles that are close to each other, or to the pointer, with lines that fade out
//! with distance.

use color_eyre::eyre::Result;
use glam::Vec2;

use crate::canvas::Canvas;
use crate::config::{Appearance, FieldConfig, LinkStrategy};
use crate::grid::ClosePair;
use crate::particle::Particle;

/// What a link connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LinkEnds {
    /// Two particles, by index, `i < j`.
    Particles(usize, usize),
    /// A particle, by index, and the pointer.
    Pointer(usize),
}

/// A single line to draw.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Link {
    /// What's being connected
    pub ends: LinkEnds,
    /// Where the line starts
    pub from: Vec2,
    /// Where the line ends
    pub to: Vec2,
    /// Distance between the two ends
    pub distance: f32,
    /// Opacity of the line
    pub opacity: f32,
}

/// The opacity of a link at the given distance. Full `base` opacity at zero distance, fading
/// linearly to nothing at the threshold. At or beyond the threshold there is no link at all.
#[must_use]
pub fn fade(base: f32, distance: f32, threshold: f32) -> Option<f32> {
    if distance < threshold {
        Some(base * (1.0 - distance / threshold))
    } else {
        None
    }
}

/// `ProximityLinker`
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ProximityLinker {
    /// How close pairs are found.
    pub strategy: LinkStrategy,
    /// Colours and opacities.
    pub appearance: Appearance,
}

impl ProximityLinker {
    /// Instantiate
    #[must_use]
    pub const fn new(strategy: LinkStrategy, appearance: Appearance) -> Self {
        Self {
            strategy,
            appearance,
        }
    }

    /// Work out every link for the current positions. Links between particles come first, in
    /// `(i, j)` order, then links to the pointer in particle order.
    #[must_use]
    pub fn links(
        &self,
        particles: &[Particle],
        pointer: Option<Vec2>,
        config: &FieldConfig,
    ) -> Vec<Link> {
        let pairs = match self.strategy {
            LinkStrategy::Pairwise => pairwise(particles, config.connection_distance),
            LinkStrategy::Grid => crate::grid::close_pairs(particles, config.connection_distance),
        };

        let mut links = Vec::with_capacity(pairs.len());
        for (i, j, distance) in pairs {
            let (Some(first), Some(second)) = (particles.get(i), particles.get(j)) else {
                continue;
            };
            let Some(opacity) = fade(
                self.appearance.link_opacity,
                distance,
                config.connection_distance,
            ) else {
                continue;
            };
            links.push(Link {
                ends: LinkEnds::Particles(i, j),
                from: first.position,
                to: second.position,
                distance,
                opacity,
            });
        }

        if let Some(pointer_position) = pointer {
            for (index, particle) in particles.iter().enumerate() {
                let distance = particle.position.distance(pointer_position);
                let Some(opacity) = fade(
                    self.appearance.pointer_link_opacity,
                    distance,
                    config.interaction_radius,
                ) else {
                    continue;
                };
                links.push(Link {
                    ends: LinkEnds::Pointer(index),
                    from: particle.position,
                    to: pointer_position,
                    distance,
                    opacity,
                });
            }
        }

        links
    }

    /// Work out all the links and draw them. Returns how many were drawn.
    pub fn compute_and_draw(
        &self,
        particles: &[Particle],
        pointer: Option<Vec2>,
        config: &FieldConfig,
        canvas: &mut impl Canvas,
    ) -> Result<usize> {
        let links = self.links(particles, pointer, config);
        for link in &links {
            canvas.draw_line(
                link.from,
                link.to,
                self.appearance.colour_with_opacity(link.opacity),
                self.appearance.line_width,
            )?;
        }

        tracing::trace!("Drew {} links", links.len());
        Ok(links.len())
    }
}

/// The naive scan over every unordered pair.
fn pairwise(particles: &[Particle], connection_distance: f32) -> Vec<ClosePair> {
    let mut pairs = Vec::new();
    for (i, particle) in particles.iter().enumerate() {
        for (j, other) in particles.iter().enumerate().skip(i + 1) {
            let distance = particle.position.distance(other.position);
            if distance < connection_distance {
                pairs.push((i, j, distance));
            }
        }
    }
    pairs
}

#[cfg(test)]
#[expect(clippy::indexing_slicing, reason = "Tests aren't so strict")]
mod test {
    use rand::SeedableRng as _;

    use super::*;
    use crate::canvas::{DrawCommand, Recorder};
    use crate::state::Dimensions;

    fn particle_at(x: f32, y: f32) -> Particle {
        Particle::new(Vec2::new(x, y), Vec2::ZERO, 1.0)
    }

    fn linker(strategy: LinkStrategy) -> ProximityLinker {
        ProximityLinker::new(strategy, Appearance::default())
    }

    #[test]
    fn opacity_fades_linearly_with_distance() {
        assert_eq!(fade(0.15, 0.0, 150.0), Some(0.15));
        let halfway = fade(0.15, 75.0, 150.0).unwrap();
        assert!((halfway - 0.075).abs() < 1e-6);
        assert!(fade(0.15, 150.0, 150.0).is_none());
        assert!(fade(0.15, 200.0, 150.0).is_none());
    }

    #[test]
    fn links_close_particles() {
        let config = FieldConfig::builder().build();
        let particles = vec![
            particle_at(0.0, 0.0),
            particle_at(30.0, 40.0),
            particle_at(500.0, 500.0),
        ];

        let links = linker(LinkStrategy::Pairwise).links(&particles, None, &config);

        assert_eq!(links.len(), 1);
        let link = &links[0];
        assert_eq!(link.ends, LinkEnds::Particles(0, 1));
        assert!((link.distance - 50.0).abs() < 1e-5);
        let expected = 0.15 * (1.0 - 50.0 / 150.0);
        assert!((link.opacity - expected).abs() < 1e-6);
    }

    #[test]
    fn no_link_at_exactly_the_threshold() {
        let config = FieldConfig::builder().build();
        let particles = vec![particle_at(0.0, 0.0), particle_at(150.0, 0.0)];
        assert!(linker(LinkStrategy::Pairwise)
            .links(&particles, None, &config)
            .is_empty());
    }

    #[test]
    fn links_particles_to_the_pointer_more_brightly() {
        let config = FieldConfig::builder().build();
        let particles = vec![particle_at(100.0, 150.0), particle_at(700.0, 700.0)];
        let pointer = Vec2::new(100.0, 100.0);

        let links = linker(LinkStrategy::Pairwise).links(&particles, Some(pointer), &config);

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].ends, LinkEnds::Pointer(0));
        assert_eq!(links[0].to, pointer);
        let expected = 0.2 * (1.0 - 50.0 / 150.0);
        assert!((links[0].opacity - expected).abs() < 1e-6);
    }

    #[test]
    fn particle_links_are_drawn_before_pointer_links() {
        let config = FieldConfig::builder().build();
        let particles = vec![particle_at(10.0, 10.0), particle_at(20.0, 10.0)];
        let links =
            linker(LinkStrategy::Pairwise).links(&particles, Some(Vec2::new(15.0, 15.0)), &config);

        let ends: Vec<LinkEnds> = links.iter().map(|link| link.ends).collect();
        assert_eq!(
            ends,
            vec![
                LinkEnds::Particles(0, 1),
                LinkEnds::Pointer(0),
                LinkEnds::Pointer(1)
            ]
        );
    }

    #[test]
    fn grid_and_pairwise_agree() {
        let config = FieldConfig::builder()
            .particle_count(300)
            .connection_distance(90.0)
            .build();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let mut field = crate::field::ParticleField::new();
        field.reseed_with_rng(Dimensions::new(1200.0, 900.0), &config, &mut rng);
        let pointer = Some(Vec2::new(600.0, 450.0));

        let naive = linker(LinkStrategy::Pairwise).links(field.particles(), pointer, &config);
        let grid = linker(LinkStrategy::Grid).links(field.particles(), pointer, &config);

        assert!(!naive.is_empty());
        assert_eq!(naive, grid);
    }

    #[test]
    fn draws_one_line_per_link() {
        let config = FieldConfig::builder().build();
        let particles = vec![particle_at(0.0, 0.0), particle_at(30.0, 40.0)];
        let mut canvas = Recorder::new(100.0, 100.0);

        let count = linker(LinkStrategy::Pairwise)
            .compute_and_draw(&particles, None, &config, &mut canvas)
            .unwrap();

        assert_eq!(count, 1);
        let DrawCommand::Line {
            from,
            to,
            stroke,
            width,
        } = &canvas.commands[0]
        else {
            panic!("Expected a line, got: {:?}", canvas.commands[0]);
        };
        assert_eq!(*from, Vec2::ZERO);
        assert_eq!(*to, Vec2::new(30.0, 40.0));
        assert!((stroke.alpha - 0.1).abs() < 1e-6);
        assert!((*width - 1.0).abs() < f32::EPSILON);
    }
}
