//! A uniform spatial grid for finding close pairs of particles without testing every pair.
//!
//! Buckets are as wide as the connection distance, so any pair closer than that must be in the
//! same bucket or in neighbouring ones.

use std::collections::HashMap;

use glam::Vec2;

use crate::particle::Particle;

/// The coordinates of a bucket.
type Bucket = (i64, i64);

/// A pair of particle indices, `i < j`, and the distance between them.
pub type ClosePair = (usize, usize, f32);

/// Particles bucketed by position.
#[derive(Debug, Default)]
pub struct SpatialGrid {
    /// The width and height of each bucket.
    cell_size: f32,
    /// Indices of the particles in each bucket, in ascending order.
    buckets: HashMap<Bucket, Vec<usize>>,
}

impl SpatialGrid {
    /// Bucket all the particles.
    #[must_use]
    pub fn new(particles: &[Particle], cell_size: f32) -> Self {
        let mut grid = Self {
            cell_size,
            buckets: HashMap::new(),
        };
        for (index, particle) in particles.iter().enumerate() {
            let bucket = grid.bucket_for(particle.position);
            grid.buckets.entry(bucket).or_default().push(index);
        }
        grid
    }

    /// The bucket that a position falls in.
    #[expect(
        clippy::as_conversions,
        clippy::cast_possible_truncation,
        reason = "Positions are always well within the range of an i64"
    )]
    fn bucket_for(&self, position: Vec2) -> Bucket {
        (
            (position.x / self.cell_size).floor() as i64,
            (position.y / self.cell_size).floor() as i64,
        )
    }

    /// Every pair of particles closer than the cell size, ordered by `(i, j)` just like a
    /// naive scan would produce them.
    #[must_use]
    pub fn close_pairs(&self, particles: &[Particle]) -> Vec<ClosePair> {
        let mut pairs = Vec::new();
        for (i, particle) in particles.iter().enumerate() {
            let (column, row) = self.bucket_for(particle.position);
            for neighbour_column in column - 1..=column + 1 {
                for neighbour_row in row - 1..=row + 1 {
                    let Some(bucket) = self.buckets.get(&(neighbour_column, neighbour_row)) else {
                        continue;
                    };
                    for &j in bucket.iter().filter(|&&j| j > i) {
                        let Some(other) = particles.get(j) else {
                            continue;
                        };
                        let distance = particle.position.distance(other.position);
                        if distance < self.cell_size {
                            pairs.push((i, j, distance));
                        }
                    }
                }
            }
        }

        pairs.sort_unstable_by_key(|&(i, j, _)| (i, j));
        pairs
    }
}

/// Find close pairs with a grid. A non-positive distance can't have any pairs.
#[must_use]
pub fn close_pairs(particles: &[Particle], connection_distance: f32) -> Vec<ClosePair> {
    if connection_distance <= 0.0 {
        return Vec::new();
    }
    SpatialGrid::new(particles, connection_distance).close_pairs(particles)
}

#[cfg(test)]
#[expect(clippy::indexing_slicing, reason = "Tests aren't so strict")]
mod test {
    use super::*;

    fn particle_at(x: f32, y: f32) -> Particle {
        Particle::new(Vec2::new(x, y), Vec2::ZERO, 1.0)
    }

    #[test]
    fn finds_pairs_across_bucket_boundaries() {
        let particles = vec![particle_at(149.0, 10.0), particle_at(151.0, 10.0)];
        let pairs = close_pairs(&particles, 150.0);
        assert_eq!(pairs.len(), 1);
        assert_eq!((pairs[0].0, pairs[0].1), (0, 1));
        assert!((pairs[0].2 - 2.0).abs() < 1e-5);
    }

    #[test]
    fn ignores_pairs_two_buckets_apart() {
        let particles = vec![particle_at(10.0, 10.0), particle_at(320.0, 10.0)];
        assert!(close_pairs(&particles, 150.0).is_empty());
    }

    #[test]
    fn handles_particles_slightly_outside_the_surface() {
        let particles = vec![particle_at(-0.2, -0.1), particle_at(0.3, 0.1)];
        assert_eq!(close_pairs(&particles, 150.0).len(), 1);
    }

    #[test]
    fn pairs_come_out_in_scan_order() {
        let particles = vec![
            particle_at(300.0, 300.0),
            particle_at(10.0, 10.0),
            particle_at(305.0, 300.0),
            particle_at(12.0, 10.0),
        ];
        let indices: Vec<(usize, usize)> = close_pairs(&particles, 150.0)
            .iter()
            .map(|&(i, j, _)| (i, j))
            .collect();
        assert_eq!(indices, vec![(0, 2), (1, 3)]);
    }

    #[test]
    fn zero_distance_means_no_pairs() {
        let particles = vec![particle_at(1.0, 1.0), particle_at(1.0, 1.0)];
        assert!(close_pairs(&particles, 0.0).is_empty());
    }
}
