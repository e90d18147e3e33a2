// Static arena: side length, walls and the spawn-point sampler.

use super::geometry::{Vec2, Wall, colliding_wall, point_in_rect};
use rand::Rng;

/// Spawn points keep this distance from the arena edge.
pub const SPAWN_EDGE_MARGIN: i64 = 50;

/// Upper bound on spawn samples before giving up on a wall-free point.
pub const MAX_SPAWN_ATTEMPTS: usize = 10_000;

#[derive(Debug, Clone)]
pub struct Arena {
    /// Side length of the square arena, centred on the origin.
    pub size: f64,
    /// Walls in settings order.
    pub walls: Vec<Wall>,
}

impl Arena {
    pub fn new(size: f64, walls: Vec<Wall>) -> Self {
        Self { size, walls }
    }

    pub fn half_size(&self) -> f64 {
        self.size / 2.0
    }

    /// Whether `point` lies inside the arena shrunk by `inset` on every side.
    pub fn contains(&self, point: Vec2, inset: f64) -> bool {
        let half = self.half_size() - inset;
        point_in_rect(point, Vec2::ZERO, half, half)
    }

    pub fn wall_at(&self, point: Vec2, clearance: f64) -> Option<&Wall> {
        colliding_wall(point, clearance, &self.walls)
    }

    /// Samples integer points uniformly in `[-size/2 + 50, size/2 - 50)` until one is
    /// clear of every wall by `clearance`.
    ///
    /// Falls back to the arena centre when the range is empty or no clear point turns
    /// up within [`MAX_SPAWN_ATTEMPTS`].
    pub fn random_location<R: Rng + ?Sized>(&self, rng: &mut R, clearance: f64) -> Vec2 {
        let half = (self.size / 2.0) as i64;
        let low = -half + SPAWN_EDGE_MARGIN;
        let high = half - SPAWN_EDGE_MARGIN;
        if low >= high {
            return Vec2::ZERO;
        }

        for _ in 0..MAX_SPAWN_ATTEMPTS {
            let candidate = Vec2::new(
                rng.gen_range(low..high) as f64,
                rng.gen_range(low..high) as f64,
            );
            if self.wall_at(candidate, clearance).is_none() {
                return candidate;
            }
        }

        tracing::warn!(
            size = self.size,
            clearance,
            "no wall-free spawn point found; using arena centre"
        );
        Vec2::ZERO
    }
}
