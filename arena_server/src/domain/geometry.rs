// Collision kernel: vector math plus the point/rectangle, wall and ray tests used by the loop.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Half thickness of every wall segment, in world units.
pub const WALL_HALF_THICKNESS: f64 = 25.0;

/// 2-D vector in world space (+X right, +Y down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalize(self) -> Vec2 {
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            Vec2::ZERO
        } else {
            Vec2::new(self.x / len, self.y / len)
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned wall segment loaded from settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub id: u64,
    pub p1: Vec2,
    pub p2: Vec2,
}

impl Wall {
    pub fn is_vertical(&self) -> bool {
        self.p1.x == self.p2.x
    }

    fn min_corner(&self) -> Vec2 {
        Vec2::new(self.p1.x.min(self.p2.x), self.p1.y.min(self.p2.y))
    }

    fn max_corner(&self) -> Vec2 {
        Vec2::new(self.p1.x.max(self.p2.x), self.p1.y.max(self.p2.y))
    }
}

/// Strict containment of `point` in the rectangle centred on `center`.
pub fn point_in_rect(point: Vec2, center: Vec2, half_height: f64, half_width: f64) -> bool {
    point.x < center.x + half_width
        && point.x > center.x - half_width
        && point.y < center.y + half_height
        && point.y > center.y - half_height
}

/// Returns true if `point` (a square probe of half-width `clearance`) touches `wall`.
pub fn collides_with_wall(point: Vec2, clearance: f64, wall: &Wall) -> bool {
    let min = wall.min_corner();
    let max = wall.max_corner();
    let half_h = (max.y - min.y) / 2.0;
    let half_w = (max.x - min.x) / 2.0;

    if wall.is_vertical() {
        let center = Vec2::new(wall.p1.x, min.y + half_h);
        point_in_rect(
            point,
            center,
            clearance + half_h + WALL_HALF_THICKNESS,
            WALL_HALF_THICKNESS + clearance,
        )
    } else {
        let center = Vec2::new(min.x + half_w, wall.p1.y);
        point_in_rect(
            point,
            center,
            clearance + WALL_HALF_THICKNESS,
            WALL_HALF_THICKNESS + clearance + half_w,
        )
    }
}

/// First wall hit by the probe, in load order.
pub fn colliding_wall(point: Vec2, clearance: f64, walls: &[Wall]) -> Option<&Wall> {
    walls
        .iter()
        .find(|wall| collides_with_wall(point, clearance, wall))
}

/// Ray/circle test. Intersections behind the ray origin (or an origin inside the
/// circle) do not count: both roots must be strictly positive.
pub fn ray_hits_circle(origin: Vec2, dir: Vec2, center: Vec2, radius: f64) -> bool {
    let offset = origin - center;
    let a = dir.dot(dir);
    let b = (offset * 2.0).dot(dir);
    let c = offset.dot(offset) - radius * radius;

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return false;
    }

    // Only the signs matter, so the 1/2a factor is skipped.
    let root = disc.sqrt();
    -b + root > 0.0 && -b - root > 0.0
}

/// Direction after bouncing off `wall` at `location`.
///
/// A projectile that lies within `probe_radius` of the inflated wall's top or bottom edge
/// struck a horizontal face and has its Y component flipped; anything else flips X.
pub fn reflect_off_wall(location: Vec2, dir: Vec2, wall: &Wall, probe_radius: f64) -> Vec2 {
    let min = wall.min_corner();
    let max = wall.max_corner();
    let along_x = Vec2::new(1.0, 0.0);

    let top = Vec2::new(min.x - WALL_HALF_THICKNESS, min.y - WALL_HALF_THICKNESS);
    let bottom = Vec2::new(min.x - WALL_HALF_THICKNESS, max.y + WALL_HALF_THICKNESS);

    if ray_hits_circle(top, along_x, location, probe_radius)
        || ray_hits_circle(bottom, along_x, location, probe_radius)
    {
        Vec2::new(dir.x, -dir.y)
    } else {
        Vec2::new(-dir.x, dir.y)
    }
}
