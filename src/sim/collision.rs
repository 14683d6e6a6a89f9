//! Hit detection between projectiles and enemies
//!
//! Direct hits use shrunk axis-aligned boxes so near misses on the sprite's
//! transparent edges do not count. Splash damage uses a plain radius around
//! the impact point.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ballistics::Projectile;
use super::enemy::Enemy;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Scale around the centre (linear factor, clamped at zero)
    pub fn scaled(&self, factor: f32) -> Self {
        Self::from_center(self.center(), self.size() * factor.max(0.0))
    }

    /// Closed-interval overlap test: touching edges count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// First living enemy struck by `projectile`, in stable (ascending id) order.
///
/// Landed projectiles are inert and never hit anything.
pub fn find_hit(projectile: &Projectile, enemies: &[Enemy]) -> Option<u32> {
    if projectile.landed || projectile.removed {
        return None;
    }
    find_hit_box(&projectile.hitbox(), enemies)
}

/// First living enemy whose shrunk box overlaps `hitbox`
pub fn find_hit_box(hitbox: &Aabb, enemies: &[Enemy]) -> Option<u32> {
    enemies
        .iter()
        .filter(|e| e.is_targetable())
        .find(|e| e.hitbox().overlaps(hitbox))
        .map(|e| e.id)
}

/// Every living enemy whose centre lies within `radius` of `impact` (inclusive)
pub fn find_splash_targets(impact: Vec2, radius: f32, enemies: &[Enemy]) -> Vec<u32> {
    let radius_sq = radius * radius;
    enemies
        .iter()
        .filter(|e| e.is_targetable())
        .filter(|e| e.pos.distance_squared(impact) <= radius_sq)
        .map(|e| e.id)
        .collect()
}
