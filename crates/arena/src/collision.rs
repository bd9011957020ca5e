//! Collision detection helpers.
//!
//! Every interacting entity has a circular footprint. Two footprints touch
//! when the squared distance between centers is no larger than the squared
//! sum of their radii.

use glam::Vec2;

/// Result of checking two circular footprints.
#[derive(Debug, Clone, Copy)]
pub struct CollisionResult {
    /// Combined radius of both footprints.
    pub r: f32,
    /// Distance X component (from first to second).
    pub dx: f32,
    /// Distance Y component (from first to second).
    pub dy: f32,
    /// Squared distance.
    pub squared: f32,
}

impl CollisionResult {
    #[inline]
    pub fn is_colliding(&self) -> bool {
        self.squared <= self.r * self.r
    }

    /// Overlap depth; negative when apart.
    #[inline]
    pub fn depth(&self) -> f32 {
        self.r - self.squared.sqrt()
    }
}

/// Check two circular footprints.
#[inline]
pub fn check_collision(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> CollisionResult {
    let dx = b_pos.x - a_pos.x;
    let dy = b_pos.y - a_pos.y;
    CollisionResult {
        r: a_radius + b_radius,
        dx,
        dy,
        squared: dx * dx + dy * dy,
    }
}

#[inline]
pub fn overlaps(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> bool {
    check_collision(a_pos, a_radius, b_pos, b_radius).is_colliding()
}

/// Footprint radius of a single-sprite entity: the mean half-extent.
#[inline]
pub fn sprite_radius(width: f32, height: f32) -> f32 {
    (width + height) / 4.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_radius() {
        assert_eq!(sprite_radius(1.0, 1.0), 0.5);
        assert_eq!(sprite_radius(0.6, 1.0), 0.4);
    }

    #[test]
    fn test_touching_counts_as_collision() {
        let result = check_collision(Vec2::ZERO, 0.5, Vec2::new(1.0, 0.0), 0.5);
        assert!(result.is_colliding());
        assert_eq!(result.squared, 1.0);
        assert_eq!(result.depth(), 0.0);
    }

    #[test]
    fn test_no_collision() {
        let result = check_collision(Vec2::ZERO, 0.3, Vec2::new(0.0, 1.0), 0.3);
        assert!(!result.is_colliding());
        assert!(!overlaps(Vec2::ZERO, 0.3, Vec2::new(0.7, 0.0), 0.3));
        assert!(overlaps(Vec2::ZERO, 0.3, Vec2::new(0.5, 0.2), 0.3));
    }
}
