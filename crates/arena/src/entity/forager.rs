//! The hopping forager.

use super::ForagerId;
use crate::ai::{ForagerPolicy, HopRules};
use crate::collision::sprite_radius;
use crate::locomotion::Locomotion;
use crate::maze::Maze;
use crate::phase::ArenaPhase;
use glam::Vec2;
use level::CellCoord;
use rand::rngs::StdRng;

#[derive(Debug, Clone)]
pub struct Forager {
    pub id: ForagerId,
    pub mover: Locomotion,
    pub policy: ForagerPolicy,
    /// Seconds left before the next hop.
    rest: f32,
    jump_delay: f32,
    alive: bool,
    size: f32,
    corners: Vec<Vec2>,
}

impl Forager {
    pub fn new(id: ForagerId, cell: CellCoord, rules: HopRules, jump_speed: f32, jump_delay: f32, size: f32) -> Self {
        Self {
            id,
            mover: Locomotion::new(cell, jump_speed),
            policy: ForagerPolicy::new(rules),
            rest: jump_delay,
            jump_delay,
            alive: true,
            size,
            corners: Vec::new(),
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.mover.position()
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        sprite_radius(self.size, self.size)
    }

    #[inline]
    pub fn resting(&self) -> bool {
        !self.mover.is_moving()
    }

    /// Hop, or rest until the next hop. Returns true when a hop landed.
    pub fn advance(&mut self, dt: f32, maze: &mut Maze, phase: ArenaPhase, rng: &mut StdRng) -> bool {
        if !self.alive {
            return false;
        }
        self.corners.clear();

        if self.mover.is_moving() {
            self.mover
                .tick(dt, maze, phase, &mut self.policy, rng, &mut self.corners);
            if !self.mover.is_moving() {
                self.rest = self.jump_delay;
                return true;
            }
            return false;
        }

        self.rest -= dt;
        if self.rest <= 0.0 {
            let hopped = self
                .mover
                .resume(maze, phase, &mut self.policy, rng, &mut self.corners);
            if !hopped {
                self.rest = self.jump_delay;
            }
        }
        false
    }

    pub fn kill(&mut self, maze: &mut Maze) {
        self.alive = false;
        self.mover.stop(maze);
    }
}
