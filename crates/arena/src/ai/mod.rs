//! Direction policies.
//!
//! A policy is consulted whenever an actor reaches a cell center (or is asked
//! to resume from rest) and decides where it goes next.

mod autonomous;
mod forager;
mod player;

pub use autonomous::AutonomousPolicy;
pub use forager::{ForagerPolicy, HopRules, extend_with_long_jump, is_legal_landing};
pub use player::PlayerPolicy;

use crate::maze::Maze;
use crate::phase::ArenaPhase;
use level::{CellCoord, Direction};
use rand::rngs::StdRng;

/// Why the policy is being asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arrival {
    /// Cell center the actor stands on.
    pub cell: CellCoord,
    /// Direction the actor last travelled in (`None` if it never moved).
    pub heading: Direction,
    /// The actor was at rest rather than arriving from a move.
    pub resumed: bool,
}

/// What to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Stop,
    /// Move one cell in a direction. A blocked choice falls back to the
    /// current heading, then to stopping.
    Turn(Direction),
    /// Free-form move to a cell center, ignoring walls.
    Hop(CellCoord),
}

/// World access handed to a policy.
pub struct PolicyContext<'a> {
    pub maze: &'a Maze,
    pub phase: ArenaPhase,
    pub rng: &'a mut StdRng,
}

pub trait DirectionPolicy {
    fn next_direction(&mut self, arrival: &Arrival, ctx: &mut PolicyContext<'_>) -> Decision;
}

/// Brain of a snake.
#[derive(Debug, Clone)]
pub enum SnakeBrain {
    Autonomous(AutonomousPolicy),
    Player(PlayerPolicy),
}

impl SnakeBrain {
    pub fn as_player(&self) -> Option<&PlayerPolicy> {
        match self {
            SnakeBrain::Player(p) => Some(p),
            SnakeBrain::Autonomous(_) => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut PlayerPolicy> {
        match self {
            SnakeBrain::Player(p) => Some(p),
            SnakeBrain::Autonomous(_) => None,
        }
    }
}

impl DirectionPolicy for SnakeBrain {
    fn next_direction(&mut self, arrival: &Arrival, ctx: &mut PolicyContext<'_>) -> Decision {
        match self {
            SnakeBrain::Autonomous(p) => p.next_direction(arrival, ctx),
            SnakeBrain::Player(p) => p.next_direction(arrival, ctx),
        }
    }
}
