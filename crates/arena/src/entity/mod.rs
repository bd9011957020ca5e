//! Arena entities.
//!
//! Snakes (segment chains), eggs and foragers.

mod egg;
mod forager;
mod segment;
mod snake;

pub use egg::{Egg, EggState};
pub use forager::Forager;
pub use segment::{
    ChainIter, LostSegment, Segment, SegmentChain, SegmentId, SegmentPool, SeverOutcome,
};
pub use snake::{Snake, SnakeBody, ThreatLevel};

/// Which team an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    #[inline]
    pub fn is_player(self) -> bool {
        self == Side::Player
    }

    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

/// Identifier of a snake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(u32);

impl ChainId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

/// Identifier of an egg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EggId(u32);

impl EggId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

/// Identifier of a forager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ForagerId(u32);

impl ForagerId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}
