//! Shared level crate for the maze snake arena.
//!
//! This crate contains:
//! - Grid primitives (Direction, CellCoord, Color)
//! - The level document format and its wall-string grid
//! - Level loading errors

mod document;
mod error;
mod walls;

pub use document::{DoorDescriptor, DoorTag, LevelDocument, ZoneCell, parse_direction_letter};
pub use error::LevelError;
pub use walls::{WallGrid, WallToken};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Width and height of one maze cell in world units.
pub const CELL_SIZE: f32 = 1.0;

/// RGB color used for actors and segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear blend towards `other`, `t` in `0..=1`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// Cardinal movement direction. `None` means "not moving".
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Towards increasing `y`.
    North = 0,
    /// Towards increasing `x`.
    East = 1,
    /// Towards decreasing `y`.
    South = 2,
    /// Towards decreasing `x`.
    West = 3,
    #[default]
    None = 4,
}

impl Direction {
    /// The four cardinal directions in slot order.
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Slot index for wall arrays. `None` has no slot.
    #[inline]
    pub fn index(self) -> Option<usize> {
        match self {
            Direction::None => None,
            d => Some(d as usize),
        }
    }

    /// Rotate clockwise by `steps` quarter turns (negative = counter-clockwise).
    pub fn rotate(self, steps: i32) -> Direction {
        match self.index() {
            Some(i) => Self::CARDINALS[(i as i32 + steps).rem_euclid(4) as usize],
            None => Direction::None,
        }
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        self.rotate(2)
    }

    /// Integer grid offset.
    #[inline]
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
            Direction::None => (0, 0),
        }
    }

    /// Unit vector in world space.
    #[inline]
    pub fn vector(self) -> Vec2 {
        let (x, y) = self.offset();
        Vec2::new(x as f32, y as f32)
    }

    /// Cardinal direction of a grid delta's sign along one axis.
    pub fn from_offset(dx: i32, dy: i32) -> Direction {
        match (dx.signum(), dy.signum()) {
            (0, 1) => Direction::North,
            (1, 0) => Direction::East,
            (0, -1) => Direction::South,
            (-1, 0) => Direction::West,
            _ => Direction::None,
        }
    }
}

/// Integer grid cell coordinate. May lie outside a maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The adjacent cell in `direction` (itself for `Direction::None`).
    #[inline]
    pub fn neighbor(self, direction: Direction) -> CellCoord {
        let (dx, dy) = direction.offset();
        CellCoord::new(self.x + dx, self.y + dy)
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> CellCoord {
        CellCoord::new(self.x + dx, self.y + dy)
    }

    /// World-space center of the cell.
    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32) * CELL_SIZE
    }

    /// Cell whose center is nearest to a world position.
    #[inline]
    pub fn from_position(position: Vec2) -> CellCoord {
        let p = position / CELL_SIZE;
        CellCoord::new(p.x.round() as i32, p.y.round() as i32)
    }

    /// Euclidean distance in cells.
    #[inline]
    pub fn distance(self, other: CellCoord) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

impl std::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
