//! Level document definitions.
//!
//! A level is a JSON document describing the maze size, wall lines, door
//! descriptors and the player start zone.

use crate::error::LevelError;
use crate::walls::WallGrid;
use crate::Direction;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw level document as stored on disk.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDocument {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Alternating horizontal and vertical edge lines, top to bottom.
    #[serde(default)]
    pub walls: Option<Vec<String>>,
    #[serde(default)]
    pub doors: Vec<DoorDescriptor>,
    #[serde(default)]
    pub player_start_zone: Option<Vec<ZoneCell>>,
}

/// One door referenced from the wall lines by its 1-based index.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorDescriptor {
    /// Direction letter: `N`, `E`, `S`, `W` or an extended diagonal letter.
    pub direction: String,
    #[serde(default)]
    pub special: Option<String>,
    #[serde(default)]
    pub required_state: Option<String>,
}

/// Start zone cell, in level coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ZoneCell {
    #[serde(rename = "X")]
    pub x: i32,
    #[serde(rename = "Y")]
    pub y: i32,
}

/// Landmark tag carried by a door.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorTag {
    PlayerStart,
    EnemyStart,
    PlayerZoneExit,
    PlayerZoneEntrance,
}

impl DoorTag {
    pub fn parse(name: &str) -> Option<DoorTag> {
        match name.trim() {
            "PlayerStart" => Some(DoorTag::PlayerStart),
            "EnemyStart" => Some(DoorTag::EnemyStart),
            "PlayerZoneExit" => Some(DoorTag::PlayerZoneExit),
            "PlayerZoneEntrance" => Some(DoorTag::PlayerZoneEntrance),
            _ => None,
        }
    }
}

/// Resolve a door direction letter.
///
/// Extended letters name an ordered pair of candidate directions
/// (`A`=N/E, `B`=E/N, `C`=E/S, `D`=S/E, `F`=S/W, `G`=W/S, `H`=W/N, `I`=N/W);
/// the first direction of the pair is used.
pub fn parse_direction_letter(letter: &str) -> Option<Direction> {
    let mut chars = letter.trim().chars();
    let c = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() {
        return None;
    }
    let pair = match c {
        'N' => return Some(Direction::North),
        'E' => return Some(Direction::East),
        'S' => return Some(Direction::South),
        'W' => return Some(Direction::West),
        'A' => (Direction::North, Direction::East),
        'B' => (Direction::East, Direction::North),
        'C' => (Direction::East, Direction::South),
        'D' => (Direction::South, Direction::East),
        'F' => (Direction::South, Direction::West),
        'G' => (Direction::West, Direction::South),
        'H' => (Direction::West, Direction::North),
        'I' => (Direction::North, Direction::West),
        _ => return None,
    };
    Some(pair.0)
}

impl DoorDescriptor {
    /// Openable approach direction, `None` when the letter is unknown.
    pub fn direction(&self) -> Option<Direction> {
        parse_direction_letter(&self.direction)
    }

    pub fn tag(&self) -> Option<DoorTag> {
        self.special.as_deref().and_then(DoorTag::parse)
    }
}

impl LevelDocument {
    /// Parse a level from JSON text.
    pub fn from_json(text: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a level file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Declared size, failing when either dimension is absent or zero.
    pub fn size(&self) -> Result<(u32, u32), LevelError> {
        let width = self.width.ok_or(LevelError::MissingField("width"))?;
        let height = self.height.ok_or(LevelError::MissingField("height"))?;
        if width == 0 || height == 0 {
            return Err(LevelError::InvalidSize { width, height });
        }
        Ok((width, height))
    }

    /// Parse the wall lines into an edge grid.
    pub fn wall_grid(&self) -> Result<WallGrid, LevelError> {
        let (width, height) = self.size()?;
        let lines = self
            .walls
            .as_deref()
            .filter(|l| !l.is_empty())
            .ok_or(LevelError::MissingField("walls"))?;
        WallGrid::parse(width, height, lines)
    }

    /// Start zone cells; an absent field is an error, an empty list is not.
    pub fn start_zone(&self) -> Result<&[ZoneCell], LevelError> {
        self.player_start_zone
            .as_deref()
            .ok_or(LevelError::MissingField("playerStartZone"))
    }

    /// Door descriptor for a 1-based index from the wall lines.
    pub fn door(&self, index: u8) -> Option<&DoorDescriptor> {
        (index as usize).checked_sub(1).and_then(|i| self.doors.get(i))
    }
}
