//! Build a maze from a level document.

use super::{Barrier, Door, Maze};
use crate::phase::ArenaPhase;
use level::{CellCoord, Direction, DoorTag, LevelDocument, LevelError, WallToken};
use tracing::{debug, info, warn};

/// Open cells added around the declared level size.
pub const BORDER_MARGIN: u32 = 1;

impl Maze {
    /// Build a maze from level data.
    ///
    /// Missing size, wall or start zone data aborts the load; no partially
    /// built maze is returned.
    pub fn from_level(doc: &LevelDocument) -> Result<Maze, LevelError> {
        let (width, height) = doc.size()?;
        let grid = doc.wall_grid()?;
        let zone = doc.start_zone()?;

        let m = BORDER_MARGIN as i32;
        let mut maze = Maze::new(width + 2 * BORDER_MARGIN, height + 2 * BORDER_MARGIN);

        for row in 0..=height {
            for x in 0..width {
                let cell = CellCoord::new(x as i32 + m, row as i32 + m);
                maze.apply_token(doc, grid.south_edge(x, row), cell, Direction::South);
            }
        }
        for y in 0..height {
            for column in 0..=width {
                let cell = CellCoord::new(column as i32 + m, y as i32 + m);
                maze.apply_token(doc, grid.west_edge(column, y), cell, Direction::West);
            }
        }

        for z in zone {
            let coord = CellCoord::new(z.x + m, z.y + m);
            if maze.contains(coord) {
                maze.set_start_zone(coord, true);
            } else {
                warn!("Start zone cell ({}, {}) is outside the level", z.x, z.y);
            }
        }
        maze.landmarks.zone_center = maze.zone_center();

        info!(
            "Loaded level {}x{} ({} doors, {} start zone cells)",
            width,
            height,
            maze.doors().count(),
            maze.start_zone_cells().count()
        );
        Ok(maze)
    }

    fn apply_token(
        &mut self,
        doc: &LevelDocument,
        token: WallToken,
        cell: CellCoord,
        slot: Direction,
    ) {
        match token {
            WallToken::Empty => {}
            WallToken::Wall => {
                self.set_barrier(cell, slot, Barrier::Wall);
            }
            WallToken::Door(index) => {
                let Some(desc) = doc.door(index) else {
                    debug!("Ignoring reference to missing door {} at {}", index, cell);
                    return;
                };
                let Some(side) = desc.direction() else {
                    warn!("Door {} has unknown direction {:?}; ignored", index, desc.direction);
                    return;
                };
                let required = desc.required_state.as_deref().and_then(|name| {
                    let phase = ArenaPhase::parse(name);
                    if phase.is_none() {
                        warn!("Door {} requires unknown state {:?}; treating as unrestricted", index, name);
                    }
                    phase
                });
                let tag = desc.tag();
                if tag.is_none() {
                    if let Some(special) = &desc.special {
                        warn!("Door {} has unknown special tag {:?}", index, special);
                    }
                }

                let door = Door::new(side).with_required_phase(required).with_tag(tag);
                self.set_barrier(cell, slot, Barrier::Door(door));

                if let Some(tag) = tag {
                    let into = if side == slot {
                        cell.neighbor(slot)
                    } else {
                        if side != slot.opposite() {
                            warn!("Door {} opens {:?} across a {:?} edge", index, side, slot);
                        }
                        cell
                    };
                    let marks = &mut self.landmarks;
                    let entry = match tag {
                        DoorTag::PlayerStart => &mut marks.player_start,
                        DoorTag::EnemyStart => &mut marks.enemy_start,
                        DoorTag::PlayerZoneEntrance => &mut marks.zone_entrance,
                        DoorTag::PlayerZoneExit => &mut marks.zone_exit,
                    };
                    *entry = Some(into);
                }
            }
        }
    }

    /// Start zone cell closest to the zone's mean position.
    fn zone_center(&self) -> Option<CellCoord> {
        let cells: Vec<CellCoord> = self.start_zone_cells().collect();
        if cells.is_empty() {
            return None;
        }
        let n = cells.len() as f32;
        let mx = cells.iter().map(|c| c.x as f32).sum::<f32>() / n;
        let my = cells.iter().map(|c| c.y as f32).sum::<f32>() / n;
        cells.into_iter().min_by(|a, b| {
            let da = (a.x as f32 - mx).powi(2) + (a.y as f32 - my).powi(2);
            let db = (b.x as f32 - mx).powi(2) + (b.y as f32 - my).powi(2);
            da.total_cmp(&db)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 4x3 level: a start zone box on the left with an entrance door from the
    // east and an exit door to the north.
    const LEVEL: &str = r#"{
        "width": 4,
        "height": 3,
        "walls": [
            "--------",
            "|       |",
            "--D2    ",
            "|   D1  |",
            "----    ",
            "|       |",
            "--------"
        ],
        "doors": [
            { "direction": "W", "special": "PlayerZoneEntrance" },
            { "direction": "I", "special": "PlayerZoneExit", "requiredState": "Bogus" }
        ],
        "playerStartZone": [{ "X": 0, "Y": 1 }, { "X": 1, "Y": 1 }]
    }"#;

    fn load() -> Maze {
        Maze::from_level(&LevelDocument::from_json(LEVEL).unwrap()).unwrap()
    }

    #[test]
    fn test_margin_and_size() {
        let maze = load();
        assert_eq!(maze.width(), 6);
        assert_eq!(maze.height(), 5);
        assert!(maze.in_start_zone(CellCoord::new(1, 2)));
        assert!(maze.in_start_zone(CellCoord::new(2, 2)));
        assert!(!maze.in_start_zone(CellCoord::new(3, 2)));
    }

    #[test]
    fn test_walls_and_shared_slots() {
        let maze = load();
        // Left border of the level.
        assert!(maze.is_blocked(CellCoord::new(1, 1), Direction::West, ArenaPhase::Starting));
        assert!(maze.is_blocked(CellCoord::new(0, 1), Direction::East, ArenaPhase::Starting));
        for cell in maze.cells() {
            for d in Direction::CARDINALS {
                if let Some(other) = maze.cell(cell.coord.neighbor(d)) {
                    assert_eq!(cell.slot(d), other.slot(d.opposite()));
                }
            }
        }
    }

    #[test]
    fn test_doors_and_landmarks() {
        let maze = load();
        assert_eq!(maze.doors().count(), 2);

        // Entrance: west edge of level (2,1) -> maze (3,2), opens westwards.
        let entrance = maze.door_at(CellCoord::new(3, 2), Direction::West).unwrap();
        assert_eq!(maze.door(entrance).unwrap().side(), Direction::West);
        assert!(!maze.is_blocked(CellCoord::new(3, 2), Direction::West, ArenaPhase::Starting));
        assert!(maze.is_blocked(CellCoord::new(2, 2), Direction::East, ArenaPhase::Starting));
        assert_eq!(maze.landmarks().zone_entrance, Some(CellCoord::new(2, 2)));

        // Exit: north edge of level (1,1); unknown phase falls back to unrestricted.
        let exit = maze.door_at(CellCoord::new(2, 2), Direction::North).unwrap();
        assert_eq!(maze.door(exit).unwrap().required_phase(), None);
        assert_eq!(maze.landmarks().zone_exit, Some(CellCoord::new(2, 3)));
        assert!(maze.landmarks().zone_center.is_some());
    }

    #[test]
    fn test_missing_start_zone_aborts() {
        let doc = LevelDocument::from_json(
            r#"{ "width": 1, "height": 1, "walls": ["--", "| |", "--"] }"#,
        )
        .unwrap();
        assert!(matches!(
            Maze::from_level(&doc),
            Err(LevelError::MissingField("playerStartZone"))
        ));
    }

    #[test]
    fn test_missing_door_index_ignored() {
        let doc = LevelDocument::from_json(
            r#"{ "width": 2, "height": 1, "walls": ["----", "| D7| ", "----"], "playerStartZone": [] }"#,
        )
        .unwrap();
        let maze = Maze::from_level(&doc).unwrap();
        assert_eq!(maze.doors().count(), 0);
        assert!(!maze.is_blocked(CellCoord::new(1, 1), Direction::East, ArenaPhase::Starting));
    }
}
