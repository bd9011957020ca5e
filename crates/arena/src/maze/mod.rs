//! Maze topology.
//!
//! The maze is a grid of cells. Each cell has four wall slots (one per
//! cardinal direction) holding an optional barrier id. A barrier between two
//! cells is stored once and referenced from both sides, so cell A's slot for
//! direction D and its neighbor's slot for the opposite direction always hold
//! the same id.

mod door;
mod loader;

pub use door::Door;
pub use loader::BORDER_MARGIN;

use crate::phase::ArenaPhase;
use level::{CellCoord, Direction};

/// Index of a barrier in the maze's barrier arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WallId(u32);

impl WallId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Something occupying one side of a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Barrier {
    /// Always blocks.
    Wall,
    Door(Door),
}

/// One grid square.
#[derive(Debug, Clone)]
pub struct Cell {
    pub coord: CellCoord,
    pub in_start_zone: bool,
    slots: [Option<WallId>; 4],
}

impl Cell {
    fn new(coord: CellCoord) -> Self {
        Self {
            coord,
            in_start_zone: false,
            slots: [None; 4],
        }
    }

    /// Barrier id in the slot for `direction`.
    #[inline]
    pub fn slot(&self, direction: Direction) -> Option<WallId> {
        direction.index().and_then(|i| self.slots[i])
    }
}

/// Cosmetic door state change, consumed by presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorEvent {
    Opened(WallId),
    Closed(WallId),
}

/// Named special positions of a level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Landmarks {
    pub player_start: Option<CellCoord>,
    pub enemy_start: Option<CellCoord>,
    pub zone_entrance: Option<CellCoord>,
    pub zone_center: Option<CellCoord>,
    pub zone_exit: Option<CellCoord>,
}

/// The maze grid.
#[derive(Debug, Clone)]
pub struct Maze {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    barriers: Vec<Barrier>,
    landmarks: Landmarks,
    door_events: Vec<DoorEvent>,
}

impl Maze {
    /// Create an open maze with no walls.
    pub fn new(width: u32, height: u32) -> Self {
        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                cells.push(Cell::new(CellCoord::new(x, y)));
            }
        }
        Self {
            width,
            height,
            cells,
            barriers: Vec::new(),
            landmarks: Landmarks::default(),
            door_events: Vec::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.width
            && (coord.y as u32) < self.height
    }

    #[inline]
    fn index(&self, coord: CellCoord) -> Option<usize> {
        self.contains(coord)
            .then(|| coord.y as usize * self.width as usize + coord.x as usize)
    }

    #[inline]
    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        self.index(coord).map(|i| &self.cells[i])
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    #[inline]
    pub fn in_start_zone(&self, coord: CellCoord) -> bool {
        self.cell(coord).is_some_and(|c| c.in_start_zone)
    }

    pub fn set_start_zone(&mut self, coord: CellCoord, in_zone: bool) {
        if let Some(i) = self.index(coord) {
            self.cells[i].in_start_zone = in_zone;
        }
    }

    pub fn start_zone_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().filter(|c| c.in_start_zone).map(|c| c.coord)
    }

    #[inline]
    pub fn landmarks(&self) -> &Landmarks {
        &self.landmarks
    }

    #[inline]
    pub fn landmarks_mut(&mut self) -> &mut Landmarks {
        &mut self.landmarks
    }

    /// Barrier id on the `direction` side of `coord`.
    #[inline]
    pub fn barrier_id(&self, coord: CellCoord, direction: Direction) -> Option<WallId> {
        self.cell(coord).and_then(|c| c.slot(direction))
    }

    #[inline]
    pub fn barrier(&self, id: WallId) -> Option<&Barrier> {
        self.barriers.get(id.index())
    }

    pub fn door(&self, id: WallId) -> Option<&Door> {
        match self.barrier(id) {
            Some(Barrier::Door(door)) => Some(door),
            _ => None,
        }
    }

    /// Door on the `direction` side of `coord`, if the slot holds one.
    pub fn door_at(&self, coord: CellCoord, direction: Direction) -> Option<WallId> {
        self.barrier_id(coord, direction)
            .filter(|id| self.door(*id).is_some())
    }

    pub fn doors(&self) -> impl Iterator<Item = (WallId, &Door)> {
        self.barriers.iter().enumerate().filter_map(|(i, b)| match b {
            Barrier::Door(door) => Some((WallId(i as u32), door)),
            Barrier::Wall => None,
        })
    }

    /// Place a barrier on the `direction` side of `coord` and mirror it into
    /// the neighbor's opposite slot.
    pub fn set_barrier(
        &mut self,
        coord: CellCoord,
        direction: Direction,
        barrier: Barrier,
    ) -> Option<WallId> {
        let slot = direction.index()?;
        let index = self.index(coord)?;
        let id = WallId(self.barriers.len() as u32);
        self.barriers.push(barrier);
        self.cells[index].slots[slot] = Some(id);

        let opposite = direction.opposite().index()?;
        if let Some(n) = self.index(coord.neighbor(direction)) {
            self.cells[n].slots[opposite] = Some(id);
        }
        Some(id)
    }

    pub fn set_wall(&mut self, coord: CellCoord, direction: Direction) -> Option<WallId> {
        self.set_barrier(coord, direction, Barrier::Wall)
    }

    pub fn set_door(&mut self, coord: CellCoord, direction: Direction, door: Door) -> Option<WallId> {
        self.set_barrier(coord, direction, Barrier::Door(door))
    }

    /// Wall in the outer edges of the grid.
    pub fn enclose(&mut self) {
        let (w, h) = (self.width as i32, self.height as i32);
        for x in 0..w {
            self.set_wall(CellCoord::new(x, 0), Direction::South);
            self.set_wall(CellCoord::new(x, h - 1), Direction::North);
        }
        for y in 0..h {
            self.set_wall(CellCoord::new(0, y), Direction::West);
            self.set_wall(CellCoord::new(w - 1, y), Direction::East);
        }
    }

    /// Whether moving out of `coord` in `direction` is blocked during `phase`.
    pub fn is_blocked(&self, coord: CellCoord, direction: Direction, phase: ArenaPhase) -> bool {
        if direction == Direction::None {
            return false;
        }
        let Some(cell) = self.cell(coord) else {
            return true;
        };
        if !self.contains(coord.neighbor(direction)) {
            return true;
        }
        if cell.in_start_zone && phase.is_playing() {
            return false;
        }
        match cell.slot(direction).and_then(|id| self.barrier(id)) {
            None => false,
            Some(Barrier::Wall) => true,
            Some(Barrier::Door(door)) => !door.permits(direction, phase),
        }
    }

    /// Cardinal directions that are not blocked from `coord`.
    pub fn unblocked_directions(
        &self,
        coord: CellCoord,
        phase: ArenaPhase,
    ) -> impl Iterator<Item = Direction> + '_ {
        Direction::CARDINALS
            .into_iter()
            .filter(move |&d| !self.is_blocked(coord, d, phase))
    }

    /// Open a door. Idempotent; returns true if the state changed.
    pub fn open_door(&mut self, id: WallId) -> bool {
        let changed = match self.barriers.get_mut(id.index()) {
            Some(Barrier::Door(door)) => door.open(),
            _ => false,
        };
        if changed {
            self.door_events.push(DoorEvent::Opened(id));
        }
        changed
    }

    /// Close a door. Idempotent; returns true if the state changed.
    pub fn close_door(&mut self, id: WallId) -> bool {
        let changed = match self.barriers.get_mut(id.index()) {
            Some(Barrier::Door(door)) => door.close(),
            _ => false,
        };
        if changed {
            self.door_events.push(DoorEvent::Closed(id));
        }
        changed
    }

    pub fn drain_door_events(&mut self) -> Vec<DoorEvent> {
        std::mem::take(&mut self.door_events)
    }
}
