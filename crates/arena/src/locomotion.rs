//! Continuous cell-to-cell movement shared by every mobile actor.
//!
//! An actor travels in a straight line from one cell center to the next. On
//! arrival it asks its [`DirectionPolicy`] what to do and spends any distance
//! left over in the same frame, so a fast actor can cross several cells per
//! tick without missing a decision.

use crate::ai::{Arrival, Decision, DirectionPolicy, PolicyContext};
use crate::maze::{Maze, WallId};
use crate::phase::ArenaPhase;
use glam::Vec2;
use level::{CellCoord, Direction};
use rand::rngs::StdRng;

/// Safety valve for the leftover loop.
const MAX_ARRIVALS_PER_TICK: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveState {
    #[default]
    Idle,
    Moving,
}

/// Movement state of one actor.
#[derive(Debug, Clone)]
pub struct Locomotion {
    position: Vec2,
    /// Last cell center reached.
    cell: CellCoord,
    /// Cell currently being moved to.
    target: CellCoord,
    destination: Vec2,
    /// Travel direction; `None` during a free-form hop.
    direction: Direction,
    /// Last cardinal direction travelled.
    heading: Direction,
    speed: f32,
    state: MoveState,
    hopping: bool,
    /// Door opened by this actor and not yet closed behind it.
    held_door: Option<WallId>,
}

impl Locomotion {
    /// An idle actor standing on `cell`.
    pub fn new(cell: CellCoord, speed: f32) -> Self {
        Self {
            position: cell.center(),
            cell,
            target: cell,
            destination: cell.center(),
            direction: Direction::None,
            heading: Direction::None,
            speed,
            state: MoveState::Idle,
            hopping: false,
            held_door: None,
        }
    }

    /// Face `heading` without moving.
    pub fn with_heading(mut self, heading: Direction) -> Self {
        self.heading = heading;
        self
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn cell(&self) -> CellCoord {
        self.cell
    }

    #[inline]
    pub fn target(&self) -> CellCoord {
        self.target
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn heading(&self) -> Direction {
        self.heading
    }

    /// Unit vector of the current motion, or of the last heading at rest.
    pub fn heading_vector(&self) -> Vec2 {
        if self.hopping {
            if let Some(v) = (self.destination - self.position).try_normalize() {
                return v;
            }
        }
        self.heading.vector()
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    #[inline]
    pub fn state(&self) -> MoveState {
        self.state
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.state == MoveState::Moving
    }

    #[inline]
    pub fn is_hopping(&self) -> bool {
        self.is_moving() && self.hopping
    }

    /// Start towards the neighbor in `direction`.
    ///
    /// Does nothing (returns false) when already moving, for `None`, or when
    /// the way is blocked.
    pub fn start_moving(&mut self, direction: Direction, maze: &mut Maze, phase: ArenaPhase) -> bool {
        if self.is_moving() || direction == Direction::None {
            return false;
        }
        if maze.is_blocked(self.cell, direction, phase) {
            return false;
        }
        self.begin_step(direction, maze);
        true
    }

    /// Start a free-form move to the center of `cell`, ignoring walls.
    pub fn start_hop(&mut self, cell: CellCoord) {
        let (dx, dy) = (cell.x - self.cell.x, cell.y - self.cell.y);
        let major = if dx.abs() >= dy.abs() { (dx, 0) } else { (0, dy) };
        let facing = Direction::from_offset(major.0, major.1);
        if facing != Direction::None {
            self.heading = facing;
        }
        self.direction = Direction::None;
        self.target = cell;
        self.destination = cell.center();
        self.hopping = true;
        self.state = MoveState::Moving;
    }

    fn begin_step(&mut self, direction: Direction, maze: &mut Maze) {
        if let Some(door) = maze.door_at(self.cell, direction) {
            if let Some(previous) = self.held_door.replace(door) {
                if previous != door {
                    maze.close_door(previous);
                }
            }
            maze.open_door(door);
        }
        self.direction = direction;
        self.heading = direction;
        self.target = self.cell.neighbor(direction);
        self.destination = self.target.center();
        self.hopping = false;
        self.state = MoveState::Moving;
    }

    /// Direction to actually take when the policy asks for `wanted`.
    fn resolve_turn(&self, wanted: Direction, maze: &Maze, phase: ArenaPhase) -> Option<Direction> {
        if wanted != Direction::None && !maze.is_blocked(self.cell, wanted, phase) {
            return Some(wanted);
        }
        let current = self.heading;
        (current != Direction::None && !maze.is_blocked(self.cell, current, phase)).then_some(current)
    }

    /// Carry out a decision at the current cell center. Returns whether the
    /// actor is moving afterwards.
    fn apply(
        &mut self,
        decision: Decision,
        maze: &mut Maze,
        phase: ArenaPhase,
        corners: &mut Vec<Vec2>,
    ) -> bool {
        match decision {
            Decision::Stop => false,
            Decision::Hop(cell) if cell != self.cell => {
                self.start_hop(cell);
                true
            }
            Decision::Hop(_) => false,
            Decision::Turn(wanted) => match self.resolve_turn(wanted, maze, phase) {
                Some(direction) => {
                    if direction != self.heading && self.heading != Direction::None {
                        corners.push(self.position);
                    }
                    self.begin_step(direction, maze);
                    true
                }
                None => false,
            },
        }
    }

    /// Let the policy start an idle actor. Returns whether it is now moving.
    pub fn resume(
        &mut self,
        maze: &mut Maze,
        phase: ArenaPhase,
        policy: &mut dyn DirectionPolicy,
        rng: &mut StdRng,
        corners: &mut Vec<Vec2>,
    ) -> bool {
        if self.is_moving() {
            return false;
        }
        let arrival = Arrival {
            cell: self.cell,
            heading: self.heading,
            resumed: true,
        };
        let decision = {
            let mut ctx = PolicyContext {
                maze: &*maze,
                phase,
                rng: &mut *rng,
            };
            policy.next_direction(&arrival, &mut ctx)
        };
        self.apply(decision, maze, phase, corners)
    }

    /// Advance by `speed * dt`. Corners where the heading changed are pushed
    /// to `corners`. Returns the number of cell centers reached.
    pub fn tick(
        &mut self,
        dt: f32,
        maze: &mut Maze,
        phase: ArenaPhase,
        policy: &mut dyn DirectionPolicy,
        rng: &mut StdRng,
        corners: &mut Vec<Vec2>,
    ) -> u32 {
        if !self.is_moving() {
            return 0;
        }

        let mut budget = self.speed * dt;
        let mut arrivals = 0;
        while arrivals < MAX_ARRIVALS_PER_TICK {
            let old = self.position;
            let step = if self.hopping {
                (self.destination - old).normalize_or_zero()
            } else {
                self.direction.vector()
            };
            let new = old + step * budget;

            if (self.destination - old).dot(self.destination - new) > 0.0 {
                self.position = new;
                break;
            }

            // Reached or passed the cell center.
            let leftover = (budget - old.distance(self.destination)).max(0.0);
            let previous = self.cell;
            self.position = self.destination;
            self.cell = self.target;
            arrivals += 1;
            self.release_door_behind(previous, maze);

            let arrival = Arrival {
                cell: self.cell,
                heading: self.heading,
                resumed: false,
            };
            let decision = {
                let mut ctx = PolicyContext {
                    maze: &*maze,
                    phase,
                    rng: &mut *rng,
                };
                policy.next_direction(&arrival, &mut ctx)
            };
            if !self.apply(decision, maze, phase, corners) {
                self.halt(maze);
                break;
            }
            if leftover <= 0.0 {
                break;
            }
            budget = leftover;
        }
        arrivals
    }

    /// Close the held door once it no longer separates the current and previous cell.
    fn release_door_behind(&mut self, previous: CellCoord, maze: &mut Maze) {
        let Some(door) = self.held_door else {
            return;
        };
        let between = Direction::from_offset(previous.x - self.cell.x, previous.y - self.cell.y);
        if maze.barrier_id(self.cell, between) != Some(door) {
            maze.close_door(door);
            self.held_door = None;
        }
    }

    fn halt(&mut self, maze: &mut Maze) {
        self.state = MoveState::Idle;
        self.direction = Direction::None;
        self.hopping = false;
        self.destination = self.position;
        self.target = self.cell;
        if let Some(door) = self.held_door.take() {
            maze.close_door(door);
        }
    }

    /// Stop where the actor stands.
    pub fn stop(&mut self, maze: &mut Maze) {
        self.halt(maze);
    }

    /// Put the actor at rest on `cell`.
    pub fn place(&mut self, cell: CellCoord, maze: &mut Maze) {
        self.halt(maze);
        self.cell = cell;
        self.target = cell;
        self.position = cell.center();
        self.destination = self.position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::{DoorEvent, Door};
    use rand::SeedableRng;

    /// Always asks for the same direction.
    struct Steady(Direction);

    impl DirectionPolicy for Steady {
        fn next_direction(&mut self, _: &Arrival, _: &mut PolicyContext<'_>) -> Decision {
            Decision::Turn(self.0)
        }
    }

    /// Replays a script of decisions, then stops.
    struct Script(Vec<Decision>);

    impl DirectionPolicy for Script {
        fn next_direction(&mut self, _: &Arrival, _: &mut PolicyContext<'_>) -> Decision {
            if self.0.is_empty() {
                Decision::Stop
            } else {
                self.0.remove(0)
            }
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0)
    }

    #[test]
    fn test_start_moving_rules() {
        let mut maze = Maze::new(3, 3);
        let mut mover = Locomotion::new(CellCoord::new(0, 0), 1.0);
        assert!(!mover.start_moving(Direction::None, &mut maze, ArenaPhase::Playing));
        assert!(!mover.start_moving(Direction::West, &mut maze, ArenaPhase::Playing));
        assert!(mover.start_moving(Direction::North, &mut maze, ArenaPhase::Playing));
        assert!(!mover.start_moving(Direction::East, &mut maze, ArenaPhase::Playing));
        assert_eq!(mover.target(), CellCoord::new(0, 1));
    }

    #[test]
    fn test_multiple_cells_in_one_tick() {
        let mut maze = Maze::new(5, 5);
        let mut mover = Locomotion::new(CellCoord::new(0, 0), 10.0);
        let mut corners = Vec::new();
        mover.start_moving(Direction::East, &mut maze, ArenaPhase::Playing);

        let arrivals = mover.tick(0.25, &mut maze, ArenaPhase::Playing, &mut Steady(Direction::East), &mut rng(), &mut corners);
        assert_eq!(arrivals, 2);
        assert_eq!(mover.cell(), CellCoord::new(2, 0));
        assert!((mover.position() - Vec2::new(2.5, 0.0)).length() < 1e-5);
        assert!(corners.is_empty());
    }

    #[test]
    fn test_leftover_follows_turn() {
        let mut maze = Maze::new(5, 5);
        let mut mover = Locomotion::new(CellCoord::new(0, 0), 6.0);
        let mut corners = Vec::new();
        let mut policy = Script(vec![Decision::Turn(Direction::North)]);
        mover.start_moving(Direction::East, &mut maze, ArenaPhase::Playing);

        mover.tick(0.25, &mut maze, ArenaPhase::Playing, &mut policy, &mut rng(), &mut corners);
        assert!((mover.position() - Vec2::new(1.0, 0.5)).length() < 1e-5);
        assert_eq!(corners, vec![Vec2::new(1.0, 0.0)]);
        assert_eq!(mover.heading(), Direction::North);
    }

    #[test]
    fn test_blocked_turn_keeps_heading_then_stops() {
        let mut maze = Maze::new(3, 1);
        let mut mover = Locomotion::new(CellCoord::new(0, 0), 1.0);
        let mut corners = Vec::new();
        mover.start_moving(Direction::East, &mut maze, ArenaPhase::Playing);

        let mut policy = Steady(Direction::North);
        for _ in 0..12 {
            mover.tick(0.25, &mut maze, ArenaPhase::Playing, &mut policy, &mut rng(), &mut corners);
        }
        assert_eq!(mover.cell(), CellCoord::new(2, 0));
        assert_eq!(mover.state(), MoveState::Idle);
        assert_eq!(mover.position(), Vec2::new(2.0, 0.0));
        assert!(corners.is_empty());
    }

    #[test]
    fn test_door_opens_and_closes_behind() {
        let mut maze = Maze::new(5, 1);
        let door = maze
            .set_door(CellCoord::new(1, 0), Direction::East, Door::new(Direction::East))
            .unwrap();
        let mut mover = Locomotion::new(CellCoord::new(0, 0), 1.0);
        let mut corners = Vec::new();
        mover.start_moving(Direction::East, &mut maze, ArenaPhase::Playing);

        let mut policy = Steady(Direction::East);
        // Reach (1,0) and start through the door.
        for _ in 0..4 {
            mover.tick(0.25, &mut maze, ArenaPhase::Playing, &mut policy, &mut rng(), &mut corners);
        }
        assert_eq!(maze.drain_door_events(), vec![DoorEvent::Opened(door)]);

        // Reach (2,0): the door is still between current and previous cell.
        for _ in 0..4 {
            mover.tick(0.25, &mut maze, ArenaPhase::Playing, &mut policy, &mut rng(), &mut corners);
        }
        assert!(maze.door(door).unwrap().is_open());

        // Reach (3,0): the door is behind.
        for _ in 0..4 {
            mover.tick(0.25, &mut maze, ArenaPhase::Playing, &mut policy, &mut rng(), &mut corners);
        }
        assert_eq!(maze.drain_door_events(), vec![DoorEvent::Closed(door)]);
        assert!(!maze.door(door).unwrap().is_open());
    }

    #[test]
    fn test_hop_and_rest() {
        let mut maze = Maze::new(5, 5);
        maze.set_wall(CellCoord::new(0, 0), Direction::East);
        let mut mover = Locomotion::new(CellCoord::new(0, 0), 4.0);
        let mut corners = Vec::new();
        let mut policy = Script(vec![Decision::Hop(CellCoord::new(2, 0))]);

        assert!(mover.resume(&mut maze, ArenaPhase::Playing, &mut policy, &mut rng(), &mut corners));
        assert!(mover.is_hopping());
        assert_eq!(mover.heading(), Direction::East);

        let arrivals = mover.tick(0.5, &mut maze, ArenaPhase::Playing, &mut policy, &mut rng(), &mut corners);
        assert_eq!(arrivals, 1);
        assert_eq!(mover.cell(), CellCoord::new(2, 0));
        assert!(!mover.is_moving());
    }
}
