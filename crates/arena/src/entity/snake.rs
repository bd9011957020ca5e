//! A snake: a segment chain driven by a locomotion state machine.
//!
//! The head follows the maze; every body segment is placed on the head's
//! trail at its arc length, with the lateral wave applied for rendering.

use super::{ChainId, SegmentChain, SegmentId, SegmentPool, Side};
use crate::ai::SnakeBrain;
use crate::locomotion::Locomotion;
use crate::maze::Maze;
use crate::phase::ArenaPhase;
use crate::trail::{TrailPath, wave};
use glam::Vec2;
use level::{CellCoord, Color, Direction};
use rand::rngs::StdRng;

/// Highest interaction severity a head was involved in this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ThreatLevel {
    #[default]
    None,
    KilledSomething,
}

/// Sprite sizes and colors of a chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnakeBody {
    pub head_extent: f32,
    pub segment_extent: f32,
    pub palette: (Color, Color),
}

#[derive(Debug, Clone)]
pub struct Snake {
    pub id: ChainId,
    chain: SegmentChain,
    pub trail: TrailPath,
    pub mover: Locomotion,
    pub brain: SnakeBrain,
    pub threat: ThreatLevel,
    body: SnakeBody,
    alive: bool,
    corners: Vec<Vec2>,
}

impl Snake {
    /// Spawn a chain of `length` segments on `cell`, laid out straight
    /// behind a head facing `heading`.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        id: ChainId,
        side: Side,
        pool: &mut SegmentPool,
        cell: CellCoord,
        heading: Direction,
        length: usize,
        body: SnakeBody,
        speed: f32,
        brain: SnakeBrain,
    ) -> Self {
        let mut chain = SegmentChain::new(pool, side, body.head_extent, body.palette);
        for _ in 1..length.max(1) {
            chain.grow(pool, body.segment_extent);
        }
        let trail = TrailPath::new(
            cell.center(),
            heading.vector(),
            chain.tail_distance(pool) + body.segment_extent,
        );
        let mut snake = Self {
            id,
            chain,
            trail,
            mover: Locomotion::new(cell, speed).with_heading(heading),
            brain,
            threat: ThreatLevel::None,
            body,
            alive: true,
            corners: Vec::new(),
        };
        snake.place_segments(pool);
        snake
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.chain.side()
    }

    #[inline]
    pub fn chain(&self) -> &SegmentChain {
        &self.chain
    }

    #[inline]
    pub fn chain_mut(&mut self) -> &mut SegmentChain {
        &mut self.chain
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[inline]
    pub fn body(&self) -> SnakeBody {
        self.body
    }

    #[inline]
    pub fn head_position(&self) -> Vec2 {
        self.mover.position()
    }

    pub fn head_radius(&self, pool: &SegmentPool) -> f32 {
        pool.get(self.chain.head()).map_or(0.0, |s| s.radius())
    }

    /// Raise the threat indicator; it never drops within a tick.
    pub fn raise_threat(&mut self, level: ThreatLevel) {
        self.threat = self.threat.max(level);
    }

    /// Append one segment and keep the trail long enough to hold it.
    pub fn grow(&mut self, pool: &mut SegmentPool) -> SegmentId {
        let id = self.chain.grow(pool, self.body.segment_extent);
        self.trail
            .ensure_length(self.chain.tail_distance(pool) + self.body.segment_extent);
        self.place_segments(pool);
        id
    }

    /// Mark dead and stop moving. The chain itself is severed by the caller.
    pub fn die(&mut self, maze: &mut Maze) {
        self.alive = false;
        self.mover.stop(maze);
    }

    fn record_corners(&mut self) {
        for corner in self.corners.drain(..) {
            self.trail.update_head_position(corner);
            self.trail.add_position(corner);
        }
        self.trail.update_head_position(self.mover.position());
    }

    /// Move the head for one tick. Returns the number of cells reached.
    pub fn advance(&mut self, dt: f32, maze: &mut Maze, phase: ArenaPhase, rng: &mut StdRng) -> u32 {
        if !self.alive {
            return 0;
        }
        self.corners.clear();
        let arrivals = self
            .mover
            .tick(dt, maze, phase, &mut self.brain, rng, &mut self.corners);
        self.record_corners();
        arrivals
    }

    /// Ask the brain to start a resting snake.
    pub fn resume(&mut self, maze: &mut Maze, phase: ArenaPhase, rng: &mut StdRng) -> bool {
        if !self.alive {
            return false;
        }
        self.corners.clear();
        let moved = self
            .mover
            .resume(maze, phase, &mut self.brain, rng, &mut self.corners);
        self.record_corners();
        moved
    }

    /// Start in `direction` on request from input.
    pub fn start_moving(&mut self, direction: Direction, maze: &mut Maze, phase: ArenaPhase) -> bool {
        if !self.alive {
            return false;
        }
        let previous = self.mover.heading();
        let moved = self.mover.start_moving(direction, maze, phase);
        if moved && previous != Direction::None && previous != direction {
            let here = self.mover.position();
            self.trail.update_head_position(here);
            self.trail.add_position(here);
        }
        moved
    }

    /// Place every segment on the trail.
    pub fn place_segments(&mut self, pool: &mut SegmentPool) {
        let speed = self.mover.speed();
        let head_facing = self.mover.heading_vector();
        let mut current = Some(self.chain.head());
        let mut index = 0;
        while let Some(id) = current {
            let Some(segment) = pool.get_mut(id) else {
                break;
            };
            current = segment.next();

            if segment.is_head() {
                segment.position = self.mover.position();
                segment.render_position = segment.position;
                if head_facing != Vec2::ZERO {
                    segment.rotation = head_facing.y.atan2(head_facing.x);
                }
            } else {
                let placement = self.trail.place(segment.distance);
                let sample = wave::sample(&placement, segment.distance, index, speed);
                segment.position = placement.position;
                segment.render_position = placement.position + sample.offset;
                if let Some(rotation) = sample.rotation {
                    segment.rotation = rotation;
                }
            }
            index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{PlayerPolicy, SnakeBrain};
    use rand::SeedableRng;

    const BODY: SnakeBody = SnakeBody {
        head_extent: 0.8,
        segment_extent: 0.6,
        palette: (Color::new(0, 200, 0), Color::new(0, 80, 0)),
    };

    fn player_snake(pool: &mut SegmentPool, cell: CellCoord, length: usize) -> Snake {
        Snake::spawn(
            ChainId::new(1),
            Side::Player,
            pool,
            cell,
            Direction::North,
            length,
            BODY,
            2.0,
            SnakeBrain::Player(PlayerPolicy::new()),
        )
    }

    #[test]
    fn test_spawn_lays_body_behind_head() {
        let mut pool = SegmentPool::new();
        let snake = player_snake(&mut pool, CellCoord::new(2, 2), 3);
        let positions: Vec<Vec2> = snake.chain().iter(&pool).map(|(_, s)| s.position).collect();
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[0], Vec2::new(2.0, 2.0));
        assert!((positions[1] - Vec2::new(2.0, 1.3)).length() < 1e-5);
        assert!((positions[2] - Vec2::new(2.0, 0.7)).length() < 1e-5);
    }

    #[test]
    fn test_stops_at_border() {
        let mut maze = Maze::new(5, 5);
        maze.enclose();
        let mut pool = SegmentPool::new();
        let mut rng = StdRng::seed_from_u64(0);
        let mut snake = player_snake(&mut pool, CellCoord::new(2, 2), 3);
        if let Some(p) = snake.brain.as_player_mut() {
            p.set_desired(Direction::North);
        }
        assert!(snake.start_moving(Direction::North, &mut maze, ArenaPhase::Playing));

        for _ in 0..8 {
            snake.advance(0.25, &mut maze, ArenaPhase::Playing, &mut rng);
            snake.place_segments(&mut pool);
        }
        assert_eq!(snake.mover.cell(), CellCoord::new(2, 4));
        assert!(!snake.mover.is_moving());
        let open: Vec<Direction> = maze
            .unblocked_directions(CellCoord::new(2, 4), ArenaPhase::Playing)
            .collect();
        assert!(!open.contains(&Direction::North));
        assert_eq!(snake.len(), 3);
    }

    #[test]
    fn test_body_follows_corner() {
        let mut maze = Maze::new(6, 6);
        let mut pool = SegmentPool::new();
        let mut rng = StdRng::seed_from_u64(0);
        let mut snake = player_snake(&mut pool, CellCoord::new(1, 1), 3);
        snake.start_moving(Direction::North, &mut maze, ArenaPhase::Playing);
        if let Some(p) = snake.brain.as_player_mut() {
            p.set_desired(Direction::East);
        }
        // One cell north, then one cell east.
        for _ in 0..4 {
            snake.advance(0.25, &mut maze, ArenaPhase::Playing, &mut rng);
        }
        snake.place_segments(&mut pool);

        assert_eq!(snake.head_position(), Vec2::new(2.0, 2.0));
        let body: Vec<Vec2> = snake.chain().iter(&pool).skip(1).map(|(_, s)| s.position).collect();
        assert!((body[0] - Vec2::new(1.3, 2.0)).length() < 1e-5);
        assert!((body[1] - Vec2::new(1.0, 1.7)).length() < 1e-5);
    }

    #[test]
    fn test_grow_keeps_trail_covering_tail() {
        let mut pool = SegmentPool::new();
        let mut snake = player_snake(&mut pool, CellCoord::new(2, 2), 2);
        for _ in 0..30 {
            snake.grow(&mut pool);
            assert!(snake.trail.length() >= snake.chain().tail_distance(&pool));
        }
        assert_eq!(snake.len(), 32);
    }
}
