use super::{Arrival, Decision, DirectionPolicy, PolicyContext};
use level::Direction;
use rand::seq::IndexedRandom;

/// Wanders the maze at random, never reversing unless boxed in.
#[derive(Debug, Clone, Default)]
pub struct AutonomousPolicy;

impl AutonomousPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl DirectionPolicy for AutonomousPolicy {
    fn next_direction(&mut self, arrival: &Arrival, ctx: &mut PolicyContext<'_>) -> Decision {
        let reverse = arrival.heading.opposite();
        let open: Vec<Direction> = ctx.maze.unblocked_directions(arrival.cell, ctx.phase).collect();

        let forward: Vec<Direction> = open.iter().copied().filter(|&d| d != reverse).collect();
        match forward.choose(&mut *ctx.rng) {
            Some(&d) => Decision::Turn(d),
            None if open.contains(&reverse) => Decision::Turn(reverse),
            None => Decision::Stop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::Maze;
    use crate::phase::ArenaPhase;
    use level::CellCoord;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn decide(maze: &Maze, cell: CellCoord, heading: Direction, rng: &mut StdRng) -> Decision {
        let mut ctx = PolicyContext {
            maze,
            phase: ArenaPhase::Playing,
            rng,
        };
        let arrival = Arrival {
            cell,
            heading,
            resumed: false,
        };
        AutonomousPolicy::new().next_direction(&arrival, &mut ctx)
    }

    #[test]
    fn test_never_reverses_with_alternatives() {
        let maze = Maze::new(5, 5);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let d = decide(&maze, CellCoord::new(2, 2), Direction::North, &mut rng);
            assert_ne!(d, Decision::Turn(Direction::South));
            assert_ne!(d, Decision::Stop);
        }
    }

    #[test]
    fn test_dead_end_reverses() {
        let mut maze = Maze::new(3, 3);
        maze.set_wall(CellCoord::new(1, 1), Direction::North);
        maze.set_wall(CellCoord::new(1, 1), Direction::East);
        maze.set_wall(CellCoord::new(1, 1), Direction::West);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            decide(&maze, CellCoord::new(1, 1), Direction::North, &mut rng),
            Decision::Turn(Direction::South)
        );
    }

    #[test]
    fn test_boxed_in_stops() {
        let mut maze = Maze::new(1, 1);
        maze.enclose();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            decide(&maze, CellCoord::new(0, 0), Direction::East, &mut rng),
            Decision::Stop
        );
    }

    #[test]
    fn test_choices_cover_all_open_exits() {
        let maze = Maze::new(5, 5);
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            if let Decision::Turn(d) = decide(&maze, CellCoord::new(2, 2), Direction::East, &mut rng) {
                seen.insert(d);
            }
        }
        assert_eq!(seen.len(), 3);
    }
}
