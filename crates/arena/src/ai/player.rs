use super::{Arrival, Decision, DirectionPolicy, PolicyContext};
use level::{CellCoord, Direction};
use rand::Rng;

/// Follows the direction queued by input, or an automatic route back home.
#[derive(Debug, Clone, Default)]
pub struct PlayerPolicy {
    desired: Direction,
    route: Vec<CellCoord>,
    next_waypoint: usize,
    returned: bool,
}

impl PlayerPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the direction to take at the next intersection.
    pub fn set_desired(&mut self, direction: Direction) {
        self.desired = direction;
    }

    #[inline]
    pub fn desired(&self) -> Direction {
        self.desired
    }

    /// Take over from input and walk through `waypoints` in order.
    pub fn begin_route(&mut self, waypoints: Vec<CellCoord>) {
        self.route = waypoints;
        self.next_waypoint = 0;
        self.returned = false;
    }

    #[inline]
    pub fn is_routing(&self) -> bool {
        !self.returned && self.next_waypoint < self.route.len()
    }

    /// The final waypoint was reached.
    #[inline]
    pub fn has_returned(&self) -> bool {
        self.returned
    }

    pub fn current_target(&self) -> Option<CellCoord> {
        self.route.get(self.next_waypoint).copied()
    }

    fn route_step(&mut self, arrival: &Arrival, ctx: &mut PolicyContext<'_>) -> Decision {
        let cell = arrival.cell;
        while self.current_target() == Some(cell) {
            self.next_waypoint += 1;
        }
        let Some(target) = self.current_target() else {
            self.returned = true;
            return Decision::Stop;
        };

        let reverse = arrival.heading.opposite();
        let open: Vec<Direction> = ctx.maze.unblocked_directions(cell, ctx.phase).collect();
        let forward: Vec<Direction> = open.iter().copied().filter(|&d| d != reverse).collect();
        match forward.as_slice() {
            [] if open.contains(&reverse) => Decision::Turn(reverse),
            [] => Decision::Stop,
            // Corridor: the only way on.
            [only] => Decision::Turn(*only),
            _ => rank_towards(cell, target, &mut *ctx.rng)
                .into_iter()
                .find(|d| forward.contains(d))
                .map_or(Decision::Stop, Decision::Turn),
        }
    }
}

/// Preference order at an intersection when heading for `target`:
/// dominant axis, perpendicular towards the target, the other perpendicular,
/// then back.
pub fn rank_towards<R: Rng + ?Sized>(cell: CellCoord, target: CellCoord, rng: &mut R) -> [Direction; 4] {
    let dx = target.x - cell.x;
    let dy = target.y - cell.y;

    let (primary, lateral, pair) = if dx.abs() >= dy.abs() {
        (Direction::from_offset(dx, 0), dy, (Direction::North, Direction::South))
    } else {
        (Direction::from_offset(0, dy), dx, (Direction::East, Direction::West))
    };
    let perpendicular = match lateral.signum() {
        1 => pair.0,
        -1 => pair.1,
        _ if rng.random_bool(0.5) => pair.0,
        _ => pair.1,
    };

    [primary, perpendicular, perpendicular.opposite(), primary.opposite()]
}

impl DirectionPolicy for PlayerPolicy {
    fn next_direction(&mut self, arrival: &Arrival, ctx: &mut PolicyContext<'_>) -> Decision {
        if self.returned {
            return Decision::Stop;
        }
        if self.is_routing() {
            return self.route_step(arrival, ctx);
        }
        match (self.desired, arrival.heading) {
            (Direction::None, Direction::None) => Decision::Stop,
            (Direction::None, heading) if !arrival.resumed => Decision::Turn(heading),
            (Direction::None, _) => Decision::Stop,
            (desired, _) => Decision::Turn(desired),
        }
    }
}
