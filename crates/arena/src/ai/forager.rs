use super::{Arrival, Decision, DirectionPolicy, PolicyContext};
use crate::maze::Maze;
use level::{CellCoord, Direction};
use rand::Rng;
use rand::seq::IndexedRandom;

/// Tuning for the hopping forager.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HopRules {
    /// Extra cells covered by a long jump beyond the single step.
    pub jump_distance: i32,
    /// A snake head within this many cells makes the forager flee at random.
    pub threat_distance: f32,
}

impl Default for HopRules {
    fn default() -> Self {
        Self {
            jump_distance: 2,
            threat_distance: 3.0,
        }
    }
}

/// Foragers ignore walls but never leave the map or enter the start zone.
#[inline]
pub fn is_legal_landing(maze: &Maze, cell: CellCoord) -> bool {
    maze.contains(cell) && !maze.in_start_zone(cell)
}

/// Stretch a single step `(dx, dy)` from `from` by `jump` further cells.
///
/// Falls back to the single step when any cell along the jump is illegal or
/// the jump would pass `limit` on an axis it moves along.
pub fn extend_with_long_jump(
    maze: &Maze,
    from: CellCoord,
    (dx, dy): (i32, i32),
    jump: i32,
    limit: Option<CellCoord>,
) -> CellCoord {
    let single = from.offset(dx, dy);
    if jump <= 0 {
        return single;
    }
    if !(1..=jump).all(|k| is_legal_landing(maze, single.offset(dx * k, dy * k))) {
        return single;
    }
    let landing = single.offset(dx * jump, dy * jump);
    if let Some(target) = limit {
        let overshoots_x = dx != 0 && (target.x - landing.x) * dx < 0;
        let overshoots_y = dy != 0 && (target.y - landing.y) * dy < 0;
        if overshoots_x || overshoots_y {
            return single;
        }
    }
    landing
}

/// Hops towards the nearest egg, or anywhere when threatened.
#[derive(Debug, Clone, Default)]
pub struct ForagerPolicy {
    rules: HopRules,
    target: Option<CellCoord>,
    threats: Vec<CellCoord>,
}

impl ForagerPolicy {
    pub fn new(rules: HopRules) -> Self {
        Self {
            rules,
            target: None,
            threats: Vec::new(),
        }
    }

    #[inline]
    pub fn rules(&self) -> HopRules {
        self.rules
    }

    pub fn set_target(&mut self, target: Option<CellCoord>) {
        self.target = target;
    }

    /// Replace the cells of nearby snake heads.
    pub fn set_threats(&mut self, threats: impl IntoIterator<Item = CellCoord>) {
        self.threats.clear();
        self.threats.extend(threats);
    }

    fn threatened(&self, cell: CellCoord) -> bool {
        self.threats
            .iter()
            .any(|t| t.distance(cell) <= self.rules.threat_distance)
    }

    /// Landing cell of the next hop from `cell`, if any move is possible.
    pub fn plan_hop<R: Rng + ?Sized>(&self, cell: CellCoord, maze: &Maze, rng: &mut R) -> Option<CellCoord> {
        let jump = self.rules.jump_distance;

        if let Some(target) = self.target.filter(|_| !self.threatened(cell)) {
            let step = ((target.x - cell.x).signum(), (target.y - cell.y).signum());
            if step != (0, 0) && is_legal_landing(maze, cell.offset(step.0, step.1)) {
                return Some(extend_with_long_jump(maze, cell, step, jump, Some(target)));
            }
        }

        let options: Vec<Direction> = Direction::CARDINALS
            .into_iter()
            .filter(|&d| is_legal_landing(maze, cell.neighbor(d)))
            .collect();
        let direction = options.choose(rng)?;
        Some(extend_with_long_jump(maze, cell, direction.offset(), jump, None))
    }
}

impl DirectionPolicy for ForagerPolicy {
    fn next_direction(&mut self, arrival: &Arrival, ctx: &mut PolicyContext<'_>) -> Decision {
        // Rest after every landing; the owner resumes it once the rest is over.
        if !arrival.resumed {
            return Decision::Stop;
        }
        self.plan_hop(arrival.cell, ctx.maze, &mut *ctx.rng)
            .map_or(Decision::Stop, Decision::Hop)
    }
}
