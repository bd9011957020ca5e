//! World state.
//!
//! Owns the maze, the segment pool and every live entity.

use crate::ai::is_legal_landing;
use crate::entity::{ChainId, Egg, EggId, Forager, ForagerId, SegmentPool, Side, Snake};
use crate::maze::Maze;
use level::CellCoord;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

#[derive(Debug)]
pub struct World {
    pub maze: Maze,
    pub pool: SegmentPool,
    /// The player's snake; kept after death until the arena is reset.
    pub player: Option<Snake>,
    /// Autonomous chains, in spawn order.
    pub enemies: Vec<Snake>,
    pub eggs: Vec<Egg>,
    pub foragers: Vec<Forager>,
    pub rng: StdRng,

    next_chain_id: u32,
    next_egg_id: u32,
    next_forager_id: u32,
}

impl World {
    pub fn new(maze: Maze, rng: StdRng) -> Self {
        Self {
            maze,
            pool: SegmentPool::with_capacity(64),
            player: None,
            enemies: Vec::new(),
            eggs: Vec::new(),
            foragers: Vec::new(),
            rng,
            next_chain_id: 1,
            next_egg_id: 1,
            next_forager_id: 1,
        }
    }

    pub fn next_chain_id(&mut self) -> ChainId {
        let id = ChainId::new(self.next_chain_id);
        self.next_chain_id += 1;
        id
    }

    pub fn next_egg_id(&mut self) -> EggId {
        let id = EggId::new(self.next_egg_id);
        self.next_egg_id += 1;
        id
    }

    pub fn next_forager_id(&mut self) -> ForagerId {
        let id = ForagerId::new(self.next_forager_id);
        self.next_forager_id += 1;
        id
    }

    /// Live player snake.
    pub fn live_player(&self) -> Option<&Snake> {
        self.player.as_ref().filter(|p| p.is_alive())
    }

    pub fn live_player_mut(&mut self) -> Option<&mut Snake> {
        self.player.as_mut().filter(|p| p.is_alive())
    }

    /// Every snake, the player first.
    pub fn snakes(&self) -> impl Iterator<Item = &Snake> {
        self.player.iter().chain(self.enemies.iter())
    }

    pub fn snakes_mut(&mut self) -> impl Iterator<Item = &mut Snake> {
        self.player.iter_mut().chain(self.enemies.iter_mut())
    }

    pub fn snake(&self, id: ChainId) -> Option<&Snake> {
        self.snakes().find(|s| s.id == id)
    }

    pub fn egg(&self, id: EggId) -> Option<&Egg> {
        self.eggs.iter().find(|e| e.id == id && e.is_alive())
    }

    pub fn egg_mut(&mut self, id: EggId) -> Option<&mut Egg> {
        self.eggs.iter_mut().find(|e| e.id == id && e.is_alive())
    }

    /// Live enemy chains plus live enemy eggs.
    pub fn enemy_presence(&self) -> usize {
        let chains = self.enemies.iter().filter(|s| s.is_alive()).count();
        let eggs = self
            .eggs
            .iter()
            .filter(|e| e.is_alive() && e.side() == Side::Enemy)
            .count();
        chains + eggs
    }

    /// Nearest egg lying on the map.
    pub fn nearest_egg(&self, cell: CellCoord) -> Option<CellCoord> {
        self.eggs
            .iter()
            .filter(|e| e.on_map())
            .map(|e| e.cell())
            .min_by(|a, b| a.distance(cell).total_cmp(&b.distance(cell)))
    }

    /// Cells under live snake heads.
    pub fn head_cells(&self) -> Vec<CellCoord> {
        self.snakes()
            .filter(|s| s.is_alive())
            .map(|s| CellCoord::from_position(s.head_position()))
            .collect()
    }

    /// Random cell a forager may stand on, away from live heads when possible.
    pub fn random_forager_cell(&mut self) -> Option<CellCoord> {
        let heads = self.head_cells();
        let legal: Vec<CellCoord> = self
            .maze
            .cells()
            .map(|c| c.coord)
            .filter(|&c| is_legal_landing(&self.maze, c))
            .collect();
        let clear: Vec<CellCoord> = legal
            .iter()
            .copied()
            .filter(|c| heads.iter().all(|h| h.distance(*c) > 2.0))
            .collect();
        let pool = if clear.is_empty() { &legal } else { &clear };
        pool.choose(&mut self.rng).copied()
    }

    /// Drop dead eggs and foragers.
    pub fn sweep(&mut self) {
        self.eggs.retain(|e| e.is_alive());
        self.foragers.retain(|f| f.is_alive());
        self.enemies.retain(|s| s.is_alive());
    }
}
