//! Game pipeline.
//!
//! [`GameState`] owns the world, the event scheduler and the arena phase and
//! runs one fixed-order tick per frame: due timers, locomotion, segment
//! placement, interaction resolution, then phase bookkeeping.

pub mod events;
pub mod interaction;
pub mod snapshot;

pub use events::{Consumed, Consumer, EventKey, Notification, ScheduledAction, TickReport};
pub use interaction::{Casualties, Clash, head_to_head};
pub use snapshot::{ActorKind, ActorView, ArenaSnapshot};

use crate::ai::{AutonomousPolicy, HopRules, PlayerPolicy, SnakeBrain};
use crate::config::{Config, SideConfig};
use crate::entity::{ChainId, Egg, EggId, EggState, Forager, ForagerId, Side, Snake, SnakeBody};
use crate::maze::{DoorEvent, Maze};
use crate::phase::ArenaPhase;
use crate::scheduler::EventScheduler;
use crate::world::World;
use level::{CellCoord, Color, Direction};
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use tracing::{debug, info};

const PLAYER_PALETTE: (Color, Color) = (Color::new(60, 220, 90), Color::new(20, 110, 50));
const ENEMY_PALETTE: (Color, Color) = (Color::new(230, 70, 60), Color::new(120, 30, 90));

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("level has no {0} landmark")]
    MissingLandmark(&'static str),
}

/// The running arena.
#[derive(Debug)]
pub struct GameState {
    config: Config,
    world: World,
    scheduler: EventScheduler<ScheduledAction, EventKey>,
    phase: ArenaPhase,
    notifications: Vec<Notification>,
    pub tick_count: u64,
}

impl GameState {
    /// Populate `maze` according to `config`.
    pub fn new(config: Config, maze: Maze) -> Result<Self, SetupError> {
        let landmarks = *maze.landmarks();
        let player_start = landmarks
            .player_start
            .or(landmarks.zone_center)
            .ok_or(SetupError::MissingLandmark("player start"))?;
        let enemy_start = landmarks.enemy_start;
        if enemy_start.is_none() && config.enemy.count > 0 {
            return Err(SetupError::MissingLandmark("enemy start"));
        }

        let rng = match config.arena.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let mut game = Self {
            scheduler: EventScheduler::new(config.arena.max_step),
            world: World::new(maze, rng),
            phase: ArenaPhase::Starting,
            notifications: Vec::new(),
            tick_count: 0,
            config,
        };

        game.schedule(game.config.arena.start_delay, ScheduledAction::BeginPlay);

        let length = game.config.player.initial_length;
        let player = game.build_snake(Side::Player, player_start, length);
        info!("Player spawned at ({}, {})", player_start.x, player_start.y);
        game.world.player = Some(player);

        if let Some(cell) = enemy_start {
            for _ in 0..game.config.enemy.count {
                let length = game.config.enemy.initial_length;
                game.spawn_enemy(cell, length);
            }
        }

        for _ in 0..game.config.forager.count {
            game.spawn_forager();
        }

        Ok(game)
    }

    #[inline]
    pub fn phase(&self) -> ArenaPhase {
        self.phase
    }

    /// Scheduler clock in seconds.
    #[inline]
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pause(&mut self) {
        self.scheduler.pause();
    }

    pub fn resume(&mut self) {
        self.scheduler.resume();
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.scheduler.is_paused()
    }

    /// Queue the player's turn at the next intersection.
    pub fn set_desired_direction(&mut self, direction: Direction) {
        if let Some(policy) = self
            .world
            .live_player_mut()
            .and_then(|p| p.brain.as_player_mut())
        {
            policy.set_desired(direction);
        }
    }

    /// Start the player moving right away.
    pub fn start_moving(&mut self, direction: Direction) -> bool {
        if self.phase == ArenaPhase::Finished {
            return false;
        }
        let phase = self.phase;
        let World { maze, player, .. } = &mut self.world;
        match player.as_mut().filter(|p| p.is_alive()) {
            Some(p) => p.start_moving(direction, maze, phase),
            None => false,
        }
    }

    pub fn snapshot(&self) -> ArenaSnapshot {
        ArenaSnapshot::capture(&self.world, self.scheduler.now(), self.phase)
    }

    /// Run one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> TickReport {
        self.tick_count += 1;
        let step = self.scheduler.advance(dt) as f32;

        while let Some(action) = self.scheduler.pop_due() {
            self.fire(action);
        }

        self.refresh_speeds();
        self.refresh_forager_senses();
        self.move_actors(step);
        self.place_actors();

        let casualties = interaction::resolve(&mut self.world, &mut self.notifications);
        self.bury(casualties);

        for event in self.world.maze.drain_door_events() {
            self.notifications.push(match event {
                DoorEvent::Opened(id) => Notification::DoorOpened(id),
                DoorEvent::Closed(id) => Notification::DoorClosed(id),
            });
        }

        self.update_phase();
        self.world.sweep();

        TickReport {
            time: self.scheduler.now(),
            phase: self.phase,
            notifications: std::mem::take(&mut self.notifications),
        }
    }

    fn schedule(&mut self, delay: f64, action: ScheduledAction) -> bool {
        let key = action.key();
        self.scheduler.register(delay, action, key)
    }

    fn side_config(&self, side: Side) -> &SideConfig {
        match side {
            Side::Player => &self.config.player,
            Side::Enemy => &self.config.enemy,
        }
    }

    fn build_snake(&mut self, side: Side, cell: CellCoord, length: usize) -> Snake {
        let side_config = self.side_config(side);
        let body = SnakeBody {
            head_extent: side_config.head_size,
            segment_extent: side_config.segment_size,
            palette: match side {
                Side::Player => PLAYER_PALETTE,
                Side::Enemy => ENEMY_PALETTE,
            },
        };
        let speed = self.config.chain_speed(side_config, length);
        let brain = match side {
            Side::Player => SnakeBrain::Player(PlayerPolicy::new()),
            Side::Enemy => SnakeBrain::Autonomous(AutonomousPolicy::new()),
        };
        let id = self.world.next_chain_id();
        Snake::spawn(
            id,
            side,
            &mut self.world.pool,
            cell,
            Direction::North,
            length,
            body,
            speed,
            brain,
        )
    }

    fn spawn_enemy(&mut self, cell: CellCoord, length: usize) -> ChainId {
        let snake = self.build_snake(Side::Enemy, cell, length);
        let id = snake.id;
        self.world.enemies.push(snake);
        if self.config.enemy.lays_eggs {
            self.schedule(
                self.config.egg.laying_initial_delay,
                ScheduledAction::LayEgg(id),
            );
        }
        info!("Enemy {} spawned at ({}, {})", id.get(), cell.x, cell.y);
        id
    }

    fn spawn_forager(&mut self) -> Option<ForagerId> {
        let Some(cell) = self.world.random_forager_cell() else {
            debug!("No free cell for a forager");
            return None;
        };
        let settings = &self.config.forager;
        let rules = HopRules {
            jump_distance: settings.jump_distance,
            threat_distance: settings.threat_distance,
        };
        let speed = settings.jump_speed * self.config.level_speed_factor();
        let (delay, size) = (settings.jump_delay, settings.size);
        let id = self.world.next_forager_id();
        self.world
            .foragers
            .push(Forager::new(id, cell, rules, speed, delay, size));
        self.notifications
            .push(Notification::ForagerSpawned { forager: id, cell });
        info!("Forager {} spawned at ({}, {})", id.get(), cell.x, cell.y);
        Some(id)
    }

    fn set_phase(&mut self, to: ArenaPhase) {
        if self.phase == to {
            return;
        }
        let from = self.phase;
        self.phase = to;
        info!("Phase {:?} -> {:?}", from, to);
        self.notifications.push(Notification::PhaseChanged { from, to });
    }

    fn fire(&mut self, action: ScheduledAction) {
        debug!("Timer fired: {:?} at {:.2}s", action, self.scheduler.now());
        match action {
            ScheduledAction::BeginPlay => {
                if self.phase == ArenaPhase::Starting {
                    self.set_phase(ArenaPhase::Playing);
                }
            }
            ScheduledAction::LayEgg(chain) => self.lay_egg(chain),
            ScheduledAction::EggGrown(egg) => self.egg_grown(egg),
            ScheduledAction::EggHatch(egg) => self.hatch(egg),
            ScheduledAction::RespawnForager => {
                if self.phase != ArenaPhase::Finished {
                    self.spawn_forager();
                }
            }
        }
    }

    fn lay_egg(&mut self, chain: ChainId) {
        let Some(snake) = self.world.snake(chain).filter(|s| s.is_alive()) else {
            return;
        };
        let side = snake.side();
        let ready = self.phase == ArenaPhase::Playing
            && snake.len() >= self.config.egg.min_chain_length
            && snake.chain().egg(&self.world.pool).is_none();
        if !ready {
            self.schedule(self.config.egg.laying_retry_delay, ScheduledAction::LayEgg(chain));
            return;
        }

        let tail = snake.chain().tail();
        let position = self
            .world
            .pool
            .get(tail)
            .map_or(snake.head_position(), |s| s.position);
        let id = self.world.next_egg_id();
        let World { pool, player, enemies, eggs, .. } = &mut self.world;
        let attached = player
            .iter()
            .chain(enemies.iter())
            .find(|s| s.id == chain)
            .is_some_and(|s| s.chain().attach_egg(pool, id));
        if !attached {
            return;
        }
        eggs.push(Egg::carried(id, side, chain, position, self.config.egg.size));
        self.notifications.push(Notification::EggLaid { egg: id, chain });
        self.schedule(self.config.egg.growth_duration, ScheduledAction::EggGrown(id));
        debug!("Chain {} laid egg {}", chain.get(), id.get());
    }

    fn egg_grown(&mut self, id: EggId) {
        let Some(egg) = self.world.egg(id) else {
            return;
        };
        let (parent, carrier, mut position) = (egg.parent(), egg.carrier(), egg.position);

        if let Some(carrier) = carrier {
            let World { pool, player, enemies, .. } = &mut self.world;
            if let Some(snake) = player.iter().chain(enemies.iter()).find(|s| s.id == carrier) {
                if snake.chain().egg(pool) == Some(id) {
                    snake.chain().detach_egg(pool);
                }
                if let Some(tail) = pool.get(snake.chain().tail()) {
                    position = tail.position;
                }
            }
        }

        let Some(egg) = self.world.egg_mut(id) else {
            return;
        };
        egg.finish_growing(position);
        let (cell, side) = (egg.cell(), egg.side());
        self.notifications.push(Notification::EggGrown { egg: id, cell });
        self.schedule(self.config.egg.hatch_duration, ScheduledAction::EggHatch(id));

        if self.side_config(side).lays_eggs
            && self.world.snake(parent).is_some_and(|s| s.is_alive())
        {
            self.schedule(self.config.egg.laying_delay, ScheduledAction::LayEgg(parent));
        }
    }

    /// Hatched chains are autonomous whatever side laid them.
    fn hatch(&mut self, id: EggId) {
        let Some(egg) = self.world.egg_mut(id).filter(|e| e.state() == EggState::Grown) else {
            return;
        };
        egg.kill();
        let cell = egg.cell();
        let chain = self.spawn_enemy(cell, self.config.egg.hatch_length);
        self.notifications
            .push(Notification::EggHatched { egg: id, chain, cell });
    }

    fn refresh_speeds(&mut self) {
        let config = &self.config;
        for snake in self.world.snakes_mut().filter(|s| s.is_alive()) {
            let side = match snake.side() {
                Side::Player => &config.player,
                Side::Enemy => &config.enemy,
            };
            snake.mover.set_speed(config.chain_speed(side, snake.len()));
        }
    }

    fn refresh_forager_senses(&mut self) {
        let heads = self.world.head_cells();
        let targets: Vec<Option<CellCoord>> = self
            .world
            .foragers
            .iter()
            .map(|f| self.world.nearest_egg(f.mover.cell()))
            .collect();
        for (forager, target) in self.world.foragers.iter_mut().zip(targets) {
            forager.policy.set_target(target);
            forager.policy.set_threats(heads.iter().copied());
        }
    }

    fn move_actors(&mut self, dt: f32) {
        let phase = self.phase;
        if phase == ArenaPhase::Finished {
            return;
        }
        let World {
            maze,
            player,
            enemies,
            foragers,
            rng,
            ..
        } = &mut self.world;

        if let Some(p) = player.as_mut().filter(|p| p.is_alive()) {
            if phase == ArenaPhase::Returning && !p.mover.is_moving() {
                p.resume(maze, phase, rng);
            }
            p.advance(dt, maze, phase, rng);
        }

        if !matches!(phase, ArenaPhase::Playing | ArenaPhase::Returning) {
            return;
        }
        for enemy in enemies.iter_mut().filter(|s| s.is_alive()) {
            if !enemy.mover.is_moving() {
                enemy.resume(maze, phase, rng);
            }
            enemy.advance(dt, maze, phase, rng);
        }
        for forager in foragers.iter_mut() {
            forager.advance(dt, maze, phase, rng);
        }
    }

    /// Lay every body on its trail and move carried eggs with their tails.
    fn place_actors(&mut self) {
        let World {
            pool,
            player,
            enemies,
            eggs,
            ..
        } = &mut self.world;
        for snake in player.iter_mut().chain(enemies.iter_mut()) {
            if snake.is_alive() {
                snake.place_segments(pool);
            }
        }
        for egg in eggs
            .iter_mut()
            .filter(|e| e.is_alive() && e.state() == EggState::Carried)
        {
            let tail = egg.carrier().and_then(|carrier| {
                player
                    .iter()
                    .chain(enemies.iter())
                    .find(|s| s.id == carrier)
                    .and_then(|s| pool.get(s.chain().tail()))
            });
            if let Some(tail) = tail {
                egg.position = tail.position;
            }
        }
    }

    fn bury(&mut self, casualties: Casualties) {
        for egg in casualties.eggs {
            self.scheduler.cancel(&EventKey::EggGrown(egg));
            self.scheduler.cancel(&EventKey::EggHatch(egg));
        }
        for forager in casualties.foragers {
            debug!("Forager {} will respawn", forager.get());
            self.scheduler
                .register(self.config.forager.respawn_delay, ScheduledAction::RespawnForager, None);
        }
        for (chain, side) in casualties.chains {
            self.scheduler.cancel(&EventKey::LayEgg(chain));
            info!("Chain {} ({:?}) died", chain.get(), side);
        }
    }

    fn update_phase(&mut self) {
        if self.phase == ArenaPhase::Finished {
            return;
        }
        if self.world.player.as_ref().is_some_and(|p| !p.is_alive()) {
            self.set_phase(ArenaPhase::Finished);
            return;
        }

        match self.phase {
            ArenaPhase::Playing if self.world.enemy_presence() == 0 => {
                info!("Level clear");
                self.set_phase(ArenaPhase::Returning);
                let marks = *self.world.maze.landmarks();
                let route: Vec<CellCoord> = [marks.zone_entrance, marks.zone_center, marks.zone_exit]
                    .into_iter()
                    .flatten()
                    .collect();
                let empty = route.is_empty();
                if let Some(policy) = self
                    .world
                    .live_player_mut()
                    .and_then(|p| p.brain.as_player_mut())
                {
                    policy.begin_route(route);
                }
                if empty {
                    self.finish_return();
                }
            }
            ArenaPhase::Returning => {
                let returned = self
                    .world
                    .live_player()
                    .and_then(|p| p.brain.as_player())
                    .is_some_and(|p| p.has_returned());
                if returned {
                    self.finish_return();
                }
            }
            _ => {}
        }
    }

    fn finish_return(&mut self) {
        self.notifications.push(Notification::PlayerReturned);
        self.set_phase(ArenaPhase::Finished);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use level::LevelDocument;

    const LEVEL_ONE: &str = include_str!("../../../../levels/level1.json");

    /// 9×5 enclosed maze split by a wall east of column 1: the player sits
    /// at (0, 3) in the west strip, enemies start at (5, 2).
    fn split_maze() -> Maze {
        let mut maze = Maze::new(9, 5);
        maze.enclose();
        for y in 0..5 {
            maze.set_wall(CellCoord::new(1, y), Direction::East);
        }
        let marks = maze.landmarks_mut();
        marks.player_start = Some(CellCoord::new(0, 3));
        marks.enemy_start = Some(CellCoord::new(5, 2));
        maze
    }

    fn quiet_config() -> Config {
        let mut config = Config::default();
        config.arena.seed = Some(11);
        config.arena.start_delay = 0.0;
        config.enemy.count = 1;
        config.enemy.lays_eggs = false;
        config.forager.count = 0;
        config
    }

    #[test]
    fn test_missing_player_start() {
        let maze = Maze::new(4, 4);
        let err = GameState::new(quiet_config(), maze).unwrap_err();
        assert!(matches!(err, SetupError::MissingLandmark("player start")));
    }

    #[test]
    fn test_begin_play_after_start_delay() {
        let mut config = quiet_config();
        config.arena.start_delay = 0.5;
        let mut game = GameState::new(config, split_maze()).unwrap();
        assert_eq!(game.tick(0.25).phase, ArenaPhase::Starting);
        let report = game.tick(0.25);
        assert_eq!(report.phase, ArenaPhase::Playing);
        assert!(report.notifications.contains(&Notification::PhaseChanged {
            from: ArenaPhase::Starting,
            to: ArenaPhase::Playing,
        }));
    }

    #[test]
    fn test_egg_grows_once_after_growth_duration() {
        let mut config = quiet_config();
        config.enemy.lays_eggs = true;
        config.egg.laying_initial_delay = 0.0;
        config.egg.growth_duration = 2.0;
        config.egg.hatch_duration = 100.0;
        let mut game = GameState::new(config, split_maze()).unwrap();

        let first = game.tick(0.0);
        assert_eq!(first.count(|n| matches!(n, Notification::EggLaid { .. })), 1);
        assert_eq!(game.world().eggs[0].state(), EggState::Carried);

        let mut grown_at = Vec::new();
        for _ in 0..12 {
            let report = game.tick(0.25);
            for _ in 0..report.count(|n| matches!(n, Notification::EggGrown { .. })) {
                grown_at.push(report.time);
            }
        }
        assert_eq!(grown_at, vec![2.0]);
        let egg = &game.world().eggs[0];
        assert_eq!(egg.state(), EggState::Grown);
        assert!(egg.on_map());
        assert_eq!(game.phase(), ArenaPhase::Playing);
    }

    #[test]
    fn test_player_eats_forager_and_it_respawns() {
        let mut config = quiet_config();
        config.forager.respawn_delay = 1.0;
        let mut game = GameState::new(config, split_maze()).unwrap();
        let id = game.world.next_forager_id();
        game.world.foragers.push(Forager::new(
            id,
            CellCoord::new(0, 3),
            HopRules::default(),
            4.0,
            5.0,
            0.6,
        ));

        let report = game.tick(0.0);
        assert!(report.notifications.iter().any(|n| matches!(
            n,
            Notification::ActorConsumed {
                target: Consumed::Forager(f),
                scored: true,
                ..
            } if *f == id
        )));
        assert_eq!(game.world().live_player().unwrap().len(), 4);
        assert!(game.world().foragers.is_empty());

        let mut spawned = 0;
        for _ in 0..4 {
            let report = game.tick(0.25);
            spawned += report.count(|n| matches!(n, Notification::ForagerSpawned { .. }));
        }
        assert_eq!(spawned, 1);
        assert_eq!(game.world().foragers.len(), 1);
    }

    #[test]
    fn test_level_clear_routes_player_home() {
        let mut maze = Maze::new(5, 5);
        maze.enclose();
        let marks = maze.landmarks_mut();
        marks.player_start = Some(CellCoord::new(1, 1));
        marks.zone_entrance = Some(CellCoord::new(1, 2));
        marks.zone_center = Some(CellCoord::new(2, 2));
        marks.zone_exit = Some(CellCoord::new(3, 2));
        let mut config = quiet_config();
        config.enemy.count = 0;
        let mut game = GameState::new(config, maze).unwrap();

        assert_eq!(game.tick(0.0).phase, ArenaPhase::Returning);
        let mut returned = 0;
        for _ in 0..100 {
            let report = game.tick(0.1);
            returned += report.count(|n| *n == Notification::PlayerReturned);
            if report.phase == ArenaPhase::Finished {
                break;
            }
        }
        assert_eq!(returned, 1);
        assert_eq!(game.phase(), ArenaPhase::Finished);
        let player = game.world().live_player().unwrap();
        assert_eq!(player.mover.cell(), CellCoord::new(3, 2));
    }

    #[test]
    fn test_shipped_level_returns_home() {
        let document = LevelDocument::from_json(LEVEL_ONE).unwrap();
        // The default start is inside the zone; (5, 1) is just below it, with
        // the zone's south wall between the player and the entrance.
        for start in [None, Some(CellCoord::new(5, 1))] {
            for seed in [5, 19, 26, 31] {
                let mut maze = Maze::from_level(&document).unwrap();
                if start.is_some() {
                    maze.landmarks_mut().player_start = start;
                }
                let exit = maze.landmarks().zone_exit;
                let mut config = quiet_config();
                config.arena.seed = Some(seed);
                config.enemy.count = 0;
                let mut game = GameState::new(config, maze).unwrap();

                assert_eq!(game.tick(0.0).phase, ArenaPhase::Returning);
                for _ in 0..3000 {
                    if game.tick(1.0 / 30.0).phase == ArenaPhase::Finished {
                        break;
                    }
                }
                assert_eq!(game.phase(), ArenaPhase::Finished, "seed {} from {:?}", seed, start);
                let player = game.world().live_player().unwrap();
                assert_eq!(Some(player.mover.cell()), exit);
            }
        }
    }

    #[test]
    fn test_player_death_finishes() {
        let mut maze = Maze::new(5, 5);
        maze.enclose();
        let marks = maze.landmarks_mut();
        marks.player_start = Some(CellCoord::new(2, 2));
        marks.enemy_start = Some(CellCoord::new(2, 2));
        let mut game = GameState::new(quiet_config(), maze).unwrap();

        let report = game.tick(0.0);
        assert_eq!(report.phase, ArenaPhase::Finished);
        assert!(report.notifications.iter().any(|n| matches!(
            n,
            Notification::ChainDied {
                side: Side::Player,
                ..
            }
        )));
        assert!(game.world().live_player().is_none());
        assert!(!game.start_moving(Direction::North));
    }

    #[test]
    fn test_snapshot_lists_every_actor() {
        let mut game = GameState::new(quiet_config(), split_maze()).unwrap();
        game.tick(0.0);
        let snapshot = game.snapshot();
        assert_eq!(snapshot.count(ActorKind::Head), 2);
        assert_eq!(snapshot.count(ActorKind::Segment), 4);
        assert_eq!(snapshot.count(ActorKind::Forager), 0);
        assert!(snapshot.actors.iter().all(|a| a.visible));
    }

    #[test]
    fn test_pause_freezes_clock() {
        let mut game = GameState::new(quiet_config(), split_maze()).unwrap();
        game.tick(0.1);
        game.pause();
        assert!(game.is_paused());
        assert_eq!(game.tick(0.1).time, game.now());
        let before = game.now();
        game.tick(0.2);
        assert_eq!(game.now(), before);
        game.resume();
        game.tick(0.2);
        assert!(game.now() > before);
    }
}
