//! Headless arena runner.

use arena::game::Notification;
use arena::{ArenaPhase, Config, GameState, Maze, TickReport};
use futures_util::FutureExt;
use level::{Direction, LevelDocument};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Maze arena v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load("config.toml")?;
    info!("Loaded configuration");
    info!("  Level: {} ({})", config.arena.level, config.arena.level_path);
    info!("  Tick interval: {}ms", config.arena.tick_interval_ms);

    let document = LevelDocument::from_path(&config.arena.level_path)?;
    let maze = Maze::from_level(&document)?;
    info!("Maze loaded: {}x{}", maze.width(), maze.height());

    let tick_interval_ms = config.arena.tick_interval_ms.max(1);
    let max_ticks = config.arena.max_ticks;
    let game = GameState::new(config, maze)?;

    let (report_tx, report_rx) = broadcast::channel(256);
    let logger = tokio::spawn(log_reports(report_rx));

    run(game, tick_interval_ms, max_ticks, report_tx).await;
    logger.await?;
    Ok(())
}

/// Drive the arena at a fixed rate until it finishes or `max_ticks` is hit.
async fn run(
    mut game: GameState,
    tick_interval_ms: u64,
    max_ticks: u64,
    report_tx: broadcast::Sender<TickReport>,
) {
    let period = Duration::from_millis(tick_interval_ms);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = Instant::now();
    let mut pilot = rand::rng();

    loop {
        let scheduled = ticker.tick().await;

        let mut skipped = 0u32;
        while ticker.tick().now_or_never().is_some() {
            skipped += 1;
        }
        if skipped > 0 {
            debug!(
                "Skipped {} ticks to stay current (lag: {:?})",
                skipped,
                Instant::now().saturating_duration_since(scheduled)
            );
        }

        steer(&mut game, &mut pilot);

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f64();
        last = now;

        let tick_start = std::time::Instant::now();
        let report = game.tick(dt);
        let tick_ms = tick_start.elapsed().as_secs_f64() * 1000.0;
        if tick_ms > tick_interval_ms as f64 * 0.9 {
            warn!("Slow tick #{}: {:.3}ms", game.tick_count, tick_ms);
        }

        let finished = report.phase == ArenaPhase::Finished;
        // No receivers only means the logger has gone away.
        let _ = report_tx.send(report);

        if finished {
            info!("Arena finished after {} ticks ({:.1}s)", game.tick_count, game.now());
            break;
        }
        if max_ticks > 0 && game.tick_count >= max_ticks {
            info!("Stopping after {} ticks", game.tick_count);
            break;
        }
    }
}

/// Stand-in for input: keep the player moving and turn now and then.
fn steer(game: &mut GameState, pilot: &mut impl Rng) {
    if game.phase() != ArenaPhase::Playing {
        return;
    }
    let Some(player) = game.world().live_player() else {
        return;
    };
    let idle = !player.mover.is_moving();
    let cell = player.mover.cell();
    let open: Vec<Direction> = game
        .world()
        .maze
        .unblocked_directions(cell, game.phase())
        .collect();

    if idle {
        if let Some(&direction) = open.choose(pilot) {
            game.set_desired_direction(direction);
            game.start_moving(direction);
        }
    } else if pilot.random_bool(0.02) {
        if let Some(&direction) = Direction::CARDINALS.choose(pilot) {
            game.set_desired_direction(direction);
        }
    }
}

async fn log_reports(mut rx: broadcast::Receiver<TickReport>) {
    let mut score = 0u32;
    loop {
        let report = match rx.recv().await {
            Ok(report) => report,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("Report logger lagged by {} ticks", n);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        for note in &report.notifications {
            match note {
                Notification::SegmentEaten { eater, .. } if eater.is_player() => score += 1,
                Notification::ActorConsumed { scored: true, .. } => score += 5,
                Notification::PhaseChanged { from, to } => {
                    info!("[{:.2}s] phase {:?} -> {:?}", report.time, from, to)
                }
                Notification::ChainDied { chain, side } => {
                    info!("[{:.2}s] chain {} ({:?}) died", report.time, chain.get(), side)
                }
                Notification::EggHatched { cell, .. } => {
                    info!("[{:.2}s] egg hatched at ({}, {})", report.time, cell.x, cell.y)
                }
                Notification::PlayerReturned => info!("[{:.2}s] player returned", report.time),
                other => debug!("[{:.2}s] {:?}", report.time, other),
            }
        }
    }
    info!("Final score: {}", score);
}
