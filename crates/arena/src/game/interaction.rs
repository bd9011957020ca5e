//! Pairwise interaction resolution.
//!
//! Runs once per tick after every actor has moved. Pass order: enemy chains
//! against the player, the player against foragers, the player against enemy
//! eggs, then foragers against all eggs.

use super::events::{Consumed, Consumer, Notification};
use crate::collision::overlaps;
use crate::entity::{
    ChainId, Egg, EggId, Forager, ForagerId, SegmentId, SegmentPool, Side, Snake, ThreatLevel,
};
use crate::maze::Maze;
use crate::world::World;
use fixedbitset::FixedBitSet;
use glam::Vec2;
use std::cmp::Ordering;
use tracing::debug;

/// Outcome of two heads meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clash {
    FirstWins,
    SecondWins,
}

/// Decide a head-to-head meeting between two chains given as `(length, side)`.
///
/// The longer chain wins. On a tie the player side loses; between two
/// non-player chains the first one evaluated wins.
pub fn head_to_head(first: (usize, Side), second: (usize, Side)) -> Clash {
    match first.0.cmp(&second.0) {
        Ordering::Greater => Clash::FirstWins,
        Ordering::Less => Clash::SecondWins,
        Ordering::Equal if first.1.is_player() && !second.1.is_player() => Clash::SecondWins,
        Ordering::Equal => Clash::FirstWins,
    }
}

/// Entities removed during a pass.
#[derive(Debug, Default)]
pub struct Casualties {
    pub chains: Vec<(ChainId, Side)>,
    pub eggs: Vec<EggId>,
    pub foragers: Vec<ForagerId>,
}

/// Resolve every interaction for this tick.
pub fn resolve(world: &mut World, notes: &mut Vec<Notification>) -> Casualties {
    let World {
        maze,
        pool,
        player,
        enemies,
        eggs,
        foragers,
        ..
    } = world;
    let mut casualties = Casualties::default();

    for snake in player.iter_mut().chain(enemies.iter_mut()) {
        snake.threat = ThreatLevel::None;
    }

    if let Some(p) = player.as_mut().filter(|p| p.is_alive()) {
        // Enemies that die are removed in place; the index only advances
        // past survivors so the next chain is never skipped.
        let mut i = 0;
        while i < enemies.len() {
            clash_chains(&mut enemies[i], p, pool, maze, eggs, notes);
            if !enemies[i].is_alive() {
                let dead = enemies.remove(i);
                casualties.chains.push((dead.id, dead.side()));
                continue;
            }
            if !p.is_alive() {
                break;
            }
            i += 1;
        }
        if !p.is_alive() {
            casualties.chains.push((p.id, p.side()));
        }
    }

    if let Some(p) = player.as_mut().filter(|p| p.is_alive()) {
        for forager in foragers.iter_mut().filter(|f| f.is_alive()) {
            if head_touches(p, pool, forager.position(), forager.radius()) {
                let id = forager.id;
                let position = forager.position();
                forager.kill(maze);
                consume(p, pool, Consumed::Forager(id), position, notes);
                casualties.foragers.push(id);
            }
        }

        let side = p.side();
        for egg in eggs.iter_mut().filter(|e| e.on_map() && e.side() != side) {
            if head_touches(p, pool, egg.position, egg.radius()) {
                egg.kill();
                consume(p, pool, Consumed::Egg(egg.id), egg.position, notes);
                casualties.eggs.push(egg.id);
            }
        }
    }

    casualties.eggs.extend(foragers_eat_eggs(foragers, eggs, notes));
    casualties
}

fn head_touches(snake: &Snake, pool: &SegmentPool, position: Vec2, radius: f32) -> bool {
    overlaps(snake.head_position(), snake.head_radius(pool), position, radius)
}

/// First body segment of `victim` under `biter`'s head.
fn bitten_segment(biter: &Snake, victim: &Snake, pool: &SegmentPool) -> Option<SegmentId> {
    let head = biter.head_position();
    let radius = biter.head_radius(pool);
    victim
        .chain()
        .iter(pool)
        .skip(1)
        .find(|(_, s)| overlaps(head, radius, s.position, s.radius()))
        .map(|(id, _)| id)
}

/// Resolve one pair of chains, `first` being evaluated first.
pub(crate) fn clash_chains(
    first: &mut Snake,
    second: &mut Snake,
    pool: &mut SegmentPool,
    maze: &mut Maze,
    eggs: &mut [Egg],
    notes: &mut Vec<Notification>,
) {
    if !first.is_alive() || !second.is_alive() {
        return;
    }

    let first_radius = first.head_radius(pool);
    if overlaps(
        first.head_position(),
        first_radius,
        second.head_position(),
        second.head_radius(pool),
    ) {
        let (winner, loser) = match head_to_head((first.len(), first.side()), (second.len(), second.side())) {
            Clash::FirstWins => (first, second),
            Clash::SecondWins => (second, first),
        };
        debug!(
            "Chain {} ({}) beats chain {} ({}) head to head",
            winner.id.get(),
            winner.len(),
            loser.id.get(),
            loser.len()
        );
        let head = loser.chain().head();
        sever(loser, head, winner.side(), pool, maze, eggs, notes);
        winner.grow(pool);
        winner.raise_threat(ThreatLevel::KilledSomething);
        notes.push(Notification::ChainGrown {
            chain: winner.id,
            side: winner.side(),
            length: winner.len(),
        });
        return;
    }

    if let Some(target) = bitten_segment(first, second, pool) {
        debug!("Chain {} bites chain {}", first.id.get(), second.id.get());
        sever(second, target, first.side(), pool, maze, eggs, notes);
        first.raise_threat(ThreatLevel::KilledSomething);
    }
    if !second.is_alive() {
        return;
    }
    if let Some(target) = bitten_segment(second, first, pool) {
        debug!("Chain {} bites chain {}", second.id.get(), first.id.get());
        sever(first, target, second.side(), pool, maze, eggs, notes);
        second.raise_threat(ThreatLevel::KilledSomething);
    }
}

/// Cut `snake` at `target`. A cut at the head or its neighbor takes the
/// whole chain. Eggs on lost segments fall to the map.
fn sever(
    snake: &mut Snake,
    target: SegmentId,
    eater: Side,
    pool: &mut SegmentPool,
    maze: &mut Maze,
    eggs: &mut [Egg],
    notes: &mut Vec<Notification>,
) {
    let chain = snake.id;
    let side = snake.side();
    let mut dropped = Vec::new();
    let mut on_lost = |lost: crate::entity::LostSegment| {
        notes.push(Notification::SegmentEaten {
            chain,
            side,
            eater,
            position: lost.position,
        });
        if let Some(egg) = lost.egg {
            dropped.push((egg, lost.position));
        }
    };

    let outcome = snake.chain_mut().sever_at(pool, target, &mut on_lost);
    if outcome.chain_dead() {
        let head = snake.chain().head();
        if !snake.is_empty() {
            snake.chain_mut().sever_at(pool, head, &mut on_lost);
        }
        snake.die(maze);
        notes.push(Notification::ChainDied { chain, side });
    }

    for (id, position) in dropped {
        if let Some(egg) = eggs.iter_mut().find(|e| e.id == id && e.is_alive()) {
            egg.drop_at(position);
        }
    }
}

fn consume(
    snake: &mut Snake,
    pool: &mut SegmentPool,
    target: Consumed,
    position: Vec2,
    notes: &mut Vec<Notification>,
) {
    let side = snake.side();
    debug!("Chain {} eats {:?}", snake.id.get(), target);
    notes.push(Notification::ActorConsumed {
        by: Consumer::Chain {
            chain: snake.id,
            side,
        },
        target,
        position,
        scored: side.is_player(),
    });
    snake.grow(pool);
    snake.raise_threat(ThreatLevel::KilledSomething);
    notes.push(Notification::ChainGrown {
        chain: snake.id,
        side,
        length: snake.len(),
    });
}

/// Every on-map egg touched by a live forager dies.
fn foragers_eat_eggs(foragers: &[Forager], eggs: &mut [Egg], notes: &mut Vec<Notification>) -> Vec<EggId> {
    let mut eaten = FixedBitSet::with_capacity(eggs.len());
    let mut eaters = Vec::new();
    for forager in foragers.iter().filter(|f| f.is_alive()) {
        for (index, egg) in eggs.iter().enumerate() {
            if egg.on_map()
                && !eaten.contains(index)
                && overlaps(forager.position(), forager.radius(), egg.position, egg.radius())
            {
                eaten.insert(index);
                eaters.push((index, forager.id));
            }
        }
    }

    let mut killed = Vec::with_capacity(eaters.len());
    for (index, forager) in eaters {
        let egg = &mut eggs[index];
        egg.kill();
        debug!("Forager {} eats egg {}", forager.get(), egg.id.get());
        notes.push(Notification::ActorConsumed {
            by: Consumer::Forager(forager),
            target: Consumed::Egg(egg.id),
            position: egg.position,
            scored: false,
        });
        killed.push(egg.id);
    }
    killed
}
