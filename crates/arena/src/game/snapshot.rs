//! Read-only view of the arena for presentation.

use crate::entity::{Side, ThreatLevel};
use crate::phase::ArenaPhase;
use crate::world::World;
use glam::Vec2;
use level::Color;

const EGG_COLOR: Color = Color::new(240, 230, 200);
const FORAGER_COLOR: Color = Color::new(230, 200, 40);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    Head,
    Segment,
    Egg,
    Forager,
}

/// One drawable actor.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorView {
    pub kind: ActorKind,
    pub side: Option<Side>,
    /// Render position, wave included.
    pub position: Vec2,
    pub rotation: f32,
    pub color: Color,
    pub visible: bool,
    pub threat: ThreatLevel,
}

#[derive(Debug, Clone, Default)]
pub struct ArenaSnapshot {
    pub time: f64,
    pub phase: ArenaPhase,
    pub actors: Vec<ActorView>,
}

impl ArenaSnapshot {
    pub fn capture(world: &World, time: f64, phase: ArenaPhase) -> Self {
        let mut actors = Vec::new();

        for snake in world.snakes().filter(|s| s.is_alive()) {
            for (_, segment) in snake.chain().iter(&world.pool) {
                actors.push(ActorView {
                    kind: if segment.is_head() {
                        ActorKind::Head
                    } else {
                        ActorKind::Segment
                    },
                    side: Some(snake.side()),
                    position: segment.render_position,
                    rotation: segment.rotation,
                    color: segment.color,
                    visible: segment.visible,
                    threat: if segment.is_head() {
                        snake.threat
                    } else {
                        ThreatLevel::None
                    },
                });
            }
        }

        actors.extend(world.eggs.iter().filter(|e| e.is_alive()).map(|egg| ActorView {
            kind: ActorKind::Egg,
            side: Some(egg.side()),
            position: egg.position,
            rotation: 0.0,
            color: EGG_COLOR,
            visible: true,
            threat: ThreatLevel::None,
        }));

        actors.extend(world.foragers.iter().filter(|f| f.is_alive()).map(|forager| ActorView {
            kind: ActorKind::Forager,
            side: None,
            position: forager.position(),
            rotation: 0.0,
            color: FORAGER_COLOR,
            visible: true,
            threat: ThreatLevel::None,
        }));

        Self { time, phase, actors }
    }

    pub fn count(&self, kind: ActorKind) -> usize {
        self.actors.iter().filter(|a| a.kind == kind).count()
    }
}
