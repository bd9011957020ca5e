//! Scheduled actions and outgoing notifications.

use crate::entity::{ChainId, EggId, ForagerId, Side};
use crate::maze::WallId;
use crate::phase::ArenaPhase;
use glam::Vec2;
use level::CellCoord;

/// Work queued on the event scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
    BeginPlay,
    LayEgg(ChainId),
    EggGrown(EggId),
    EggHatch(EggId),
    RespawnForager,
}

/// De-duplication key: at most one outstanding action per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKey {
    BeginPlay,
    LayEgg(ChainId),
    EggGrown(EggId),
    EggHatch(EggId),
}

impl ScheduledAction {
    pub fn key(&self) -> Option<EventKey> {
        match *self {
            ScheduledAction::BeginPlay => Some(EventKey::BeginPlay),
            ScheduledAction::LayEgg(chain) => Some(EventKey::LayEgg(chain)),
            ScheduledAction::EggGrown(egg) => Some(EventKey::EggGrown(egg)),
            ScheduledAction::EggHatch(egg) => Some(EventKey::EggHatch(egg)),
            // Several foragers may be waiting to respawn at once.
            ScheduledAction::RespawnForager => None,
        }
    }
}

/// Who ate something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumer {
    Chain { chain: ChainId, side: Side },
    Forager(ForagerId),
}

/// What was eaten whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumed {
    Egg(EggId),
    Forager(ForagerId),
}

/// Something presentation or scoring may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    ChainGrown {
        chain: ChainId,
        side: Side,
        length: usize,
    },
    /// A segment was bitten off; scored for the eater's side.
    SegmentEaten {
        chain: ChainId,
        side: Side,
        eater: Side,
        position: Vec2,
    },
    ChainDied {
        chain: ChainId,
        side: Side,
    },
    ActorConsumed {
        by: Consumer,
        target: Consumed,
        position: Vec2,
        /// Only the player side scores.
        scored: bool,
    },
    EggLaid {
        egg: EggId,
        chain: ChainId,
    },
    EggGrown {
        egg: EggId,
        cell: CellCoord,
    },
    EggHatched {
        egg: EggId,
        chain: ChainId,
        cell: CellCoord,
    },
    ForagerSpawned {
        forager: ForagerId,
        cell: CellCoord,
    },
    DoorOpened(WallId),
    DoorClosed(WallId),
    PhaseChanged {
        from: ArenaPhase,
        to: ArenaPhase,
    },
    PlayerReturned,
}

/// Everything that happened during one tick.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Scheduler clock after the tick.
    pub time: f64,
    pub phase: ArenaPhase,
    pub notifications: Vec<Notification>,
}

impl TickReport {
    pub fn count(&self, pred: impl Fn(&Notification) -> bool) -> usize {
        self.notifications.iter().filter(|n| pred(n)).count()
    }
}
