//! Gated doors.

use crate::phase::ArenaPhase;
use level::{Direction, DoorTag};

/// A conditionally passable barrier.
///
/// A door can only be crossed travelling in its openable direction, and only
/// while the arena is in its required phase (if any). The open flag is a
/// presentation state and never affects blocking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Door {
    open: bool,
    side: Direction,
    required_phase: Option<ArenaPhase>,
    tag: Option<DoorTag>,
}

impl Door {
    pub fn new(side: Direction) -> Self {
        Self {
            open: false,
            side,
            required_phase: None,
            tag: None,
        }
    }

    pub fn with_required_phase(mut self, phase: Option<ArenaPhase>) -> Self {
        self.required_phase = phase;
        self
    }

    pub fn with_tag(mut self, tag: Option<DoorTag>) -> Self {
        self.tag = tag;
        self
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Direction of travel that may cross this door.
    #[inline]
    pub fn side(&self) -> Direction {
        self.side
    }

    #[inline]
    pub fn required_phase(&self) -> Option<ArenaPhase> {
        self.required_phase
    }

    #[inline]
    pub fn tag(&self) -> Option<DoorTag> {
        self.tag
    }

    /// Whether an actor travelling in `direction` may cross during `phase`.
    #[inline]
    pub fn permits(&self, direction: Direction, phase: ArenaPhase) -> bool {
        direction == self.side && self.required_phase.is_none_or(|p| p == phase)
    }

    /// Returns true if the state changed.
    pub fn open(&mut self) -> bool {
        !std::mem::replace(&mut self.open, true)
    }

    /// Returns true if the state changed.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }
}
