//! Eggs laid by snakes.

use super::{ChainId, EggId, Side};
use crate::collision::sprite_radius;
use glam::Vec2;
use level::CellCoord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EggState {
    /// Growing on the tail of its chain.
    Carried,
    /// Still growing, but lying on the map after its carrier lost it.
    Laid,
    /// Fully grown on the map, waiting to hatch.
    Grown,
}

#[derive(Debug, Clone)]
pub struct Egg {
    pub id: EggId,
    side: Side,
    /// Chain that laid the egg.
    parent: ChainId,
    carrier: Option<ChainId>,
    pub position: Vec2,
    state: EggState,
    alive: bool,
    size: f32,
}

impl Egg {
    /// A new egg growing on the tail of `carrier`.
    pub fn carried(id: EggId, side: Side, carrier: ChainId, position: Vec2, size: f32) -> Self {
        Self {
            id,
            side,
            parent: carrier,
            carrier: Some(carrier),
            position,
            state: EggState::Carried,
            alive: true,
            size,
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn parent(&self) -> ChainId {
        self.parent
    }

    #[inline]
    pub fn carrier(&self) -> Option<ChainId> {
        self.carrier
    }

    #[inline]
    pub fn state(&self) -> EggState {
        self.state
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Eggs can only be eaten once they are on the map.
    #[inline]
    pub fn on_map(&self) -> bool {
        self.alive && self.state != EggState::Carried
    }

    #[inline]
    pub fn cell(&self) -> CellCoord {
        CellCoord::from_position(self.position)
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        sprite_radius(self.size, self.size)
    }

    /// Leave the carrier at `position`; growth continues on the map.
    pub fn drop_at(&mut self, position: Vec2) {
        self.carrier = None;
        self.position = position;
        if self.state == EggState::Carried {
            self.state = EggState::Laid;
        }
    }

    /// Finish growing at `position` (snapped to the cell center).
    pub fn finish_growing(&mut self, position: Vec2) {
        self.carrier = None;
        self.position = CellCoord::from_position(position).center();
        self.state = EggState::Grown;
    }

    pub fn kill(&mut self) {
        self.alive = false;
        self.carrier = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut egg = Egg::carried(EggId::new(1), Side::Enemy, ChainId::new(2), Vec2::ZERO, 0.5);
        assert!(!egg.on_map());
        assert_eq!(egg.carrier(), Some(ChainId::new(2)));

        egg.drop_at(Vec2::new(1.2, 0.9));
        assert_eq!(egg.state(), EggState::Laid);
        assert!(egg.on_map());
        assert_eq!(egg.carrier(), None);
        assert_eq!(egg.parent(), ChainId::new(2));

        egg.finish_growing(egg.position);
        assert_eq!(egg.state(), EggState::Grown);
        assert_eq!(egg.position, Vec2::new(1.0, 1.0));
        assert_eq!(egg.cell(), CellCoord::new(1, 1));

        egg.kill();
        assert!(!egg.on_map());
        assert_eq!(egg.radius(), 0.25);
    }
}
