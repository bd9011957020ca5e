//! Body segments, the segment pool and snake chains.
//!
//! Segments are records in a shared arena addressed by [`SegmentId`]. A chain
//! links its segments through `next` indices, starting at the head. Cutting a
//! chain rewrites indices and returns body records to the free list; the head
//! record is only ever deactivated.

use super::{EggId, Side};
use glam::Vec2;
use level::Color;

/// Number of color bands in a body gradient before it mirrors back.
const COLOR_BANDS: usize = 6;

/// Handle of a segment record in the [`SegmentPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(u32);

impl SegmentId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One segment of a chain (the head included).
#[derive(Debug, Clone)]
pub struct Segment {
    /// Arc length from the head along the trail.
    pub distance: f32,
    /// Sprite extent along the path.
    pub extent: f32,
    pub color: Color,
    /// Placement on the trail, used for collisions.
    pub position: Vec2,
    /// Placement with the lateral wave applied.
    pub render_position: Vec2,
    /// Facing angle in radians.
    pub rotation: f32,
    pub visible: bool,
    is_head: bool,
    active: bool,
    next: Option<SegmentId>,
    egg: Option<EggId>,
}

impl Segment {
    fn new(is_head: bool, extent: f32, distance: f32, color: Color) -> Self {
        Self {
            distance,
            extent,
            color,
            position: Vec2::ZERO,
            render_position: Vec2::ZERO,
            rotation: 0.0,
            visible: true,
            is_head,
            active: true,
            next: None,
            egg: None,
        }
    }

    #[inline]
    pub fn is_head(&self) -> bool {
        self.is_head
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn next(&self) -> Option<SegmentId> {
        self.next
    }

    /// Egg carried by this segment (only ever the tail).
    #[inline]
    pub fn egg(&self) -> Option<EggId> {
        self.egg
    }

    /// Collision radius of a square sprite.
    #[inline]
    pub fn radius(&self) -> f32 {
        crate::collision::sprite_radius(self.extent, self.extent)
    }
}

/// Reusable segment storage.
#[derive(Debug, Default)]
pub struct SegmentPool {
    slots: Vec<Segment>,
    free: Vec<SegmentId>,
}

impl SegmentPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::with_capacity(capacity),
        }
    }

    /// Take a body segment from the free list, allocating when it is empty.
    pub fn acquire(&mut self, extent: f32, distance: f32, color: Color) -> SegmentId {
        let segment = Segment::new(false, extent, distance, color);
        match self.free.pop() {
            Some(id) => {
                self.slots[id.index()] = segment;
                id
            }
            None => self.push(segment),
        }
    }

    /// Allocate a head record. Heads never come from, or return to, the free list.
    pub fn acquire_head(&mut self, extent: f32, color: Color) -> SegmentId {
        self.push(Segment::new(true, extent, 0.0, color))
    }

    fn push(&mut self, segment: Segment) -> SegmentId {
        let id = SegmentId(self.slots.len() as u32);
        self.slots.push(segment);
        id
    }

    /// Deactivate a segment; body segments become reusable.
    pub fn release(&mut self, id: SegmentId) {
        let Some(segment) = self.slots.get_mut(id.index()) else {
            return;
        };
        if !segment.active {
            return;
        }
        segment.active = false;
        segment.visible = false;
        segment.next = None;
        segment.egg = None;
        if !segment.is_head {
            self.free.push(id);
        }
    }

    #[inline]
    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.slots.get(id.index()).filter(|s| s.active)
    }

    #[inline]
    pub fn get_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        self.slots.get_mut(id.index()).filter(|s| s.active)
    }

    /// Records ever allocated.
    #[inline]
    pub fn capacity_used(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }
}

/// A segment detached by a sever.
#[derive(Debug, Clone, Copy)]
pub struct LostSegment {
    pub id: SegmentId,
    pub distance: f32,
    pub position: Vec2,
    pub color: Color,
    pub was_head: bool,
    pub egg: Option<EggId>,
}

/// Result of [`SegmentChain::sever_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverOutcome {
    /// The segment is not part of this chain; nothing changed.
    NotFound,
    Severed {
        removed: usize,
        /// The cut took the head or its neighbor; nothing is left to drive the chain.
        chain_dead: bool,
    },
}

impl SeverOutcome {
    #[inline]
    pub fn chain_dead(self) -> bool {
        matches!(self, SeverOutcome::Severed { chain_dead: true, .. })
    }
}

/// Ordered singly-linked chain of segments led by a head.
#[derive(Debug, Clone)]
pub struct SegmentChain {
    side: Side,
    head: SegmentId,
    tail: SegmentId,
    len: usize,
    palette: (Color, Color),
}

impl SegmentChain {
    pub fn new(pool: &mut SegmentPool, side: Side, head_extent: f32, palette: (Color, Color)) -> Self {
        let head = pool.acquire_head(head_extent, palette.0);
        Self {
            side,
            head,
            tail: head,
            len: 1,
            palette,
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn head(&self) -> SegmentId {
        self.head
    }

    #[inline]
    pub fn tail(&self) -> SegmentId {
        self.tail
    }

    /// Segment count, head included.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate segments from head to tail.
    pub fn iter<'a>(&self, pool: &'a SegmentPool) -> ChainIter<'a> {
        ChainIter {
            pool,
            current: (self.len > 0).then_some(self.head),
        }
    }

    pub fn ids(&self, pool: &SegmentPool) -> Vec<SegmentId> {
        self.iter(pool).map(|(id, _)| id).collect()
    }

    /// Arc length from the head to the tail segment.
    pub fn tail_distance(&self, pool: &SegmentPool) -> f32 {
        pool.get(self.tail).map_or(0.0, |s| s.distance)
    }

    fn band_color(&self, index: usize) -> Color {
        let period = 2 * COLOR_BANDS;
        let step = index % period;
        let band = if step > COLOR_BANDS { period - step } else { step };
        self.palette.0.lerp(self.palette.1, band as f32 / COLOR_BANDS as f32)
    }

    /// Append a segment after the tail. Any carried egg moves to the new tail.
    pub fn grow(&mut self, pool: &mut SegmentPool, extent: f32) -> SegmentId {
        let (distance, egg) = match pool.get(self.tail) {
            Some(tail) => (tail.distance + tail.extent / 2.0 + extent / 2.0, tail.egg),
            None => (extent / 2.0, None),
        };
        let color = self.band_color(self.len);
        let id = pool.acquire(extent, distance, color);
        if let Some(tail) = pool.get_mut(self.tail) {
            tail.next = Some(id);
            tail.egg = None;
        }
        if let Some(segment) = pool.get_mut(id) {
            segment.egg = egg;
        }
        self.tail = id;
        self.len += 1;
        id
    }

    /// Egg carried by the tail.
    pub fn egg(&self, pool: &SegmentPool) -> Option<EggId> {
        pool.get(self.tail).and_then(|s| s.egg)
    }

    /// Attach an egg to the tail. Fails if one is already carried.
    pub fn attach_egg(&self, pool: &mut SegmentPool, egg: EggId) -> bool {
        match pool.get_mut(self.tail) {
            Some(tail) if tail.egg.is_none() => {
                tail.egg = Some(egg);
                true
            }
            _ => false,
        }
    }

    pub fn detach_egg(&self, pool: &mut SegmentPool) -> Option<EggId> {
        pool.get_mut(self.tail).and_then(|s| s.egg.take())
    }

    /// Cut the chain immediately before `target`.
    ///
    /// Every segment from `target` to the tail is reported through `on_lost`
    /// and released; the head is deactivated instead of pooled.
    pub fn sever_at(
        &mut self,
        pool: &mut SegmentPool,
        target: SegmentId,
        mut on_lost: impl FnMut(LostSegment),
    ) -> SeverOutcome {
        if self.len == 0 {
            return SeverOutcome::NotFound;
        }
        let head_next = pool.get(self.head).and_then(|h| h.next);

        let mut previous = None;
        if target != self.head {
            let mut current = self.head;
            loop {
                match pool.get(current).and_then(|s| s.next) {
                    Some(next) if next == target => {
                        previous = Some(current);
                        break;
                    }
                    Some(next) => current = next,
                    None => return SeverOutcome::NotFound,
                }
            }
        }

        let chain_dead = target == self.head || Some(target) == head_next;

        if let Some(prev) = previous {
            if let Some(segment) = pool.get_mut(prev) {
                segment.next = None;
            }
            self.tail = prev;
        }

        let mut removed = 0;
        let mut current = Some(target);
        while let Some(id) = current {
            let Some(segment) = pool.get(id) else {
                break;
            };
            current = segment.next;
            on_lost(LostSegment {
                id,
                distance: segment.distance,
                position: segment.position,
                color: segment.color,
                was_head: segment.is_head,
                egg: segment.egg,
            });
            pool.release(id);
            removed += 1;
        }

        self.len -= removed;
        SeverOutcome::Severed { removed, chain_dead }
    }
}

/// Iterator over a chain's segments.
pub struct ChainIter<'a> {
    pool: &'a SegmentPool,
    current: Option<SegmentId>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = (SegmentId, &'a Segment);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let segment = self.pool.get(id)?;
        self.current = segment.next;
        Some((id, segment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PALETTE: (Color, Color) = (Color::new(0, 200, 0), Color::new(0, 80, 0));

    fn chain(pool: &mut SegmentPool, len: usize) -> SegmentChain {
        let mut c = SegmentChain::new(pool, Side::Enemy, 0.8, PALETTE);
        for _ in 1..len {
            c.grow(pool, 0.6);
        }
        c
    }

    #[test]
    fn test_grow_distances_monotonic() {
        let mut pool = SegmentPool::new();
        let c = chain(&mut pool, 4);
        let distances: Vec<f32> = c.iter(&pool).map(|(_, s)| s.distance).collect();
        assert_eq!(distances.len(), 4);
        assert_eq!(distances[0], 0.0);
        assert!((distances[1] - 0.7).abs() < 1e-6);
        assert!((distances[2] - 1.3).abs() < 1e-6);
        assert!((distances[3] - 1.9).abs() < 1e-6);
        assert!((c.tail_distance(&pool) - 1.9).abs() < 1e-6);
    }

    #[test]
    fn test_egg_moves_to_new_tail() {
        let mut pool = SegmentPool::new();
        let mut c = chain(&mut pool, 2);
        let egg = EggId::new(9);
        assert!(c.attach_egg(&mut pool, egg));
        assert!(!c.attach_egg(&mut pool, EggId::new(10)));
        let old_tail = c.tail();
        c.grow(&mut pool, 0.6);
        assert_eq!(pool.get(old_tail).unwrap().egg(), None);
        assert_eq!(c.egg(&pool), Some(egg));
        assert_eq!(c.detach_egg(&mut pool), Some(egg));
        assert_eq!(c.egg(&pool), None);
    }

    #[test]
    fn test_sever_middle_recycles() {
        let mut pool = SegmentPool::new();
        let mut c = chain(&mut pool, 5);
        let ids = c.ids(&pool);

        let mut lost = Vec::new();
        let outcome = c.sever_at(&mut pool, ids[3], |l| lost.push(l.id));
        assert_eq!(outcome, SeverOutcome::Severed { removed: 2, chain_dead: false });
        assert_eq!(lost, vec![ids[3], ids[4]]);
        assert_eq!(c.len(), 3);
        assert_eq!(c.tail(), ids[2]);
        assert_eq!(pool.free_count(), 2);

        // Reuse comes from the free list.
        let used = pool.capacity_used();
        c.grow(&mut pool, 0.6);
        assert_eq!(pool.capacity_used(), used);
        assert_eq!(c.len(), 4);
    }

    #[test]
    fn test_sever_near_head_kills_chain() {
        let mut pool = SegmentPool::new();
        let mut c = chain(&mut pool, 4);
        let ids = c.ids(&pool);
        let outcome = c.sever_at(&mut pool, ids[1], |_| {});
        assert!(outcome.chain_dead());
        assert_eq!(c.len(), 1);

        let mut heads = 0;
        let outcome = c.sever_at(&mut pool, ids[0], |l| heads += l.was_head as usize);
        assert_eq!(outcome, SeverOutcome::Severed { removed: 1, chain_dead: true });
        assert_eq!(heads, 1);
        // The head never joins the free list.
        assert_eq!(pool.free_count(), 3);
        assert!(pool.get(ids[0]).is_none());
    }

    #[test]
    fn test_sever_foreign_segment_not_found() {
        let mut pool = SegmentPool::new();
        let mut a = chain(&mut pool, 3);
        let b = chain(&mut pool, 3);
        let foreign = b.ids(&pool)[2];
        assert_eq!(a.sever_at(&mut pool, foreign, |_| {}), SeverOutcome::NotFound);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_lost_segment_carries_egg() {
        let mut pool = SegmentPool::new();
        let mut c = chain(&mut pool, 3);
        c.attach_egg(&mut pool, EggId::new(1));
        let tail = c.tail();
        let mut eggs = Vec::new();
        c.sever_at(&mut pool, tail, |l| eggs.extend(l.egg));
        assert_eq!(eggs, vec![EggId::new(1)]);
        assert_eq!(c.egg(&pool), None);
    }
}
