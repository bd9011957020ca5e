//! Head trail used to place body segments.
//!
//! Point 0 is always the live head position. Every other point is a corner
//! the head turned at, newest first. Each point stores the unit vector
//! pointing to the next-older point and its cumulative arc length from the
//! head, so a segment at arc length `D` is found by walking to the last point
//! whose distance is `<= D` and stepping `D - distance` along its vector.

pub mod wave;

use glam::Vec2;
use level::CELL_SIZE;

/// Minimum arc length kept behind the head.
pub const TRAIL_MAX_LENGTH: f32 = 10.0 * CELL_SIZE;

/// Positions closer than this are the same corner.
const CORNER_EPSILON: f32 = 1e-4;

/// One recorded point of the trail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub position: Vec2,
    /// Unit vector towards the next-older point.
    pub direction: Vec2,
    /// Cumulative arc length from the head.
    pub distance: f32,
}

/// Where a segment sits on the trail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec2,
    /// Unit facing (towards the head).
    pub facing: Vec2,
    /// The trail ran out; the segment keeps its previous rotation.
    pub pinned: bool,
    /// Arc length travelled since passing the last corner, if one is behind it.
    pub since_corner: Option<f32>,
    /// Facing before that corner.
    pub incoming: Option<Vec2>,
    /// Arc length the wave phase is measured from: the corner behind the
    /// segment, or the oldest retained point when the segment lies past it.
    pub phase_origin: f32,
}

/// Ordered history of head positions.
#[derive(Debug, Clone)]
pub struct TrailPath {
    points: Vec<TrailPoint>,
    cap: f32,
}

fn unit_between(from: Vec2, to: Vec2) -> Option<Vec2> {
    let v = to - from;
    (v.length_squared() > CORNER_EPSILON * CORNER_EPSILON).then(|| v.normalize())
}

impl TrailPath {
    /// A straight trail of `length` behind a head travelling along `heading`.
    pub fn new(head: Vec2, heading: Vec2, length: f32) -> Self {
        let back = match heading.try_normalize() {
            Some(h) => -h,
            None => Vec2::NEG_Y,
        };
        let length = length.max(CELL_SIZE);
        Self {
            points: vec![
                TrailPoint {
                    position: head,
                    direction: back,
                    distance: 0.0,
                },
                TrailPoint {
                    position: head + back * length,
                    direction: back,
                    distance: length,
                },
            ],
            cap: TRAIL_MAX_LENGTH.max(length),
        }
    }

    #[inline]
    pub fn points(&self) -> &[TrailPoint] {
        &self.points
    }

    #[inline]
    pub fn cap(&self) -> f32 {
        self.cap
    }

    /// Arc length covered by the retained points.
    #[inline]
    pub fn length(&self) -> f32 {
        self.points.last().map_or(0.0, |p| p.distance)
    }

    #[inline]
    pub fn head(&self) -> Vec2 {
        self.points[0].position
    }

    /// Move the live head point and re-accumulate arc lengths.
    pub fn update_head_position(&mut self, position: Vec2) {
        self.points[0].position = position;
        if self.points.len() > 1 {
            if let Some(dir) = unit_between(position, self.points[1].position) {
                self.points[0].direction = dir;
            } else {
                self.points[0].direction = self.points[1].direction;
            }
        }
        self.accumulate();
    }

    /// Record a corner right behind the head. Returns false for a duplicate.
    pub fn add_position(&mut self, position: Vec2) -> bool {
        if let Some(p1) = self.points.get(1) {
            if p1.position.distance_squared(position) <= CORNER_EPSILON * CORNER_EPSILON {
                return false;
            }
        }

        let direction = match self.points.get(1) {
            Some(older) => unit_between(position, older.position).unwrap_or(older.direction),
            None => self.points[0].direction,
        };
        self.points.insert(
            1,
            TrailPoint {
                position,
                direction,
                distance: 0.0,
            },
        );
        let head = self.points[0].position;
        self.points[0].direction = unit_between(head, position).unwrap_or(direction);
        self.accumulate();
        true
    }

    /// Keep at least `length` of trail, extending the oldest point if needed.
    pub fn ensure_length(&mut self, length: f32) {
        self.cap = self.cap.max(length + CELL_SIZE).max(TRAIL_MAX_LENGTH);
        let n = self.points.len();
        let last = self.points[n - 1];
        if last.distance >= length {
            return;
        }
        let direction = if last.direction != Vec2::ZERO {
            last.direction
        } else if n > 1 {
            unit_between(self.points[n - 2].position, last.position).unwrap_or(Vec2::NEG_Y)
        } else {
            Vec2::NEG_Y
        };
        let deficit = length - last.distance;
        let point = &mut self.points[n - 1];
        point.direction = direction;
        point.position += direction * deficit;
        point.distance = length;
    }

    fn accumulate(&mut self) {
        let mut total = 0.0;
        let mut cut = None;
        for i in 1..self.points.len() {
            total += self.points[i].position.distance(self.points[i - 1].position);
            self.points[i].distance = total;
            if total > self.cap {
                cut = Some(i + 1);
                break;
            }
        }
        if let Some(keep) = cut {
            self.points.truncate(keep);
        }
    }

    /// Place a segment at arc length `distance` behind the head.
    pub fn place(&self, distance: f32) -> Placement {
        let i = self
            .points
            .partition_point(|p| p.distance <= distance)
            .saturating_sub(1);
        let point = self.points[i];
        let next = self.points.get(i + 1);

        if point.direction == Vec2::ZERO {
            return Placement {
                position: point.position,
                facing: Vec2::ZERO,
                pinned: true,
                since_corner: None,
                incoming: None,
                phase_origin: point.distance,
            };
        }

        Placement {
            position: point.position + point.direction * (distance - point.distance),
            facing: -point.direction,
            pinned: false,
            since_corner: next.map(|n| n.distance - distance),
            incoming: next.map(|n| -n.direction).filter(|v| *v != Vec2::ZERO),
            phase_origin: next.map_or(point.distance, |n| n.distance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-4
    }

    #[test]
    fn test_straight_placement() {
        let trail = TrailPath::new(Vec2::new(5.0, 5.0), Vec2::Y, 3.0);
        let p = trail.place(1.5);
        assert!(approx(p.position, Vec2::new(5.0, 3.5)));
        assert!(approx(p.facing, Vec2::Y));
        assert!(!p.pinned);
    }

    #[test]
    fn test_corner_placement() {
        // Head travelled north from (0,0) to (0,2), then east to (1,2).
        let mut trail = TrailPath::new(Vec2::ZERO, Vec2::Y, 2.0);
        trail.update_head_position(Vec2::new(0.0, 2.0));
        assert!(trail.add_position(Vec2::new(0.0, 2.0)));
        assert!(!trail.add_position(Vec2::new(0.0, 2.0)));
        trail.update_head_position(Vec2::new(1.0, 2.0));

        let p = trail.place(0.5);
        assert!(approx(p.position, Vec2::new(0.5, 2.0)));
        assert!(approx(p.facing, Vec2::X));
        assert_eq!(p.since_corner, Some(0.5));
        assert_eq!(p.phase_origin, 1.0);
        assert!(approx(p.incoming.unwrap(), Vec2::Y));

        let p = trail.place(2.0);
        assert!(approx(p.position, Vec2::new(0.0, 1.0)));
        assert!(approx(p.facing, Vec2::Y));
    }

    #[test]
    fn test_extrapolates_past_last_point() {
        let trail = TrailPath::new(Vec2::ZERO, Vec2::X, 1.0);
        let p = trail.place(4.0);
        assert!(approx(p.position, Vec2::new(-4.0, 0.0)));
        assert_eq!(p.since_corner, None);
        assert_eq!(p.phase_origin, 1.0);
    }

    #[test]
    fn test_truncates_after_first_point_beyond_cap() {
        let mut trail = TrailPath::new(Vec2::ZERO, Vec2::X, 1.0);
        // Zig-zag east with a corner every cell.
        let mut x = 0.0;
        for step in 0..30 {
            x += 1.0;
            let y = if step % 2 == 0 { 0.5 } else { 0.0 };
            trail.update_head_position(Vec2::new(x, y));
            trail.add_position(Vec2::new(x, y));
        }
        let points = trail.points();
        let last = points[points.len() - 1];
        let before = points[points.len() - 2];
        assert!(last.distance > trail.cap());
        assert!(before.distance <= trail.cap());
    }

    #[test]
    fn test_trail_covers_farthest_segment() {
        let mut trail = TrailPath::new(Vec2::ZERO, Vec2::Y, 1.0);
        let mut tail = 0.0_f32;
        let mut pos = Vec2::ZERO;
        let turns = [Vec2::Y, Vec2::X, Vec2::NEG_Y, Vec2::X, Vec2::Y, Vec2::NEG_X];
        for (i, heading) in turns.iter().cycle().take(60).enumerate() {
            // Grow every third move.
            if i % 3 == 0 {
                tail += 0.6;
                trail.ensure_length(tail);
            }
            trail.update_head_position(pos);
            trail.add_position(pos);
            for _ in 0..4 {
                pos += *heading * 0.5;
                trail.update_head_position(pos);
                assert!(trail.length() >= tail, "trail {} < tail {}", trail.length(), tail);
            }
        }
        assert!(tail > TRAIL_MAX_LENGTH);
    }
}
