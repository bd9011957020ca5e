//! Lateral body oscillation applied on top of trail placement.
//!
//! Purely cosmetic: collisions use the un-waved trail position.

use super::Placement;
use glam::Vec2;
use level::CELL_SIZE;
use std::f32::consts::{PI, TAU};

/// Peak lateral displacement.
pub const WAVE_AMPLITUDE: f32 = 0.08 * CELL_SIZE;
/// Travel for one full oscillation.
pub const WAVE_PERIOD: f32 = 2.0 * CELL_SIZE;
/// Travel after a corner over which rotation eases to the new facing.
pub const CORNER_BLEND: f32 = 0.5 * CELL_SIZE;
/// One animation frame.
pub const FRAME_TIME: f32 = 1.0 / 60.0;

/// Rendered adjustment for one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveSample {
    pub offset: Vec2,
    /// Facing angle in radians; `None` keeps the previous rotation.
    pub rotation: Option<f32>,
}

/// Clockwise perpendicular of a facing vector.
#[inline]
pub fn clockwise(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// Phase shift between neighbouring segments: one frame of travel at `speed`.
#[inline]
pub fn frame_lag(speed: f32) -> f32 {
    speed * FRAME_TIME / WAVE_PERIOD
}

#[inline]
fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Interpolate between two angles along the shorter arc.
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    let mut diff = (to - from).rem_euclid(TAU);
    if diff > PI {
        diff -= TAU;
    }
    from + diff * t
}

/// Wave offset and rotation for segment `index` placed at arc length `distance`.
///
/// The phase advances with the arc length between the segment and
/// [`Placement::phase_origin`], less one animation frame of travel per
/// segment ahead of it.
pub fn sample(placement: &Placement, distance: f32, index: usize, speed: f32) -> WaveSample {
    if placement.pinned || placement.facing == Vec2::ZERO {
        return WaveSample {
            offset: Vec2::ZERO,
            rotation: None,
        };
    }

    let travel = placement.phase_origin - distance;
    let phase = travel / WAVE_PERIOD - index as f32 * frame_lag(speed);
    let offset = clockwise(placement.facing) * (TAU * phase).sin() * WAVE_AMPLITUDE;

    let outgoing = angle_of(placement.facing);
    let rotation = match (placement.since_corner, placement.incoming) {
        (Some(since), Some(incoming)) if since < CORNER_BLEND => {
            let t = (since / CORNER_BLEND).clamp(0.0, 1.0).sqrt();
            lerp_angle(angle_of(incoming), outgoing, t)
        }
        _ => outgoing,
    };

    WaveSample {
        offset,
        rotation: Some(rotation),
    }
}
